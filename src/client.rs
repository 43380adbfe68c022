//! USGS Earthquake API client.
//!
//! Provides blocking HTTP access to the USGS summary feeds.
//! Uses reqwest with rustls for TLS.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::errors::QuakemapError;
use crate::models::FeatureCollection;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
pub const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// Magnitude cut-off of a summary feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLevel {
    All,
    Mag1,
    Mag25,
    Mag45,
    Significant,
}

impl FeedLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Mag1 => "1.0",
            Self::Mag25 => "2.5",
            Self::Mag45 => "4.5",
            Self::Significant => "significant",
        }
    }
}

/// Time window of a summary feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedWindow {
    Hour,
    Day,
    Week,
    Month,
}

impl FeedWindow {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// One summary feed, e.g. `1.0_week`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSpec {
    pub level: FeedLevel,
    pub window: FeedWindow,
}

impl Default for FeedSpec {
    /// M1.0+ events of the past week.
    fn default() -> Self {
        Self {
            level: FeedLevel::Mag1,
            window: FeedWindow::Week,
        }
    }
}

impl fmt::Display for FeedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.level.as_str(), self.window.as_str())
    }
}

impl std::str::FromStr for FeedSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        let (level, window) = lower
            .rsplit_once('_')
            .ok_or_else(|| format!("unknown feed: {s} (expected <level>_<window>, e.g. 1.0_week)"))?;

        let level = match level {
            "all" => FeedLevel::All,
            "1.0" => FeedLevel::Mag1,
            "2.5" => FeedLevel::Mag25,
            "4.5" => FeedLevel::Mag45,
            "significant" => FeedLevel::Significant,
            _ => return Err(format!("unknown feed level: {level}")),
        };
        let window = match window {
            "hour" => FeedWindow::Hour,
            "day" => FeedWindow::Day,
            "week" => FeedWindow::Week,
            "month" => FeedWindow::Month,
            _ => return Err(format!("unknown feed window: {window}")),
        };

        Ok(Self { level, window })
    }
}

/// Build the GeoJSON URL of a summary feed.
#[must_use]
pub fn feed_url(base_url: &str, feed: FeedSpec) -> String {
    format!(
        "{}/earthquakes/feed/v1.0/summary/{feed}.geojson",
        base_url.trim_end_matches('/')
    )
}

/// Client for USGS earthquake API.
pub struct UsgsClient {
    client: Client,
    base_url: String,
}

impl UsgsClient {
    /// Create a client for the feed service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_base_url(base_url: &str) -> Result<Self, QuakemapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Fetch a summary GeoJSON feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or response cannot be parsed.
    #[instrument(skip_all, fields(feed = %feed))]
    pub fn fetch_feed(&self, feed: FeedSpec) -> Result<FeatureCollection, QuakemapError> {
        let url = feed_url(&self.base_url, feed);

        debug!("fetching feed from {}", url);

        let response = self.client.get(&url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakemapError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;
        let collection = FeatureCollection::from_json(&body)?;

        debug!("fetched {} records", collection.features.len());
        Ok(collection)
    }
}

/// Load a feed previously saved to disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a feature collection.
pub fn load_feed(path: &Path) -> Result<FeatureCollection, QuakemapError> {
    debug!("reading feed from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    FeatureCollection::from_json(&text)
}
