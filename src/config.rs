//! Runtime settings assembled from command-line arguments.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::client::{FeedSpec, USGS_BASE_URL};

/// Timestamp layout used in popups, e.g. `Tue Nov 14 2023 22:13:20 GMT+0000`.
const POPUP_TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::str::FromStr for LatLng {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(format!(
                "center requires 2 values (lat,lon), got {}",
                parts.len()
            ));
        }

        let vals: Result<Vec<f64>, _> = parts.iter().map(|p| p.trim().parse::<f64>()).collect();
        let vals = vals.map_err(|e| format!("invalid number in center: {e}"))?;

        let point = Self::new(vals[0], vals[1]);
        if !(-90.0..=90.0).contains(&point.lat) {
            return Err(format!("latitude {} out of range [-90, 90]", point.lat));
        }
        if !(-180.0..=180.0).contains(&point.lng) {
            return Err(format!("longitude {} out of range [-180, 180]", point.lng));
        }
        Ok(point)
    }
}

/// What to do when the feed cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Render nothing and say nothing; only the exit status and debug log tell.
    #[default]
    Silent,
    /// Surface the error to the user.
    Report,
}

impl std::str::FromStr for FetchFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "report" => Ok(Self::Report),
            _ => Err(format!("unknown fetch error policy: {s} (expected: silent, report)")),
        }
    }
}

/// What to do with a feed record that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidFeaturePolicy {
    /// Drop the record with a warning and keep going.
    #[default]
    Skip,
    /// Fail the whole run.
    Abort,
}

impl std::str::FromStr for InvalidFeaturePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(format!("unknown invalid feature policy: {s} (expected: skip, abort)")),
        }
    }
}

/// Zone used to display event times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeDisplay {
    Utc,
    #[default]
    Local,
}

impl std::str::FromStr for TimeDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(format!("unknown time zone: {s} (expected: utc, local)")),
        }
    }
}

impl TimeDisplay {
    /// Format an epoch-millisecond timestamp for a popup.
    #[must_use]
    pub fn format_millis(self, millis: i64) -> String {
        match self {
            Self::Utc => format_in(&Utc, millis),
            Self::Local => format_in(&Local, millis),
        }
    }
}

fn format_in<Tz>(zone: &Tz, millis: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    zone.timestamp_millis_opt(millis)
        .single()
        .map_or_else(
            || "Invalid Date".to_string(),
            |t: DateTime<Tz>| t.format(POPUP_TIME_FORMAT).to_string(),
        )
}

/// Where the feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote { base_url: String, feed: FeedSpec },
    File(std::path::PathBuf),
}

impl Default for FeedSource {
    fn default() -> Self {
        Self::Remote {
            base_url: USGS_BASE_URL.to_string(),
            feed: FeedSpec::default(),
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { feed, .. } => write!(f, "{feed} feed"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub source: FeedSource,
    pub on_fetch_error: FetchFailurePolicy,
    pub invalid_features: InvalidFeaturePolicy,
    pub time_display: TimeDisplay,
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: FeedSource::default(),
            on_fetch_error: FetchFailurePolicy::default(),
            invalid_features: InvalidFeaturePolicy::default(),
            time_display: TimeDisplay::default(),
            center: crate::map::DEFAULT_CENTER,
            zoom: crate::map::DEFAULT_ZOOM,
        }
    }
}
