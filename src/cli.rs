//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::client::{FeedSpec, USGS_BASE_URL};
use crate::config::{
    FeedSource, FetchFailurePolicy, InvalidFeaturePolicy, LatLng, PipelineConfig, TimeDisplay,
};
use crate::output::Format;

/// Render the USGS earthquake feed as an interactive depth-colored map.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the feed once and write the map page
    Render(RenderArgs),

    /// Fetch the feed once and list the derived markers
    Markers(MarkersArgs),

    /// Serve the map page, rebuilt on every load
    Serve(ServeArgs),
}

/// Feed, failure policy, and view settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Summary feed to fetch (<level>_<window>)
    #[arg(long, default_value = "1.0_week", value_parser = parse_feed)]
    pub feed: FeedSpec,

    /// Base URL of the feed service
    #[arg(long, default_value = USGS_BASE_URL)]
    pub base_url: String,

    /// Read a saved GeoJSON feed instead of fetching
    #[arg(long, conflicts_with_all = ["feed", "base_url"])]
    pub input: Option<PathBuf>,

    /// What to do when the feed cannot be fetched: silent or report
    #[arg(long, default_value = "silent", value_parser = parse_fetch_policy)]
    pub on_fetch_error: FetchFailurePolicy,

    /// What to do with malformed records: skip or abort
    #[arg(long, default_value = "skip", value_parser = parse_invalid_policy)]
    pub invalid_features: InvalidFeaturePolicy,

    /// Zone for popup timestamps: utc or local
    #[arg(long, default_value = "local", value_parser = parse_time_display)]
    pub time_zone: TimeDisplay,

    /// Map center: lat,lon
    #[arg(long, default_value = "38.5,-96.5", allow_hyphen_values = true, value_parser = parse_center)]
    pub center: LatLng,

    /// Initial zoom level
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(0..=19))]
    pub zoom: u8,
}

impl PipelineArgs {
    /// Fold the arguments into a pipeline configuration.
    #[must_use]
    pub fn to_config(&self) -> PipelineConfig {
        let source = match &self.input {
            Some(path) => FeedSource::File(path.clone()),
            None => FeedSource::Remote {
                base_url: self.base_url.clone(),
                feed: self.feed,
            },
        };

        PipelineConfig {
            source,
            on_fetch_error: self.on_fetch_error,
            invalid_features: self.invalid_features,
            time_display: self.time_zone,
            center: self.center,
            zoom: self.zoom,
        }
    }
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', default_value = "html", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `markers` command.
#[derive(Parser, Debug)]
pub struct MarkersArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse a feed spec from string.
fn parse_feed(s: &str) -> Result<FeedSpec, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a map center from string.
fn parse_center(s: &str) -> Result<LatLng, String> {
    s.parse()
}

fn parse_fetch_policy(s: &str) -> Result<FetchFailurePolicy, String> {
    s.parse()
}

fn parse_invalid_policy(s: &str) -> Result<InvalidFeaturePolicy, String> {
    s.parse()
}

fn parse_time_display(s: &str) -> Result<TimeDisplay, String> {
    s.parse()
}
