//! quakemap - the USGS earthquake feed as an interactive map.
//!
//! Fetches a summary feed, turns every event into a circle sized by
//! magnitude and colored by depth, and renders a Leaflet page with a
//! depth legend.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

mod cli;
mod client;
mod config;
mod depth;
mod errors;
mod html;
mod legend;
mod map;
mod marker;
mod models;
mod output;
mod pipeline;
mod render;
mod server;

use cli::{Cli, Command};
use config::{FetchFailurePolicy, PipelineConfig};
use errors::PipelineError;
use map::MapView;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Render(args) => cmd_render(&args),
        Command::Markers(args) => cmd_markers(&args),
        Command::Serve(args) => cmd_serve(args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Run the pipeline, applying the fetch failure policy.
///
/// `Ok(None)` means the feed was unavailable and the policy is to stay
/// silent: nothing gets rendered.
fn load_map(config: &PipelineConfig) -> Result<Option<MapView>> {
    match pipeline::run(config) {
        Ok(map) => Ok(Some(map)),
        Err(e @ PipelineError::Fetch(_)) if config.on_fetch_error == FetchFailurePolicy::Silent => {
            debug!("{:#}", anyhow::Error::from(e));
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Execute the `render` command - one-shot fetch and map page.
fn cmd_render(args: &cli::RenderArgs) -> Result<ExitCode> {
    let config = args.pipeline.to_config();
    let Some(map) = load_map(&config)? else {
        return Ok(ExitCode::FAILURE);
    };

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_map(&mut writer, &map, args.format)
                .and_then(|()| writer.flush())
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                "wrote map with {} earthquakes to {}",
                map.marker_count(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            output::write_map(&mut handle, &map, args.format)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Execute the `markers` command - one-shot marker listing.
fn cmd_markers(args: &cli::MarkersArgs) -> Result<ExitCode> {
    let config = args.pipeline.to_config();
    let Some(map) = load_map(&config)? else {
        return Ok(ExitCode::FAILURE);
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_map(&mut handle, &map, args.format)?;

    Ok(ExitCode::SUCCESS)
}

/// Execute the `serve` command - start web server.
fn cmd_serve(args: cli::ServeArgs) -> Result<ExitCode> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        pipeline: args.pipeline.to_config(),
    };

    // Print startup message
    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌍 quakemap\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Source:  {}", config.pipeline.source);
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))?;

    Ok(ExitCode::SUCCESS)
}
