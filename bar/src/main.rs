//! xbattbar-rs: battery status bar for X11.
//!
//! Docks a thin bar to one screen edge whose filled length and color follow
//! the battery charge. Hovering the bar shows the exact percentage.

mod sources;
mod x11;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xbattbar_rs_core::{
    BarController, BarGeometry, BarRenderer, GlobalConfig, ScreenEdge, SourceSelector,
    StatusSource, UpdateLoop,
};

use crate::x11::{X11Display, X11Surface};

/// Events buffered between the producers and the rendering task.
const EVENT_QUEUE: usize = 32;

/// Command-line arguments for the bar.
#[derive(Parser)]
#[command(name = "xbattbar-rs")]
#[command(about = "Battery status bar docked to a screen edge")]
#[command(version)]
#[command(author)]
struct Args {
    /// Screen edge to dock to (l, r, t, b or the full name)
    #[arg(long)]
    side: Option<ScreenEdge>,

    /// Bar thickness in pixels
    #[arg(short = 'w', long, value_parser = clap::value_parser!(u16).range(1..))]
    thickness: Option<u16>,

    /// Update interval in milliseconds (minimum 100ms)
    #[arg(short = 'r', long, value_parser = validate_interval)]
    interval: Option<u64>,

    /// Status backend, `name` or `name:args` (upower, debug)
    #[arg(short = 'c', long)]
    checker: Option<SourceSelector>,

    /// X core font for the popup text
    #[arg(long)]
    font: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Poll the backend once, print the status as JSON and exit
    #[arg(short, long)]
    once: bool,

    /// Verify the backend can be initialized and exit
    #[arg(long)]
    check: bool,

    /// Generate example config file and exit
    #[arg(long)]
    generate_config: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

/// Validate that the interval is at least 100ms.
fn validate_interval(s: &str) -> Result<u64, String> {
    let interval = s
        .parse::<u64>()
        .map_err(|_| "Interval must be a positive integer".to_owned())?;

    if interval < GlobalConfig::MIN_UPDATE_INTERVAL {
        return Err(format!(
            "Interval must be at least {}ms",
            GlobalConfig::MIN_UPDATE_INTERVAL
        ));
    }

    Ok(interval)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Load the config file and apply command line overrides on top.
fn resolve_config(args: &Args) -> Result<GlobalConfig> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => GlobalConfig::load().context("Failed to load configuration")?,
    };

    if let Some(edge) = args.side {
        config.edge = edge;
    }
    if let Some(thickness) = args.thickness {
        config.thickness = thickness;
    }
    if let Some(interval) = args.interval {
        config.update_interval = interval;
    }
    if let Some(checker) = &args.checker {
        config.source = checker.to_string();
    }
    if let Some(font) = &args.font {
        config.font.clone_from(font);
    }

    config.validate()?;
    Ok(config)
}

/// `--once` and `--check`: bring the backend up, report, and tear it down.
async fn one_shot(mut source: Box<dyn StatusSource>, args: &str, check_only: bool) -> Result<()> {
    let name = source.name().to_owned();
    source
        .init(args)
        .await
        .with_context(|| format!("{name} checker is not available"))?;

    let result = if check_only {
        println!("{name} checker is available");
        Ok(())
    } else {
        print_status(source.as_mut()).await
    };

    source.stop().await;
    result
}

async fn print_status(source: &mut dyn StatusSource) -> Result<()> {
    let status = source
        .check()
        .await
        .context("Error reading battery status")?;
    println!("{}", serde_json::to_string(&status)?);
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => warn!("Cannot listen for SIGTERM: {}", e),
        }
    }
    let _ = tokio::signal::ctrl_c().await;
}

/// Run the bar until a signal arrives, the display goes away, or the backend
/// fails to initialize.
async fn run_bar(config: GlobalConfig, source: Box<dyn StatusSource>, args: String) -> Result<()> {
    let display = X11Display::connect()?;
    let (width, height) = display.screen_size();
    let geometry = BarGeometry::new(config.edge, config.thickness, width, height);
    let surface = X11Surface::create(&display, &geometry, &config.font)?;
    let pump = surface.event_pump();

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (closed_tx, closed_rx) = oneshot::channel::<()>();

    let pump_events = events_tx.clone();
    std::thread::Builder::new()
        .name("x11-events".to_owned())
        .spawn(move || {
            pump.run(pump_events);
            let _ = closed_tx.send(());
        })
        .context("Failed to start X event thread")?;

    let renderer = BarRenderer::new(geometry, config.palette.clone());
    let controller = tokio::spawn(BarController::new(renderer, surface).run(events_rx));

    let mut updates = tokio::spawn(
        UpdateLoop::new(
            source,
            args,
            config.update_interval_duration(),
            events_tx,
            shutdown_rx,
        )
        .run(),
    );

    info!(edge = %config.edge, thickness = config.thickness, source = %config.source, "bar running");

    let finished = tokio::select! {
        joined = &mut updates => Some(joined),
        () = shutdown_signal() => {
            info!("Signal received, shutting down");
            None
        }
        _ = closed_rx => {
            info!("Display connection closed, shutting down");
            None
        }
    };

    let _ = shutdown_tx.send(true);
    let joined = match finished {
        Some(joined) => joined,
        None => updates.await,
    };

    controller.abort();
    let _ = controller.await;

    joined.context("Update loop panicked")??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.generate_config {
        let Some(config_path) = args.config.clone().or_else(GlobalConfig::default_config_path)
        else {
            eprintln!("Could not determine config directory");
            process::exit(1);
        };
        GlobalConfig::save_example_config_to_file(&config_path)?;
        println!("Generated example config at: {}", config_path.display());
        println!("\nYou can now edit this file to customize the bar.");
        return Ok(());
    }

    let config = resolve_config(&args)?;
    let selector = config.selector()?;
    let source = sources::create_source(selector.kind);

    if args.once || args.check {
        return one_shot(source, &selector.args, args.check).await;
    }

    run_bar(config, source, selector.args).await
}
