//! SlotForge reel previewer
//!
//! Loads a slot layout manifest and previews reel spins on it, with a
//! scrubbable timeline of the active speed preset.

mod app;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use slotforge::config::{PresetCatalog, SlotManifest, SpeedMode, StopPattern};
use slotforge::timeline::PlaybackBridge;

use app::PreviewerApp;

/// SlotForge reel previewer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a layout manifest JSON file
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Path to a JSON file of speed preset overrides
    #[arg(short, long)]
    presets: Option<PathBuf>,

    /// Speed mode: instant, fast, normal or slow
    #[arg(long, default_value = "normal")]
    mode: SpeedMode,

    /// Stop pattern: sequential, slam or anticipation
    #[arg(long)]
    stop_pattern: Option<StopPattern>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --debug
    let level = if args.debug { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("SlotForge previewer starting...");

    let manifest = match &args.manifest {
        Some(path) => {
            info!("Loading manifest from: {:?}", path);
            match SlotManifest::load_from_file(path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    error!("Failed to load manifest: {}", e);
                    info!("Falling back to the default layout");
                    SlotManifest::default_layout()
                }
            }
        }
        None => SlotManifest::default_layout(),
    };

    let catalog = match &args.presets {
        Some(path) => PresetCatalog::load_from_file(path)
            .with_context(|| format!("loading presets from {:?}", path))?,
        None => PresetCatalog::builtin(),
    };

    let mut bridge = PlaybackBridge::from_manifest(
        &manifest,
        catalog,
        args.mode,
        args.stop_pattern.unwrap_or_default(),
    )
    .context("building playback bridge")?;
    if let Some(pattern) = args.stop_pattern {
        bridge.set_stop_pattern(pattern);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([960.0, 600.0])
            .with_title("SlotForge Previewer"),
        ..Default::default()
    };

    eframe::run_native(
        "SlotForge Previewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(PreviewerApp::new(cc, manifest, bridge)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
