//! scenedi - Entry Point
//!
//! Runs the scripted demo screen: builds a root and a screen container,
//! spawns and removes image views, and logs what the containers did.

use clap::Parser;
use scenedi::run_demo;
use scenedi_infrastructure::ConfigLoader;
use scenedi_infrastructure::logging::init_logging;
use tracing::info;

/// Command line interface for the scenedi demo
#[derive(Parser, Debug)]
#[command(name = "scenedi")]
#[command(about = "scenedi - lifecycle-driven dependency injection demo")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Number of image views to spawn (overrides `demo.image_count`)
    #[arg(long)]
    pub images: Option<usize>,

    /// Number of image views to remove again (overrides `demo.removals`)
    #[arg(long)]
    pub removals: Option<usize>,

    /// Seed for the random picks (overrides `demo.seed`)
    #[arg(long)]
    pub seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load()?;
    if let Some(images) = cli.images {
        config.demo.image_count = images;
    }
    if let Some(removals) = cli.removals {
        config.demo.removals = removals;
    }
    if cli.seed.is_some() {
        config.demo.seed = cli.seed;
    }

    init_logging(&config.logging)?;

    let summary = run_demo(&config)?;
    info!(
        lifetime = %summary.palette_lifetime,
        spawned = summary.images_spawned,
        removed = summary.images_removed,
        live_views = summary.live_views,
        palette_refs = summary.palette_refs,
        color = %summary.test_image_color,
        "Summary"
    );
    Ok(())
}
