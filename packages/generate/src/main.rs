#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI tool for running the plant map batch pipeline.
//!
//! Loads the park boundary and observation datasets, renders
//! observation-frequency histograms, and writes the map-ready `GeoJSON`
//! document for the front end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use plant_map_generate::{PipelineConfig, generate_map_document, render_all_histograms, run_pipeline};

#[derive(Parser)]
#[command(name = "plant_map_generate", about = "Plant map batch pipeline")]
struct Cli {
    /// Park boundary GeoJSON file.
    #[arg(long, default_value = "data/chicago_parks/parks.geojson")]
    parks: PathBuf,

    /// Plant observation CSV file.
    #[arg(long, default_value = "data/plant_observations/chicago_plant_observations.csv")]
    observations: PathBuf,

    /// Public static directory for rendered artifacts.
    #[arg(long, default_value = "static")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render per-species observation histograms
    Histograms,
    /// Assemble and write the map `GeoJSON` document
    Map,
    /// Render histograms, then write the map document
    All,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = PipelineConfig::new(&cli.parks, &cli.observations, &cli.output_dir);

    log::info!(
        "Running pipeline: parks={}, observations={}",
        config.parks_path.display(),
        config.observations_path.display()
    );
    let output = run_pipeline(&config)?;

    match cli.command {
        Commands::Histograms => {
            render_all_histograms(&output, &config);
        }
        Commands::Map => {
            generate_map_document(&output, &config)?;
        }
        Commands::All => {
            render_all_histograms(&output, &config);
            generate_map_document(&output, &config)?;
        }
    }

    Ok(())
}
