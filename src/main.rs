pub mod types;
pub mod config;
pub mod data;
pub mod country;
pub mod subdivisions;
pub mod matching;
pub mod projection;
pub mod geocode;
pub mod resolve;
pub mod solar;
pub mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the runtime dataset artifact from the source rate table
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the impact calculation API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let dataset = data::build_from_tsv(&app_config.input.source_table)?;
            dataset.save(&app_config.input.dataset_json)?;
            println!("Dataset written to {:?}", app_config.input.dataset_json);
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;

            // Load once, before accepting any traffic. The dataset is
            // immutable for the life of the process.
            println!("Loading reference dataset...");
            let dataset = data::ReferenceDataset::load(&app_config.input.dataset_json)?;
            println!(
                "Loaded {} countries / {} regions",
                dataset.country_count(),
                dataset.region_count()
            );

            server::start_server(app_config, dataset).await?;
        }
    }

    Ok(())
}
