//! Homeval CLI — run the training pipeline and price listings from the
//! terminal.

use anyhow::Context;
use clap::Parser;
use homeval_core::config::PipelineConfig;
use homeval_core::data::source::JsonlDocumentStore;
use homeval_core::inference::{Estimator, PropertyQuery};
use homeval_core::pipeline::TrainingPipeline;
use homeval_core::storage::LocalObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Homeval: house-price model training and serving
#[derive(Parser, Debug)]
#[command(name = "homeval", version, about, long_about = None)]
struct Cli {
    /// Workspace directory holding config/, data/, and artifacts/
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Pipeline configuration file (YAML); defaults to the standard layout
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the full ingest → train → evaluate → promote pipeline
    Train {
        /// Directory of JSONL collections (defaults to <workspace>/data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Object-store root for served models (defaults to <workspace>/registry)
        #[arg(long)]
        registry_dir: Option<PathBuf>,
    },
    /// Price a single listing with the promoted model
    Predict {
        /// Listing location
        #[arg(long)]
        location: String,
        /// Number of bedrooms
        #[arg(long)]
        bhk: u32,
        /// Total area in square feet
        #[arg(long)]
        sqft: f64,
        /// Number of bathrooms
        #[arg(long)]
        bath: f64,
        /// Object-store root for served models (defaults to <workspace>/registry)
        #[arg(long)]
        registry_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "homeval=info,homeval_core=info",
        1 => "homeval=debug,homeval_core=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&cli)?;
    tracing::info!(workspace = %cli.workspace.display(), "resolved workspace");

    match cli.command {
        Commands::Train {
            data_dir,
            registry_dir,
        } => {
            let data_dir = data_dir.unwrap_or_else(|| cli.workspace.join("data"));
            let registry_dir = registry_dir.unwrap_or_else(|| cli.workspace.join("registry"));
            let documents = Arc::new(JsonlDocumentStore::new(data_dir));
            let objects = Arc::new(LocalObjectStore::new(registry_dir));

            let report = TrainingPipeline::new(config, documents, objects)
                .run()
                .await
                .context("training pipeline failed")?;

            println!("run:              {}", report.run_id);
            println!("accepted:         {}", report.accepted);
            println!("promoted:         {}", report.promoted);
            println!("test r2:          {:.4}", report.metrics.r2);
            println!("test mae:         {:.4}", report.metrics.mae);
            println!("test rmse:        {:.4}", report.metrics.rmse);
            println!("changed accuracy: {:+.4}", report.changed_accuracy);
        }
        Commands::Predict {
            location,
            bhk,
            sqft,
            bath,
            registry_dir,
        } => {
            let registry_dir = registry_dir.unwrap_or_else(|| cli.workspace.join("registry"));
            let objects = Arc::new(LocalObjectStore::new(registry_dir));
            let mut estimator = Estimator::new(
                objects,
                config.evaluation.champion_key.clone(),
                std::env::temp_dir(),
            );
            anyhow::ensure!(
                estimator.is_present().await?,
                "no promoted model at '{}'; run `homeval train` first",
                config.evaluation.champion_key
            );

            let price = estimator
                .predict(&PropertyQuery {
                    location,
                    no_of_bhk: bhk,
                    total_sqft: sqft,
                    bath,
                })
                .await
                .context("prediction failed")?;
            println!("Estimated price: {:.2} lakhs", price);
        }
    }
    Ok(())
}

/// Load the pipeline config and anchor its relative paths at the workspace.
fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let standard = cli.workspace.join("config").join("pipeline.yaml");
            if standard.exists() {
                PipelineConfig::load(&standard)
                    .with_context(|| format!("loading config {}", standard.display()))?
            } else {
                PipelineConfig::default()
            }
        }
    };
    config.artifact_dir = anchor(&cli.workspace, &config.artifact_dir);
    config.schema_path = anchor(&cli.workspace, &config.schema_path);
    config.model_grid_path = anchor(&cli.workspace, &config.model_grid_path);
    Ok(config)
}

fn anchor(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}
