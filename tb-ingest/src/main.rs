//! TrendBasket ingest (tb-ingest) - Main entry point
//!
//! Discovers trending recipes, resolves their ingredients and, when a
//! product catalog is configured, maps them to catalog products. Every stage
//! checkpoints into the data folder, so re-running picks up where the last
//! run stopped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tb_common::config::{
    load_config, resolve_api_key, resolve_catalog_path, DataFolderResolver, BRAVE_KEY_ENV,
    DATA_DIR_ENV, SPOONACULAR_KEY_ENV,
};
use tb_common::logging::init_logging;
use tb_ingest::services::{BraveSearchClient, RateGate, SpoonacularClient, TrendsClient};
use tb_ingest::workflow::{CheckpointStore, Pipeline, PipelineSettings, RunReport};
use tracing::info;

/// Command-line arguments for tb-ingest
#[derive(Parser, Debug)]
#[command(name = "tb-ingest")]
#[command(about = "Trending recipes to catalog products")]
#[command(version)]
struct Args {
    /// Config file (default: <config_dir>/trendbasket/config.toml)
    #[arg(short, long, env = "TB_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding checkpoint artifacts
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Product catalog CSV
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_config(args.config.as_deref()).context("Failed to load config")?;

    init_logging(&toml_config.logging).context("Failed to initialize logging")?;
    info!("Starting TrendBasket ingest v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = DataFolderResolver::new(DATA_DIR_ENV).resolve(args.data_dir.as_deref(), &toml_config);
    DataFolderResolver::ensure_directory_exists(&data_dir)
        .context("Failed to create data folder")?;
    info!("Data folder: {}", data_dir.display());

    let store = CheckpointStore::new(&data_dir, toml_config.artifact_layout);

    // Keys are only needed when resolution still has to run
    let (spoonacular_key, brave_key) = if store.ingredients_complete() {
        (String::new(), String::new())
    } else {
        (
            resolve_api_key(
                "Spoonacular",
                SPOONACULAR_KEY_ENV,
                toml_config.spoonacular_api_key.as_ref(),
            )?,
            resolve_api_key("Brave Search", BRAVE_KEY_ENV, toml_config.brave_api_key.as_ref())?,
        )
    };

    let gate = Arc::new(RateGate::from_millis(toml_config.rate_limit_ms()));
    let trends = Arc::new(TrendsClient::new(Arc::clone(&gate)).context("Failed to build trends client")?);
    let lookup = Arc::new(
        SpoonacularClient::new(spoonacular_key).context("Failed to build recipe lookup client")?,
    );
    let search = Arc::new(BraveSearchClient::new(brave_key).context("Failed to build web search client")?);

    let settings = PipelineSettings {
        seed_keyword: toml_config.trends.seed_keyword.clone(),
        timeframe: toml_config.trends.timeframe.clone(),
        region: toml_config.trends.region.clone(),
        min_match_score: toml_config.min_match_score(),
        catalog_path: resolve_catalog_path(args.catalog.as_deref(), &toml_config),
    };

    let pipeline = Pipeline::new(trends, lookup, search, gate, store, settings);
    let report = pipeline.run().await.context("Pipeline run failed")?;

    print_report(&report);
    Ok(())
}

/// Per-recipe summary on stdout
fn print_report(report: &RunReport) {
    match &report.products {
        Some(products) => {
            for recipe in products {
                let ids: Vec<String> = recipe.product_ids.iter().map(|id| id.to_string()).collect();
                println!("{} (+{}%): [{}]", recipe.name, recipe.growth, ids.join(", "));
            }
        }
        None => {
            for recipe in &report.recipes {
                println!(
                    "{} (+{}%): {}",
                    recipe.name,
                    recipe.growth,
                    recipe.ingredients.join(", ")
                );
            }
        }
    }

    for (name, cause) in &report.failures {
        println!("FAILED {}: {}", name, cause);
    }
}
