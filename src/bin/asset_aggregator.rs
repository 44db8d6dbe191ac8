//! Aggregates one customer's assets and prints the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --features cli --bin asset_aggregator -- C001
//! cargo run --features cli --bin asset_aggregator -- --config assets.toml --trace-id t-1 C001
//! ```
//!
//! Settings come from built-in defaults, the optional `--config` file and
//! `ASSETS__*` environment variables (a `.env` file is read first).

use anyhow::Context;
use asset_aggregator::application::services::{
    AggregationComputation, AggregationCoordinator, AggregationService, DurableWriteRetrier,
};
use asset_aggregator::domain::services::CurrencyConverter;
use asset_aggregator::domain::value_objects::SourceType;
use asset_aggregator::infrastructure::config::AppConfig;
use asset_aggregator::infrastructure::logging::init_tracing;
use asset_aggregator::infrastructure::metrics::AggregationMetrics;
use asset_aggregator::infrastructure::persistence::in_memory::{
    InMemoryRawDocumentStore, InMemorySnapshotStore,
};
use asset_aggregator::infrastructure::sources::{HttpClient, HttpSourceClient, SourceClient};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "asset_aggregator", about = "Aggregate a customer's assets")]
struct Args {
    /// Customer to aggregate.
    customer_id: String,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reuse this trace id instead of generating one.
    #[arg(long)]
    trace_id: Option<String>,

    /// Print collected metrics to stderr after the run.
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.logging.level, config.logging.json)
        .context("installing tracing subscriber")?;

    let http = HttpClient::new(config.sources.request_timeout_ms)?;
    let clients: Vec<Arc<dyn SourceClient>> = SourceType::ALL
        .into_iter()
        .map(|source| {
            let base_url = match source {
                SourceType::Bank => &config.sources.bank_base_url,
                SourceType::Securities => &config.sources.securities_base_url,
                SourceType::Insurance => &config.sources.insurance_base_url,
            };
            Arc::new(HttpSourceClient::new(source, base_url.as_str(), http.clone()))
                as Arc<dyn SourceClient>
        })
        .collect();

    let metrics = AggregationMetrics::new();
    let coordinator = AggregationCoordinator::new(
        clients,
        Arc::new(InMemoryRawDocumentStore::new()),
        DurableWriteRetrier::new(config.retry_config()?),
        metrics.clone(),
    )?;
    let computation = AggregationComputation::new(
        CurrencyConverter::new(config.rate_table()?),
        &config.base_currency(),
    )?;
    let service = AggregationService::new(
        coordinator,
        computation,
        Arc::new(InMemorySnapshotStore::new()),
    )
    .with_timeout(config.fetch_timeout());

    tracing::info!(
        customer_id = %args.customer_id,
        base_currency = %config.base_currency(),
        timeout_ms = config.aggregation.timeout_ms,
        "starting aggregation"
    );

    let outcome = service
        .aggregate_traced(&args.customer_id, args.trace_id.as_deref())
        .await;

    if args.metrics {
        eprint!("{}", metrics.render());
    }

    let result = outcome.with_context(|| format!("aggregating {}", args.customer_id))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
