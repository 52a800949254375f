use clap::Parser;
use std::sync::Arc;
use tubedrop_api::cli::Cli;
use tubedrop_core::Config;
use tubedrop_services::GarbageCollector;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    tubedrop_api::telemetry::init_telemetry(&cli.default_log_filter())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Load configuration, then let flags override it
    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    let (state, router) = tubedrop_api::setup::initialize_app(config.clone()).await?;

    let mut background = vec![state.downloads.start_best_effort_init()];
    match config.gc_interval() {
        Some(period) => {
            let gc = Arc::new(GarbageCollector::new(state.storage.clone()));
            background.push(gc.start(period, config.gc_max_age()));
        }
        None => tracing::info!("Garbage collection disabled"),
    }

    let served = tubedrop_api::setup::server::start_server(&config, router).await;

    for task in &background {
        task.abort();
    }
    if let Err(e) = state.scratch.clean_up() {
        tracing::warn!(error = %e, "Failed to remove scratch directory");
    }
    tracing::info!(
        abandoned_downloads = state.registry.pending_count().await,
        "Shutdown complete"
    );

    served
}
