use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing. `RUST_LOG` wins over `default_filter` when set.
pub fn init_telemetry(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(console_fmt)
        .try_init()?;

    tracing::debug!(default_filter = %default_filter, "Tracing initialized");
    Ok(())
}
