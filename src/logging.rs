use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_subscriber() {
    // Sets the default log level from RUST_LOG env var, defaulting to INFO
    // for skylattice if not set.
    // Uses a JSON formatter for structured logging.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "skylattice=info".into()))
        .with(fmt::layer().json()) // Use JSON formatter
        .init();

    tracing::info!("Tracing subscriber initialized.");
}
