use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging on stderr so stdout stays free for reports.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("housing_cleaner=info"));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}
