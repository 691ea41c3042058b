use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "apismoke=info";

/// Logs go to stderr; stdout carries only the report.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
