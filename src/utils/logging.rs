use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `verbose` raises the fallback level to
/// `debug` so every remote call is printed; RUST_LOG still wins when set.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "debug"
    } else {
        crate::utils::consts::LOG_LEVEL
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
