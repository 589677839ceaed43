use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
/// Logs go to stderr so stdout stays parseable in JSON mode.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "billing_notify=debug,info"
    } else {
        "billing_notify=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
