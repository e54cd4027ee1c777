use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber for driver-level logging. Verbosity is
/// controlled through `RUST_LOG`; without it only warnings and errors are
/// shown. Diagnostics for the assembled program go through the diagnostic
/// context instead.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
