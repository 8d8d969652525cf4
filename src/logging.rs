/// Initializes structured logging for the application.
///
/// Verbosity is controlled through the `RUST_LOG` environment variable,
/// e.g. `RUST_LOG=pizzeria_pos=debug`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
