use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Set up logging for tests. Honors `RUST_LOG`, and is safe to call from
/// every test.
pub fn setup() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
