use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "expense_core=info";

/// Initializes the global tracing subscriber with sensible defaults.
///
/// A valid `RUST_LOG` replaces the default `expense_core=info` filter entirely. A
/// subscriber installed earlier by the host is left in place.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok());
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

fn env_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
