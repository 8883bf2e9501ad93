//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::HubConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `config.log_filter` when set. Calling this more than
/// once is harmless; later calls keep the first subscriber.
pub fn init_tracing(config: &HubConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        tracing::debug!("tracing subscriber already installed: {e}");
    }
}
