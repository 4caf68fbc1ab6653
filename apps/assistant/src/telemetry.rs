use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ClientConfig;

/// Installs the global structured-logging subscriber.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at the configured
/// level. Returns false if a subscriber was already installed.
pub fn init_tracing(config: &ClientConfig) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
