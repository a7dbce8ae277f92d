//! Subscriber setup

use crate::error::TrackerError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// # Errors
/// [`TrackerError::Logging`] if the filter is invalid or a subscriber is
/// already installed
pub fn init_tracing(default_filter: &str, json: bool) -> Result<(), TrackerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| TrackerError::Logging(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.map_err(|e| TrackerError::Logging(e.to_string()))
}
