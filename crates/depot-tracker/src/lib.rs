//! Depot Tracker
//!
//! Service wiring for the depot tracker: TOML configuration, log setup,
//! seed loading and the plain-text depot list.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod seed;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use logging::init_tracing;
pub use report::{render_line, render_list};
pub use seed::{load_seed, parse_seed};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
