// ytcache - watch video channel feeds and download new episodes of tracked series
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the command line entry points.

pub mod config;
pub mod explorer;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{ChannelStore, Settings};
pub use models::{Channel, CheckedIds, FeedItem, Series};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
