//! Data models for ytcache.
//!
//! - [`Channel`], [`CheckedIds`] and [`Series`]: the persisted watch list from `channels.json`.
//!   Records are validated when built or deserialized, so a loaded channel always carries
//!   compiled title patterns and usable folder names.
//! - [`FeedItem`]: one entry of a channel's public feed, fetched fresh on every run.
//! - [`Playlist`], [`Video`] and [`Page`]: transient pages of the remote API used by the explorer.

pub mod channel;
pub mod feed;
pub mod remote;

pub use channel::{Channel, CheckedIds, Series, ValidationError, validate_folder};
pub use feed::FeedItem;
pub use remote::{Page, Playlist, Video};
