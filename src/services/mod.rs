//! Services module - the business logic behind each command.
//!
//! # Components
//!
//! - [`feed`]: fetches and parses a channel's public Atom feed ([`FeedSource`], [`YouTubeFeed`]).
//! - [`matcher`]: routes a feed item to the first series whose title pattern matches.
//! - [`downloader`]: builds validated downloader command lines and runs them
//!   ([`Downloader`], [`YoutubeDl`]), capturing and logging both output streams.
//! - [`reconciler`]: the periodic check. Fetches each channel's feed, drops ids already
//!   seen, downloads matches and records every handled id as skipped or downloaded.
//! - [`youtube_api`]: paginated playlist/video listings and channel lookups ([`ChannelApi`]).
//! - [`registration`]: adds a channel to the store from its URL.
//!
//! Every external collaborator sits behind a trait so the flows can be exercised
//! without network access or a real downloader.
//!
//! # Usage Example
//!
//! ```ignore
//! use ytcache::services::{Reconciler, YouTubeFeed, YoutubeDl};
//!
//! let feeds = YouTubeFeed::new(&settings.feed_url);
//! let downloader = YoutubeDl::new(&settings.downloader, &settings.container_format);
//! let reconciler = Reconciler::new(&feeds, &downloader, &settings.library_root);
//!
//! let mut channels = store.load()?;
//! reconciler.reconcile_all(&mut channels).await?;
//! store.save(&channels)?;
//! ```

pub mod downloader;
pub mod feed;
pub mod matcher;
pub mod reconciler;
pub mod registration;
pub mod youtube_api;

pub use downloader::{
    CommandError, DownloadCommand, DownloadOutcome, DownloadStatus, Downloader, Selector, YoutubeDl,
};
pub use feed::{FeedSource, YouTubeFeed, parse_feed};
pub use matcher::find_series;
pub use reconciler::{ReconcileReport, Reconciler};
pub use registration::{RegistrationError, check_new_channel, parse_channel_url, register_channel};
pub use youtube_api::{ChannelApi, YouTubeApi};
