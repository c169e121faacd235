pub mod settings;

pub use settings::Settings;

use crate::models::{Channel, Series};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;

/// File name of the channel store inside the library root
pub const CHANNELS_FILE: &str = "channels.json";

/// Store for the watched channels in `channels.json`.
///
/// The whole document is read and written at once: callers load every channel,
/// mutate in memory and save the full list back. Saves go through a sibling
/// temp file that is renamed over the original, so readers never observe a
/// half-written document.
#[derive(Debug, Clone)]
pub struct ChannelStore {
    path: Utf8PathBuf,
}

impl ChannelStore {
    /// Create a store for `channels.json` inside `library_root`
    pub fn new<P: AsRef<Utf8Path>>(library_root: P) -> Self {
        Self::at(library_root.as_ref().join(CHANNELS_FILE))
    }

    /// Create a store backed by an explicit file path
    pub fn at<P: Into<Utf8PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Load all channels. A missing file yields an empty list.
    pub fn load(&self) -> Result<Vec<Channel>> {
        if !self.path.exists() {
            tracing::warn!("Channel store not found at {}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read channel store: {}", self.path))?;

        let channels: Vec<Channel> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse channel store: {}", self.path))?;

        tracing::info!("Loaded {} channels from {}", channels.len(), self.path);
        Ok(channels)
    }

    /// Replace the stored document with `channels`
    pub fn save(&self, channels: &[Channel]) -> Result<()> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        channels
            .serialize(&mut serializer)
            .context("Failed to serialize channels to JSON")?;
        buffer.push(b'\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent))?;
            }
        }

        let temp_path = Utf8PathBuf::from(format!("{}.tmp", self.path));
        fs::write(&temp_path, &buffer)
            .with_context(|| format!("Failed to write channel store: {}", temp_path))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace channel store: {}", self.path))?;

        tracing::info!("Saved {} channels to {}", channels.len(), self.path);
        Ok(())
    }

    /// Append a new channel. Fails without writing if the id is already stored.
    pub fn add_channel(&self, channel: Channel) -> Result<()> {
        let mut channels = self.load()?;
        if channels.iter().any(|c| c.id == channel.id) {
            bail!("Channel id '{}' already exists in {}", channel.id, self.path);
        }

        tracing::info!("Adding channel '{}' ({})", channel.name, channel.id);
        channels.push(channel);
        self.save(&channels)
    }

    /// Append a series to a stored channel and persist right away
    pub fn add_series(&self, channel_id: &str, series: Series) -> Result<()> {
        let mut channels = self.load()?;
        let Some(channel) = channels.iter_mut().find(|c| c.id == channel_id) else {
            bail!("Channel id '{}' not found in {}", channel_id, self.path);
        };

        tracing::info!(
            "Monitoring '{}' in '{}' for channel '{}'",
            series.title_format(),
            series.folder(),
            channel.name
        );
        channel.series_to_check.push(series);
        self.save(&channels)
    }

    /// Whether a channel with this id is already stored
    pub fn contains(&self, channel_id: &str) -> Result<bool> {
        Ok(self.load()?.iter().any(|c| c.id == channel_id))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
