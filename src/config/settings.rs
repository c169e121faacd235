use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;

/// Environment variable holding the remote API key
pub const API_KEY_VAR: &str = "YT_API_KEY";

/// Prefix for all other environment overrides, e.g. `YTCACHE_LIBRARY_ROOT`
pub const ENV_PREFIX: &str = "YTCACHE";

/// Process-wide settings, resolved once at startup.
///
/// Layers, lowest priority first: built-in defaults, `YTCACHE_*` environment
/// variables, then `YT_API_KEY`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Shared media root; also holds `channels.json` and the log files
    pub library_root: Utf8PathBuf,

    /// Downloader program to execute
    pub downloader: String,

    /// Container format requested from the downloader
    pub container_format: String,

    /// Base URL of the public channel feed
    pub feed_url: String,

    /// Base URL of the video platform API
    pub api_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub debug: bool,
}

impl Settings {
    /// Resolve settings from the current process environment
    pub fn load() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Resolve settings from an explicit set of environment variables
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let api_key = vars.get(API_KEY_VAR).filter(|k| !k.is_empty()).cloned();

        let config = Config::builder()
            .set_default("library_root", "/data/share")?
            .set_default("downloader", "youtube-dl")?
            .set_default("container_format", "mp4")?
            .set_default("feed_url", "https://www.youtube.com/feeds/videos.xml")?
            .set_default("api_url", "https://youtube.googleapis.com/youtube/v3")?
            .set_default("debug", false)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("api_key", api_key)?
            .build()
            .context("Failed to assemble settings")?;

        config
            .try_deserialize()
            .context("Failed to parse settings")
    }

    /// Path of the channel store
    pub fn channels_path(&self) -> Utf8PathBuf {
        self.library_root.join(crate::config::CHANNELS_FILE)
    }

    /// The API key, or an error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .with_context(|| format!("{} is not set", API_KEY_VAR))
    }
}
