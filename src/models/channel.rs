use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Errors raised when a channel or series record is invalid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Channel id must not be empty")]
    EmptyChannelId,

    #[error("Folder name must not be empty")]
    EmptyFolder,

    #[error("Folder name '{0}' must be a single directory name")]
    NestedFolder(String),

    #[error("Invalid title pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// A watched channel as stored in `channels.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChannelRecord")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub checked_ids: CheckedIds,
    pub series_to_check: Vec<Series>,
}

#[derive(Deserialize)]
struct ChannelRecord {
    id: String,
    name: String,
    #[serde(default)]
    checked_ids: CheckedIds,
    #[serde(default)]
    series_to_check: Vec<Series>,
}

impl TryFrom<ChannelRecord> for Channel {
    type Error = ValidationError;

    fn try_from(record: ChannelRecord) -> Result<Self, Self::Error> {
        let mut channel = Channel::new(record.id, record.name)?;
        channel.checked_ids = record.checked_ids;
        channel.series_to_check = record.series_to_check;
        Ok(channel)
    }
}

impl Channel {
    /// Create a channel with no history and no series
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyChannelId);
        }

        Ok(Self {
            id,
            name: name.into(),
            checked_ids: CheckedIds::default(),
            series_to_check: Vec::new(),
        })
    }
}

/// Item ids a channel has already handled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedIds {
    #[serde(default)]
    pub skipped: Vec<String>,
    #[serde(default)]
    pub downloaded: Vec<String>,
}

impl CheckedIds {
    /// Union of skipped and downloaded ids
    pub fn processed(&self) -> HashSet<&str> {
        self.skipped
            .iter()
            .chain(self.downloaded.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.skipped.iter().any(|s| s == id) || self.downloaded.iter().any(|d| d == id)
    }

    /// Record an id as skipped. Returns false if it was already processed.
    pub fn mark_skipped(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.skipped.push(id.to_string());
        true
    }

    /// Record an id as downloaded. Returns false if it was already processed.
    pub fn mark_downloaded(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.downloaded.push(id.to_string());
        true
    }
}

/// Check that `folder` names exactly one directory
pub fn validate_folder(folder: &str) -> Result<(), ValidationError> {
    if folder.trim().is_empty() {
        return Err(ValidationError::EmptyFolder);
    }
    if folder.contains(['/', '\\']) || folder == "." || folder == ".." {
        return Err(ValidationError::NestedFolder(folder.to_string()));
    }
    Ok(())
}

/// A routing rule: titles matching `title_format` land in `folder`
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "SeriesRecord", into = "SeriesRecord")]
pub struct Series {
    folder: String,
    pattern: Regex,
}

#[derive(Serialize, Deserialize)]
struct SeriesRecord {
    folder: String,
    title_format: String,
}

impl TryFrom<SeriesRecord> for Series {
    type Error = ValidationError;

    fn try_from(record: SeriesRecord) -> Result<Self, Self::Error> {
        Series::new(record.folder, &record.title_format)
    }
}

impl From<Series> for SeriesRecord {
    fn from(series: Series) -> Self {
        SeriesRecord {
            title_format: series.pattern.as_str().to_string(),
            folder: series.folder,
        }
    }
}

impl Series {
    /// Build a series, checking the folder name and compiling the pattern
    pub fn new(folder: impl Into<String>, title_format: &str) -> Result<Self, ValidationError> {
        let folder = folder.into();
        validate_folder(&folder)?;

        let pattern = Regex::new(title_format).map_err(|e| ValidationError::InvalidPattern {
            pattern: title_format.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { folder, pattern })
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn title_format(&self) -> &str {
        self.pattern.as_str()
    }

    /// True when the pattern matches at the very start of `title`.
    ///
    /// The match need not cover the whole title. Leftmost-first search means a
    /// match starting at offset 0 is found whenever one exists.
    pub fn matches(&self, title: &str) -> bool {
        self.pattern.find(title).is_some_and(|m| m.start() == 0)
    }
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.folder == other.folder && self.title_format() == other.title_format()
    }
}

impl fmt::Debug for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Series")
            .field("folder", &self.folder)
            .field("title_format", &self.title_format())
            .finish()
    }
}
