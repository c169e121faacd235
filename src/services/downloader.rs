use anyhow::{Context, Result};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use thiserror::Error;
use tokio::process::Command;

/// Output template appended to the destination directory
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Errors raised while building a downloader command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty {0} id")]
    EmptyId(&'static str),

    #[error("Invalid {kind} id '{id}'")]
    InvalidId { kind: &'static str, id: String },

    #[error("Range must start at 1 or later and cover at least one item")]
    InvalidRange,

    #[error("Destination folder must not be empty")]
    EmptyDestination,
}

/// What the downloader should fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single video
    Video(String),

    /// Every video in a playlist
    Playlist(String),

    /// `count` videos of a playlist, starting at 1-indexed position `start`
    Range {
        playlist: String,
        start: u32,
        count: u32,
    },
}

impl Selector {
    /// The id handed to the downloader as its final argument
    pub fn target(&self) -> &str {
        match self {
            Selector::Video(id) | Selector::Playlist(id) => id,
            Selector::Range { playlist, .. } => playlist,
        }
    }

    /// Inclusive playlist item spec, e.g. `3-7`
    pub fn item_spec(&self) -> Option<String> {
        match self {
            Selector::Range { start, count, .. } => Some(format!(
                "{}-{}",
                start,
                start.saturating_add(count.saturating_sub(1))
            )),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), CommandError> {
        let kind = match self {
            Selector::Video(_) => "video",
            Selector::Playlist(_) | Selector::Range { .. } => "playlist",
        };
        let id = self.target();

        if id.is_empty() {
            return Err(CommandError::EmptyId(kind));
        }
        // Ids may start with '-'; the command puts them after "--"
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(CommandError::InvalidId {
                kind,
                id: id.to_string(),
            });
        }

        if let Selector::Range { start, count, .. } = self {
            if *start == 0 || *count == 0 || start.checked_add(*count - 1).is_none() {
                return Err(CommandError::InvalidRange);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Video(id) => write!(f, "video {}", id),
            Selector::Playlist(id) => write!(f, "playlist {}", id),
            Selector::Range {
                playlist,
                start,
                count,
            } => write!(f, "{} items of playlist {} from #{}", count, playlist, start),
        }
    }
}

/// A validated downloader invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCommand {
    program: String,
    args: Vec<String>,
}

impl DownloadCommand {
    /// Start building a command for `program`
    pub fn builder(program: impl Into<String>) -> DownloadCommandBuilder {
        DownloadCommandBuilder {
            program: program.into(),
            format: "mp4".to_string(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for DownloadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Builder for [`DownloadCommand`]
#[derive(Debug, Clone)]
pub struct DownloadCommandBuilder {
    program: String,
    format: String,
}

impl DownloadCommandBuilder {
    /// Container format requested with `-f`
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Validate the inputs and produce the final argv
    pub fn build(self, destination: &Utf8Path, selector: &Selector) -> Result<DownloadCommand, CommandError> {
        if destination.as_str().is_empty() {
            return Err(CommandError::EmptyDestination);
        }
        selector.validate()?;

        let mut args = vec![
            "-i".to_string(),
            "-f".to_string(),
            self.format,
            "-o".to_string(),
            destination.join(OUTPUT_TEMPLATE).into_string(),
        ];
        if let Some(spec) = selector.item_spec() {
            args.push("--playlist-items".to_string());
            args.push(spec);
        }
        args.push("--".to_string());
        args.push(selector.target().to_string());

        Ok(DownloadCommand {
            program: self.program,
            args,
        })
    }
}

/// How a downloader run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Succeeded,
    /// Non-zero exit; `None` when the process was killed by a signal
    Failed(Option<i32>),
}

/// Captured result of a downloader run, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub status: DownloadStatus,
    pub stdout: String,
    pub stderr: String,
}

impl DownloadOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == DownloadStatus::Succeeded
    }
}

/// Normalize downloader output for logging.
///
/// Progress lines are redrawn with `\r\x1b[K`; those and bare carriage returns
/// become line breaks, and blank lines are dropped.
pub fn clean_output(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .replace("\r\x1b[K", "\n")
        .replace('\r', "\n")
        .split('\n')
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Log both captured streams of a run
pub fn log_outcome(outcome: &DownloadOutcome) {
    tracing::info!("STDOUT ~>\n{}", outcome.stdout);
    tracing::error!("STDERR ~>\n{}", outcome.stderr);
}

/// Something that can fetch videos into a folder
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader {
    /// Download `selector` into `destination`.
    ///
    /// A non-zero exit is reported through [`DownloadOutcome::status`]; only a
    /// failure to run the program at all is an error.
    async fn download(&self, destination: &Utf8Path, selector: &Selector) -> Result<DownloadOutcome>;
}

/// Runs a youtube-dl compatible program
#[derive(Debug, Clone)]
pub struct YoutubeDl {
    program: String,
    format: String,
}

impl YoutubeDl {
    pub fn new(program: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format: format.into(),
        }
    }

    /// Build the command for a download without running it
    pub fn command(&self, destination: &Utf8Path, selector: &Selector) -> Result<DownloadCommand, CommandError> {
        DownloadCommand::builder(&self.program)
            .format(&self.format)
            .build(destination, selector)
    }
}

#[async_trait]
impl Downloader for YoutubeDl {
    async fn download(&self, destination: &Utf8Path, selector: &Selector) -> Result<DownloadOutcome> {
        let command = self.command(destination, selector)?;
        tracing::info!("Executing {}", command);

        let output = Command::new(command.program())
            .args(command.args())
            .output()
            .await
            .with_context(|| format!("Failed to run '{}'", command.program()))?;

        let status = if output.status.success() {
            DownloadStatus::Succeeded
        } else {
            tracing::error!("'{}' command raised a non-zero exit status", self.program);
            DownloadStatus::Failed(output.status.code())
        };

        let outcome = DownloadOutcome {
            status,
            stdout: clean_output(&output.stdout),
            stderr: clean_output(&output.stderr),
        };
        log_outcome(&outcome);

        Ok(outcome)
    }
}

/// Destination folder for a series of a channel: `<root>/<channel>/<series>`
pub fn series_folder(library_root: &Utf8Path, channel_name: &str, series_folder: &str) -> Utf8PathBuf {
    library_root.join(channel_name).join(series_folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dl() -> YoutubeDl {
        YoutubeDl::new("youtube-dl", "mp4")
    }

    #[test]
    fn test_single_video_command() {
        let cmd = dl()
            .command(Utf8Path::new("/data/share/Chan/Show"), &Selector::Video("abc_123-x".into()))
            .unwrap();

        assert_eq!(cmd.program(), "youtube-dl");
        assert_eq!(
            cmd.args(),
            &["-i", "-f", "mp4", "-o", "/data/share/Chan/Show/%(title)s.%(ext)s", "--", "abc_123-x"]
        );
    }

    #[test]
    fn test_range_command() {
        let selector = Selector::Range {
            playlist: "PL1".into(),
            start: 3,
            count: 5,
        };
        let cmd = dl().command(Utf8Path::new("out"), &selector).unwrap();

        let args = cmd.args();
        let pos = args.iter().position(|a| a == "--playlist-items").unwrap();
        assert_eq!(args[pos + 1], "3-7");
        assert_eq!(args.last().unwrap(), "PL1");
    }

    #[test]
    fn test_playlist_command_has_no_item_spec() {
        let cmd = dl()
            .command(Utf8Path::new("out"), &Selector::Playlist("PL1".into()))
            .unwrap();
        assert!(!cmd.args().iter().any(|a| a == "--playlist-items"));
        assert_eq!(cmd.to_string(), "youtube-dl -i -f mp4 -o out/%(title)s.%(ext)s -- PL1");
    }

    #[test]
    fn test_rejects_unsafe_ids() {
        let out = Utf8Path::new("out");
        assert_eq!(
            dl().command(out, &Selector::Video(String::new())).unwrap_err(),
            CommandError::EmptyId("video")
        );
        assert!(matches!(
            dl().command(out, &Selector::Video("--exec=rm x".into())).unwrap_err(),
            CommandError::InvalidId { .. }
        ));
        assert!(matches!(
            dl().command(out, &Selector::Playlist("a b".into())).unwrap_err(),
            CommandError::InvalidId { .. }
        ));
        assert_eq!(
            dl().command(
                out,
                &Selector::Range {
                    playlist: "PL".into(),
                    start: 0,
                    count: 2
                }
            )
            .unwrap_err(),
            CommandError::InvalidRange
        );
        assert_eq!(
            dl().command(Utf8Path::new(""), &Selector::Video("x".into())).unwrap_err(),
            CommandError::EmptyDestination
        );
    }

    #[test]
    fn test_leading_dash_id_follows_separator() {
        let cmd = dl()
            .command(Utf8Path::new("out"), &Selector::Video("-AbCdEfGhIj".into()))
            .unwrap();

        let args = cmd.args();
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args[args.len() - 1], "-AbCdEfGhIj");
    }

    #[test]
    fn test_range_end_overflow_rejected() {
        let out = Utf8Path::new("out");
        let overflowing = Selector::Range {
            playlist: "PL".into(),
            start: u32::MAX,
            count: 5,
        };
        assert_eq!(dl().command(out, &overflowing).unwrap_err(), CommandError::InvalidRange);

        let last_item = Selector::Range {
            playlist: "PL".into(),
            start: u32::MAX,
            count: 1,
        };
        assert_eq!(
            last_item.item_spec().as_deref(),
            Some(format!("{0}-{0}", u32::MAX).as_str())
        );
        assert!(dl().command(out, &last_item).is_ok());
    }

    #[test]
    fn test_clean_output_strips_redraws() {
        let raw = b"[download]   1.0%\r\x1b[K[download]  50.0%\r\x1b[K[download] 100%\n\nDone\r\n";
        assert_eq!(
            clean_output(raw),
            "[download]   1.0%\n[download]  50.0%\n[download] 100%\nDone"
        );
        assert_eq!(clean_output(b""), "");
    }

    #[test]
    fn test_series_folder() {
        assert_eq!(
            series_folder(Utf8Path::new("/data/share"), "Chan", "Show"),
            Utf8PathBuf::from("/data/share/Chan/Show")
        );
    }
}
