//! Interactive explorer for browsing a channel's playlists and videos.
//!
//! The flow moves through three screens: channel, playlist (paged) and video
//! (paged). Picking a page marker re-fetches the same screen with the stored
//! page token; picking an entry moves on. The video screen also offers a
//! 1-indexed range and the whole playlist. The final pick is handed to the
//! downloader. Before that the chosen playlist can be registered as a
//! monitored series of the channel.

pub mod choices;
pub mod prompt;

pub use choices::{PageChoice, VideoChoice, clamp_range, page_choices, parse_range_input, video_choices};
pub use prompt::{Prompter, TerminalPrompter};

use crate::config::ChannelStore;
use crate::models::{Channel, Playlist, Series, Video, validate_folder};
use crate::services::downloader::{DownloadOutcome, Downloader, Selector};
use crate::services::youtube_api::ChannelApi;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("No channels are configured yet; add one first")]
    NoChannels,

    #[error("Selection {0} is out of range")]
    InvalidSelection(usize),
}

/// Terminal pick on the video screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSelection {
    Single(Video),
    All,
    Range { start: u32, count: u32 },
}

impl VideoSelection {
    pub fn into_selector(self, playlist: &Playlist) -> Selector {
        match self {
            VideoSelection::Single(video) => Selector::Video(video.id),
            VideoSelection::All => Selector::Playlist(playlist.id.clone()),
            VideoSelection::Range { start, count } => Selector::Range {
                playlist: playlist.id.clone(),
                start,
                count,
            },
        }
    }
}

/// What an explorer session did
#[derive(Debug, Clone)]
pub struct ExplorerOutcome {
    pub channel: String,
    pub playlist: Playlist,
    pub destination: Utf8PathBuf,
    pub selector: Selector,
    pub monitored: Option<Series>,
    pub download: DownloadOutcome,
}

pub struct Explorer<'a, A, D, P> {
    api: &'a A,
    downloader: &'a D,
    prompter: &'a P,
    store: &'a ChannelStore,
    library_root: &'a Utf8Path,
}

impl<'a, A, D, P> Explorer<'a, A, D, P>
where
    A: ChannelApi,
    D: Downloader,
    P: Prompter,
{
    pub fn new(
        api: &'a A,
        downloader: &'a D,
        prompter: &'a P,
        store: &'a ChannelStore,
        library_root: &'a Utf8Path,
    ) -> Self {
        Self {
            api,
            downloader,
            prompter,
            store,
            library_root,
        }
    }

    /// Run one full session, ending in a download
    pub async fn run(&self) -> Result<ExplorerOutcome> {
        let channel = self.choose_channel()?;
        let channel_folder =
            self.folder_name(&format!("Enter a folder name ({}): ", channel.name), &channel.name)?;

        let playlist = self.choose_playlist(&channel.id).await?;
        let playlist_folder = self.folder_name(
            &format!("Enter a folder name ({}): ", playlist.title),
            &playlist.title,
        )?;

        let monitored = if self
            .prompter
            .confirm("Add this playlist to be monitored?", false)?
        {
            Some(self.monitor(&channel, &playlist_folder)?)
        } else {
            None
        };

        let selector = self.choose_videos(&playlist).await?.into_selector(&playlist);
        let destination = self.library_root.join(&channel_folder).join(&playlist_folder);
        fs::create_dir_all(&destination)
            .with_context(|| format!("Failed to create folder: {}", destination))?;

        self.prompter.notify(&format!(
            "Downloading video(s) from the {} playlist '{}'...",
            channel.name, playlist.title
        ));
        self.prompter.notify("(This may take a very long time!)");
        let download = self.downloader.download(&destination, &selector).await?;
        self.prompter.notify(&format!(
            "Finished downloading video(s)! Check the log in {} for details",
            self.library_root
        ));

        Ok(ExplorerOutcome {
            channel: channel.name,
            playlist,
            destination,
            selector,
            monitored,
            download,
        })
    }

    fn choose_channel(&self) -> Result<Channel> {
        let mut channels = self.store.load()?;
        if channels.is_empty() {
            return Err(ExplorerError::NoChannels.into());
        }

        let names: Vec<String> = channels.iter().map(|c| c.name.clone()).collect();
        self.prompter.clear()?;
        let index = self.prompter.select("Select a Channel:", &names)?;
        if index >= channels.len() {
            return Err(ExplorerError::InvalidSelection(index).into());
        }
        Ok(channels.swap_remove(index))
    }

    fn folder_name(&self, prompt: &str, default: &str) -> Result<String> {
        loop {
            let name = self.prompter.input(prompt, Some(default))?;
            match validate_folder(&name) {
                Ok(()) => return Ok(name),
                Err(e) => self.prompter.notify(&e.to_string()),
            }
        }
    }

    fn monitor(&self, channel: &Channel, folder: &str) -> Result<Series> {
        let series = loop {
            let pattern = self
                .prompter
                .input("What should the regex be for the videos in this playlist?", None)?;
            match Series::new(folder, &pattern) {
                Ok(series) => break series,
                Err(e) => self.prompter.notify(&e.to_string()),
            }
        };

        self.store.add_series(&channel.id, series.clone())?;
        Ok(series)
    }

    async fn choose_playlist(&self, channel_id: &str) -> Result<Playlist> {
        let mut page = self.api.playlists(channel_id, None).await?;
        loop {
            let choices = page_choices(&page);
            let labels: Vec<String> = choices.iter().map(|c| c.label(&page).to_string()).collect();

            self.prompter.clear()?;
            let index = self.prompter.select("Select a Playlist:", &labels)?;
            match choices.get(index) {
                Some(PageChoice::PreviousPage) => {
                    page = self.api.playlists(channel_id, page.prev_page.clone()).await?;
                }
                Some(PageChoice::NextPage) => {
                    page = self.api.playlists(channel_id, page.next_page.clone()).await?;
                }
                Some(PageChoice::Item(i)) => {
                    if let Some(playlist) = page.items.get(*i) {
                        return Ok(playlist.clone());
                    }
                    return Err(ExplorerError::InvalidSelection(index).into());
                }
                None => return Err(ExplorerError::InvalidSelection(index).into()),
            }
        }
    }

    async fn choose_videos(&self, playlist: &Playlist) -> Result<VideoSelection> {
        let mut page = self.api.videos(&playlist.id, None).await?;
        loop {
            let choices = video_choices(&page);
            let labels: Vec<String> = choices.iter().map(|c| c.label(&page).to_string()).collect();

            self.prompter.clear()?;
            let index = self.prompter.select("Select a Video:", &labels)?;
            match choices.get(index) {
                Some(VideoChoice::Range) => {
                    let (start, count) = self.range_input()?;
                    let (start, count) = clamp_range(start, count, page.total);
                    return Ok(VideoSelection::Range { start, count });
                }
                Some(VideoChoice::AllVideos) => return Ok(VideoSelection::All),
                Some(VideoChoice::Page(PageChoice::PreviousPage)) => {
                    page = self.api.videos(&playlist.id, page.prev_page.clone()).await?;
                }
                Some(VideoChoice::Page(PageChoice::NextPage)) => {
                    page = self.api.videos(&playlist.id, page.next_page.clone()).await?;
                }
                Some(VideoChoice::Page(PageChoice::Item(i))) => {
                    if let Some(video) = page.items.get(*i) {
                        return Ok(VideoSelection::Single(video.clone()));
                    }
                    return Err(ExplorerError::InvalidSelection(index).into());
                }
                None => return Err(ExplorerError::InvalidSelection(index).into()),
            }
        }
    }

    fn range_input(&self) -> Result<(i64, i64)> {
        loop {
            let raw = self
                .prompter
                .input("Enter a 1-indexed range ([start],[count]): ", None)?;
            match parse_range_input(&raw) {
                Ok(range) => return Ok(range),
                Err(e) => self.prompter.notify(&e.to_string()),
            }
        }
    }
}
