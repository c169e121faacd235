//! Client for the video platform's data API.
//!
//! Only three resources are used: `channels` (title lookup during
//! registration), `playlists` and `playlistItems` (browsing in the explorer).
//! List responses are paginated with opaque page tokens.

use crate::models::{Page, Playlist, Video};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Playlists requested per page
pub const PLAYLISTS_PER_PAGE: u32 = 100;

/// Playlist items requested per page
pub const VIDEOS_PER_PAGE: u32 = 50;

/// Remote lookups used by registration and the explorer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelApi {
    /// Title of a channel, or `None` if the platform does not know the id
    async fn channel_title(&self, channel_id: &str) -> Result<Option<String>>;

    /// One page of a channel's playlists
    async fn playlists(&self, channel_id: &str, page_token: Option<String>) -> Result<Page<Playlist>>;

    /// One page of the videos in a playlist
    async fn videos(&self, playlist_id: &str, page_token: Option<String>) -> Result<Page<Video>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default)]
    page_info: PageInfo,
    next_page_token: Option<String>,
    prev_page_token: Option<String>,
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    total_results: u32,
    #[serde(default)]
    results_per_page: u32,
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    items: Option<Vec<ChannelResource>>,
}

#[derive(Debug, Deserialize)]
struct ChannelResource {
    snippet: TitleSnippet,
}

#[derive(Debug, Deserialize)]
struct TitleSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistResource {
    id: String,
    snippet: TitleSnippet,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemResource {
    id: String,
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: String,
    #[serde(default)]
    position: u32,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

impl<T> ListResponse<T> {
    fn into_page<U>(self, convert: impl Fn(T) -> U) -> Page<U> {
        Page {
            total: self.page_info.total_results,
            per_page: self.page_info.results_per_page,
            next_page: self.next_page_token.filter(|t| !t.is_empty()),
            prev_page: self.prev_page_token.filter(|t| !t.is_empty()),
            items: self.items.into_iter().map(convert).collect(),
        }
    }
}

fn playlist_page(response: ListResponse<PlaylistResource>) -> Page<Playlist> {
    response.into_page(|p| Playlist {
        id: p.id,
        title: p.snippet.title,
    })
}

fn video_page(response: ListResponse<PlaylistItemResource>) -> Page<Video> {
    response.into_page(|v| Video {
        id: v.snippet.resource_id.video_id,
        playlist_item_id: v.id,
        title: v.snippet.title,
        position: v.snippet.position,
    })
}

/// HTTP implementation of [`ChannelApi`]
pub struct YouTubeApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), resource);
        tracing::debug!("GET {} {:?}", url, params);

        self.client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .header("Content-type", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to call {}", resource))?
            .error_for_status()
            .with_context(|| format!("{} request rejected", resource))?
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode {} response", resource))
    }
}

#[async_trait]
impl ChannelApi for YouTubeApi {
    async fn channel_title(&self, channel_id: &str) -> Result<Option<String>> {
        let response: ChannelsResponse = self
            .get(
                "channels",
                &[
                    ("part", "snippet".to_string()),
                    ("maxResults", "1".to_string()),
                    ("id", channel_id.to_string()),
                ],
            )
            .await?;

        Ok(response
            .items
            .and_then(|items| items.into_iter().next())
            .map(|c| c.snippet.title))
    }

    async fn playlists(&self, channel_id: &str, page_token: Option<String>) -> Result<Page<Playlist>> {
        let response = self
            .get(
                "playlists",
                &[
                    ("part", "id,contentDetails,snippet".to_string()),
                    ("maxResults", PLAYLISTS_PER_PAGE.to_string()),
                    ("pageToken", page_token.unwrap_or_default()),
                    ("channelId", channel_id.to_string()),
                ],
            )
            .await?;
        Ok(playlist_page(response))
    }

    async fn videos(&self, playlist_id: &str, page_token: Option<String>) -> Result<Page<Video>> {
        let response = self
            .get(
                "playlistItems",
                &[
                    ("part", "id,contentDetails,snippet".to_string()),
                    ("maxResults", VIDEOS_PER_PAGE.to_string()),
                    ("pageToken", page_token.unwrap_or_default()),
                    ("playlistId", playlist_id.to_string()),
                ],
            )
            .await?;
        Ok(video_page(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_page_from_json() {
        let json = r#"{
            "kind": "youtube#playlistListResponse",
            "nextPageToken": "CAEQAA",
            "pageInfo": {"totalResults": 3, "resultsPerPage": 2},
            "items": [
                {"id": "PL1", "snippet": {"title": "Season 1"}},
                {"id": "PL2", "snippet": {"title": "Season 2"}}
            ]
        }"#;
        let page = playlist_page(serde_json::from_str(json).unwrap());

        assert_eq!(page.total, 3);
        assert_eq!(page.per_page, 2);
        assert_eq!(page.next_page.as_deref(), Some("CAEQAA"));
        assert!(!page.has_prev());
        assert_eq!(page.items[1].title, "Season 2");
    }

    #[test]
    fn test_video_page_uses_resource_video_id() {
        let json = r#"{
            "prevPageToken": "",
            "pageInfo": {"totalResults": 1, "resultsPerPage": 50},
            "items": [{
                "id": "UExpdGVt",
                "snippet": {"title": "Ep1", "position": 0, "resourceId": {"kind": "youtube#video", "videoId": "vid1"}}
            }]
        }"#;
        let page = video_page(serde_json::from_str(json).unwrap());

        assert!(!page.has_prev());
        assert_eq!(page.items[0].id, "vid1");
        assert_eq!(page.items[0].playlist_item_id, "UExpdGVt");
        assert_eq!(page.items[0].position, 0);
    }

    #[test]
    fn test_unknown_channel_has_no_items() {
        let json = r#"{"kind": "youtube#channelListResponse", "pageInfo": {"totalResults": 0}}"#;
        let response: ChannelsResponse = serde_json::from_str(json).unwrap();
        assert!(response.items.is_none());
    }
}
