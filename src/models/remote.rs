use serde::{Deserialize, Serialize};

/// A playlist belonging to a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
}

/// A video as listed inside a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// The video's own id, used for downloading
    pub id: String,
    /// The id of the playlist entry wrapping the video
    pub playlist_item_id: String,
    pub title: String,
    pub position: u32,
}

/// One page of a paginated remote collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Size of the whole collection as reported by the remote side
    pub total: u32,
    pub per_page: u32,
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev_page.is_some()
    }
}
