use serde::{Deserialize, Serialize};

/// One entry of a channel's public feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub published: Option<String>,
    pub link: Option<String>,
}

impl FeedItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            published: None,
            link: None,
        }
    }
}
