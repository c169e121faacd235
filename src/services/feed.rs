//! Channel feed fetching.
//!
//! Channels publish an Atom feed of their most recent uploads. Each `<entry>`
//! carries the video id in `<yt:videoId>` and the upload title in `<title>`.

use crate::models::FeedItem;
use anyhow::{Context, Result};
use async_trait::async_trait;
use roxmltree::{Document, Node};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const YT_NS: &str = "http://www.youtube.com/xml/schemas/2015";

/// Source of a channel's current feed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource {
    /// Fetch the feed for `channel_id`, in feed order
    async fn fetch(&self, channel_id: &str) -> Result<Vec<FeedItem>>;
}

/// Fetches the public per-channel Atom feed over HTTP
pub struct YouTubeFeed {
    client: reqwest::Client,
    base_url: String,
}

impl YouTubeFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FeedSource for YouTubeFeed {
    async fn fetch(&self, channel_id: &str) -> Result<Vec<FeedItem>> {
        tracing::debug!("Fetching feed {}?channel_id={}", self.base_url, channel_id);

        let body = self
            .client
            .get(&self.base_url)
            .query(&[("channel_id", channel_id)])
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed for channel {}", channel_id))?
            .error_for_status()
            .with_context(|| format!("Feed request rejected for channel {}", channel_id))?
            .text()
            .await
            .context("Failed to read feed body")?;

        parse_feed(&body).with_context(|| format!("Failed to parse feed for channel {}", channel_id))
    }
}

/// Parse an Atom channel feed into items, keeping document order.
///
/// Entries without a video id are dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let doc = Document::parse(xml).context("Feed is not well-formed XML")?;

    let items = doc
        .descendants()
        .filter(|node| is_element(node, ATOM_NS, "entry"))
        .filter_map(|entry| {
            let id = child_text(&entry, YT_NS, "videoId")?;
            let title = child_text(&entry, ATOM_NS, "title").unwrap_or_default();
            let published = child_text(&entry, ATOM_NS, "published");
            let link = entry
                .children()
                .find(|n| is_element(n, ATOM_NS, "link") && n.attribute("rel") == Some("alternate"))
                .and_then(|n| n.attribute("href"))
                .map(str::to_string);

            Some(FeedItem {
                id,
                title,
                published,
                link,
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!("Parsed {} feed entries", items.len());
    Ok(items)
}

fn is_element(node: &Node, namespace: &str, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(namespace)
}

fn child_text(node: &Node, namespace: &str, name: &str) -> Option<String> {
    node.children()
        .find(|n| is_element(n, namespace, name))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
 <title>Some Channel</title>
 <entry>
  <id>yt:video:abc123</id>
  <yt:videoId>abc123</yt:videoId>
  <title>Ep2: The Return</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=abc123"/>
  <published>2026-10-10T12:00:00+00:00</published>
  <media:group><media:title>Ep2: The Return</media:title></media:group>
 </entry>
 <entry>
  <id>yt:video:def456</id>
  <yt:videoId>def456</yt:videoId>
  <title>Ep1: Intro</title>
 </entry>
 <entry>
  <title>No id here</title>
 </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_keeps_order() {
        let items = parse_feed(FEED).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "abc123");
        assert_eq!(items[0].title, "Ep2: The Return");
        assert_eq!(items[0].published.as_deref(), Some("2026-10-10T12:00:00+00:00"));
        assert_eq!(
            items[0].link.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(items[1].id, "def456");
        assert_eq!(items[1].published, None);
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed("<feed><entry>").is_err());
    }

    #[test]
    fn test_parse_empty_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>x</title></feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }
}
