use crate::config::ChannelStore;
use crate::models::Channel;
use crate::services::youtube_api::ChannelApi;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static CHANNEL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.youtube\.com/channel/([^/?#]+)").expect("valid channel URL regex")
});

/// Ways registering a channel can fail
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("'{0}' is not a channel URL (expected https://www.youtube.com/channel/<id>)")]
    InvalidUrl(String),

    #[error("The channel ID '{0}' already exists in the config")]
    Duplicate(String),

    #[error("Could not find a channel with the ID '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Extract the channel id from a channel URL
pub fn parse_channel_url(url: &str) -> Option<String> {
    CHANNEL_URL
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Checks that need no remote access: `url` names a channel that is not
/// stored yet. Returns the channel id.
pub fn check_new_channel(store: &ChannelStore, url: &str) -> Result<String, RegistrationError> {
    let channel_id =
        parse_channel_url(url).ok_or_else(|| RegistrationError::InvalidUrl(url.to_string()))?;

    if store.contains(&channel_id)? {
        return Err(RegistrationError::Duplicate(channel_id));
    }
    Ok(channel_id)
}

/// Register the channel behind `url` in `store`.
///
/// Duplicates are detected before any remote lookup, and the store is only
/// written once every check has passed.
pub async fn register_channel<A: ChannelApi>(
    store: &ChannelStore,
    api: &A,
    url: &str,
) -> Result<Channel, RegistrationError> {
    let channel_id = check_new_channel(store, url)?;

    let name = api
        .channel_title(&channel_id)
        .await?
        .ok_or_else(|| RegistrationError::NotFound(channel_id.clone()))?;

    let channel = Channel::new(channel_id, name).map_err(anyhow::Error::from)?;
    store.add_channel(channel.clone())?;

    tracing::info!("Registered channel '{}' ({})", channel.name, channel.id);
    Ok(channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::youtube_api::MockChannelApi;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn store() -> (TempDir, ChannelStore) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, ChannelStore::new(root))
    }

    #[test]
    fn test_parse_channel_url() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/channel/UCabc_-1"),
            Some("UCabc_-1".to_string())
        );
        assert_eq!(
            parse_channel_url("https://www.youtube.com/channel/UCabc/videos"),
            Some("UCabc".to_string())
        );
        assert_eq!(parse_channel_url("https://www.youtube.com/c/Someone"), None);
        assert_eq!(parse_channel_url("https://www.youtube.com/channel/"), None);
    }

    #[test]
    fn test_registers_new_channel() {
        let (_temp_dir, store) = store();
        let mut api = MockChannelApi::new();
        api.expect_channel_title()
            .withf(|id| id == "UCnew")
            .returning(|_| Ok(Some("New Channel".to_string())));

        let channel = tokio_test::block_on(register_channel(
            &store,
            &api,
            "https://www.youtube.com/channel/UCnew",
        ))
        .unwrap();

        assert_eq!(channel.name, "New Channel");
        let stored = store.load().unwrap();
        assert_eq!(stored, vec![channel]);
        assert!(stored[0].series_to_check.is_empty());
    }

    #[test]
    fn test_unknown_channel_is_not_stored() {
        let (_temp_dir, store) = store();
        let mut api = MockChannelApi::new();
        api.expect_channel_title().returning(|_| Ok(None));

        let err = tokio_test::block_on(register_channel(
            &store,
            &api,
            "https://www.youtube.com/channel/UCghost",
        ))
        .unwrap_err();

        assert!(matches!(err, RegistrationError::NotFound(id) if id == "UCghost"));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_check_new_channel_needs_no_api() {
        let (_temp_dir, store) = store();
        store.save(&[Channel::new("UCold", "Old").unwrap()]).unwrap();

        assert_eq!(
            check_new_channel(&store, "https://www.youtube.com/channel/UCnew").unwrap(),
            "UCnew"
        );
        assert!(matches!(
            check_new_channel(&store, "https://www.youtube.com/channel/UCold"),
            Err(RegistrationError::Duplicate(id)) if id == "UCold"
        ));
        assert!(matches!(
            check_new_channel(&store, "https://example.com/UCnew"),
            Err(RegistrationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_url_makes_no_lookup() {
        let (_temp_dir, store) = store();
        let mut api = MockChannelApi::new();
        api.expect_channel_title().never();

        let err = tokio_test::block_on(register_channel(&store, &api, "not a url")).unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidUrl(_)));
    }
}
