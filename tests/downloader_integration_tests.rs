//! Integration tests running a stand-in downloader program
//!
//! These tests verify:
//! - Both output streams are captured, cleaned and logged
//! - A non-zero exit is logged and the id is still recorded as downloaded
//! - Files land in `<root>/<channel>/<series>`

#![cfg(unix)]

use anyhow::Result;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;
use tracing_appender::rolling;
use ytcache::logging;
use ytcache::services::{Downloader, FeedSource, Reconciler, Selector, YoutubeDl};
use ytcache::{Channel, ChannelStore, FeedItem, Series};

struct FixedFeed(Vec<FeedItem>);

#[async_trait]
impl FeedSource for FixedFeed {
    async fn fetch(&self, _channel_id: &str) -> Result<Vec<FeedItem>> {
        Ok(self.0.clone())
    }
}

/// Write an executable script that prints a progress line, complains and exits 1.
/// It also drops `<id>.part` into the `-o` directory; the id is the last argument.
fn write_failing_downloader(dir: &Utf8Path) -> Utf8PathBuf {
    let path = dir.join("fake-dl");
    let script = r#"#!/bin/sh
out=""
while [ $# -gt 1 ]; do
    if [ "$1" = "-o" ]; then out="$2"; fi
    shift
done
touch "$(dirname "$out")/$1.part"
printf '[download]  10.0%%\r\033[K[download] 100.0%%\n'
printf 'ERROR: fake failure for %s\n' "$1" >&2
exit 1
"#;
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_failed_download_is_logged_and_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let program = write_failing_downloader(&root);

    let mut channel = Channel::new("UC1", "Chan").unwrap();
    channel.series_to_check = vec![Series::new("Show", "^Show").unwrap()];
    let feeds = FixedFeed(vec![
        FeedItem::new("abc", "Show 1"),
        FeedItem::new("zzz", "Unrelated"),
    ]);
    let downloader = YoutubeDl::new(program.as_str(), "mp4");
    let reconciler = Reconciler::new(&feeds, &downloader, &root);

    let subscriber = logging::line_subscriber(rolling::never(&root, "test.log"), false);
    let report = tracing::subscriber::with_default(subscriber, || {
        runtime().block_on(reconciler.reconcile(&mut channel))
    })
    .unwrap();

    assert_eq!(report.downloaded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(channel.checked_ids.downloaded, vec!["abc"]);
    assert_eq!(channel.checked_ids.skipped, vec!["zzz"]);
    assert!(root.join("Chan/Show/abc.part").exists());

    let log = fs::read_to_string(root.join("test.log")).unwrap();
    assert!(log.contains("STDOUT ~>\n[download]  10.0%\n[download] 100.0%"));
    assert!(log.contains("STDERR ~>\nERROR: fake failure for abc"));
    assert!(log.contains("command raised a non-zero exit status"));
    assert!(log.contains("No series found for 'Unrelated'"));
}

#[test]
fn test_leading_dash_id_is_downloaded_and_saved() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let program = write_failing_downloader(&root);

    let mut first = Channel::new("UC1", "Chan").unwrap();
    first.series_to_check = vec![Series::new("Show", "^Show").unwrap()];
    let mut channels = vec![first, Channel::new("UC2", "Other").unwrap()];

    let feeds = FixedFeed(vec![FeedItem::new("-AbCdEfGhIj", "Show 1")]);
    let downloader = YoutubeDl::new(program.as_str(), "mp4");
    let reconciler = Reconciler::new(&feeds, &downloader, &root);

    let store = ChannelStore::new(&root);
    runtime()
        .block_on(reconciler.reconcile_all(&mut channels))
        .unwrap();
    store.save(&channels).unwrap();

    assert!(root.join("Chan/Show/-AbCdEfGhIj.part").exists());
    let saved = store.load().unwrap();
    assert_eq!(saved[0].checked_ids.downloaded, vec!["-AbCdEfGhIj"]);
    assert_eq!(saved[1].checked_ids.skipped, vec!["-AbCdEfGhIj"]);
}

#[test]
fn test_missing_program_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let downloader = YoutubeDl::new(root.join("does-not-exist").as_str(), "mp4");

    let result = runtime().block_on(downloader.download(&root, &Selector::Video("abc".into())));

    assert!(result.is_err());
}
