use crate::models::Channel;
use crate::services::downloader::{Downloader, Selector, series_folder};
use crate::services::feed::FeedSource;
use crate::services::matcher::find_series;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;

/// Counts from reconciling one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub checked: usize,
    pub skipped: usize,
    pub downloaded: usize,
    /// Downloads whose process exited non-zero (still recorded as downloaded)
    pub failed: usize,
}

impl ReconcileReport {
    fn absorb(&mut self, other: ReconcileReport) {
        self.checked += other.checked;
        self.skipped += other.skipped;
        self.downloaded += other.downloaded;
        self.failed += other.failed;
    }
}

/// Brings channels up to date with their feeds.
///
/// New feed items are matched against the channel's series; matches are
/// downloaded into `<library_root>/<channel name>/<series folder>` and every
/// handled id is recorded so it is never looked at again.
pub struct Reconciler<'a, F, D> {
    feeds: &'a F,
    downloader: &'a D,
    library_root: &'a Utf8Path,
}

impl<'a, F: FeedSource, D: Downloader> Reconciler<'a, F, D> {
    pub fn new(feeds: &'a F, downloader: &'a D, library_root: &'a Utf8Path) -> Self {
        Self {
            feeds,
            downloader,
            library_root,
        }
    }

    /// Process every new item of one channel's feed, in feed order
    pub async fn reconcile(&self, channel: &mut Channel) -> Result<ReconcileReport> {
        tracing::info!("Processing channel '{}'", channel.name);

        let feed = self.feeds.fetch(&channel.id).await?;

        let candidates: Vec<_> = {
            let processed = channel.checked_ids.processed();
            feed.into_iter()
                .filter(|item| !processed.contains(item.id.as_str()))
                .collect()
        };
        tracing::info!(
            "Checking a total of {} new videos from '{}' feed",
            candidates.len(),
            channel.name
        );

        let mut report = ReconcileReport::default();
        for item in candidates {
            // A feed listing the same id twice only gets it handled once
            if channel.checked_ids.contains(&item.id) {
                continue;
            }
            report.checked += 1;
            tracing::info!("Checking {}", item.title);

            let Some(series) = find_series(&channel.series_to_check, &item.title) else {
                tracing::info!(
                    "No series found for '{}' -- adding '{}' to skipped",
                    item.title,
                    item.id
                );
                channel.checked_ids.mark_skipped(&item.id);
                report.skipped += 1;
                continue;
            };

            let folder = series_folder(self.library_root, &channel.name, series.folder());
            fs::create_dir_all(&folder)
                .with_context(|| format!("Failed to create series folder: {}", folder))?;

            tracing::info!("Downloading video '{}'", item.title);
            let outcome = self
                .downloader
                .download(&folder, &Selector::Video(item.id.clone()))
                .await?;
            if !outcome.succeeded() {
                report.failed += 1;
            }

            channel.checked_ids.mark_downloaded(&item.id);
            report.downloaded += 1;
        }

        Ok(report)
    }

    /// Reconcile channels one after another.
    ///
    /// The first error stops the run; channels already processed keep their
    /// in-memory updates but nothing is persisted here.
    pub async fn reconcile_all(&self, channels: &mut [Channel]) -> Result<ReconcileReport> {
        let mut total = ReconcileReport::default();
        for channel in channels.iter_mut() {
            let report = self
                .reconcile(channel)
                .await
                .with_context(|| format!("Failed to process channel '{}'", channel.name))?;
            tracing::info!(
                "Finished '{}': {} checked, {} skipped, {} downloaded ({} failed)",
                channel.name,
                report.checked,
                report.skipped,
                report.downloaded,
                report.failed
            );
            total.absorb(report);
        }
        Ok(total)
    }
}
