//! Bounded-concurrency download of planned bundle entries.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{BundleEntry, BundleEvent, BundleRequest, INDEX_ENTRY, PlannedAsset, SkippedAsset, plan};
use crate::analyzer::{Analyzer, StyleEnrichment};
use crate::config::{Config, MAX_BUNDLE_CONCURRENCY};
use crate::fetcher::{FetchLimits, PageFetcher};
use crate::{Error, Result};

/// Builds bundles with a bounded pool of concurrent asset fetches.
#[derive(Debug)]
pub struct BundleBuilder<F> {
    analyzer: Analyzer<F>,
    fetcher: Arc<F>,
    asset_limits: FetchLimits,
    concurrency: usize,
    deadline: Duration,
}

impl<F: PageFetcher + 'static> BundleBuilder<F> {
    /// Create a builder using the limits in `config`.
    ///
    /// The analysis behind a bundle skips stylesheet enrichment; colors and
    /// fonts are not part of the archive.
    #[must_use]
    pub fn new(fetcher: Arc<F>, config: &Config) -> Self {
        Self {
            analyzer: Analyzer::new(Arc::clone(&fetcher), config)
                .with_enrichment(StyleEnrichment::Disabled),
            fetcher,
            asset_limits: config.fetch.asset_limits(),
            concurrency: config.bundle.effective_concurrency(),
            deadline: config.bundle.deadline(),
        }
    }

    /// Override the number of concurrent asset fetches (clamped to `1..=32`).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_BUNDLE_CONCURRENCY);
        self
    }

    /// Override the outer deadline for asset downloads.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Current concurrency limit.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Analyze the page and start downloading the selected assets.
    ///
    /// Returns as soon as the analysis is done; assets arrive through the
    /// returned [`BundleStream`] as they complete.
    ///
    /// # Errors
    ///
    /// [`Error::AnalysisFailed`] wrapping the analysis error when the page
    /// itself cannot be analyzed.
    pub async fn stream(&self, request: BundleRequest) -> Result<BundleStream> {
        let result = self
            .analyzer
            .analyze(&request.page_url)
            .await
            .map_err(|e| Error::AnalysisFailed(Box::new(e)))?;

        let planned = plan(&result, request.caps);
        info!(
            "Bundling {} with {} assets ({} concurrent)",
            request.page_url,
            planned.len(),
            self.concurrency
        );

        let index = BundleEntry {
            name: INDEX_ENTRY.to_string(),
            bytes: result.html_source.into_bytes(),
        };
        let planned_count = planned.len();
        let (sender, receiver) = mpsc::channel(self.concurrency);
        let task = tokio::spawn(download_all(
            Arc::clone(&self.fetcher),
            planned,
            self.asset_limits,
            self.concurrency,
            sender,
        ));

        Ok(BundleStream {
            index: Some(index),
            receiver,
            task,
            deadline: Instant::now() + self.deadline,
            planned: planned_count,
            timed_out: false,
        })
    }
}

async fn download_all<F: PageFetcher + 'static>(
    fetcher: Arc<F>,
    planned: Vec<PlannedAsset>,
    limits: FetchLimits,
    concurrency: usize,
    sender: mpsc::Sender<BundleEvent>,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let mut downloads = stream::iter(planned)
        .map(|asset| {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&fetcher);

            async move {
                let _permit = semaphore.acquire().await;
                match fetcher.fetch(&asset.reference.url, limits).await {
                    Ok(resource) => BundleEvent::Entry(BundleEntry {
                        name: asset.entry_name,
                        bytes: resource.body,
                    }),
                    Err(error) => BundleEvent::Skipped(SkippedAsset {
                        reference: asset.reference,
                        error,
                    }),
                }
            }
        })
        .buffer_unordered(concurrency);

    while let Some(event) = downloads.next().await {
        if sender.send(event).await.is_err() {
            debug!("Bundle consumer went away; stopping downloads");
            break;
        }
    }
}

/// Entries of a bundle in progress.
///
/// `index.html` is always yielded first. Dropping the stream, or letting
/// its deadline expire, abandons in-flight downloads.
#[derive(Debug)]
pub struct BundleStream {
    index: Option<BundleEntry>,
    receiver: mpsc::Receiver<BundleEvent>,
    task: JoinHandle<()>,
    deadline: Instant,
    planned: usize,
    timed_out: bool,
}

impl BundleStream {
    /// Next entry or skipped asset, or `None` once everything is done or the
    /// deadline has passed.
    pub async fn next_event(&mut self) -> Option<BundleEvent> {
        if let Some(index) = self.index.take() {
            return Some(BundleEvent::Entry(index));
        }
        if self.timed_out {
            return None;
        }

        if let Ok(event) = tokio::time::timeout_at(self.deadline, self.receiver.recv()).await {
            event
        } else {
            warn!("Bundle deadline reached; abandoning remaining downloads");
            self.timed_out = true;
            self.task.abort();
            None
        }
    }

    /// Number of assets selected for download, excluding `index.html`.
    #[must_use]
    pub const fn planned(&self) -> usize {
        self.planned
    }

    /// Whether the deadline cut the stream short.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }
}

impl Drop for BundleStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}
