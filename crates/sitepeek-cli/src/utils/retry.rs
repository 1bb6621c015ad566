use std::time::Duration;

use sitepeek_core::{DownloadedAsset, PageFetcher, SitePeek};
use tokio::time::sleep;
use tracing::debug;

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF_MS: u64 = 2_000;

/// Download one asset, retrying transient failures with exponential backoff.
///
/// Retries on connect failures, timeouts, HTTP 429 and 5xx (see
/// [`sitepeek_core::Error::is_recoverable`]). Other errors are returned
/// immediately. `attempts` counts the first try.
pub async fn fetch_with_retries<F: PageFetcher + 'static>(
    peek: &SitePeek<F>,
    url: &str,
    attempts: u32,
    base_delay_ms: u64,
) -> sitepeek_core::Result<DownloadedAsset> {
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        match peek.fetch_asset(url).await {
            Ok(asset) => return Ok(asset),
            Err(e) if e.is_recoverable() && attempt + 1 < attempts => {
                let delay = base_delay_ms
                    .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX))
                    .min(MAX_BACKOFF_MS);
                debug!(
                    "Attempt {} for {url} failed ({e}); retrying in {delay}ms",
                    attempt + 1
                );
                sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            },
            Err(e) => return Err(e),
        }
    }
}
