//! In-memory [`PageFetcher`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::fetcher::{FetchLimits, FetchedResource, PageFetcher};
use crate::FetchError;

#[derive(Debug, Clone)]
enum Canned {
    Body {
        content_type: Option<String>,
        body: Vec<u8>,
    },
    Failure(FetchError),
}

/// Serves canned responses keyed by URL. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MapFetcher {
    responses: HashMap<String, Canned>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.body(url, Some("text/html; charset=utf-8"), html.as_bytes())
    }

    pub fn body(mut self, url: &str, content_type: Option<&str>, body: &[u8]) -> Self {
        self.responses.insert(
            url.to_string(),
            Canned::Body {
                content_type: content_type.map(str::to_string),
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn failure(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(url.to_string(), Canned::Failure(error));
        self
    }

    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(
        &self,
        url: &Url,
        _limits: FetchLimits,
    ) -> std::result::Result<FetchedResource, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(url.as_str()) {
            Some(Canned::Body { content_type, body }) => Ok(FetchedResource {
                url: url.clone(),
                content_type: content_type.clone(),
                body: body.clone(),
            }),
            Some(Canned::Failure(error)) => Err(error.clone()),
            None => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
