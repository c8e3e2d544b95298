use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use pws_core::{RawPayload, SourceDescriptor, WeatherReading, dispatch};
use reqwest::Client;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait PayloadFetcher: Send + Sync + Debug {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<RawPayload>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl PayloadFetcher for HttpFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<RawPayload> {
        let res = self
            .http
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", source.url))?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", source.url))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Request to {} failed with status {}: {}",
                source.url,
                status,
                truncate_body(&String::from_utf8_lossy(&body)),
            ));
        }

        Ok(RawPayload::new(source.clone(), body.to_vec()))
    }
}

/// Fetch and parse one station, trying each candidate URL in turn.
///
/// The first candidate that both fetches and parses wins; if none does, the
/// last error is returned.
pub async fn fetch_reading(
    fetcher: &dyn PayloadFetcher,
    source: &SourceDescriptor,
) -> Result<WeatherReading> {
    let mut last_error = None;

    for candidate in source.candidates() {
        let attempt = match fetcher.fetch(&candidate).await {
            Ok(payload) => dispatch(payload)
                .with_context(|| format!("Failed to parse payload from {}", candidate.url)),
            Err(err) => Err(err),
        };

        match attempt {
            Ok(reading) => {
                debug!(station = %source.name, url = %candidate.url, "Fetched reading");
                return Ok(reading);
            }
            Err(err) => {
                warn!(station = %source.name, url = %candidate.url, "{err:#}");
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("No URL to fetch for station '{}'", source.name)))
}

/// Fetch every source concurrently, one task per station, keeping input order.
pub async fn fetch_all(
    fetcher: Arc<dyn PayloadFetcher>,
    sources: Vec<SourceDescriptor>,
) -> Vec<(SourceDescriptor, Result<WeatherReading>)> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let fetcher = Arc::clone(&fetcher);
            let task_source = source.clone();
            let handle = tokio::spawn(async move {
                fetch_reading(fetcher.as_ref(), &task_source).await
            });
            (source, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (source, handle) in handles {
        let reading = match handle.await {
            Ok(reading) => reading,
            Err(err) => {
                warn!(station = %source.name, "Station task failed: {err}");
                Err(anyhow!("Station task failed: {err}"))
            }
        };
        results.push((source, reading));
    }
    results
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}
