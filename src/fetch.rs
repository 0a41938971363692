use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::{info, warn};

use covertrend::batch::CoverSource;
use covertrend::config::FetchConfig;
use covertrend::CatalogEntry;

/// Retrieval collaborator: resolves catalog image references to raw bytes
/// before the orchestrator runs. The analysis core itself never performs
/// network I/O.
#[derive(Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| format!("failed to build image fetcher: {}", err))?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| format!("image fetch failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("image fetch failed: {}", status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| format!("image fetch failed: {}", err))?;
        if bytes.is_empty() {
            return Err("image fetch returned empty body".to_string());
        }
        info!(url, bytes = bytes.len(), "downloaded cover image");
        Ok(bytes.to_vec())
    }

    /// Resolves every entry's image reference. Fetch failures are logged and
    /// become `None` bytes, which the orchestrator turns into fallback
    /// records; one unreachable image never affects its siblings.
    pub async fn resolve_entries(&self, entries: &[CatalogEntry]) -> Vec<CoverSource> {
        let mut sources = Vec::with_capacity(entries.len());
        for entry in entries {
            let label = entry.entry_id();
            let bytes = match entry.image_reference.as_deref() {
                Some(url) if !url.trim().is_empty() => match self.fetch(url).await {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        warn!(label = %label, error = %err, "cover download failed");
                        None
                    }
                },
                _ => {
                    warn!(label = %label, "entry has no image reference");
                    None
                }
            };
            sources.push(CoverSource { label, bytes });
        }
        sources
    }
}
