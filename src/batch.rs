use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::analysis;
use crate::config::{AnalysisConfig, BatchConfig};
use crate::enrichment::vision::VisionClient;
use crate::enrichment::{heuristic_block, EnrichmentMode};
use crate::CoverAnalysis;

/// One cover to analyze: a display label for logging plus the image bytes
/// already resolved by the retrieval collaborator. `None` bytes mean the
/// fetch failed upstream and the entry goes straight to a fallback record.
#[derive(Debug, Clone)]
pub struct CoverSource {
    pub label: String,
    pub bytes: Option<Vec<u8>>,
}

/// Drives feature extraction over a batch under a per-item timeout and a
/// whole-batch deadline. Output length and order always mirror the input; a
/// fully-failed batch yields all-fallback records, never an error.
#[derive(Clone)]
pub struct BatchOrchestrator {
    batch: BatchConfig,
    mode: EnrichmentMode,
    vision: Option<VisionClient>,
}

impl BatchOrchestrator {
    pub fn new(batch: BatchConfig, mode: EnrichmentMode, vision: Option<VisionClient>) -> Self {
        Self {
            batch,
            mode,
            vision,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mode = config.enrichment.to_mode();
        let vision = if mode == EnrichmentMode::Vision {
            let client = VisionClient::from_config(&config.enrichment);
            if client.is_none() {
                warn!("vision enrichment selected but no endpoint configured, using heuristic");
            }
            client
        } else {
            None
        };
        Self::new(config.batch.clone(), mode, vision)
    }

    pub async fn run(&self, sources: Vec<CoverSource>) -> Vec<CoverAnalysis> {
        let per_item = Duration::from_millis(self.batch.per_item_timeout_ms);
        let deadline = Duration::from_millis(self.batch.batch_deadline_ms);
        let started = Instant::now();
        let total = sources.len();
        info!(total, "starting cover batch analysis");

        let mut analyses = Vec::with_capacity(total);
        for (index, source) in sources.into_iter().enumerate() {
            if started.elapsed() >= deadline {
                warn!(index, label = %source.label, "batch deadline reached, substituting fallback");
                analyses.push(CoverAnalysis::fallback(index));
                continue;
            }

            let Some(bytes) = source.bytes else {
                warn!(index, label = %source.label, "no image bytes available, substituting fallback");
                analyses.push(CoverAnalysis::fallback(index));
                continue;
            };

            match tokio::time::timeout(per_item, self.analyze_one(bytes, index)).await {
                Ok(Ok(analysis)) => {
                    info!(index, label = %source.label, "cover analyzed");
                    analyses.push(analysis);
                }
                Ok(Err(err)) => {
                    warn!(index, label = %source.label, error = %err, "analysis failed, substituting fallback");
                    analyses.push(CoverAnalysis::fallback(index));
                }
                Err(_) => {
                    warn!(index, label = %source.label, "analysis timed out, substituting fallback");
                    analyses.push(CoverAnalysis::fallback(index));
                }
            }
        }

        info!(
            total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cover batch analysis complete"
        );
        analyses
    }

    async fn analyze_one(&self, bytes: Vec<u8>, index: usize) -> Result<CoverAnalysis, String> {
        let vision_bytes = if self.mode == EnrichmentMode::Vision && self.vision.is_some() {
            Some(bytes.clone())
        } else {
            None
        };

        let base = tokio::task::spawn_blocking(move || analysis::extract(&bytes))
            .await
            .map_err(|err| format!("analysis task failed: {}", err))?
            .map_err(|err| err.to_string())?;

        let enrichment = match self.mode {
            EnrichmentMode::Off => None,
            EnrichmentMode::Heuristic => Some(heuristic_block(&base)),
            EnrichmentMode::Vision => match (&self.vision, vision_bytes) {
                (Some(client), Some(payload)) => match client.annotate(&payload).await {
                    Ok(block) => Some(block),
                    Err(err) => {
                        warn!(index, error = %err, "vision enrichment failed, using heuristic");
                        Some(heuristic_block(&base))
                    }
                },
                _ => Some(heuristic_block(&base)),
            },
        };

        Ok(base.into_analysis(enrichment, index))
    }
}
