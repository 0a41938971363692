use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;

use crate::clamp01;
use crate::config::EnrichmentConfig;
use crate::enrichment::EnrichmentBlock;

/// Remote inference backend for enrichment. Strictly additive: the pipeline
/// is fully functional without it, and any failure here falls back to the
/// heuristic provider for that single item.
#[derive(Clone)]
pub struct VisionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct AnnotateRequest {
    image: String,
}

impl VisionClient {
    pub fn from_config(config: &EnrichmentConfig) -> Option<Self> {
        if config.endpoint.trim().is_empty() {
            return None;
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub async fn annotate(&self, image_bytes: &[u8]) -> Result<EnrichmentBlock, String> {
        let url = format!("{}/annotate", self.endpoint.trim_end_matches('/'));
        let payload = AnnotateRequest {
            image: STANDARD.encode(image_bytes),
        };
        let mut request = self.client.post(url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|err| format!("vision request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("vision backend error: {}", status));
            }
            return Err(format!("vision backend error: {} {}", status, detail));
        }

        let mut block: EnrichmentBlock = response
            .json()
            .await
            .map_err(|err| format!("vision response parse failed: {}", err))?;
        sanitize(&mut block);
        Ok(block)
    }
}

fn sanitize(block: &mut EnrichmentBlock) {
    block.typography.readability = clamp01(block.typography.readability);
    block.composition.rule_of_thirds = clamp01(block.composition.rule_of_thirds);
    block.composition.focal_strength = clamp01(block.composition.focal_strength);
    block.genre.crossover_potential = clamp01(block.genre.crossover_potential);
    block.artistic.quality_score = clamp01(block.artistic.quality_score);
    block.emotional.warmth = clamp01(block.emotional.warmth);
}
