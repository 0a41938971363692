use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::enrichment::EnrichmentMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub per_item_timeout_ms: u64,
    pub batch_deadline_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            per_item_timeout_ms: 3000,
            batch_deadline_ms: 20000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    pub mode: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            mode: "heuristic".to_string(),
            endpoint: String::new(),
            api_key: None,
            timeout_ms: 5000,
        }
    }
}

impl EnrichmentConfig {
    pub fn to_mode(&self) -> EnrichmentMode {
        EnrichmentMode::from_str(&self.mode).unwrap_or(EnrichmentMode::Heuristic)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            max_redirects: 3,
            user_agent: "Mozilla/5.0 (compatible; covertrend/1.0)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub batch: BatchConfig,
    pub enrichment: EnrichmentConfig,
    pub fetch: FetchConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            enrichment: EnrichmentConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                AnalysisConfig::default()
            }
        } else {
            AnalysisConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(mode) = env::var("ENRICHMENT_MODE") {
            if !mode.trim().is_empty() {
                self.enrichment.mode = mode;
            }
        }
        if let Ok(endpoint) = env::var("VISION_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.enrichment.endpoint = endpoint;
            }
        }
        if let Ok(api_key) = env::var("VISION_API_KEY") {
            if !api_key.trim().is_empty() {
                self.enrichment.api_key = Some(api_key);
            }
        }
        if let Ok(timeout) = env::var("VISION_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.enrichment.timeout_ms = value;
            }
        }
        if let Ok(timeout) = env::var("PER_ITEM_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.batch.per_item_timeout_ms = value;
            }
        }
        if let Ok(deadline) = env::var("BATCH_DEADLINE_MS") {
            if let Ok(value) = deadline.parse::<u64>() {
                self.batch.batch_deadline_ms = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ANALYSIS_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/analysis.toml")))
}
