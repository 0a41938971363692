pub mod analysis;
pub mod batch;
pub mod config;
pub mod enrichment;
pub mod ranking;
pub mod trends;

use serde::{Deserialize, Serialize};

use crate::enrichment::EnrichmentBlock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image_reference: Option<String>,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews_count: u64,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub amazon_choice: bool,
    #[serde(default)]
    pub sales_volume_text: Option<String>,
}

impl CatalogEntry {
    pub fn entry_id(&self) -> String {
        let payload = format!("{}:{}", self.title, self.author);
        format!("cover_{:x}", stable_hash64(&payload))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    Dark,
    Light,
    Warm,
    Cool,
    Romantic,
    Mysterious,
    Neutral,
}

impl ColorTheme {
    pub fn label(self) -> &'static str {
        match self {
            ColorTheme::Dark => "dark",
            ColorTheme::Light => "light",
            ColorTheme::Warm => "warm",
            ColorTheme::Cool => "cool",
            ColorTheme::Romantic => "romantic",
            ColorTheme::Mysterious => "mysterious",
            ColorTheme::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Full,
    Fallback,
}

impl AnalysisMethod {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMethod::Full => "full",
            AnalysisMethod::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_vibrant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_vibrant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_muted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_muted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_color: Option<String>,
    pub brightness: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRegions {
    pub top: RegionAnalysis,
    pub middle: RegionAnalysis,
    pub bottom: RegionAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextPresence {
    pub has_text: bool,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverAnalysis {
    pub dimensions: Dimensions,
    pub palette: Palette,
    pub color_theme: ColorTheme,
    pub brightness: u32,
    pub contrast: f64,
    pub composition_regions: CompositionRegions,
    pub text_presence: TextPresence,
    pub effectiveness_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentBlock>,
    pub analysis_method: AnalysisMethod,
    pub source_index: usize,
}

impl CoverAnalysis {
    /// Neutral record substituted when extraction fails or times out. All
    /// values are fixed, never randomized.
    pub fn fallback(source_index: usize) -> Self {
        let neutral_region = || RegionAnalysis {
            dominant_color: None,
            brightness: 128,
        };
        Self {
            dimensions: Dimensions {
                width: 300,
                height: 400,
                aspect_ratio: 0.75,
            },
            palette: Palette::default(),
            color_theme: ColorTheme::Neutral,
            brightness: 128,
            contrast: 0.0,
            composition_regions: CompositionRegions {
                top: neutral_region(),
                middle: neutral_region(),
                bottom: neutral_region(),
            },
            text_presence: TextPresence {
                has_text: false,
                confidence: 0.0,
            },
            effectiveness_score: analysis::effectiveness_score(0.5, 0.0, 0.5),
            enrichment: None,
            analysis_method: AnalysisMethod::Fallback,
            source_index,
        }
    }
}

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

pub fn log10_safe(value: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else {
        value.log10()
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
