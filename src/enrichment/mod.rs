pub mod vision;

use serde::{Deserialize, Serialize};

use crate::analysis::BaseAnalysis;
use crate::{clamp01, round2, ColorTheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentMode {
    Off,
    Heuristic,
    Vision,
}

impl EnrichmentMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "off" | "none" => Some(EnrichmentMode::Off),
            "heuristic" | "default" => Some(EnrichmentMode::Heuristic),
            "vision" | "remote" => Some(EnrichmentMode::Vision),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnrichmentMode::Off => "off",
            EnrichmentMode::Heuristic => "heuristic",
            EnrichmentMode::Vision => "vision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypographySignals {
    pub font_style: String,
    pub text_placement: String,
    pub readability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSignals {
    pub rule_of_thirds: f64,
    pub symmetry: String,
    pub visual_balance: String,
    pub focal_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreSignals {
    pub dominant_genre: String,
    pub crossover_potential: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtisticSignals {
    pub medium: String,
    pub style: String,
    pub era: String,
    pub quality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalSignals {
    pub mood: String,
    pub energy: String,
    pub warmth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignals {
    pub premium: bool,
    pub human_presence: bool,
}

/// Higher-level heuristic signals layered on top of the base pixel
/// statistics. Always schema-complete: a record either carries the whole
/// block or no block at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentBlock {
    pub typography: TypographySignals,
    pub composition: CompositionSignals,
    pub genre: GenreSignals,
    pub artistic: ArtisticSignals,
    pub emotional: EmotionalSignals,
    pub market: MarketSignals,
}

const RULE_OF_THIRDS_DEFAULT: f64 = 0.6;
const FOCAL_STRENGTH_DEFAULT: f64 = 0.7;
const READABILITY_WITH_TEXT: f64 = 0.6;
const BRIGHTNESS_BALANCE_MARGIN: u32 = 16;
const QUALITY_STDDEV_SCALE: f64 = 50.0;
const PROFESSIONAL_STDDEV: f64 = 20.0;
const VARIED_CHANNEL_STDDEV: f64 = 30.0;

/// Deterministic default provider: derives every enrichment signal from the
/// already-computed base analysis via fixed lookup tables and pixel
/// statistics. No randomness, no I/O.
pub fn heuristic_block(base: &BaseAnalysis) -> EnrichmentBlock {
    let has_text = base.text_presence.has_text;
    let readability = if has_text { READABILITY_WITH_TEXT } else { 0.0 };
    let quality_score = round2(clamp01(base.stats.mean_stddev() / QUALITY_STDDEV_SCALE));

    EnrichmentBlock {
        typography: TypographySignals {
            font_style: font_style(has_text, base.contrast).to_string(),
            text_placement: text_placement(base).to_string(),
            readability,
        },
        composition: CompositionSignals {
            rule_of_thirds: RULE_OF_THIRDS_DEFAULT,
            symmetry: symmetry(base).to_string(),
            visual_balance: visual_balance(base).to_string(),
            focal_strength: FOCAL_STRENGTH_DEFAULT,
        },
        genre: GenreSignals {
            dominant_genre: theme_genre(base.color_theme).to_string(),
            crossover_potential: 0.5,
        },
        artistic: ArtisticSignals {
            medium: "photography".to_string(),
            style: "realistic".to_string(),
            era: "modern".to_string(),
            quality_score,
        },
        emotional: EmotionalSignals {
            mood: theme_mood(base.color_theme).to_string(),
            energy: if base.swatches.vibrant.is_some() {
                "high".to_string()
            } else {
                "low".to_string()
            },
            warmth: warmth(base),
        },
        market: MarketSignals {
            premium: base.stats.mean_stddev() > PROFESSIONAL_STDDEV
                && readability >= READABILITY_WITH_TEXT,
            human_presence: base.dimensions.aspect_ratio < 1.0
                && base
                    .stats
                    .channel_stddev
                    .iter()
                    .any(|stddev| *stddev > VARIED_CHANNEL_STDDEV),
        },
    }
}

fn theme_mood(theme: ColorTheme) -> &'static str {
    match theme {
        ColorTheme::Dark => "mysterious",
        ColorTheme::Light => "optimistic",
        ColorTheme::Warm => "inviting",
        ColorTheme::Cool => "calm",
        ColorTheme::Romantic => "passionate",
        ColorTheme::Mysterious => "intriguing",
        ColorTheme::Neutral => "neutral",
    }
}

fn theme_genre(theme: ColorTheme) -> &'static str {
    match theme {
        ColorTheme::Dark => "thriller",
        ColorTheme::Light => "literary",
        ColorTheme::Warm => "fantasy",
        ColorTheme::Cool => "sci-fi",
        ColorTheme::Romantic => "romance",
        ColorTheme::Mysterious => "mystery",
        ColorTheme::Neutral => "unknown",
    }
}

fn font_style(has_text: bool, contrast: f64) -> &'static str {
    if !has_text {
        "none"
    } else if contrast >= 7.0 {
        "bold"
    } else if contrast >= 3.0 {
        "serif"
    } else {
        "sans-serif"
    }
}

/// The band whose brightness deviates most from the overall mean is the most
/// likely text carrier.
fn text_placement(base: &BaseAnalysis) -> &'static str {
    if !base.text_presence.has_text {
        return "none";
    }
    let overall = base.brightness as i64;
    let bands = [
        ("top", base.regions.top.brightness as i64),
        ("middle", base.regions.middle.brightness as i64),
        ("bottom", base.regions.bottom.brightness as i64),
    ];
    let mut placement = "top";
    let mut best_deviation = -1i64;
    for (name, brightness) in bands {
        let deviation = (brightness - overall).abs();
        if deviation > best_deviation {
            best_deviation = deviation;
            placement = name;
        }
    }
    placement
}

fn symmetry(base: &BaseAnalysis) -> &'static str {
    let top = base.regions.top.brightness;
    let bottom = base.regions.bottom.brightness;
    if top.abs_diff(bottom) <= BRIGHTNESS_BALANCE_MARGIN {
        "symmetrical"
    } else {
        "asymmetrical"
    }
}

fn visual_balance(base: &BaseAnalysis) -> &'static str {
    let top = base.regions.top.brightness;
    let bottom = base.regions.bottom.brightness;
    // Darker bands read as visually heavier.
    if bottom + BRIGHTNESS_BALANCE_MARGIN < top {
        "bottom-heavy"
    } else if top + BRIGHTNESS_BALANCE_MARGIN < bottom {
        "top-heavy"
    } else {
        "balanced"
    }
}

fn warmth(base: &BaseAnalysis) -> f64 {
    let swatches = base.swatches.named();
    if swatches.is_empty() {
        return 0.0;
    }
    let warm = swatches
        .iter()
        .filter(|swatch| swatch.rgb[0] > swatch.rgb[2])
        .count();
    round2(warm as f64 / swatches.len() as f64)
}
