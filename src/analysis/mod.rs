pub mod composition;
pub mod palette;
pub mod theme;

use std::fmt;

use image::RgbImage;

use crate::analysis::palette::SwatchSet;
use crate::enrichment::EnrichmentBlock;
use crate::{
    clamp01, round2, AnalysisMethod, ColorTheme, CompositionRegions, CoverAnalysis, Dimensions,
    TextPresence,
};

// Any channel spreading wider than this across the image is taken as a
// text-like high-contrast region.
const TEXT_CHANNEL_RANGE: u16 = 100;
const TEXT_CONFIDENCE: f64 = 0.7;
const NO_TEXT_CONFIDENCE: f64 = 0.3;

#[derive(Debug)]
pub enum ExtractionError {
    DecodeFailure(String),
    UnsupportedFormat(String),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::DecodeFailure(detail) => {
                write!(f, "image decode failed: {}", detail)
            }
            ExtractionError::UnsupportedFormat(detail) => {
                write!(f, "unsupported image: {}", detail)
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Per-channel spread and deviation, sampled once during extraction and
/// reused by the text heuristic and the enrichment provider.
#[derive(Debug, Clone, Copy)]
pub struct PixelStats {
    pub channel_range: [u16; 3],
    pub channel_stddev: [f64; 3],
}

impl PixelStats {
    pub fn max_range(&self) -> u16 {
        self.channel_range.iter().copied().max().unwrap_or(0)
    }

    pub fn mean_stddev(&self) -> f64 {
        self.channel_stddev.iter().sum::<f64>() / 3.0
    }
}

#[derive(Debug, Clone)]
pub struct BaseAnalysis {
    pub dimensions: Dimensions,
    pub swatches: SwatchSet,
    pub color_theme: ColorTheme,
    pub brightness: u32,
    pub contrast: f64,
    pub regions: CompositionRegions,
    pub text_presence: TextPresence,
    pub stats: PixelStats,
}

impl BaseAnalysis {
    pub fn into_analysis(
        self,
        enrichment: Option<EnrichmentBlock>,
        source_index: usize,
    ) -> CoverAnalysis {
        let (readability, focal_strength) = enrichment
            .as_ref()
            .map(|block| {
                (
                    block.typography.readability,
                    block.composition.focal_strength,
                )
            })
            .unwrap_or((0.5, 0.5));
        CoverAnalysis {
            dimensions: self.dimensions,
            palette: self.swatches.to_palette(),
            color_theme: self.color_theme,
            brightness: self.brightness,
            contrast: self.contrast,
            composition_regions: self.regions,
            text_presence: self.text_presence,
            effectiveness_score: effectiveness_score(readability, self.contrast, focal_strength),
            enrichment,
            analysis_method: AnalysisMethod::Full,
            source_index,
        }
    }
}

/// Decodes the image bytes and computes the full base analysis. No network
/// I/O happens here; bytes arrive already fetched, and timeouts belong to the
/// batch orchestrator.
pub fn extract(bytes: &[u8]) -> Result<BaseAnalysis, ExtractionError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| ExtractionError::DecodeFailure(err.to_string()))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractionError::UnsupportedFormat(format!(
            "degenerate dimensions {}x{}",
            width, height
        )));
    }

    let stats = pixel_stats(&rgb);
    let swatches = palette::extract(&rgb);
    let contrast = match (swatches.vibrant, swatches.muted) {
        (Some(vibrant), Some(muted)) => theme::contrast_ratio(vibrant.rgb, muted.rgb),
        _ => 0.0,
    };
    let has_text = stats.max_range() > TEXT_CHANNEL_RANGE;

    Ok(BaseAnalysis {
        dimensions: Dimensions {
            width,
            height,
            aspect_ratio: round2(width as f64 / height as f64),
        },
        color_theme: theme::classify(&swatches),
        brightness: swatches.weighted_brightness(),
        contrast,
        regions: composition::analyze(&rgb),
        text_presence: TextPresence {
            has_text,
            confidence: if has_text {
                TEXT_CONFIDENCE
            } else {
                NO_TEXT_CONFIDENCE
            },
        },
        swatches,
        stats,
    })
}

/// Thumbnail effectiveness: readability 40%, normalized contrast 30%, focal
/// strength 30%. Proxies default to 0.5 when no enrichment is attached.
pub fn effectiveness_score(readability: f64, contrast: f64, focal_strength: f64) -> f64 {
    round2(clamp01(
        0.4 * clamp01(readability) + 0.3 * (contrast / 10.0).min(1.0) + 0.3 * clamp01(focal_strength),
    ))
}

fn pixel_stats(image: &RgbImage) -> PixelStats {
    let width = image.width() as usize;
    let total = width * image.height() as usize;
    let stride = total / 10_000 + 1;

    let mut min = [255u8; 3];
    let mut max = [0u8; 3];
    let mut sum = [0f64; 3];
    let mut sum_sq = [0f64; 3];
    let mut samples = 0usize;
    let mut index = 0usize;
    while index < total {
        let x = (index % width) as u32;
        let y = (index / width) as u32;
        let pixel = image.get_pixel(x, y).0;
        for channel in 0..3 {
            let value = pixel[channel];
            min[channel] = min[channel].min(value);
            max[channel] = max[channel].max(value);
            sum[channel] += value as f64;
            sum_sq[channel] += value as f64 * value as f64;
        }
        samples += 1;
        index += stride;
    }

    let mut range = [0u16; 3];
    let mut stddev = [0f64; 3];
    for channel in 0..3 {
        range[channel] = (max[channel] - min[channel]) as u16;
        let mean = sum[channel] / samples as f64;
        let variance = (sum_sq[channel] / samples as f64 - mean * mean).max(0.0);
        stddev[channel] = variance.sqrt();
    }
    PixelStats {
        channel_range: range,
        channel_stddev: stddev,
    }
}
