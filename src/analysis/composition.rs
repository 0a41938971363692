use image::RgbImage;

use crate::analysis::palette;
use crate::{CompositionRegions, RegionAnalysis};

/// Splits the image into three horizontal bands (floor division, the bottom
/// band absorbs any remainder) and runs the dominant-swatch and brightness
/// computation independently per band.
pub fn analyze(image: &RgbImage) -> CompositionRegions {
    let height = image.height();
    let third = height / 3;
    CompositionRegions {
        top: region(image, 0, third),
        middle: region(image, third, third * 2),
        bottom: region(image, third * 2, height),
    }
}

fn region(image: &RgbImage, y0: u32, y1: u32) -> RegionAnalysis {
    let swatches = palette::extract_rows(image, y0, y1);
    RegionAnalysis {
        dominant_color: swatches.dominant.map(|swatch| swatch.hex()),
        brightness: swatches.weighted_brightness(),
    }
}
