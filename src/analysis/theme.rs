use crate::analysis::palette::{Swatch, SwatchSet};
use crate::{round2, ColorTheme};

// Max possible euclidean distance in RGB space, sqrt(255^2 * 3).
pub const MAX_RGB_DISTANCE: f64 = 441.67;

const REFERENCE_PALETTES: [(ColorTheme, [[u8; 3]; 4]); 6] = [
    (
        ColorTheme::Dark,
        [[0x00, 0x00, 0x00], [0x1a, 0x1a, 0x1a], [0x2d, 0x2d, 0x2d], [0x33, 0x33, 0x33]],
    ),
    (
        ColorTheme::Light,
        [[0xff, 0xff, 0xff], [0xf5, 0xf5, 0xf5], [0xe6, 0xe6, 0xe6], [0xcc, 0xcc, 0xcc]],
    ),
    (
        ColorTheme::Warm,
        [[0xff, 0x6b, 0x35], [0xf7, 0x93, 0x1e], [0xff, 0xd2, 0x3f], [0x06, 0xff, 0xa5]],
    ),
    (
        ColorTheme::Cool,
        [[0x4e, 0xcd, 0xc4], [0x44, 0xa0, 0x8d], [0x09, 0x6d, 0xd9], [0x72, 0x2e, 0xd1]],
    ),
    (
        ColorTheme::Romantic,
        [[0xff, 0x17, 0x44], [0xe9, 0x1e, 0x63], [0x9c, 0x27, 0xb0], [0x67, 0x3a, 0xb7]],
    ),
    (
        ColorTheme::Mysterious,
        [[0x37, 0x47, 0x4f], [0x45, 0x5a, 0x64], [0x54, 0x6e, 0x7a], [0x60, 0x7d, 0x8b]],
    ),
];

pub fn color_similarity(a: [u8; 3], b: [u8; 3]) -> f64 {
    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;
    let distance = (dr * dr + dg * dg + db * db).sqrt();
    (1.0 - distance / MAX_RGB_DISTANCE).max(0.0)
}

/// Per-theme similarity scores for the extracted swatches, in the fixed
/// classification order. Empty when no swatch was extracted.
pub fn scores(swatches: &SwatchSet) -> Vec<(ColorTheme, f64)> {
    let named = swatches.named();
    if named.is_empty() {
        return Vec::new();
    }
    REFERENCE_PALETTES
        .iter()
        .map(|(theme, references)| (*theme, theme_score(&named, references)))
        .collect()
}

pub fn classify(swatches: &SwatchSet) -> ColorTheme {
    let mut best = ColorTheme::Neutral;
    let mut best_score = 0.0;
    for (theme, score) in scores(swatches) {
        if score > best_score {
            best_score = score;
            best = theme;
        }
    }
    best
}

fn theme_score(swatches: &[Swatch], references: &[[u8; 3]; 4]) -> f64 {
    let mut total = 0.0;
    for swatch in swatches {
        for reference in references {
            total += color_similarity(swatch.rgb, *reference);
        }
    }
    total / (swatches.len() * references.len()) as f64
}

/// Relative luminance of a gamma-corrected sRGB color.
pub fn relative_luminance(rgb: [u8; 3]) -> f64 {
    let linear = |channel: u8| {
        let c = channel as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(rgb[0]) + 0.7152 * linear(rgb[1]) + 0.0722 * linear(rgb[2])
}

/// WCAG-style contrast ratio between two colors, rounded to 2 decimals.
/// Symmetric in its arguments since it compares the brighter luminance
/// against the darker one.
pub fn contrast_ratio(a: [u8; 3], b: [u8; 3]) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let brightest = l1.max(l2);
    let darkest = l1.min(l2);
    round2((brightest + 0.05) / (darkest + 0.05))
}
