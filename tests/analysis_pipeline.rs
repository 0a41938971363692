use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use covertrend::analysis::palette::{Swatch, SwatchSet};
use covertrend::analysis::{self, theme, ExtractionError};
use covertrend::enrichment::heuristic_block;
use covertrend::{AnalysisMethod, ColorTheme};

fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("png encode");
    buffer.into_inner()
}

fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

#[test]
fn solid_color_extraction() {
    let bytes = png_bytes(&solid(60, 90, [255, 0, 0]));
    let base = analysis::extract(&bytes).expect("extract");

    assert_eq!(base.dimensions.width, 60);
    assert_eq!(base.dimensions.height, 90);
    assert!((base.dimensions.aspect_ratio - 0.67).abs() < 1e-6);

    let dominant = base.swatches.dominant.expect("dominant swatch");
    assert_eq!(dominant.hex(), "#ff0000");

    // A single cluster serves as both vibrant and muted, so the luminance
    // ratio collapses to 1.
    assert!((base.contrast - 1.0).abs() < 1e-6);
    assert_eq!(base.brightness, 76);

    // A solid image has zero channel spread: no text.
    assert!(!base.text_presence.has_text);
    assert!((base.text_presence.confidence - 0.3).abs() < 1e-6);
}

#[test]
fn undecodable_bytes_fail_with_decode_error() {
    let result = analysis::extract(b"definitely not an image");
    match result {
        Err(ExtractionError::DecodeFailure(_)) => {}
        other => panic!("expected decode failure, got {:?}", other),
    }
}

#[test]
fn banded_image_composition_regions() {
    let mut image = RgbImage::new(60, 90);
    for (_, y, pixel) in image.enumerate_pixels_mut() {
        *pixel = if y < 30 {
            Rgb([255, 0, 0])
        } else if y < 60 {
            Rgb([0, 255, 0])
        } else {
            Rgb([0, 0, 255])
        };
    }
    let base = analysis::extract(&png_bytes(&image)).expect("extract");

    assert_eq!(
        base.regions.top.dominant_color.as_deref(),
        Some("#ff0000")
    );
    assert_eq!(
        base.regions.middle.dominant_color.as_deref(),
        Some("#00ff00")
    );
    assert_eq!(
        base.regions.bottom.dominant_color.as_deref(),
        Some("#0000ff")
    );
    assert_eq!(base.regions.top.brightness, 76);
    assert_eq!(base.regions.middle.brightness, 150);
    assert_eq!(base.regions.bottom.brightness, 29);

    // Full-range channels trip the text heuristic.
    assert!(base.text_presence.has_text);
    assert!((base.text_presence.confidence - 0.7).abs() < 1e-6);
}

#[test]
fn theme_always_matches_argmax_similarity() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let swatch = |rng: &mut StdRng| Swatch {
            rgb: [rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()],
            population: rng.gen_range(1..500),
        };
        let set = SwatchSet {
            dominant: Some(swatch(&mut rng)),
            vibrant: Some(swatch(&mut rng)),
            muted: Some(swatch(&mut rng)),
            ..SwatchSet::default()
        };

        let mut expected = ColorTheme::Neutral;
        let mut best = 0.0;
        for (theme, score) in theme::scores(&set) {
            if score > best {
                best = score;
                expected = theme;
            }
        }
        assert_eq!(theme::classify(&set), expected);
    }
}

#[test]
fn empty_swatch_set_is_neutral() {
    assert_eq!(theme::classify(&SwatchSet::default()), ColorTheme::Neutral);
}

#[test]
fn contrast_ratio_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let a = [rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()];
        let b = [rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()];
        let forward = theme::contrast_ratio(a, b);
        let backward = theme::contrast_ratio(b, a);
        assert!((forward - backward).abs() < 1e-9);
        assert!(forward >= 1.0);
    }
}

#[test]
fn brightness_stays_in_bounds_for_noise_images() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..10 {
        let mut image = RgbImage::new(64, 64);
        for pixel in image.pixels_mut() {
            *pixel = Rgb([rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()]);
        }
        let base = analysis::extract(&png_bytes(&image)).expect("extract");
        assert!(base.brightness <= 255);
        assert!(base.contrast >= 0.0);
    }
}

#[test]
fn effectiveness_uses_neutral_proxies_without_enrichment() {
    let bytes = png_bytes(&solid(60, 90, [200, 40, 40]));
    let base = analysis::extract(&bytes).expect("extract");
    let contrast = base.contrast;
    let cover = base.into_analysis(None, 3);

    assert_eq!(cover.source_index, 3);
    assert_eq!(cover.analysis_method, AnalysisMethod::Full);
    let expected = analysis::effectiveness_score(0.5, contrast, 0.5);
    assert!((cover.effectiveness_score - expected).abs() < 1e-6);
}

#[test]
fn heuristic_enrichment_is_deterministic() {
    let bytes = png_bytes(&solid(80, 120, [30, 60, 200]));
    let first = heuristic_block(&analysis::extract(&bytes).expect("extract"));
    let second = heuristic_block(&analysis::extract(&bytes).expect("extract"));
    assert_eq!(first, second);
}

#[test]
fn enrichment_proxies_feed_effectiveness() {
    let bytes = png_bytes(&solid(80, 120, [30, 60, 200]));
    let base = analysis::extract(&bytes).expect("extract");
    let contrast = base.contrast;
    let block = heuristic_block(&base);
    let expected = analysis::effectiveness_score(
        block.typography.readability,
        contrast,
        block.composition.focal_strength,
    );

    let cover = base.into_analysis(Some(block), 0);
    assert!((cover.effectiveness_score - expected).abs() < 1e-6);
    assert!(cover.enrichment.is_some());
}
