use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use covertrend::analysis;
use covertrend::batch::{BatchOrchestrator, CoverSource};
use covertrend::config::BatchConfig;
use covertrend::enrichment::{heuristic_block, EnrichmentMode};
use covertrend::ranking::{self, RankingInput};
use covertrend::trends::{self, TrendSummary};
use covertrend::{AnalysisMethod, ColorTheme, CoverAnalysis};

fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_pixel(40, 60, Rgb(color));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("png encode");
    buffer.into_inner()
}

fn source(label: &str, bytes: Option<Vec<u8>>) -> CoverSource {
    CoverSource {
        label: label.to_string(),
        bytes,
    }
}

fn ranking_input(title: &str, position: u32) -> RankingInput {
    RankingInput {
        title: title.to_string(),
        rating: None,
        reviews_count: 0,
        bestseller: false,
        amazon_choice: false,
        sales_volume_text: None,
        search_position: position,
    }
}

#[tokio::test]
async fn batch_preserves_length_and_order() {
    let orchestrator = BatchOrchestrator::new(
        BatchConfig::default(),
        EnrichmentMode::Heuristic,
        None,
    );
    let sources = vec![
        source("valid", Some(png_bytes([120, 40, 40]))),
        source("broken", Some(b"not an image".to_vec())),
        source("unfetched", None),
    ];

    let analyses = orchestrator.run(sources).await;

    assert_eq!(analyses.len(), 3);
    for (index, analysis) in analyses.iter().enumerate() {
        assert_eq!(analysis.source_index, index);
    }
    assert_eq!(analyses[0].analysis_method, AnalysisMethod::Full);
    assert_eq!(analyses[1].analysis_method, AnalysisMethod::Fallback);
    assert_eq!(analyses[2].analysis_method, AnalysisMethod::Fallback);
}

#[tokio::test]
async fn exhausted_deadline_fills_every_entry_with_fallbacks() {
    let config = BatchConfig {
        per_item_timeout_ms: 3000,
        batch_deadline_ms: 0,
    };
    let orchestrator = BatchOrchestrator::new(config, EnrichmentMode::Heuristic, None);
    let sources = vec![
        source("a", Some(png_bytes([10, 10, 10]))),
        source("b", Some(png_bytes([200, 200, 200]))),
        source("c", Some(png_bytes([90, 140, 30]))),
        source("d", Some(png_bytes([30, 90, 140]))),
    ];

    let analyses = orchestrator.run(sources).await;

    assert_eq!(analyses.len(), 4);
    for analysis in &analyses {
        assert_eq!(analysis.analysis_method, AnalysisMethod::Fallback);
        assert_eq!(analysis.color_theme, ColorTheme::Neutral);
    }

    let summary = trends::aggregate(&analyses);
    assert_eq!(summary.color_themes.get("neutral"), Some(&4));
    assert_eq!(summary.average_brightness, 128);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let orchestrator =
        BatchOrchestrator::new(BatchConfig::default(), EnrichmentMode::Off, None);
    let analyses = orchestrator.run(Vec::new()).await;
    assert!(analyses.is_empty());
}

#[test]
fn fallback_records_are_fixed_apart_from_index() {
    let first = CoverAnalysis::fallback(0);
    let second = CoverAnalysis::fallback(5);

    assert_eq!(second.source_index, 5);
    assert_eq!(first.palette, second.palette);
    assert_eq!(first.brightness, second.brightness);
    assert_eq!(first.contrast, second.contrast);
    assert_eq!(first.effectiveness_score, second.effectiveness_score);
    assert!(first.enrichment.is_none());
}

#[test]
fn aggregate_of_empty_batch_is_all_zero() {
    let summary = trends::aggregate(&[]);
    assert_eq!(summary, TrendSummary::default());
    assert_eq!(summary.average_brightness, 0);
    assert_eq!(summary.text_presence, 0);
    assert!(summary.color_themes.is_empty());
}

#[test]
fn text_presence_percentage_counts_whole_batch() {
    let mut analyses: Vec<CoverAnalysis> =
        (0..4usize).map(CoverAnalysis::fallback).collect();
    for analysis in analyses.iter_mut().take(3) {
        analysis.text_presence.has_text = true;
    }

    let summary = trends::aggregate(&analyses);
    assert_eq!(summary.text_presence, 75);
}

#[test]
fn enrichment_means_use_carriers_only() {
    let bytes = png_bytes([40, 80, 160]);
    let base = analysis::extract(&bytes).expect("extract");
    let block = heuristic_block(&base);
    let readability = block.typography.readability;
    let enriched = base.into_analysis(Some(block), 0);

    let analyses = vec![enriched, CoverAnalysis::fallback(1)];
    let summary = trends::aggregate(&analyses);

    // The fallback record carries no enrichment, so it stays out of the
    // enrichment denominators while still counting toward the batch-wide
    // statistics.
    assert!((summary.average_readability - readability).abs() < 1e-6);
    assert_eq!(summary.mediums.get("photography"), Some(&1));
    assert_eq!(summary.color_themes.values().sum::<usize>(), 2);
}

#[test]
fn aggregate_is_idempotent() {
    let bytes = png_bytes([170, 60, 20]);
    let base = analysis::extract(&bytes).expect("extract");
    let block = heuristic_block(&base);
    let analyses = vec![
        base.into_analysis(Some(block), 0),
        CoverAnalysis::fallback(1),
        CoverAnalysis::fallback(2),
    ];

    let first = serde_json::to_string(&trends::aggregate(&analyses)).expect("serialize");
    let second = serde_json::to_string(&trends::aggregate(&analyses)).expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn trending_score_matches_reference_values() {
    let mut input = ranking_input("a", 1);
    input.rating = Some(4.5);
    input.reviews_count = 100;
    let score_a = ranking::trending_score(&input);
    assert!((score_a - 47.5).abs() < 1e-6);

    let mut boosted = input.clone();
    boosted.title = "b".to_string();
    boosted.bestseller = true;
    let score_b = ranking::trending_score(&boosted);
    assert!((score_b - 62.5).abs() < 1e-6);

    let ranked = ranking::rank(&[input, boosted]);
    assert_eq!(ranked[0].input.title, "b");
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].rank, 2);
}

#[test]
fn more_reviews_never_lower_the_score() {
    let mut previous = f64::MIN;
    for reviews in [0u64, 1, 10, 100, 5_000, 250_000] {
        let mut input = ranking_input("monotonic", 5);
        input.reviews_count = reviews;
        let score = ranking::trending_score(&input);
        assert!(score >= previous);
        previous = score;
    }
}

#[test]
fn sales_volume_text_parses_first_digit_run() {
    let mut with_sales = ranking_input("sales", 30);
    with_sales.sales_volume_text = Some("500+ bought in past month".to_string());
    let mut without_sales = ranking_input("sales", 30);
    without_sales.sales_volume_text = Some("no numbers here".to_string());

    let lift = ranking::trending_score(&with_sales) - ranking::trending_score(&without_sales);
    let expected = (500f64).log10() * 2.0;
    assert!((lift - expected).abs() < 0.01);

    let none = ranking_input("sales", 30);
    assert!(
        (ranking::trending_score(&without_sales) - ranking::trending_score(&none)).abs() < 1e-6
    );
}

#[test]
fn garbage_rating_is_treated_as_absent() {
    let clean = ranking_input("garbage", 2);
    let mut nan_rating = clean.clone();
    nan_rating.rating = Some(f64::NAN);
    let mut negative_rating = clean.clone();
    negative_rating.rating = Some(-3.0);

    let baseline = ranking::trending_score(&clean);
    assert!((ranking::trending_score(&nan_rating) - baseline).abs() < 1e-6);
    assert!((ranking::trending_score(&negative_rating) - baseline).abs() < 1e-6);

    let mut inflated = clean.clone();
    inflated.rating = Some(99.0);
    // Ratings are bounded to the 0-5 scale before weighting.
    assert!((ranking::trending_score(&inflated) - (baseline + 25.0)).abs() < 1e-6);
}

#[test]
fn ties_keep_original_order() {
    let first = ranking_input("first", 25);
    let second = ranking_input("second", 25);
    let ranked = ranking::rank(&[first, second]);

    assert_eq!(ranked[0].input.title, "first");
    assert_eq!(ranked[1].input.title, "second");
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].rank, 2);
}
