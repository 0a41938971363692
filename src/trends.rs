use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{round2, CoverAnalysis};

/// Population-level statistics reduced from one batch of analyses. Stateless:
/// recomputed fresh on every call, never persisted. Frequency tables use
/// ordered maps so repeated aggregation of the same batch serializes
/// byte-identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub color_themes: BTreeMap<String, usize>,
    pub aspect_ratios: BTreeMap<String, usize>,
    pub font_styles: BTreeMap<String, usize>,
    pub text_placements: BTreeMap<String, usize>,
    pub symmetry_types: BTreeMap<String, usize>,
    pub visual_balance: BTreeMap<String, usize>,
    pub dominant_genres: BTreeMap<String, usize>,
    pub mediums: BTreeMap<String, usize>,
    pub styles: BTreeMap<String, usize>,
    pub eras: BTreeMap<String, usize>,
    pub moods: BTreeMap<String, usize>,
    pub energy_levels: BTreeMap<String, usize>,
    pub average_brightness: u32,
    pub average_contrast: f64,
    pub average_readability: f64,
    pub rule_of_thirds_adherence: f64,
    pub average_crossover_potential: f64,
    pub average_quality_score: f64,
    pub average_warmth: f64,
    pub average_thumbnail_effectiveness: f64,
    pub text_presence: u32,
    pub human_presence: u32,
    pub premium_share: u32,
}

/// Reduces a batch into one `TrendSummary`. Fallback records contribute to
/// the universal statistics exactly like full records; enrichment-derived
/// means count only the analyses that carry an enrichment block. An empty
/// batch yields the all-zero summary.
pub fn aggregate(analyses: &[CoverAnalysis]) -> TrendSummary {
    let mut summary = TrendSummary::default();
    if analyses.is_empty() {
        return summary;
    }

    let total = analyses.len();
    let mut brightness_sum = 0u64;
    let mut contrast_sum = 0.0;
    let mut effectiveness_sum = 0.0;
    let mut with_text = 0usize;

    let mut enriched = 0usize;
    let mut readability_sum = 0.0;
    let mut rule_of_thirds_sum = 0.0;
    let mut crossover_sum = 0.0;
    let mut quality_sum = 0.0;
    let mut warmth_sum = 0.0;
    let mut with_humans = 0usize;
    let mut premium = 0usize;

    for analysis in analyses {
        bump(&mut summary.color_themes, analysis.color_theme.label());
        bump(
            &mut summary.aspect_ratios,
            &format!("{:.2}", analysis.dimensions.aspect_ratio),
        );
        brightness_sum += analysis.brightness as u64;
        contrast_sum += analysis.contrast;
        effectiveness_sum += analysis.effectiveness_score;
        if analysis.text_presence.has_text {
            with_text += 1;
        }

        if let Some(block) = &analysis.enrichment {
            enriched += 1;
            bump(&mut summary.font_styles, &block.typography.font_style);
            bump(
                &mut summary.text_placements,
                &block.typography.text_placement,
            );
            bump(&mut summary.symmetry_types, &block.composition.symmetry);
            bump(
                &mut summary.visual_balance,
                &block.composition.visual_balance,
            );
            bump(&mut summary.dominant_genres, &block.genre.dominant_genre);
            bump(&mut summary.mediums, &block.artistic.medium);
            bump(&mut summary.styles, &block.artistic.style);
            bump(&mut summary.eras, &block.artistic.era);
            bump(&mut summary.moods, &block.emotional.mood);
            bump(&mut summary.energy_levels, &block.emotional.energy);

            readability_sum += block.typography.readability;
            rule_of_thirds_sum += block.composition.rule_of_thirds;
            crossover_sum += block.genre.crossover_potential;
            quality_sum += block.artistic.quality_score;
            warmth_sum += block.emotional.warmth;
            if block.market.human_presence {
                with_humans += 1;
            }
            if block.market.premium {
                premium += 1;
            }
        }
    }

    summary.average_brightness = (brightness_sum as f64 / total as f64).round() as u32;
    summary.average_contrast = round2(contrast_sum / total as f64);
    summary.average_thumbnail_effectiveness = round2(effectiveness_sum / total as f64);
    summary.text_presence = percentage(with_text, total);

    if enriched > 0 {
        summary.average_readability = round2(readability_sum / enriched as f64);
        summary.rule_of_thirds_adherence = round2(rule_of_thirds_sum / enriched as f64);
        summary.average_crossover_potential = round2(crossover_sum / enriched as f64);
        summary.average_quality_score = round2(quality_sum / enriched as f64);
        summary.average_warmth = round2(warmth_sum / enriched as f64);
        summary.human_presence = percentage(with_humans, enriched);
        summary.premium_share = percentage(premium, enriched);
    }

    summary
}

fn bump(table: &mut BTreeMap<String, usize>, key: &str) {
    *table.entry(key.to_string()).or_insert(0) += 1;
}

fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * count as f64 / total as f64).round() as u32
}
