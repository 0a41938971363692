use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{log10_safe, round2, CatalogEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingInput {
    pub title: String,
    pub rating: Option<f64>,
    pub reviews_count: u64,
    pub bestseller: bool,
    pub amazon_choice: bool,
    pub sales_volume_text: Option<String>,
    pub search_position: u32,
}

impl From<&CatalogEntry> for RankingInput {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            title: entry.title.clone(),
            rating: entry.rating,
            reviews_count: entry.reviews_count,
            bestseller: entry.bestseller,
            amazon_choice: entry.amazon_choice,
            sales_volume_text: entry.sales_volume_text.clone(),
            search_position: entry.rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub input: RankingInput,
    pub trending_score: f64,
    pub rank: u32,
}

/// Ranking inputs for a catalog page. Entries without a scraped rank fall
/// back to their 1-based list position.
pub fn inputs_from_entries(entries: &[CatalogEntry]) -> Vec<RankingInput> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut input = RankingInput::from(entry);
            if input.search_position == 0 {
                input.search_position = index as u32 + 1;
            }
            input
        })
        .collect()
}

/// Deterministic composite popularity signal. Pure function of its input:
/// unparseable fields contribute their zero term, nothing ever errors.
pub fn trending_score(input: &RankingInput) -> f64 {
    let mut score = (20.0 - input.search_position as f64).max(0.0);

    if let Some(rating) = sanitize_rating(input.rating) {
        score += rating * 5.0;
    }

    score += log10_safe(input.reviews_count.max(1) as f64) * 3.0;

    if input.bestseller {
        score += 15.0;
    }
    if input.amazon_choice {
        score += 10.0;
    }

    if let Some(volume) = input
        .sales_volume_text
        .as_deref()
        .and_then(parse_sales_volume)
    {
        score += log10_safe(volume.max(1) as f64) * 2.0;
    }

    round2(score)
}

/// Scores every input, sorts descending, and reassigns 1-based ranks. The
/// sort is stable, so ties keep their original relative order.
pub fn rank(inputs: &[RankingInput]) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = inputs
        .iter()
        .map(|input| RankedEntry {
            trending_score: trending_score(input),
            input: input.clone(),
            rank: 0,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.trending_score
            .partial_cmp(&a.trending_score)
            .unwrap_or(Ordering::Equal)
    });

    for (index, entry) in ranked.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
    ranked
}

fn sanitize_rating(rating: Option<f64>) -> Option<f64> {
    rating
        .filter(|value| value.is_finite() && *value > 0.0)
        .map(|value| value.min(5.0))
}

/// First contiguous run of digits in free text like "500+ bought in past
/// month". Absent when nothing parses.
fn parse_sales_volume(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
