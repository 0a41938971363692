use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use covertrend::ranking::{RankedEntry, RankingInput};
use covertrend::trends::TrendSummary;
use covertrend::{CatalogEntry, CoverAnalysis};

#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub books: Option<Vec<ApiBook>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRankRequest {
    pub books: Option<Vec<ApiBook>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
    pub rank: Option<u32>,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u64>,
    pub bestseller: Option<bool>,
    pub amazon_choice: Option<bool>,
    pub sales_volume_text: Option<String>,
}

/// Where a book's cover bytes come from: a reference for the retrieval
/// collaborator, inline base64 payload, or nothing at all.
#[derive(Debug)]
pub enum CoverImage {
    Url(String),
    Inline(Vec<u8>),
    Invalid(String),
    Missing,
}

impl ApiBook {
    pub fn into_parts(self, position: usize) -> (CatalogEntry, CoverImage) {
        let image = if let Some(payload) = self.image_base64.as_deref() {
            match STANDARD.decode(payload) {
                Ok(bytes) => CoverImage::Inline(bytes),
                Err(err) => CoverImage::Invalid(format!("invalid base64 image: {}", err)),
            }
        } else if let Some(url) = self.image_url.clone().filter(|url| !url.trim().is_empty()) {
            CoverImage::Url(url)
        } else {
            CoverImage::Missing
        };

        let entry = CatalogEntry {
            title: self
                .title
                .unwrap_or_else(|| format!("untitled #{}", position + 1)),
            author: self.author.unwrap_or_default(),
            image_reference: self.image_url,
            rank: self.rank.unwrap_or(position as u32 + 1),
            price: self.price,
            rating: self.rating,
            reviews_count: self.reviews_count.unwrap_or(0),
            bestseller: self.bestseller.unwrap_or(false),
            amazon_choice: self.amazon_choice.unwrap_or(false),
            sales_volume_text: self.sales_volume_text,
        };
        (entry, image)
    }

    pub fn into_ranking_input(self, position: usize) -> RankingInput {
        let (entry, _) = self.into_parts(position);
        let mut input = RankingInput::from(&entry);
        if input.search_position == 0 {
            input.search_position = position as u32 + 1;
        }
        input
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalyzeResponse {
    pub analyses: Vec<CoverAnalysis>,
    pub trends: TrendSummary,
    pub total_analyzed: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiRankResponse {
    pub ranked: Vec<RankedEntry>,
    pub total_ranked: usize,
}
