use std::collections::BTreeMap;

use image::RgbImage;

use crate::Palette;

// Sampling is capped so palette cost stays flat regardless of image size.
const MAX_SAMPLES: usize = 10_000;
// 5 bits per channel, matching common palette quantizers.
const QUANT_SHIFT: u8 = 3;
// A cluster must hold at least 1% of samples to qualify as vibrant/muted.
const MIN_POPULATION_DIVISOR: usize = 100;
// Rec. 601 luma midpoint splitting dark and light swatch variants.
const LUMA_SPLIT: f64 = 128.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub rgb: [u8; 3],
    pub population: usize,
}

impl Swatch {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.rgb[0], self.rgb[1], self.rgb[2])
    }

    pub fn luma(&self) -> f64 {
        0.299 * self.rgb[0] as f64 + 0.587 * self.rgb[1] as f64 + 0.114 * self.rgb[2] as f64
    }

    pub fn saturation(&self) -> f64 {
        let max = self.rgb.iter().copied().max().unwrap_or(0) as f64;
        let min = self.rgb.iter().copied().min().unwrap_or(0) as f64;
        if max <= 0.0 {
            0.0
        } else {
            (max - min) / max
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwatchSet {
    pub dominant: Option<Swatch>,
    pub vibrant: Option<Swatch>,
    pub muted: Option<Swatch>,
    pub dark_vibrant: Option<Swatch>,
    pub light_vibrant: Option<Swatch>,
    pub dark_muted: Option<Swatch>,
    pub light_muted: Option<Swatch>,
}

impl SwatchSet {
    /// Present swatches in declaration order. A cluster selected under more
    /// than one name contributes once per name, matching the per-swatch
    /// weighting of the brightness mean.
    pub fn named(&self) -> Vec<Swatch> {
        [
            self.dominant,
            self.vibrant,
            self.muted,
            self.dark_vibrant,
            self.light_vibrant,
            self.dark_muted,
            self.light_muted,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn to_palette(&self) -> Palette {
        Palette {
            dominant: self.dominant.map(|swatch| swatch.hex()),
            vibrant: self.vibrant.map(|swatch| swatch.hex()),
            muted: self.muted.map(|swatch| swatch.hex()),
            dark_vibrant: self.dark_vibrant.map(|swatch| swatch.hex()),
            light_vibrant: self.light_vibrant.map(|swatch| swatch.hex()),
            dark_muted: self.dark_muted.map(|swatch| swatch.hex()),
            light_muted: self.light_muted.map(|swatch| swatch.hex()),
        }
    }

    /// Population-weighted mean luma over the named swatches, rounded and
    /// clamped to [0, 255]. Returns 0 when no swatch was extracted.
    pub fn weighted_brightness(&self) -> u32 {
        let swatches = self.named();
        let total: usize = swatches.iter().map(|swatch| swatch.population).sum();
        if total == 0 {
            return 0;
        }
        let weighted: f64 = swatches
            .iter()
            .map(|swatch| swatch.luma() * swatch.population as f64)
            .sum();
        (weighted / total as f64).round().clamp(0.0, 255.0) as u32
    }
}

pub fn extract(image: &RgbImage) -> SwatchSet {
    extract_rows(image, 0, image.height())
}

/// Swatch extraction over the row band [y0, y1). Used for both the full image
/// and the composition thirds.
pub fn extract_rows(image: &RgbImage, y0: u32, y1: u32) -> SwatchSet {
    let (clusters, samples) = cluster_rows(image, y0, y1);
    select(&clusters, samples)
}

fn cluster_rows(image: &RgbImage, y0: u32, y1: u32) -> (Vec<Swatch>, usize) {
    let width = image.width() as usize;
    let rows = y1.saturating_sub(y0) as usize;
    let total = width * rows;
    if total == 0 {
        return (Vec::new(), 0);
    }

    let stride = total / MAX_SAMPLES + 1;
    let mut bins: BTreeMap<u16, (usize, [u64; 3])> = BTreeMap::new();
    let mut samples = 0usize;
    let mut index = 0usize;
    while index < total {
        let x = (index % width) as u32;
        let y = y0 + (index / width) as u32;
        let pixel = image.get_pixel(x, y).0;
        let key = ((pixel[0] >> QUANT_SHIFT) as u16) << 10
            | ((pixel[1] >> QUANT_SHIFT) as u16) << 5
            | (pixel[2] >> QUANT_SHIFT) as u16;
        let bin = bins.entry(key).or_insert((0, [0u64; 3]));
        bin.0 += 1;
        for channel in 0..3 {
            bin.1[channel] += pixel[channel] as u64;
        }
        samples += 1;
        index += stride;
    }

    // Bins read out in key order, so every downstream tie-break is stable.
    let clusters = bins
        .values()
        .map(|(count, sums)| Swatch {
            rgb: [
                (sums[0] / *count as u64) as u8,
                (sums[1] / *count as u64) as u8,
                (sums[2] / *count as u64) as u8,
            ],
            population: *count,
        })
        .collect();
    (clusters, samples)
}

fn select(clusters: &[Swatch], samples: usize) -> SwatchSet {
    if clusters.is_empty() {
        return SwatchSet::default();
    }

    let min_population = (samples / MIN_POPULATION_DIVISOR).max(1);
    let qualifying: Vec<Swatch> = clusters
        .iter()
        .copied()
        .filter(|swatch| swatch.population >= min_population)
        .collect();
    let dark: Vec<Swatch> = qualifying
        .iter()
        .copied()
        .filter(|swatch| swatch.luma() < LUMA_SPLIT)
        .collect();
    let light: Vec<Swatch> = qualifying
        .iter()
        .copied()
        .filter(|swatch| swatch.luma() >= LUMA_SPLIT)
        .collect();

    SwatchSet {
        dominant: most_populous(clusters),
        vibrant: most_saturated(&qualifying),
        muted: least_saturated(&qualifying),
        dark_vibrant: most_saturated(&dark),
        light_vibrant: most_saturated(&light),
        dark_muted: least_saturated(&dark),
        light_muted: least_saturated(&light),
    }
}

fn most_populous(candidates: &[Swatch]) -> Option<Swatch> {
    let mut best: Option<Swatch> = None;
    for swatch in candidates {
        if best.map_or(true, |current| swatch.population > current.population) {
            best = Some(*swatch);
        }
    }
    best
}

fn most_saturated(candidates: &[Swatch]) -> Option<Swatch> {
    let mut best: Option<Swatch> = None;
    for swatch in candidates {
        if best.map_or(true, |current| swatch.saturation() > current.saturation()) {
            best = Some(*swatch);
        }
    }
    best
}

fn least_saturated(candidates: &[Swatch]) -> Option<Swatch> {
    let mut best: Option<Swatch> = None;
    for swatch in candidates {
        if best.map_or(true, |current| swatch.saturation() < current.saturation()) {
            best = Some(*swatch);
        }
    }
    best
}
