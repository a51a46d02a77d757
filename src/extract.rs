use std::collections::HashMap;

use image::{DynamicImage, GenericImageView, RgbaImage, imageops::FilterType};
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::{color_distance, hex_to_rgb, rgb_to_hex, rgb_triple};
use crate::error::{PaletteError, Result};
use crate::naming::generate_color_name;

pub const MIN_COLORS: usize = 3;
pub const MAX_COLORS: usize = 8;

/// One named swatch of an extracted palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorData {
    /// `#rrggbb`
    pub hex: String,
    /// `"r, g, b"`
    pub rgb: String,
    pub name: String,
    /// Number of sampled pixels that fell into this swatch's bucket.
    pub count: u32,
}

impl ColorData {
    pub fn from_color(color: Srgb<u8>, count: u32) -> Self {
        Self {
            hex: rgb_to_hex(color),
            rgb: rgb_triple(color),
            name: generate_color_name(color),
            count,
        }
    }

    /// The entry's color, decoded from `hex` (malformed hex reads as black).
    pub fn color(&self) -> Srgb<u8> {
        hex_to_rgb(&self.hex)
    }
}

/// Tuning knobs for the bucket extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Requested palette size, clamped to `MIN_COLORS..=MAX_COLORS`.
    pub color_count: usize,
    /// Longest side of the sampling image; larger images are downscaled.
    pub max_dimension: u32,
    /// Sample every n-th pixel.
    pub sample_step: usize,
    /// Pixels with a lower alpha are ignored.
    pub alpha_threshold: u8,
    /// Buckets with this many samples or fewer are discarded as noise.
    pub min_bucket_count: u32,
    /// Candidates kept per requested color.
    pub candidate_factor: usize,
    pub distinct_threshold: f64,
    pub relaxed_threshold: f64,
    pub midtone_min: f64,
    pub midtone_max: f64,
    pub midtone_bucket: u16,
    pub extreme_bucket: u16,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            color_count: 5,
            max_dimension: 600,
            sample_step: 2,
            alpha_threshold: 128,
            min_bucket_count: 3,
            candidate_factor: 4,
            distinct_threshold: 45.0,
            relaxed_threshold: 25.0,
            midtone_min: 40.0,
            midtone_max: 215.0,
            midtone_bucket: 16,
            extreme_bucket: 24,
        }
    }
}

impl ExtractConfig {
    pub fn with_color_count(color_count: usize) -> Self {
        Self {
            color_count,
            ..Self::default()
        }
    }

    pub fn wanted(&self) -> usize {
        self.color_count.clamp(MIN_COLORS, MAX_COLORS)
    }

    fn bucket_size(&self, r: u8, g: u8, b: u8) -> u16 {
        let lightness = (r as f64 + g as f64 + b as f64) / 3.0;
        if (self.midtone_min..=self.midtone_max).contains(&lightness) {
            self.midtone_bucket
        } else {
            self.extreme_bucket
        }
    }
}

/// Running totals for every sample that landed in one bucket.
#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    count: u32,
    sum: [u64; 3],
}

impl Bucket {
    fn add(&mut self, r: u8, g: u8, b: u8) {
        self.count += 1;
        self.sum[0] += r as u64;
        self.sum[1] += g as u64;
        self.sum[2] += b as u64;
    }

    fn average(&self) -> Srgb<u8> {
        let n = self.count.max(1) as u64;
        let avg = |s: u64| ((s + n / 2) / n).min(255) as u8;
        Srgb::new(avg(self.sum[0]), avg(self.sum[1]), avg(self.sum[2]))
    }
}

fn quantize(channel: u8, size: u16) -> u16 {
    let size = size.max(1);
    (channel as f64 / size as f64).round() as u16 * size
}

/// Decode `input` and extract up to `color_count` dominant colors.
pub fn extract_colors(input: &[u8], color_count: usize) -> Result<Vec<ColorData>> {
    extract_colors_with(input, &ExtractConfig::with_color_count(color_count))
}

pub fn extract_colors_with(input: &[u8], config: &ExtractConfig) -> Result<Vec<ColorData>> {
    let img = image::load_from_memory(input).map_err(PaletteError::Decode)?;
    Ok(extract_from_image(&img, config))
}

pub fn extract_from_image(img: &DynamicImage, config: &ExtractConfig) -> Vec<ColorData> {
    let sampling = downscale(img, config.max_dimension);
    extract_from_pixels(sampling.as_raw(), config)
}

/// Extract from an already decoded RGBA surface, e.g. browser `ImageData`.
pub fn extract_from_rgba(
    width: u32,
    height: u32,
    raw: Vec<u8>,
    config: &ExtractConfig,
) -> Result<Vec<ColorData>> {
    let surface = RgbaImage::from_raw(width, height, raw)
        .ok_or(PaletteError::CanvasUnavailable { width, height })?;
    Ok(extract_from_image(&DynamicImage::ImageRgba8(surface), config))
}

/// Resize so the longest side is at most `max_dimension`, keeping the aspect ratio.
pub(crate) fn downscale(img: &DynamicImage, max_dimension: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let longest = w.max(h);
    let rgba = img.to_rgba8();

    if max_dimension == 0 || longest <= max_dimension {
        return rgba;
    }

    let ratio = max_dimension as f32 / longest as f32;
    let down_w = ((w as f32) * ratio).round().max(1.0) as u32;
    let down_h = ((h as f32) * ratio).round().max(1.0) as u32;
    image::imageops::resize(&rgba, down_w, down_h, FilterType::Triangle)
}

/// Run the bucket extractor over a raw RGBA buffer (4 bytes per pixel).
///
/// Returns an empty palette when no bucket survives the noise filter.
pub fn extract_from_pixels(raw: &[u8], config: &ExtractConfig) -> Vec<ColorData> {
    let mut index: HashMap<[u16; 3], usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut sampled = 0usize;

    for px in raw.chunks_exact(4).step_by(config.sample_step.max(1)) {
        let (r, g, b, a) = (px[0], px[1], px[2], px[3]);
        if a < config.alpha_threshold {
            continue;
        }
        sampled += 1;

        let size = config.bucket_size(r, g, b);
        let key = [quantize(r, size), quantize(g, size), quantize(b, size)];
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Bucket::default());
            buckets.len() - 1
        });
        buckets[slot].add(r, g, b);
    }

    let wanted = config.wanted();

    // Stable sort, so equal counts keep discovery order.
    let mut ranked: Vec<Bucket> = buckets
        .into_iter()
        .filter(|b| b.count > config.min_bucket_count)
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(wanted * config.candidate_factor.max(1));

    let candidates: Vec<(Srgb<u8>, u32)> =
        ranked.iter().map(|b| (b.average(), b.count)).collect();

    log::debug!(
        "sampled {sampled} pixels into {} buckets, {} candidates",
        index.len(),
        candidates.len()
    );

    select_distinct(&candidates, wanted, config)
        .into_iter()
        .map(|(color, count)| ColorData::from_color(color, count))
        .collect()
}

/// Greedy pick of up to `wanted` candidates that are far apart from each other.
///
/// A second, relaxed pass fills the palette when the image lacks diversity.
/// The result keeps the candidates' rank order.
fn select_distinct(
    candidates: &[(Srgb<u8>, u32)],
    wanted: usize,
    config: &ExtractConfig,
) -> Vec<(Srgb<u8>, u32)> {
    let mut picked: Vec<usize> = Vec::with_capacity(wanted);

    let far_from_picked = |picked: &[usize], color: Srgb<u8>, threshold: f64| {
        picked
            .iter()
            .all(|&i| color_distance(candidates[i].0, color) > threshold)
    };

    for (i, &(color, _)) in candidates.iter().enumerate() {
        if picked.len() >= wanted {
            break;
        }
        if far_from_picked(&picked, color, config.distinct_threshold) {
            picked.push(i);
        }
    }

    if picked.len() < wanted {
        log::debug!(
            "only {} of {wanted} colors are distinct, relaxing threshold",
            picked.len()
        );
        for (i, &(color, _)) in candidates.iter().enumerate() {
            if picked.len() >= wanted {
                break;
            }
            if picked.iter().any(|&p| candidates[p].0 == color) {
                continue;
            }
            if far_from_picked(&picked, color, config.relaxed_threshold) {
                picked.push(i);
            }
        }
        picked.sort_unstable();
    }

    picked.into_iter().map(|i| candidates[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat((w * h) as usize)
    }

    #[test]
    fn flat_gray_yields_one_entry() {
        let raw = solid(10, 10, [128, 128, 128, 255]);
        let palette = extract_from_pixels(&raw, &ExtractConfig::default());
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].hex, "#808080");
        assert_eq!(palette[0].rgb, "128, 128, 128");
        assert_eq!(palette[0].name, "Cool Gray");
        assert_eq!(palette[0].count, 50);
    }

    #[test]
    fn transparent_image_is_empty() {
        let raw = solid(16, 16, [200, 10, 10, 127]);
        assert!(extract_from_pixels(&raw, &ExtractConfig::default()).is_empty());
    }

    #[test]
    fn tiny_buckets_are_noise() {
        // 6 pixels, 3 samples, all in one bucket: count 3 is not enough
        let raw = solid(3, 2, [10, 200, 10, 255]);
        assert!(extract_from_pixels(&raw, &ExtractConfig::default()).is_empty());
    }

    #[test]
    fn bucket_keeps_true_average() {
        // both shades share the 16-wide bucket centered on 96
        let mut raw = Vec::new();
        for i in 0..40 {
            let v = if i % 4 == 0 { 90 } else { 100 };
            raw.extend_from_slice(&[v, v, v, 255]);
        }
        let palette = extract_from_pixels(&raw, &ExtractConfig::default());
        assert_eq!(palette.len(), 1);
        // samples hit even indices: 10 of value 90, 10 of value 100
        assert_eq!(palette[0].rgb, "95, 95, 95");
    }

    #[test]
    fn orders_by_frequency_then_discovery() {
        let mut raw = Vec::new();
        // red first, then blue, same count; green most frequent
        raw.extend(solid(10, 1, [220, 30, 30, 255]));
        raw.extend(solid(10, 1, [30, 30, 220, 255]));
        raw.extend(solid(20, 1, [30, 200, 30, 255]));
        let palette = extract_from_pixels(&raw, &ExtractConfig::default());
        let hexes: Vec<&str> = palette.iter().map(|c| c.hex.as_str()).collect();
        assert_eq!(hexes, ["#1ec81e", "#dc1e1e", "#1e1edc"]);
        assert_eq!(palette[0].count, 10);
        assert_eq!(palette[1].count, 5);
    }

    #[test]
    fn relaxed_pass_fills_low_diversity_images() {
        // neighbouring shades are 40 apart: under 45, over 25
        let mut raw = Vec::new();
        for (i, g) in [60u8, 80, 100, 120].iter().enumerate() {
            raw.extend(solid(20 - i as u32 * 2, 1, [100, *g, 100, 255]));
        }
        let config = ExtractConfig::with_color_count(4);
        let palette = extract_from_pixels(&raw, &config);
        assert_eq!(palette.len(), 4);
        let counts: Vec<u32> = palette.iter().map(|c| c.count).collect();
        assert_eq!(counts, [10, 9, 8, 7]);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert!(color_distance(a.color(), b.color()) >= 25.0);
            }
        }
    }

    #[test]
    fn rgba_surface_must_match_dimensions() {
        let config = ExtractConfig::default();
        let err = extract_from_rgba(4, 4, vec![0; 10], &config).unwrap_err();
        assert!(matches!(
            err,
            PaletteError::CanvasUnavailable { width: 4, height: 4 }
        ));

        let palette = extract_from_rgba(4, 4, solid(4, 4, [0, 0, 0, 255]), &config).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].name, "Deep Black");
    }

    #[test]
    fn color_count_is_clamped() {
        assert_eq!(ExtractConfig::with_color_count(1).wanted(), MIN_COLORS);
        assert_eq!(ExtractConfig::with_color_count(40).wanted(), MAX_COLORS);
        assert_eq!(ExtractConfig::default().wanted(), 5);
    }

    #[test]
    fn adaptive_bucket_size() {
        let config = ExtractConfig::default();
        assert_eq!(config.bucket_size(128, 128, 128), 16);
        assert_eq!(config.bucket_size(10, 10, 10), 24);
        assert_eq!(config.bucket_size(250, 250, 250), 24);
        assert_eq!(quantize(255, 16), 256);
        assert_eq!(quantize(11, 24), 0);
        assert_eq!(quantize(13, 24), 24);
    }

    #[test]
    fn large_images_are_downscaled() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            1200,
            300,
            image::Rgba([10, 120, 200, 255]),
        ));
        let small = downscale(&img, 600);
        assert_eq!(small.dimensions(), (600, 150));

        let untouched = downscale(&img, 2000);
        assert_eq!(untouched.dimensions(), (1200, 300));
    }

    #[test]
    fn palette_is_pairwise_distinct_on_gradient_image() {
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            image::Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255])
        });
        let config = ExtractConfig::with_color_count(8);
        let palette = extract_from_image(&DynamicImage::ImageRgba8(img), &config);
        assert!(!palette.is_empty());
        assert!(palette.len() <= 8);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert!(color_distance(a.color(), b.color()) >= 25.0);
            }
        }
        assert!(palette.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn config_overrides_and_rejects_unknown_keys() {
        let config: ExtractConfig =
            serde_json::from_str(r#"{"midtone_min": 30.0, "color_count": 7}"#).unwrap();
        assert_eq!(config.midtone_min, 30.0);
        assert_eq!(config.midtone_max, 215.0);
        assert_eq!(config.wanted(), 7);

        assert!(serde_json::from_str::<ExtractConfig>(r#"{"midtone_range": [30, 200]}"#).is_err());
    }
}
