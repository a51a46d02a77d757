use image::DynamicImage;
use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, LinSrgb, Srgb};

use crate::error::{PaletteError, Result};
use crate::extract::{ColorData, ExtractConfig, downscale};

const MAX_ITER: usize = 20;
const CONVERGE: f32 = 1e-4;

/// Decode `input` and cluster its opaque pixels with k-means in CIELAB.
///
/// Entries are ordered by cluster population; empty clusters are dropped.
/// The same `seed` always yields the same palette for the same image.
pub fn extract_colors_kmeans(
    input: &[u8],
    config: &ExtractConfig,
    seed: u64,
) -> Result<Vec<ColorData>> {
    let img = image::load_from_memory(input).map_err(PaletteError::Decode)?;
    Ok(kmeans_from_image(&img, config, seed))
}

pub fn kmeans_from_image(img: &DynamicImage, config: &ExtractConfig, seed: u64) -> Vec<ColorData> {
    let sampling = downscale(img, config.max_dimension);

    let lab_pixels: Vec<Lab> = sampling
        .as_raw()
        .chunks_exact(4)
        .step_by(config.sample_step.max(1))
        .filter(|px| px[3] >= config.alpha_threshold)
        .map(|px| {
            let linear: LinSrgb = Srgb::<u8>::new(px[0], px[1], px[2]).into_linear();
            linear.into_color()
        })
        .collect();

    if lab_pixels.is_empty() {
        return Vec::new();
    }

    let k = config.wanted().min(lab_pixels.len());
    let kmeans = get_kmeans(k, MAX_ITER, CONVERGE, false, &lab_pixels, seed);

    let mut population = vec![0u32; kmeans.centroids.len()];
    for &cluster in &kmeans.indices {
        population[cluster as usize] += 1;
    }

    log::debug!(
        "k-means over {} pixels, k = {k}, score {}",
        lab_pixels.len(),
        kmeans.score
    );

    let mut clusters: Vec<(Srgb<u8>, u32)> = kmeans
        .centroids
        .iter()
        .zip(population)
        .filter(|(_, count)| *count > 0)
        .map(|(&lab, count)| {
            let rgb_f32: Srgb<f32> = Srgb::from_linear(lab.into_color());
            (rgb_f32.into_format::<u8>(), count)
        })
        .collect();
    clusters.sort_by(|a, b| b.1.cmp(&a.1));

    clusters
        .into_iter()
        .map(|(color, count)| ColorData::from_color(color, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn three_flat_bands_give_three_clusters() {
        let img = RgbaImage::from_fn(20, 10, |x, _| match x {
            0..10 => Rgba([220, 30, 30, 255]),
            10..16 => Rgba([30, 30, 220, 255]),
            _ => Rgba([30, 200, 30, 255]),
        });
        let config = ExtractConfig::with_color_count(3);
        let palette = kmeans_from_image(&DynamicImage::ImageRgba8(img), &config, 0);

        let counts: Vec<u32> = palette.iter().map(|c| c.count).collect();
        assert_eq!(counts, [50, 30, 20]);
    }

    #[test]
    fn transparent_image_is_empty() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 0]));
        let palette =
            kmeans_from_image(&DynamicImage::ImageRgba8(img), &ExtractConfig::default(), 0);
        assert!(palette.is_empty());
    }
}
