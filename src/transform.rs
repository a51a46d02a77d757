//! Warm and cool variants of a palette.
//!
//! Both are plain per-channel scalings of the entries' hex colors. Applying a
//! variant to its own output compounds the shift, so always derive variants
//! from the originally extracted palette.

use palette::Srgb;

use crate::extract::ColorData;

const WARM: [f64; 3] = [1.15, 1.05, 0.85];
const COOL: [f64; 3] = [0.85, 1.05, 1.15];

pub fn generate_warm_palette(colors: &[ColorData]) -> Vec<ColorData> {
    shift_palette(colors, WARM)
}

pub fn generate_cool_palette(colors: &[ColorData]) -> Vec<ColorData> {
    shift_palette(colors, COOL)
}

/// Scale each channel by `factors`, clamp to `0..=255` and rename. Counts and
/// order are preserved.
pub fn shift_palette(colors: &[ColorData], factors: [f64; 3]) -> Vec<ColorData> {
    colors
        .iter()
        .map(|entry| {
            let c = entry.color();
            let scale = |v: u8, f: f64| (v as f64 * f).round().clamp(0.0, 255.0) as u8;
            let shifted = Srgb::new(
                scale(c.red, factors[0]),
                scale(c.green, factors[1]),
                scale(c.blue, factors[2]),
            );
            ColorData::from_color(shifted, entry.count)
        })
        .collect()
}
