use palette::Srgb;

use crate::error::{PaletteError, Result};

/// Format a color as `#rrggbb` (lowercase, zero padded).
pub fn rgb_to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Format a color as the `"r, g, b"` decimal triple stored in `ColorData::rgb`.
pub fn rgb_triple(color: Srgb<u8>) -> String {
    format!("{}, {}, {}", color.red, color.green, color.blue)
}

/// Parse a 6-digit hex color with an optional leading `#`, case-insensitive.
///
/// Malformed input yields black instead of an error. This lenient behavior is
/// kept for palette entries coming back from the UI; use [`parse_hex`] when the
/// caller needs to know the input was bad.
pub fn hex_to_rgb(hex: &str) -> Srgb<u8> {
    match parse_hex(hex) {
        Ok(color) => color,
        Err(_) => {
            log::warn!("malformed hex color {hex:?}, using black");
            Srgb::new(0, 0, 0)
        }
    }
}

/// Strict variant of [`hex_to_rgb`].
pub fn parse_hex(hex: &str) -> Result<Srgb<u8>> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PaletteError::InvalidHex(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| PaletteError::InvalidHex(hex.to_string()))
    };
    Ok(Srgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Weighted euclidean RGB distance ("redmean" approximation).
///
/// Green is weighted highest and the red/blue weights shift with the mean red
/// intensity of the two colors. This is the only similarity metric used for
/// deciding whether two swatches are the same color.
pub fn color_distance(a: Srgb<u8>, b: Srgb<u8>) -> f64 {
    let r_mean = (a.red as f64 + b.red as f64) / 2.0;
    let dr = a.red as f64 - b.red as f64;
    let dg = a.green as f64 - b.green as f64;
    let db = a.blue as f64 - b.blue as f64;
    ((2.0 + r_mean / 256.0) * dr * dr
        + 4.0 * dg * dg
        + (2.0 + (255.0 - r_mean) / 256.0) * db * db)
        .sqrt()
}

/// HSL hue in degrees, `[0, 360)`. Achromatic colors report `0`.
pub fn get_hue(color: Srgb<u8>) -> f64 {
    let (r, g, b) = normalized(color);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return 0.0;
    }

    let sector = if max == r {
        ((g - b) / delta) % 6.0
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    let hue = sector * 60.0;
    if hue < 0.0 { hue + 360.0 } else { hue }
}

/// HSL saturation and lightness, both in `[0, 1]`.
pub fn saturation_lightness(color: Srgb<u8>) -> (f64, f64) {
    let (r, g, b) = normalized(color);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;

    if max == min {
        return (0.0, lightness);
    }

    let delta = max - min;
    let saturation = if lightness > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    (saturation, lightness)
}

fn normalized(color: Srgb<u8>) -> (f64, f64, f64) {
    (
        color.red as f64 / 255.0,
        color.green as f64 / 255.0,
        color.blue as f64 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_is_lowercase() {
        for hex in ["#2563EB", "7c3aed", "#000000", "FFFFFF", "#0a0B0c"] {
            let expected = format!("#{}", hex.trim_start_matches('#').to_lowercase());
            assert_eq!(rgb_to_hex(hex_to_rgb(hex)), expected);
        }
    }

    #[test]
    fn rgb_to_hex_zero_pads() {
        assert_eq!(rgb_to_hex(Srgb::new(1, 2, 255)), "#0102ff");
    }

    #[test]
    fn malformed_hex_falls_back_to_black() {
        for bad in ["", "#12345", "#1234567", "zzzzzz", "##123456", "#12 456"] {
            assert_eq!(hex_to_rgb(bad), Srgb::new(0, 0, 0), "{bad:?}");
            assert!(parse_hex(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn parse_hex_accepts_both_forms() {
        assert_eq!(parse_hex("#2563eb").unwrap(), Srgb::new(0x25, 0x63, 0xeb));
        assert_eq!(parse_hex("2563EB").unwrap(), Srgb::new(0x25, 0x63, 0xeb));
    }

    #[test]
    fn distance_to_self_is_zero() {
        for c in [Srgb::new(0, 0, 0), Srgb::new(255, 255, 255), Srgb::new(12, 200, 99)] {
            assert_eq!(color_distance(c, c), 0.0);
        }
    }

    #[test]
    fn distance_weights_green_over_blue() {
        let base = Srgb::new(100, 100, 100);
        let green = color_distance(base, Srgb::new(100, 130, 100));
        let blue = color_distance(base, Srgb::new(100, 100, 130));
        assert!(green > blue);
        assert!((green - 60.0).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Srgb::new(220, 30, 30);
        let b = Srgb::new(30, 30, 220);
        assert!((color_distance(a, b) - color_distance(b, a)).abs() < 1e-9);
        assert!(color_distance(Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)) > 700.0);
    }

    #[test]
    fn hue_of_primaries() {
        assert_eq!(get_hue(Srgb::new(255, 0, 0)), 0.0);
        assert!((get_hue(Srgb::new(0, 255, 0)) - 120.0).abs() < 1e-9);
        assert!((get_hue(Srgb::new(0, 0, 255)) - 240.0).abs() < 1e-9);
        assert!((get_hue(Srgb::new(255, 0, 255)) - 300.0).abs() < 1e-9);
        assert_eq!(get_hue(Srgb::new(128, 128, 128)), 0.0);
    }

    #[test]
    fn hue_wraps_negative_sector() {
        // red is max and blue > green, so the raw sector is negative
        let hue = get_hue(Srgb::new(255, 0, 128));
        assert!(hue > 300.0 && hue < 360.0);
    }

    #[test]
    fn saturation_and_lightness() {
        assert_eq!(saturation_lightness(Srgb::new(0, 0, 0)), (0.0, 0.0));
        let (s, l) = saturation_lightness(Srgb::new(255, 0, 0));
        assert!((s - 1.0).abs() < 1e-9);
        assert!((l - 0.5).abs() < 1e-9);
    }
}
