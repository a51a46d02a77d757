use palette::Srgb;

use crate::color::{get_hue, saturation_lightness};

/// Colors below this saturation are named by lightness alone.
const ACHROMATIC_SATURATION: f64 = 0.1;

/// Grayscale names, indexed by lightness upper bound.
const GRAYS: [(f64, &str); 6] = [
    (0.1, "Deep Black"),
    (0.3, "Charcoal"),
    (0.6, "Cool Gray"),
    (0.8, "Light Gray"),
    (0.95, "Off White"),
    (f64::INFINITY, "Pure White"),
];

/// Hue bands as `(upper bound in degrees, name)`. Red wraps around 345°.
const HUES: [(f64, &str); 17] = [
    (15.0, "Red"),
    (30.0, "Red-Orange"),
    (45.0, "Orange"),
    (60.0, "Golden"),
    (75.0, "Yellow"),
    (105.0, "Lime"),
    (135.0, "Green"),
    (165.0, "Teal"),
    (195.0, "Cyan"),
    (210.0, "Sky Blue"),
    (240.0, "Blue"),
    (260.0, "Indigo"),
    (285.0, "Purple"),
    (315.0, "Magenta"),
    (330.0, "Pink"),
    (345.0, "Rose"),
    (f64::INFINITY, "Red"),
];

/// Human-readable name for a color, derived only from its HSL components.
///
/// Near-gray colors get one of six lightness names. Everything else is an
/// intensity qualifier followed by a hue band, e.g. `"Vibrant Blue"`.
pub fn generate_color_name(color: Srgb<u8>) -> String {
    let (saturation, lightness) = saturation_lightness(color);

    if saturation < ACHROMATIC_SATURATION {
        return band(&GRAYS, lightness).to_string();
    }

    let hue = band(&HUES, get_hue(color));
    match intensity(saturation, lightness) {
        "" => hue.to_string(),
        qualifier => format!("{qualifier} {hue}"),
    }
}

fn intensity(saturation: f64, lightness: f64) -> &'static str {
    let (dark, mid, light) = if saturation >= 0.6 {
        ("Deep", "Vibrant", "Bright")
    } else if saturation >= 0.3 {
        ("Dark", "", "Pale")
    } else {
        return "Muted";
    };

    if lightness < 0.35 {
        dark
    } else if lightness > 0.7 {
        light
    } else {
        mid
    }
}

fn band(bands: &[(f64, &'static str)], value: f64) -> &'static str {
    bands
        .iter()
        .find(|(upper, _)| value < *upper)
        .map(|(_, name)| *name)
        .unwrap_or(bands[bands.len() - 1].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(r: u8, g: u8, b: u8) -> String {
        generate_color_name(Srgb::new(r, g, b))
    }

    #[test]
    fn grays_by_lightness() {
        assert_eq!(name(0, 0, 0), "Deep Black");
        assert_eq!(name(50, 50, 50), "Charcoal");
        assert_eq!(name(128, 128, 128), "Cool Gray");
        assert_eq!(name(180, 180, 180), "Light Gray");
        assert_eq!(name(230, 230, 230), "Off White");
        assert_eq!(name(255, 255, 255), "Pure White");
    }

    #[test]
    fn saturated_midtones_are_vibrant() {
        assert_eq!(name(0x25, 0x63, 0xeb), "Vibrant Blue");
        assert_eq!(name(0x7c, 0x3a, 0xed), "Vibrant Purple");
        assert_eq!(name(255, 0, 0), "Vibrant Red");
        assert_eq!(name(0, 255, 0), "Vibrant Green");
    }

    #[test]
    fn lightness_qualifiers() {
        assert_eq!(name(120, 0, 0), "Deep Red");
        assert_eq!(name(255, 180, 180), "Bright Red");
        assert_eq!(name(140, 100, 100), "Muted Red");
    }

    #[test]
    fn medium_saturation_has_no_qualifier_in_midtones() {
        // s = 0.4, l = 0.5
        assert_eq!(name(179, 77, 77), "Red");
        assert_eq!(name(77, 120, 179), "Blue");
    }

    #[test]
    fn red_wraps_past_rose() {
        assert_eq!(name(255, 0, 20), "Vibrant Red");
        assert_eq!(name(255, 0, 100), "Vibrant Rose");
    }

    #[test]
    fn naming_is_deterministic() {
        for c in [(12, 200, 99), (250, 128, 3), (40, 40, 41)] {
            assert_eq!(name(c.0, c.1, c.2), name(c.0, c.1, c.2));
        }
    }
}
