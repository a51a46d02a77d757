use palette::Srgb;
use serde::Serialize;

use crate::color::{get_hue, rgb_to_hex};
use crate::extract::ColorData;

/// Upper bound on [`generate_gradients_from_colors`] output.
pub const MAX_GRADIENTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    /// Linear gradient at the given angle in degrees.
    Linear(u16),
    Radial,
}

impl GradientKind {
    /// Angle as recorded on the descriptor; radial gradients report `0`.
    pub fn angle(self) -> u16 {
        match self {
            GradientKind::Linear(angle) => angle,
            GradientKind::Radial => 0,
        }
    }
}

/// A gradient and its CSS serialization.
///
/// `css` is computed from the kind and the stops on construction and the
/// fields are read-only, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradientData {
    id: String,
    colors: Vec<String>,
    angle: u16,
    css: String,
    name: String,
}

impl GradientData {
    pub fn new(
        id: impl Into<String>,
        kind: GradientKind,
        colors: Vec<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            css: gradient_css(kind, &colors),
            angle: kind.angle(),
            colors,
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn angle(&self) -> u16 {
        self.angle
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// CSS gradient function with evenly spaced stops, e.g.
/// `linear-gradient(90deg, #aa0000 0%, #00aa00 50%, #0000aa 100%)`.
pub fn gradient_css(kind: GradientKind, colors: &[String]) -> String {
    let last = colors.len().saturating_sub(1).max(1);
    let stops = colors
        .iter()
        .enumerate()
        .map(|(i, color)| format!("{color} {}%", i * 100 / last))
        .collect::<Vec<_>>()
        .join(", ");

    match kind {
        GradientKind::Linear(angle) => format!("linear-gradient({angle}deg, {stops})"),
        GradientKind::Radial => format!("radial-gradient(circle, {stops})"),
    }
}

/// Default gradient set for a palette: two-stop 45° and 135° blends between
/// the leading entries, then three-stop 90° blends, then a radial burst,
/// truncated to [`MAX_GRADIENTS`]. Fewer than two colors yield nothing.
pub fn generate_gradients_from_colors(colors: &[ColorData]) -> Vec<GradientData> {
    let len = colors.len();
    if len < 2 {
        return Vec::new();
    }

    let mut gradients = Vec::new();

    for i in 0..(len - 1).min(3) {
        for j in (i + 1)..len.min(4) {
            let (a, b) = (&colors[i], &colors[j]);
            let stops = vec![a.hex.clone(), b.hex.clone()];
            gradients.push(GradientData::new(
                format!("linear-{i}-{j}"),
                GradientKind::Linear(45),
                stops.clone(),
                format!("{} to {}", a.name, b.name),
            ));
            gradients.push(GradientData::new(
                format!("linear-135-{i}-{j}"),
                GradientKind::Linear(135),
                stops,
                format!("{} diagonal {}", a.name, b.name),
            ));
        }
    }

    if len >= 3 {
        for i in 0..(len - 2).min(2) {
            let stops = colors[i..i + 3].iter().map(|c| c.hex.clone()).collect();
            gradients.push(GradientData::new(
                format!("triple-{i}"),
                GradientKind::Linear(90),
                stops,
                format!("Triple blend {}", i + 1),
            ));
        }
    }

    gradients.push(GradientData::new(
        "radial-center",
        GradientKind::Radial,
        vec![colors[0].hex.clone(), colors[1].hex.clone()],
        "Radial burst",
    ));

    gradients.truncate(MAX_GRADIENTS);
    gradients
}

/// 90° blend from `color` to its channel-wise inverse (`255 - c`).
pub fn generate_complementary_gradient(color: &ColorData) -> GradientData {
    let c = color.color();
    let inverse = rgb_to_hex(Srgb::new(255 - c.red, 255 - c.green, 255 - c.blue));
    GradientData::new(
        "complementary",
        GradientKind::Linear(90),
        vec![color.hex.clone(), inverse],
        "Complementary harmony",
    )
}

/// Up to three 120° blends between hue-adjacent palette entries.
pub fn generate_analogous_gradients(colors: &[ColorData]) -> Vec<GradientData> {
    if colors.len() < 2 {
        return Vec::new();
    }

    let mut by_hue: Vec<(f64, &ColorData)> =
        colors.iter().map(|c| (get_hue(c.color()), c)).collect();
    by_hue.sort_by(|a, b| a.0.total_cmp(&b.0));

    by_hue
        .windows(2)
        .take(3)
        .enumerate()
        .map(|(i, pair)| {
            GradientData::new(
                format!("analogous-{i}"),
                GradientKind::Linear(120),
                vec![pair[0].1.hex.clone(), pair[1].1.hex.clone()],
                format!("Analogous {}", i + 1),
            )
        })
        .collect()
}
