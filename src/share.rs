//! Share-link path segments: hex digits without `#`, joined by `-`.

use crate::color::{parse_hex, rgb_to_hex};
use crate::error::{PaletteError, Result};
use crate::extract::ColorData;

pub fn encode_share_segment(colors: &[ColorData]) -> String {
    colors
        .iter()
        .map(|c| c.hex.trim_start_matches('#'))
        .collect::<Vec<_>>()
        .join("-")
}

/// Append the encoded palette to `base` as its last path segment.
pub fn share_link(base: &str, colors: &[ColorData]) -> String {
    format!("{}/{}", base.trim_end_matches('/'), encode_share_segment(colors))
}

/// Decode a share segment back into hex strings (`#rrggbb`, lowercase).
pub fn decode_share_segment(segment: &str) -> Result<Vec<String>> {
    if segment.is_empty() {
        return Ok(Vec::new());
    }
    segment
        .split('-')
        .map(|token| {
            if token.starts_with('#') {
                return Err(PaletteError::InvalidHex(token.to_string()));
            }
            parse_hex(token).map(rgb_to_hex)
        })
        .collect()
}

/// Build palette entries from hex strings. Counts are zero since nothing was sampled.
pub fn palette_from_hex<S: AsRef<str>>(hexes: &[S]) -> Result<Vec<ColorData>> {
    hexes
        .iter()
        .map(|h| parse_hex(h.as_ref().trim()).map(|c| ColorData::from_color(c, 0)))
        .collect()
}
