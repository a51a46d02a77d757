//! Color palette extraction and derivation.
//!
//! Takes a raster image, quantizes its pixels into a handful of named dominant
//! colors and derives warm/cool variants, CSS gradients and a PNG swatch sheet
//! from the result. Everything is usable natively and from JavaScript through
//! the `wasm-bindgen` functions below.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod error;
pub mod export;
pub mod extract;
pub mod gradient;
pub mod kmeans;
pub mod naming;
pub mod share;
pub mod transform;

pub use color::{color_distance, get_hue, hex_to_rgb, parse_hex, rgb_to_hex};
pub use error::{PaletteError, Result};
pub use export::{
    Canvas, DEFAULT_EXPORT_FILENAME, ExportLayout, FontSpec, LabelFonts, PNG_MIME, PaletteLayout,
    RasterCanvas, export_palette_png, render_palette, timestamped_filename,
};
pub use extract::{
    ColorData, ExtractConfig, extract_colors, extract_colors_with, extract_from_image,
    extract_from_rgba,
};
pub use gradient::{
    GradientData, GradientKind, generate_analogous_gradients, generate_complementary_gradient,
    generate_gradients_from_colors,
};
pub use kmeans::extract_colors_kmeans;
pub use naming::generate_color_name;
pub use share::{decode_share_segment, encode_share_segment, palette_from_hex, share_link};
pub use transform::{generate_cool_palette, generate_warm_palette};

// ------------------------------------------------------------
// JS surface
// ------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("logger already initialized");
    }
}

fn js_err(err: PaletteError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn set(obj: &Object, key: &str, value: &JsValue) -> std::result::Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), value).map(|_| ())
}

fn color_to_js(color: &ColorData) -> std::result::Result<Object, JsValue> {
    let obj = Object::new();
    set(&obj, "hex", &JsValue::from_str(&color.hex))?;
    set(&obj, "rgb", &JsValue::from_str(&color.rgb))?;
    set(&obj, "name", &JsValue::from_str(&color.name))?;
    set(&obj, "count", &JsValue::from_f64(color.count as f64))?;
    Ok(obj)
}

/// Read a `{hex, rgb?, name?, count?}` object. Missing fields are derived from `hex`.
fn color_from_js(value: &JsValue) -> std::result::Result<ColorData, JsValue> {
    let field = |key: &str| Reflect::get(value, &JsValue::from_str(key));
    let hex = field("hex")?
        .as_string()
        .ok_or_else(|| JsValue::from_str("palette entries need a string `hex`"))?;
    let count = field("count")?.as_f64().unwrap_or(0.0).max(0.0) as u32;

    let mut entry = color_entry(&hex, count).map_err(js_err)?;
    if let Some(name) = field("name")?.as_string() {
        entry.name = name;
    }
    if let Some(rgb) = field("rgb")?.as_string() {
        entry.rgb = rgb;
    }
    Ok(entry)
}

/// Entry for a caller-supplied hex string, stored in canonical `#rrggbb` form.
fn color_entry(hex: &str, count: u32) -> Result<ColorData> {
    Ok(ColorData::from_color(parse_hex(hex.trim())?, count))
}

fn palette_from_js(colors: &Array) -> std::result::Result<Vec<ColorData>, JsValue> {
    colors.iter().map(|v| color_from_js(&v)).collect()
}

fn palette_to_js(colors: &[ColorData]) -> std::result::Result<Array, JsValue> {
    let out = Array::new();
    for color in colors {
        let obj = color_to_js(color)?;
        out.push(&obj);
    }
    Ok(out)
}

fn gradient_to_js(gradient: &GradientData) -> std::result::Result<Object, JsValue> {
    let stops = Array::new();
    for stop in gradient.colors() {
        stops.push(&JsValue::from_str(stop));
    }
    let obj = Object::new();
    set(&obj, "id", &JsValue::from_str(gradient.id()))?;
    set(&obj, "colors", &stops)?;
    set(&obj, "angle", &JsValue::from_f64(gradient.angle() as f64))?;
    set(&obj, "css", &JsValue::from_str(gradient.css()))?;
    set(&obj, "name", &JsValue::from_str(gradient.name()))?;
    Ok(obj)
}

fn gradients_to_js(gradients: &[GradientData]) -> std::result::Result<Array, JsValue> {
    let out = Array::new();
    for gradient in gradients {
        let obj = gradient_to_js(gradient)?;
        out.push(&obj);
    }
    Ok(out)
}

/// Decode an encoded image (PNG, JPEG, WebP, ...) and extract its palette.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette(input: Vec<u8>, color_count: usize) -> std::result::Result<Array, JsValue> {
    let colors = extract_colors(&input, color_count).map_err(js_err)?;
    palette_to_js(&colors)
}

/// Extract from pixels the browser already decoded (`ImageData.data`).
#[wasm_bindgen(js_name = extractPaletteFromImageData)]
pub fn extract_palette_from_image_data(
    width: u32,
    height: u32,
    data: Vec<u8>,
    color_count: usize,
) -> std::result::Result<Array, JsValue> {
    let config = ExtractConfig::with_color_count(color_count);
    let colors = extract_from_rgba(width, height, data, &config).map_err(js_err)?;
    palette_to_js(&colors)
}

#[wasm_bindgen(js_name = warmPalette)]
pub fn warm_palette(colors: Array) -> std::result::Result<Array, JsValue> {
    palette_to_js(&generate_warm_palette(&palette_from_js(&colors)?))
}

#[wasm_bindgen(js_name = coolPalette)]
pub fn cool_palette(colors: Array) -> std::result::Result<Array, JsValue> {
    palette_to_js(&generate_cool_palette(&palette_from_js(&colors)?))
}

#[wasm_bindgen(js_name = gradientsFromPalette)]
pub fn gradients_from_palette(colors: Array) -> std::result::Result<Array, JsValue> {
    gradients_to_js(&generate_gradients_from_colors(&palette_from_js(&colors)?))
}

#[wasm_bindgen(js_name = complementaryGradient)]
pub fn complementary_gradient(color: JsValue) -> std::result::Result<Object, JsValue> {
    gradient_to_js(&generate_complementary_gradient(&color_from_js(&color)?))
}

#[wasm_bindgen(js_name = analogousGradients)]
pub fn analogous_gradients(colors: Array) -> std::result::Result<Array, JsValue> {
    gradients_to_js(&generate_analogous_gradients(&palette_from_js(&colors)?))
}

/// Render the palette sheet and return PNG bytes. Without font bytes the
/// sheet has swatches only.
#[wasm_bindgen(js_name = exportPalettePng)]
pub fn export_palette_png_js(
    colors: Array,
    font: Option<Vec<u8>>,
    bold_font: Option<Vec<u8>>,
) -> std::result::Result<Uint8Array, JsValue> {
    let colors = palette_from_js(&colors)?;
    let fonts = match font {
        Some(regular) => {
            Some(LabelFonts::from_bytes(&regular, bold_font.as_deref()).map_err(js_err)?)
        }
        None => None,
    };
    let png =
        export_palette_png(&colors, &ExportLayout::default(), fonts.as_ref()).map_err(js_err)?;
    Ok(Uint8Array::from(png.as_slice()))
}

#[wasm_bindgen(js_name = shareLink)]
pub fn share_link_js(base: &str, colors: Array) -> std::result::Result<String, JsValue> {
    Ok(share_link(base, &palette_from_js(&colors)?))
}
