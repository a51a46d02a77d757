//! Palette image export.
//!
//! Layout is computed up front as plain data ([`PaletteLayout`]) and then
//! replayed onto any [`Canvas`]. [`RasterCanvas`] is the PNG backend; labels
//! are drawn with `fontdue` when a font is supplied.

use std::io::Cursor;
use std::time::{SystemTime, UNIX_EPOCH};

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use image::{DynamicImage, ImageFormat, RgbaImage};
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::hex_to_rgb;
use crate::error::{PaletteError, Result};
use crate::extract::ColorData;

pub const DEFAULT_EXPORT_FILENAME: &str = "palette.png";
pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Inter, sans-serif".to_string(),
            size: 14.0,
            bold: false,
        }
    }
}

/// Geometry and styling of the exported palette image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportLayout {
    /// Column width per swatch, including `swatch_gap`.
    pub swatch_width: u32,
    pub swatch_height: u32,
    /// Blank space to the right of each swatch.
    pub swatch_gap: u32,
    /// Height of the label band under the swatches.
    pub text_height: u32,
    pub padding: u32,
    pub background: String,
    pub text_color: String,
    pub name_font: FontSpec,
    pub detail_font: FontSpec,
    /// Baselines of the name, hex and rgb labels, below the swatch bottom.
    pub label_offsets: [u32; 3],
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            swatch_width: 200,
            swatch_height: 150,
            swatch_gap: 10,
            text_height: 80,
            padding: 20,
            background: "#ffffff".to_string(),
            text_color: "#111111".to_string(),
            name_font: FontSpec {
                size: 16.0,
                bold: true,
                ..FontSpec::default()
            },
            detail_font: FontSpec::default(),
            label_offsets: [25, 45, 65],
        }
    }
}

impl ExportLayout {
    /// Canvas size for a palette of `len` entries, `None` if it does not fit in `u32`.
    pub fn canvas_size(&self, len: usize) -> Option<(u32, u32)> {
        let padding = self.padding.checked_mul(2)?;
        let width = u32::try_from(len)
            .ok()
            .and_then(|n| self.swatch_width.checked_mul(n))?
            .checked_add(padding)?;
        let height = self
            .swatch_height
            .checked_add(self.text_height)?
            .checked_add(padding)?;
        Some((width, height))
    }

    /// Same as [`canvas_size`](Self::canvas_size) but clamped, for error reports.
    fn saturated_size(&self, len: usize) -> (u32, u32) {
        let padding = self.padding.saturating_mul(2);
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        (
            self.swatch_width.saturating_mul(len).saturating_add(padding),
            self.swatch_height
                .saturating_add(self.text_height)
                .saturating_add(padding),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: Srgb<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub x: u32,
    /// Alphabetic baseline, as with a 2D canvas `fillText`.
    pub baseline: u32,
    pub font: FontSpec,
}

/// Everything that gets drawn for one palette, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteLayout {
    pub width: u32,
    pub height: u32,
    pub swatches: Vec<Swatch>,
    pub labels: Vec<TextLabel>,
}

impl PaletteLayout {
    pub fn compute(colors: &[ColorData], layout: &ExportLayout) -> Result<Self> {
        let (width, height) = layout.canvas_size(colors.len()).ok_or_else(|| {
            let (width, height) = layout.saturated_size(colors.len());
            PaletteError::CanvasUnavailable { width, height }
        })?;
        let mut swatches = Vec::with_capacity(colors.len());
        let mut labels = Vec::with_capacity(colors.len() * 3);

        for (i, entry) in colors.iter().enumerate() {
            let x = layout.padding + i as u32 * layout.swatch_width;
            let y = layout.padding;
            swatches.push(Swatch {
                x,
                y,
                width: layout.swatch_width.saturating_sub(layout.swatch_gap),
                height: layout.swatch_height,
                color: entry.color(),
            });

            let bottom = y + layout.swatch_height;
            let [name_at, hex_at, rgb_at] = layout.label_offsets;
            for (text, offset, font) in [
                (entry.name.clone(), name_at, &layout.name_font),
                (entry.hex.clone(), hex_at, &layout.detail_font),
                (format!("RGB: {}", entry.rgb), rgb_at, &layout.detail_font),
            ] {
                labels.push(TextLabel {
                    text,
                    x,
                    baseline: bottom.saturating_add(offset),
                    font: font.clone(),
                });
            }
        }

        Ok(Self {
            width,
            height,
            swatches,
            labels,
        })
    }
}

/// Minimal 2D drawing surface the exporter renders onto.
pub trait Canvas {
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Srgb<u8>);
    fn fill_text(&mut self, text: &str, x: u32, baseline: u32, font: &FontSpec, color: Srgb<u8>);
}

/// Draw background, swatches and labels.
pub fn render_palette<C: Canvas>(plan: &PaletteLayout, layout: &ExportLayout, canvas: &mut C) {
    canvas.fill_rect(0, 0, plan.width, plan.height, hex_to_rgb(&layout.background));

    for swatch in &plan.swatches {
        canvas.fill_rect(swatch.x, swatch.y, swatch.width, swatch.height, swatch.color);
    }

    let ink = hex_to_rgb(&layout.text_color);
    for label in &plan.labels {
        canvas.fill_text(&label.text, label.x, label.baseline, &label.font, ink);
    }
}

/// Regular and (optionally) bold faces for label text.
pub struct LabelFonts {
    regular: fontdue::Font,
    bold: Option<fontdue::Font>,
}

impl LabelFonts {
    pub fn from_bytes(regular: &[u8], bold: Option<&[u8]>) -> Result<Self> {
        let parse = |bytes: &[u8]| {
            fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
                .map_err(|e| PaletteError::Font(e.to_string()))
        };
        Ok(Self {
            regular: parse(regular)?,
            bold: bold.map(parse).transpose()?,
        })
    }

    /// Falls back to the regular face when no bold face was loaded.
    fn pick(&self, bold: bool) -> &fontdue::Font {
        match (&self.bold, bold) {
            (Some(face), true) => face,
            _ => &self.regular,
        }
    }
}

/// RGBA raster surface backed by an [`RgbaImage`].
pub struct RasterCanvas<'a> {
    image: RgbaImage,
    fonts: Option<&'a LabelFonts>,
    warned_no_font: bool,
}

impl<'a> RasterCanvas<'a> {
    pub fn new(width: u32, height: u32, fonts: Option<&'a LabelFonts>) -> Result<Self> {
        let unavailable = PaletteError::CanvasUnavailable { width, height };
        if width == 0 || height == 0 {
            return Err(unavailable);
        }
        let Some(len) = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
        else {
            return Err(unavailable);
        };
        let mut raw = Vec::new();
        if raw.try_reserve_exact(len).is_err() {
            return Err(unavailable);
        }
        raw.resize(len, 0);
        let image = RgbaImage::from_raw(width, height, raw).ok_or(unavailable)?;
        Ok(Self {
            image,
            fonts,
            warned_no_font: false,
        })
    }

    pub fn encode_png(self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(self.image)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(PaletteError::Encode)?;
        Ok(buf)
    }

    fn blend(&mut self, x: i64, y: i64, color: Srgb<u8>, coverage: u8) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        let a = coverage as u32;
        let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * (255 - a)) / 255) as u8;
        px.0 = [
            mix(color.red, px.0[0]),
            mix(color.green, px.0[1]),
            mix(color.blue, px.0[2]),
            255,
        ];
    }
}

impl Canvas for RasterCanvas<'_> {
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Srgb<u8>) {
        let x_end = x.saturating_add(width).min(self.image.width());
        let y_end = y.saturating_add(height).min(self.image.height());
        for py in y..y_end {
            for px in x..x_end {
                self.image
                    .put_pixel(px, py, image::Rgba([color.red, color.green, color.blue, 255]));
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: u32, baseline: u32, font: &FontSpec, color: Srgb<u8>) {
        let Some(fonts) = self.fonts else {
            if !self.warned_no_font {
                log::warn!("no label font loaded, exporting swatches without text");
                self.warned_no_font = true;
            }
            return;
        };
        let face = fonts.pick(font.bold);
        let ascent = face
            .horizontal_line_metrics(font.size)
            .map(|m| m.ascent)
            .unwrap_or(font.size);

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: x as f32,
            y: baseline as f32 - ascent,
            ..LayoutSettings::default()
        });
        layout.append(&[face], &TextStyle::new(text, font.size, 0));

        for g in layout.glyphs() {
            if g.width == 0 || g.height == 0 {
                continue;
            }
            let (metrics, bitmap) = face.rasterize_indexed(g.key.glyph_index, g.key.px);
            let left = g.x.round() as i64;
            let top = g.y.round() as i64;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    if coverage > 0 {
                        self.blend(left + col as i64, top + row as i64, color, coverage);
                    }
                }
            }
        }
    }
}

/// Render `colors` into a PNG (`image/png`) and return the encoded bytes.
pub fn export_palette_png(
    colors: &[ColorData],
    layout: &ExportLayout,
    fonts: Option<&LabelFonts>,
) -> Result<Vec<u8>> {
    let plan = PaletteLayout::compute(colors, layout)?;
    let mut canvas = RasterCanvas::new(plan.width, plan.height, fonts)?;
    render_palette(&plan, layout, &mut canvas);
    canvas.encode_png()
}

/// `"{prefix}-{unix millis}.{extension}"`
pub fn timestamped_filename(prefix: &str, extension: &str, at: SystemTime) -> String {
    let millis = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{prefix}-{millis}.{extension}")
}
