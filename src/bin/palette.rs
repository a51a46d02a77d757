use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use image_to_palette_wasm::{
    ColorData, ExportLayout, ExtractConfig, GradientData, LabelFonts, export_palette_png,
    extract_colors_kmeans, extract_colors_with, generate_analogous_gradients,
    generate_complementary_gradient, generate_cool_palette, generate_gradients_from_colors,
    generate_warm_palette, palette_from_hex, share_link, timestamped_filename,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    /// Adaptive bucketing with perceptual de-duplication
    Bucket,
    /// k-means clustering in CIELAB
    Kmeans,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    Original,
    Warm,
    Cool,
}

/// Extract named color palettes and gradients from images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image paths
    inputs: Vec<PathBuf>,

    /// Number of colors to extract (3-8)
    #[arg(short = 'k', long, default_value_t = 5)]
    n_colors: usize,

    #[arg(short, long, value_enum, default_value_t = Method::Bucket)]
    method: Method,

    /// Seed for the k-means method
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long, value_enum, default_value_t = Variant::Original)]
    variant: Variant,

    /// Comma-separated hex colors to use instead of an image
    #[arg(short = 'c', long)]
    colors: Option<String>,

    /// Write a PNG swatch sheet per palette into this directory
    #[arg(short = 'd', long)]
    png_dir: Option<PathBuf>,

    /// TrueType/OpenType font for PNG labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold face for color names (defaults to --font)
    #[arg(long, requires = "font")]
    bold_font: Option<PathBuf>,

    /// Base URL for share links
    #[arg(long)]
    share_base: Option<String>,

    /// JSON file with `extract` and `export` overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" (defaults to RUST_LOG, then "info")
    #[arg(long)]
    log: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    extract: ExtractConfig,
    export: ExportLayout,
}

#[derive(Debug, Serialize)]
struct Report {
    source: String,
    palette: Vec<ColorData>,
    gradients: Vec<GradientData>,
    complementary: Option<GradientData>,
    analogous: Vec<GradientData>,
    share: Option<String>,
    png: Option<PathBuf>,
}

fn init_logging(filter: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    } else if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_fonts(args: &Args) -> Result<Option<LabelFonts>> {
    let Some(font) = &args.font else {
        return Ok(None);
    };
    let regular = fs::read(font).with_context(|| format!("reading font {}", font.display()))?;
    let bold = match &args.bold_font {
        Some(path) => {
            Some(fs::read(path).with_context(|| format!("reading font {}", path.display()))?)
        }
        None => None,
    };
    Ok(Some(LabelFonts::from_bytes(&regular, bold.as_deref())?))
}

fn apply_variant(variant: Variant, palette: Vec<ColorData>) -> Vec<ColorData> {
    match variant {
        Variant::Original => palette,
        Variant::Warm => generate_warm_palette(&palette),
        Variant::Cool => generate_cool_palette(&palette),
    }
}

fn build_report(
    args: &Args,
    source: String,
    palette: Vec<ColorData>,
    layout: &ExportLayout,
    fonts: Option<&LabelFonts>,
    png_name: String,
) -> Result<Report> {
    let palette = apply_variant(args.variant, palette);
    if palette.is_empty() {
        log::warn!("{source}: no dominant colors found");
    }

    let png = match &args.png_dir {
        Some(dir) if !palette.is_empty() => {
            fs::create_dir_all(dir)?;
            let path = dir.join(png_name);
            let bytes = export_palette_png(&palette, layout, fonts)
                .with_context(|| format!("exporting {source}"))?;
            fs::write(&path, bytes)?;
            log::info!("saved {}", path.display());
            Some(path)
        }
        _ => None,
    };

    Ok(Report {
        gradients: generate_gradients_from_colors(&palette),
        complementary: palette.first().map(generate_complementary_gradient),
        analogous: generate_analogous_gradients(&palette),
        share: args.share_base.as_deref().map(|base| share_link(base, &palette)),
        source,
        palette,
        png,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());

    if args.inputs.is_empty() && args.colors.is_none() {
        bail!("nothing to do: pass image paths or --colors");
    }

    let config = load_config(args.config.as_deref())?;
    let extract_config = ExtractConfig {
        color_count: args.n_colors,
        ..config.extract
    };
    let fonts = load_fonts(&args)?;

    let mut reports = Vec::new();

    if let Some(list) = &args.colors {
        let hexes: Vec<&str> = list.split(',').collect();
        let palette = palette_from_hex(&hexes).context("parsing --colors")?;
        let png_name = timestamped_filename("palette", "png", SystemTime::now());
        reports.push(build_report(
            &args,
            "--colors".to_string(),
            palette,
            &config.export,
            fonts.as_ref(),
            png_name,
        )?);
    }

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let palette = match args.method {
            Method::Bucket => extract_colors_with(&bytes, &extract_config),
            Method::Kmeans => extract_colors_kmeans(&bytes, &extract_config, args.seed),
        }
        .with_context(|| format!("extracting palette from {}", input.display()))?;

        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        reports.push(build_report(
            &args,
            input.display().to_string(),
            palette,
            &config.export,
            fonts.as_ref(),
            format!("{stem}-palette.png"),
        )?);
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
