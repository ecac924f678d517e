//! oxstitch: convert a pixel-art pattern image into an `.oxs` chart.
//!
//! Each pixel is one full stitch. Without a palette file, every distinct
//! color in the image becomes a palette entry (in order of first
//! appearance) with a generated symbol. With `--palette`, the file
//! defines the chart palette and pixels matching none of its colors
//! are left unstitched. Fully transparent pixels are never stitched.
//!
//! # Usage
//!
//! ```text
//! oxstitch [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=debug`) to adjust log verbosity.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use oxstitch_pattern::{CodedColor, CodedImage, PatternError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Convert a pixel-art cross-stitch pattern into an Open Cross Stitch
/// (`.oxs`) chart.
#[derive(Parser, Debug)]
#[command(name = "oxstitch", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP). One pixel per
    /// stitch; fully transparent pixels are left empty.
    image_path: PathBuf,

    /// Output chart path. Defaults to the input path with an `.oxs`
    /// extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON palette file defining chart colors, codes, names, and symbols.
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Write to a temporary file and rename it into place, so a failed
    /// export never leaves a partial chart.
    #[arg(long)]
    atomic: bool,

    /// Also write the effective palette as JSON to this path.
    #[arg(long)]
    dump_palette: Option<PathBuf>,
}

/// Anything that can stop a conversion.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Pattern { path: PathBuf, source: PatternError },

    #[error(transparent)]
    Export(#[from] oxstitch_export::ExportError),
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let palette = match cli.palette {
        Some(ref path) => Some(load_palette(path)?),
        None => None,
    };

    let image_bytes = read(&cli.image_path)?;
    tracing::info!(
        "Image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );

    let known = palette.as_deref().unwrap_or_default();
    let image = oxstitch_pattern::decode_coded_image(&image_bytes, known).map_err(|source| {
        CliError::Pattern {
            path: cli.image_path.clone(),
            source,
        }
    })?;

    let ordered_colors = palette.unwrap_or_else(|| oxstitch_pattern::chart_palette(&image));
    report(&image, &ordered_colors);

    if let Some(ref path) = cli.dump_palette {
        write_palette(path, &ordered_colors)?;
    }

    let output = output_path(cli);
    if cli.atomic {
        oxstitch_export::export_to_file_atomic(&output, &image, &ordered_colors)?;
    } else {
        oxstitch_export::export_to_file(&output, &image, &ordered_colors)?;
    }
    tracing::info!("Chart written to {}", output.display());

    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_palette(path: &Path) -> Result<Vec<CodedColor>, CliError> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let colors = oxstitch_pattern::parse_palette(&json).map_err(|source| CliError::Pattern {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Palette: {} ({} colors)", path.display(), colors.len());
    Ok(colors)
}

fn write_palette(path: &Path, colors: &[CodedColor]) -> Result<(), CliError> {
    let json = oxstitch_pattern::palette_to_json(colors).map_err(|source| CliError::Pattern {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Palette written to {}", path.display());
    Ok(())
}

/// Log grid size, palette size, and how many cells will be stitched.
fn report(image: &CodedImage, ordered_colors: &[CodedColor]) {
    let mapped: Vec<bool> = image
        .colors()
        .iter()
        .map(|color| ordered_colors.contains(color))
        .collect();
    let stitched = image
        .color_indices()
        .iter()
        .filter(|&&i| mapped[i])
        .count();
    let unmapped = image.dimensions().area() - stitched;

    tracing::info!(
        "Pattern: {} grid, {} palette colors, {stitched} stitches",
        image.dimensions(),
        ordered_colors.len(),
    );
    if unmapped > 0 {
        tracing::warn!(
            "{unmapped} cells are transparent or match no palette color and will be left empty"
        );
    }
}

/// `--output`, or the input path with its extension replaced by `oxs`.
fn output_path(cli: &Cli) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| cli.image_path.with_extension("oxs"))
}
