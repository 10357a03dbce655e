//! Glimmer CLI
//!
//! Decodes PNG and GIF files and prints what the decoder produced.
//!
//! - `glimmer a.png b.gif`            # one summary line per file
//! - `glimmer --json --pixel 3,4 a.gif`
//! - `glimmer --dump out.pam a.png`   # write the pixels as a PAM image

mod pam;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glimmer_common::warning::clear_warnings;
use glimmer_common::{DecodeOptions, DecodedImage};
use glimmer_loader::{LoadError, decode_file_with};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Glimmer - decode PNG and GIF files into ARGB32 pixels
#[derive(Parser, Debug)]
#[command(name = "glimmer")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Summarize two images
    glimmer logo.png spinner.gif

    # Verify PNG chunk checksums
    glimmer --strict logo.png

    # Machine-readable output with one probed pixel
    glimmer --json --pixel 10,4 spinner.gif

    # Options from a JSON file, then overridden by flags
    glimmer --config decode.json --max-pixels 1000000 big.png

    # Convert to PAM for inspection in other tools
    glimmer --dump logo.pam logo.png
"#)]
struct Cli {
    /// Image files to decode
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Verify the CRC-32 of every PNG chunk
    #[arg(long)]
    strict: bool,

    /// Ignore the transparent color index of GIF images
    #[arg(long)]
    no_transparency: bool,

    /// Refuse images with more than N pixels
    #[arg(long, value_name = "N")]
    max_pixels: Option<u64>,

    /// Read decode options from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print one JSON object per file
    #[arg(long)]
    json: bool,

    /// Also print the pixel at column X, row Y
    #[arg(long, value_name = "X,Y")]
    pixel: Option<Point>,

    /// Write the first file's pixels to OUT as a PAM RGB_ALPHA image
    #[arg(long, value_name = "OUT")]
    dump: Option<PathBuf>,
}

/// Pixel coordinate given as `X,Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Point {
    x: u32,
    y: u32,
}

impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid coordinate '{part}': {e}"))
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

#[derive(Serialize)]
struct Summary {
    path: String,
    width: u32,
    height: u32,
    opaque: bool,
    first_pixel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    probe: Option<Probe>,
}

#[derive(Serialize)]
struct Probe {
    x: u32,
    y: u32,
    /// `None` when the point lies outside the image.
    argb: Option<String>,
}

#[derive(Serialize)]
struct Failure {
    path: String,
    errors: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = resolve_options(&cli)?;

    let mut failures = 0usize;
    for (index, path) in cli.files.iter().enumerate() {
        clear_warnings();
        match decode_file_with(path, &options) {
            Ok(image) => {
                report(&cli, path, &image)?;
                if index == 0
                    && let Some(ref out) = cli.dump
                {
                    dump(&image, out)?;
                }
            }
            Err(err) => {
                failures += 1;
                report_failure(&cli, path, &err)?;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} file(s) failed to decode", cli.files.len());
    }
    Ok(())
}

/// Config file first, then flags on top.
fn resolve_options(cli: &Cli) -> Result<DecodeOptions> {
    let mut options = match cli.config {
        Some(ref path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config '{}'", path.display()))?
        }
        None => DecodeOptions::default(),
    };

    if cli.strict {
        options.verify_crc = true;
    }
    if cli.no_transparency {
        options.gif_transparency = false;
    }
    if let Some(max_pixels) = cli.max_pixels {
        options.max_pixels = max_pixels;
    }
    Ok(options)
}

fn argb_hex(pixel: u32) -> String {
    format!("#{pixel:08X}")
}

fn report(cli: &Cli, path: &Path, image: &DecodedImage) -> Result<()> {
    let probe = cli.pixel.map(|point| Probe {
        x: point.x,
        y: point.y,
        argb: image.pixel(point.x, point.y).map(argb_hex),
    });
    let summary = Summary {
        path: path.display().to_string(),
        width: image.width(),
        height: image.height(),
        opaque: image.is_opaque(),
        first_pixel: image.pixels().first().copied().map_or_else(String::new, argb_hex),
        probe,
    };

    if cli.json {
        println!("{}", serde_json::to_string(&summary)?);
        return Ok(());
    }

    println!(
        "{}: {}x{}, {}, first pixel {}",
        summary.path.bold(),
        summary.width,
        summary.height,
        if summary.opaque { "opaque" } else { "has alpha" },
        summary.first_pixel
    );
    if let Some(probe) = summary.probe {
        match probe.argb {
            Some(argb) => println!("  pixel ({}, {}) = {argb}", probe.x, probe.y),
            None => println!("  pixel ({}, {}) is outside the image", probe.x, probe.y),
        }
    }
    Ok(())
}

fn report_failure(cli: &Cli, path: &Path, err: &LoadError) -> Result<()> {
    if cli.json {
        let failure = Failure {
            path: path.display().to_string(),
            errors: match err {
                LoadError::Io { .. } => vec![err.to_string()],
                _ => err.attempts().iter().map(ToString::to_string).collect(),
            },
        };
        println!("{}", serde_json::to_string(&failure)?);
        return Ok(());
    }

    eprintln!("{}: {}", path.display().bold(), "decode failed".red());
    let attempts = err.attempts();
    if attempts.is_empty() {
        eprintln!("  {err}");
    }
    for attempt in attempts {
        eprintln!("  {} {attempt}", "-".red());
    }
    Ok(())
}

fn dump(image: &DecodedImage, out: &Path) -> Result<()> {
    let file =
        File::create(out).with_context(|| format!("failed to create '{}'", out.display()))?;
    let mut writer = BufWriter::new(file);
    pam::write_pam(image, &mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("failed to write '{}'", out.display()))?;
    eprintln!("Wrote {}", out.display());
    Ok(())
}
