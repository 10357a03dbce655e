//! GIF decoder for the Glimmer image pipeline.
//!
//! [GRAPHICS INTERCHANGE FORMAT Version 89a](https://www.w3.org/Graphics/GIF/spec-gif89a.txt)
//!
//! # Scope
//!
//! - **Header** - `GIF87a`/`GIF89a` signature, logical screen, global table
//! - **Blocks** - extension skipping, graphic control transparency
//! - **LZW** - variable-width decompression with dictionary reset
//! - **Pixels** - color-table expansion onto the logical-screen canvas
//!
//! # Not Supported
//!
//! - Local color tables and interlaced images ([`DecodeError::Unsupported`])
//! - Animation: only the first image in the stream is decoded
//! - Frame delay and disposal (read, then ignored)

pub mod blocks;
pub mod color_table;
pub mod lzw;
pub mod screen;

use glimmer_common::bytes::u8_at;
use glimmer_common::warning::warn_once;
use glimmer_common::{DecodeError, DecodeOptions, DecodedImage, ImageFormat};

use blocks::{
    EXTENSION_INTRODUCER, GRAPHIC_CONTROL_LABEL, GraphicControl, IMAGE_SEPARATOR, ImageDescriptor,
    TRAILER,
};
use color_table::ColorTable;
use screen::LogicalScreen;

pub use lzw::{LzwDecoder, LzwError};

/// Decode the first image of a GIF file with [`DecodeOptions::default`].
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decode the first image of a GIF file into packed ARGB32 pixels.
///
/// The result has the logical screen's dimensions. The image is placed at
/// its descriptor offset and clipped to the canvas; canvas pixels it does
/// not cover are transparent black.
///
/// # Algorithm
///
/// STEP 1: Check the signature, read the logical screen descriptor and the
/// global color table.
///
/// STEP 2: Scan blocks. Extensions are skipped, except that a graphic
/// control extension is remembered for its transparent color index. The
/// trailer or the end of the input before any image is an error.
///
/// STEP 3: At the first image descriptor, gather its LZW sub-blocks,
/// decompress them into color indices and expand the indices through the
/// color table.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] for malformed input (bad signature,
/// truncated blocks, unknown block introducer, undecodable LZW code,
/// too few indices, color index outside the table, no color table) and
/// [`DecodeError::Unsupported`] for local color tables, interlacing, or
/// images above [`DecodeOptions::max_pixels`].
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<DecodedImage, DecodeError> {
    // STEP 1: Header and logical screen.
    let screen = LogicalScreen::parse(bytes)?;
    check_limit(screen.pixel_count(), options)?;

    // STEP 2: Block scan.
    let mut offset = screen.blocks_offset;
    let mut control: Option<GraphicControl> = None;

    loop {
        let introducer = u8_at(bytes, offset)
            .ok_or_else(|| malformed("stream ends before an image descriptor"))?;
        offset += 1;

        match introducer {
            EXTENSION_INTRODUCER => {
                let label = u8_at(bytes, offset)
                    .ok_or_else(|| malformed("extension block is missing its label"))?;
                offset += 1;
                if label == GRAPHIC_CONTROL_LABEL {
                    let (parsed, next) = GraphicControl::parse(bytes, offset)?;
                    control = Some(parsed);
                    offset = next;
                } else {
                    warn_once("GIF", &format!("skipping extension block {label:#04x}"));
                    offset = blocks::skip_sub_blocks(bytes, offset)?;
                }
            }
            // STEP 3: First image.
            IMAGE_SEPARATOR => return decode_image(bytes, offset, &screen, control, options),
            TRAILER => return Err(malformed("trailer reached before any image descriptor")),
            other => {
                return Err(malformed(format!(
                    "unknown block introducer {other:#04x} at offset {}",
                    offset - 1
                )));
            }
        }
    }
}

fn decode_image(
    bytes: &[u8],
    offset: usize,
    screen: &LogicalScreen,
    control: Option<GraphicControl>,
    options: &DecodeOptions,
) -> Result<DecodedImage, DecodeError> {
    let (descriptor, offset) = ImageDescriptor::parse(bytes, offset)?;
    check_limit(descriptor.pixel_count(), options)?;

    let min_code_size = u8_at(bytes, offset)
        .ok_or_else(|| malformed("image data is missing the LZW minimum code size"))?;
    let (compressed, end) = blocks::read_sub_blocks(bytes, offset + 1)?;

    let table = screen
        .global_table
        .as_ref()
        .ok_or_else(|| malformed("image has no color table"))?;
    let table = active_table(table, control, options);

    let expected = usize::from(descriptor.width) * usize::from(descriptor.height);
    let indices = lzw::decompress(&compressed, min_code_size, expected)?;
    if indices.len() < expected {
        return Err(malformed(format!(
            "LZW data holds {} of {expected} pixels",
            indices.len()
        )));
    }
    let frame = table.expand(&indices)?;

    if u8_at(bytes, end).is_some_and(|next| next != TRAILER) {
        warn_once("GIF", "blocks after the first image are ignored");
    }

    let canvas = compose(screen, &descriptor, &frame);
    DecodedImage::new(u32::from(screen.width), u32::from(screen.height), canvas)
        .ok_or_else(|| malformed("pixel count does not match dimensions"))
}

/// The global table, keyed for transparency when the options allow it.
fn active_table(
    table: &ColorTable,
    control: Option<GraphicControl>,
    options: &DecodeOptions,
) -> ColorTable {
    let Some(control) = control else {
        return table.clone();
    };
    if control.delay != 0 || control.disposal != 0 {
        warn_once("GIF", "ignoring frame delay and disposal method");
    }
    match control.transparent_index {
        Some(index) if options.gif_transparency => table.with_transparent(index),
        _ => table.clone(),
    }
}

/// Place `frame` on a transparent canvas at the descriptor's offset,
/// clipping whatever falls outside the logical screen.
fn compose(screen: &LogicalScreen, descriptor: &ImageDescriptor, frame: &[u32]) -> Vec<u32> {
    let canvas_width = usize::from(screen.width);
    let canvas_height = usize::from(screen.height);
    let mut canvas = vec![0u32; canvas_width * canvas_height];

    let left = usize::from(descriptor.left);
    let top = usize::from(descriptor.top);
    if left >= canvas_width || top >= canvas_height {
        return canvas;
    }
    let visible = usize::from(descriptor.width).min(canvas_width - left);

    for (row, source) in frame
        .chunks_exact(usize::from(descriptor.width))
        .take(canvas_height - top)
        .enumerate()
    {
        let start = (top + row) * canvas_width + left;
        canvas[start..start + visible].copy_from_slice(&source[..visible]);
    }
    canvas
}

fn check_limit(pixels: u64, options: &DecodeOptions) -> Result<(), DecodeError> {
    if pixels > options.max_pixels {
        return Err(DecodeError::unsupported(
            ImageFormat::Gif,
            format!(
                "{pixels} pixels exceeds the {} pixel limit",
                options.max_pixels
            ),
        ));
    }
    Ok(())
}

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::malformed(ImageFormat::Gif, reason)
}
