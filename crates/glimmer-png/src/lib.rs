//! PNG decoder for the Glimmer image pipeline.
//!
//! [Portable Network Graphics (PNG) Specification (Third Edition)](https://www.w3.org/TR/png-3/)
//!
//! # Scope
//!
//! - **Chunks** - signature check, length-checked chunk walk, optional CRC
//! - **Image data** - `IDAT` concatenation and zlib inflate (via `flate2`)
//! - **Filtering** - all five scanline filters, including Paeth
//! - **Pixels** - 8-bit truecolor and truecolor+alpha to packed ARGB32
//!
//! # Not Supported
//!
//! - Palette, greyscale, and greyscale+alpha color types
//! - 16-bit samples
//! - Adam7 interlacing
//!
//! These are reported as [`DecodeError::Unsupported`].

pub mod chunk;
pub mod filter;
pub mod header;
pub mod pixels;

use std::io::Read;

use flate2::read::ZlibDecoder;
use glimmer_common::warning::warn_once;
use glimmer_common::{DecodeError, DecodeOptions, DecodedImage, ImageFormat};

use chunk::{ChunkIter, check_signature};
use header::ImageHeader;

pub use chunk::PNG_SIGNATURE;
pub use header::ColorType;

/// Ancillary chunks that would change how the image looks if honored.
const IGNORED_APPEARANCE_CHUNKS: [&[u8; 4]; 6] =
    [b"PLTE", b"tRNS", b"gAMA", b"iCCP", b"sRGB", b"cHRM"];

/// Decode a PNG file with [`DecodeOptions::default`].
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decode a PNG file into packed ARGB32 pixels.
///
/// # Algorithm
///
/// STEP 1: Check the eight-byte signature.
///
/// STEP 2: Walk the chunks, keeping the first `IHDR` and concatenating every
/// `IDAT` payload in order, until `IEND`.
///
/// STEP 3: Inflate the concatenated stream, reading no more than the header
/// says the scanlines need.
///
/// STEP 4: Undo the scanline filters row by row.
///
/// STEP 5: Pack the samples into ARGB32.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] for malformed input (bad signature,
/// truncated or overflowing chunk, missing `IHDR`/`IDAT`, failed inflate,
/// short image data, invalid filter type, CRC mismatch when
/// [`DecodeOptions::verify_crc`] is set) and [`DecodeError::Unsupported`] for
/// legal files outside the supported subset or above
/// [`DecodeOptions::max_pixels`].
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<DecodedImage, DecodeError> {
    // STEP 1: Signature.
    check_signature(bytes)?;

    // STEP 2: Chunk walk.
    let mut header: Option<ImageHeader> = None;
    let mut compressed: Vec<u8> = Vec::new();
    let mut saw_end = false;

    for chunk in ChunkIter::new(bytes) {
        let chunk = chunk?;
        if options.verify_crc {
            chunk.verify_crc()?;
        }

        match &chunk.kind {
            b"IHDR" => {
                if header.is_none() {
                    header = Some(ImageHeader::parse(chunk.data)?);
                }
            }
            b"IDAT" => compressed.extend_from_slice(chunk.data),
            b"IEND" => {
                saw_end = true;
                break;
            }
            kind if IGNORED_APPEARANCE_CHUNKS.contains(&kind) => {
                warn_once("PNG", &format!("ignoring '{}' chunk", chunk.name()));
            }
            _ if chunk.is_critical() => {
                return Err(DecodeError::unsupported(
                    ImageFormat::Png,
                    format!("unknown critical chunk '{}'", chunk.name()),
                ));
            }
            _ => {}
        }
    }

    if !saw_end {
        warn_once("PNG", "file ends without an IEND chunk");
    }

    let header = header.ok_or_else(|| malformed("missing IHDR chunk"))?;
    if compressed.is_empty() {
        return Err(malformed("missing IDAT chunk"));
    }

    if header.pixel_count() > options.max_pixels {
        return Err(DecodeError::unsupported(
            ImageFormat::Png,
            format!(
                "{}x{} image exceeds the {} pixel limit",
                header.width, header.height, options.max_pixels
            ),
        ));
    }

    let (Some(stride), Some(filtered_len), Ok(height)) = (
        header.stride(),
        header.filtered_len(),
        usize::try_from(header.height),
    ) else {
        return Err(malformed("image dimensions overflow memory"));
    };

    // STEP 3: Inflate.
    let filtered = inflate(&compressed, filtered_len)?;

    // STEP 4: Unfilter.
    let samples = filter::unfilter_scanlines(
        &filtered,
        stride,
        height,
        header.color_type.bytes_per_pixel(),
    )?;

    // STEP 5: Pack.
    let pixels = pixels::to_argb(&samples, header.color_type);
    DecodedImage::new(header.width, header.height, pixels)
        .ok_or_else(|| malformed("pixel count does not match dimensions"))
}

/// Inflate a zlib stream, stopping after `expected` bytes.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] if the stream is corrupt or yields fewer
/// than `expected` bytes.
pub fn inflate(compressed: &[u8], expected: usize) -> Result<Vec<u8>, DecodeError> {
    let limit = u64::try_from(expected).unwrap_or(u64::MAX);
    let mut out = Vec::new();
    let read = ZlibDecoder::new(compressed)
        .take(limit)
        .read_to_end(&mut out)
        .map_err(|e| malformed(format!("inflate failed: {e}")))?;

    if read < expected {
        return Err(malformed(format!(
            "image data truncated: inflated {read} of {expected} bytes"
        )));
    }
    Ok(out)
}

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::malformed(ImageFormat::Png, reason)
}
