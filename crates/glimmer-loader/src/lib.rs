//! Image loading facade: pick a decoder, decode, report every failure.
//!
//! The rest of an application needs one entry point that turns file bytes
//! into a [`DecodedImage`]. This crate provides it in three layers:
//!
//! 1. **Detect** - [`format_from_path()`] maps a `.png`/`.gif` extension
//!    (case-insensitive, URL query and fragment ignored) to an
//!    [`ImageFormat`].
//! 2. **Decode** - the [`ImageDecoder`] trait with [`PngDecoder`] and
//!    [`GifDecoder`] implementations, reached through [`decode_as()`].
//! 3. **Fallback** - without a recognized extension, [`decode_with()`] tries
//!    every format in [`ImageFormat`] order and returns the first success,
//!    or [`LoadError::AllFailed`] listing each attempt.
//!
//! Nothing is cached; each call is independent.

pub mod format;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glimmer_common::{DecodeError, DecodeOptions, DecodedImage, ImageFormat};
use strum::IntoEnumIterator;
use thiserror::Error;

pub use format::{format_from_path, strip_url_decorations};

/// A decoder that can turn raw bytes into a [`DecodedImage`].
pub trait ImageDecoder {
    /// Format this decoder handles.
    fn format(&self) -> ImageFormat;

    /// Attempt to decode `bytes`.
    ///
    /// # Errors
    ///
    /// Returns the decoder's [`DecodeError`] if the bytes are malformed or
    /// use an unsupported feature.
    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<DecodedImage, DecodeError>;
}

/// Decodes PNG files via `glimmer-png`.
pub struct PngDecoder;

impl ImageDecoder for PngDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<DecodedImage, DecodeError> {
        glimmer_png::decode_with(bytes, options)
    }
}

/// Decodes GIF files via `glimmer-gif`.
pub struct GifDecoder;

impl ImageDecoder for GifDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<DecodedImage, DecodeError> {
        glimmer_gif::decode_with(bytes, options)
    }
}

/// The decoder registered for `format`.
#[must_use]
pub fn decoder_for(format: ImageFormat) -> &'static dyn ImageDecoder {
    match format {
        ImageFormat::Png => &PngDecoder,
        ImageFormat::Gif => &GifDecoder,
    }
}

/// One failed decoder in a fallback run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Why it failed.
    pub error: DecodeError,
}

impl Attempt {
    /// Format that was tried, as reported by the error.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.error.format()
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // DecodeError already leads with the format name.
        write!(f, "{}", self.error)
    }
}

/// Error returned by the facade.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The decoder chosen by extension rejected the data.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// No extension hint applied and every decoder rejected the data.
    #[error("no decoder accepted the data: {}", list_attempts(.0))]
    AllFailed(Vec<Attempt>),
}

impl LoadError {
    /// Every decoder failure behind this error, in trial order. Empty for
    /// [`LoadError::Io`].
    #[must_use]
    pub fn attempts(&self) -> Vec<Attempt> {
        match self {
            Self::Io { .. } => Vec::new(),
            Self::Decode(error) => vec![Attempt { error: error.clone() }],
            Self::AllFailed(attempts) => attempts.clone(),
        }
    }
}

fn list_attempts(attempts: &[Attempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decode `bytes` with the decoder for `format`.
///
/// # Errors
///
/// Returns that decoder's [`DecodeError`].
pub fn decode_as(
    format: ImageFormat,
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<DecodedImage, DecodeError> {
    decoder_for(format).decode(bytes, options)
}

/// [`decode_with`] using [`DecodeOptions::default`].
///
/// # Errors
///
/// See [`decode_with`].
pub fn decode(bytes: &[u8], path_hint: &str) -> Result<DecodedImage, LoadError> {
    decode_with(bytes, path_hint, &DecodeOptions::default())
}

/// Decode `bytes`, choosing the decoder from the extension of `path_hint`.
///
/// A recognized extension selects exactly one decoder. Otherwise PNG and
/// then GIF are tried and the first success wins. `path_hint` may be empty.
///
/// # Errors
///
/// Returns [`LoadError::Decode`] when the extension-selected decoder fails
/// and [`LoadError::AllFailed`] when every fallback attempt fails.
pub fn decode_with(
    bytes: &[u8],
    path_hint: &str,
    options: &DecodeOptions,
) -> Result<DecodedImage, LoadError> {
    format::warn_url_decorations(path_hint);
    decode_hinted(bytes, format_from_path(path_hint), options)
}

fn decode_hinted(
    bytes: &[u8],
    hint: Option<ImageFormat>,
    options: &DecodeOptions,
) -> Result<DecodedImage, LoadError> {
    if let Some(format) = hint {
        return Ok(decode_as(format, bytes, options)?);
    }

    let mut attempts = Vec::new();
    for decoder in ImageFormat::iter().map(decoder_for) {
        match decoder.decode(bytes, options) {
            Ok(image) => return Ok(image),
            Err(error) => attempts.push(Attempt { error }),
        }
    }
    Err(LoadError::AllFailed(attempts))
}

/// [`decode_file_with`] using [`DecodeOptions::default`].
///
/// # Errors
///
/// See [`decode_file_with`].
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedImage, LoadError> {
    decode_file_with(path, &DecodeOptions::default())
}

/// Read the file at `path` and decode it, choosing the decoder from the
/// path's extension as [`decode_with`] does.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise the
/// errors of [`decode_with`].
pub fn decode_file_with(
    path: impl AsRef<Path>,
    options: &DecodeOptions,
) -> Result<DecodedImage, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let hint = path.extension().and_then(format::format_from_extension);
    decode_hinted(&bytes, hint, options)
}
