//! Error types shared by the format decoders.
//!
//! Every failure is terminal: a decode either returns a complete
//! [`DecodedImage`](crate::DecodedImage) or one of these errors, never a
//! partially filled buffer.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Raster formats understood by the decoders.
///
/// Declaration order is the order in which formats are tried when the
/// caller gives no usable extension hint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Portable Network Graphics.
    #[strum(serialize = "PNG")]
    Png,
    /// Graphics Interchange Format (87a and 89a).
    #[strum(serialize = "GIF")]
    Gif,
}

impl ImageFormat {
    /// Canonical lowercase file extension for the format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// Coarse classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes are not a well-formed file of the format.
    Format,
    /// The file is well formed but uses a feature this decoder does not
    /// implement (interlacing, palettes, 16-bit samples, ...).
    Unsupported,
}

/// Error returned by a format decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Malformed input: bad signature, truncated or overflowing length,
    /// invalid filter type, out-of-range code or color index, zero
    /// dimensions, or a failed inflate.
    #[error("{format}: malformed data: {reason}")]
    Format {
        /// Decoder that rejected the input.
        format: ImageFormat,
        /// Human-readable description of the defect.
        reason: String,
    },

    /// Valid input that relies on a feature outside the supported subset.
    #[error("{format}: unsupported feature: {feature}")]
    Unsupported {
        /// Decoder that rejected the input.
        format: ImageFormat,
        /// The feature that was encountered.
        feature: String,
    },
}

impl DecodeError {
    /// Build a [`DecodeError::Format`].
    #[must_use]
    pub fn malformed(format: ImageFormat, reason: impl Into<String>) -> Self {
        Self::Format {
            format,
            reason: reason.into(),
        }
    }

    /// Build a [`DecodeError::Unsupported`].
    #[must_use]
    pub fn unsupported(format: ImageFormat, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            format,
            feature: feature.into(),
        }
    }

    /// Which of the two error kinds this is.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Format { .. } => ErrorKind::Format,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }

    /// The decoder that produced the error.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        match self {
            Self::Format { format, .. } | Self::Unsupported { format, .. } => *format,
        }
    }
}
