//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// Default ceiling on `width * height` (64 megapixels, a 256 MiB buffer).
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 26;

/// Strictness and resource limits applied by every decoder.
///
/// Deserializes from a partial document; missing fields keep their defaults:
///
/// ```
/// use glimmer_common::DecodeOptions;
///
/// let options: DecodeOptions = serde_json::from_str(r#"{ "verify_crc": true }"#).unwrap();
/// assert!(options.verify_crc);
/// assert!(options.gif_transparency);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Check the CRC-32 of every PNG chunk and reject mismatches.
    pub verify_crc: bool,

    /// Map the transparent color index of a GIF graphic control extension
    /// to fully transparent pixels.
    pub gif_transparency: bool,

    /// Largest `width * height` a decoder will allocate for.
    pub max_pixels: u64,
}

impl DecodeOptions {
    /// Defaults plus CRC verification.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            verify_crc: true,
            gif_transparency: true,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_crc: false,
            gif_transparency: true,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_only_adds_crc() {
        let strict = DecodeOptions::strict();
        let lenient = DecodeOptions::default();
        assert!(strict.verify_crc);
        assert!(!lenient.verify_crc);
        assert_eq!(strict.gif_transparency, lenient.gif_transparency);
        assert_eq!(strict.max_pixels, lenient.max_pixels);
    }

    #[test]
    fn test_empty_document_is_default() {
        let options: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, DecodeOptions::default());
    }
}
