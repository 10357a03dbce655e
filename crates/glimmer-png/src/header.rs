//! [§ 11.2.1 IHDR Image header](https://www.w3.org/TR/png-3/#11IHDR)

use glimmer_common::bytes::{u8_at, u32_be_at};
use glimmer_common::{DecodeError, ImageFormat};

/// Size of the IHDR payload.
const IHDR_LEN: usize = 13;

/// Largest width or height the format allows (2^31 - 1).
const MAX_DIMENSION: u32 = 0x7FFF_FFFF;

/// [§ 6.1 Colour types and values](https://www.w3.org/TR/png-3/#6Colour-values)
///
/// Only the truecolor variants are decoded; the others are recognised so
/// they can be reported as unsupported rather than malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// Color type 2: R, G, B samples.
    Truecolor,
    /// Color type 6: R, G, B, A samples.
    TruecolorAlpha,
}

impl ColorType {
    /// Bytes per pixel at 8 bits per sample.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Truecolor => 3,
            Self::TruecolorAlpha => 4,
        }
    }

    fn from_code(code: u8) -> Result<Self, DecodeError> {
        match code {
            2 => Ok(Self::Truecolor),
            6 => Ok(Self::TruecolorAlpha),
            0 => Err(unsupported("greyscale color type (0)")),
            3 => Err(unsupported("indexed-color (palette) images")),
            4 => Err(unsupported("greyscale with alpha color type (4)")),
            other => Err(malformed(format!("invalid color type {other}"))),
        }
    }
}

/// Validated contents of the IHDR chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Width in pixels, non-zero.
    pub width: u32,
    /// Height in pixels, non-zero.
    pub height: u32,
    /// Bits per sample; always 8 once validated.
    pub bit_depth: u8,
    /// Pixel layout.
    pub color_type: ColorType,
}

impl ImageHeader {
    /// Parse and validate an IHDR payload.
    ///
    /// Structural problems (short chunk, zero or oversized dimensions,
    /// unknown compression/filter/interlace method, invalid color type or
    /// bit depth) are format errors. Legal headers this decoder cannot
    /// handle (palette or greyscale color types, 16-bit samples,
    /// Adam7 interlacing) are unsupported-feature errors.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] as described above.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < IHDR_LEN {
            return Err(malformed(format!(
                "IHDR is {} bytes, expected {IHDR_LEN}",
                data.len()
            )));
        }
        let field = |offset| u8_at(data, offset).ok_or_else(|| malformed("IHDR truncated"));
        let width = u32_be_at(data, 0).ok_or_else(|| malformed("IHDR truncated"))?;
        let height = u32_be_at(data, 4).ok_or_else(|| malformed("IHDR truncated"))?;
        let bit_depth = field(8)?;
        let color_code = field(9)?;
        let compression = field(10)?;
        let filter_method = field(11)?;
        let interlace = field(12)?;

        if width == 0 || height == 0 {
            return Err(malformed(format!("zero dimension {width}x{height}")));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(malformed(format!("dimension {width}x{height} exceeds 2^31-1")));
        }
        if compression != 0 {
            return Err(malformed(format!("unknown compression method {compression}")));
        }
        if filter_method != 0 {
            return Err(malformed(format!("unknown filter method {filter_method}")));
        }

        let color_type = ColorType::from_code(color_code)?;

        match bit_depth {
            8 => {}
            16 => return Err(unsupported("16-bit samples")),
            other => {
                return Err(malformed(format!(
                    "bit depth {other} is not valid for truecolor images"
                )));
            }
        }

        match interlace {
            0 => {}
            1 => return Err(unsupported("Adam7 interlacing")),
            other => return Err(malformed(format!("unknown interlace method {other}"))),
        }

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type,
        })
    }

    /// Bytes in one unfiltered row, excluding the filter-type byte.
    ///
    /// Returns `None` if the row would not fit in memory.
    #[must_use]
    pub fn stride(&self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(self.color_type.bytes_per_pixel())
    }

    /// Bytes the inflated stream must supply: one filter byte plus one
    /// stride per row.
    #[must_use]
    pub fn filtered_len(&self) -> Option<usize> {
        let row = self.stride()?.checked_add(1)?;
        row.checked_mul(usize::try_from(self.height).ok()?)
    }

    /// `width * height`.
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::malformed(ImageFormat::Png, reason)
}

fn unsupported(feature: impl Into<String>) -> DecodeError {
    DecodeError::unsupported(ImageFormat::Png, feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_common::ErrorKind;

    fn ihdr(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[depth, color, 0, 0, interlace]);
        data
    }

    fn kind_of(data: &[u8]) -> ErrorKind {
        ImageHeader::parse(data).unwrap_err().kind()
    }

    #[test]
    fn test_parses_rgba_header() {
        let header = ImageHeader::parse(&ihdr(3, 2, 8, 6, 0)).unwrap();
        assert_eq!(header.width, 3);
        assert_eq!(header.height, 2);
        assert_eq!(header.color_type, ColorType::TruecolorAlpha);
        assert_eq!(header.stride(), Some(12));
        assert_eq!(header.filtered_len(), Some(26));
    }

    #[test]
    fn test_short_header_is_malformed() {
        assert_eq!(kind_of(&ihdr(1, 1, 8, 2, 0)[..12]), ErrorKind::Format);
    }

    #[test]
    fn test_zero_dimensions_are_malformed() {
        assert_eq!(kind_of(&ihdr(0, 1, 8, 2, 0)), ErrorKind::Format);
        assert_eq!(kind_of(&ihdr(1, 0, 8, 2, 0)), ErrorKind::Format);
    }

    #[test]
    fn test_unsupported_color_types() {
        assert_eq!(kind_of(&ihdr(1, 1, 8, 0, 0)), ErrorKind::Unsupported);
        assert_eq!(kind_of(&ihdr(1, 1, 8, 3, 0)), ErrorKind::Unsupported);
        assert_eq!(kind_of(&ihdr(1, 1, 8, 4, 0)), ErrorKind::Unsupported);
        assert_eq!(kind_of(&ihdr(1, 1, 8, 5, 0)), ErrorKind::Format);
    }

    #[test]
    fn test_bit_depth_and_interlace() {
        assert_eq!(kind_of(&ihdr(1, 1, 16, 6, 0)), ErrorKind::Unsupported);
        assert_eq!(kind_of(&ihdr(1, 1, 4, 6, 0)), ErrorKind::Format);
        assert_eq!(kind_of(&ihdr(1, 1, 8, 6, 1)), ErrorKind::Unsupported);
        assert_eq!(kind_of(&ihdr(1, 1, 8, 6, 2)), ErrorKind::Format);
    }
}
