//! [GIF89a § 17. Header](https://www.w3.org/Graphics/GIF/spec-gif89a.txt) and
//! [§ 18. Logical Screen Descriptor](https://www.w3.org/Graphics/GIF/spec-gif89a.txt)

use glimmer_common::bytes::{u8_at, u16_le_at};
use glimmer_common::{DecodeError, ImageFormat};

use crate::color_table::ColorTable;

/// Header plus logical screen descriptor.
const SCREEN_END: usize = 13;

/// Global color table flag in the screen's packed fields.
const GLOBAL_TABLE_FLAG: u8 = 0x80;

/// Canvas description that precedes every block in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalScreen {
    /// Canvas width in pixels, non-zero.
    pub width: u16,
    /// Canvas height in pixels, non-zero.
    pub height: u16,
    /// Palette shared by images without a local table.
    pub global_table: Option<ColorTable>,
    /// Offset of the first block after the header and global table.
    pub blocks_offset: usize,
}

impl LogicalScreen {
    /// Validate the signature and read the screen descriptor and global
    /// color table.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Format`] if the input is shorter than 13 bytes,
    /// the signature is not `GIF87a`/`GIF89a`, the canvas has a zero
    /// dimension, or the global color table is truncated.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < SCREEN_END {
            return Err(malformed(format!(
                "{} bytes is too short for a header and screen descriptor",
                data.len()
            )));
        }
        if !data.starts_with(b"GIF87a") && !data.starts_with(b"GIF89a") {
            return Err(malformed("signature mismatch"));
        }

        let truncated = || malformed("screen descriptor truncated");
        let width = u16_le_at(data, 6).ok_or_else(truncated)?;
        let height = u16_le_at(data, 8).ok_or_else(truncated)?;
        let flags = u8_at(data, 10).ok_or_else(truncated)?;
        // Bytes 11 and 12 (background color index, pixel aspect ratio) have
        // no effect on a single decoded frame.

        if width == 0 || height == 0 {
            return Err(malformed(format!("zero canvas dimension {width}x{height}")));
        }

        let (global_table, blocks_offset) = if flags & GLOBAL_TABLE_FLAG == 0 {
            (None, SCREEN_END)
        } else {
            let size = ColorTable::size_from_flags(flags);
            let table = ColorTable::parse(data, SCREEN_END, size)?;
            (Some(table), SCREEN_END + size * 3)
        };

        Ok(Self {
            width,
            height,
            global_table,
            blocks_offset,
        })
    }

    /// `width * height`.
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::malformed(ImageFormat::Gif, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_without_global_table() {
        let data = b"GIF87a\x03\x00\x02\x00\x00\x00\x00;";
        let screen = LogicalScreen::parse(data).unwrap();
        assert_eq!((screen.width, screen.height), (3, 2));
        assert!(screen.global_table.is_none());
        assert_eq!(screen.blocks_offset, 13);
    }

    #[test]
    fn test_screen_with_global_table() {
        let mut data = b"GIF89a\x01\x00\x01\x00\x80\x00\x00".to_vec();
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        let screen = LogicalScreen::parse(&data).unwrap();
        assert_eq!(screen.global_table.unwrap().len(), 2);
        assert_eq!(screen.blocks_offset, 19);
    }

    #[test]
    fn test_rejects_bad_headers() {
        assert!(LogicalScreen::parse(b"GIF89a\x01\x00").is_err());
        assert!(LogicalScreen::parse(b"GIF88a\x01\x00\x01\x00\x00\x00\x00").is_err());
        assert!(LogicalScreen::parse(b"GIF89a\x00\x00\x01\x00\x00\x00\x00").is_err());
        // Table flag set but no table bytes.
        assert!(LogicalScreen::parse(b"GIF89a\x01\x00\x01\x00\x80\x00\x00").is_err());
    }
}
