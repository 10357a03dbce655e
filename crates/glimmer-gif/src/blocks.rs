//! Block-level structures that follow the logical screen.
//!
//! [GIF89a § 15. Data Sub-blocks](https://www.w3.org/Graphics/GIF/spec-gif89a.txt),
//! [§ 20. Image Descriptor](https://www.w3.org/Graphics/GIF/spec-gif89a.txt),
//! [§ 23. Graphic Control Extension](https://www.w3.org/Graphics/GIF/spec-gif89a.txt)

use glimmer_common::bytes::{slice_at, u8_at, u16_le_at};
use glimmer_common::{DecodeError, ImageFormat};

/// Introduces an extension block.
pub const EXTENSION_INTRODUCER: u8 = 0x21;
/// Introduces an image descriptor.
pub const IMAGE_SEPARATOR: u8 = 0x2C;
/// Ends the stream.
pub const TRAILER: u8 = 0x3B;
/// Extension label of the graphic control extension.
pub const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;

const LOCAL_TABLE_FLAG: u8 = 0x80;
const INTERLACE_FLAG: u8 = 0x40;

/// Concatenate a chain of length-prefixed sub-blocks starting at `offset`.
///
/// Returns the payload and the offset just past the zero-length terminator.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] if a length byte or block runs past the
/// end of `data`.
pub fn read_sub_blocks(data: &[u8], mut offset: usize) -> Result<(Vec<u8>, usize), DecodeError> {
    let mut payload = Vec::new();
    loop {
        let len = u8_at(data, offset).ok_or_else(|| truncated(offset))?;
        offset += 1;
        if len == 0 {
            return Ok((payload, offset));
        }
        let block = slice_at(data, offset, usize::from(len)).ok_or_else(|| truncated(offset))?;
        payload.extend_from_slice(block);
        offset += block.len();
    }
}

/// Step over a chain of sub-blocks without keeping their contents.
///
/// # Errors
///
/// Same as [`read_sub_blocks`].
pub fn skip_sub_blocks(data: &[u8], mut offset: usize) -> Result<usize, DecodeError> {
    loop {
        let len = u8_at(data, offset).ok_or_else(|| truncated(offset))?;
        offset += 1;
        if len == 0 {
            return Ok(offset);
        }
        let block = slice_at(data, offset, usize::from(len)).ok_or_else(|| truncated(offset))?;
        offset += block.len();
    }
}

fn truncated(offset: usize) -> DecodeError {
    DecodeError::malformed(
        ImageFormat::Gif,
        format!("sub-block chain truncated at offset {offset}"),
    )
}

/// The parts of a graphic control extension that affect one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphicControl {
    /// Disposal method (bits 2-4 of the packed fields).
    pub disposal: u8,
    /// Delay before the next frame, in hundredths of a second.
    pub delay: u16,
    /// Color index to render as transparent, if the flag is set.
    pub transparent_index: Option<u8>,
}

impl GraphicControl {
    /// Parse the sub-block chain that follows the `0xF9` label.
    ///
    /// Returns the control data (defaults if the first block is shorter than
    /// four bytes) and the offset past the chain.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Format`] if the chain is truncated.
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        let (payload, next) = read_sub_blocks(data, offset)?;
        let control = match (u8_at(&payload, 0), u16_le_at(&payload, 1), u8_at(&payload, 3)) {
            (Some(packed), Some(delay), Some(index)) => Self {
                disposal: (packed >> 2) & 0x07,
                delay,
                transparent_index: (packed & 0x01 != 0).then_some(index),
            },
            _ => Self::default(),
        };
        Ok((control, next))
    }
}

/// Position and size of one image on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Column of the image's left edge on the canvas.
    pub left: u16,
    /// Row of the image's top edge on the canvas.
    pub top: u16,
    /// Image width, non-zero.
    pub width: u16,
    /// Image height, non-zero.
    pub height: u16,
}

impl ImageDescriptor {
    /// Parse the nine bytes after the `0x2C` separator.
    ///
    /// Returns the descriptor and the offset of the LZW minimum code size.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Format`] if truncated or zero-sized, and
    /// [`DecodeError::Unsupported`] if the image carries a local color table
    /// or is interlaced.
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        let truncated = || {
            DecodeError::malformed(
                ImageFormat::Gif,
                format!("image descriptor at offset {offset} is truncated"),
            )
        };
        let field = |at: usize| u16_le_at(data, offset + at).ok_or_else(truncated);
        let left = field(0)?;
        let top = field(2)?;
        let width = field(4)?;
        let height = field(6)?;
        let flags = u8_at(data, offset + 8).ok_or_else(truncated)?;

        if flags & LOCAL_TABLE_FLAG != 0 {
            return Err(DecodeError::unsupported(ImageFormat::Gif, "local color tables"));
        }
        if flags & INTERLACE_FLAG != 0 {
            return Err(DecodeError::unsupported(ImageFormat::Gif, "interlaced images"));
        }
        if width == 0 || height == 0 {
            return Err(DecodeError::malformed(
                ImageFormat::Gif,
                format!("zero image dimension {width}x{height}"),
            ));
        }

        Ok((
            Self {
                left,
                top,
                width,
                height,
            },
            offset + 9,
        ))
    }

    /// `width * height`.
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}
