//! [GIF89a § 19. Global Color Table](https://www.w3.org/Graphics/GIF/spec-gif89a.txt)

use glimmer_common::bytes::slice_at;
use glimmer_common::{DecodeError, ImageFormat, pack_argb};

/// An indexed palette of opaque ARGB32 colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries: Vec<u32>,
}

impl ColorTable {
    /// Entry count encoded in the low three bits of a packed-fields byte:
    /// `2^(n + 1)`, so 2 through 256.
    #[must_use]
    pub const fn size_from_flags(flags: u8) -> usize {
        1 << ((flags & 0x07) + 1)
    }

    /// Read `size` RGB triples starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Format`] if the table runs past the end of
    /// `data`.
    pub fn parse(data: &[u8], offset: usize, size: usize) -> Result<Self, DecodeError> {
        let bytes = size
            .checked_mul(3)
            .and_then(|len| slice_at(data, offset, len))
            .ok_or_else(|| {
                DecodeError::malformed(
                    ImageFormat::Gif,
                    format!("{size}-entry color table at offset {offset} is truncated"),
                )
            })?;

        let entries = bytes
            .chunks_exact(3)
            .map(|rgb| pack_argb(0xFF, rgb[0], rgb[1], rgb[2]))
            .collect();
        Ok(Self { entries })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Color for `index`, or `None` past the end of the table.
    #[must_use]
    pub fn get(&self, index: u8) -> Option<u32> {
        self.entries.get(usize::from(index)).copied()
    }

    /// Copy of the table with `index` mapped to transparent black.
    /// An index outside the table changes nothing.
    #[must_use]
    pub fn with_transparent(&self, index: u8) -> Self {
        let mut table = self.clone();
        if let Some(entry) = table.entries.get_mut(usize::from(index)) {
            *entry = 0;
        }
        table
    }

    /// Expand color indices into ARGB32 pixels.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Format`] for the first index at or beyond the
    /// table size.
    pub fn expand(&self, indices: &[u8]) -> Result<Vec<u32>, DecodeError> {
        indices
            .iter()
            .map(|&index| {
                self.get(index).ok_or_else(|| {
                    DecodeError::malformed(
                        ImageFormat::Gif,
                        format!(
                            "color index {index} is outside the {}-entry color table",
                            self.len()
                        ),
                    )
                })
            })
            .collect()
    }
}
