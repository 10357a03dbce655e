//! [GIF89a Appendix F. Variable-Length-Code LZW Compression](https://www.w3.org/Graphics/GIF/spec-gif89a.txt)
//!
//! Decompresses the color-index stream of one image. Codes are packed
//! least-significant-bit first and start one bit wider than the minimum code
//! size, growing to at most 12 bits as the dictionary fills.
//!
//! The dictionary stores each entry as `(prefix code, last byte)` plus the
//! entry's first byte and length, so adding an entry is O(1) and emitting one
//! writes its bytes back to front without allocating.

use glimmer_common::warning::warn_once;
use glimmer_common::{DecodeError, ImageFormat};
use thiserror::Error;

/// Codes are at most 12 bits wide.
const MAX_CODE_SIZE: u8 = 12;

/// Dictionary capacity (2^12).
pub const MAX_ENTRIES: usize = 1 << MAX_CODE_SIZE;

/// Errors raised while decoding an LZW code stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LzwError {
    /// The image's minimum code size is outside 2..=8.
    #[error("LZW minimum code size {0} is outside 2..=8")]
    InvalidMinCodeSize(u8),

    /// A code refers past the next unassigned dictionary slot.
    #[error("LZW code {code} is beyond the next dictionary slot {next}")]
    CodeOutOfRange {
        /// The offending code.
        code: u16,
        /// The next code that would have been assigned.
        next: u16,
    },

    /// The "not yet assigned" code arrived with no previous code to extend.
    #[error("LZW code {code} needs a previous code but follows a reset")]
    MissingPrevious {
        /// The offending code.
        code: u16,
    },
}

impl From<LzwError> for DecodeError {
    fn from(err: LzwError) -> Self {
        Self::malformed(ImageFormat::Gif, err.to_string())
    }
}

/// Least-significant-bit-first code reader.
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bits: u32,
    count: u8,
}

impl<'a> BitReader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bits: 0,
            count: 0,
        }
    }

    /// Next `width`-bit code, or `None` once the input cannot supply one.
    fn read(&mut self, width: u8) -> Option<u16> {
        while self.count < width {
            let byte = *self.data.get(self.pos)?;
            self.pos += 1;
            self.bits |= u32::from(byte) << self.count;
            self.count += 8;
        }
        let code = self.bits & ((1 << width) - 1);
        self.bits >>= width;
        self.count -= width;
        u16::try_from(code).ok()
    }
}

/// Variable-width LZW decoder for a single GIF image.
pub struct LzwDecoder {
    min_code_size: u8,
    clear_code: u16,
    end_code: u16,
    code_size: u8,
    next_code: u16,
    previous: Option<u16>,
    prefix: Vec<u16>,
    suffix: Vec<u8>,
    first: Vec<u8>,
    length: Vec<u16>,
}

impl LzwDecoder {
    /// Create a decoder whose dictionary is seeded with `1 << min_code_size`
    /// single-byte entries.
    ///
    /// # Errors
    ///
    /// Returns [`LzwError::InvalidMinCodeSize`] unless `min_code_size` is in
    /// 2..=8.
    pub fn new(min_code_size: u8) -> Result<Self, LzwError> {
        if !(2..=8).contains(&min_code_size) {
            return Err(LzwError::InvalidMinCodeSize(min_code_size));
        }
        let clear_code = 1u16 << min_code_size;

        let mut decoder = Self {
            min_code_size,
            clear_code,
            end_code: clear_code + 1,
            code_size: min_code_size + 1,
            next_code: clear_code + 2,
            previous: None,
            prefix: vec![0; MAX_ENTRIES],
            suffix: vec![0; MAX_ENTRIES],
            first: vec![0; MAX_ENTRIES],
            length: vec![0; MAX_ENTRIES],
        };
        for (slot, byte) in (0..=u8::MAX).enumerate().take(usize::from(clear_code)) {
            decoder.suffix[slot] = byte;
            decoder.first[slot] = byte;
            decoder.length[slot] = 1;
        }
        Ok(decoder)
    }

    /// Drop every learned entry. The single-byte roots are never
    /// overwritten, so only the counters move.
    const fn reset(&mut self) {
        self.code_size = self.min_code_size + 1;
        self.next_code = self.end_code + 1;
        self.previous = None;
    }

    /// Number of codes currently defined, including clear and end.
    #[must_use]
    pub const fn dictionary_len(&self) -> u16 {
        self.next_code
    }

    /// Current code width in bits.
    #[must_use]
    pub const fn code_size(&self) -> u8 {
        self.code_size
    }

    /// Decode `data` into color indices, stopping at the end code, at the
    /// end of the input, or once `limit` indices have been produced.
    /// Output beyond `limit` is discarded.
    ///
    /// Every call starts from the initial dictionary; nothing learned from
    /// an earlier stream carries over. The final state stays observable
    /// through [`Self::dictionary_len`] and [`Self::code_size`].
    ///
    /// # Errors
    ///
    /// Returns [`LzwError`] on a code that the dictionary cannot resolve.
    pub fn decompress(&mut self, data: &[u8], limit: usize) -> Result<Vec<u8>, LzwError> {
        self.reset();
        let mut reader = BitReader::new(data);
        let mut out = Vec::with_capacity(limit.min(data.len().saturating_mul(8)));

        loop {
            if out.len() >= limit {
                break;
            }
            let Some(code) = reader.read(self.code_size) else {
                warn_once("GIF", "LZW stream ends without an end code");
                break;
            };

            if code == self.end_code {
                break;
            }
            if code == self.clear_code {
                self.reset();
                continue;
            }

            let first_byte = if code < self.next_code {
                self.first[usize::from(code)]
            } else if code == self.next_code {
                let previous = self.previous.ok_or(LzwError::MissingPrevious { code })?;
                self.first[usize::from(previous)]
            } else {
                return Err(LzwError::CodeOutOfRange {
                    code,
                    next: self.next_code,
                });
            };

            if let Some(previous) = self.previous {
                self.add_entry(previous, first_byte);
            }
            self.emit(code, &mut out);
            self.previous = Some(code);
        }

        out.truncate(limit);
        Ok(out)
    }

    /// Define `next_code` as the entry for `prefix` followed by `byte`, unless
    /// the dictionary is full.
    fn add_entry(&mut self, prefix: u16, byte: u8) {
        let slot = usize::from(self.next_code);
        if slot >= MAX_ENTRIES {
            return;
        }
        let parent = usize::from(prefix);
        self.prefix[slot] = prefix;
        self.suffix[slot] = byte;
        self.first[slot] = self.first[parent];
        self.length[slot] = self.length[parent] + 1;
        self.next_code += 1;

        if self.next_code > (1 << self.code_size) - 1 && self.code_size < MAX_CODE_SIZE {
            self.code_size += 1;
        }
    }

    /// Append the bytes of entry `code` to `out`.
    fn emit(&self, code: u16, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + usize::from(self.length[usize::from(code)]), 0);

        let mut current = code;
        for slot in out[start..].iter_mut().rev() {
            let index = usize::from(current);
            *slot = self.suffix[index];
            current = self.prefix[index];
        }
    }
}

/// Decode a complete LZW code stream with a fresh dictionary.
///
/// # Errors
///
/// See [`LzwDecoder::new`] and [`LzwDecoder::decompress`].
pub fn decompress(data: &[u8], min_code_size: u8, limit: usize) -> Result<Vec<u8>, LzwError> {
    LzwDecoder::new(min_code_size)?.decompress(data, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_reader_is_lsb_first() {
        // 0b1010_1100, 0b0000_0001 → 3-bit codes 100, 101, 110 (wraps into byte 2)
        let mut reader = BitReader::new(&[0b1010_1100, 0b0000_0001]);
        assert_eq!(reader.read(3), Some(0b100));
        assert_eq!(reader.read(3), Some(0b101));
        assert_eq!(reader.read(3), Some(0b110));
        assert_eq!(reader.read(12), None);
    }

    #[test]
    fn test_rejects_bad_min_code_size() {
        assert_eq!(
            LzwDecoder::new(1).err(),
            Some(LzwError::InvalidMinCodeSize(1))
        );
        assert_eq!(
            LzwDecoder::new(9).err(),
            Some(LzwError::InvalidMinCodeSize(9))
        );
    }

    #[test]
    fn test_code_width_grows_with_dictionary() {
        let mut decoder = LzwDecoder::new(2).unwrap();
        assert_eq!(decoder.code_size(), 3);
        assert_eq!(decoder.dictionary_len(), 6);
        decoder.add_entry(1, 1);
        decoder.add_entry(6, 1);
        assert_eq!(decoder.dictionary_len(), 8);
        assert_eq!(decoder.code_size(), 4);
    }

    #[test]
    fn test_emit_walks_prefix_chain() {
        let mut decoder = LzwDecoder::new(2).unwrap();
        decoder.add_entry(1, 2); // 6 = [1, 2]
        decoder.add_entry(6, 3); // 7 = [1, 2, 3]
        let mut out = vec![9];
        decoder.emit(7, &mut out);
        assert_eq!(out, [9, 1, 2, 3]);
    }

    #[test]
    fn test_decompress_starts_from_fresh_dictionary() {
        // Codes 1, 1, 6 at 3 bits, then end(5) at 4 bits once the width grows.
        let stream = [0x89, 0x0B];
        let mut decoder = LzwDecoder::new(2).unwrap();
        assert_eq!(decoder.decompress(&stream, 16).unwrap(), [1, 1, 1, 1]);
        assert_eq!(decoder.code_size(), 4);
        assert_eq!(decoder.dictionary_len(), 8);

        // Read again at the initial width, not the grown one.
        assert_eq!(decoder.decompress(&stream, 16).unwrap(), [1, 1, 1, 1]);
        assert_eq!(decoder.code_size(), 4);
        assert_eq!(decoder.dictionary_len(), 8);
    }
}
