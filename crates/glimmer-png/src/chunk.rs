//! [PNG § 5 Datastream structure](https://www.w3.org/TR/png-3/#5DataRep)
//!
//! Signature check and chunk scanning. Chunks are borrowed views into the
//! input; nothing is copied until the decoder concatenates `IDAT` payloads.

use flate2::Crc;
use glimmer_common::bytes::{slice_at, tag_at, u32_be_at};
use glimmer_common::{DecodeError, ImageFormat};

/// [§ 5.2 PNG signature](https://www.w3.org/TR/png-3/#5PNG-file-signature)
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Length field + type field + CRC field.
const CHUNK_OVERHEAD: usize = 12;

/// Reject input that does not start with the PNG signature.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] if `bytes` is shorter than eight bytes or
/// the first eight bytes differ from [`PNG_SIGNATURE`].
pub fn check_signature(bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() < PNG_SIGNATURE.len() {
        return Err(DecodeError::malformed(
            ImageFormat::Png,
            format!("{} bytes is too short for a signature", bytes.len()),
        ));
    }
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(DecodeError::malformed(ImageFormat::Png, "signature mismatch"));
    }
    Ok(())
}

/// [§ 5.3 Chunk layout](https://www.w3.org/TR/png-3/#5Chunk-layout)
///
/// One chunk: `length (4, BE) | type (4) | data (length) | crc (4)`.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// Four-letter chunk type.
    pub kind: [u8; 4],
    /// Chunk payload.
    pub data: &'a [u8],
    /// CRC-32 as stored in the file.
    pub crc: u32,
}

impl Chunk<'_> {
    /// Chunk type as text, for diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }

    /// [§ 5.4 Chunk naming conventions](https://www.w3.org/TR/png-3/#5Chunk-naming-conventions)
    ///
    /// A chunk is critical when bit 5 of the first type byte is clear
    /// (uppercase letter).
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        self.kind[0] & 0x20 == 0
    }

    /// CRC-32 computed over the type and data fields.
    #[must_use]
    pub fn computed_crc(&self) -> u32 {
        let mut crc = Crc::new();
        crc.update(&self.kind);
        crc.update(self.data);
        crc.sum()
    }

    /// Compare the stored CRC against the computed one.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Format`] on mismatch.
    pub fn verify_crc(&self) -> Result<(), DecodeError> {
        let computed = self.computed_crc();
        if computed == self.crc {
            Ok(())
        } else {
            Err(DecodeError::malformed(
                ImageFormat::Png,
                format!(
                    "CRC mismatch in '{}' chunk: stored {:#010x}, computed {computed:#010x}",
                    self.name(),
                    self.crc
                ),
            ))
        }
    }
}

/// Walks the chunks that follow the signature.
///
/// Yields `Err` once (and then stops) if a chunk header is cut short or a
/// declared length reaches past the end of the input.
pub struct ChunkIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkIter<'a> {
    /// Start scanning `data`, which must begin with the signature.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: PNG_SIGNATURE.len(),
        }
    }

    fn fail(&mut self, reason: String) -> Option<Result<Chunk<'a>, DecodeError>> {
        self.pos = self.data.len();
        Some(Err(DecodeError::malformed(ImageFormat::Png, reason)))
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<Chunk<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.data.len().saturating_sub(self.pos);
        if remaining == 0 {
            return None;
        }
        if remaining < CHUNK_OVERHEAD {
            return self.fail(format!(
                "{remaining} trailing bytes at offset {} are too short for a chunk",
                self.pos
            ));
        }

        let (Some(length), Some(kind)) = (
            u32_be_at(self.data, self.pos),
            tag_at(self.data, self.pos + 4),
        ) else {
            return self.fail(format!("unreadable chunk header at offset {}", self.pos));
        };

        let data_start = self.pos + 8;
        let Some(data) = usize::try_from(length)
            .ok()
            .and_then(|len| slice_at(self.data, data_start, len))
        else {
            return self.fail(format!(
                "'{}' chunk at offset {} declares {length} bytes, past the end of the file",
                String::from_utf8_lossy(&kind),
                self.pos
            ));
        };

        let crc_start = data_start + data.len();
        let Some(crc) = u32_be_at(self.data, crc_start) else {
            return self.fail(format!(
                "'{}' chunk at offset {} is missing its CRC",
                String::from_utf8_lossy(&kind),
                self.pos
            ));
        };

        self.pos = crc_start + 4;
        Some(Ok(Chunk { kind, data, crc }))
    }
}
