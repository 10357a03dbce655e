//! [PNG § 9 Filtering](https://www.w3.org/TR/png-3/#9Filters)
//!
//! Reverses the per-scanline delta encoding. Reconstruction of a byte reads
//! bytes that were already reconstructed (to its left and in the row above),
//! so rows are processed strictly in order.

use glimmer_common::{DecodeError, ImageFormat};

/// [§ 9.2 Filter types for filter method 0](https://www.w3.org/TR/png-3/#9Filter-types)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// 0: bytes are stored as-is.
    None,
    /// 1: delta from the byte one pixel to the left.
    Sub,
    /// 2: delta from the byte directly above.
    Up,
    /// 3: delta from the floored mean of left and above.
    Average,
    /// 4: delta from the Paeth predictor of left, above and upper-left.
    Paeth,
}

impl TryFrom<u8> for FilterType {
    type Error = DecodeError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::None),
            1 => Ok(Self::Sub),
            2 => Ok(Self::Up),
            3 => Ok(Self::Average),
            4 => Ok(Self::Paeth),
            other => Err(DecodeError::malformed(
                ImageFormat::Png,
                format!("invalid filter type {other}"),
            )),
        }
    }
}

/// [§ 9.4 Filter type 4: Paeth](https://www.w3.org/TR/png-3/#9Filter-type-4-Paeth)
///
/// Picks whichever of `a` (left), `b` (above), `c` (upper-left) is closest to
/// `a + b - c`, preferring `a`, then `b`, on ties.
#[must_use]
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Floor of `(a + b) / 2` without widening.
const fn average(a: u8, b: u8) -> u8 {
    (a >> 1) + (b >> 1) + (a & b & 1)
}

/// Reconstruct one row in place.
///
/// `previous` is the already-reconstructed row above, or `None` for the first
/// row (every "above" byte is then zero). `bpp` is the distance in bytes to
/// the corresponding byte of the pixel on the left.
pub fn unfilter_row(filter: FilterType, bpp: usize, previous: Option<&[u8]>, current: &mut [u8]) {
    let above = |x: usize| previous.and_then(|row| row.get(x).copied()).unwrap_or(0);

    match filter {
        FilterType::None => {}
        FilterType::Sub => {
            for x in bpp..current.len() {
                current[x] = current[x].wrapping_add(current[x - bpp]);
            }
        }
        FilterType::Up => {
            for x in 0..current.len() {
                current[x] = current[x].wrapping_add(above(x));
            }
        }
        FilterType::Average => {
            for x in 0..current.len() {
                let left = if x >= bpp { current[x - bpp] } else { 0 };
                current[x] = current[x].wrapping_add(average(left, above(x)));
            }
        }
        FilterType::Paeth => {
            for x in 0..current.len() {
                let (left, upper_left) = if x >= bpp {
                    (current[x - bpp], above(x - bpp))
                } else {
                    (0, 0)
                };
                current[x] = current[x].wrapping_add(paeth_predictor(left, above(x), upper_left));
            }
        }
    }
}

/// Reconstruct every row of an inflated image.
///
/// `filtered` holds `height` rows of one filter-type byte followed by
/// `stride` sample bytes. Bytes past the last row are ignored. The result
/// holds only the samples, `stride * height` bytes.
///
/// # Errors
///
/// Returns [`DecodeError::Format`] if `filtered` is too short for `height`
/// rows or a row carries an unknown filter type.
pub fn unfilter_scanlines(
    filtered: &[u8],
    stride: usize,
    height: usize,
    bpp: usize,
) -> Result<Vec<u8>, DecodeError> {
    let too_large = || DecodeError::malformed(ImageFormat::Png, "scanline size overflows memory");
    let row_len = stride.checked_add(1).ok_or_else(too_large)?;
    let needed = row_len.checked_mul(height).ok_or_else(too_large)?;
    if filtered.len() < needed {
        return Err(DecodeError::malformed(
            ImageFormat::Png,
            format!(
                "image data truncated: {} bytes for {height} rows of {row_len}",
                filtered.len()
            ),
        ));
    }

    let mut out = vec![0u8; stride * height];
    for (y, line) in filtered.chunks_exact(row_len).take(height).enumerate() {
        let Some((&filter_byte, samples)) = line.split_first() else {
            continue;
        };
        let filter = FilterType::try_from(filter_byte)?;

        let (done, rest) = out.split_at_mut(y * stride);
        let current = &mut rest[..stride];
        current.copy_from_slice(samples);

        let previous = (y > 0).then(|| &done[done.len() - stride..]);
        unfilter_row(filter, bpp, previous, current);
    }

    Ok(out)
}
