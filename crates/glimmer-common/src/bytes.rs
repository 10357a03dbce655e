//! Bounds-checked integer extraction over untrusted byte slices.
//!
//! Every helper takes the whole input plus an absolute offset and returns
//! `None` instead of panicking when the read would cross the end of the
//! slice. Offsets are combined with `checked_add`, so a hostile length field
//! cannot wrap around and alias earlier bytes.

/// Return `len` bytes starting at `offset`, or `None` if any of them lie
/// outside `data`.
#[must_use]
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    let end = offset.checked_add(len)?;
    data.get(offset..end)
}

/// Read the byte at `offset`.
#[must_use]
pub fn u8_at(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

/// Read a fixed-size array starting at `offset`.
#[must_use]
pub fn array_at<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    slice_at(data, offset, N)?.try_into().ok()
}

/// Read a four-byte tag (PNG chunk type, GIF application identifier, ...).
#[must_use]
pub fn tag_at(data: &[u8], offset: usize) -> Option<[u8; 4]> {
    array_at::<4>(data, offset)
}

/// Read a little-endian `u16` (GIF byte order).
#[must_use]
pub fn u16_le_at(data: &[u8], offset: usize) -> Option<u16> {
    array_at::<2>(data, offset).map(u16::from_le_bytes)
}

/// Read a big-endian `u16`.
#[must_use]
pub fn u16_be_at(data: &[u8], offset: usize) -> Option<u16> {
    array_at::<2>(data, offset).map(u16::from_be_bytes)
}

/// Read a big-endian `u32` (PNG network byte order).
#[must_use]
pub fn u32_be_at(data: &[u8], offset: usize) -> Option<u32> {
    array_at::<4>(data, offset).map(u32::from_be_bytes)
}
