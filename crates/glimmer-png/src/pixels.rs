//! Sample-to-ARGB32 conversion.

use glimmer_common::pack_argb;

use crate::header::ColorType;

/// Pack unfiltered 8-bit samples into `0xAARRGGBB` pixels.
///
/// Truecolor pixels get an alpha of `0xFF`. A trailing partial pixel is
/// dropped; callers size `samples` from the header so none is expected.
#[must_use]
pub fn to_argb(samples: &[u8], color_type: ColorType) -> Vec<u32> {
    match color_type {
        ColorType::Truecolor => samples
            .chunks_exact(3)
            .map(|px| pack_argb(0xFF, px[0], px[1], px[2]))
            .collect(),
        ColorType::TruecolorAlpha => samples
            .chunks_exact(4)
            .map(|px| pack_argb(px[3], px[0], px[1], px[2]))
            .collect(),
    }
}
