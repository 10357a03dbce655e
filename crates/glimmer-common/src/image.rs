//! Decoded pixel buffer handed back to callers.

/// Pack four channels into one `0xAARRGGBB` pixel.
#[must_use]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    u32::from_be_bytes([a, r, g, b])
}

/// Split a `0xAARRGGBB` pixel into `[a, r, g, b]`.
#[must_use]
pub const fn unpack_argb(pixel: u32) -> [u8; 4] {
    pixel.to_be_bytes()
}

/// A fully decoded image.
///
/// Pixels are packed ARGB32 (`0xAARRGGBB`), row-major, top row first, so the
/// pixel at `(x, y)` lives at `pixels[y * width + x]`. The buffer always holds
/// exactly `width * height` entries; the constructor refuses anything else.
///
/// The decoder keeps no reference to the buffer once it has returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width of the image in pixels.
    width: u32,
    /// Height of the image in pixels.
    height: u32,
    /// Packed ARGB32 pixels (width * height entries).
    pixels: Vec<u32>,
}

impl DecodedImage {
    /// Create a new `DecodedImage` from packed pixels.
    ///
    /// # Arguments
    ///
    /// * `width` - Width of the image in pixels, non-zero
    /// * `height` - Height of the image in pixels, non-zero
    /// * `pixels` - Packed ARGB32 pixels (must be `width * height` entries)
    ///
    /// Returns `None` if either dimension is zero or the pixel count does not
    /// match.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = usize::try_from(u64::from(width) * u64::from(height)).ok()?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Packed ARGB32 pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Give up the image and keep only the pixel buffer.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// The pixel at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = usize::try_from(u64::from(y) * u64::from(self.width) + u64::from(x)).ok()?;
        self.pixels.get(index).copied()
    }

    /// Alpha channel of the pixel at `(x, y)`.
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixel(x, y).map(|p| unpack_argb(p)[0])
    }

    /// Whether every pixel is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.pixels.iter().all(|&p| p >> 24 == 0xFF)
    }

    /// Convert to byte-order RGBA (`width * height * 4` bytes), the layout
    /// most rasterizers and image writers expect.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&p| {
                let [a, r, g, b] = unpack_argb(p);
                [r, g, b, a]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_and_unpack() {
        assert_eq!(pack_argb(0xFF, 0x11, 0x22, 0x33), 0xFF11_2233);
        assert_eq!(unpack_argb(0x8011_2233), [0x80, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_new_enforces_pixel_count() {
        assert!(DecodedImage::new(2, 2, vec![0; 4]).is_some());
        assert!(DecodedImage::new(2, 2, vec![0; 3]).is_none());
        assert!(DecodedImage::new(0, 2, vec![]).is_none());
    }

    #[test]
    fn test_pixel_lookup_is_row_major() {
        let image = DecodedImage::new(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(image.pixel(1, 0), Some(2));
        assert_eq!(image.pixel(0, 1), Some(3));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.pixel(0, 2), None);
    }

    #[test]
    fn test_to_rgba8_reorders_channels() {
        let image = DecodedImage::new(1, 1, vec![0x80FF_0010]).unwrap();
        assert_eq!(image.to_rgba8(), vec![0xFF, 0x00, 0x10, 0x80]);
        assert_eq!(image.alpha_at(0, 0), Some(0x80));
        assert!(!image.is_opaque());
    }
}
