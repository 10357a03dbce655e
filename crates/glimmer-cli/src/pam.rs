//! [Netpbm PAM](https://netpbm.sourceforge.net/doc/pam.html) output for
//! decoded images.

use std::io::{self, Write};

use glimmer_common::DecodedImage;

/// Write `image` as a PAM file with tuple type `RGB_ALPHA`.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn write_pam(image: &DecodedImage, out: &mut impl Write) -> io::Result<()> {
    write!(
        out,
        "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
        image.width(),
        image.height()
    )?;
    out.write_all(&image.to_rgba8())
}
