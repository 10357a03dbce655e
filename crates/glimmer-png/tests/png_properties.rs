//! Property tests: the PNG decoder never panics on hostile input and is a
//! pure function of its bytes.

use std::io::Write;

use flate2::Compression;
use flate2::Crc;
use flate2::write::ZlibEncoder;
use glimmer_png::{PNG_SIGNATURE, decode};
use quickcheck_macros::quickcheck;

fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(data);

    let mut out = Vec::new();
    out.extend_from_slice(&u32::try_from(data.len()).unwrap().to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
    out
}

fn rgba_png(width: u32, height: u32, filtered: &[u8]) -> Vec<u8> {
    let mut header = Vec::new();
    header.extend_from_slice(&width.to_be_bytes());
    header.extend_from_slice(&height.to_be_bytes());
    header.extend_from_slice(&[8, 6, 0, 0, 0]);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(filtered).unwrap();

    let mut file = PNG_SIGNATURE.to_vec();
    file.extend(chunk(b"IHDR", &header));
    file.extend(chunk(b"IDAT", &encoder.finish().unwrap()));
    file.extend(chunk(b"IEND", &[]));
    file
}

#[quickcheck]
fn prop_arbitrary_bytes_never_panic(bytes: Vec<u8>) -> bool {
    let _ = decode(&bytes);
    true
}

#[quickcheck]
fn prop_arbitrary_chunks_never_panic(body: Vec<u8>) -> bool {
    let mut file = PNG_SIGNATURE.to_vec();
    file.extend(body);
    let _ = decode(&file);
    true
}

#[quickcheck]
fn prop_decode_is_deterministic(width: u8, height: u8, seed: Vec<u8>) -> bool {
    let (width, height) = (u32::from(width % 8) + 1, u32::from(height % 8) + 1);
    let row_len = usize::try_from(width).unwrap() * 4 + 1;
    let len = row_len * usize::try_from(height).unwrap();

    // Filter bytes drawn from the valid range so every image decodes.
    let filtered: Vec<u8> = (0..len)
        .map(|i| {
            let byte = seed.get(i % seed.len().max(1)).copied().unwrap_or(0);
            if i % row_len == 0 {
                byte % 5
            } else {
                byte.wrapping_add(u8::try_from(i % 251).unwrap())
            }
        })
        .collect();

    let file = rgba_png(width, height, &filtered);
    match (decode(&file), decode(&file)) {
        (Ok(a), Ok(b)) => {
            a == b && a.pixels().len() == len / row_len * usize::try_from(width).unwrap()
        }
        _ => false,
    }
}

#[quickcheck]
fn prop_truncated_stream_fails_cleanly(cut: usize) -> bool {
    let file = rgba_png(4, 4, &[0; 68]);
    // Anywhere before the end of IDAT; dropping only IEND is tolerated.
    let cut = cut % (file.len() - 12);
    decode(&file[..cut]).is_err()
}
