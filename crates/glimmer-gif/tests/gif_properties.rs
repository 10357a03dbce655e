//! Property tests: the GIF decoder never panics on hostile input and maps
//! every in-range color index through the global table.

use glimmer_gif::decode;
use quickcheck_macros::quickcheck;

/// Screen 1..=8 wide, one row, four-entry global table.
fn header(width: u16) -> Vec<u8> {
    let mut file = b"GIF89a".to_vec();
    file.extend_from_slice(&width.to_le_bytes());
    file.extend_from_slice(&1u16.to_le_bytes());
    file.extend_from_slice(&[0x81, 0, 0]);
    file.extend_from_slice(&[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255]);
    file
}

/// Literal-only LZW with minimum code size 3, clearing every two codes.
fn encode(indices: &[u8]) -> Vec<u8> {
    let mut codes = Vec::new();
    for pair in indices.chunks(2) {
        codes.push(8u32);
        codes.extend(pair.iter().map(|&index| u32::from(index)));
    }
    codes.push(9);

    let mut out = Vec::new();
    let (mut bits, mut count) = (0u32, 0u32);
    for code in codes {
        bits |= code << count;
        count += 4;
        while count >= 8 {
            out.push(u8::try_from(bits & 0xFF).unwrap());
            bits >>= 8;
            count -= 8;
        }
    }
    if count > 0 {
        out.push(u8::try_from(bits & 0xFF).unwrap());
    }
    out
}

fn file_with_indices(indices: &[u8]) -> Vec<u8> {
    let width = u16::try_from(indices.len()).unwrap();
    let data = encode(indices);

    let mut file = header(width);
    file.push(0x2C);
    for field in [0, 0, width, 1] {
        file.extend_from_slice(&field.to_le_bytes());
    }
    file.extend_from_slice(&[0, 3, u8::try_from(data.len()).unwrap()]);
    file.extend(data);
    file.extend_from_slice(&[0, 0x3B]);
    file
}

#[quickcheck]
fn prop_arbitrary_bytes_never_panic(bytes: Vec<u8>) -> bool {
    let _ = decode(&bytes);
    true
}

#[quickcheck]
fn prop_arbitrary_blocks_never_panic(body: Vec<u8>) -> bool {
    let mut file = header(4);
    file.extend(body);
    let _ = decode(&file);
    true
}

#[quickcheck]
fn prop_in_range_indices_map_through_table(raw: Vec<u8>) -> bool {
    let indices: Vec<u8> = raw.iter().take(8).map(|index| index % 4).collect();
    if indices.is_empty() {
        return true;
    }
    let colors = [0xFF00_0000, 0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF];
    let expected: Vec<u32> = indices.iter().map(|&i| colors[usize::from(i)]).collect();
    decode(&file_with_indices(&indices)).is_ok_and(|image| image.pixels() == expected.as_slice())
}

#[quickcheck]
fn prop_out_of_range_index_fails(raw: Vec<u8>, bad: u8, at: usize) -> bool {
    let mut indices: Vec<u8> = raw.iter().take(8).map(|index| index % 4).collect();
    let at = at % (indices.len() + 1);
    // Literals 4..=7 fit the code width but not the four-entry table.
    indices.insert(at, 4 + bad % 4);
    decode(&file_with_indices(&indices)).is_err()
}
