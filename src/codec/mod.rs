//! Compact encodings shared by the transaction processors and the materializers.
//!
//! Coordinates travel as 24-bit little-endian groups and colours as 4-bit palette
//! indices packed two per byte, low nibble first.

pub mod bitmap;
pub mod palette;

pub use bitmap::NibbleBitmap;
pub use palette::Palette;

use crate::error::{AppError, Result};

pub const COORDINATE_BYTES: usize = 3;
pub const MAX_COORDINATE: u32 = 0x00FF_FFFF;

/// Row stride used to linearise `(x, y)` for single-pixel draws.
///
/// Single-pixel coordinates have always been packed with the height as the stride,
/// so packing and unpacking for one canvas must both go through here. Batch draws
/// and bitmaps use plain row-major indices over `width`.
pub fn coordinate_stride(_width: u32, height: u32) -> u32 {
    height.max(1)
}

pub fn pack_coordinate(x: u32, y: u32, width: u32, height: u32) -> u32 {
    x + y * coordinate_stride(width, height)
}

pub fn unpack_coordinate(coord: u32, width: u32, height: u32) -> (u32, u32) {
    let stride = coordinate_stride(width, height);
    (coord % stride, coord / stride)
}

pub fn bitmap_len(width: u32, height: u32) -> usize {
    (u64::from(width) * u64::from(height)).div_ceil(2) as usize
}

pub fn encode_coordinates24(coords: &[u32]) -> Vec<u8> {
    coords
        .iter()
        .flat_map(|coord| {
            let [b0, b1, b2, _] = coord.to_le_bytes();
            [b0, b1, b2]
        })
        .collect()
}

pub fn decode_coordinates24(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() % COORDINATE_BYTES != 0 {
        return Err(AppError::InvalidLength(format!(
            "coordinate bytes must be a multiple of {COORDINATE_BYTES}, got {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(COORDINATE_BYTES)
        .map(|group| u32::from_le_bytes([group[0], group[1], group[2], 0]))
        .collect())
}

pub fn encode_colours4(colours: &[u8]) -> Vec<u8> {
    colours
        .chunks(2)
        .map(|pair| {
            let low = pair[0] & 0x0F;
            let high = pair.get(1).map_or(0, |colour| colour & 0x0F);
            low | (high << 4)
        })
        .collect()
}

pub fn decode_colours4(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|byte| [byte & 0x0F, (byte >> 4) & 0x0F])
        .collect()
}

/// Number of colour bytes a batch of `coordinate_count` pixels must carry.
pub fn colour_bytes_for(coordinate_count: usize) -> usize {
    coordinate_count.div_ceil(2)
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn packs_with_height_stride() {
        assert_eq!(pack_coordinate(3, 2, 5, 10), 23);
        assert_eq!(unpack_coordinate(23, 5, 10), (3, 2));
        assert_eq!(unpack_coordinate(55, 10, 10), (5, 5));
    }

    #[test]
    fn coordinates_are_little_endian_triplets() {
        assert_eq!(
            encode_coordinates24(&[0x0001_0203, 55]),
            vec![0x03, 0x02, 0x01, 55, 0, 0]
        );
        assert_eq!(
            decode_coordinates24(&[0x03, 0x02, 0x01]).unwrap(),
            vec![0x0001_0203]
        );
    }

    #[test]
    fn rejects_partial_coordinate_group() {
        let err = decode_coordinates24(&[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, AppError::InvalidLength(_)));
    }

    #[test]
    fn odd_colour_count_pads_high_nibble() {
        assert_eq!(encode_colours4(&[3]), vec![0x03]);
        assert_eq!(encode_colours4(&[1, 2, 15]), vec![0x21, 0x0F]);
        assert_eq!(decode_colours4(&[0x21, 0x0F]), vec![1, 2, 15, 0]);
    }

    #[test]
    fn random_batches_round_trip() {
        let mut rng = rand::rng();

        for _ in 0..64 {
            let len = rng.random_range(0..200);
            let coords: Vec<u32> = (0..len)
                .map(|_| rng.random_range(0..=MAX_COORDINATE))
                .collect();
            assert_eq!(
                decode_coordinates24(&encode_coordinates24(&coords)).unwrap(),
                coords
            );

            let colours: Vec<u8> = (0..len).map(|_| rng.random_range(0..16)).collect();
            let decoded = decode_colours4(&encode_colours4(&colours));
            assert_eq!(&decoded[..colours.len()], colours.as_slice());
            assert_eq!(decoded.len(), colour_bytes_for(colours.len()) * 2);
        }
    }

    #[test]
    fn single_pixel_packing_uses_height_stride() {
        assert_eq!(pack_coordinate(1, 2, 4, 3), 7);
        assert_eq!(unpack_coordinate(7, 4, 3), (1, 2));
        assert_eq!(bitmap_len(3, 3), 5);
    }
}
