use base64::Engine;

use crate::codec::bitmap_len;

/// 4-bit palette indices, two pixels per byte. Even coordinates occupy the low nibble.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NibbleBitmap {
    bytes: Vec<u8>,
}

impl NibbleBitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bytes: vec![0; bitmap_len(width, height)],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn get(&self, coord: u32) -> u8 {
        let index = (coord / 2) as usize;
        let offset = (coord % 2) * 4;
        self.bytes
            .get(index)
            .map_or(0, |byte| (byte >> offset) & 0x0F)
    }

    /// Writes one nibble and returns the colour it replaced.
    ///
    /// Grows the buffer when the canvas dimensions were enlarged after allocation.
    pub fn set(&mut self, coord: u32, colour: u8) -> u8 {
        let index = (coord / 2) as usize;
        let offset = (coord % 2) * 4;

        if index >= self.bytes.len() {
            self.bytes.resize(index + 1, 0);
        }

        let current = self.bytes[index];
        self.bytes[index] = (current & (0xF0 >> offset)) | ((colour & 0x0F) << offset);
        (current >> offset) & 0x0F
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Colours for the first `pixel_count` coordinates, in coordinate order.
    pub fn colours(&self, pixel_count: u64) -> impl Iterator<Item = u8> + '_ {
        (0..pixel_count).map(|coord| self.get(coord as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_returns_previous_nibble_and_keeps_neighbour() {
        let mut bitmap = NibbleBitmap::new(2, 2);

        assert_eq!(bitmap.set(1, 0xA), 0);
        assert_eq!(bitmap.set(0, 0x3), 0);
        assert_eq!(bitmap.as_bytes()[0], 0xA3);

        assert_eq!(bitmap.set(1, 0x5), 0xA);
        assert_eq!(bitmap.get(0), 0x3);
        assert_eq!(bitmap.get(1), 0x5);
    }

    #[test]
    fn grows_for_coordinates_past_capacity() {
        let mut bitmap = NibbleBitmap::new(1, 1);
        bitmap.set(9, 7);

        assert_eq!(bitmap.as_bytes().len(), 5);
        assert_eq!(bitmap.get(9), 7);
        assert_eq!(bitmap.get(8), 0);
    }

    #[test]
    fn base64_encodes_raw_bytes() {
        let mut bitmap = NibbleBitmap::new(2, 1);
        bitmap.set(0, 0xF);
        bitmap.set(1, 0xF);
        assert_eq!(bitmap.to_base64(), "/w==");
    }
}
