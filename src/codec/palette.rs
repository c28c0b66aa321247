use crate::error::{AppError, Result};

pub const PALETTE_COLOURS: usize = 16;
pub const PALETTE_BYTES: usize = PALETTE_COLOURS * 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette([[u8; 3]; PALETTE_COLOURS]);

impl Palette {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PALETTE_BYTES {
            return Err(AppError::InvalidLength(format!(
                "colour palette must be {PALETTE_BYTES} bytes, got {}",
                bytes.len()
            )));
        }

        let mut colours = [[0u8; 3]; PALETTE_COLOURS];
        for (colour, rgb) in colours.iter_mut().zip(bytes.chunks_exact(3)) {
            colour.copy_from_slice(rgb);
        }

        Ok(Self(colours))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flatten().copied().collect()
    }

    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.0[(index & 0x0F) as usize]
    }

    pub fn rgba(&self, index: u8) -> [u8; 4] {
        let [r, g, b] = self.rgb(index);
        [r, g, b, 255]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_opaque_rgba() {
        let mut bytes = vec![0u8; PALETTE_BYTES];
        bytes[3..6].copy_from_slice(&[10, 20, 30]);
        let palette = Palette::from_bytes(&bytes).unwrap();

        assert_eq!(palette.rgba(1), [10, 20, 30, 255]);
        assert_eq!(palette.rgba(0), [0, 0, 0, 255]);
    }

    #[test]
    fn rejects_short_palette() {
        assert!(matches!(
            Palette::from_bytes(&[0; 47]),
            Err(AppError::InvalidLength(_))
        ));
    }
}
