use std::io::Cursor;

use png::{BitDepth, ColorType, Encoder};

use crate::{
    codec::{NibbleBitmap, Palette},
    error::{AppError, Result},
};

/// Encodes a snapshot as an RGBA PNG, `scale` output pixels per canvas pixel.
///
/// The image is `width` by `height`, with coordinate `i` at column `i % width`,
/// row `i / width`.
pub fn render_preview(
    snapshot: &NibbleBitmap,
    width: u32,
    height: u32,
    palette: &Palette,
    scale: u32,
) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(AppError::InvalidLength(format!(
            "preview dimensions {width}x{height}"
        )));
    }

    let scale = scale.max(1);
    let out_width = width * scale;
    let out_height = height * scale;

    let mut data = Vec::with_capacity((out_width as usize) * (out_height as usize) * 4);
    for y in 0..out_height {
        for x in 0..out_width {
            let coord = (y / scale) * width + (x / scale);
            data.extend_from_slice(&palette.rgba(snapshot.get(coord)));
        }
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = Encoder::new(Cursor::new(&mut png_data), out_width, out_height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::InternalServerError(format!("PNG header error: {}", e)))?;
        writer
            .write_image_data(&data)
            .map_err(|e| AppError::InternalServerError(format!("PNG write error: {}", e)))?;
    }

    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Palette {
        let mut bytes = vec![0u8; 48];
        bytes[3..6].copy_from_slice(&[0xff, 0x00, 0x00]);
        Palette::from_bytes(&bytes).unwrap()
    }

    fn decode(png_data: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let decoder = png::Decoder::new(Cursor::new(png_data));
        let mut reader = decoder.read_info().unwrap();
        let size = {
            let info = reader.info();
            (info.width * info.height * 4) as usize
        };
        let mut buffer = vec![0; size];
        let info = reader.next_frame(&mut buffer).unwrap();
        buffer.truncate(info.buffer_size());
        (info, buffer)
    }

    #[test]
    fn maps_coordinates_row_major_over_width() {
        let mut snapshot = NibbleBitmap::new(3, 2);
        snapshot.set(4, 1);

        let (info, pixels) = decode(&render_preview(&snapshot, 3, 2, &palette(), 1).unwrap());

        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.color_type, ColorType::Rgba);
        let at = |x: usize, y: usize| &pixels[(y * 3 + x) * 4..(y * 3 + x) * 4 + 4];
        assert_eq!(at(1, 1), &[0xff, 0x00, 0x00, 0xff]);
        assert_eq!(at(0, 1), &[0x00, 0x00, 0x00, 0xff]);
    }

    #[test]
    fn every_cell_is_opaque() {
        let snapshot = NibbleBitmap::new(3, 4);
        let (info, pixels) = decode(&render_preview(&snapshot, 3, 4, &palette(), 1).unwrap());

        assert_eq!((info.width, info.height), (3, 4));
        assert!(pixels.chunks(4).all(|pixel| pixel[3] == 0xff));
    }

    #[test]
    fn scales_with_nearest_neighbour() {
        let mut snapshot = NibbleBitmap::new(2, 2);
        snapshot.set(0, 1);

        let (info, pixels) = decode(&render_preview(&snapshot, 2, 2, &palette(), 4).unwrap());

        assert_eq!((info.width, info.height), (8, 8));
        assert_eq!(&pixels[(3 * 8 + 3) * 4..(3 * 8 + 3) * 4 + 4], &[0xff, 0, 0, 0xff]);
        assert_eq!(&pixels[(3 * 8 + 4) * 4..(3 * 8 + 4) * 4 + 4], &[0, 0, 0, 0xff]);
    }

    #[test]
    fn rejects_empty_canvas() {
        assert!(render_preview(&NibbleBitmap::default(), 0, 4, &palette(), 1).is_err());
    }
}
