//! Stateless checks run before a transaction touches the store.

use crate::{
    codec::{COORDINATE_BYTES, colour_bytes_for, palette::PALETTE_BYTES},
    error::{AppError, Result},
    ledger::assets::{ChangeCanvasAsset, CreateCanvasAsset, DrawPixelAsset, DrawPixelsAsset},
};

pub const MAX_DIMENSION: u32 = 10_000;
pub const MAX_PIXELS_PER_TRANSACTION: u32 = 10_000;
pub const MAX_LABEL_BYTES: usize = 64;
pub const MAX_SINGLE_COORDINATE: u32 = 100_000_000;
pub const MAX_SINGLE_COLOUR: u32 = 0x00FF_FFFF;

pub fn validate_create(asset: &CreateCanvasAsset, block_height: u64) -> Result<()> {
    validate_dimension("width", asset.width)?;
    validate_dimension("height", asset.height)?;
    validate_not_past(
        "start_block_height",
        asset.start_block_height,
        block_height,
    )?;
    validate_not_past("end_block_height", asset.end_block_height, block_height)?;

    if asset.start_block_height > asset.end_block_height {
        return Err(AppError::validation(
            "end_block_height",
            "End block height must be greater than start block height",
        ));
    }

    validate_max_pixels(asset.max_pixels_per_transaction)?;
    validate_palette(&asset.colour_palette)?;

    if let Some(label) = &asset.label {
        validate_label(label)?;
    }

    Ok(())
}

pub fn validate_change(asset: &ChangeCanvasAsset, block_height: u64) -> Result<()> {
    if let Some(width) = asset.width {
        validate_dimension("width", width)?;
    }
    if let Some(height) = asset.height {
        validate_dimension("height", height)?;
    }
    if let Some(start) = asset.start_block_height {
        validate_not_past("start_block_height", start, block_height)?;
    }
    if let Some(end) = asset.end_block_height {
        validate_not_past("end_block_height", end, block_height)?;
    }
    if let (Some(start), Some(end)) = (asset.start_block_height, asset.end_block_height)
        && start > end
    {
        return Err(AppError::validation(
            "end_block_height",
            "End block height must be greater than start block height",
        ));
    }
    if let Some(max_pixels) = asset.max_pixels_per_transaction {
        validate_max_pixels(max_pixels)?;
    }
    if let Some(palette) = &asset.colour_palette {
        validate_palette(palette)?;
    }
    if let Some(label) = &asset.label {
        validate_label(label)?;
    }

    Ok(())
}

pub fn validate_draw_pixel(asset: &DrawPixelAsset) -> Result<()> {
    if asset.coords >= MAX_SINGLE_COORDINATE {
        return Err(AppError::validation("coords", "Coords invalid"));
    }

    if asset.colour > MAX_SINGLE_COLOUR {
        return Err(AppError::validation("colour", "Colour invalid"));
    }

    Ok(())
}

pub fn validate_draw_pixels(asset: &DrawPixelsAsset) -> Result<()> {
    if asset.colours.is_empty() {
        return Err(AppError::validation("colours", "Requires at least 1 colour"));
    }

    if asset.coords.len() % COORDINATE_BYTES != 0 {
        return Err(AppError::validation("coords", "Coords invalid"));
    }

    let coordinate_count = asset.coords.len() / COORDINATE_BYTES;
    if colour_bytes_for(coordinate_count) != asset.colours.len() {
        return Err(AppError::validation(
            "colours",
            "Number of coords does not match number of colours",
        ));
    }

    Ok(())
}

fn validate_dimension(field: &'static str, value: u32) -> Result<()> {
    if !(1..=MAX_DIMENSION).contains(&value) {
        return Err(AppError::validation(
            field,
            format!("must be between 1 and {MAX_DIMENSION}"),
        ));
    }
    Ok(())
}

fn validate_not_past(field: &'static str, value: u64, block_height: u64) -> Result<()> {
    if value < block_height {
        return Err(AppError::validation(
            field,
            format!("{value} is below current block height {block_height}"),
        ));
    }
    Ok(())
}

fn validate_max_pixels(value: u32) -> Result<()> {
    if !(1..=MAX_PIXELS_PER_TRANSACTION).contains(&value) {
        return Err(AppError::validation(
            "max_pixels_per_transaction",
            format!("must be between 1 and {MAX_PIXELS_PER_TRANSACTION}"),
        ));
    }
    Ok(())
}

fn validate_palette(palette: &[u8]) -> Result<()> {
    if palette.len() != PALETTE_BYTES {
        return Err(AppError::validation(
            "colour_palette",
            format!("must be exactly {PALETTE_BYTES} bytes"),
        ));
    }
    Ok(())
}

fn validate_label(label: &str) -> Result<()> {
    if label.len() > MAX_LABEL_BYTES {
        return Err(AppError::validation(
            "label",
            format!("must be at most {MAX_LABEL_BYTES} bytes"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_asset() -> CreateCanvasAsset {
        CreateCanvasAsset {
            canvas_id: 1,
            cost_per_pixel: 10,
            start_block_height: 5,
            end_block_height: 50,
            width: 10,
            height: 10,
            time_between_draws: 0,
            colour_palette: vec![0; PALETTE_BYTES],
            max_pixels_per_transaction: 5,
            label: None,
        }
    }

    fn field_of(result: Result<()>) -> &'static str {
        match result {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_accepts_window_starting_at_current_height() {
        assert!(validate_create(&create_asset(), 5).is_ok());
    }

    #[test]
    fn create_names_the_offending_field() {
        let mut asset = create_asset();
        asset.width = 0;
        assert_eq!(field_of(validate_create(&asset, 1)), "width");

        let mut asset = create_asset();
        asset.height = MAX_DIMENSION + 1;
        assert_eq!(field_of(validate_create(&asset, 1)), "height");

        assert_eq!(
            field_of(validate_create(&create_asset(), 6)),
            "start_block_height"
        );

        let mut asset = create_asset();
        asset.start_block_height = 60;
        assert_eq!(field_of(validate_create(&asset, 1)), "end_block_height");

        let mut asset = create_asset();
        asset.max_pixels_per_transaction = 0;
        assert_eq!(
            field_of(validate_create(&asset, 1)),
            "max_pixels_per_transaction"
        );

        let mut asset = create_asset();
        asset.colour_palette.pop();
        assert_eq!(field_of(validate_create(&asset, 1)), "colour_palette");

        let mut asset = create_asset();
        asset.label = Some("x".repeat(MAX_LABEL_BYTES + 1));
        assert_eq!(field_of(validate_create(&asset, 1)), "label");
    }

    #[test]
    fn change_checks_only_supplied_fields() {
        let asset = ChangeCanvasAsset {
            canvas_id: 1,
            label: Some("renamed".into()),
            ..Default::default()
        };
        assert!(validate_change(&asset, 1_000).is_ok());

        let asset = ChangeCanvasAsset {
            canvas_id: 1,
            start_block_height: Some(20),
            end_block_height: Some(10),
            ..Default::default()
        };
        assert_eq!(field_of(validate_change(&asset, 1)), "end_block_height");

        let asset = ChangeCanvasAsset {
            canvas_id: 1,
            end_block_height: Some(3),
            ..Default::default()
        };
        assert_eq!(field_of(validate_change(&asset, 4)), "end_block_height");
    }

    #[test]
    fn batch_draw_pairs_coordinates_with_nibbles() {
        let asset = |coords: Vec<u8>, colours: Vec<u8>| DrawPixelsAsset {
            canvas_id: 1,
            coords,
            colours,
        };

        assert!(validate_draw_pixels(&asset(vec![0; 3], vec![1])).is_ok());
        assert!(validate_draw_pixels(&asset(vec![0; 6], vec![1])).is_ok());
        assert!(validate_draw_pixels(&asset(vec![0; 9], vec![1, 2])).is_ok());

        assert_eq!(
            field_of(validate_draw_pixels(&asset(vec![0; 3], vec![]))),
            "colours"
        );
        assert_eq!(
            field_of(validate_draw_pixels(&asset(vec![0; 4], vec![1]))),
            "coords"
        );
        assert_eq!(
            field_of(validate_draw_pixels(&asset(vec![0; 9], vec![1]))),
            "colours"
        );
    }

    #[test]
    fn single_draw_bounds() {
        let ok = DrawPixelAsset {
            canvas_id: 1,
            coords: MAX_SINGLE_COORDINATE - 1,
            colour: MAX_SINGLE_COLOUR,
        };
        assert!(validate_draw_pixel(&ok).is_ok());

        let far = DrawPixelAsset {
            coords: MAX_SINGLE_COORDINATE,
            ..ok.clone()
        };
        assert_eq!(field_of(validate_draw_pixel(&far)), "coords");

        let bright = DrawPixelAsset {
            colour: MAX_SINGLE_COLOUR + 1,
            ..ok
        };
        assert_eq!(field_of(validate_draw_pixel(&bright)), "colour");
    }
}
