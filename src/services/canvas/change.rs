use crate::{
    codec::Palette,
    error::{AppError, Result},
    ledger::{
        StateBatch,
        assets::ChangeCanvasAsset,
        entities::CanvasState,
        keys::StateKey,
    },
    services::canvas::{query::get_canvas, types::TransactionContext},
};

pub async fn apply_change(
    batch: &mut StateBatch<'_>,
    context: &TransactionContext<'_>,
    asset: &ChangeCanvasAsset,
) -> Result<()> {
    let mut canvas = get_canvas(&*batch, asset.canvas_id)
        .await?
        .ok_or(AppError::NotFound(asset.canvas_id))?;

    if canvas.owner != *context.sender {
        return Err(AppError::Unauthorized);
    }

    match canvas.state {
        CanvasState::Complete => return Err(AppError::AlreadyComplete(asset.canvas_id)),
        CanvasState::Active if asset.start_block_height.is_some() => {
            return Err(AppError::ImmutableField("start_block_height"));
        }
        CanvasState::Active if asset.end_block_height.is_some() => {
            return Err(AppError::ImmutableField("end_block_height"));
        }
        _ => {}
    }

    if let Some(cost_per_pixel) = asset.cost_per_pixel {
        canvas.cost_per_pixel = cost_per_pixel;
    }
    if let Some(start) = asset.start_block_height {
        canvas.start_block_height = start;
    }
    if let Some(end) = asset.end_block_height {
        canvas.end_block_height = end;
    }
    if let Some(width) = asset.width {
        canvas.width = width;
    }
    if let Some(height) = asset.height {
        canvas.height = height;
    }
    if let Some(time_between_draws) = asset.time_between_draws {
        canvas.time_between_draws = time_between_draws;
    }
    if let Some(palette) = &asset.colour_palette {
        canvas.colour_palette = Palette::from_bytes(palette)?;
    }
    if let Some(max_pixels) = asset.max_pixels_per_transaction {
        canvas.max_pixels_per_transaction = max_pixels;
    }
    if let Some(label) = &asset.label {
        canvas.label = label.clone();
    }

    if canvas.start_block_height > canvas.end_block_height {
        return Err(AppError::InvalidWindow {
            start: canvas.start_block_height,
            end: canvas.end_block_height,
        });
    }

    batch.set(StateKey::canvas(asset.canvas_id), canvas.encode());

    tracing::debug!(
        canvas_id = asset.canvas_id,
        transaction_id = %context.transaction_id,
        "Canvas changed"
    );

    Ok(())
}
