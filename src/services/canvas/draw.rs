use crate::{
    codec::{decode_coordinates24, unpack_coordinate},
    error::{AppError, Result},
    ledger::{
        StateBatch,
        accounts::{Accounts, get_wallet_address},
        assets::{DrawPixelAsset, DrawPixelsAsset},
        entities::{Canvas, CanvasState, DrawCooldownRecord, PixelRecord},
        keys::StateKey,
    },
    services::canvas::{query::get_canvas, types::TransactionContext},
};

pub async fn apply_draw_pixels(
    batch: &mut StateBatch<'_>,
    context: &TransactionContext<'_>,
    asset: &DrawPixelsAsset,
) -> Result<()> {
    let canvas = load_active_canvas(batch, asset.canvas_id).await?;
    let coords = decode_coordinates24(&asset.coords)?;

    check_pixel_count(&canvas, coords.len())?;
    for coord in &coords {
        check_in_bounds(&canvas, *coord)?;
    }

    charge_and_record(batch, context, asset.canvas_id, &canvas).await?;

    tracing::debug!(
        canvas_id = asset.canvas_id,
        pixels = coords.len(),
        transaction_id = %context.transaction_id,
        "Pixels drawn"
    );

    Ok(())
}

/// Single-pixel variant. Also keeps an ownership record for the drawn pixel.
pub async fn apply_draw_pixel(
    batch: &mut StateBatch<'_>,
    context: &TransactionContext<'_>,
    asset: &DrawPixelAsset,
) -> Result<()> {
    let canvas = load_active_canvas(batch, asset.canvas_id).await?;

    check_pixel_count(&canvas, 1)?;
    check_in_bounds(&canvas, asset.coords)?;

    charge_and_record(batch, context, asset.canvas_id, &canvas).await?;

    let (x, y) = unpack_coordinate(asset.coords, canvas.width, canvas.height);
    batch.set_record(
        StateKey::pixel(asset.canvas_id, x, y),
        &PixelRecord {
            owner: context.sender.as_bytes().to_vec(),
            colour: asset.colour,
        },
    );

    Ok(())
}

async fn load_active_canvas(batch: &StateBatch<'_>, canvas_id: u32) -> Result<Canvas> {
    let canvas = get_canvas(batch, canvas_id)
        .await?
        .ok_or(AppError::NotFound(canvas_id))?;

    if canvas.state != CanvasState::Active {
        return Err(AppError::NotActive(canvas_id));
    }

    Ok(canvas)
}

fn check_pixel_count(canvas: &Canvas, count: usize) -> Result<()> {
    if count > canvas.max_pixels_per_transaction as usize {
        return Err(AppError::TooManyPixels {
            count,
            max: canvas.max_pixels_per_transaction,
        });
    }
    Ok(())
}

fn check_in_bounds(canvas: &Canvas, coord: u32) -> Result<()> {
    if u64::from(coord) >= canvas.capacity() {
        return Err(AppError::OutOfBounds {
            coordinate: coord,
            capacity: canvas.capacity(),
        });
    }
    Ok(())
}

/// Enforces the cooldown, moves the flat draw fee and stamps the new cooldown.
async fn charge_and_record(
    batch: &mut StateBatch<'_>,
    context: &TransactionContext<'_>,
    canvas_id: u32,
    canvas: &Canvas,
) -> Result<()> {
    let cooldown_key = StateKey::draw_cooldown(canvas_id, context.sender);

    // An account that never drew counts as having drawn at height 0.
    let last_block_height = batch
        .get_record::<DrawCooldownRecord>(&cooldown_key)
        .await?
        .map_or(0, |cooldown| cooldown.last_block_height);
    let next_height = u64::from(last_block_height) + u64::from(canvas.time_between_draws);
    if next_height > context.block_height {
        return Err(AppError::DrawTooSoon { next_height });
    }

    let wallet = get_wallet_address(&*batch)
        .await?
        .ok_or_else(|| AppError::Inconsistency("wallet address not configured".into()))?;

    Accounts::debit(batch, context.sender, canvas.cost_per_pixel).await?;
    Accounts::credit(batch, &wallet, canvas.cost_per_pixel).await?;

    let last_block_height = u32::try_from(context.block_height).map_err(|_| {
        AppError::Inconsistency(format!(
            "block height {} exceeds cooldown range",
            context.block_height
        ))
    })?;
    batch.set_record(cooldown_key, &DrawCooldownRecord { last_block_height });

    Ok(())
}
