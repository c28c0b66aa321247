use crate::{
    codec::Palette,
    error::{AppError, Result},
    ledger::{
        StateBatch, StateReader,
        accounts::get_admin_address,
        assets::CreateCanvasAsset,
        entities::{Canvas, CanvasIdSetRecord, CanvasState},
        keys::StateKey,
    },
    services::canvas::types::{TransactionContext, load_canvas_ids},
};

pub async fn apply_create(
    batch: &mut StateBatch<'_>,
    context: &TransactionContext<'_>,
    asset: &CreateCanvasAsset,
) -> Result<()> {
    let admin = get_admin_address(&*batch).await?;
    if admin.as_ref() != Some(context.sender) {
        return Err(AppError::Unauthorized);
    }

    let canvas_key = StateKey::canvas(asset.canvas_id);
    if batch.get(&canvas_key).await?.is_some() {
        return Err(AppError::AlreadyExists(asset.canvas_id));
    }

    let canvas = Canvas {
        owner: *context.sender,
        cost_per_pixel: asset.cost_per_pixel,
        start_block_height: asset.start_block_height,
        end_block_height: asset.end_block_height,
        width: asset.width,
        height: asset.height,
        time_between_draws: asset.time_between_draws,
        colour_palette: Palette::from_bytes(&asset.colour_palette)?,
        max_pixels_per_transaction: asset.max_pixels_per_transaction,
        label: asset.label.clone().unwrap_or_default(),
        state: CanvasState::Pending,
    };
    batch.set(canvas_key, canvas.encode());

    let mut canvas_ids = load_canvas_ids(&*batch, StateKey::PENDING).await?;
    canvas_ids.push(asset.canvas_id);
    batch.set_record(StateKey::PENDING, &CanvasIdSetRecord { canvas_ids });

    tracing::debug!(
        canvas_id = asset.canvas_id,
        transaction_id = %context.transaction_id,
        "Canvas created"
    );

    Ok(())
}
