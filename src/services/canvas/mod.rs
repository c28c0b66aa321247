pub mod change;
pub mod create;
pub mod draw;
pub mod lifecycle;
pub mod query;
pub mod types;
pub mod validation;

use crate::{
    error::Result,
    ledger::{StateBatch, assets::TransactionPayload},
};

pub use types::{LifecycleSets, TransactionContext, Transition};

/// Stateless checks for a payload. Runs before any state is read.
pub fn validate_payload(payload: &TransactionPayload, block_height: u64) -> Result<()> {
    match payload {
        TransactionPayload::CreateCanvas(asset) => {
            validation::validate_create(asset, block_height)
        }
        TransactionPayload::ChangeCanvas(asset) => {
            validation::validate_change(asset, block_height)
        }
        TransactionPayload::DrawPixel(asset) => validation::validate_draw_pixel(asset),
        TransactionPayload::DrawPixels(asset) => validation::validate_draw_pixels(asset),
    }
}

pub async fn apply_payload(
    batch: &mut StateBatch<'_>,
    context: &TransactionContext<'_>,
    payload: &TransactionPayload,
) -> Result<()> {
    match payload {
        TransactionPayload::CreateCanvas(asset) => create::apply_create(batch, context, asset).await,
        TransactionPayload::ChangeCanvas(asset) => change::apply_change(batch, context, asset).await,
        TransactionPayload::DrawPixel(asset) => draw::apply_draw_pixel(batch, context, asset).await,
        TransactionPayload::DrawPixels(asset) => {
            draw::apply_draw_pixels(batch, context, asset).await
        }
    }
}
