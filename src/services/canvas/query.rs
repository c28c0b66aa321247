use crate::{
    error::Result,
    ledger::{
        Address, StateReader,
        entities::{Canvas, PixelRecord},
        keys::StateKey,
        store::read_record,
    },
    services::canvas::types::load_canvas_ids,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelOwnership {
    pub owner: Address,
    pub colour: u32,
}

pub async fn get_canvas(reader: &dyn StateReader, canvas_id: u32) -> Result<Option<Canvas>> {
    match reader.get(&StateKey::canvas(canvas_id)).await? {
        Some(bytes) => Ok(Some(Canvas::decode(&bytes)?)),
        None => Ok(None),
    }
}

pub async fn get_pending_canvases(reader: &dyn StateReader) -> Result<Vec<u32>> {
    load_canvas_ids(reader, StateKey::PENDING).await
}

pub async fn get_active_canvases(reader: &dyn StateReader) -> Result<Vec<u32>> {
    load_canvas_ids(reader, StateKey::ACTIVE).await
}

pub async fn get_complete_canvases(reader: &dyn StateReader) -> Result<Vec<u32>> {
    load_canvas_ids(reader, StateKey::COMPLETE).await
}

pub async fn get_pixel(
    reader: &dyn StateReader,
    canvas_id: u32,
    x: u32,
    y: u32,
) -> Result<Option<PixelOwnership>> {
    match read_record::<PixelRecord>(reader, &StateKey::pixel(canvas_id, x, y)).await? {
        Some(record) => Ok(Some(PixelOwnership {
            owner: Address::from_slice(&record.owner)?,
            colour: record.colour,
        })),
        None => Ok(None),
    }
}
