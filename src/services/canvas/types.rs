use crate::{
    error::Result,
    ledger::{
        Address, StateBatch, StateReader, TransactionId,
        entities::{Canvas, CanvasIdSetRecord},
        keys::StateKey,
        store::read_record,
    },
};

#[derive(Debug, Clone, Copy)]
pub struct TransactionContext<'a> {
    pub sender: &'a Address,
    pub transaction_id: TransactionId,
    /// Height of the block the transaction is being applied in.
    pub block_height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleSets {
    pub pending: Vec<u32>,
    pub active: Vec<u32>,
    pub complete: Vec<u32>,
}

impl LifecycleSets {
    pub async fn load(reader: &dyn StateReader) -> Result<Self> {
        Ok(Self {
            pending: load_canvas_ids(reader, StateKey::PENDING).await?,
            active: load_canvas_ids(reader, StateKey::ACTIVE).await?,
            complete: load_canvas_ids(reader, StateKey::COMPLETE).await?,
        })
    }

    pub fn store(&self, batch: &mut StateBatch<'_>) {
        for (key, canvas_ids) in [
            (StateKey::PENDING, &self.pending),
            (StateKey::ACTIVE, &self.active),
            (StateKey::COMPLETE, &self.complete),
        ] {
            batch.set_record(
                key,
                &CanvasIdSetRecord {
                    canvas_ids: canvas_ids.clone(),
                },
            );
        }
    }
}

pub async fn load_canvas_ids(reader: &dyn StateReader, key: &str) -> Result<Vec<u32>> {
    Ok(read_record::<CanvasIdSetRecord>(reader, key)
        .await?
        .map(|set| set.canvas_ids)
        .unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started(u32),
    Completed(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecyclePlan {
    pub sets: LifecycleSets,
    pub updated: Vec<(u32, Canvas)>,
    pub transitions: Vec<Transition>,
}
