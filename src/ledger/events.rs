use std::sync::Arc;

use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::ledger::{
    address::Address,
    assets::{DrawPixelAsset, DrawPixelsAsset},
    block::{Block, TransactionId},
};

#[derive(Debug, Clone)]
pub struct PixelChange {
    pub address: Address,
    pub transaction_id: TransactionId,
    pub block_height: Option<u64>,
    pub pixel: Arc<DrawPixelsAsset>,
}

#[derive(Debug, Clone)]
pub struct ViewChange {
    pub canvas_id: u32,
    pub coords: Vec<u8>,
    pub colours: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum CanvasEvent {
    Started { canvas_id: u32 },
    Completed { canvas_id: u32 },
    PixelChangeSubmitted(PixelChange),
    PixelChangeCommitted(PixelChange),
    PixelChanged {
        address: Address,
        block_height: u64,
        pixel: DrawPixelAsset,
    },
    ViewChanged(ViewChange),
    NewBlock(Arc<Block>),
}

impl CanvasEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "canvas:started",
            Self::Completed { .. } => "canvas:completed",
            Self::PixelChangeSubmitted(_) => "canvas:pixelChangeSubmitted",
            Self::PixelChangeCommitted(_) => "canvas:pixelChangeCommitted",
            Self::PixelChanged { .. } => "canvas:pixelChanged",
            Self::ViewChanged(_) => "view:viewChanged",
            Self::NewBlock(_) => "app:block:new",
        }
    }
}

/// Fan-out channel between the chain and its read-side consumers.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<CanvasEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: CanvasEvent) {
        tracing::debug!(event = event.name(), "Publishing event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Receiver<CanvasEvent> {
        self.sender.subscribe()
    }
}
