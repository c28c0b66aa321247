#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use canvas_ledger::{
    codec::{self, palette::PALETTE_BYTES},
    error::Result,
    ledger::{
        Address, Block, CanvasEvent, EventBus, MemoryStore, StateBatch, StateStore, Transaction,
        assets::{
            ChangeCanvasAsset, CreateCanvasAsset, DrawPixelAsset, DrawPixelsAsset,
            TransactionPayload,
        },
        block::RetryPolicy,
    },
    services::chain::{Chain, Genesis, apply_transaction},
};
use tokio::sync::broadcast::Receiver;

pub const ADMIN: Address = Address::new([0xAA; 20]);
pub const WALLET: Address = Address::new([0xBB; 20]);
pub const ALICE: Address = Address::new([0x01; 20]);
pub const BOB: Address = Address::new([0x02; 20]);

pub const OPENING_BALANCE: u64 = 1_000;

pub struct Harness {
    pub store: Arc<dyn StateStore>,
    pub chain: Chain,
    pub events: EventBus,
    nonce: u64,
}

impl Harness {
    pub async fn new() -> Self {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let events = EventBus::new(1024);
        let chain = Chain::new(Arc::clone(&store), events.clone());

        chain
            .apply_genesis(&Genesis {
                admin: ADMIN,
                wallet: WALLET,
                balances: vec![(ALICE, OPENING_BALANCE), (BOB, OPENING_BALANCE)],
                timestamp: 0,
            })
            .await
            .unwrap();

        Self {
            store,
            chain,
            events,
            nonce: 0,
        }
    }

    pub fn subscribe(&self) -> Receiver<CanvasEvent> {
        self.events.subscribe()
    }

    pub async fn tip(&self) -> u64 {
        self.chain.tip_height().await.unwrap().unwrap()
    }

    pub fn transaction(&mut self, sender: Address, payload: TransactionPayload) -> Transaction {
        self.nonce += 1;
        Transaction::new(sender, self.nonce, 0, payload)
    }

    pub async fn next_block(&self, transactions: Vec<Transaction>) -> Arc<Block> {
        self.chain.produce_block(transactions, 0).await.unwrap()
    }

    /// Advances until the tip reaches `height`.
    pub async fn advance_to(&self, height: u64) {
        while self.tip().await < height {
            self.next_block(vec![]).await;
        }
    }

    /// Runs a transaction against the next height without committing it.
    pub async fn dry_run(&self, transaction: &Transaction) -> Result<()> {
        let batch = StateBatch::new(self.store.as_ref());
        let height = self.tip().await + 1;
        apply_transaction(&batch, transaction, height).await.map(|_| ())
    }
}

pub fn retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 1,
        delay: Duration::from_millis(1),
    }
}

pub fn create_canvas(canvas_id: u32, start: u64, end: u64) -> CreateCanvasAsset {
    CreateCanvasAsset {
        canvas_id,
        cost_per_pixel: 10,
        start_block_height: start,
        end_block_height: end,
        width: 10,
        height: 10,
        time_between_draws: 0,
        colour_palette: vec![0; PALETTE_BYTES],
        max_pixels_per_transaction: 5,
        label: Some(format!("canvas {canvas_id}")),
    }
}

pub fn change_canvas(canvas_id: u32) -> ChangeCanvasAsset {
    ChangeCanvasAsset {
        canvas_id,
        ..Default::default()
    }
}

pub fn draw_pixels(canvas_id: u32, coords: &[u32], colours: &[u8]) -> TransactionPayload {
    TransactionPayload::DrawPixels(DrawPixelsAsset {
        canvas_id,
        coords: codec::encode_coordinates24(coords),
        colours: codec::encode_colours4(colours),
    })
}

pub fn draw_pixel(canvas_id: u32, coords: u32, colour: u32) -> TransactionPayload {
    TransactionPayload::DrawPixel(DrawPixelAsset {
        canvas_id,
        coords,
        colour,
    })
}

pub fn drain(receiver: &mut Receiver<CanvasEvent>) -> Vec<CanvasEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

pub fn event_names(events: &[CanvasEvent]) -> Vec<&'static str> {
    events.iter().map(CanvasEvent::name).collect()
}
