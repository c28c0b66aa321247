pub mod diff;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    codec::{self, NibbleBitmap},
    error::{AppError, Result},
    ledger::{
        BlockSource, CanvasEvent, EventBus, StateReader, TransactionId,
        assets::{DrawPixelsAsset, TransactionPayload},
        block::{RetryPolicy, fetch_block_with_retry},
        events::{PixelChange, ViewChange},
    },
    services::{
        canvas::query::{get_active_canvases, get_canvas},
        consumer::EventConsumer,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Uninitialized,
    Loading,
    Live,
    Discarded,
}

struct CanvasView {
    state: ViewState,
    width: u32,
    height: u32,
    bitmap: NibbleBitmap,
    rendered: Option<String>,
    applied: HashSet<TransactionId>,
}

impl CanvasView {
    fn loading() -> Self {
        Self {
            state: ViewState::Loading,
            width: 0,
            height: 0,
            bitmap: NibbleBitmap::default(),
            rendered: None,
            applied: HashSet::new(),
        }
    }

    fn discarded() -> Self {
        Self {
            state: ViewState::Discarded,
            ..Self::loading()
        }
    }

    /// Returns `None` when the transaction was already applied.
    fn apply(
        &mut self,
        transaction_id: TransactionId,
        pixel: &DrawPixelsAsset,
    ) -> Result<Option<diff::ViewDiff>> {
        if !self.applied.insert(transaction_id) {
            return Ok(None);
        }

        let coords = codec::decode_coordinates24(&pixel.coords)?;
        let colours = codec::decode_colours4(&pixel.colours);
        let diff = diff::apply_batch(&mut self.bitmap, &coords, &colours);

        if !diff.is_empty() {
            self.rendered = None;
        }
        Ok(Some(diff))
    }
}

/// Live 4-bit bitmap for every active canvas, rebuilt from committed blocks and
/// advanced optimistically by submitted draws.
pub struct ViewMaterializer {
    reader: Arc<dyn StateReader>,
    blocks: Arc<dyn BlockSource>,
    events: EventBus,
    retry: RetryPolicy,
    views: RwLock<HashMap<u32, CanvasView>>,
}

impl ViewMaterializer {
    pub fn new(
        reader: Arc<dyn StateReader>,
        blocks: Arc<dyn BlockSource>,
        events: EventBus,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            reader,
            blocks,
            events,
            retry,
            views: RwLock::new(HashMap::new()),
        }
    }

    pub async fn state(&self, canvas_id: u32) -> ViewState {
        self.views
            .read()
            .await
            .get(&canvas_id)
            .map_or(ViewState::Uninitialized, |view| view.state)
    }

    /// Base64 of the bitmap, rendered on first read after a change.
    pub async fn get_view(&self, canvas_id: u32) -> Option<String> {
        let mut views = self.views.write().await;
        let view = views.get_mut(&canvas_id)?;

        if view.state != ViewState::Live {
            return None;
        }

        Some(
            view.rendered
                .get_or_insert_with(|| view.bitmap.to_base64())
                .clone(),
        )
    }

    /// Palette indices as `height` rows of `width` pixels.
    pub async fn get_pixels(&self, canvas_id: u32) -> Option<Vec<Vec<u8>>> {
        let views = self.views.read().await;
        let view = views.get(&canvas_id)?;

        if view.state != ViewState::Live {
            return None;
        }

        Some(
            (0..view.height)
                .map(|row| {
                    (0..view.width)
                        .map(|column| view.bitmap.get(row * view.width + column))
                        .collect()
                })
                .collect(),
        )
    }

    /// Rebuilds one canvas from its first block up to the current tip.
    pub async fn load_view(&self, canvas_id: u32) -> Result<()> {
        self.views
            .write()
            .await
            .insert(canvas_id, CanvasView::loading());

        let canvas = get_canvas(self.reader.as_ref(), canvas_id)
            .await?
            .ok_or(AppError::NotFound(canvas_id))?;

        let mut view = CanvasView {
            state: ViewState::Live,
            width: canvas.width,
            height: canvas.height,
            bitmap: NibbleBitmap::new(canvas.width, canvas.height),
            rendered: None,
            applied: HashSet::new(),
        };

        let tip = self.blocks.tip_height().await?.unwrap_or(0);
        let last = canvas.end_block_height.min(tip);

        for height in canvas.start_block_height..=last {
            let Some(block) = fetch_block_with_retry(self.blocks.as_ref(), height, self.retry).await?
            else {
                break;
            };

            for transaction in &block.transactions {
                if let TransactionPayload::DrawPixels(pixel) = &transaction.payload
                    && pixel.canvas_id == canvas_id
                {
                    view.apply(transaction.id, pixel)?;
                }
            }
        }

        tracing::info!(
            canvas_id,
            from = canvas.start_block_height,
            to = last,
            "View loaded"
        );

        self.views.write().await.insert(canvas_id, view);
        Ok(())
    }

    pub async fn discard(&self, canvas_id: u32) {
        self.views
            .write()
            .await
            .insert(canvas_id, CanvasView::discarded());
        tracing::info!(canvas_id, "View discarded");
    }

    async fn apply_change(&self, change: &PixelChange) -> Result<()> {
        let canvas_id = change.pixel.canvas_id;

        let diff = {
            let mut views = self.views.write().await;
            let Some(view) = views.get_mut(&canvas_id) else {
                return Ok(());
            };
            if view.state != ViewState::Live {
                return Ok(());
            }
            view.apply(change.transaction_id, &change.pixel)?
        };

        if let Some(diff) = diff
            && !diff.is_empty()
        {
            let (coords, colours) = diff.encode();
            self.events.publish(CanvasEvent::ViewChanged(ViewChange {
                canvas_id,
                coords,
                colours,
            }));
        }
        Ok(())
    }

    async fn live_canvases(&self) -> Vec<u32> {
        self.views
            .read()
            .await
            .iter()
            .filter(|(_, view)| view.state == ViewState::Live)
            .map(|(canvas_id, _)| *canvas_id)
            .collect()
    }
}

#[async_trait]
impl EventConsumer for ViewMaterializer {
    fn name(&self) -> &'static str {
        "view"
    }

    async fn initialise(&self) -> Result<()> {
        for canvas_id in get_active_canvases(self.reader.as_ref()).await? {
            self.load_view(canvas_id).await?;
        }
        Ok(())
    }

    async fn handle(&self, event: &CanvasEvent) -> Result<()> {
        match event {
            CanvasEvent::Started { canvas_id } => self.load_view(*canvas_id).await,
            CanvasEvent::Completed { canvas_id } => {
                self.discard(*canvas_id).await;
                Ok(())
            }
            CanvasEvent::PixelChangeSubmitted(change)
            | CanvasEvent::PixelChangeCommitted(change) => self.apply_change(change).await,
            _ => Ok(()),
        }
    }

    async fn resync(&self) -> Result<()> {
        let mut canvas_ids = self.live_canvases().await;
        for canvas_id in get_active_canvases(self.reader.as_ref()).await? {
            if !canvas_ids.contains(&canvas_id) {
                canvas_ids.push(canvas_id);
            }
        }

        for canvas_id in canvas_ids {
            self.load_view(canvas_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        codec::Palette,
        ledger::{
            Address, Block, MemoryStore, StateBatch, StateStore, Transaction,
            block::StoreBlockSource,
            entities::{Canvas, CanvasState, CounterRecord},
            keys::StateKey,
        },
    };

    const CANVAS_ID: u32 = 7;

    fn draw(nonce: u64, coords: &[u32], colours: &[u8]) -> Transaction {
        Transaction::new(
            Address::new([9; 20]),
            nonce,
            0,
            TransactionPayload::DrawPixels(DrawPixelsAsset {
                canvas_id: CANVAS_ID,
                coords: codec::encode_coordinates24(coords),
                colours: codec::encode_colours4(colours),
            }),
        )
    }

    async fn seeded_store(blocks: Vec<Block>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut batch = StateBatch::new(store.as_ref());

        let canvas = Canvas {
            owner: Address::new([1; 20]),
            cost_per_pixel: 0,
            start_block_height: 1,
            end_block_height: 100,
            width: 4,
            height: 4,
            time_between_draws: 0,
            colour_palette: Palette::from_bytes(&[0; 48]).unwrap(),
            max_pixels_per_transaction: 16,
            label: String::new(),
            state: CanvasState::Active,
        };
        batch.set(StateKey::canvas(CANVAS_ID), canvas.encode());

        let tip = blocks.last().map_or(0, |block| block.header.height);
        for block in blocks {
            batch.set(StateKey::block(block.header.height), block.encode());
        }
        batch.set_record(StateKey::CHAIN_TIP, &CounterRecord { value: tip });
        batch.commit(store.as_ref()).await.unwrap();
        store
    }

    fn materializer(store: Arc<MemoryStore>, events: EventBus) -> ViewMaterializer {
        let store: Arc<dyn StateStore> = store;
        ViewMaterializer::new(
            store.clone(),
            Arc::new(StoreBlockSource::new(store)),
            events,
            RetryPolicy {
                attempts: 1,
                delay: Duration::from_millis(1),
            },
        )
    }

    fn pixel_change(transaction: &Transaction, block_height: Option<u64>) -> PixelChange {
        let TransactionPayload::DrawPixels(pixel) = &transaction.payload else {
            unreachable!()
        };
        PixelChange {
            address: transaction.sender,
            transaction_id: transaction.id,
            block_height,
            pixel: Arc::new(pixel.clone()),
        }
    }

    #[tokio::test]
    async fn replay_applies_draws_in_block_order() {
        let store = seeded_store(vec![
            Block::new(1, 0, vec![draw(1, &[0, 1], &[3, 4])]),
            Block::new(2, 0, vec![draw(2, &[1], &[9])]),
        ])
        .await;
        let views = materializer(store, EventBus::new(16));

        views.load_view(CANVAS_ID).await.unwrap();

        let pixels = views.get_pixels(CANVAS_ID).await.unwrap();
        assert_eq!(pixels[0], vec![3, 9, 0, 0]);
        assert_eq!(views.state(CANVAS_ID).await, ViewState::Live);
    }

    #[tokio::test]
    async fn committed_draw_already_submitted_is_not_reapplied() {
        let store = seeded_store(vec![Block::new(1, 0, vec![])]).await;
        let events = EventBus::new(16);
        let mut receiver = events.subscribe();
        let views = materializer(store, events);
        views.load_view(CANVAS_ID).await.unwrap();

        let first = draw(1, &[5], &[2]);
        let second = draw(2, &[5], &[6]);

        views
            .handle(&CanvasEvent::PixelChangeSubmitted(pixel_change(&first, None)))
            .await
            .unwrap();
        views
            .handle(&CanvasEvent::PixelChangeSubmitted(pixel_change(&second, None)))
            .await
            .unwrap();
        views
            .handle(&CanvasEvent::PixelChangeCommitted(pixel_change(&first, Some(2))))
            .await
            .unwrap();

        let pixels = views.get_pixels(CANVAS_ID).await.unwrap();
        assert_eq!(pixels[1][1], 6);

        let mut changes = 0;
        while let Ok(event) = receiver.try_recv() {
            if let CanvasEvent::ViewChanged(change) = event {
                assert_eq!(change.canvas_id, CANVAS_ID);
                assert_eq!(change.coords, vec![5, 0, 0]);
                changes += 1;
            }
        }
        assert_eq!(changes, 2);
    }

    #[tokio::test]
    async fn rendering_is_cached_until_the_next_change() {
        let store = seeded_store(vec![Block::new(1, 0, vec![])]).await;
        let views = materializer(store, EventBus::new(16));
        views.load_view(CANVAS_ID).await.unwrap();

        let blank = views.get_view(CANVAS_ID).await.unwrap();
        assert_eq!(blank, "AAAAAAAAAAA=");

        let transaction = draw(1, &[0], &[15]);
        views
            .handle(&CanvasEvent::PixelChangeSubmitted(pixel_change(&transaction, None)))
            .await
            .unwrap();

        assert_eq!(views.get_view(CANVAS_ID).await.unwrap(), "DwAAAAAAAAA=");
    }

    #[tokio::test]
    async fn completed_canvas_has_no_view() {
        let store = seeded_store(vec![Block::new(1, 0, vec![])]).await;
        let views = materializer(store, EventBus::new(16));
        views.load_view(CANVAS_ID).await.unwrap();

        views
            .handle(&CanvasEvent::Completed {
                canvas_id: CANVAS_ID,
            })
            .await
            .unwrap();

        assert_eq!(views.get_view(CANVAS_ID).await, None);
        assert_eq!(views.state(CANVAS_ID).await, ViewState::Discarded);
        assert_eq!(views.get_view(99).await, None);
    }
}
