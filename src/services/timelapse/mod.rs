pub mod image;

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use tokio::sync::Mutex;

use crate::{
    codec::{self, NibbleBitmap, Palette},
    config::TimelapseConfig,
    error::{AppError, Result},
    infrastructure::db::{
        Database,
        repositories::{ActivityRepository, NewTimelapseSummary, TimelapseRepository},
    },
    ledger::{
        Address, Block, BlockSource, CanvasEvent, StateReader,
        assets::TransactionPayload,
        block::{RetryPolicy, fetch_block_with_retry},
    },
    services::{
        canvas::query::{get_active_canvases, get_canvas, get_complete_canvases},
        consumer::EventConsumer,
    },
};

/// Blocks between snapshots, aiming for `target` snapshots across the window.
pub fn chunk_size(start: u64, end: u64, target: u64) -> u64 {
    end.saturating_sub(start).div_ceil(target.max(1)).max(1)
}

struct Timelapse {
    summary_id: i32,
    start: u64,
    end: u64,
    chunk_size: u64,
    width: u32,
    height: u32,
    palette: Palette,
    snapshot: NibbleBitmap,
    next_height: u64,
}

impl Timelapse {
    fn covers(&self, height: u64) -> bool {
        height >= self.next_height && height >= self.start && height <= self.end
    }

    fn is_boundary(&self, height: u64) -> bool {
        (height - self.start) % self.chunk_size == 0
    }
}

/// Records per-canvas draw activity and periodic snapshots with PNG previews.
pub struct TimelapseMaterializer {
    db: Arc<Database>,
    reader: Arc<dyn StateReader>,
    blocks: Arc<dyn BlockSource>,
    retry: RetryPolicy,
    chunk_target: u64,
    preview_scale: u32,
    timelapses: Mutex<HashMap<u32, Timelapse>>,
    last_block: AtomicU64,
}

impl TimelapseMaterializer {
    pub fn new(
        db: Arc<Database>,
        reader: Arc<dyn StateReader>,
        blocks: Arc<dyn BlockSource>,
        retry: RetryPolicy,
        config: &TimelapseConfig,
    ) -> Self {
        Self {
            db,
            reader,
            blocks,
            retry,
            chunk_target: config.chunk_target,
            preview_scale: config.preview_scale,
            timelapses: Mutex::new(HashMap::new()),
            last_block: AtomicU64::new(0),
        }
    }

    pub async fn tracked_canvases(&self) -> Vec<u32> {
        let mut canvas_ids: Vec<u32> = self.timelapses.lock().await.keys().copied().collect();
        canvas_ids.sort_unstable();
        canvas_ids
    }

    /// Starts or restarts tracking a canvas from its first block.
    pub async fn initialise_timelapse(&self, canvas_id: u32) -> Result<()> {
        let canvas = get_canvas(self.reader.as_ref(), canvas_id)
            .await?
            .ok_or(AppError::NotFound(canvas_id))?;

        let chunk_size = chunk_size(
            canvas.start_block_height,
            canvas.end_block_height,
            self.chunk_target,
        );

        let summary = TimelapseRepository::get_or_create_summary(
            self.db.get_connection(),
            NewTimelapseSummary {
                canvas_id,
                start_block_height: canvas.start_block_height,
                end_block_height: canvas.end_block_height,
                chunk_size,
                width: canvas.width,
                height: canvas.height,
                colour_palette: canvas.colour_palette.to_bytes(),
                label: canvas.label.clone(),
            },
        )
        .await?;

        self.timelapses.lock().await.insert(
            canvas_id,
            Timelapse {
                summary_id: summary.id,
                start: canvas.start_block_height,
                end: canvas.end_block_height,
                chunk_size,
                width: canvas.width,
                height: canvas.height,
                palette: canvas.colour_palette,
                snapshot: NibbleBitmap::new(canvas.width, canvas.height),
                next_height: canvas.start_block_height,
            },
        );

        tracing::debug!(canvas_id, chunk_size, "Timelapse initialised");
        Ok(())
    }

    /// Processes one committed block for every tracked canvas whose window covers it.
    /// With `only` set, just that canvas is touched.
    pub async fn process_block(&self, block: &Block, only: Option<u32>) -> Result<()> {
        let height = block.header.height;
        let mut timelapses = self.timelapses.lock().await;

        let stepping: Vec<u32> = timelapses
            .iter()
            .filter(|(canvas_id, timelapse)| {
                only.is_none_or(|id| id == **canvas_id) && timelapse.covers(height)
            })
            .map(|(canvas_id, _)| *canvas_id)
            .collect();

        if stepping.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin_transaction().await?;

        for canvas_id in &stepping {
            let timelapse = &timelapses[canvas_id];
            if height != timelapse.end && timelapse.is_boundary(height) {
                self.capture(&txn, timelapse, height).await?;
            }
        }

        self.record_draws(&txn, block, &mut timelapses, &stepping)
            .await?;

        let mut completed = Vec::new();
        for canvas_id in &stepping {
            let timelapse = &timelapses[canvas_id];
            if height == timelapse.end {
                self.capture(&txn, timelapse, height).await?;
                TimelapseRepository::mark_completed(&txn, *canvas_id).await?;
                completed.push(*canvas_id);
            }
        }

        txn.commit().await?;

        for canvas_id in stepping {
            if completed.contains(&canvas_id) {
                timelapses.remove(&canvas_id);
                tracing::info!(canvas_id, height, "Timelapse completed");
            } else if let Some(timelapse) = timelapses.get_mut(&canvas_id) {
                timelapse.next_height = height + 1;
            }
        }

        Ok(())
    }

    async fn record_draws<C: ConnectionTrait>(
        &self,
        txn: &C,
        block: &Block,
        timelapses: &mut HashMap<u32, Timelapse>,
        stepping: &[u32],
    ) -> Result<()> {
        let height = block.header.height;
        let mut block_fks: HashMap<u32, i32> = HashMap::new();
        let mut account_fks: HashMap<Address, i32> = HashMap::new();

        for (index, transaction) in block.transactions.iter().enumerate() {
            let TransactionPayload::DrawPixels(pixel) = &transaction.payload else {
                continue;
            };
            if !stepping.contains(&pixel.canvas_id) {
                continue;
            }

            let block_fk = match block_fks.get(&pixel.canvas_id) {
                Some(block_fk) => *block_fk,
                None => {
                    let block_fk =
                        ActivityRepository::get_or_create_block(txn, pixel.canvas_id, height)
                            .await?;
                    block_fks.insert(pixel.canvas_id, block_fk);
                    block_fk
                }
            };

            let account_fk = match account_fks.get(&transaction.sender) {
                Some(account_fk) => *account_fk,
                None => {
                    let account_fk = ActivityRepository::get_or_create_account(
                        txn,
                        &transaction.sender.to_hex(),
                    )
                    .await?;
                    account_fks.insert(transaction.sender, account_fk);
                    account_fk
                }
            };

            ActivityRepository::create_transaction(
                txn,
                account_fk,
                block_fk,
                index as i32,
                pixel.coords.clone(),
                pixel.colours.clone(),
            )
            .await?;

            if let Some(timelapse) = timelapses.get_mut(&pixel.canvas_id) {
                let coords = codec::decode_coordinates24(&pixel.coords)?;
                let colours = codec::decode_colours4(&pixel.colours);
                for (coord, colour) in coords.into_iter().zip(colours) {
                    timelapse.snapshot.set(coord, colour);
                }
            }
        }

        Ok(())
    }

    async fn capture<C: ConnectionTrait>(
        &self,
        txn: &C,
        timelapse: &Timelapse,
        height: u64,
    ) -> Result<()> {
        let created = TimelapseRepository::create_snapshot(
            txn,
            timelapse.summary_id,
            height,
            timelapse.snapshot.as_bytes().to_vec(),
        )
        .await?;

        // A snapshot and its preview are written together, so a known height has both.
        if created {
            let preview = image::render_preview(
                &timelapse.snapshot,
                timelapse.width,
                timelapse.height,
                &timelapse.palette,
                self.preview_scale,
            )?;
            TimelapseRepository::create_preview(txn, timelapse.summary_id, height, preview)
                .await?;
        }

        tracing::debug!(
            summary_id = timelapse.summary_id,
            height,
            created,
            "Timelapse snapshot captured"
        );
        Ok(())
    }

    async fn replay(&self, from: u64, to: u64, only: Option<u32>) -> Result<()> {
        for height in from..=to {
            let Some(block) = fetch_block_with_retry(self.blocks.as_ref(), height, self.retry).await?
            else {
                break;
            };
            self.process_block(&block, only).await?;
        }
        Ok(())
    }

    async fn tip(&self) -> Result<u64> {
        Ok(self.blocks.tip_height().await?.unwrap_or(0))
    }

    async fn start_canvas(&self, canvas_id: u32) -> Result<()> {
        self.initialise_timelapse(canvas_id).await?;

        let window = {
            let timelapses = self.timelapses.lock().await;
            timelapses.get(&canvas_id).map(|t| (t.start, t.end))
        };

        if let Some((start, end)) = window {
            let tip = self.tip().await?;
            self.replay(start, end.min(tip), Some(canvas_id)).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventConsumer for TimelapseMaterializer {
    fn name(&self) -> &'static str {
        "timelapse"
    }

    async fn initialise(&self) -> Result<()> {
        let active = get_active_canvases(self.reader.as_ref()).await?;
        let complete = get_complete_canvases(self.reader.as_ref()).await?;

        let mut pending_completion = Vec::new();
        for canvas_id in &complete {
            match TimelapseRepository::find_summary_by_canvas(self.db.get_connection(), *canvas_id)
                .await?
            {
                Some(summary) if summary.completed => continue,
                _ => pending_completion.push(*canvas_id),
            }
        }

        for canvas_id in active.iter().chain(&pending_completion) {
            self.initialise_timelapse(*canvas_id).await?;
        }

        let range = {
            let timelapses = self.timelapses.lock().await;
            let from = timelapses.values().map(|t| t.start).min();
            let to = timelapses.values().map(|t| t.end).max();
            from.zip(to)
        };

        if let Some((from, to)) = range {
            let tip = self.tip().await?;
            self.replay(from, to.min(tip), None).await?;
        }

        for canvas_id in pending_completion {
            TimelapseRepository::mark_completed(self.db.get_connection(), canvas_id).await?;
            self.timelapses.lock().await.remove(&canvas_id);
        }

        tracing::info!(
            active = active.len(),
            complete = complete.len(),
            "Timelapses initialised"
        );
        Ok(())
    }

    async fn handle(&self, event: &CanvasEvent) -> Result<()> {
        match event {
            CanvasEvent::Started { canvas_id } => self.start_canvas(*canvas_id).await,
            CanvasEvent::NewBlock(block) => {
                self.process_block(block, None).await?;
                self.last_block.store(block.header.height, Ordering::Relaxed);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn resync(&self) -> Result<()> {
        let tracked = self.tracked_canvases().await;
        for canvas_id in get_active_canvases(self.reader.as_ref()).await? {
            if !tracked.contains(&canvas_id) {
                self.initialise_timelapse(canvas_id).await?;
            }
        }

        let watermark = self.last_block.load(Ordering::Relaxed) + 1;
        let from = {
            let timelapses = self.timelapses.lock().await;
            timelapses
                .values()
                .map(|t| t.next_height)
                .min()
                .map_or(watermark, |next| next.min(watermark))
        };

        let tip = self.tip().await?;
        self.replay(from, tip, None).await?;
        self.last_block.store(tip, Ordering::Relaxed);
        Ok(())
    }
}
