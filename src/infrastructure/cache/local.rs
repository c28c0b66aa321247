use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;

use crate::{
    config::CacheConfig,
    error::Result,
    ledger::{CanvasEvent, assets::TransactionPayload, entities::Canvas},
    services::consumer::EventConsumer,
};

/// Decoded canvas records served to queries.
pub struct LocalCache {
    canvas_cache: Cache<u32, Arc<Canvas>>,
}

impl LocalCache {
    pub fn new(cache_config: &CacheConfig) -> Self {
        Self {
            canvas_cache: Cache::builder()
                .max_capacity(cache_config.local_canvas_max_capacity)
                .time_to_live(Duration::from_secs(cache_config.local_canvas_mid_ttl))
                .time_to_idle(Duration::from_secs(cache_config.local_canvas_short_ttl))
                .build(),
        }
    }

    pub async fn get_canvas(&self, canvas_id: u32) -> Option<Arc<Canvas>> {
        self.canvas_cache.get(&canvas_id).await
    }

    pub async fn set_canvas(&self, canvas_id: u32, canvas: Canvas) -> Arc<Canvas> {
        let canvas = Arc::new(canvas);
        self.canvas_cache.insert(canvas_id, Arc::clone(&canvas)).await;
        canvas
    }

    pub async fn invalidate_canvas(&self, canvas_id: u32) {
        self.canvas_cache.invalidate(&canvas_id).await;
    }

    pub fn invalidate_all(&self) {
        self.canvas_cache.invalidate_all();
    }
}

#[async_trait]
impl EventConsumer for LocalCache {
    fn name(&self) -> &'static str {
        "canvas-cache"
    }

    async fn initialise(&self) -> Result<()> {
        Ok(())
    }

    async fn handle(&self, event: &CanvasEvent) -> Result<()> {
        match event {
            CanvasEvent::Started { canvas_id } | CanvasEvent::Completed { canvas_id } => {
                self.invalidate_canvas(*canvas_id).await;
            }
            CanvasEvent::NewBlock(block) => {
                for transaction in &block.transactions {
                    if let TransactionPayload::CreateCanvas(_) | TransactionPayload::ChangeCanvas(_) =
                        &transaction.payload
                    {
                        self.invalidate_canvas(transaction.payload.canvas_id()).await;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn resync(&self) -> Result<()> {
        self.invalidate_all();
        Ok(())
    }
}
