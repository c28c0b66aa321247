use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::Result,
    infrastructure::db::{
        Database, entities::transaction_summary, repositories::StatisticsRepository,
    },
    ledger::{
        Block, BlockSource, CanvasEvent, StateReader,
        block::{RetryPolicy, fetch_block_with_retry},
        entities::CounterRecord,
        keys::StateKey,
        store::read_record,
    },
    services::consumer::EventConsumer,
};

/// Ledger-side count of accepted transactions.
pub async fn get_total_transactions(reader: &dyn StateReader) -> Result<u64> {
    Ok(
        read_record::<CounterRecord>(reader, StateKey::TOTAL_TRANSACTIONS)
            .await?
            .map_or(0, |counter| counter.value),
    )
}

pub fn summarise(block: &Block) -> Vec<transaction_summary::Model> {
    block
        .transactions
        .iter()
        .map(|transaction| transaction_summary::Model {
            transaction_id: transaction.id.to_hex(),
            sender_address: transaction.sender.to_hex(),
            module_name: transaction.payload.module_name().to_string(),
            asset_name: transaction.payload.asset_name().to_string(),
            fee: transaction.fee as i64,
            block_height: block.header.height as i64,
        })
        .collect()
}

/// Writes one summary row per committed transaction.
pub struct StatisticsRecorder {
    db: Arc<Database>,
    blocks: Arc<dyn BlockSource>,
    retry: RetryPolicy,
}

impl StatisticsRecorder {
    pub fn new(db: Arc<Database>, blocks: Arc<dyn BlockSource>, retry: RetryPolicy) -> Self {
        Self { db, blocks, retry }
    }

    pub async fn record_block(&self, block: &Block) -> Result<usize> {
        let inserted =
            StatisticsRepository::insert_summaries(self.db.get_connection(), summarise(block))
                .await?;

        if inserted > 0 {
            tracing::debug!(height = block.header.height, inserted, "Transaction summaries recorded");
        }
        Ok(inserted)
    }

    /// Replays from the highest recorded height until a block is missing.
    pub async fn catch_up(&self) -> Result<u64> {
        let mut height = StatisticsRepository::last_block_height(self.db.get_connection())
            .await?
            .unwrap_or(0);
        let from = height;

        while let Some(block) =
            fetch_block_with_retry(self.blocks.as_ref(), height, self.retry).await?
        {
            self.record_block(&block).await?;
            height += 1;
        }

        tracing::info!(from, to = height.saturating_sub(1), "Statistics caught up");
        Ok(height)
    }
}

#[async_trait]
impl EventConsumer for StatisticsRecorder {
    fn name(&self) -> &'static str {
        "statistics"
    }

    async fn initialise(&self) -> Result<()> {
        self.catch_up().await.map(|_| ())
    }

    async fn handle(&self, event: &CanvasEvent) -> Result<()> {
        if let CanvasEvent::NewBlock(block) = event {
            self.record_block(block).await?;
        }
        Ok(())
    }

    async fn resync(&self) -> Result<()> {
        self.catch_up().await.map(|_| ())
    }
}
