use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::{
    error::{AppError, Result},
    ledger::Block,
    services::chain::{Chain, Mempool},
};

/// Single-sequencer block production on a fixed interval.
pub struct BlockProducer {
    chain: Arc<Chain>,
    mempool: Arc<Mempool>,
    interval: Duration,
    max_transactions: usize,
}

impl BlockProducer {
    pub fn new(
        chain: Arc<Chain>,
        mempool: Arc<Mempool>,
        interval: Duration,
        max_transactions: usize,
    ) -> Self {
        Self {
            chain,
            mempool,
            interval,
            max_transactions,
        }
    }

    pub async fn produce_once(&self) -> Result<Arc<Block>> {
        let transactions = self.mempool.drain(self.max_transactions).await;
        self.chain
            .produce_block(transactions, Utc::now().timestamp())
            .await
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Block producer started");

        loop {
            ticker.tick().await;

            match self.produce_once().await {
                Ok(block) => {
                    tracing::debug!(height = block.header.height, "Block produced");
                }
                Err(AppError::Inconsistency(reason)) => {
                    tracing::error!(reason, "Ledger inconsistency, block production halted");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Block production failed");
                }
            }
        }
    }
}
