pub mod mempool;
pub mod producer;

use std::{collections::HashSet, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    error::{AppError, Result},
    ledger::{
        Address, Block, CanvasEvent, EventBus, StateBatch, StateStore, Transaction,
        accounts::Accounts,
        assets::TransactionPayload,
        entities::{AddressRecord, CounterRecord},
        events::PixelChange,
        keys::StateKey,
        store::{Writes, read_record},
    },
    services::canvas::{self, TransactionContext, Transition, lifecycle::run_lifecycle},
};

pub use mempool::Mempool;
pub use producer::BlockProducer;

#[derive(Debug, Clone)]
pub struct Genesis {
    pub admin: Address,
    pub wallet: Address,
    pub balances: Vec<(Address, u64)>,
    pub timestamp: i64,
}

/// Applies blocks to the ledger store one at a time and announces the results.
pub struct Chain {
    store: Arc<dyn StateStore>,
    events: EventBus,
    apply_lock: Mutex<()>,
}

impl Chain {
    pub fn new(store: Arc<dyn StateStore>, events: EventBus) -> Self {
        Self {
            store,
            events,
            apply_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn tip_height(&self) -> Result<Option<u64>> {
        Ok(
            read_record::<CounterRecord>(self.store.as_ref(), StateKey::CHAIN_TIP)
                .await?
                .map(|tip| tip.value),
        )
    }

    /// Writes roles, opening balances and the empty block at height 0.
    ///
    /// Returns `false` when the store already holds a chain.
    pub async fn apply_genesis(&self, genesis: &Genesis) -> Result<bool> {
        let _guard = self.apply_lock.lock().await;

        if self.tip_height().await?.is_some() {
            return Ok(false);
        }

        let mut batch = StateBatch::new(self.store.as_ref());
        batch.set_record(
            StateKey::ADMIN_ADDRESS,
            &AddressRecord {
                address: genesis.admin.as_bytes().to_vec(),
            },
        );
        batch.set_record(
            StateKey::WALLET_ADDRESS,
            &AddressRecord {
                address: genesis.wallet.as_bytes().to_vec(),
            },
        );
        for (address, amount) in &genesis.balances {
            Accounts::credit(&mut batch, address, *amount).await?;
        }

        let block = Block::new(0, genesis.timestamp, vec![]);
        batch.set(StateKey::block(0), block.encode());
        batch.set_record(StateKey::CHAIN_TIP, &CounterRecord { value: 0 });
        batch.commit(self.store.as_ref()).await?;

        tracing::info!(
            admin = %genesis.admin,
            wallet = %genesis.wallet,
            accounts = genesis.balances.len(),
            "Genesis applied"
        );

        Ok(true)
    }

    /// Builds the next block from `transactions` and applies it.
    pub async fn produce_block(
        &self,
        transactions: Vec<Transaction>,
        timestamp: i64,
    ) -> Result<Arc<Block>> {
        let height = self
            .tip_height()
            .await?
            .ok_or_else(|| AppError::Inconsistency("genesis not applied".into()))?
            + 1;

        self.apply_block(Block::new(height, timestamp, transactions))
            .await
    }

    /// Applies every transaction that passes, then the lifecycle pass, and commits the
    /// whole block in one batch. Rejected transactions are left out of the stored block.
    pub async fn apply_block(&self, block: Block) -> Result<Arc<Block>> {
        let _guard = self.apply_lock.lock().await;

        let tip = self
            .tip_height()
            .await?
            .ok_or_else(|| AppError::Inconsistency("genesis not applied".into()))?;
        let height = block.header.height;

        if height != tip + 1 {
            return Err(AppError::Inconsistency(format!(
                "block {height} does not extend tip {tip}"
            )));
        }

        let mut block_batch = StateBatch::new(self.store.as_ref());
        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(block.transactions.len());
        // Held back until the block is committed.
        let mut submitted = Vec::new();

        for transaction in block.transactions {
            if !seen.insert(transaction.id) {
                tracing::warn!(transaction_id = %transaction.id, "Duplicate transaction dropped");
                continue;
            }

            match apply_transaction(&block_batch, &transaction, height).await {
                Ok(writes) => {
                    block_batch.merge(writes);
                    if let TransactionPayload::DrawPixels(pixel) = &transaction.payload {
                        submitted.push(CanvasEvent::PixelChangeSubmitted(PixelChange {
                            address: transaction.sender,
                            transaction_id: transaction.id,
                            block_height: None,
                            pixel: Arc::new(pixel.clone()),
                        }));
                    }
                    accepted.push(transaction);
                }
                Err(e) if e.is_transaction_error() => {
                    tracing::warn!(
                        transaction_id = %transaction.id,
                        sender = %transaction.sender,
                        asset = transaction.payload.asset_name(),
                        error = %e,
                        "Transaction rejected"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let transitions = run_lifecycle(&mut block_batch, height).await?;

        let total = block_batch
            .get_record::<CounterRecord>(StateKey::TOTAL_TRANSACTIONS)
            .await?
            .map_or(0, |counter| counter.value);
        block_batch.set_record(
            StateKey::TOTAL_TRANSACTIONS,
            &CounterRecord {
                value: total + accepted.len() as u64,
            },
        );

        let committed = Arc::new(Block::new(height, block.header.timestamp, accepted));
        block_batch.set(StateKey::block(height), committed.encode());
        block_batch.set_record(StateKey::CHAIN_TIP, &CounterRecord { value: height });
        block_batch.commit(self.store.as_ref()).await?;

        tracing::info!(
            height,
            transactions = committed.transactions.len(),
            transitions = transitions.len(),
            "Block committed"
        );

        for event in submitted {
            self.events.publish(event);
        }
        self.publish_block_events(&committed, &transitions);
        Ok(committed)
    }

    fn publish_block_events(&self, block: &Arc<Block>, transitions: &[Transition]) {
        let height = block.header.height;

        for transition in transitions {
            if let Transition::Started(canvas_id) = transition {
                self.events.publish(CanvasEvent::Started {
                    canvas_id: *canvas_id,
                });
            }
        }

        for transaction in &block.transactions {
            match &transaction.payload {
                TransactionPayload::DrawPixels(pixel) => {
                    self.events
                        .publish(CanvasEvent::PixelChangeCommitted(PixelChange {
                            address: transaction.sender,
                            transaction_id: transaction.id,
                            block_height: Some(height),
                            pixel: Arc::new(pixel.clone()),
                        }));
                }
                TransactionPayload::DrawPixel(pixel) => {
                    self.events.publish(CanvasEvent::PixelChanged {
                        address: transaction.sender,
                        block_height: height,
                        pixel: pixel.clone(),
                    });
                }
                _ => {}
            }
        }

        for transition in transitions {
            if let Transition::Completed(canvas_id) = transition {
                self.events.publish(CanvasEvent::Completed {
                    canvas_id: *canvas_id,
                });
            }
        }

        self.events.publish(CanvasEvent::NewBlock(Arc::clone(block)));
    }
}

/// Runs one transaction over the block batch and returns its writes on success.
pub async fn apply_transaction(
    parent: &StateBatch<'_>,
    transaction: &Transaction,
    height: u64,
) -> Result<Writes> {
    canvas::validate_payload(&transaction.payload, height)?;

    let mut batch = StateBatch::new(parent);

    if transaction.fee > 0 {
        Accounts::debit(&mut batch, &transaction.sender, transaction.fee).await?;
    }

    let context = TransactionContext {
        sender: &transaction.sender,
        transaction_id: transaction.id,
        block_height: height,
    };
    canvas::apply_payload(&mut batch, &context, &transaction.payload).await?;

    Ok(batch.into_writes())
}
