use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use prost::Message;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{
    error::{AppError, Result},
    ledger::{
        address::Address,
        assets::TransactionPayload,
        entities::CounterRecord,
        keys::StateKey,
        store::{StateStore, read_record},
    },
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.to_hex())
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct TransactionRecord {
    #[prost(bytes = "vec", tag = "1")]
    pub sender: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
    #[prost(uint64, tag = "3")]
    pub fee: u64,
    #[prost(uint32, tag = "4")]
    pub module_id: u32,
    #[prost(uint32, tag = "5")]
    pub asset_id: u32,
    #[prost(bytes = "vec", tag = "6")]
    pub asset: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct BlockRecord {
    #[prost(uint64, tag = "1")]
    pub height: u64,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
    #[prost(message, repeated, tag = "3")]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub sender: Address,
    pub nonce: u64,
    pub fee: u64,
    pub payload: TransactionPayload,
}

impl Transaction {
    pub fn new(sender: Address, nonce: u64, fee: u64, payload: TransactionPayload) -> Self {
        let record = TransactionRecord {
            sender: sender.as_bytes().to_vec(),
            nonce,
            fee,
            module_id: payload.module_id(),
            asset_id: payload.asset_id(),
            asset: payload.encode_asset(),
        };

        Self {
            id: transaction_id(&record),
            sender,
            nonce,
            fee,
            payload,
        }
    }

    pub fn to_record(&self) -> TransactionRecord {
        TransactionRecord {
            sender: self.sender.as_bytes().to_vec(),
            nonce: self.nonce,
            fee: self.fee,
            module_id: self.payload.module_id(),
            asset_id: self.payload.asset_id(),
            asset: self.payload.encode_asset(),
        }
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = AppError;

    fn try_from(record: TransactionRecord) -> Result<Self> {
        let payload = TransactionPayload::decode(record.module_id, record.asset_id, &record.asset)?;

        Ok(Self {
            id: transaction_id(&record),
            sender: Address::from_slice(&record.sender)?,
            nonce: record.nonce,
            fee: record.fee,
            payload,
        })
    }
}

fn transaction_id(record: &TransactionRecord) -> TransactionId {
    TransactionId(Sha256::digest(record.encode_to_vec()).into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(height: u64, timestamp: i64, transactions: Vec<Transaction>) -> Self {
        Self {
            header: BlockHeader { height, timestamp },
            transactions,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        BlockRecord {
            height: self.header.height,
            timestamp: self.header.timestamp,
            transactions: self.transactions.iter().map(Transaction::to_record).collect(),
        }
        .encode_to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let record = BlockRecord::decode(bytes)?;
        let transactions = record
            .transactions
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(record.height, record.timestamp, transactions))
    }
}

#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn tip_height(&self) -> Result<Option<u64>>;
    async fn block_by_height(&self, height: u64) -> Result<Option<Block>>;
}

/// Committed blocks kept alongside the ledger state.
pub struct StoreBlockSource {
    store: Arc<dyn StateStore>,
}

impl StoreBlockSource {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BlockSource for StoreBlockSource {
    async fn tip_height(&self) -> Result<Option<u64>> {
        Ok(
            read_record::<CounterRecord>(self.store.as_ref(), StateKey::CHAIN_TIP)
                .await?
                .map(|tip| tip.value),
        )
    }

    async fn block_by_height(&self, height: u64) -> Result<Option<Block>> {
        match self.store.get(&StateKey::block(height)).await? {
            Some(bytes) => Ok(Some(Block::decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

/// Reads a block, retrying transient failures. An absent block is not retried.
pub async fn fetch_block_with_retry(
    source: &dyn BlockSource,
    height: u64,
    retry: RetryPolicy,
) -> Result<Option<Block>> {
    let mut attempt = 1;

    loop {
        match source.block_by_height(height).await {
            Ok(block) => return Ok(block),
            Err(e) if attempt < retry.attempts => {
                tracing::warn!(height, attempt, error = %e, "Block fetch failed, retrying");
                attempt += 1;
                tokio::time::sleep(retry.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
