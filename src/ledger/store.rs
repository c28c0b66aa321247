use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use prost::Message;
use tokio::sync::RwLock;

use crate::error::Result;

pub type Writes = BTreeMap<String, Vec<u8>>;

#[async_trait]
pub trait StateReader: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Keyed byte store backing the ledger. A batch is applied in full or not at all.
#[async_trait]
pub trait StateStore: StateReader {
    async fn write_batch(&self, writes: Writes) -> Result<()>;
}

pub async fn read_record<M: Message + Default>(
    reader: &dyn StateReader,
    key: &str,
) -> Result<Option<M>> {
    match reader.get(key).await? {
        Some(bytes) => Ok(Some(M::decode(bytes.as_slice())?)),
        None => Ok(None),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl StateReader for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn write_batch(&self, writes: Writes) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.extend(writes);
        Ok(())
    }
}

/// Write overlay on top of a reader. Reads see the overlay first.
///
/// Batches nest: a transaction runs in a batch over the block's batch and is merged
/// into it only when it succeeds.
pub struct StateBatch<'a> {
    parent: &'a dyn StateReader,
    writes: Writes,
}

impl<'a> StateBatch<'a> {
    pub fn new(parent: &'a dyn StateReader) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.insert(key.into(), value);
    }

    pub fn set_record<M: Message>(&mut self, key: impl Into<String>, record: &M) {
        self.set(key, record.encode_to_vec());
    }

    pub async fn get_record<M: Message + Default>(&self, key: &str) -> Result<Option<M>> {
        read_record(self, key).await
    }

    pub fn merge(&mut self, writes: Writes) {
        self.writes.extend(writes);
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Writes {
        self.writes
    }

    pub async fn commit(self, store: &dyn StateStore) -> Result<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        store.write_batch(self.writes).await
    }
}

#[async_trait]
impl StateReader for StateBatch<'_> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.parent.get(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entities::CounterRecord;

    #[tokio::test]
    async fn batch_reads_its_own_writes_before_commit() {
        let store = MemoryStore::new();
        store
            .write_batch(BTreeMap::from([("a".to_string(), vec![1])]))
            .await
            .unwrap();

        let mut batch = StateBatch::new(&store);
        batch.set("a", vec![2]);
        batch.set("b", vec![3]);

        assert_eq!(batch.get("a").await.unwrap(), Some(vec![2]));
        assert_eq!(store.get("a").await.unwrap(), Some(vec![1]));
        assert_eq!(store.get("b").await.unwrap(), None);

        batch.commit(&store).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(vec![2]));
        assert_eq!(store.get("b").await.unwrap(), Some(vec![3]));
    }

    #[tokio::test]
    async fn dropped_nested_batch_leaves_parent_untouched() {
        let store = MemoryStore::new();
        let mut block = StateBatch::new(&store);
        block.set_record("counter", &CounterRecord { value: 1 });

        {
            let mut failed = StateBatch::new(&block);
            failed.set_record("counter", &CounterRecord { value: 99 });
            let seen: Option<CounterRecord> = failed.get_record("counter").await.unwrap();
            assert_eq!(seen.map(|c| c.value), Some(99));
        }

        let accepted_writes = {
            let mut accepted = StateBatch::new(&block);
            let current: CounterRecord = accepted.get_record("counter").await.unwrap().unwrap();
            accepted.set_record(
                "counter",
                &CounterRecord {
                    value: current.value + 1,
                },
            );
            accepted.into_writes()
        };
        block.merge(accepted_writes);

        block.commit(&store).await.unwrap();
        let stored: CounterRecord = read_record(&store, "counter").await.unwrap().unwrap();
        assert_eq!(stored.value, 2);
        assert_eq!(store.len().await, 1);
    }
}
