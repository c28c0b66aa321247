use std::collections::VecDeque;

use tokio::sync::Mutex;

use crate::{
    error::{AppError, Result},
    ledger::{Transaction, TransactionId},
};

/// Bounded FIFO of transactions waiting for the next block.
pub struct Mempool {
    transactions: Mutex<VecDeque<Transaction>>,
    capacity: usize,
}

impl Mempool {
    pub fn new(capacity: usize) -> Self {
        Self {
            transactions: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub async fn submit(&self, transaction: Transaction) -> Result<TransactionId> {
        let mut transactions = self.transactions.lock().await;
        let id = transaction.id;

        if transactions.iter().any(|queued| queued.id == id) {
            return Ok(id);
        }

        if transactions.len() >= self.capacity {
            return Err(AppError::MempoolFull);
        }

        transactions.push_back(transaction);
        Ok(id)
    }

    pub async fn drain(&self, max: usize) -> Vec<Transaction> {
        let mut transactions = self.transactions.lock().await;
        let count = max.min(transactions.len());
        transactions.drain(..count).collect()
    }

    pub async fn len(&self) -> usize {
        self.transactions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        Address,
        assets::{DrawPixelAsset, TransactionPayload},
    };

    fn transaction(nonce: u64) -> Transaction {
        Transaction::new(
            Address::new([2; 20]),
            nonce,
            0,
            TransactionPayload::DrawPixel(DrawPixelAsset {
                canvas_id: 1,
                coords: 0,
                colour: 0,
            }),
        )
    }

    #[tokio::test]
    async fn keeps_submission_order_and_capacity() {
        let mempool = Mempool::new(2);

        mempool.submit(transaction(1)).await.unwrap();
        mempool.submit(transaction(2)).await.unwrap();
        assert!(matches!(
            mempool.submit(transaction(3)).await,
            Err(AppError::MempoolFull)
        ));

        let drained = mempool.drain(10).await;
        assert_eq!(
            drained.iter().map(|t| t.nonce).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(mempool.is_empty().await);
    }

    #[tokio::test]
    async fn resubmission_is_not_queued_twice() {
        let mempool = Mempool::new(4);
        let first = mempool.submit(transaction(1)).await.unwrap();
        let second = mempool.submit(transaction(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mempool.len().await, 1);
    }
}
