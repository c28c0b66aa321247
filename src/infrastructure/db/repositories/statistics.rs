use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, prelude::Expr,
};

use crate::{
    error::{AppError, Result},
    infrastructure::db::entities::{TransactionSummary, transaction_summary},
};

pub struct StatisticsRepository;

impl StatisticsRepository {
    /// Inserts the summaries whose transaction id is not stored yet and returns how many were new.
    pub async fn insert_summaries<C: ConnectionTrait>(
        db_connection: &C,
        summaries: Vec<transaction_summary::Model>,
    ) -> Result<usize> {
        if summaries.is_empty() {
            return Ok(0);
        }

        let ids: Vec<String> = summaries
            .iter()
            .map(|summary| summary.transaction_id.clone())
            .collect();

        let existing: Vec<String> = TransactionSummary::find()
            .select_only()
            .column(transaction_summary::Column::TransactionId)
            .filter(transaction_summary::Column::TransactionId.is_in(ids))
            .into_tuple()
            .all(db_connection)
            .await?;

        let fresh: Vec<_> = summaries
            .into_iter()
            .filter(|summary| !existing.contains(&summary.transaction_id))
            .map(|summary| transaction_summary::ActiveModel {
                transaction_id: Set(summary.transaction_id),
                sender_address: Set(summary.sender_address),
                module_name: Set(summary.module_name),
                asset_name: Set(summary.asset_name),
                fee: Set(summary.fee),
                block_height: Set(summary.block_height),
            })
            .collect();

        let inserted = fresh.len();
        if inserted > 0 {
            TransactionSummary::insert_many(fresh)
                .exec_without_returning(db_connection)
                .await?;
        }

        Ok(inserted)
    }

    pub async fn last_block_height<C: ConnectionTrait>(db_connection: &C) -> Result<Option<u64>> {
        let max: Option<Option<i64>> = TransactionSummary::find()
            .select_only()
            .column_as(
                Expr::col(transaction_summary::Column::BlockHeight).max(),
                "last_block_height",
            )
            .into_tuple()
            .one(db_connection)
            .await?;

        Ok(max.flatten().map(|height| height as u64))
    }

    pub async fn count_summaries<C: ConnectionTrait>(db_connection: &C) -> Result<u64> {
        TransactionSummary::find()
            .count(db_connection)
            .await
            .map_err(AppError::DatabaseError)
    }
}
