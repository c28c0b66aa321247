use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::{
    error::{AppError, Result},
    infrastructure::db::entities::{
        CanvasAccount, CanvasBlock, CanvasTransaction, canvas_account, canvas_block,
        canvas_transaction,
    },
};

/// Per-canvas draw history. Every insert is skipped when the row already exists.
pub struct ActivityRepository;

impl ActivityRepository {
    pub async fn get_or_create_block<C: ConnectionTrait>(
        db_connection: &C,
        canvas_id: u32,
        block_height: u64,
    ) -> Result<i32> {
        let existing = CanvasBlock::find()
            .filter(canvas_block::Column::CanvasId.eq(i64::from(canvas_id)))
            .filter(canvas_block::Column::BlockHeight.eq(block_height as i64))
            .one(db_connection)
            .await?;

        if let Some(block) = existing {
            return Ok(block.id);
        }

        let inserted = canvas_block::ActiveModel {
            canvas_id: Set(i64::from(canvas_id)),
            block_height: Set(block_height as i64),
            ..Default::default()
        }
        .insert(db_connection)
        .await?;

        Ok(inserted.id)
    }

    pub async fn get_or_create_account<C: ConnectionTrait>(
        db_connection: &C,
        address: &str,
    ) -> Result<i32> {
        let existing = CanvasAccount::find()
            .filter(canvas_account::Column::Address.eq(address))
            .one(db_connection)
            .await?;

        if let Some(account) = existing {
            return Ok(account.id);
        }

        let inserted = canvas_account::ActiveModel {
            address: Set(address.to_string()),
            ..Default::default()
        }
        .insert(db_connection)
        .await?;

        Ok(inserted.id)
    }

    pub async fn create_transaction<C: ConnectionTrait>(
        db_connection: &C,
        account_fk: i32,
        block_fk: i32,
        block_index: i32,
        coords: Vec<u8>,
        colours: Vec<u8>,
    ) -> Result<bool> {
        let existing = CanvasTransaction::find()
            .filter(canvas_transaction::Column::AccountFk.eq(account_fk))
            .filter(canvas_transaction::Column::BlockFk.eq(block_fk))
            .filter(canvas_transaction::Column::BlockIndex.eq(block_index))
            .one(db_connection)
            .await?;

        if existing.is_some() {
            return Ok(false);
        }

        canvas_transaction::ActiveModel {
            account_fk: Set(account_fk),
            block_fk: Set(block_fk),
            block_index: Set(block_index),
            coords: Set(coords),
            colours: Set(colours),
            ..Default::default()
        }
        .insert(db_connection)
        .await?;

        Ok(true)
    }

    pub async fn list_blocks_by_canvas<C: ConnectionTrait>(
        db_connection: &C,
        canvas_id: u32,
    ) -> Result<Vec<canvas_block::Model>> {
        CanvasBlock::find()
            .filter(canvas_block::Column::CanvasId.eq(i64::from(canvas_id)))
            .order_by_asc(canvas_block::Column::BlockHeight)
            .all(db_connection)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn list_transactions_by_block<C: ConnectionTrait>(
        db_connection: &C,
        block_fk: i32,
    ) -> Result<Vec<canvas_transaction::Model>> {
        CanvasTransaction::find()
            .filter(canvas_transaction::Column::BlockFk.eq(block_fk))
            .order_by_asc(canvas_transaction::Column::BlockIndex)
            .all(db_connection)
            .await
            .map_err(AppError::DatabaseError)
    }
}
