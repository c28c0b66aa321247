use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, prelude::Expr,
};

use crate::{
    error::{AppError, Result},
    infrastructure::db::entities::{
        TimelapsePreview, TimelapseSnapshot, TimelapseSummary, timelapse_preview,
        timelapse_snapshot, timelapse_summary,
    },
};

#[derive(Debug, Clone)]
pub struct NewTimelapseSummary {
    pub canvas_id: u32,
    pub start_block_height: u64,
    pub end_block_height: u64,
    pub chunk_size: u64,
    pub width: u32,
    pub height: u32,
    pub colour_palette: Vec<u8>,
    pub label: String,
}

pub struct TimelapseRepository;

impl TimelapseRepository {
    pub async fn find_summary_by_canvas<C: ConnectionTrait>(
        db_connection: &C,
        canvas_id: u32,
    ) -> Result<Option<timelapse_summary::Model>> {
        TimelapseSummary::find()
            .filter(timelapse_summary::Column::CanvasId.eq(i64::from(canvas_id)))
            .one(db_connection)
            .await
            .map_err(AppError::DatabaseError)
    }

    /// Existing summaries are returned unchanged.
    pub async fn get_or_create_summary<C: ConnectionTrait>(
        db_connection: &C,
        summary: NewTimelapseSummary,
    ) -> Result<timelapse_summary::Model> {
        if let Some(existing) = Self::find_summary_by_canvas(db_connection, summary.canvas_id).await?
        {
            return Ok(existing);
        }

        timelapse_summary::ActiveModel {
            canvas_id: Set(i64::from(summary.canvas_id)),
            start_block_height: Set(summary.start_block_height as i64),
            end_block_height: Set(summary.end_block_height as i64),
            chunk_size: Set(summary.chunk_size as i64),
            width: Set(summary.width as i32),
            height: Set(summary.height as i32),
            colour_palette: Set(summary.colour_palette),
            label: Set(summary.label),
            completed: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db_connection)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn mark_completed<C: ConnectionTrait>(db_connection: &C, canvas_id: u32) -> Result<()> {
        TimelapseSummary::update_many()
            .col_expr(timelapse_summary::Column::Completed, Expr::value(true))
            .filter(timelapse_summary::Column::CanvasId.eq(i64::from(canvas_id)))
            .exec(db_connection)
            .await?;

        Ok(())
    }

    /// Returns `false` when a snapshot for that height already exists.
    pub async fn create_snapshot<C: ConnectionTrait>(
        db_connection: &C,
        summary_id: i32,
        block_height: u64,
        snapshot: Vec<u8>,
    ) -> Result<bool> {
        let existing = TimelapseSnapshot::find()
            .filter(timelapse_snapshot::Column::TimelapseSummaryFk.eq(summary_id))
            .filter(timelapse_snapshot::Column::BlockHeight.eq(block_height as i64))
            .one(db_connection)
            .await?;

        if existing.is_some() {
            return Ok(false);
        }

        timelapse_snapshot::ActiveModel {
            timelapse_summary_fk: Set(summary_id),
            block_height: Set(block_height as i64),
            snapshot: Set(snapshot),
            ..Default::default()
        }
        .insert(db_connection)
        .await?;

        Ok(true)
    }

    pub async fn create_preview<C: ConnectionTrait>(
        db_connection: &C,
        summary_id: i32,
        block_height: u64,
        preview: Vec<u8>,
    ) -> Result<()> {
        timelapse_preview::ActiveModel {
            timelapse_summary_fk: Set(summary_id),
            block_height: Set(block_height as i64),
            preview: Set(preview),
            ..Default::default()
        }
        .insert(db_connection)
        .await?;

        Ok(())
    }

    pub async fn list_snapshots<C: ConnectionTrait>(
        db_connection: &C,
        summary_id: i32,
    ) -> Result<Vec<timelapse_snapshot::Model>> {
        TimelapseSnapshot::find()
            .filter(timelapse_snapshot::Column::TimelapseSummaryFk.eq(summary_id))
            .order_by_asc(timelapse_snapshot::Column::BlockHeight)
            .all(db_connection)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn list_previews<C: ConnectionTrait>(
        db_connection: &C,
        summary_id: i32,
    ) -> Result<Vec<timelapse_preview::Model>> {
        TimelapsePreview::find()
            .filter(timelapse_preview::Column::TimelapseSummaryFk.eq(summary_id))
            .order_by_asc(timelapse_preview::Column::BlockHeight)
            .all(db_connection)
            .await
            .map_err(AppError::DatabaseError)
    }
}
