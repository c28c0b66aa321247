use sea_orm::{
    DbErr, DeriveIden, DeriveMigrationName,
    prelude::Expr,
    sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Index, Table},
};
use sea_orm_migration::{MigrationTrait, SchemaManager, async_trait::async_trait};

#[derive(DeriveIden)]
pub enum TimelapseSummaries {
    Table,
    Id,
    CanvasId,
    StartBlockHeight,
    EndBlockHeight,
    ChunkSize,
    Width,
    Height,
    ColourPalette,
    Label,
    Completed,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum TimelapseSnapshots {
    Table,
    Id,
    TimelapseSummaryFk,
    BlockHeight,
    Snapshot,
}

#[derive(DeriveIden)]
pub enum TimelapsePreviews {
    Table,
    Id,
    TimelapseSummaryFk,
    BlockHeight,
    Preview,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TimelapseSummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelapseSummaries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TimelapseSummaries::CanvasId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TimelapseSummaries::StartBlockHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TimelapseSummaries::EndBlockHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TimelapseSummaries::ChunkSize)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimelapseSummaries::Width).integer().not_null())
                    .col(ColumnDef::new(TimelapseSummaries::Height).integer().not_null())
                    .col(
                        ColumnDef::new(TimelapseSummaries::ColourPalette)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TimelapseSummaries::Label)
                            .string_len(64)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TimelapseSummaries::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TimelapseSummaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TimelapseSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelapseSnapshots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TimelapseSnapshots::TimelapseSummaryFk)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TimelapseSnapshots::BlockHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimelapseSnapshots::Snapshot).blob().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timelapse_snapshots_summary")
                            .from(
                                TimelapseSnapshots::Table,
                                TimelapseSnapshots::TimelapseSummaryFk,
                            )
                            .to(TimelapseSummaries::Table, TimelapseSummaries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_timelapse_snapshots_summary_height")
                    .table(TimelapseSnapshots::Table)
                    .col(TimelapseSnapshots::TimelapseSummaryFk)
                    .col(TimelapseSnapshots::BlockHeight)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TimelapsePreviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelapsePreviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TimelapsePreviews::TimelapseSummaryFk)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TimelapsePreviews::BlockHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimelapsePreviews::Preview).blob().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timelapse_previews_summary")
                            .from(
                                TimelapsePreviews::Table,
                                TimelapsePreviews::TimelapseSummaryFk,
                            )
                            .to(TimelapseSummaries::Table, TimelapseSummaries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_timelapse_previews_summary_height")
                    .table(TimelapsePreviews::Table)
                    .col(TimelapsePreviews::TimelapseSummaryFk)
                    .col(TimelapsePreviews::BlockHeight)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimelapsePreviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TimelapseSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TimelapseSummaries::Table).to_owned())
            .await
    }
}
