use sea_orm::{
    DbErr, DeriveIden, DeriveMigrationName,
    sea_query::{ColumnDef, Index, Table},
};
use sea_orm_migration::{MigrationTrait, SchemaManager, async_trait::async_trait};

#[derive(DeriveIden)]
pub enum TransactionSummaries {
    Table,
    TransactionId,
    SenderAddress,
    ModuleName,
    AssetName,
    Fee,
    BlockHeight,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransactionSummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionSummaries::TransactionId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionSummaries::SenderAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionSummaries::ModuleName)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionSummaries::AssetName)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionSummaries::Fee)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TransactionSummaries::BlockHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_summaries_block_height")
                    .table(TransactionSummaries::Table)
                    .col(TransactionSummaries::BlockHeight)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_summaries_sender")
                    .table(TransactionSummaries::Table)
                    .col(TransactionSummaries::SenderAddress)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionSummaries::Table).to_owned())
            .await
    }
}
