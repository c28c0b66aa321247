use sea_orm::{
    DbErr, DeriveIden, DeriveMigrationName,
    sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Index, Table},
};
use sea_orm_migration::{MigrationTrait, SchemaManager, async_trait::async_trait};

#[derive(DeriveIden)]
pub enum CanvasBlocks {
    Table,
    Id,
    CanvasId,
    BlockHeight,
}

#[derive(DeriveIden)]
pub enum CanvasAccounts {
    Table,
    Id,
    Address,
}

#[derive(DeriveIden)]
pub enum CanvasTransactions {
    Table,
    Id,
    AccountFk,
    BlockFk,
    BlockIndex,
    Coords,
    Colours,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CanvasBlocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CanvasBlocks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CanvasBlocks::CanvasId).big_integer().not_null())
                    .col(
                        ColumnDef::new(CanvasBlocks::BlockHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_canvas_blocks_canvas_height")
                    .table(CanvasBlocks::Table)
                    .col(CanvasBlocks::CanvasId)
                    .col(CanvasBlocks::BlockHeight)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CanvasAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CanvasAccounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CanvasAccounts::Address)
                            .string_len(42)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CanvasTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CanvasTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CanvasTransactions::AccountFk)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CanvasTransactions::BlockFk).integer().not_null())
                    .col(
                        ColumnDef::new(CanvasTransactions::BlockIndex)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CanvasTransactions::Coords).blob().not_null())
                    .col(ColumnDef::new(CanvasTransactions::Colours).blob().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_canvas_transactions_account")
                            .from(CanvasTransactions::Table, CanvasTransactions::AccountFk)
                            .to(CanvasAccounts::Table, CanvasAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_canvas_transactions_block")
                            .from(CanvasTransactions::Table, CanvasTransactions::BlockFk)
                            .to(CanvasBlocks::Table, CanvasBlocks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_canvas_transactions_position")
                    .table(CanvasTransactions::Table)
                    .col(CanvasTransactions::AccountFk)
                    .col(CanvasTransactions::BlockFk)
                    .col(CanvasTransactions::BlockIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CanvasTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CanvasAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CanvasBlocks::Table).to_owned())
            .await
    }
}
