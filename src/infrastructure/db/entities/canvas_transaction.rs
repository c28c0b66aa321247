use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "canvas_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub account_fk: i32,

    #[sea_orm(indexed)]
    pub block_fk: i32,

    /// Position of the transaction inside its block.
    pub block_index: i32,

    pub coords: Vec<u8>,

    pub colours: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::canvas_account::Entity",
        from = "Column::AccountFk",
        to = "super::canvas_account::Column::Id"
    )]
    Account,

    #[sea_orm(
        belongs_to = "super::canvas_block::Entity",
        from = "Column::BlockFk",
        to = "super::canvas_block::Column::Id"
    )]
    Block,
}

impl Related<super::canvas_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::canvas_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
