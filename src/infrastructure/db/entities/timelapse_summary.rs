use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "timelapse_summaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, indexed)]
    pub canvas_id: i64,

    pub start_block_height: i64,

    pub end_block_height: i64,

    pub chunk_size: i64,

    pub width: i32,

    pub height: i32,

    pub colour_palette: Vec<u8>,

    pub label: String,

    pub completed: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::timelapse_snapshot::Entity")]
    Snapshots,

    #[sea_orm(has_many = "super::timelapse_preview::Entity")]
    Previews,
}

impl Related<super::timelapse_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Snapshots.def()
    }
}

impl Related<super::timelapse_preview::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Previews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
