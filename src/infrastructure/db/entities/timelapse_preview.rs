use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "timelapse_previews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub timelapse_summary_fk: i32,

    pub block_height: i64,

    /// PNG bytes.
    pub preview: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::timelapse_summary::Entity",
        from = "Column::TimelapseSummaryFk",
        to = "super::timelapse_summary::Column::Id"
    )]
    Summary,
}

impl Related<super::timelapse_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Summary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
