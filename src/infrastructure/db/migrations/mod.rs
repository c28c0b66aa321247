use sea_orm_migration::{MigrationTrait, MigratorTrait, async_trait::async_trait};

mod m20261014_000001_create_timelapse_tables;
mod m20261014_000002_create_canvas_activity;
mod m20261014_000003_create_transaction_summaries;

pub struct Migrator;

#[async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261014_000001_create_timelapse_tables::Migration),
            Box::new(m20261014_000002_create_canvas_activity::Migration),
            Box::new(m20261014_000003_create_transaction_summaries::Migration),
        ]
    }
}
