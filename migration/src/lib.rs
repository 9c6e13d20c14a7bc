pub use sea_orm_migration::prelude::*;

mod m20250110_000001_process_templates;
mod m20250110_000002_applications;
mod m20250112_000003_live_uniqueness;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250110_000001_process_templates::Migration),
            Box::new(m20250110_000002_applications::Migration),
            Box::new(m20250112_000003_live_uniqueness::Migration),
        ]
    }
}
