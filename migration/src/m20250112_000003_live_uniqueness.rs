use sea_orm_migration::prelude::*;

// Partial indexes: soft-deleted rows keep their slot history without
// blocking a replacement. Postgres and SQLite share this syntax.
const UP_SQL: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_apply_activity_live_step \
     ON apply_activity (apply_id, process_step_id) WHERE deleted_at IS NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_process_step_live_order \
     ON process_step (template_id, step_order) WHERE deleted_at IS NULL",
];

const DOWN_SQL: &[&str] = &[
    "DROP INDEX IF EXISTS uq_process_step_live_order",
    "DROP INDEX IF EXISTS uq_apply_activity_live_step",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for sql in UP_SQL {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for sql in DOWN_SQL {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }
}
