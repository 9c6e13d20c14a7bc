use sea_orm_migration::prelude::*;

use crate::m20250110_000001_process_templates::{JobRequest, ProcessStep};

#[derive(DeriveIden)]
enum Apply {
    Table,
    Id,
    JobRequestId,
    CvId,
    SubmittedBy,
    Status,
    Note,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ApplyActivity {
    Table,
    Id,
    ApplyId,
    ProcessStepId,
    ActivityType,
    ScheduledDate,
    Status,
    Notes,
    Version,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ApplyActivityHistory {
    Table,
    Id,
    ActivityId,
    ApplyId,
    FromStatus,
    ToStatus,
    Note,
    ChangedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Apply::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Apply::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Apply::JobRequestId).uuid().not_null())
                    .col(ColumnDef::new(Apply::CvId).uuid())
                    .col(ColumnDef::new(Apply::SubmittedBy).string_len(256))
                    .col(
                        ColumnDef::new(Apply::Status)
                            .string_len(16)
                            .not_null()
                            .default("Submitted"),
                    )
                    .col(ColumnDef::new(Apply::Note).text())
                    .col(
                        ColumnDef::new(Apply::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Apply::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Apply::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_apply_job_request")
                            .from(Apply::Table, Apply::JobRequestId)
                            .to(JobRequest::Table, JobRequest::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_apply_job_request")
                    .table(Apply::Table)
                    .col(Apply::JobRequestId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApplyActivity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApplyActivity::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApplyActivity::ApplyId).uuid().not_null())
                    .col(
                        ColumnDef::new(ApplyActivity::ProcessStepId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApplyActivity::ActivityType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApplyActivity::ScheduledDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ApplyActivity::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApplyActivity::Notes).text())
                    .col(
                        ColumnDef::new(ApplyActivity::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(ApplyActivity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApplyActivity::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApplyActivity::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_apply_activity_apply")
                            .from(ApplyActivity::Table, ApplyActivity::ApplyId)
                            .to(Apply::Table, Apply::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_apply_activity_step")
                            .from(ApplyActivity::Table, ApplyActivity::ProcessStepId)
                            .to(ProcessStep::Table, ProcessStep::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_apply_activity_apply_step")
                    .table(ApplyActivity::Table)
                    .col(ApplyActivity::ApplyId)
                    .col(ApplyActivity::ProcessStepId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_apply_activity_scheduled")
                    .table(ApplyActivity::Table)
                    .col(ApplyActivity::ScheduledDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApplyActivityHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApplyActivityHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApplyActivityHistory::ActivityId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApplyActivityHistory::ApplyId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApplyActivityHistory::FromStatus).string_len(16))
                    .col(
                        ColumnDef::new(ApplyActivityHistory::ToStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApplyActivityHistory::Note).text())
                    .col(
                        ColumnDef::new(ApplyActivityHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_apply_activity_history_activity")
                            .from(ApplyActivityHistory::Table, ApplyActivityHistory::ActivityId)
                            .to(ApplyActivity::Table, ApplyActivity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_apply_activity_history_activity")
                    .table(ApplyActivityHistory::Table)
                    .col(ApplyActivityHistory::ActivityId)
                    .col(ApplyActivityHistory::ChangedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ApplyActivityHistory::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(ApplyActivity::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Apply::Table).if_exists().to_owned())
            .await
    }
}
