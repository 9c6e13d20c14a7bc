use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub(crate) enum ProcessTemplate {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum ProcessStep {
    Table,
    Id,
    TemplateId,
    StepOrder,
    StepName,
    Description,
    EstimatedDays,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
pub(crate) enum JobRequest {
    Table,
    Id,
    Title,
    ProcessTemplateId,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProcessTemplate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessTemplate::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProcessTemplate::Name)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProcessTemplate::Description).text())
                    .col(
                        ColumnDef::new(ProcessTemplate::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProcessTemplate::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProcessStep::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessStep::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProcessStep::TemplateId).uuid().not_null())
                    .col(ColumnDef::new(ProcessStep::StepOrder).integer().not_null())
                    .col(
                        ColumnDef::new(ProcessStep::StepName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProcessStep::Description).text())
                    .col(ColumnDef::new(ProcessStep::EstimatedDays).integer())
                    .col(
                        ColumnDef::new(ProcessStep::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProcessStep::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_process_step_template")
                            .from(ProcessStep::Table, ProcessStep::TemplateId)
                            .to(ProcessTemplate::Table, ProcessTemplate::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Uniqueness of step_order only holds among live steps, which the
        // service checks; this index just serves the ordered lookups.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_process_step_template_order")
                    .table(ProcessStep::Table)
                    .col(ProcessStep::TemplateId)
                    .col(ProcessStep::StepOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobRequest::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobRequest::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(JobRequest::ProcessTemplateId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_request_template")
                            .from(JobRequest::Table, JobRequest::ProcessTemplateId)
                            .to(ProcessTemplate::Table, ProcessTemplate::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_request_template")
                    .table(JobRequest::Table)
                    .col(JobRequest::ProcessTemplateId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobRequest::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProcessStep::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ProcessTemplate::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
