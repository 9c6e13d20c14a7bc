use products_hr::ApplicationStatus;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "apply")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub job_request_id: Uuid,
    pub cv_id: Option<Uuid>,
    pub submitted_by: Option<String>,
    pub status: Status,
    pub note: Option<String>,
    /// Bumped on every write; updates are conditional on the value read.
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_request::Entity",
        from = "Column::JobRequestId",
        to = "super::job_request::Column::Id"
    )]
    JobRequest,
    #[sea_orm(has_many = "super::apply_activity::Entity")]
    ApplyActivity,
}

impl Related<super::job_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobRequest.def()
    }
}

impl Related<super::apply_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApplyActivity.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Status {
    #[sea_orm(string_value = "Submitted")]
    Submitted,
    #[sea_orm(string_value = "Interviewing")]
    Interviewing,
    #[sea_orm(string_value = "Hired")]
    Hired,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    #[sea_orm(string_value = "Withdrawn")]
    Withdrawn,
}

impl From<Status> for ApplicationStatus {
    fn from(value: Status) -> Self {
        match value {
            Status::Submitted => ApplicationStatus::Submitted,
            Status::Interviewing => ApplicationStatus::Interviewing,
            Status::Hired => ApplicationStatus::Hired,
            Status::Rejected => ApplicationStatus::Rejected,
            Status::Withdrawn => ApplicationStatus::Withdrawn,
        }
    }
}

impl From<ApplicationStatus> for Status {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::Submitted => Status::Submitted,
            ApplicationStatus::Interviewing => Status::Interviewing,
            ApplicationStatus::Hired => Status::Hired,
            ApplicationStatus::Rejected => Status::Rejected,
            ApplicationStatus::Withdrawn => Status::Withdrawn,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
