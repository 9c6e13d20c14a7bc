use products_hr::{ActivityStatus, ActivityType, ScheduledActivity};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "apply_activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub apply_id: Uuid,
    #[sea_orm(indexed)]
    pub process_step_id: Uuid,
    pub activity_type: Kind,
    pub scheduled_date: Option<DateTimeWithTimeZone>,
    pub status: Status,
    pub notes: Option<String>,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::apply::Entity",
        from = "Column::ApplyId",
        to = "super::apply::Column::Id",
        on_delete = "Cascade"
    )]
    Apply,
    #[sea_orm(
        belongs_to = "super::process_step::Entity",
        from = "Column::ProcessStepId",
        to = "super::process_step::Column::Id"
    )]
    ProcessStep,
}

impl Related<super::apply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Apply.def()
    }
}

impl Related<super::process_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessStep.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Kind {
    #[sea_orm(string_value = "Online")]
    Online,
    #[sea_orm(string_value = "Offline")]
    Offline,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Status {
    #[sea_orm(string_value = "Scheduled")]
    Scheduled,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Passed")]
    Passed,
    #[sea_orm(string_value = "Failed")]
    Failed,
    #[sea_orm(string_value = "NoShow")]
    NoShow,
}

impl From<Status> for ActivityStatus {
    fn from(value: Status) -> Self {
        match value {
            Status::Scheduled => ActivityStatus::Scheduled,
            Status::Completed => ActivityStatus::Completed,
            Status::Passed => ActivityStatus::Passed,
            Status::Failed => ActivityStatus::Failed,
            Status::NoShow => ActivityStatus::NoShow,
        }
    }
}

impl From<ActivityStatus> for Status {
    fn from(value: ActivityStatus) -> Self {
        match value {
            ActivityStatus::Scheduled => Status::Scheduled,
            ActivityStatus::Completed => Status::Completed,
            ActivityStatus::Passed => Status::Passed,
            ActivityStatus::Failed => Status::Failed,
            ActivityStatus::NoShow => Status::NoShow,
        }
    }
}

impl From<Kind> for ActivityType {
    fn from(value: Kind) -> Self {
        match value {
            Kind::Online => ActivityType::Online,
            Kind::Offline => ActivityType::Offline,
        }
    }
}

impl From<ActivityType> for Kind {
    fn from(value: ActivityType) -> Self {
        match value {
            ActivityType::Online => Kind::Online,
            ActivityType::Offline => Kind::Offline,
        }
    }
}

impl From<&Model> for ScheduledActivity {
    fn from(value: &Model) -> Self {
        ScheduledActivity {
            id: value.id,
            step_id: value.process_step_id,
            status: value.status.into(),
            scheduled_at: value.scheduled_date.map(|at| at.to_utc()),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
