use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use entity::apply_activity;
use products_hr::{ActivityStatus, ActivityType, ApplicationStatus, OrderingPolicy};
use uuid::Uuid;

use crate::service::pipeline::Snapshot;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "ActivityStatus")]
pub enum ActivityStatusValue {
    Scheduled,
    Completed,
    Passed,
    Failed,
    NoShow,
}

impl From<ActivityStatus> for ActivityStatusValue {
    fn from(value: ActivityStatus) -> Self {
        match value {
            ActivityStatus::Scheduled => Self::Scheduled,
            ActivityStatus::Completed => Self::Completed,
            ActivityStatus::Passed => Self::Passed,
            ActivityStatus::Failed => Self::Failed,
            ActivityStatus::NoShow => Self::NoShow,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "ActivityType")]
pub enum ActivityTypeValue {
    Online,
    Offline,
}

impl From<ActivityType> for ActivityTypeValue {
    fn from(value: ActivityType) -> Self {
        match value {
            ActivityType::Online => Self::Online,
            ActivityType::Offline => Self::Offline,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "ApplicationStatus")]
pub enum ApplicationStatusValue {
    Submitted,
    Interviewing,
    Hired,
    Rejected,
    Withdrawn,
}

impl From<ApplicationStatus> for ApplicationStatusValue {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::Submitted => Self::Submitted,
            ApplicationStatus::Interviewing => Self::Interviewing,
            ApplicationStatus::Hired => Self::Hired,
            ApplicationStatus::Rejected => Self::Rejected,
            ApplicationStatus::Withdrawn => Self::Withdrawn,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ActivityNode {
    pub id: Uuid,
    pub activity_type: ActivityTypeValue,
    pub status: ActivityStatusValue,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub version: i32,
}

impl From<&apply_activity::Model> for ActivityNode {
    fn from(model: &apply_activity::Model) -> Self {
        Self {
            id: model.id,
            activity_type: ActivityType::from(model.activity_type).into(),
            status: ActivityStatus::from(model.status).into(),
            scheduled_date: model.scheduled_date.map(|at| at.to_utc()),
            notes: model.notes.clone(),
            version: model.version,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PipelineStepNode {
    pub step_id: Uuid,
    pub step_order: i32,
    pub step_name: String,
    pub estimated_days: Option<i32>,
    pub activity: Option<ActivityNode>,
    /// Statuses the activity on this step may move to right now.
    pub allowed_statuses: Vec<ActivityStatusValue>,
    /// Why no transition is offered, when the gate is closed.
    pub gate_message: Option<String>,
    pub earliest_date: Option<DateTime<Utc>>,
    pub latest_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PipelineNode {
    pub apply_id: Uuid,
    pub job_request_id: Uuid,
    pub application_status: ApplicationStatusValue,
    pub next_schedulable_step_id: Option<Uuid>,
    pub steps: Vec<PipelineStepNode>,
}

impl PipelineNode {
    pub fn build(snapshot: &Snapshot, policy: &OrderingPolicy) -> Self {
        let pipeline = &snapshot.pipeline;
        let steps = snapshot
            .steps
            .iter()
            .map(|step| {
                let gate = pipeline.gate_for(step.id).ok();
                let (earliest_date, latest_date) = pipeline
                    .schedule_window(step.id, policy)
                    .unwrap_or((None, None));
                PipelineStepNode {
                    step_id: step.id,
                    step_order: step.step_order,
                    step_name: step.step_name.clone(),
                    estimated_days: step.estimated_days,
                    activity: snapshot.activity_on(step.id).map(ActivityNode::from),
                    allowed_statuses: gate
                        .as_ref()
                        .map(|gate| gate.allowed.iter().copied().map(Into::into).collect())
                        .unwrap_or_default(),
                    gate_message: gate
                        .and_then(|gate| gate.blocked_by)
                        .map(|block| block.to_string()),
                    earliest_date,
                    latest_date,
                }
            })
            .collect();
        Self {
            apply_id: snapshot.apply.id,
            job_request_id: snapshot.job_request.id,
            application_status: pipeline.application_status().into(),
            next_schedulable_step_id: pipeline.next_schedulable_step().map(|step| step.id),
            steps,
        }
    }
}

/// Outcome of checking a proposed date without saving it.
#[derive(Clone, Debug, SimpleObject)]
pub struct ScheduleCheck {
    pub ok: bool,
    pub code: Option<String>,
    pub message: Option<String>,
    pub earliest_date: Option<DateTime<Utc>>,
    pub latest_date: Option<DateTime<Utc>>,
}
