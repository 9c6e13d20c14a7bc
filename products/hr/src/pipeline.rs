use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::status::{ActivityStatus, ApplicationStatus};

/// One ordered stage of a process template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub id: Uuid,
    pub order: i32,
    pub name: String,
}

impl Step {
    pub fn new(id: Uuid, order: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            order,
            name: name.into(),
        }
    }
}

/// The part of an activity record the rules care about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledActivity {
    pub id: Uuid,
    pub step_id: Uuid,
    pub status: ActivityStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("step order {0} is used by more than one step")]
    DuplicateStepOrder(i32),
    #[error("step order must be positive, got {0}")]
    NonPositiveStepOrder(i32),
    #[error("activity {activity} references step {step} outside the template")]
    ForeignStep { activity: Uuid, step: Uuid },
    #[error("step {0} has more than one activity")]
    DuplicateActivity(Uuid),
}

/// Snapshot of one application's position in its hiring pipeline.
///
/// Steps are kept sorted by `order`; activities are keyed by step id.
#[derive(Clone, Debug)]
pub struct Pipeline {
    steps: Vec<Step>,
    activities: HashMap<Uuid, ScheduledActivity>,
    application: ApplicationStatus,
}

impl Pipeline {
    pub fn new(
        mut steps: Vec<Step>,
        activities: Vec<ScheduledActivity>,
        application: ApplicationStatus,
    ) -> Result<Self, PipelineError> {
        steps.sort_by_key(|step| step.order);
        if let Some(step) = steps.iter().find(|step| step.order <= 0) {
            return Err(PipelineError::NonPositiveStepOrder(step.order));
        }
        if let Some(pair) = steps.windows(2).find(|pair| pair[0].order == pair[1].order) {
            return Err(PipelineError::DuplicateStepOrder(pair[0].order));
        }
        let mut by_step = HashMap::with_capacity(activities.len());
        for activity in activities {
            if !steps.iter().any(|step| step.id == activity.step_id) {
                return Err(PipelineError::ForeignStep {
                    activity: activity.id,
                    step: activity.step_id,
                });
            }
            let step_id = activity.step_id;
            if by_step.insert(step_id, activity).is_some() {
                return Err(PipelineError::DuplicateActivity(step_id));
            }
        }
        Ok(Self {
            steps,
            activities: by_step,
            application,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn application_status(&self) -> ApplicationStatus {
        self.application
    }

    pub fn step(&self, step_id: Uuid) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    pub fn position(&self, step_id: Uuid) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    pub fn activity_for(&self, step_id: Uuid) -> Option<&ScheduledActivity> {
        self.activities.get(&step_id)
    }

    pub fn has_activities(&self) -> bool {
        !self.activities.is_empty()
    }

    pub fn unscheduled_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps
            .iter()
            .filter(|step| !self.activities.contains_key(&step.id))
    }

    pub fn is_fully_scheduled(&self) -> bool {
        self.unscheduled_steps().next().is_none()
    }

    /// True once every step of a non-empty template has a passed activity.
    pub fn all_passed(&self) -> bool {
        !self.steps.is_empty()
            && self.steps.iter().all(|step| {
                self.activity_for(step.id)
                    .is_some_and(|activity| activity.status == ActivityStatus::Passed)
            })
    }

    /// Lowest-order step that has no activity yet, while scheduling is open.
    pub fn next_schedulable_step(&self) -> Option<&Step> {
        if self.application.is_closed() {
            return None;
        }
        let position = self
            .steps
            .iter()
            .position(|step| !self.activities.contains_key(&step.id))?;
        if position > 0 && self.predecessor_failed(position) {
            return None;
        }
        Some(&self.steps[position])
    }

    /// Copy of this snapshot with `activity` recorded (replacing any activity
    /// on the same step).
    pub fn with_activity(&self, activity: ScheduledActivity) -> Pipeline {
        let mut next = self.clone();
        next.activities.insert(activity.step_id, activity);
        next
    }

    pub fn with_application_status(&self, status: ApplicationStatus) -> Pipeline {
        let mut next = self.clone();
        next.application = status;
        next
    }

    pub(crate) fn predecessor_failed(&self, position: usize) -> bool {
        position
            .checked_sub(1)
            .and_then(|prev| self.activity_for(self.steps[prev].id))
            .is_some_and(|activity| activity.status.is_failure())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    pub fn step_id(order: i32) -> Uuid {
        Uuid::from_u128(order as u128)
    }

    pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    /// "Standard Hiring": Screening, Tech Interview, Final Interview.
    pub fn standard_steps() -> Vec<Step> {
        vec![
            Step::new(step_id(1), 1, "Screening"),
            Step::new(step_id(2), 2, "Tech Interview"),
            Step::new(step_id(3), 3, "Final Interview"),
        ]
    }

    pub fn activity(
        order: i32,
        status: ActivityStatus,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> ScheduledActivity {
        ScheduledActivity {
            id: Uuid::from_u128(1000 + order as u128),
            step_id: step_id(order),
            status,
            scheduled_at,
        }
    }

    pub fn standard(activities: Vec<ScheduledActivity>, application: ApplicationStatus) -> Pipeline {
        Pipeline::new(standard_steps(), activities, application).expect("valid fixture pipeline")
    }
}
