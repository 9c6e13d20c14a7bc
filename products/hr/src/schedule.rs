use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::effects::{self, TransitionPlan};
use crate::gate::{GateBlock, GateError};
use crate::ordering::{OrderingPolicy, OrderingViolation};
use crate::pipeline::{Pipeline, ScheduledActivity};
use crate::status::{ActivityStatus, ApplicationStatus};

/// A request to record a new activity on a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityDraft {
    pub step_id: Uuid,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: ActivityStatus,
    /// Caller acknowledged that `scheduled_at` lies in the past.
    pub confirm_past: bool,
}

/// What to persist for an accepted draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulePlan {
    pub status: ActivityStatus,
    pub application_status: Option<ApplicationStatus>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("the application is {0}; no further activities can be scheduled")]
    ApplicationClosed(ApplicationStatus),
    #[error("unknown process step {0}")]
    UnknownStep(Uuid),
    #[error("step {0} already has an activity")]
    DuplicateActivity(String),
    #[error("step {requested} cannot be scheduled before {}", .missing.join(", "))]
    OutOfOrder {
        requested: String,
        missing: Vec<String>,
    },
    #[error("step {step_name} ended as {status}; the pipeline is halted")]
    PipelineHalted {
        step_name: String,
        status: ActivityStatus,
    },
    #[error("a new activity must start as Scheduled or Completed, not {0}")]
    InvalidInitialStatus(ActivityStatus),
    #[error("the scheduled date is in the past; confirm to record it as completed")]
    PastDateUnconfirmed,
    #[error("step {0} has no activity yet")]
    NoActivity(String),
    #[error("the activity is {0} and can no longer be edited")]
    ActivityLocked(ActivityStatus),
    #[error(transparent)]
    Ordering(#[from] OrderingViolation),
    #[error(transparent)]
    Gate(#[from] GateError),
}

impl Pipeline {
    /// Validates a new activity for `draft.step_id`. Only the next schedulable
    /// step is accepted, and creating an activity that is already past
    /// Scheduled has to clear the gate.
    pub fn plan_schedule(
        &self,
        draft: &ActivityDraft,
        now: DateTime<Utc>,
        policy: &OrderingPolicy,
    ) -> Result<SchedulePlan, ScheduleError> {
        let application = self.application_status();
        if application.is_closed() {
            return Err(ScheduleError::ApplicationClosed(application));
        }
        let position = self
            .position(draft.step_id)
            .ok_or(ScheduleError::UnknownStep(draft.step_id))?;
        let step = &self.steps()[position];
        if self.activity_for(step.id).is_some() {
            return Err(ScheduleError::DuplicateActivity(step.name.clone()));
        }
        let missing: Vec<String> = self.steps()[..position]
            .iter()
            .filter(|earlier| self.activity_for(earlier.id).is_none())
            .map(|earlier| earlier.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ScheduleError::OutOfOrder {
                requested: step.name.clone(),
                missing,
            });
        }
        if self.predecessor_failed(position) {
            let previous = &self.steps()[position - 1];
            let status = self
                .activity_for(previous.id)
                .map(|a| a.status)
                .unwrap_or(ActivityStatus::Failed);
            return Err(ScheduleError::PipelineHalted {
                step_name: previous.name.clone(),
                status,
            });
        }
        if !matches!(
            draft.status,
            ActivityStatus::Scheduled | ActivityStatus::Completed
        ) {
            return Err(ScheduleError::InvalidInitialStatus(draft.status));
        }
        self.validate_schedule(step.id, draft.scheduled_at, policy)?;

        let created = self.with_activity(ScheduledActivity {
            id: Uuid::nil(),
            step_id: step.id,
            status: ActivityStatus::Scheduled,
            scheduled_at: draft.scheduled_at,
        });
        let in_past = draft.scheduled_at.is_some_and(|at| at < now);
        let status = match draft.status {
            ActivityStatus::Scheduled if in_past => {
                if !draft.confirm_past {
                    return Err(ScheduleError::PastDateUnconfirmed);
                }
                // Confirmed past dates are recorded as held when the gate allows it.
                if created
                    .gate_at(position, ActivityStatus::Scheduled)
                    .permits(ActivityStatus::Completed)
                {
                    ActivityStatus::Completed
                } else {
                    ActivityStatus::Scheduled
                }
            }
            ActivityStatus::Completed => {
                let gate = created.gate_at(position, ActivityStatus::Scheduled);
                if let Some(block) = gate.blocked_by {
                    return Err(GateError::Blocked(block).into());
                }
                ActivityStatus::Completed
            }
            other => other,
        };

        let first = effects::after_first_activity(self);
        let advanced = (status == ActivityStatus::Completed)
            .then(|| effects::after_transition(application, status, &created))
            .flatten();
        Ok(SchedulePlan {
            status,
            application_status: advanced.or(first),
        })
    }

    /// Validates moving the existing activity on `step_id` to a new date. A
    /// confirmed past date on a Scheduled activity also records it as held,
    /// returned as the transition to apply.
    pub fn plan_reschedule(
        &self,
        step_id: Uuid,
        scheduled_at: Option<DateTime<Utc>>,
        confirm_past: bool,
        now: DateTime<Utc>,
        policy: &OrderingPolicy,
    ) -> Result<Option<TransitionPlan>, ScheduleError> {
        let step = self.step(step_id).ok_or(ScheduleError::UnknownStep(step_id))?;
        let activity = self
            .activity_for(step_id)
            .ok_or_else(|| ScheduleError::NoActivity(step.name.clone()))?;
        if self.application_status() == ApplicationStatus::Withdrawn {
            return Err(GateError::Blocked(GateBlock::ApplicationWithdrawn).into());
        }
        if !matches!(
            activity.status,
            ActivityStatus::Scheduled | ActivityStatus::Completed
        ) {
            return Err(ScheduleError::ActivityLocked(activity.status));
        }
        self.validate_schedule(step_id, scheduled_at, policy)?;

        let in_past = scheduled_at.is_some_and(|at| at < now);
        if activity.status != ActivityStatus::Scheduled || !in_past {
            return Ok(None);
        }
        if !confirm_past {
            return Err(ScheduleError::PastDateUnconfirmed);
        }
        let moved = self.with_activity(ScheduledActivity {
            scheduled_at,
            ..activity.clone()
        });
        if !moved.gate_for(step_id)?.permits(ActivityStatus::Completed) {
            return Ok(None);
        }
        Ok(Some(moved.plan_transition(
            step_id,
            ActivityStatus::Completed,
            None,
        )?))
    }
}
