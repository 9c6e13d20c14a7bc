use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::effects::{self, TransitionPlan};
use crate::pipeline::{Pipeline, ScheduledActivity};
use crate::status::{ActivityStatus, ApplicationStatus};

/// Quick-pick reasons offered when an activity is marked as failed.
pub const FAILURE_REASONS: [&str; 6] = [
    "Did not meet the technical requirements",
    "Not enough relevant experience",
    "Communication skills below expectations",
    "Salary expectations out of range",
    "Not a fit for the team",
    "Candidate declined to continue",
];

/// Why the gate is closed for an activity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateBlock {
    ApplicationWithdrawn,
    Terminal(ActivityStatus),
    IncompleteSchedule {
        missing: Vec<String>,
    },
    PredecessorNotPassed {
        step_name: String,
        step_order: i32,
        status: Option<ActivityStatus>,
    },
}

impl fmt::Display for GateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateBlock::ApplicationWithdrawn => f.write_str("the application has been withdrawn"),
            GateBlock::Terminal(status) => write!(f, "the activity is already {status}"),
            GateBlock::IncompleteSchedule { missing } => write!(
                f,
                "every step must be scheduled first (missing: {})",
                missing.join(", ")
            ),
            GateBlock::PredecessorNotPassed {
                step_name, status, ..
            } => match status {
                Some(status) => write!(f, "step {step_name} has not passed yet (currently {status})"),
                None => write!(f, "step {step_name} has not passed yet (no activity)"),
            },
        }
    }
}

/// Transitions currently offered for one activity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate {
    pub current: ActivityStatus,
    /// Offered next statuses. Branches such as NoShow are accepted on
    /// request but never offered.
    pub allowed: Vec<ActivityStatus>,
    pub blocked_by: Option<GateBlock>,
}

impl Gate {
    pub fn is_open(&self) -> bool {
        self.blocked_by.is_none()
    }

    pub fn permits(&self, target: ActivityStatus) -> bool {
        self.allowed.contains(&target)
    }

    /// Whether an explicit request for `target` goes through.
    pub fn accepts(&self, target: ActivityStatus) -> bool {
        self.permits(target) || (self.is_open() && self.current.branches().contains(&target))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("unknown process step {0}")]
    UnknownStep(Uuid),
    #[error("step {0} has no activity yet")]
    NoActivity(String),
    #[error("{0}")]
    Blocked(GateBlock),
    #[error("cannot move an activity from {from} to {to}")]
    IllegalTransition {
        from: ActivityStatus,
        to: ActivityStatus,
    },
    #[error("a reason is required to mark an activity as {0}")]
    ReasonRequired(ActivityStatus),
}

impl Pipeline {
    /// Gate for the activity recorded on `step_id`.
    pub fn gate_for(&self, step_id: Uuid) -> Result<Gate, GateError> {
        let position = self
            .position(step_id)
            .ok_or(GateError::UnknownStep(step_id))?;
        let activity = self
            .activity_for(step_id)
            .ok_or_else(|| GateError::NoActivity(self.steps()[position].name.clone()))?;
        Ok(self.gate_at(position, activity.status))
    }

    pub(crate) fn gate_at(&self, position: usize, current: ActivityStatus) -> Gate {
        let blocked_by = self.gate_block(position, current);
        let allowed = if blocked_by.is_none() {
            current.successors().to_vec()
        } else {
            Vec::new()
        };
        Gate {
            current,
            allowed,
            blocked_by,
        }
    }

    fn gate_block(&self, position: usize, current: ActivityStatus) -> Option<GateBlock> {
        if self.application_status() == ApplicationStatus::Withdrawn {
            return Some(GateBlock::ApplicationWithdrawn);
        }
        if current.is_terminal() {
            return Some(GateBlock::Terminal(current));
        }
        let missing: Vec<String> = self.unscheduled_steps().map(|s| s.name.clone()).collect();
        if !missing.is_empty() {
            return Some(GateBlock::IncompleteSchedule { missing });
        }
        let previous = &self.steps()[position.checked_sub(1)?];
        let status = self.activity_for(previous.id).map(|a| a.status);
        if status != Some(ActivityStatus::Passed) {
            return Some(GateBlock::PredecessorNotPassed {
                step_name: previous.name.clone(),
                step_order: previous.order,
                status,
            });
        }
        None
    }

    /// Validates moving the activity on `step_id` to `target` and works out
    /// what happens to the application as a consequence.
    pub fn plan_transition(
        &self,
        step_id: Uuid,
        target: ActivityStatus,
        note: Option<&str>,
    ) -> Result<TransitionPlan, GateError> {
        let gate = self.gate_for(step_id)?;
        if let Some(block) = gate.blocked_by {
            return Err(GateError::Blocked(block));
        }
        if !gate.accepts(target) {
            return Err(GateError::IllegalTransition {
                from: gate.current,
                to: target,
            });
        }
        if target == ActivityStatus::Failed && !note.is_some_and(|n| !n.trim().is_empty()) {
            return Err(GateError::ReasonRequired(target));
        }
        let current = self
            .activity_for(step_id)
            .cloned()
            .ok_or(GateError::UnknownStep(step_id))?;
        let after = self.with_activity(ScheduledActivity {
            status: target,
            ..current
        });
        Ok(TransitionPlan {
            activity_status: target,
            application_status: effects::after_transition(self.application_status(), target, &after),
        })
    }
}
