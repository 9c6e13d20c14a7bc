//! HR vertical slice: recruitment pipeline rules.
//!
//! Everything in this crate is pure. A caller loads one application's
//! [`Pipeline`] (template steps, recorded activities, application status),
//! asks it whether a schedule or a status change is acceptable, and persists
//! whatever plan comes back. The same functions back the REST handlers and
//! the GraphQL read model so both surfaces enforce identical rules.

mod effects;
mod gate;
mod ordering;
mod pipeline;
mod schedule;
mod status;

#[cfg(test)]
mod property_tests;

pub use effects::TransitionPlan;
pub use gate::{FAILURE_REASONS, Gate, GateBlock, GateError};
pub use ordering::{
    DEFAULT_MIN_GAP_SECONDS, MAX_MIN_GAP_SECONDS, OrderingPolicy, OrderingViolation, describe_gap,
};
pub use pipeline::{Pipeline, PipelineError, ScheduledActivity, Step};
pub use schedule::{ActivityDraft, ScheduleError, SchedulePlan};
pub use status::{ActivityStatus, ActivityType, ApplicationStatus, UnknownVariant};
