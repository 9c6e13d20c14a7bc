use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::pipeline::{Pipeline, Step};

pub const DEFAULT_MIN_GAP_SECONDS: i64 = 60;
/// One year; longer gaps are clamped.
pub const MAX_MIN_GAP_SECONDS: i64 = 366 * 24 * 60 * 60;

/// How far apart consecutive steps must be scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderingPolicy {
    pub min_gap: Duration,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self::with_min_gap_seconds(DEFAULT_MIN_GAP_SECONDS)
    }
}

impl OrderingPolicy {
    pub fn with_min_gap_seconds(seconds: i64) -> Self {
        Self {
            min_gap: Duration::seconds(seconds.clamp(0, MAX_MIN_GAP_SECONDS)),
        }
    }

    /// First acceptable date after `bound`; `None` when it is past the
    /// representable range.
    fn earliest_after(&self, bound: DateTime<Utc>) -> Option<DateTime<Utc>> {
        bound.checked_add_signed(self.min_gap)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingViolation {
    #[error("unknown process step {0}")]
    UnknownStep(Uuid),
    #[error(
        "must be after step {step_name} by at least {} (scheduled {})",
        describe_gap(.min_gap),
        .bound.to_rfc3339()
    )]
    TooEarly {
        step_name: String,
        step_order: i32,
        bound: DateTime<Utc>,
        min_gap: Duration,
    },
    #[error("must not be later than step {step_name} (scheduled {})", .bound.to_rfc3339())]
    TooLate {
        step_name: String,
        step_order: i32,
        bound: DateTime<Utc>,
    },
}

/// Human form of a gap: "1 minute", "90 seconds", "2 hours".
pub fn describe_gap(gap: &Duration) -> String {
    let seconds = gap.num_seconds();
    let (value, unit) = if seconds % 3600 == 0 && seconds >= 3600 {
        (seconds / 3600, "hour")
    } else if seconds % 60 == 0 && seconds >= 60 {
        (seconds / 60, "minute")
    } else {
        (seconds, "second")
    };
    if value == 1 {
        format!("1 {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

impl Pipeline {
    /// Checks a proposed date for `step_id` against the nearest scheduled
    /// neighbours on each side. A missing date is always acceptable.
    pub fn validate_schedule(
        &self,
        step_id: Uuid,
        proposed: Option<DateTime<Utc>>,
        policy: &OrderingPolicy,
    ) -> Result<(), OrderingViolation> {
        let position = self
            .position(step_id)
            .ok_or(OrderingViolation::UnknownStep(step_id))?;
        let Some(proposed) = proposed else {
            return Ok(());
        };
        if let Some((step, bound)) = self.scheduled_before(position) {
            if !policy.earliest_after(bound).is_some_and(|earliest| proposed >= earliest) {
                return Err(OrderingViolation::TooEarly {
                    step_name: step.name.clone(),
                    step_order: step.order,
                    bound,
                    min_gap: policy.min_gap,
                });
            }
        }
        if let Some((step, bound)) = self.scheduled_after(position) {
            if proposed > bound {
                return Err(OrderingViolation::TooLate {
                    step_name: step.name.clone(),
                    step_order: step.order,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Earliest and latest acceptable dates for `step_id`, if bounded.
    pub fn schedule_window(
        &self,
        step_id: Uuid,
        policy: &OrderingPolicy,
    ) -> Option<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let position = self.position(step_id)?;
        let earliest = self.scheduled_before(position).map(|(_, bound)| {
            policy
                .earliest_after(bound)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });
        let latest = self.scheduled_after(position).map(|(_, bound)| bound);
        Some((earliest, latest))
    }

    fn scheduled_before(&self, position: usize) -> Option<(&Step, DateTime<Utc>)> {
        self.steps()[..position]
            .iter()
            .rev()
            .find_map(|step| self.scheduled_date(step))
    }

    fn scheduled_after(&self, position: usize) -> Option<(&Step, DateTime<Utc>)> {
        self.steps()
            .get(position + 1..)?
            .iter()
            .find_map(|step| self.scheduled_date(step))
    }

    fn scheduled_date<'a>(&'a self, step: &'a Step) -> Option<(&'a Step, DateTime<Utc>)> {
        self.activity_for(step.id)
            .and_then(|activity| activity.scheduled_at)
            .map(|at| (step, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::*;
    use crate::status::{ActivityStatus, ApplicationStatus};

    #[test]
    fn same_instant_as_previous_step_is_rejected() {
        let pipeline = standard(
            vec![activity(1, ActivityStatus::Passed, Some(at(10, 9, 0)))],
            ApplicationStatus::Interviewing,
        );
        let policy = OrderingPolicy::default();
        let err = pipeline
            .validate_schedule(step_id(2), Some(at(10, 9, 0)), &policy)
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("must be after step Screening by at least 1 minute"),
            "{err}"
        );
        assert!(err.to_string().contains("2025-01-10T09:00:00+00:00"));
        assert!(
            pipeline
                .validate_schedule(step_id(2), Some(at(10, 9, 5)), &policy)
                .is_ok()
        );
    }

    #[test]
    fn exactly_one_gap_after_previous_is_accepted() {
        let pipeline = standard(
            vec![activity(1, ActivityStatus::Scheduled, Some(at(10, 9, 0)))],
            ApplicationStatus::Submitted,
        );
        assert!(
            pipeline
                .validate_schedule(step_id(2), Some(at(10, 9, 1)), &OrderingPolicy::default())
                .is_ok()
        );
    }

    #[test]
    fn later_steps_bound_from_above() {
        let pipeline = standard(
            vec![
                activity(1, ActivityStatus::Passed, Some(at(10, 9, 0))),
                activity(3, ActivityStatus::Scheduled, Some(at(12, 9, 0))),
            ],
            ApplicationStatus::Interviewing,
        );
        let policy = OrderingPolicy::default();
        let err = pipeline
            .validate_schedule(step_id(2), Some(at(12, 9, 1)), &policy)
            .unwrap_err();
        assert!(matches!(err, OrderingViolation::TooLate { step_order: 3, .. }));
        // Upper bound is inclusive.
        assert!(
            pipeline
                .validate_schedule(step_id(2), Some(at(12, 9, 0)), &policy)
                .is_ok()
        );
    }

    #[test]
    fn skips_neighbours_without_dates() {
        let pipeline = standard(
            vec![
                activity(1, ActivityStatus::Passed, Some(at(10, 9, 0))),
                activity(2, ActivityStatus::Scheduled, None),
            ],
            ApplicationStatus::Interviewing,
        );
        let err = pipeline
            .validate_schedule(step_id(3), Some(at(10, 8, 0)), &OrderingPolicy::default())
            .unwrap_err();
        assert!(matches!(err, OrderingViolation::TooEarly { step_order: 1, .. }));
    }

    #[test]
    fn unconstrained_steps_accept_anything() {
        let pipeline = standard(vec![], ApplicationStatus::Submitted);
        let policy = OrderingPolicy::default();
        assert!(pipeline.validate_schedule(step_id(1), Some(at(1, 0, 0)), &policy).is_ok());
        assert!(pipeline.validate_schedule(step_id(3), None, &policy).is_ok());
        assert_eq!(
            pipeline.validate_schedule(Uuid::nil(), None, &policy),
            Err(OrderingViolation::UnknownStep(Uuid::nil()))
        );
    }

    #[test]
    fn window_reports_both_bounds() {
        let pipeline = standard(
            vec![
                activity(1, ActivityStatus::Passed, Some(at(10, 9, 0))),
                activity(3, ActivityStatus::Scheduled, Some(at(12, 9, 0))),
            ],
            ApplicationStatus::Interviewing,
        );
        let window = pipeline.schedule_window(step_id(2), &OrderingPolicy::default());
        assert_eq!(window, Some((Some(at(10, 9, 1)), Some(at(12, 9, 0)))));
    }

    #[test]
    fn oversized_gaps_are_clamped() {
        let policy = OrderingPolicy::with_min_gap_seconds(i64::MAX / 100);
        assert_eq!(policy.min_gap.num_seconds(), MAX_MIN_GAP_SECONDS);
        let policy = OrderingPolicy::with_min_gap_seconds(-5);
        assert_eq!(policy.min_gap, Duration::zero());
    }

    #[test]
    fn bound_near_the_end_of_time_leaves_no_valid_date() {
        let last = DateTime::<Utc>::MAX_UTC;
        let pipeline = standard(
            vec![activity(1, ActivityStatus::Scheduled, Some(last - Duration::hours(1)))],
            ApplicationStatus::Interviewing,
        );
        let policy = OrderingPolicy::with_min_gap_seconds(MAX_MIN_GAP_SECONDS);
        let err = pipeline
            .validate_schedule(step_id(2), Some(last), &policy)
            .unwrap_err();
        assert!(matches!(err, OrderingViolation::TooEarly { step_order: 1, .. }), "{err}");

        let (earliest, latest) = pipeline.schedule_window(step_id(2), &policy).unwrap();
        assert_eq!(earliest, Some(last));
        assert_eq!(latest, None);
    }

    #[test]
    fn gap_descriptions() {
        assert_eq!(describe_gap(&Duration::seconds(60)), "1 minute");
        assert_eq!(describe_gap(&Duration::seconds(90)), "90 seconds");
        assert_eq!(describe_gap(&Duration::hours(2)), "2 hours");
        assert_eq!(describe_gap(&Duration::zero()), "0 seconds");
    }
}
