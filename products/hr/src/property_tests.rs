//! Property-based checks of the pipeline rules over random templates and
//! schedules.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use crate::{
    ActivityStatus, ApplicationStatus, OrderingPolicy, Pipeline, ScheduledActivity, Step,
};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid base timestamp")
}

fn any_activity_status() -> impl Strategy<Value = ActivityStatus> {
    prop::sample::select(ActivityStatus::ALL.to_vec())
}

fn any_application_status() -> impl Strategy<Value = ApplicationStatus> {
    prop::sample::select(ApplicationStatus::ALL.to_vec())
}

/// Per step: optional (status, minute offset from the base date).
fn any_pipeline() -> impl Strategy<Value = Pipeline> {
    (
        prop::collection::vec(
            prop::option::of((any_activity_status(), prop::option::of(0i64..10_000))),
            1..6,
        ),
        any_application_status(),
    )
        .prop_map(|(slots, application)| {
            let steps: Vec<Step> = (1..=slots.len() as i32)
                .map(|order| Step::new(Uuid::from_u128(order as u128), order * 10, format!("Step {order}")))
                .collect();
            let activities = steps
                .iter()
                .zip(slots)
                .filter_map(|(step, slot)| {
                    slot.map(|(status, minutes)| ScheduledActivity {
                        id: Uuid::from_u128(1_000 + step.order as u128),
                        step_id: step.id,
                        status,
                        scheduled_at: minutes.map(|m| base() + Duration::minutes(m)),
                    })
                })
                .collect();
            Pipeline::new(steps, activities, application).expect("generated pipeline is valid")
        })
}

fn pipeline_with_step() -> impl Strategy<Value = (Pipeline, usize)> {
    any_pipeline().prop_flat_map(|pipeline| {
        let len = pipeline.steps().len();
        (Just(pipeline), 0..len)
    })
}

fn scheduled_dates(pipeline: &Pipeline) -> Vec<(usize, DateTime<Utc>)> {
    pipeline
        .steps()
        .iter()
        .enumerate()
        .filter_map(|(i, step)| {
            pipeline
                .activity_for(step.id)
                .and_then(|a| a.scheduled_at)
                .map(|at| (i, at))
        })
        .collect()
}

proptest! {
    /// An accepted date is at or after every earlier nearest date plus the
    /// gap and no later than the nearest later date.
    #[test]
    fn accepted_dates_respect_neighbours(
        (pipeline, position) in pipeline_with_step(),
        minutes in 0i64..10_000,
    ) {
        let policy = OrderingPolicy::default();
        let step_id = pipeline.steps()[position].id;
        let proposed = base() + Duration::minutes(minutes);
        if pipeline.validate_schedule(step_id, Some(proposed), &policy).is_ok() {
            let dates = scheduled_dates(&pipeline);
            if let Some((_, before)) = dates.iter().rev().find(|(i, _)| *i < position) {
                prop_assert!(proposed >= *before + policy.min_gap);
            }
            if let Some((_, after)) = dates.iter().find(|(i, _)| *i > position) {
                prop_assert!(proposed <= *after);
            }
        }
    }

    /// Anything closer than the gap to the nearest earlier date is refused.
    #[test]
    fn gap_is_enforced(
        (pipeline, position) in pipeline_with_step(),
        seconds in 0i64..60,
    ) {
        let policy = OrderingPolicy::default();
        let dates = scheduled_dates(&pipeline);
        if let Some((_, before)) = dates.iter().rev().find(|(i, _)| *i < position) {
            let proposed = *before + Duration::seconds(seconds);
            let step_id = pipeline.steps()[position].id;
            prop_assert!(pipeline.validate_schedule(step_id, Some(proposed), &policy).is_err());
        }
    }

    /// Terminal activities never offer a transition.
    #[test]
    fn terminal_statuses_are_final(pipeline in any_pipeline()) {
        for step in pipeline.steps() {
            if let Some(activity) = pipeline.activity_for(step.id) {
                if activity.status.is_terminal() {
                    let gate = pipeline.gate_for(step.id).expect("activity exists");
                    prop_assert!(gate.allowed.is_empty());
                }
            }
        }
    }

    /// An open gate always requires a passed predecessor and a fully
    /// scheduled template.
    #[test]
    fn open_gates_imply_preconditions(pipeline in any_pipeline()) {
        for (i, step) in pipeline.steps().iter().enumerate() {
            let Ok(gate) = pipeline.gate_for(step.id) else { continue };
            if gate.allowed.is_empty() {
                continue;
            }
            prop_assert!(pipeline.is_fully_scheduled());
            if i > 0 {
                let previous = &pipeline.steps()[i - 1];
                prop_assert_eq!(
                    pipeline.activity_for(previous.id).map(|a| a.status),
                    Some(ActivityStatus::Passed)
                );
            }
        }
    }

    /// Accepted moves on one step never close another step's open gate.
    #[test]
    fn open_gates_survive_moves_elsewhere(pipeline in any_pipeline()) {
        for step in pipeline.steps() {
            let Ok(gate) = pipeline.gate_for(step.id) else { continue };
            if !gate.is_open() {
                continue;
            }
            for other in pipeline.steps().iter().filter(|other| other.id != step.id) {
                let Ok(other_gate) = pipeline.gate_for(other.id) else { continue };
                let targets = other_gate
                    .allowed
                    .iter()
                    .chain(other_gate.current.branches())
                    .copied()
                    .filter(|target| other_gate.accepts(*target));
                for target in targets {
                    let plan = pipeline.plan_transition(other.id, target, Some("Not a fit for the team"));
                    prop_assert!(plan.is_ok(), "{:?}", plan);
                    let Ok(plan) = plan else { continue };
                    let moved = pipeline
                        .activity_for(other.id)
                        .cloned()
                        .expect("gate implies an activity");
                    let mut after = pipeline.with_activity(ScheduledActivity {
                        status: target,
                        ..moved
                    });
                    if let Some(next) = plan.application_status {
                        after = after.with_application_status(next);
                    }
                    prop_assert_ne!(after.application_status(), ApplicationStatus::Withdrawn);
                    let reopened = after.gate_for(step.id).expect("activity exists");
                    prop_assert!(
                        reopened.is_open(),
                        "{} closed after {} moved to {}: {:?}",
                        step.name,
                        other.name,
                        target,
                        reopened.blocked_by
                    );
                }
            }
        }
    }

    /// Withdrawing the application empties every transition set.
    #[test]
    fn withdrawn_applications_are_frozen(pipeline in any_pipeline()) {
        let withdrawn = pipeline.with_application_status(ApplicationStatus::Withdrawn);
        for step in withdrawn.steps() {
            if let Ok(gate) = withdrawn.gate_for(step.id) {
                prop_assert!(gate.allowed.is_empty());
            }
        }
    }
}
