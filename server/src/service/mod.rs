//! Persistence services. Each mutation runs in one transaction: load the
//! application's pipeline snapshot, ask the rule crate for a plan, write it.

pub mod activities;
pub mod applies;
pub mod catalog;
pub mod pipeline;

use chrono::{DateTime, Utc};
use platform_api::ApiError;
use products_hr::{GateError, OrderingViolation, ScheduleError};
use sea_orm::{DbErr, SqlErr, prelude::DateTimeWithTimeZone};

/// Unique-index violations mean a concurrent writer claimed the same live
/// slot first; anything else is internal.
pub(crate) fn db_error(err: DbErr) -> ApiError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        tracing::warn!(%detail, "unique constraint rejected write");
        return ApiError::Conflict(
            "a conflicting record was written concurrently; reload and retry".into(),
        );
    }
    ApiError::internal(anyhow::Error::new(err).context("database error"))
}

pub(crate) fn ordering_error(err: OrderingViolation) -> ApiError {
    let code = match err {
        OrderingViolation::UnknownStep(_) => "STEP_NOT_IN_TEMPLATE",
        OrderingViolation::TooEarly { .. } | OrderingViolation::TooLate { .. } => {
            "ORDERING_VIOLATION"
        }
    };
    ApiError::validation(code, err.to_string())
}

pub(crate) fn gate_error(err: GateError) -> ApiError {
    let code = match err {
        GateError::UnknownStep(_) => "STEP_NOT_IN_TEMPLATE",
        GateError::NoActivity(_) => "NO_ACTIVITY",
        GateError::Blocked(_) => "GATE_CLOSED",
        GateError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
        GateError::ReasonRequired(_) => "REASON_REQUIRED",
    };
    ApiError::validation(code, err.to_string())
}

pub(crate) fn schedule_error(err: ScheduleError) -> ApiError {
    let code = match err {
        ScheduleError::Ordering(inner) => return ordering_error(inner),
        ScheduleError::Gate(inner) => return gate_error(inner),
        ScheduleError::ApplicationClosed(_) => "APPLICATION_CLOSED",
        ScheduleError::UnknownStep(_) => "STEP_NOT_IN_TEMPLATE",
        ScheduleError::DuplicateActivity(_) => "DUPLICATE_ACTIVITY",
        ScheduleError::OutOfOrder { .. } => "OUT_OF_ORDER",
        ScheduleError::PipelineHalted { .. } => "PIPELINE_HALTED",
        ScheduleError::InvalidInitialStatus(_) => "INVALID_INITIAL_STATUS",
        ScheduleError::PastDateUnconfirmed => "PAST_DATE_UNCONFIRMED",
        ScheduleError::NoActivity(_) => "NO_ACTIVITY",
        ScheduleError::ActivityLocked(_) => "ACTIVITY_LOCKED",
    };
    ApiError::validation(code, err.to_string())
}

/// Refuses the write when the caller saw a different version.
pub(crate) fn check_version(
    what: &'static str,
    expected: Option<i32>,
    actual: i32,
) -> Result<(), ApiError> {
    match expected {
        Some(expected) if expected != actual => Err(ApiError::Conflict(format!(
            "{what} was modified concurrently (expected version {expected}, found {actual})"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn stale(what: &'static str) -> ApiError {
    ApiError::Conflict(format!("{what} was modified concurrently; reload and retry"))
}

pub(crate) fn to_db_time(at: DateTime<Utc>) -> DateTimeWithTimeZone {
    at.fixed_offset()
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use products_hr::GateBlock;

    #[test]
    fn rule_errors_map_to_validation_codes() {
        let err = schedule_error(ScheduleError::PastDateUnconfirmed);
        assert_eq!(err.code(), "PAST_DATE_UNCONFIRMED");
        assert_eq!(err.status_code(), 422);

        let nested = schedule_error(ScheduleError::Gate(GateError::Blocked(
            GateBlock::ApplicationWithdrawn,
        )));
        assert_eq!(nested.code(), "GATE_CLOSED");
        assert_eq!(nested.to_string(), "the application has been withdrawn");
    }

    #[test]
    fn version_mismatch_is_a_conflict() {
        assert!(check_version("activity", None, 3).is_ok());
        assert!(check_version("activity", Some(3), 3).is_ok());
        let err = check_version("activity", Some(2), 3).unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn second_live_activity_for_a_step_is_a_conflict() {
        use entity::apply_activity;
        use migration::{Migrator, MigratorTrait};
        use platform_db::{DatabaseSettings, connect};
        use sea_orm::{ActiveModelTrait, ActiveValue::Set};
        use uuid::Uuid;

        let pool = connect(&DatabaseSettings::with_url("sqlite::memory:"))
            .await
            .unwrap();
        Migrator::up(&pool, None).await.unwrap();
        let seeded = crate::seed::seed_hiring(&pool).await.unwrap();
        let now = to_db_time(Utc::now());
        let row = |deleted: bool| apply_activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            apply_id: Set(seeded.apply_id),
            process_step_id: Set(seeded.step_ids[1]),
            activity_type: Set(apply_activity::Kind::Online),
            scheduled_date: Set(Some(now)),
            status: Set(apply_activity::Status::Scheduled),
            notes: Set(None),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(deleted.then_some(now)),
        };

        row(true).insert(&pool).await.unwrap();
        row(false).insert(&pool).await.unwrap();
        let err = db_error(row(false).insert(&pool).await.unwrap_err());
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(err.status_code(), 409);
    }
}
