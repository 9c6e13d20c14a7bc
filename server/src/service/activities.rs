use chrono::{DateTime, Utc};
use entity::{apply, apply_activity, apply_activity_history};
use platform_api::{ApiError, ApiResult};
use products_hr::{
    ActivityDraft, ActivityStatus, ActivityType, ApplicationStatus, OrderingPolicy, ScheduleError,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::{
    check_version, db_error, gate_error, non_blank, pipeline, schedule_error, stale, to_db_time,
};

#[derive(Clone, Debug)]
pub struct NewActivity {
    pub apply_id: Uuid,
    pub process_step_id: Uuid,
    pub activity_type: ActivityType,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub status: ActivityStatus,
    pub notes: Option<String>,
    pub confirm_past: bool,
}

/// Full replacement of the editable fields of an activity.
#[derive(Clone, Debug)]
pub struct ActivityEdit {
    pub activity_type: ActivityType,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub confirm_past: bool,
    pub expected_version: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct StatusChange {
    pub status: ActivityStatus,
    pub notes: Option<String>,
    pub expected_version: Option<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct ActivityFilter {
    pub apply_id: Option<Uuid>,
    pub process_step_id: Option<Uuid>,
    pub activity_type: Option<ActivityType>,
    pub status: Option<ActivityStatus>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
    pub exclude_deleted: bool,
}

pub async fn list(
    db: &DatabaseConnection,
    filter: ActivityFilter,
) -> ApiResult<Vec<apply_activity::Model>> {
    let mut query = apply_activity::Entity::find();
    if let Some(apply_id) = filter.apply_id {
        query = query.filter(apply_activity::Column::ApplyId.eq(apply_id));
    }
    if let Some(step_id) = filter.process_step_id {
        query = query.filter(apply_activity::Column::ProcessStepId.eq(step_id));
    }
    if let Some(kind) = filter.activity_type {
        query = query.filter(apply_activity::Column::ActivityType.eq(apply_activity::Kind::from(kind)));
    }
    if let Some(status) = filter.status {
        query = query.filter(apply_activity::Column::Status.eq(apply_activity::Status::from(status)));
    }
    if let Some(from) = filter.scheduled_from {
        query = query.filter(apply_activity::Column::ScheduledDate.gte(to_db_time(from)));
    }
    if let Some(to) = filter.scheduled_to {
        query = query.filter(apply_activity::Column::ScheduledDate.lte(to_db_time(to)));
    }
    if filter.exclude_deleted {
        query = query.filter(apply_activity::Column::DeletedAt.is_null());
    }
    query
        .order_by_asc(apply_activity::Column::ScheduledDate)
        .order_by_asc(apply_activity::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_error)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> ApiResult<apply_activity::Model> {
    find_live(db, id).await
}

/// Records a new activity on the next schedulable step.
pub async fn create(
    db: &DatabaseConnection,
    input: NewActivity,
    policy: &OrderingPolicy,
) -> ApiResult<apply_activity::Model> {
    let span = info_span!(
        "hiring.activities.create",
        apply_id = %input.apply_id,
        step_id = %input.process_step_id,
        status = input.status.as_str()
    );
    async move {
        let now = Utc::now();
        let txn = db.begin().await.map_err(db_error)?;
        let snapshot = pipeline::load(&txn, input.apply_id).await?;
        let draft = ActivityDraft {
            step_id: input.process_step_id,
            scheduled_at: input.scheduled_date,
            status: input.status,
            confirm_past: input.confirm_past,
        };
        let plan = snapshot
            .pipeline
            .plan_schedule(&draft, now, policy)
            .map_err(schedule_error)?;

        let notes = non_blank(input.notes);
        let model = apply_activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            apply_id: Set(input.apply_id),
            process_step_id: Set(input.process_step_id),
            activity_type: Set(input.activity_type.into()),
            scheduled_date: Set(input.scheduled_date.map(to_db_time)),
            status: Set(plan.status.into()),
            notes: Set(notes.clone()),
            version: Set(1),
            created_at: Set(to_db_time(now)),
            updated_at: Set(to_db_time(now)),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        record_history(&txn, &model, None, plan.status, notes, now).await?;
        if let Some(next) = plan.application_status {
            advance_application(&txn, &snapshot.apply, next, now).await?;
        }
        txn.commit().await.map_err(db_error)?;
        info!(activity_id = %model.id, status = plan.status.as_str(), "activity created");
        Ok(model)
    }
    .instrument(span)
    .await
}

/// Replaces type, date and notes. Date changes re-run the ordering rules;
/// activities with a final outcome are locked.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    edit: ActivityEdit,
    policy: &OrderingPolicy,
) -> ApiResult<apply_activity::Model> {
    let span = info_span!("hiring.activities.update", activity_id = %id);
    async move {
        let now = Utc::now();
        let txn = db.begin().await.map_err(db_error)?;
        let existing = find_live(&txn, id).await?;
        check_version("activity", edit.expected_version, existing.version)?;
        // A decided outcome keeps its record, including the failure reason.
        let current: ActivityStatus = existing.status.into();
        if current.is_terminal() {
            return Err(schedule_error(ScheduleError::ActivityLocked(current)));
        }
        let snapshot = pipeline::load(&txn, existing.apply_id).await?;

        let current_date = existing.scheduled_date.map(|at| at.to_utc());
        let promotion = if current_date != edit.scheduled_date {
            snapshot
                .pipeline
                .plan_reschedule(
                    existing.process_step_id,
                    edit.scheduled_date,
                    edit.confirm_past,
                    now,
                    policy,
                )
                .map_err(schedule_error)?
        } else {
            None
        };

        let mut changes = apply_activity::ActiveModel {
            activity_type: Set(edit.activity_type.into()),
            scheduled_date: Set(edit.scheduled_date.map(to_db_time)),
            notes: Set(non_blank(edit.notes)),
            ..Default::default()
        };
        if let Some(plan) = promotion {
            changes.status = Set(plan.activity_status.into());
        }
        let updated = write_activity(&txn, &existing, changes, now).await?;

        if let Some(plan) = promotion {
            record_history(
                &txn,
                &updated,
                Some(existing.status.into()),
                plan.activity_status,
                None,
                now,
            )
            .await?;
            if let Some(next) = plan.application_status {
                advance_application(&txn, &snapshot.apply, next, now).await?;
            }
        }
        txn.commit().await.map_err(db_error)?;
        Ok(updated)
    }
    .instrument(span)
    .await
}

/// Moves an activity through the status gate and applies the consequences
/// to its application.
pub async fn change_status(
    db: &DatabaseConnection,
    id: Uuid,
    change: StatusChange,
) -> ApiResult<apply_activity::Model> {
    let span = info_span!(
        "hiring.activities.status",
        activity_id = %id,
        to = change.status.as_str()
    );
    async move {
        let now = Utc::now();
        let txn = db.begin().await.map_err(db_error)?;
        let existing = find_live(&txn, id).await?;
        check_version("activity", change.expected_version, existing.version)?;

        let current: ActivityStatus = existing.status.into();
        if current == change.status {
            txn.commit().await.map_err(db_error)?;
            return Ok(existing);
        }

        let snapshot = pipeline::load(&txn, existing.apply_id).await?;
        let notes = non_blank(change.notes);
        let plan = snapshot
            .pipeline
            .plan_transition(existing.process_step_id, change.status, notes.as_deref())
            .map_err(gate_error)?;

        let mut changes = apply_activity::ActiveModel {
            status: Set(plan.activity_status.into()),
            ..Default::default()
        };
        if notes.is_some() {
            changes.notes = Set(notes.clone());
        }
        let updated = write_activity(&txn, &existing, changes, now).await?;
        record_history(&txn, &updated, Some(current), plan.activity_status, notes, now).await?;
        if let Some(next) = plan.application_status {
            advance_application(&txn, &snapshot.apply, next, now).await?;
        }
        txn.commit().await.map_err(db_error)?;
        info!(from = current.as_str(), "activity status changed");
        Ok(updated)
    }
    .instrument(span)
    .await
}

/// Soft-deletes an activity; its step becomes schedulable again.
pub async fn delete(db: &DatabaseConnection, id: Uuid, expected_version: Option<i32>) -> ApiResult<()> {
    let now = Utc::now();
    let txn = db.begin().await.map_err(db_error)?;
    let existing = find_live(&txn, id).await?;
    check_version("activity", expected_version, existing.version)?;
    let changes = apply_activity::ActiveModel {
        deleted_at: Set(Some(to_db_time(now))),
        ..Default::default()
    };
    write_activity(&txn, &existing, changes, now).await?;
    txn.commit().await.map_err(db_error)?;
    info!(activity_id = %id, "activity deleted");
    Ok(())
}

async fn find_live<C: ConnectionTrait>(conn: &C, id: Uuid) -> ApiResult<apply_activity::Model> {
    apply_activity::Entity::find_by_id(id)
        .filter(apply_activity::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("activity"))
}

/// Conditional update on the version read earlier; a lost race is a conflict.
async fn write_activity<C: ConnectionTrait>(
    conn: &C,
    existing: &apply_activity::Model,
    mut changes: apply_activity::ActiveModel,
    now: DateTime<Utc>,
) -> ApiResult<apply_activity::Model> {
    changes.version = Set(existing.version + 1);
    changes.updated_at = Set(to_db_time(now));
    let result = apply_activity::Entity::update_many()
        .set(changes)
        .filter(apply_activity::Column::Id.eq(existing.id))
        .filter(apply_activity::Column::Version.eq(existing.version))
        .exec(conn)
        .await
        .map_err(db_error)?;
    if result.rows_affected == 0 {
        return Err(stale("activity"));
    }
    apply_activity::Entity::find_by_id(existing.id)
        .one(conn)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("activity"))
}

async fn record_history<C: ConnectionTrait>(
    conn: &C,
    activity: &apply_activity::Model,
    from: Option<ActivityStatus>,
    to: ActivityStatus,
    note: Option<String>,
    now: DateTime<Utc>,
) -> ApiResult<()> {
    let history = apply_activity_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        activity_id: Set(activity.id),
        apply_id: Set(activity.apply_id),
        from_status: Set(from.map(Into::into)),
        to_status: Set(to.into()),
        note: Set(note),
        changed_at: Set(to_db_time(now)),
    };
    apply_activity_history::Entity::insert(history)
        .exec_without_returning(conn)
        .await
        .map_err(db_error)?;
    Ok(())
}

async fn advance_application<C: ConnectionTrait>(
    conn: &C,
    current: &apply::Model,
    next: ApplicationStatus,
    now: DateTime<Utc>,
) -> ApiResult<()> {
    super::applies::write_status(conn, current, next, now).await?;
    info!(
        apply_id = %current.id,
        from = ApplicationStatus::from(current.status).as_str(),
        to = next.as_str(),
        "application advanced by activity outcome"
    );
    Ok(())
}

/// Status history of one activity, oldest first.
pub async fn history(
    db: &DatabaseConnection,
    activity_id: Uuid,
) -> ApiResult<Vec<apply_activity_history::Model>> {
    apply_activity_history::Entity::find()
        .filter(apply_activity_history::Column::ActivityId.eq(activity_id))
        .order_by_asc(apply_activity_history::Column::ChangedAt)
        .all(db)
        .await
        .map_err(db_error)
}
