use chrono::{DateTime, Utc};
use entity::{apply, job_request};
use platform_api::{ApiError, ApiResult};
use products_hr::ApplicationStatus;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::{check_version, db_error, non_blank, stale, to_db_time};

#[derive(Clone, Debug)]
pub struct NewApply {
    pub job_request_id: Uuid,
    pub cv_id: Option<Uuid>,
    pub submitted_by: Option<String>,
    pub note: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApplyUpdate {
    pub status: ApplicationStatus,
    /// Replaces the note when present.
    pub note: Option<String>,
    pub expected_version: Option<i32>,
}

pub async fn create(db: &DatabaseConnection, input: NewApply) -> ApiResult<apply::Model> {
    let exists = job_request::Entity::find_by_id(input.job_request_id)
        .one(db)
        .await
        .map_err(db_error)?
        .is_some();
    if !exists {
        return Err(ApiError::NotFound("job request"));
    }
    let now = to_db_time(Utc::now());
    let model = apply::ActiveModel {
        id: Set(Uuid::new_v4()),
        job_request_id: Set(input.job_request_id),
        cv_id: Set(input.cv_id),
        submitted_by: Set(non_blank(input.submitted_by)),
        status: Set(apply::Status::Submitted),
        note: Set(non_blank(input.note)),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(db_error)?;
    info!(apply_id = %model.id, job_request_id = %model.job_request_id, "application submitted");
    Ok(model)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> ApiResult<apply::Model> {
    apply::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("application"))
}

/// Direct status edit from staff (withdrawal, manual rejection).
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: ApplyUpdate,
) -> ApiResult<apply::Model> {
    let now = Utc::now();
    let txn = db.begin().await.map_err(db_error)?;
    let existing = apply::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("application"))?;
    check_version("application", input.expected_version, existing.version)?;

    let mut changes = apply::ActiveModel {
        status: Set(input.status.into()),
        ..Default::default()
    };
    if let Some(note) = non_blank(input.note) {
        changes.note = Set(Some(note));
    }
    let updated = write(&txn, &existing, changes, now).await?;
    txn.commit().await.map_err(db_error)?;
    if existing.status != updated.status {
        info!(
            apply_id = %id,
            from = ApplicationStatus::from(existing.status).as_str(),
            to = input.status.as_str(),
            "application status set"
        );
    }
    Ok(updated)
}

/// Status change driven by an activity outcome, inside the caller's
/// transaction.
pub(crate) async fn write_status<C: ConnectionTrait>(
    conn: &C,
    current: &apply::Model,
    next: ApplicationStatus,
    now: DateTime<Utc>,
) -> ApiResult<apply::Model> {
    let changes = apply::ActiveModel {
        status: Set(next.into()),
        ..Default::default()
    };
    write(conn, current, changes, now).await
}

async fn write<C: ConnectionTrait>(
    conn: &C,
    existing: &apply::Model,
    mut changes: apply::ActiveModel,
    now: DateTime<Utc>,
) -> ApiResult<apply::Model> {
    changes.version = Set(existing.version + 1);
    changes.updated_at = Set(to_db_time(now));
    let result = apply::Entity::update_many()
        .set(changes)
        .filter(apply::Column::Id.eq(existing.id))
        .filter(apply::Column::Version.eq(existing.version))
        .exec(conn)
        .await
        .map_err(db_error)?;
    if result.rows_affected == 0 {
        return Err(stale("application"));
    }
    apply::Entity::find_by_id(existing.id)
        .one(conn)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("application"))
}
