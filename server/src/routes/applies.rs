use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use entity::apply;
use products_hr::ApplicationStatus;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::utc;
use crate::{
    http::{AppState, HttpResult},
    service::applies::{self, ApplyUpdate, NewApply},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateApplyBody {
    job_request_id: Uuid,
    cv_id: Option<Uuid>,
    submitted_by: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateApplyBody {
    status: ApplicationStatus,
    note: Option<String>,
    expected_version: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplyDto {
    id: Uuid,
    job_request_id: Uuid,
    cv_id: Option<Uuid>,
    submitted_by: Option<String>,
    status: ApplicationStatus,
    note: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<apply::Model> for ApplyDto {
    fn from(model: apply::Model) -> Self {
        Self {
            id: model.id,
            job_request_id: model.job_request_id,
            cv_id: model.cv_id,
            submitted_by: model.submitted_by,
            status: model.status.into(),
            note: model.note,
            version: model.version,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

#[instrument(name = "http.applies.create", skip_all)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateApplyBody>,
) -> HttpResult<(StatusCode, Json<ApplyDto>)> {
    let input = NewApply {
        job_request_id: body.job_request_id,
        cv_id: body.cv_id,
        submitted_by: body.submitted_by,
        note: body.note,
    };
    let model = applies::create(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(model.into())))
}

#[instrument(name = "http.applies.get", skip_all, fields(apply_id = %id))]
pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<ApplyDto>> {
    let model = applies::get(&state.pool, id).await?;
    Ok(Json(model.into()))
}

#[instrument(name = "http.applies.update", skip_all, fields(apply_id = %id))]
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateApplyBody>,
) -> HttpResult<Json<ApplyDto>> {
    let input = ApplyUpdate {
        status: body.status,
        note: body.note,
        expected_version: body.expected_version,
    };
    let model = applies::update(&state.pool, id, input).await?;
    Ok(Json(model.into()))
}
