use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use entity::{apply_activity, apply_activity_history};
use products_hr::{ActivityStatus, ActivityType};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::{MISSING_NAME, utc};
use crate::{
    http::{AppState, HttpResult},
    service::{
        activities::{self, ActivityEdit, ActivityFilter, NewActivity, StatusChange},
        catalog,
    },
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ActivityQuery {
    apply_id: Option<Uuid>,
    process_step_id: Option<Uuid>,
    activity_type: Option<ActivityType>,
    status: Option<ActivityStatus>,
    scheduled_date_from: Option<DateTime<Utc>>,
    scheduled_date_to: Option<DateTime<Utc>>,
    exclude_deleted: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DeleteQuery {
    expected_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateActivityBody {
    apply_id: Uuid,
    process_step_id: Uuid,
    activity_type: ActivityType,
    scheduled_date: Option<DateTime<Utc>>,
    #[serde(default = "scheduled")]
    status: ActivityStatus,
    notes: Option<String>,
    #[serde(default)]
    confirm_past: bool,
}

fn scheduled() -> ActivityStatus {
    ActivityStatus::Scheduled
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateActivityBody {
    activity_type: ActivityType,
    scheduled_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    #[serde(default)]
    confirm_past: bool,
    expected_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusBody {
    status: ActivityStatus,
    notes: Option<String>,
    expected_version: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivityDto {
    id: Uuid,
    apply_id: Uuid,
    process_step_id: Uuid,
    step_name: String,
    activity_type: ActivityType,
    scheduled_date: Option<DateTime<Utc>>,
    status: ActivityStatus,
    notes: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ActivityDto {
    fn new(model: apply_activity::Model, names: &HashMap<Uuid, String>) -> Self {
        let step_name = names
            .get(&model.process_step_id)
            .cloned()
            .unwrap_or_else(|| MISSING_NAME.to_string());
        Self {
            id: model.id,
            apply_id: model.apply_id,
            process_step_id: model.process_step_id,
            step_name,
            activity_type: model.activity_type.into(),
            scheduled_date: model.scheduled_date.map(utc),
            status: model.status.into(),
            notes: model.notes,
            version: model.version,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
            deleted_at: model.deleted_at.map(utc),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryDto {
    from_status: Option<ActivityStatus>,
    to_status: ActivityStatus,
    note: Option<String>,
    changed_at: DateTime<Utc>,
}

impl From<apply_activity_history::Model> for HistoryDto {
    fn from(model: apply_activity_history::Model) -> Self {
        Self {
            from_status: model.from_status.map(Into::into),
            to_status: model.to_status.into(),
            note: model.note,
            changed_at: utc(model.changed_at),
        }
    }
}

async fn render(state: &AppState, model: apply_activity::Model) -> HttpResult<Json<ActivityDto>> {
    let names = catalog::step_names(&state.pool, [model.process_step_id]).await?;
    Ok(Json(ActivityDto::new(model, &names)))
}

#[instrument(name = "http.activities.list", skip_all)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> HttpResult<Json<Vec<ActivityDto>>> {
    let filter = ActivityFilter {
        apply_id: query.apply_id,
        process_step_id: query.process_step_id,
        activity_type: query.activity_type,
        status: query.status,
        scheduled_from: query.scheduled_date_from,
        scheduled_to: query.scheduled_date_to,
        exclude_deleted: query.exclude_deleted.unwrap_or(true),
    };
    let rows = activities::list(&state.pool, filter).await?;
    let names = catalog::step_names(&state.pool, rows.iter().map(|row| row.process_step_id)).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| ActivityDto::new(row, &names))
            .collect(),
    ))
}

#[instrument(name = "http.activities.get", skip_all, fields(activity_id = %id))]
pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<ActivityDto>> {
    let model = activities::get(&state.pool, id).await?;
    render(&state, model).await
}

#[instrument(name = "http.activities.create", skip_all)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateActivityBody>,
) -> HttpResult<(StatusCode, Json<ActivityDto>)> {
    let input = NewActivity {
        apply_id: body.apply_id,
        process_step_id: body.process_step_id,
        activity_type: body.activity_type,
        scheduled_date: body.scheduled_date,
        status: body.status,
        notes: body.notes,
        confirm_past: body.confirm_past,
    };
    let model = activities::create(&state.pool, input, &state.config.ordering).await?;
    Ok((StatusCode::CREATED, render(&state, model).await?))
}

#[instrument(name = "http.activities.update", skip_all, fields(activity_id = %id))]
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateActivityBody>,
) -> HttpResult<Json<ActivityDto>> {
    let edit = ActivityEdit {
        activity_type: body.activity_type,
        scheduled_date: body.scheduled_date,
        notes: body.notes,
        confirm_past: body.confirm_past,
        expected_version: body.expected_version,
    };
    let model = activities::update(&state.pool, id, edit, &state.config.ordering).await?;
    render(&state, model).await
}

#[instrument(name = "http.activities.status", skip_all, fields(activity_id = %id))]
pub(crate) async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> HttpResult<Json<ActivityDto>> {
    let change = StatusChange {
        status: body.status,
        notes: body.notes,
        expected_version: body.expected_version,
    };
    let model = activities::change_status(&state.pool, id, change).await?;
    render(&state, model).await
}

#[instrument(name = "http.activities.delete", skip_all, fields(activity_id = %id))]
pub(crate) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> HttpResult<StatusCode> {
    activities::delete(&state.pool, id, query.expected_version).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "http.activities.history", skip_all, fields(activity_id = %id))]
pub(crate) async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<Vec<HistoryDto>>> {
    let rows = activities::history(&state.pool, id).await?;
    Ok(Json(rows.into_iter().map(HistoryDto::from).collect()))
}
