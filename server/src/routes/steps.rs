use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use entity::process_step;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::utc;
use crate::{
    http::{AppState, HttpResult},
    service::catalog::{self, NewStep, StepFilter, StepDef},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StepQuery {
    template_id: Option<Uuid>,
    step_name: Option<String>,
    exclude_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateStepBody {
    template_id: Uuid,
    step_order: i32,
    step_name: String,
    description: Option<String>,
    estimated_days: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StepDto {
    id: Uuid,
    template_id: Uuid,
    step_order: i32,
    step_name: String,
    description: Option<String>,
    estimated_days: Option<i32>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<process_step::Model> for StepDto {
    fn from(model: process_step::Model) -> Self {
        Self {
            id: model.id,
            template_id: model.template_id,
            step_order: model.step_order,
            step_name: model.step_name,
            description: model.description,
            estimated_days: model.estimated_days,
            created_at: utc(model.created_at),
            deleted_at: model.deleted_at.map(utc),
        }
    }
}

#[instrument(name = "http.steps.list", skip_all)]
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<StepQuery>,
) -> HttpResult<Json<Vec<StepDto>>> {
    let filter = StepFilter {
        template_id: query.template_id,
        step_name: query.step_name,
        exclude_deleted: query.exclude_deleted.unwrap_or(true),
    };
    let steps = catalog::list_steps(&state.pool, filter).await?;
    Ok(Json(steps.into_iter().map(StepDto::from).collect()))
}

#[instrument(name = "http.steps.create", skip_all)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateStepBody>,
) -> HttpResult<(StatusCode, Json<StepDto>)> {
    let input = NewStep {
        template_id: body.template_id,
        step: StepDef {
            step_order: body.step_order,
            step_name: body.step_name,
            description: body.description,
            estimated_days: body.estimated_days,
        },
    };
    let step = catalog::create_step(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(step.into())))
}

#[instrument(name = "http.steps.delete", skip_all, fields(step_id = %id))]
pub(crate) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    catalog::delete_step(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
