use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::{steps::StepDto, utc};
use crate::{
    http::{AppState, HttpResult},
    service::catalog::{self, NewTemplate, StepDef, TemplateWithSteps},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateTemplateBody {
    name: String,
    description: Option<String>,
    #[serde(default)]
    steps: Vec<TemplateStepBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TemplateStepBody {
    step_order: i32,
    step_name: String,
    description: Option<String>,
    estimated_days: Option<i32>,
}

impl From<TemplateStepBody> for StepDef {
    fn from(value: TemplateStepBody) -> Self {
        StepDef {
            step_order: value.step_order,
            step_name: value.step_name,
            description: value.description,
            estimated_days: value.estimated_days,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TemplateDto {
    id: Uuid,
    name: String,
    description: Option<String>,
    steps: Vec<StepDto>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateWithSteps> for TemplateDto {
    fn from((template, steps): TemplateWithSteps) -> Self {
        Self {
            id: template.id,
            name: template.name,
            description: template.description,
            steps: steps.into_iter().map(StepDto::from).collect(),
            created_at: utc(template.created_at),
            updated_at: utc(template.updated_at),
        }
    }
}

#[instrument(name = "http.templates.list", skip_all)]
pub(crate) async fn list(State(state): State<AppState>) -> HttpResult<Json<Vec<TemplateDto>>> {
    let templates = catalog::list_templates(&state.pool).await?;
    Ok(Json(templates.into_iter().map(TemplateDto::from).collect()))
}

#[instrument(name = "http.templates.create", skip_all)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTemplateBody>,
) -> HttpResult<(StatusCode, Json<TemplateDto>)> {
    let input = NewTemplate {
        name: body.name,
        description: body.description,
        steps: body.steps.into_iter().map(StepDef::from).collect(),
    };
    let created = catalog::create_template(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}
