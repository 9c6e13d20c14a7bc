use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::utc;
use crate::{
    http::{AppState, HttpResult},
    service::catalog::{self, NewJobRequest},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateJobRequestBody {
    title: String,
    process_template_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobRequestDto {
    id: Uuid,
    title: String,
    process_template_id: Uuid,
    created_at: DateTime<Utc>,
}

#[instrument(name = "http.job_requests.create", skip_all)]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateJobRequestBody>,
) -> HttpResult<(StatusCode, Json<JobRequestDto>)> {
    let model = catalog::create_job_request(
        &state.pool,
        NewJobRequest {
            title: body.title,
            process_template_id: body.process_template_id,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(JobRequestDto {
            id: model.id,
            title: model.title,
            process_template_id: model.process_template_id,
            created_at: utc(model.created_at),
        }),
    ))
}
