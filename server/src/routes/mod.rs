//! REST endpoints used by the recruitment UI. Bodies are camelCase JSON,
//! list filters are PascalCase query parameters.

mod activities;
mod applies;
mod job_requests;
mod steps;
mod templates;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::http::AppState;

/// Shown in place of a related name that can no longer be resolved.
pub(crate) const MISSING_NAME: &str = "—";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/processtemplate", get(templates::list).post(templates::create))
        .route("/applyprocessstep", get(steps::list).post(steps::create))
        .route("/applyprocessstep/{id}", delete(steps::remove))
        .route("/jobrequest", post(job_requests::create))
        .route("/apply", post(applies::create))
        .route("/apply/{id}", get(applies::get).put(applies::update))
        .route(
            "/applyactivity",
            get(activities::list).post(activities::create),
        )
        .route(
            "/applyactivity/{id}",
            get(activities::get)
                .put(activities::update)
                .delete(activities::remove),
        )
        .route("/applyactivity/{id}/status", patch(activities::change_status))
        .route("/applyactivity/{id}/history", get(activities::history))
}

pub(crate) fn utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.to_utc()
}
