use entity::{apply, apply_activity, job_request, process_step};
use platform_api::{ApiError, ApiResult};
use products_hr::{Pipeline, ScheduledActivity, Step};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::warn;
use uuid::Uuid;

use super::db_error;

/// One application's pipeline as stored, plus the rule view built from it.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub apply: apply::Model,
    pub job_request: job_request::Model,
    /// Live steps of the template, ordered by `step_order`.
    pub steps: Vec<process_step::Model>,
    /// Live activities on live steps.
    pub activities: Vec<apply_activity::Model>,
    pub pipeline: Pipeline,
}

impl Snapshot {
    pub fn activity_on(&self, step_id: Uuid) -> Option<&apply_activity::Model> {
        self.activities
            .iter()
            .find(|activity| activity.process_step_id == step_id)
    }
}

/// Loads the snapshot for `apply_id` through `conn`, which is normally the
/// caller's open transaction.
pub async fn load<C: ConnectionTrait>(conn: &C, apply_id: Uuid) -> ApiResult<Snapshot> {
    let apply = apply::Entity::find_by_id(apply_id)
        .one(conn)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("application"))?;
    let job_request = job_request::Entity::find_by_id(apply.job_request_id)
        .one(conn)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("job request"))?;
    let steps = process_step::Entity::find()
        .filter(process_step::Column::TemplateId.eq(job_request.process_template_id))
        .filter(process_step::Column::DeletedAt.is_null())
        .order_by_asc(process_step::Column::StepOrder)
        .all(conn)
        .await
        .map_err(db_error)?;
    let mut activities = apply_activity::Entity::find()
        .filter(apply_activity::Column::ApplyId.eq(apply_id))
        .filter(apply_activity::Column::DeletedAt.is_null())
        .order_by_asc(apply_activity::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(db_error)?;

    let before = activities.len();
    activities.retain(|activity| steps.iter().any(|step| step.id == activity.process_step_id));
    if activities.len() != before {
        warn!(
            apply_id = %apply_id,
            ignored = before - activities.len(),
            "activities on deleted or foreign steps left out of the pipeline"
        );
    }

    let pipeline = Pipeline::new(
        steps.iter().map(Step::from).collect(),
        activities.iter().map(ScheduledActivity::from).collect(),
        apply.status.into(),
    )
    .map_err(|err| {
        ApiError::internal(anyhow::Error::new(err).context(format!(
            "pipeline for application {apply_id} is inconsistent"
        )))
    })?;

    Ok(Snapshot {
        apply,
        job_request,
        steps,
        activities,
        pipeline,
    })
}
