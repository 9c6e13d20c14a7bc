//! Demo data: the "Standard Hiring" template with one opening and one
//! candidate. Running it twice reuses what is already there.

use entity::{apply, job_request};
use platform_api::ApiResult;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::service::{
    applies::{self, NewApply},
    catalog::{self, NewJobRequest, NewTemplate, StepFilter, StepDef},
    db_error,
};

pub const STANDARD_TEMPLATE: &str = "Standard Hiring";
const DEMO_OPENING: &str = "Backend Engineer";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededHiring {
    pub template_id: Uuid,
    /// Step ids in pipeline order.
    pub step_ids: Vec<Uuid>,
    pub job_request_id: Uuid,
    pub apply_id: Uuid,
}

pub async fn seed_hiring(db: &DatabaseConnection) -> ApiResult<SeededHiring> {
    let template = match catalog::find_template_by_name(db, STANDARD_TEMPLATE).await? {
        Some(existing) => existing,
        None => {
            let (template, _) = catalog::create_template(db, standard_template()).await?;
            template
        }
    };
    let step_ids = catalog::list_steps(
        db,
        StepFilter {
            template_id: Some(template.id),
            exclude_deleted: true,
            ..Default::default()
        },
    )
    .await?
    .into_iter()
    .map(|step| step.id)
    .collect();

    let opening = job_request::Entity::find()
        .filter(job_request::Column::ProcessTemplateId.eq(template.id))
        .filter(job_request::Column::Title.eq(DEMO_OPENING))
        .one(db)
        .await
        .map_err(db_error)?;
    let opening = match opening {
        Some(existing) => existing,
        None => {
            catalog::create_job_request(
                db,
                NewJobRequest {
                    title: DEMO_OPENING.into(),
                    process_template_id: template.id,
                },
            )
            .await?
        }
    };

    let candidate = apply::Entity::find()
        .filter(apply::Column::JobRequestId.eq(opening.id))
        .order_by_asc(apply::Column::CreatedAt)
        .one(db)
        .await
        .map_err(db_error)?;
    let candidate = match candidate {
        Some(existing) => existing,
        None => {
            applies::create(
                db,
                NewApply {
                    job_request_id: opening.id,
                    cv_id: None,
                    submitted_by: Some("seed".into()),
                    note: None,
                },
            )
            .await?
        }
    };

    info!(
        template_id = %template.id,
        job_request_id = %opening.id,
        apply_id = %candidate.id,
        "hiring demo data ready"
    );
    Ok(SeededHiring {
        template_id: template.id,
        step_ids,
        job_request_id: opening.id,
        apply_id: candidate.id,
    })
}

fn standard_template() -> NewTemplate {
    let step = |order: i32, name: &str, days: i32| StepDef {
        step_order: order,
        step_name: name.to_string(),
        description: None,
        estimated_days: Some(days),
    };
    NewTemplate {
        name: STANDARD_TEMPLATE.into(),
        description: Some("Screening, technical and final interviews".into()),
        steps: vec![
            step(1, "Screening", 2),
            step(2, "Tech Interview", 5),
            step(3, "Final Interview", 3),
        ],
    }
}
