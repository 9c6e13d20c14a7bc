//! Process templates, their steps, and the job requests that use them.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use entity::{job_request, process_step, process_template};
use platform_api::{ApiError, ApiResult};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::{db_error, non_blank, to_db_time};

#[derive(Clone, Debug)]
pub struct StepDef {
    pub step_order: i32,
    pub step_name: String,
    pub description: Option<String>,
    pub estimated_days: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<StepDef>,
}

#[derive(Clone, Debug)]
pub struct NewStep {
    pub template_id: Uuid,
    pub step: StepDef,
}

#[derive(Clone, Debug)]
pub struct NewJobRequest {
    pub title: String,
    pub process_template_id: Uuid,
}

#[derive(Clone, Debug, Default)]
pub struct StepFilter {
    pub template_id: Option<Uuid>,
    /// Substring match on the step name.
    pub step_name: Option<String>,
    pub exclude_deleted: bool,
}

pub type TemplateWithSteps = (process_template::Model, Vec<process_step::Model>);

pub async fn create_template(
    db: &DatabaseConnection,
    input: NewTemplate,
) -> ApiResult<TemplateWithSteps> {
    let name = required("name", &input.name)?;
    let mut seen = HashSet::new();
    for step in &input.steps {
        validate_step(step)?;
        if !seen.insert(step.step_order) {
            return Err(duplicate_order(step.step_order));
        }
    }

    let now = to_db_time(Utc::now());
    let txn = db.begin().await.map_err(db_error)?;
    let template = process_template::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(non_blank(input.description)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(db_error)?;

    let mut steps = Vec::with_capacity(input.steps.len());
    for step in input.steps {
        steps.push(insert_step(&txn, template.id, step).await?);
    }
    steps.sort_by_key(|step| step.step_order);
    txn.commit().await.map_err(db_error)?;
    info!(template_id = %template.id, steps = steps.len(), "process template created");
    Ok((template, steps))
}

pub async fn list_templates(db: &DatabaseConnection) -> ApiResult<Vec<TemplateWithSteps>> {
    let templates = process_template::Entity::find()
        .order_by_asc(process_template::Column::Name)
        .all(db)
        .await
        .map_err(db_error)?;
    let mut steps: HashMap<Uuid, Vec<process_step::Model>> = HashMap::new();
    for step in list_steps(
        db,
        StepFilter {
            exclude_deleted: true,
            ..Default::default()
        },
    )
    .await?
    {
        steps.entry(step.template_id).or_default().push(step);
    }
    Ok(templates
        .into_iter()
        .map(|template| {
            let own = steps.remove(&template.id).unwrap_or_default();
            (template, own)
        })
        .collect())
}

pub async fn find_template_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> ApiResult<Option<process_template::Model>> {
    process_template::Entity::find()
        .filter(process_template::Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(db_error)
}

pub async fn list_steps(
    db: &DatabaseConnection,
    filter: StepFilter,
) -> ApiResult<Vec<process_step::Model>> {
    let mut query = process_step::Entity::find();
    if let Some(template_id) = filter.template_id {
        query = query.filter(process_step::Column::TemplateId.eq(template_id));
    }
    if let Some(name) = non_blank(filter.step_name) {
        query = query.filter(process_step::Column::StepName.contains(&name));
    }
    if filter.exclude_deleted {
        query = query.filter(process_step::Column::DeletedAt.is_null());
    }
    query
        .order_by_asc(process_step::Column::TemplateId)
        .order_by_asc(process_step::Column::StepOrder)
        .all(db)
        .await
        .map_err(db_error)
}

pub async fn create_step(db: &DatabaseConnection, input: NewStep) -> ApiResult<process_step::Model> {
    validate_step(&input.step)?;
    let txn = db.begin().await.map_err(db_error)?;
    process_template::Entity::find_by_id(input.template_id)
        .one(&txn)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("process template"))?;
    let taken = process_step::Entity::find()
        .filter(process_step::Column::TemplateId.eq(input.template_id))
        .filter(process_step::Column::StepOrder.eq(input.step.step_order))
        .filter(process_step::Column::DeletedAt.is_null())
        .one(&txn)
        .await
        .map_err(db_error)?;
    if taken.is_some() {
        return Err(duplicate_order(input.step.step_order));
    }
    let step = insert_step(&txn, input.template_id, input.step).await?;
    txn.commit().await.map_err(db_error)?;
    info!(step_id = %step.id, template_id = %step.template_id, order = step.step_order, "process step added");
    Ok(step)
}

/// Soft-deletes a step. Deleted steps no longer count toward gating.
pub async fn delete_step(db: &DatabaseConnection, id: Uuid) -> ApiResult<()> {
    let existing = process_step::Entity::find_by_id(id)
        .filter(process_step::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("process step"))?;
    let mut active: process_step::ActiveModel = existing.into();
    active.deleted_at = Set(Some(to_db_time(Utc::now())));
    active.update(db).await.map_err(db_error)?;
    info!(step_id = %id, "process step deleted");
    Ok(())
}

/// Display names for `ids`, deleted steps included.
pub async fn step_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> ApiResult<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = ids.into_iter().collect::<HashSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let steps = process_step::Entity::find()
        .filter(process_step::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(db_error)?;
    Ok(steps.into_iter().map(|step| (step.id, step.step_name)).collect())
}

pub async fn create_job_request(
    db: &DatabaseConnection,
    input: NewJobRequest,
) -> ApiResult<job_request::Model> {
    let title = required("title", &input.title)?;
    process_template::Entity::find_by_id(input.process_template_id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotFound("process template"))?;
    let model = job_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        process_template_id: Set(input.process_template_id),
        created_at: Set(to_db_time(Utc::now())),
    }
    .insert(db)
    .await
    .map_err(db_error)?;
    info!(job_request_id = %model.id, "job request opened");
    Ok(model)
}

async fn insert_step<C: ConnectionTrait>(
    conn: &C,
    template_id: Uuid,
    step: StepDef,
) -> ApiResult<process_step::Model> {
    process_step::ActiveModel {
        id: Set(Uuid::new_v4()),
        template_id: Set(template_id),
        step_order: Set(step.step_order),
        step_name: Set(step.step_name.trim().to_string()),
        description: Set(non_blank(step.description)),
        estimated_days: Set(step.estimated_days),
        created_at: Set(to_db_time(Utc::now())),
        deleted_at: Set(None),
    }
    .insert(conn)
    .await
    .map_err(db_error)
}

fn validate_step(step: &StepDef) -> ApiResult<()> {
    required("stepName", &step.step_name)?;
    if step.step_order <= 0 {
        return Err(ApiError::validation(
            "INVALID_STEP_ORDER",
            format!("step order must be positive, got {}", step.step_order),
        ));
    }
    if step.estimated_days.is_some_and(|days| days < 0) {
        return Err(ApiError::InvalidInput(
            "estimatedDays must not be negative".into(),
        ));
    }
    Ok(())
}

fn duplicate_order(order: i32) -> ApiError {
    ApiError::validation(
        "DUPLICATE_STEP_ORDER",
        format!("step order {order} is already used in this template"),
    )
}

fn required(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
