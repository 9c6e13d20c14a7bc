mod pipeline;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Result, Schema,
    SimpleObject,
};
use chrono::{DateTime, Utc};
use platform_api::ApiResult;
use platform_db::DbPool;
use products_hr::{FAILURE_REASONS, OrderingPolicy};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

pub use pipeline::{
    ActivityNode, ActivityStatusValue, ActivityTypeValue, ApplicationStatusValue, PipelineNode,
    PipelineStepNode, ScheduleCheck,
};

use crate::service::{self, ordering_error};

pub type SchemaType = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(pool: DbPool, policy: OrderingPolicy) -> SchemaType {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(pool)
        .data(policy)
        .finish()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self, ctx: &Context<'_>) -> Result<HealthPayload> {
        let pool = ctx.data::<DbPool>()?;
        Ok(HealthPayload {
            ok: platform_db::ping(pool).await,
        })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> ApiResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    /// Canned reasons offered when failing an activity.
    async fn failure_reasons(&self) -> Vec<String> {
        FAILURE_REASONS.iter().map(|reason| reason.to_string()).collect()
    }

    /// Steps of an application's template with their activity and gate.
    #[instrument(name = "graphql.application_pipeline", skip_all, fields(apply_id = %apply_id))]
    async fn application_pipeline(&self, ctx: &Context<'_>, apply_id: Uuid) -> Result<PipelineNode> {
        let pool = ctx.data::<DbPool>()?;
        let policy = ctx.data::<OrderingPolicy>()?;
        let snapshot = service::pipeline::load(pool, apply_id)
            .await
            .map_err(|err| err.extend())?;
        Ok(PipelineNode::build(&snapshot, policy))
    }

    /// Dry run of the ordering rules for a proposed date.
    #[instrument(name = "graphql.validate_schedule", skip_all, fields(apply_id = %apply_id, step_id = %step_id))]
    async fn validate_schedule(
        &self,
        ctx: &Context<'_>,
        apply_id: Uuid,
        step_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<ScheduleCheck> {
        let pool = ctx.data::<DbPool>()?;
        let policy = ctx.data::<OrderingPolicy>()?;
        let snapshot = service::pipeline::load(pool, apply_id)
            .await
            .map_err(|err| err.extend())?;
        let pipeline = &snapshot.pipeline;
        let (earliest_date, latest_date) = pipeline
            .schedule_window(step_id, policy)
            .unwrap_or((None, None));
        let check = match pipeline.validate_schedule(step_id, Some(scheduled_at), policy) {
            Ok(()) => ScheduleCheck {
                ok: true,
                code: None,
                message: None,
                earliest_date,
                latest_date,
            },
            Err(violation) => {
                let err = ordering_error(violation);
                ScheduleCheck {
                    ok: false,
                    code: Some(err.code().to_string()),
                    message: Some(err.to_string()),
                    earliest_date,
                    latest_date,
                }
            }
        };
        Ok(check)
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}
