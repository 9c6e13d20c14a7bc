use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, connect};
use serde_json::{Value, json};
use server::{AppConfig, AppState, build_router, seed::{SeededHiring, seed_hiring}};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    seeded: SeededHiring,
}

impl TestApp {
    async fn new() -> Self {
        let pool = connect(&DatabaseSettings::with_url("sqlite::memory:"))
            .await
            .unwrap();
        Migrator::up(&pool, None).await.unwrap();
        let seeded = seed_hiring(&pool).await.unwrap();
        let router = build_router(AppState::new(pool, AppConfig::default()));
        Self { router, seeded }
    }

    fn step(&self, order: usize) -> String {
        self.seeded.step_ids[order - 1].to_string()
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn schedule(&self, order: usize, at: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/applyactivity",
            Some(json!({
                "applyId": self.seeded.apply_id,
                "processStepId": self.step(order),
                "activityType": "Online",
                "scheduledDate": at,
                "status": "Scheduled",
            })),
        )
        .await
    }

    async fn schedule_all(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for (order, at) in [
            (1, "2030-01-10T09:00:00Z"),
            (2, "2030-01-11T09:00:00Z"),
            (3, "2030-01-12T09:00:00Z"),
        ] {
            let (status, body) = self.schedule(order, at).await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            ids.push(body["id"].as_str().unwrap().to_string());
        }
        ids
    }

    async fn set_status(&self, id: &str, status: &str, notes: Option<&str>) -> (StatusCode, Value) {
        self.send(
            Method::PATCH,
            &format!("/applyactivity/{id}/status"),
            Some(json!({ "status": status, "notes": notes })),
        )
        .await
    }

    async fn application_status(&self) -> String {
        let (_, body) = self
            .send(Method::GET, &format!("/apply/{}", self.seeded.apply_id), None)
            .await;
        body["status"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db_ok"], json!(true));
}

#[tokio::test]
async fn second_step_needs_a_one_minute_gap() {
    let app = TestApp::new().await;
    let (status, _) = app.schedule(1, "2030-01-10T09:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.schedule(2, "2030-01-10T09:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "ORDERING_VIOLATION");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("must be after step Screening by at least 1 minute"), "{message}");

    let (status, body) = app.schedule(2, "2030-01-10T09:05:00Z").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["stepName"], "Tech Interview");
    assert_eq!(body["status"], "Scheduled");
}

#[tokio::test]
async fn first_activity_moves_application_to_interviewing() {
    let app = TestApp::new().await;
    assert_eq!(app.application_status().await, "Submitted");
    app.schedule(1, "2030-01-10T09:00:00Z").await;
    assert_eq!(app.application_status().await, "Interviewing");
}

#[tokio::test]
async fn steps_are_scheduled_in_order() {
    let app = TestApp::new().await;
    let (status, body) = app.schedule(2, "2030-01-11T09:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "OUT_OF_ORDER");

    app.schedule(1, "2030-01-10T09:00:00Z").await;
    let (status, body) = app.schedule(1, "2030-01-10T10:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "DUPLICATE_ACTIVITY");
}

#[tokio::test]
async fn later_step_is_blocked_until_its_predecessor_passes() {
    let app = TestApp::new().await;
    let ids = app.schedule_all().await;

    let (status, body) = app.set_status(&ids[2], "Completed", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "GATE_CLOSED");
    assert_eq!(
        body["message"],
        "step Tech Interview has not passed yet (currently Scheduled)"
    );
}

#[tokio::test]
async fn gate_stays_closed_until_every_step_is_scheduled() {
    let app = TestApp::new().await;
    let (_, first) = app.schedule(1, "2030-01-10T09:00:00Z").await;
    let id = first["id"].as_str().unwrap();
    let (status, body) = app.set_status(id, "Completed", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "GATE_CLOSED");
    assert!(body["message"].as_str().unwrap().contains("Tech Interview"));
}

#[tokio::test]
async fn passing_every_step_hires_the_candidate() {
    let app = TestApp::new().await;
    let ids = app.schedule_all().await;
    for id in &ids {
        let (status, body) = app.set_status(id, "Completed", None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let (status, body) = app.set_status(id, "Passed", None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
    assert_eq!(app.application_status().await, "Hired");

    let (status, body) = app
        .send(Method::GET, &format!("/applyactivity/{}/history", ids[0]), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let moves: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["toStatus"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(moves, ["Scheduled", "Completed", "Passed"]);
}

#[tokio::test]
async fn failing_needs_a_reason_and_rejects_the_application() {
    let app = TestApp::new().await;
    let ids = app.schedule_all().await;
    app.set_status(&ids[0], "Completed", None).await;

    let (status, body) = app.set_status(&ids[0], "Failed", Some("  ")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "REASON_REQUIRED");

    let (status, body) = app
        .set_status(&ids[0], "Failed", Some("Not enough relevant experience"))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["notes"], "Not enough relevant experience");
    assert_eq!(app.application_status().await, "Rejected");
}

#[tokio::test]
async fn decided_activities_cannot_be_edited() {
    let app = TestApp::new().await;
    let ids = app.schedule_all().await;
    app.set_status(&ids[0], "Completed", None).await;
    let (status, _) = app.set_status(&ids[0], "Failed", Some("Not a fit for the team")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/applyactivity/{}", ids[0]),
            Some(json!({ "activityType": "Offline", "scheduledDate": "2030-01-10T09:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "ACTIVITY_LOCKED");

    let (_, stored) = app
        .send(Method::GET, &format!("/applyactivity/{}", ids[0]), None)
        .await;
    assert_eq!(stored["status"], "Failed");
    assert_eq!(stored["notes"], "Not a fit for the team");
    assert_eq!(stored["activityType"], "Online");
}

#[tokio::test]
async fn deleted_activity_frees_its_step() {
    let app = TestApp::new().await;
    let (_, first) = app.schedule(1, "2030-01-10T09:00:00Z").await;

    let (status, body) = app.schedule(1, "2030-01-10T11:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "DUPLICATE_ACTIVITY");

    let uri = format!("/applyactivity/{}", first["id"].as_str().unwrap());
    let (status, _) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.schedule(1, "2030-01-10T11:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[tokio::test]
async fn withdrawn_application_freezes_the_pipeline() {
    let app = TestApp::new().await;
    let ids = app.schedule_all().await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/apply/{}", app.seeded.apply_id),
            Some(json!({ "status": "Withdrawn" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.set_status(&ids[0], "Completed", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "the application has been withdrawn");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/applyactivity/{}", ids[0]),
            Some(json!({ "activityType": "Offline", "scheduledDate": "2030-01-10T10:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "GATE_CLOSED");
}

#[tokio::test]
async fn stale_version_is_a_conflict() {
    let app = TestApp::new().await;
    let ids = app.schedule_all().await;
    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/applyactivity/{}/status", ids[0]),
            Some(json!({ "status": "Completed", "expectedVersion": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn past_dates_need_confirmation() {
    let app = TestApp::new().await;
    let (status, body) = app.schedule(1, "2020-01-10T09:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "PAST_DATE_UNCONFIRMED");

    let (status, body) = app
        .send(
            Method::POST,
            "/applyactivity",
            Some(json!({
                "applyId": app.seeded.apply_id,
                "processStepId": app.step(1),
                "activityType": "Offline",
                "scheduledDate": "2020-01-10T09:00:00Z",
                "status": "Scheduled",
                "confirmPast": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    // Later steps are not scheduled yet, so it cannot be marked as held.
    assert_eq!(body["status"], "Scheduled");
}

#[tokio::test]
async fn rescheduling_respects_neighbours() {
    let app = TestApp::new().await;
    let ids = app.schedule_all().await;
    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/applyactivity/{}", ids[1]),
            Some(json!({ "activityType": "Offline", "scheduledDate": "2030-01-13T09:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "ORDERING_VIOLATION");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/applyactivity/{}", ids[1]),
            Some(json!({
                "activityType": "Offline",
                "scheduledDate": "2030-01-11T15:00:00Z",
                "expectedVersion": 1,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["activityType"], "Offline");
    assert_eq!(body["version"], 2);
}

#[tokio::test]
async fn deleted_steps_drop_out_of_listings() {
    let app = TestApp::new().await;
    let template_id = app.seeded.template_id;
    let uri = format!("/applyprocessstep?TemplateId={template_id}");
    let (_, before) = app.send(Method::GET, &uri, None).await;
    assert_eq!(before.as_array().unwrap().len(), 3);

    let (status, _) = app
        .send(Method::DELETE, &format!("/applyprocessstep/{}", app.step(3)), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, after) = app.send(Method::GET, &uri, None).await;
    assert_eq!(after.as_array().unwrap().len(), 2);
    let (_, all) = app
        .send(Method::GET, &format!("{uri}&ExcludeDeleted=false"), None)
        .await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, body) = app
        .send(
            Method::POST,
            "/applyprocessstep",
            Some(json!({ "templateId": template_id, "stepOrder": 3, "stepName": "Panel" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[tokio::test]
async fn activity_listing_filters_by_application() {
    let app = TestApp::new().await;
    app.schedule_all().await;
    let (status, body) = app
        .send(
            Method::GET,
            &format!("/applyactivity?ApplyId={}&Status=Scheduled", app.seeded.apply_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["stepName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Screening", "Tech Interview", "Final Interview"]);
}

#[tokio::test]
async fn templates_reject_duplicate_step_orders() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/processtemplate",
            Some(json!({
                "name": "Intern Hiring",
                "steps": [
                    { "stepOrder": 1, "stepName": "Screening" },
                    { "stepOrder": 1, "stepName": "Interview" },
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "DUPLICATE_STEP_ORDER");
}
