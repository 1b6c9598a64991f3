use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use leadflow_api::{create_app, AppState};
use leadflow_config::ApiConfig;
use leadflow_dispatcher::{DispatcherSettings, FollowupDispatcher};
use leadflow_domain::entities::{FollowupStatus, LeadSource, LeadStatus};
use leadflow_domain::LeadPipelineService;
use leadflow_infrastructure::MetricsCollector;
use leadflow_testing_utils::{
    AgentBuilder, ClientBuilder, FollowupTaskBuilder, LeadBuilder, MockAgentRepository,
    MockClientRepository, MockFollowupTaskRepository, MockLeadRepository, MockMessageSender,
    MockTemplateRepository, TemplateBuilder, TestEnv,
};

struct TestApp {
    router: Router,
    tasks: MockFollowupTaskRepository,
    leads: MockLeadRepository,
    sender: MockMessageSender,
}

impl TestApp {
    fn new(tasks: MockFollowupTaskRepository, leads: MockLeadRepository) -> Self {
        Self::with_stores(
            tasks,
            leads,
            MockClientRepository::new(),
            MockTemplateRepository::new(),
            MockAgentRepository::new(),
        )
    }

    fn with_stores(
        tasks: MockFollowupTaskRepository,
        leads: MockLeadRepository,
        clients: MockClientRepository,
        templates: MockTemplateRepository,
        agents: MockAgentRepository,
    ) -> Self {
        let sender = MockMessageSender::new();
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let dispatcher = FollowupDispatcher::new(
            Arc::new(tasks.clone()),
            Arc::new(clients),
            Arc::new(templates),
            Arc::new(agents),
            Arc::new(sender.clone()),
            Arc::clone(&metrics),
            DispatcherSettings::default(),
        );

        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            pipeline: Arc::new(LeadPipelineService::new(
                Arc::new(leads.clone()),
                metrics,
            )),
            prometheus: None,
        };

        Self {
            router: create_app(state, &ApiConfig::default()),
            tasks,
            leads,
            sender,
        }
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn empty_app() -> TestApp {
    TestApp::new(MockFollowupTaskRepository::new(), MockLeadRepository::new())
}

#[tokio::test]
async fn test_health_check() {
    let app = empty_app();
    let (status, body) = app.request("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "leadflow");
}

#[tokio::test]
async fn test_metrics_not_found_when_disabled() {
    let app = empty_app();
    let (status, body) = app.request("GET", "/metrics", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_dispatch_runs_batch_at_given_time() {
    let agent = AgentBuilder::new().with_name("Vikram").build();
    let client = ClientBuilder::new().with_name("Asha").with_agent(agent.id).build();
    let template = TemplateBuilder::new()
        .with_subject("Hello {{client_name}}")
        .with_body("{{agent_name}} here.")
        .build();
    let task = FollowupTaskBuilder::new()
        .for_client(client.id)
        .with_template(template.id)
        .scheduled_for(TestEnv::fixed_now() - Duration::hours(1))
        .build();
    let task_id = task.id;

    let app = TestApp::with_stores(
        MockFollowupTaskRepository::with_tasks(vec![task]),
        MockLeadRepository::new(),
        MockClientRepository::with_clients(vec![client]),
        MockTemplateRepository::with_templates(vec![template]),
        MockAgentRepository::with_agents(vec![agent]),
    );

    let (status, body) = app
        .request(
            "POST",
            "/api/followups/dispatch",
            Some(json!({ "now": TestEnv::fixed_now().to_rfc3339() })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["processed_count"], 1);
    assert_eq!(body["data"]["errors"], json!([]));
    assert_eq!(app.sender.call_count(), 1);
    assert_eq!(app.tasks.get(task_id).unwrap().status, FollowupStatus::Sent);
}

#[tokio::test]
async fn test_dispatch_reports_per_task_errors_in_body() {
    let task = FollowupTaskBuilder::new()
        .scheduled_for(TestEnv::fixed_now() - Duration::minutes(5))
        .build();
    let app = TestApp::new(
        MockFollowupTaskRepository::with_tasks(vec![task]),
        MockLeadRepository::new(),
    );

    let (status, body) = app
        .request(
            "POST",
            "/api/followups/dispatch",
            Some(json!({ "now": TestEnv::fixed_now() })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["processed_count"], 0);
    assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 1);
    assert_eq!(app.sender.call_count(), 0);
}

#[tokio::test]
async fn test_dispatch_without_body_uses_current_time() {
    let app = empty_app();
    let (status, body) = app.request("POST", "/api/followups/dispatch", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["processed_count"], 0);
}

#[tokio::test]
async fn test_dispatch_rejects_malformed_body() {
    let app = empty_app();
    let (status, body) = app
        .request("POST", "/api/followups/dispatch", Some(json!({ "now": "soon" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_dispatch_store_failure_is_service_unavailable() {
    let tasks = MockFollowupTaskRepository::new();
    tasks.fail_list_due();
    let app = TestApp::new(tasks, MockLeadRepository::new());

    let (status, body) = app.request("POST", "/api/followups/dispatch", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().contains("unreachable"));
}

#[tokio::test]
async fn test_pipeline_groups_and_filters() {
    let referral = LeadBuilder::new()
        .with_name("Meera Iyer")
        .with_source(LeadSource::Referral)
        .with_status(LeadStatus::Qualified)
        .build();
    let website = LeadBuilder::new()
        .with_name("Rohan Das")
        .with_source(LeadSource::Website)
        .build();
    let app = TestApp::new(
        MockFollowupTaskRepository::new(),
        MockLeadRepository::with_leads(vec![referral, website]),
    );

    let (status, body) = app.request("GET", "/api/leads/pipeline", None).await;
    assert_eq!(status, StatusCode::OK);
    let columns = body["data"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 6);
    assert_eq!(columns[0]["status"], "new");
    assert_eq!(columns[0]["leads"].as_array().unwrap().len(), 1);
    assert_eq!(columns[2]["status"], "qualified");
    assert_eq!(columns[2]["leads"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .request("GET", "/api/leads/pipeline?source=referral&search=", None)
        .await;
    let total: usize = body["data"]["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["leads"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 1);

    let (_, body) = app
        .request("GET", "/api/leads/pipeline?search=rohan", None)
        .await;
    assert_eq!(body["data"]["columns"][0]["leads"][0]["full_name"], "Rohan Das");
}

#[tokio::test]
async fn test_advance_lead() {
    let lead = LeadBuilder::new().with_status(LeadStatus::Negotiation).build();
    let id = lead.id;
    let app = TestApp::new(
        MockFollowupTaskRepository::new(),
        MockLeadRepository::with_leads(vec![lead]),
    );

    let (status, body) = app
        .request("POST", &format!("/api/leads/{id}/advance"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "advanced");
    assert_eq!(body["data"]["to"], "closed");
    assert_eq!(app.leads.get(id).unwrap().status, LeadStatus::Closed);

    let (status, body) = app
        .request("POST", &format!("/api/leads/{id}/advance"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "no_further_stage");
    assert_eq!(app.leads.status_writes(), 1);
}

#[tokio::test]
async fn test_advance_unknown_lead_is_not_found() {
    let app = empty_app();
    let (status, body) = app
        .request("POST", &format!("/api/leads/{}/advance", Uuid::new_v4()), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn test_set_lead_status() {
    let lead = LeadBuilder::new().build();
    let id = lead.id;
    let app = TestApp::new(
        MockFollowupTaskRepository::new(),
        MockLeadRepository::with_leads(vec![lead]),
    );

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/leads/{id}/status"),
            Some(json!({ "status": "converted" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "converted");
    assert_eq!(app.leads.get(id).unwrap().status, LeadStatus::Converted);

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/leads/{id}/status"),
            Some(json!({ "status": "archived" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.leads.get(id).unwrap().status, LeadStatus::Converted);
}
