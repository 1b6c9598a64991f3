//! Batch runs against the SQLite stores and a local HTTP message channel.

use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::post, Json, Router};
use chrono::Duration;
use leadflow_config::SenderConfig;
use leadflow_dispatcher::{DispatcherSettings, FollowupDispatcher};
use leadflow_domain::entities::FollowupStatus;
use leadflow_infrastructure::{DatabaseManager, HttpMessageSender, MetricsCollector};
use leadflow_testing_utils::{
    AgentBuilder, ClientBuilder, FollowupTaskBuilder, IntegrationTestSetup, TemplateBuilder,
    TestEnv,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Clone)]
struct Channel {
    refuse_client: Uuid,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn receive(State(channel): State<Channel>, Json(payload): Json<Value>) -> Json<Value> {
    let refused = payload["client_id"] == json!(channel.refuse_client);
    channel.received.lock().unwrap().push(payload);
    if refused {
        Json(json!({ "success": false, "error": "mailbox full" }))
    } else {
        Json(json!({ "success": true, "id": "msg-1" }))
    }
}

async fn start_channel(channel: Channel) -> String {
    let app = Router::new()
        .route("/send", post(receive))
        .with_state(channel);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/send")
}

#[tokio::test]
async fn test_batch_against_sqlite_and_http_channel() {
    IntegrationTestSetup::init_logging();

    let db = DatabaseManager::in_memory().await.unwrap();

    let agent = AgentBuilder::new()
        .with_name("Vikram")
        .with_contact(Some("+91 98450 00000"), Some("vikram@example.com"))
        .build();
    let asha = ClientBuilder::new()
        .with_name("Asha")
        .with_agent(agent.id)
        .with_type("buyer")
        .with_locations(&["Whitefield"])
        .build();
    let ravi = ClientBuilder::new().with_name("Ravi").with_agent(agent.id).build();
    let template = TemplateBuilder::new()
        .with_subject("Hi {{client_name}}")
        .with_body("{{agent_name}} has new {{property_type}} listings in {{preferred_locations}}.")
        .build();

    db.agent_repository().create(&agent).await.unwrap();
    db.client_repository().create(&asha).await.unwrap();
    db.client_repository().create(&ravi).await.unwrap();
    db.template_repository().create(&template).await.unwrap();

    let now = TestEnv::fixed_now();
    let task_for = |client_id: Uuid, offset: Duration| {
        FollowupTaskBuilder::new()
            .for_client(client_id)
            .with_template(template.id)
            .scheduled_for(now + offset)
            .build()
    };
    let to_asha = task_for(asha.id, -Duration::hours(2));
    let to_ravi = task_for(ravi.id, -Duration::hours(1));
    let later = task_for(asha.id, Duration::days(1));

    let tasks = db.followup_task_repository();
    for task in [&to_asha, &to_ravi, &later] {
        tasks.create(task).await.unwrap();
    }

    let channel = Channel {
        refuse_client: ravi.id,
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let endpoint = start_channel(channel.clone()).await;
    let sender = HttpMessageSender::new(&SenderConfig {
        endpoint,
        api_key: None,
        timeout_seconds: 5,
    })
    .unwrap();

    let dispatcher = FollowupDispatcher::new(
        db.followup_task_repository(),
        db.client_repository(),
        db.template_repository(),
        db.agent_repository(),
        Arc::new(sender),
        Arc::new(MetricsCollector::new().unwrap()),
        DispatcherSettings::default(),
    );

    let report = dispatcher.run_batch(now).await.unwrap();
    assert_eq!(report.due_count, 2);
    assert_eq!(report.processed_count, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains(&to_ravi.id.to_string()));
    assert!(report.errors[0].contains("mailbox full"));

    let sent = tasks.get_by_id(to_asha.id).await.unwrap().unwrap();
    assert_eq!(sent.status, FollowupStatus::Sent);
    assert_eq!(sent.sent_at, Some(now));
    let refused = tasks.get_by_id(to_ravi.id).await.unwrap().unwrap();
    assert_eq!(refused.status, FollowupStatus::Pending);
    assert!(refused.sent_at.is_none());
    let not_due = tasks.get_by_id(later.id).await.unwrap().unwrap();
    assert_eq!(not_due.status, FollowupStatus::Pending);

    {
        let received = channel.received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0]["subject"], "Hi Asha");
        assert_eq!(
            received[0]["body"],
            "Vikram has new buyer listings in Whitefield."
        );
        assert_eq!(received[0]["metadata"]["followup_id"], json!(to_asha.id));
    }

    // Only the refused task is retried.
    let report = dispatcher.run_batch(now + Duration::minutes(5)).await.unwrap();
    assert_eq!(report.processed_count, 0);
    assert_eq!(report.errors.len(), 1);

    let received = channel.received.lock().unwrap();
    assert_eq!(received.len(), 3);
    assert_eq!(received[2]["client_id"], json!(ravi.id));
}

#[tokio::test]
async fn test_malformed_row_does_not_stall_due_followups() {
    IntegrationTestSetup::init_logging();

    let db = DatabaseManager::in_memory().await.unwrap();
    let agent = AgentBuilder::new().with_name("Vikram").build();
    let client = ClientBuilder::new().with_name("Asha").with_agent(agent.id).build();
    let template = TemplateBuilder::new().with_subject("Hi {{client_name}}").build();
    db.agent_repository().create(&agent).await.unwrap();
    db.client_repository().create(&client).await.unwrap();
    db.template_repository().create(&template).await.unwrap();

    let now = TestEnv::fixed_now();
    let valid = FollowupTaskBuilder::new()
        .for_client(client.id)
        .with_template(template.id)
        .scheduled_for(now - Duration::hours(3))
        .build();
    let tasks = db.followup_task_repository();
    tasks.create(&valid).await.unwrap();

    let broken_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO followup_tasks \
             (id, client_id, template_id, trigger_type, scheduled_for, status, created_at) \
         VALUES (?, ?, ?, 'manual', ?, 'pending', 'garbage')",
    )
    .bind(broken_id.to_string())
    .bind(client.id.to_string())
    .bind(template.id.to_string())
    .bind("2025-03-14T08:00:00.000000Z")
    .execute(db.pool())
    .await
    .unwrap();

    let fractional_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO followup_tasks \
             (id, client_id, template_id, trigger_type, trigger_value, scheduled_for, status, created_at) \
         VALUES (?, ?, ?, 'no_response_days', 1.5, ?, 'pending', ?)",
    )
    .bind(fractional_id.to_string())
    .bind(client.id.to_string())
    .bind(template.id.to_string())
    .bind("2025-03-14T09:00:00.000000Z")
    .bind("2025-03-01T00:00:00.000000Z")
    .execute(db.pool())
    .await
    .unwrap();

    let channel = Channel {
        refuse_client: Uuid::nil(),
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let endpoint = start_channel(channel.clone()).await;
    let sender = HttpMessageSender::new(&SenderConfig {
        endpoint,
        api_key: None,
        timeout_seconds: 5,
    })
    .unwrap();
    let dispatcher = FollowupDispatcher::new(
        db.followup_task_repository(),
        db.client_repository(),
        db.template_repository(),
        db.agent_repository(),
        Arc::new(sender),
        Arc::new(MetricsCollector::new().unwrap()),
        DispatcherSettings::default(),
    );

    let report = dispatcher.run_batch(now).await.unwrap();
    assert_eq!(report.due_count, 3);
    assert_eq!(report.processed_count, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with(&format!("failed to load followup {broken_id}")));

    for id in [valid.id, fractional_id] {
        let stored = tasks.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, FollowupStatus::Sent);
    }
    let fractional = tasks.get_by_id(fractional_id).await.unwrap().unwrap();
    assert_eq!(fractional.trigger_value, Some(1.5));

    let (status,): (String,) = sqlx::query_as("SELECT status FROM followup_tasks WHERE id = ?")
        .bind(broken_id.to_string())
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(status, "pending");
    assert_eq!(channel.received.lock().unwrap().len(), 2);
}
