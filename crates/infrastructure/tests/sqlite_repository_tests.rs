use anyhow::Result;
use chrono::Duration;
use leadflow_domain::entities::{FollowupStatus, LeadSource, LeadStatus, TriggerType};
use leadflow_domain::repositories::*;
use leadflow_errors::LeadflowError;
use leadflow_infrastructure::DatabaseManager;
use leadflow_testing_utils::{
    AgentBuilder, ClientBuilder, FollowupTaskBuilder, LeadBuilder, TemplateBuilder, TestEnv,
};
use uuid::Uuid;

#[tokio::test]
async fn test_followup_round_trip_keeps_unknown_trigger() -> Result<()> {
    let db = DatabaseManager::in_memory().await?;
    let tasks = db.followup_task_repository();

    let now = TestEnv::fixed_now();
    let task = FollowupTaskBuilder::new()
        .with_trigger(TriggerType::from("no_response_7d"), Some(1.5))
        .scheduled_for(now)
        .build();
    tasks.create(&task).await?;

    let loaded = tasks.get_by_id(task.id).await?.expect("task stored");
    assert_eq!(loaded.trigger_type.as_str(), "no_response_7d");
    assert_eq!(loaded.trigger_value, Some(1.5));
    assert_eq!(loaded.scheduled_for, now);
    assert_eq!(loaded.status, FollowupStatus::Pending);
    assert!(loaded.client_id.is_none());
    assert!(tasks.get_by_id(Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_list_due_filters_and_orders() -> Result<()> {
    let db = DatabaseManager::in_memory().await?;
    let tasks = db.followup_task_repository();
    let now = TestEnv::fixed_now();

    let late = FollowupTaskBuilder::new()
        .scheduled_for(now - Duration::minutes(5))
        .build();
    let early = FollowupTaskBuilder::new()
        .scheduled_for(now - Duration::days(2))
        .build();
    let exactly_now = FollowupTaskBuilder::new().scheduled_for(now).build();
    let future = FollowupTaskBuilder::new()
        .scheduled_for(now + Duration::seconds(1))
        .build();
    let already_sent = FollowupTaskBuilder::new()
        .scheduled_for(now - Duration::days(3))
        .sent_at(now - Duration::days(3))
        .build();
    let cancelled = FollowupTaskBuilder::new()
        .scheduled_for(now - Duration::days(1))
        .with_status(FollowupStatus::Cancelled)
        .build();

    for task in [&late, &early, &exactly_now, &future, &already_sent, &cancelled] {
        tasks.create(task).await?;
    }

    let due: Vec<Uuid> = tasks
        .list_due(now)
        .await?
        .into_iter()
        .filter_map(DueFollowup::into_task)
        .map(|t| t.id)
        .collect();
    assert_eq!(due, vec![early.id, late.id, exactly_now.id]);
    Ok(())
}

#[tokio::test]
async fn test_list_due_reports_malformed_rows_individually() -> Result<()> {
    let db = DatabaseManager::in_memory().await?;
    let tasks = db.followup_task_repository();
    let now = TestEnv::fixed_now();

    let valid = FollowupTaskBuilder::new()
        .scheduled_for(now - Duration::hours(2))
        .build();
    tasks.create(&valid).await?;

    let broken_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO followup_tasks (id, trigger_type, scheduled_for, status, created_at) \
         VALUES (?, 'manual', ?, 'pending', 'garbage')",
    )
    .bind(&broken_id)
    .bind("2024-01-15T09:00:00.000000Z")
    .execute(db.pool())
    .await?;
    // Integer literal, as schemas with an INTEGER column stored it.
    sqlx::query(
        "INSERT INTO followup_tasks (id, trigger_type, trigger_value, scheduled_for, status, created_at) \
         VALUES (?, 'no_response_7d', 7, ?, 'pending', ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind("2024-01-15T10:00:00.000000Z")
    .bind("2024-01-01T00:00:00.000000Z")
    .execute(db.pool())
    .await?;

    let due = tasks.list_due(now).await?;
    assert_eq!(due.len(), 3);

    let unreadable: Vec<&DueFollowup> = due
        .iter()
        .filter(|entry| matches!(entry, DueFollowup::Unreadable { .. }))
        .collect();
    assert_eq!(unreadable.len(), 1);
    assert!(matches!(
        unreadable[0],
        DueFollowup::Unreadable { id, reason } if *id == broken_id && reason.contains("created_at")
    ));

    let ready: Vec<_> = due.into_iter().filter_map(DueFollowup::into_task).collect();
    assert_eq!(ready.len(), 2);
    assert!(ready.iter().any(|t| t.id == valid.id));
    assert!(ready.iter().any(|t| t.trigger_value == Some(7.0)));
    Ok(())
}

#[tokio::test]
async fn test_mark_sent_is_conditional() -> Result<()> {
    let db = DatabaseManager::in_memory().await?;
    let tasks = db.followup_task_repository();
    let now = TestEnv::fixed_now();

    let task = FollowupTaskBuilder::new()
        .scheduled_for(now - Duration::hours(1))
        .build();
    tasks.create(&task).await?;

    tasks.mark_sent(task.id, now).await?;
    let stored = tasks.get_by_id(task.id).await?.expect("task stored");
    assert_eq!(stored.status, FollowupStatus::Sent);
    assert_eq!(stored.sent_at, Some(now));
    assert!(tasks.list_due(now).await?.is_empty());

    let second = tasks.mark_sent(task.id, now + Duration::minutes(1)).await;
    assert!(matches!(
        second,
        Err(LeadflowError::FollowupAlreadyDispatched { id }) if id == task.id
    ));
    let stored = tasks.get_by_id(task.id).await?.expect("task stored");
    assert_eq!(stored.sent_at, Some(now));

    let missing = tasks.mark_sent(Uuid::new_v4(), now).await;
    assert!(matches!(missing, Err(LeadflowError::FollowupNotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn test_client_agent_template_lookup() -> Result<()> {
    let db = DatabaseManager::in_memory().await?;
    let agents = db.agent_repository();
    let clients = db.client_repository();
    let templates = db.template_repository();

    let agent = AgentBuilder::new()
        .with_name("Vikram")
        .with_contact(Some("+91 98450 00000"), None)
        .build();
    agents.create(&agent).await?;

    let client = ClientBuilder::new()
        .with_name("Asha")
        .with_agent(agent.id)
        .with_type("buyer")
        .with_locations(&["Indiranagar", "Koramangala"])
        .with_budget(Some(5_000_000.0), Some(7_500_000.0))
        .build();
    clients.create(&client).await?;

    let template = TemplateBuilder::new().with_subject("Hi {{client_name}}").build();
    templates.create(&template).await?;

    assert_eq!(clients.get_by_id(client.id).await?, Some(client.clone()));
    assert_eq!(agents.get_by_id(agent.id).await?, Some(agent));
    assert_eq!(templates.get_by_id(template.id).await?, Some(template));
    assert!(clients.get_by_id(Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_deleted_client_detaches_followup() -> Result<()> {
    let db = DatabaseManager::in_memory().await?;
    let clients = db.client_repository();
    let templates = db.template_repository();
    let tasks = db.followup_task_repository();

    let client = ClientBuilder::new().build();
    let template = TemplateBuilder::new().build();
    clients.create(&client).await?;
    templates.create(&template).await?;

    let task = FollowupTaskBuilder::new()
        .for_client(client.id)
        .with_template(template.id)
        .scheduled_for(TestEnv::fixed_now())
        .build();
    tasks.create(&task).await?;

    sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(client.id.to_string())
        .execute(db.pool())
        .await?;

    let stored = tasks.get_by_id(task.id).await?.expect("task kept");
    assert!(stored.client_id.is_none());
    assert_eq!(stored.template_id, Some(template.id));
    assert_eq!(stored.status, FollowupStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn test_lead_list_and_status_update() -> Result<()> {
    let db = DatabaseManager::in_memory().await?;
    let leads = db.lead_repository();
    let now = TestEnv::fixed_now();

    let older = LeadBuilder::new()
        .with_name("Ravi")
        .with_source(LeadSource::Referral)
        .created_at(now - Duration::days(1))
        .build();
    let newer = LeadBuilder::new()
        .with_name("Asha")
        .with_email("asha@example.com")
        .with_status(LeadStatus::from("on_hold"))
        .created_at(now)
        .build();
    leads.create(&older).await?;
    leads.create(&newer).await?;

    let listed = leads.list().await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newer.id);
    assert_eq!(listed[0].status, LeadStatus::Unknown("on_hold".to_string()));
    assert_eq!(listed[1].source, LeadSource::Referral);

    let later = now + Duration::hours(2);
    let updated = leads
        .update_status(older.id, &LeadStatus::Contacted, later)
        .await?;
    assert_eq!(updated.status, LeadStatus::Contacted);
    assert_eq!(updated.updated_at, later);
    assert_eq!(updated.created_at, older.created_at);

    let missing = leads
        .update_status(Uuid::new_v4(), &LeadStatus::Closed, later)
        .await;
    assert!(matches!(missing, Err(LeadflowError::LeadNotFound { .. })));
    Ok(())
}
