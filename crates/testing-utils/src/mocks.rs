//! Mock implementations for all repository, sender and metrics ports
//!
//! In-memory stand-ins that can be used for unit testing without a database
//! or an outbound message channel. Each mock is cheap to clone and clones
//! share state, so a test can keep a handle while the code under test owns
//! an `Arc<dyn Trait>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_domain::entities::{
    Agent, Client, EmailTemplate, FollowupStatus, FollowupTask, Lead, LeadStatus,
};
use leadflow_domain::messaging::{MessageSender, OutboundMessage, SendAck};
use leadflow_domain::services::PipelineMetrics;
use leadflow_domain::repositories::{
    AgentRepository, ClientRepository, DueFollowup, FollowupTaskRepository, LeadRepository,
    TemplateRepository,
};
use leadflow_errors::{LeadflowError, LeadflowResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Mock implementation of FollowupTaskRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockFollowupTaskRepository {
    tasks: Arc<Mutex<Vec<FollowupTask>>>,
    fail_list_due: Arc<AtomicBool>,
    fail_mark_sent: Arc<Mutex<HashSet<Uuid>>>,
    unreadable: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockFollowupTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<FollowupTask>) -> Self {
        let repo = Self::new();
        *repo.tasks.lock().unwrap() = tasks;
        repo
    }

    /// Makes `list_due` behave like an unreachable store.
    pub fn fail_list_due(&self) {
        self.fail_list_due.store(true, Ordering::SeqCst);
    }

    /// Makes the status write for one task fail after its send went out.
    pub fn fail_mark_sent_for(&self, id: Uuid) {
        self.fail_mark_sent.lock().unwrap().insert(id);
    }

    pub fn get(&self, id: Uuid) -> Option<FollowupTask> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Adds a due row the store cannot decode; it is listed after the
    /// readable tasks.
    pub fn add_unreadable(&self, id: &str, reason: &str) {
        self.unreadable
            .lock()
            .unwrap()
            .push((id.to_string(), reason.to_string()));
    }
}

#[async_trait]
impl FollowupTaskRepository for MockFollowupTaskRepository {
    async fn create(&self, task: &FollowupTask) -> LeadflowResult<FollowupTask> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<FollowupTask>> {
        Ok(self.get(id))
    }

    async fn list_due(&self, now: DateTime<Utc>) -> LeadflowResult<Vec<DueFollowup>> {
        if self.fail_list_due.load(Ordering::SeqCst) {
            return Err(LeadflowError::database_error("task store unreachable"));
        }

        let mut due: Vec<FollowupTask> = self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|t| t.scheduled_for);

        let mut listed: Vec<DueFollowup> = due.into_iter().map(DueFollowup::Ready).collect();
        listed.extend(
            self.unreadable
                .lock()
                .unwrap()
                .iter()
                .map(|(id, reason)| DueFollowup::Unreadable {
                    id: id.clone(),
                    reason: reason.clone(),
                }),
        );
        Ok(listed)
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> LeadflowResult<()> {
        if self.fail_mark_sent.lock().unwrap().contains(&id) {
            return Err(LeadflowError::database_error("status write rejected"));
        }

        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| LeadflowError::followup_not_found(id))?;

        if task.status != FollowupStatus::Pending {
            return Err(LeadflowError::FollowupAlreadyDispatched { id });
        }

        task.status = FollowupStatus::Sent;
        task.sent_at = Some(sent_at);
        Ok(())
    }
}

/// Mock implementation of ClientRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockClientRepository {
    clients: Arc<Mutex<HashMap<Uuid, Client>>>,
    fail_get: Arc<Mutex<HashSet<Uuid>>>,
}

impl MockClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(clients: Vec<Client>) -> Self {
        let repo = Self::new();
        repo.clients
            .lock()
            .unwrap()
            .extend(clients.into_iter().map(|c| (c.id, c)));
        repo
    }

    /// Makes `get_by_id` fail for `id`.
    pub fn fail_get_for(&self, id: Uuid) {
        self.fail_get.lock().unwrap().insert(id);
    }

    pub fn remove(&self, id: Uuid) {
        self.clients.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl ClientRepository for MockClientRepository {
    async fn create(&self, client: &Client) -> LeadflowResult<Client> {
        self.clients
            .lock()
            .unwrap()
            .insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Client>> {
        if self.fail_get.lock().unwrap().contains(&id) {
            return Err(LeadflowError::database_error("client store unreachable"));
        }
        Ok(self.clients.lock().unwrap().get(&id).cloned())
    }
}

/// Mock implementation of TemplateRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockTemplateRepository {
    templates: Arc<Mutex<HashMap<Uuid, EmailTemplate>>>,
    fail_get: Arc<Mutex<HashSet<Uuid>>>,
}

impl MockTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: Vec<EmailTemplate>) -> Self {
        let repo = Self::new();
        repo.templates
            .lock()
            .unwrap()
            .extend(templates.into_iter().map(|t| (t.id, t)));
        repo
    }

    /// Makes `get_by_id` fail for `id`.
    pub fn fail_get_for(&self, id: Uuid) {
        self.fail_get.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl TemplateRepository for MockTemplateRepository {
    async fn create(&self, template: &EmailTemplate) -> LeadflowResult<EmailTemplate> {
        self.templates
            .lock()
            .unwrap()
            .insert(template.id, template.clone());
        Ok(template.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<EmailTemplate>> {
        if self.fail_get.lock().unwrap().contains(&id) {
            return Err(LeadflowError::database_error("template store unreachable"));
        }
        Ok(self.templates.lock().unwrap().get(&id).cloned())
    }
}

/// Mock implementation of AgentRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockAgentRepository {
    agents: Arc<Mutex<HashMap<Uuid, Agent>>>,
    fail_get: Arc<Mutex<HashSet<Uuid>>>,
}

impl MockAgentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: Vec<Agent>) -> Self {
        let repo = Self::new();
        repo.agents
            .lock()
            .unwrap()
            .extend(agents.into_iter().map(|a| (a.id, a)));
        repo
    }

    /// Makes `get_by_id` fail for `id`.
    pub fn fail_get_for(&self, id: Uuid) {
        self.fail_get.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl AgentRepository for MockAgentRepository {
    async fn create(&self, agent: &Agent) -> LeadflowResult<Agent> {
        self.agents.lock().unwrap().insert(agent.id, agent.clone());
        Ok(agent.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Agent>> {
        if self.fail_get.lock().unwrap().contains(&id) {
            return Err(LeadflowError::database_error("agent store unreachable"));
        }
        Ok(self.agents.lock().unwrap().get(&id).cloned())
    }
}

/// Mock implementation of LeadRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockLeadRepository {
    leads: Arc<Mutex<Vec<Lead>>>,
    status_writes: Arc<AtomicUsize>,
}

impl MockLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        let repo = Self::new();
        *repo.leads.lock().unwrap() = leads;
        repo
    }

    pub fn get(&self, id: Uuid) -> Option<Lead> {
        self.leads
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadRepository for MockLeadRepository {
    async fn create(&self, lead: &Lead) -> LeadflowResult<Lead> {
        self.leads.lock().unwrap().push(lead.clone());
        Ok(lead.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Lead>> {
        Ok(self.get(id))
    }

    async fn list(&self) -> LeadflowResult<Vec<Lead>> {
        let mut leads = self.leads.lock().unwrap().clone();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: &LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> LeadflowResult<Lead> {
        let mut leads = self.leads.lock().unwrap();
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| LeadflowError::lead_not_found(id))?;
        lead.status = status.clone();
        lead.updated_at = updated_at;
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(lead.clone())
    }
}

/// Recording message channel. Sends succeed unless the client was set up
/// to error (`fail_for`) or to be refused by the channel (`reject_for`).
#[derive(Debug, Clone, Default)]
pub struct MockMessageSender {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failing_clients: Arc<Mutex<HashSet<Uuid>>>,
    rejecting_clients: Arc<Mutex<HashSet<Uuid>>>,
    calls: Arc<AtomicUsize>,
}

impl MockMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, client_id: Uuid) {
        self.failing_clients.lock().unwrap().insert(client_id);
    }

    pub fn reject_for(&self, client_id: Uuid) {
        self.rejecting_clients.lock().unwrap().insert(client_id);
    }

    /// Messages the channel accepted, in send order.
    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Every call, including refused and errored ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSender for MockMessageSender {
    async fn send(&self, message: &OutboundMessage) -> LeadflowResult<SendAck> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self
            .failing_clients
            .lock()
            .unwrap()
            .contains(&message.client_id)
        {
            return Err(LeadflowError::network_error("connection reset by peer"));
        }

        if self
            .rejecting_clients
            .lock()
            .unwrap()
            .contains(&message.client_id)
        {
            return Ok(SendAck::rejected("mailbox unavailable"));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(SendAck::delivered(format!("mock-{}", sent.len())))
    }
}

/// Counts pipeline metric calls.
#[derive(Debug, Clone, Default)]
pub struct MockPipelineMetrics {
    leads_advanced: Arc<AtomicUsize>,
}

impl MockPipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leads_advanced(&self) -> usize {
        self.leads_advanced.load(Ordering::SeqCst)
    }
}

impl PipelineMetrics for MockPipelineMetrics {
    fn record_lead_advanced(&self) {
        self.leads_advanced.fetch_add(1, Ordering::SeqCst);
    }
}
