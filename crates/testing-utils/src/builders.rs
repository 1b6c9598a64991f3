//! Test data builders for creating test entities
//!
//! Builder patterns for creating test data with sensible defaults and easy
//! customization.

use chrono::{DateTime, Utc};
use leadflow_domain::entities::{
    Agent, Client, EmailTemplate, FollowupStatus, FollowupTask, Lead, LeadSource, LeadStatus,
    TriggerType,
};
use uuid::Uuid;

/// Builder for creating test Lead entities
pub struct LeadBuilder {
    lead: Lead,
}

impl LeadBuilder {
    pub fn new() -> Self {
        Self {
            lead: Lead::new("Test Lead", LeadSource::Website),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.lead.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.lead.full_name = name.to_string();
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.lead.email = Some(email.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.lead.phone = Some(phone.to_string());
        self
    }

    pub fn with_source(mut self, source: LeadSource) -> Self {
        self.lead.source = source;
        self
    }

    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.lead.status = status;
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.lead.budget = Some(budget);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.lead.created_at = created_at;
        self.lead.updated_at = created_at;
        self
    }

    pub fn build(self) -> Lead {
        self.lead
    }
}

impl Default for LeadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test FollowupTask entities
pub struct FollowupTaskBuilder {
    task: FollowupTask,
}

impl FollowupTaskBuilder {
    pub fn new() -> Self {
        Self {
            task: FollowupTask {
                id: Uuid::new_v4(),
                client_id: None,
                template_id: None,
                trigger_type: TriggerType::NoResponse,
                trigger_value: Some(7.0),
                scheduled_for: Utc::now(),
                status: FollowupStatus::Pending,
                sent_at: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.task.id = id;
        self
    }

    pub fn for_client(mut self, client_id: Uuid) -> Self {
        self.task.client_id = Some(client_id);
        self
    }

    pub fn with_template(mut self, template_id: Uuid) -> Self {
        self.task.template_id = Some(template_id);
        self
    }

    pub fn with_trigger(mut self, trigger_type: TriggerType, trigger_value: Option<f64>) -> Self {
        self.task.trigger_type = trigger_type;
        self.task.trigger_value = trigger_value;
        self
    }

    pub fn scheduled_for(mut self, scheduled_for: DateTime<Utc>) -> Self {
        self.task.scheduled_for = scheduled_for;
        self
    }

    pub fn sent_at(mut self, sent_at: DateTime<Utc>) -> Self {
        self.task.status = FollowupStatus::Sent;
        self.task.sent_at = Some(sent_at);
        self
    }

    pub fn with_status(mut self, status: FollowupStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn build(self) -> FollowupTask {
        self.task
    }
}

impl Default for FollowupTaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Client entities
pub struct ClientBuilder {
    client: Client,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            client: Client {
                id: Uuid::new_v4(),
                full_name: "Test Client".to_string(),
                email: Some("client@example.com".to_string()),
                agent_id: None,
                client_type: None,
                preferred_locations: Vec::new(),
                budget_min: None,
                budget_max: None,
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.client.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.client.full_name = name.to_string();
        self
    }

    pub fn with_agent(mut self, agent_id: Uuid) -> Self {
        self.client.agent_id = Some(agent_id);
        self
    }

    pub fn with_type(mut self, client_type: &str) -> Self {
        self.client.client_type = Some(client_type.to_string());
        self
    }

    pub fn with_locations(mut self, locations: &[&str]) -> Self {
        self.client.preferred_locations = locations.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_budget(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.client.budget_min = min;
        self.client.budget_max = max;
        self
    }

    pub fn build(self) -> Client {
        self.client
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test EmailTemplate entities
pub struct TemplateBuilder {
    template: EmailTemplate,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            template: EmailTemplate {
                id: Uuid::new_v4(),
                name: "test_template".to_string(),
                subject: "Hi {{client_name}}".to_string(),
                body: "Your agent {{agent_name}} will be in touch.".to_string(),
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.template.id = id;
        self
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.template.subject = subject.to_string();
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.template.body = body.to_string();
        self
    }

    pub fn build(self) -> EmailTemplate {
        self.template
    }
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Agent entities
pub struct AgentBuilder {
    agent: Agent,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            agent: Agent {
                id: Uuid::new_v4(),
                full_name: "Test Agent".to_string(),
                phone: Some("+91 90000 00000".to_string()),
                email: Some("agent@example.com".to_string()),
            },
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.agent.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.agent.full_name = name.to_string();
        self
    }

    pub fn with_contact(mut self, phone: Option<&str>, email: Option<&str>) -> Self {
        self.agent.phone = phone.map(str::to_string);
        self.agent.email = email.map(str::to_string);
        self
    }

    pub fn build(self) -> Agent {
        self.agent
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
