use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a string-backed enum whose unrecognised values are kept verbatim in
/// an `Unknown` variant, so rows written by newer code never fail to load.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Unknown(raw) => raw.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($text => $name::$variant,)+
                    other => $name::Unknown(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Sales funnel position of a lead.
    pub enum LeadStatus {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Negotiation => "negotiation",
        Converted => "converted",
        Closed => "closed",
    }
}

string_enum! {
    pub enum LeadSource {
        Website => "website",
        Referral => "referral",
        SocialMedia => "social_media",
        Advertisement => "advertisement",
        ColdCall => "cold_call",
        Other => "other",
    }
}

string_enum! {
    /// Lifecycle of a scheduled follow-up. The dispatcher only ever moves
    /// `Pending` to `Sent`; `Failed` and `Cancelled` are written by other tools.
    pub enum FollowupStatus {
        Pending => "pending",
        Sent => "sent",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// Why a follow-up was scheduled. Tags outside this list (e.g. `no_response_7d`)
    /// are carried through unchanged as `Unknown`.
    pub enum TriggerType {
        NoResponse => "no_response",
        LeadCreated => "lead_created",
        PropertyViewing => "property_viewing",
        MeetingCompleted => "meeting_completed",
        Manual => "manual",
    }
}

impl Default for LeadStatus {
    fn default() -> Self {
        LeadStatus::New
    }
}

impl Default for LeadSource {
    fn default() -> Self {
        LeadSource::Other
    }
}

impl Default for FollowupStatus {
    fn default() -> Self {
        FollowupStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub interest_type: Option<String>,
    pub budget: Option<f64>,
    pub assigned_agent_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(full_name: impl Into<String>, source: LeadSource) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            email: None,
            phone: None,
            source,
            status: LeadStatus::New,
            interest_type: None,
            budget: None,
            assigned_agent_id: None,
            property_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowupTask {
    pub id: Uuid,
    /// `None` when the row was created without a client; handled like a deleted client.
    pub client_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub trigger_type: TriggerType,
    pub trigger_value: Option<f64>,
    pub scheduled_for: DateTime<Utc>,
    pub status: FollowupStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FollowupTask {
    pub fn new(
        client_id: Uuid,
        template_id: Uuid,
        trigger_type: TriggerType,
        scheduled_for: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id: Some(client_id),
            template_id: Some(template_id),
            trigger_type,
            trigger_value: None,
            scheduled_for,
            status: FollowupStatus::Pending,
            sent_at: None,
            created_at: Utc::now(),
        }
    }

    /// Eligible for dispatch: still pending and due at or before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == FollowupStatus::Pending && self.scheduled_for <= now
    }

    pub fn is_terminal(&self) -> bool {
        self.status == FollowupStatus::Sent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub agent_id: Option<Uuid>,
    pub client_type: Option<String>,
    pub preferred_locations: Vec<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
}

/// Agent profile; resolved through a client's agent reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_keeps_unknown_values() {
        assert_eq!(LeadStatus::from("negotiation"), LeadStatus::Negotiation);
        assert_eq!(
            LeadStatus::from("on_hold"),
            LeadStatus::Unknown("on_hold".to_string())
        );
        assert_eq!(LeadStatus::from("on_hold").as_str(), "on_hold");
        assert!(!LeadStatus::from("on_hold").is_known());
        assert_eq!(LeadSource::from("cold_call"), LeadSource::ColdCall);
        assert_eq!(
            TriggerType::from("no_response_7d").to_string(),
            "no_response_7d"
        );
    }

    #[test]
    fn test_enums_serialize_as_plain_strings() {
        let json = serde_json::to_string(&LeadSource::SocialMedia).unwrap();
        assert_eq!(json, "\"social_media\"");

        let status: FollowupStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, FollowupStatus::Cancelled);

        let odd: LeadStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(serde_json::to_string(&odd).unwrap(), "\"archived\"");
    }

    #[test]
    fn test_followup_is_due() {
        let now = Utc::now();
        let mut task = FollowupTask::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            TriggerType::NoResponse,
            now,
        );
        assert!(task.is_due(now));
        assert!(!task.is_due(now - chrono::Duration::seconds(1)));

        task.status = FollowupStatus::Sent;
        assert!(!task.is_due(now));
        assert!(task.is_terminal());
    }
}
