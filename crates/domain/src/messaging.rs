use async_trait::async_trait;
use leadflow_errors::LeadflowResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::TriggerType;

/// Audit data attached to every outbound follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMetadata {
    pub followup_id: Uuid,
    pub trigger_type: TriggerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub client_id: Uuid,
    pub subject: String,
    pub body: String,
    pub metadata: SendMetadata,
}

/// What the channel said about a send it accepted the request for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendAck {
    pub delivered: bool,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SendAck {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            delivered: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// External "send a message to a client" channel.
///
/// At-least-once, not idempotent: callers must not assume a repeated send is
/// deduplicated. `Err` means the call itself failed; `Ok` with
/// `delivered == false` means the channel answered and refused.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> LeadflowResult<SendAck>;
}
