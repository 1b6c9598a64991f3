use std::time::Duration;

use async_trait::async_trait;
use leadflow_config::SenderConfig;
use leadflow_domain::messaging::{MessageSender, OutboundMessage, SendAck};
use leadflow_errors::{LeadflowError, LeadflowResult};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Body returned by the outbound message function. Every field is optional;
/// an empty 2xx body counts as accepted.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ChannelResponse {
    success: bool,
    #[serde(alias = "id")]
    message_id: Option<String>,
    error: Option<String>,
}

impl Default for ChannelResponse {
    fn default() -> Self {
        Self {
            success: true,
            message_id: None,
            error: None,
        }
    }
}

/// Sends follow-ups by POSTing them as JSON to an HTTP message function.
pub struct HttpMessageSender {
    endpoint: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpMessageSender {
    pub fn new(config: &SenderConfig) -> LeadflowResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LeadflowError::config_error(format!("invalid sender client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MessageSender for HttpMessageSender {
    #[instrument(skip(self, message), fields(
        client.id = %message.client_id,
        followup.id = %message.metadata.followup_id,
    ))]
    async fn send(&self, message: &OutboundMessage) -> LeadflowResult<SendAck> {
        let mut request = self.http_client.post(&self.endpoint).json(message);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to reach message channel: {}", e);
                return Err(LeadflowError::network_error(format!(
                    "message channel unreachable: {e}"
                )));
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!("Message channel returned HTTP {}: {}", status, body);
            return Err(LeadflowError::send_error(format!("HTTP {status} - {body}")));
        }

        let parsed = if body.trim().is_empty() {
            ChannelResponse::default()
        } else {
            match serde_json::from_str::<ChannelResponse>(&body) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("Unparseable channel response treated as accepted: {}", e);
                    ChannelResponse::default()
                }
            }
        };

        if parsed.success && parsed.error.is_none() {
            debug!("Message accepted by channel");
            Ok(SendAck {
                delivered: true,
                message_id: parsed.message_id,
                error: None,
            })
        } else {
            let reason = parsed
                .error
                .unwrap_or_else(|| "channel reported failure".to_string());
            Ok(SendAck::rejected(reason))
        }
    }
}
