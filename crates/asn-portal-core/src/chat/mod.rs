//! AI-chat widget backend
//!
//! The responder is a strategy seam: a configured deployment talks to the
//! external webhook, an unconfigured one runs the offline simulator, and a
//! misconfigured webhook (timeout, HTML payload, unreachable endpoint)
//! degrades to the simulator instead of surfacing a raw error. The transcript
//! lives here; rendering is someone else's problem.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::errors::PortalError;

pub mod demo;
pub mod webhook;

pub use demo::DemoResponder;
pub use webhook::WebhookResponder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Assistant,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: MessageSender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(sender: MessageSender, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content,
            timestamp: Utc::now(),
        }
    }
}

/// Produces an assistant reply for a user message.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn respond(&self, message: &str) -> Result<String, PortalError>;
}

/// Failures that degrade to the offline simulator rather than the user:
/// misconfiguration, unreachable network, or a missing endpoint.
fn should_fall_back(err: &PortalError) -> bool {
    match err {
        PortalError::Config(_) | PortalError::Transport(_) => true,
        PortalError::Api { status: 404, .. } => true,
        _ => false,
    }
}

const FALLBACK_NOTE: &str =
    "\n\n*Note: currently running in demo mode due to configuration issues. \
     Please check your AI service settings.*";

pub struct ChatService {
    webhook: Option<WebhookResponder>,
    demo: DemoResponder,
    messages: Vec<ChatMessage>,
}

impl ChatService {
    pub fn new(config: &ChatConfig) -> Self {
        let webhook = if config.is_configured() {
            Some(WebhookResponder::new(config.clone()))
        } else {
            None
        };
        Self {
            webhook,
            demo: DemoResponder::new(),
            messages: Vec::new(),
        }
    }

    /// Simulator-only service, regardless of configuration.
    pub fn offline() -> Self {
        Self {
            webhook: None,
            demo: DemoResponder::new(),
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Send a user message and append the reply to the transcript. The
    /// returned message is either the assistant reply or an error entry;
    /// only empty input is an outright error.
    pub async fn send_message(&mut self, content: &str) -> Result<ChatMessage, PortalError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(PortalError::Validation(
                "message must not be empty".to_string(),
            ));
        }
        self.messages
            .push(ChatMessage::new(MessageSender::User, content.to_string()));

        let reply = match &self.webhook {
            Some(webhook) => match webhook.respond(content).await {
                Ok(reply) => ChatMessage::new(MessageSender::Assistant, reply),
                Err(err) if should_fall_back(&err) => {
                    log::warn!("Webhook unusable ({}), degrading to demo responder", err);
                    let mut reply = self.demo.reply(content);
                    reply.push_str(FALLBACK_NOTE);
                    ChatMessage::new(MessageSender::Assistant, reply)
                }
                Err(err) => {
                    log::error!("Chat request failed: {}", err);
                    ChatMessage::new(
                        MessageSender::Error,
                        format!(
                            "Connection failed: {}. Please verify your configuration in settings.",
                            err
                        ),
                    )
                }
            },
            None => ChatMessage::new(MessageSender::Assistant, self.demo.reply(content)),
        };

        self.messages.push(reply.clone());
        Ok(reply)
    }

    /// Probe the webhook. Meaningful only when one is configured.
    pub async fn test_connection(&self) -> Result<(), PortalError> {
        match &self.webhook {
            Some(webhook) => webhook.respond("Connection test").await.map(|_| ()),
            None => Err(PortalError::Config(
                "no chat webhook is configured".to_string(),
            )),
        }
    }
}
