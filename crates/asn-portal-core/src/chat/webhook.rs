//! Webhook-backed chat responder
//!
//! POSTs the portal's chat payload to a user-configured endpoint with a
//! fixed timeout. An HTML payload in the reply is the signature of a hosting
//! misconfiguration (the static site answering instead of the webhook) and is
//! classified as a configuration failure so the service can degrade to the
//! simulator.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

use crate::chat::ChatResponder;
use crate::config::ChatConfig;
use crate::errors::PortalError;

const CHAT_CONTEXT: &str = "asn_implementation_expert";
const USER_ID_PREFIX: &str = "taxgenie-expert-user";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    message: &'a str,
    user_id: String,
    context: &'static str,
    timestamp: String,
}

/// Detects the "static hosting answered instead of the webhook" case.
fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with("<!DOCTYPE html>")
        || head.starts_with("<!doctype html>")
        || head.starts_with("<html")
}

/// Pull the reply text out of whatever shape the webhook returned: a JSON
/// object with a known field, a JSON string, or plain text.
fn extract_content(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["response", "output", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
        if let Some(text) = value.as_str() {
            return text.to_string();
        }
        return value.to_string();
    }
    body.to_string()
}

pub struct WebhookResponder {
    config: ChatConfig,
    client: Client,
}

impl WebhookResponder {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// The auth header setting is either a full `Name: value` pair or a bare
    /// value for the `Authorization` header.
    fn auth_header(&self) -> Option<(String, String)> {
        let raw = self.config.auth_header.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
                Some((name.trim().to_string(), value.trim().to_string()))
            }
            _ => Some(("Authorization".to_string(), raw.to_string())),
        }
    }
}

#[async_trait]
impl ChatResponder for WebhookResponder {
    async fn respond(&self, message: &str) -> Result<String, PortalError> {
        let request = WebhookRequest {
            message,
            user_id: format!("{}-{}", USER_ID_PREFIX, Utc::now().timestamp_millis()),
            context: CHAT_CONTEXT,
            timestamp: Utc::now().to_rfc3339(),
        };

        let mut builder = self
            .client
            .post(&self.config.webhook_url)
            .timeout(self.config.timeout())
            .json(&request);
        if let Some((name, value)) = self.auth_header() {
            builder = builder.header(name, value);
        }

        log::debug!(
            "Sending chat message to webhook {}",
            self.config.webhook_url
        );
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                PortalError::Config(format!(
                    "webhook did not answer within {}s",
                    self.config.timeout_secs
                ))
            } else if e.is_connect() {
                PortalError::Config(format!("webhook endpoint is unreachable: {}", e))
            } else {
                PortalError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(PortalError::from)?;

        if looks_like_html(&body) {
            return Err(PortalError::Config(
                "webhook returned an HTML page; the endpoint is not configured for API traffic"
                    .to_string(),
            ));
        }
        if status.as_u16() == 404 {
            return Err(PortalError::Api {
                status: 404,
                message: "chat endpoint not found; verify the webhook URL".to_string(),
            });
        }
        if !status.is_success() {
            if status.is_client_error() {
                return Err(PortalError::Api {
                    status: status.as_u16(),
                    message: extract_content(&body),
                });
            }
            return Err(PortalError::ServerError {
                status: status.as_u16(),
            });
        }

        Ok(extract_content(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_payloads_are_detected() {
        assert!(looks_like_html("<!DOCTYPE html><html><head>"));
        assert!(looks_like_html("  <html lang=\"en\">"));
        assert!(!looks_like_html("{\"response\":\"hi\"}"));
        assert!(!looks_like_html("plain text reply"));
    }

    #[test]
    fn content_extraction_handles_known_shapes() {
        assert_eq!(extract_content(r#"{"response":"from response"}"#), "from response");
        assert_eq!(extract_content(r#"{"output":"from output"}"#), "from output");
        assert_eq!(extract_content(r#"{"message":"from message"}"#), "from message");
        assert_eq!(extract_content(r#""bare json string""#), "bare json string");
        assert_eq!(extract_content("plain text"), "plain text");
    }

    #[test]
    fn auth_header_accepts_pairs_and_bare_values() {
        let mut config = ChatConfig::default();
        config.webhook_url = "https://example.com/webhook".into();

        config.auth_header = "X-Api-Key: abc123".into();
        let responder = WebhookResponder::new(config.clone());
        assert_eq!(
            responder.auth_header(),
            Some(("X-Api-Key".into(), "abc123".into()))
        );

        config.auth_header = "Bearer abc123".into();
        let responder = WebhookResponder::new(config.clone());
        assert_eq!(
            responder.auth_header(),
            Some(("Authorization".into(), "Bearer abc123".into()))
        );

        config.auth_header = String::new();
        let responder = WebhookResponder::new(config);
        assert_eq!(responder.auth_header(), None);
    }
}
