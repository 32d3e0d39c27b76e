//! Configuration type definitions for the portal client
//!
//! Layered configuration with defaults that match the hosted portal: a
//! minimal file only needs the backend base URL; the chat webhook and session
//! snapshot sections are optional and progressively enhance the client.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::PortalError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PortalConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// AI-chat webhook settings. When disabled (or the URL is blank) the chat
/// service runs entirely on the offline simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default)]
    pub auth_header: String,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: String::new(),
            auth_header: String::new(),
            timeout_secs: default_chat_timeout(),
        }
    }
}

impl ChatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.enabled && !self.webhook_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// JSON snapshot file for reload-resume; volatile session when absent.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_chat_timeout() -> u64 {
    30
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl PortalConfig {
    pub fn validate(&self) -> Result<(), PortalError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(PortalError::Config(
                "backend.base_url must be set".to_string(),
            ));
        }
        if !is_http_url(&self.backend.base_url) {
            return Err(PortalError::Config(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(PortalError::Config(
                "backend.timeout_secs must be positive".to_string(),
            ));
        }
        if self.chat.enabled {
            if self.chat.webhook_url.trim().is_empty() {
                return Err(PortalError::Config(
                    "chat.webhook_url must be set when chat is enabled".to_string(),
                ));
            }
            if !is_http_url(&self.chat.webhook_url) {
                return Err(PortalError::Config(format!(
                    "chat.webhook_url must be an http(s) URL, got '{}'",
                    self.chat.webhook_url
                )));
            }
            if !(5..=120).contains(&self.chat.timeout_secs) {
                return Err(PortalError::Config(
                    "chat.timeout_secs must be between 5 and 120".to_string(),
                ));
            }
        }
        Ok(())
    }
}
