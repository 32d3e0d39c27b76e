//! Configuration loading with environment-variable resolution
//!
//! Loads the YAML portal configuration from a file and expands `${VAR}`
//! references before validation, so secrets such as the webhook auth header
//! never need to live in the file itself.

use std::env;
use std::path::Path;

use regex::Regex;
use tokio::fs;

use crate::config::types::PortalConfig;
use crate::errors::PortalError;

pub struct ConfigLoader;

impl ConfigLoader {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<PortalConfig, PortalError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            PortalError::Config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<PortalConfig, PortalError> {
        let expanded = Self::resolve_environment(content)?;
        let config: PortalConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| PortalError::Config(format!("failed to parse YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Expand `${VAR}` references from the process environment. An unset
    /// variable is a hard error rather than a silent empty string.
    fn resolve_environment(content: &str) -> Result<String, PortalError> {
        let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .expect("environment reference pattern is valid");

        let mut result = String::with_capacity(content.len());
        let mut last_end = 0;
        for captures in pattern.captures_iter(content) {
            let whole = captures.get(0).expect("capture 0 always present");
            let name = &captures[1];
            let value = env::var(name).map_err(|_| {
                PortalError::Config(format!(
                    "config references unset environment variable '{}'",
                    name
                ))
            })?;
            result.push_str(&content[last_end..whole.start()]);
            result.push_str(&value);
            last_end = whole.end();
        }
        result.push_str(&content[last_end..]);
        Ok(result)
    }
}
