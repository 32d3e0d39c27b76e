//! Credential file export
//!
//! Issued API credentials are shown once and offered as a JSON download.
//! This writes the same pretty-printed artifact the portal produces.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::PortalError;
use crate::services::onboarding::CredentialsData;

pub const CREDENTIALS_FILE_NAME: &str = "asn-credentials.json";

/// Write credentials to the exact path given.
pub async fn write_credentials<P: AsRef<Path>>(
    credentials: &CredentialsData,
    path: P,
) -> Result<(), PortalError> {
    let content = serde_json::to_string_pretty(credentials)?;
    fs::write(path.as_ref(), content).await?;
    log::info!("Credentials exported to {}", path.as_ref().display());
    Ok(())
}

/// Write credentials into a directory under the standard download name and
/// return the resulting path.
pub async fn export_to_dir<P: AsRef<Path>>(
    credentials: &CredentialsData,
    dir: P,
) -> Result<PathBuf, PortalError> {
    let path = dir.as_ref().join(CREDENTIALS_FILE_NAME);
    write_credentials(credentials, &path).await?;
    Ok(path)
}
