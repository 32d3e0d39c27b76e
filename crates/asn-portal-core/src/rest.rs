//! Uniform REST request builder for the portal backend
//!
//! All domain services go through this client: it joins path fragments onto
//! the configured base URL, injects the bearer token from the session store,
//! scopes non-auth calls to the selected OEM via the `X-OEM-ID` header, and
//! maps HTTP failures onto the flat error taxonomy. A 401 forces a logout by
//! clearing the session before the error is surfaced.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::PortalError;
use crate::session::SessionStore;

pub const URL_SEPARATOR: &str = "/";

/// Join path fragments into a backend-relative URL fragment.
pub fn path_fragment<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(URL_SEPARATOR)
}

/// Auth endpoints are never scoped to an OEM.
fn is_auth_fragment(fragment: &str) -> bool {
    const EXCLUDED: [&str; 4] = ["auth/", "login", "signup", "verify"];
    EXCLUDED.iter().any(|p| fragment.contains(p))
}

#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    client: Client,
    session: Arc<SessionStore>,
}

impl RestClient {
    pub fn new(
        base_url: String,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> Result<Self, PortalError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, fragment: &str) -> Result<T, PortalError> {
        let builder = self.request(Method::GET, fragment);
        self.execute(builder, fragment).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        fragment: &str,
        body: &B,
    ) -> Result<T, PortalError> {
        let builder = self.request(Method::POST, fragment).json(body);
        self.execute(builder, fragment).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        fragment: &str,
        body: &B,
    ) -> Result<T, PortalError> {
        let builder = self.request(Method::PUT, fragment).json(body);
        self.execute(builder, fragment).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, fragment: &str) -> Result<T, PortalError> {
        let builder = self.request(Method::DELETE, fragment);
        self.execute(builder, fragment).await
    }

    /// DELETE carrying a JSON body, used by the GSTIN removal endpoint.
    pub async fn delete_with_body<B: Serialize, T: DeserializeOwned>(
        &self,
        fragment: &str,
        body: &B,
    ) -> Result<T, PortalError> {
        let builder = self.request(Method::DELETE, fragment).json(body);
        self.execute(builder, fragment).await
    }

    fn request(&self, method: Method, fragment: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, fragment.trim_start_matches('/'));
        let mut builder = self.client.request(method, &url);

        if let Some(token) = self.session.token() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if !is_auth_fragment(fragment) {
            if let Some(oem) = self.session.selected_oem() {
                builder = builder.header("X-OEM-ID", oem.id);
            }
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fragment: &str,
    ) -> Result<T, PortalError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            log::debug!("{} succeeded with status {}", fragment, status);
            return response
                .json::<T>()
                .await
                .map_err(|e| PortalError::Parsing(format!("{}: {}", fragment, e)));
        }

        if status.is_client_error() {
            let message = Self::extract_message(response).await;
            log::warn!("{} rejected with {}: {}", fragment, status, message);
            if status == StatusCode::UNAUTHORIZED && !is_auth_fragment(fragment) {
                // Forced logout: the token is no longer valid. A 401 from an
                // auth endpoint is a credential rejection, not an expired
                // session, and leaves the sign-in state alone.
                self.session.clear();
            }
            return Err(PortalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        log::error!("{} failed with server status {}", fragment, status);
        Err(PortalError::ServerError {
            status: status.as_u16(),
        })
    }

    /// Pull the backend-provided message out of an error body, falling back
    /// to the raw text when it is not the usual envelope.
    async fn extract_message(response: reqwest::Response) -> String {
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => value
                .get("message")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
                .unwrap_or(text),
            Err(_) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_fragments_join_with_separator() {
        assert_eq!(
            path_fragment(["settings", "gstin", "g-42"]),
            "settings/gstin/g-42"
        );
        assert_eq!(path_fragment(["dashboard"]), "dashboard");
    }

    #[test]
    fn auth_fragments_are_not_oem_scoped() {
        assert!(is_auth_fragment("auth/authenticate/2fa"));
        assert!(is_auth_fragment("auth/signup"));
        assert!(is_auth_fragment("auth/verifymail"));
        assert!(!is_auth_fragment("onboarding/confirm-asn"));
        assert!(!is_auth_fragment("settings/gstin-management"));
    }
}
