//! Authentication and 2FA flow
//!
//! Sign-in is a two-step handshake: posting credentials triggers an OTP
//! email, and the session stays in a pending-2FA state until the OTP is
//! verified and the backend returns a JWT. Expiry is checked client-side by
//! decoding the payload claims, exactly as the portal frontend does; the
//! token is never trusted beyond gating navigation.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::PortalError;
use crate::rest::{path_fragment, RestClient};
use crate::validation;

/// Product identifier the auth backend expects on OTP requests.
const PRODUCT_ID: u32 = 31;

/// Seconds a user must wait between OTP resend requests.
const RESEND_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
    pub product_id: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub company_name: String,
    pub pan_number: String,
    pub contact_person: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpRequest {
    username: String,
    otp: String,
    product_id: u32,
    jwt: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerificationResponse {
    pub jwt: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthAck {
    #[serde(default)]
    pub message: String,
}

/// Claims the client actually reads out of the JWT payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the JWT payload segment without verifying the signature. The
/// backend remains the authority; this only exists so the client can expire
/// navigation state.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

pub fn token_is_expired(token: &str) -> bool {
    match decode_claims(token).and_then(|c| c.exp) {
        Some(exp) => exp <= chrono::Utc::now().timestamp(),
        None => true,
    }
}

/// In-memory countdown between OTP resends. Deliberately not persisted, so a
/// restart resets it, matching the portal's behavior on reload.
pub struct ResendCooldown {
    window: Duration,
    last: Mutex<Option<Instant>>,
}

impl ResendCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: Mutex::new(None),
        }
    }

    /// Begin a resend if the window has elapsed; otherwise report the
    /// remaining whole seconds.
    pub fn try_begin(&self) -> Result<(), u64> {
        let mut last = self.last.lock().expect("cooldown lock poisoned");
        if let Some(started) = *last {
            let elapsed = started.elapsed();
            if elapsed < self.window {
                return Err((self.window - elapsed).as_secs().max(1));
            }
        }
        *last = Some(Instant::now());
        Ok(())
    }
}

pub struct AuthService {
    rest: RestClient,
    resend_cooldown: ResendCooldown,
}

impl AuthService {
    pub fn new(rest: RestClient) -> Self {
        Self {
            rest,
            resend_cooldown: ResendCooldown::new(RESEND_COOLDOWN),
        }
    }

    /// Post credentials. Success does not authenticate yet; it moves the
    /// session into the pending-2FA state awaiting OTP verification.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(), PortalError> {
        validation::require_non_empty("username", username)?;
        validation::require_non_empty("password", password)?;

        let request = SignInRequest {
            username: username.to_string(),
            password: password.to_string(),
            product_id: PRODUCT_ID,
        };
        let _: AuthAck = self
            .rest
            .post(&path_fragment(["auth", "authenticate", "2fa"]), &request)
            .await?;

        self.rest
            .session()
            .set_two_fa_pending(Some(username.to_string()));
        log::info!("Sign-in accepted for {}, awaiting OTP", username);
        Ok(())
    }

    /// Verify the emailed OTP and store the returned JWT. An expired token in
    /// the response is rejected outright.
    pub async fn verify_otp(&self, otp: &str) -> Result<TokenClaims, PortalError> {
        if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
            return Err(PortalError::Validation(
                "OTP must be exactly 6 digits".to_string(),
            ));
        }
        let username = self.rest.session().two_fa_email().ok_or_else(|| {
            PortalError::Validation("no sign-in is awaiting OTP verification".to_string())
        })?;

        let request = OtpRequest {
            username,
            otp: otp.to_string(),
            product_id: PRODUCT_ID,
            jwt: String::new(),
        };
        let response: OtpVerificationResponse = self
            .rest
            .post(
                &path_fragment(["auth", "authenticate", "2fa", "validate"]),
                &request,
            )
            .await?;

        let claims = decode_claims(&response.jwt)
            .ok_or_else(|| PortalError::Parsing("backend returned a malformed JWT".to_string()))?;
        if token_is_expired(&response.jwt) {
            return Err(PortalError::Api {
                status: 401,
                message: "backend returned an expired token".to_string(),
            });
        }

        let session = self.rest.session();
        session.set_token(response.jwt);
        session.complete_two_fa();
        log::info!("OTP verified, session authenticated");
        Ok(claims)
    }

    /// Request a fresh OTP, rate-limited by the resend cooldown.
    pub async fn resend_otp(&self) -> Result<(), PortalError> {
        let username = self.rest.session().two_fa_email().ok_or_else(|| {
            PortalError::Validation("no sign-in is awaiting OTP verification".to_string())
        })?;
        if let Err(remaining) = self.resend_cooldown.try_begin() {
            return Err(PortalError::Validation(format!(
                "OTP was just sent; retry in {}s",
                remaining
            )));
        }

        let request = OtpRequest {
            username,
            otp: String::new(),
            product_id: PRODUCT_ID,
            jwt: String::new(),
        };
        let _: AuthAck = self
            .rest
            .post(
                &path_fragment(["auth", "authenticate", "2fa", "generate"]),
                &request,
            )
            .await?;
        Ok(())
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthAck, PortalError> {
        validation::require_non_empty("company name", &request.company_name)?;
        validation::require_non_empty("email", &request.email)?;
        validation::require_pan(&request.pan_number)?;
        validation::require_mobile(&request.mobile)?;
        self.rest
            .post(&path_fragment(["auth", "signup"]), request)
            .await
    }

    pub async fn verify_mail(&self, verify_code: &str) -> Result<AuthAck, PortalError> {
        self.rest
            .get(&format!("auth/verifymail?verifyCode={}", verify_code))
            .await
    }

    /// Clear every piece of session state. Never fails; always leaves the
    /// caller at sign-in.
    pub fn logout(&self) {
        self.rest.session().clear();
        log::info!("Session cleared on logout");
    }

    pub fn is_authenticated(&self) -> bool {
        self.rest
            .session()
            .token()
            .map(|t| !token_is_expired(&t))
            .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned JWT with the given `exp` claim, the same shape the
    /// client-side decoder consumes.
    pub(crate) fn make_jwt(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({ "sub": "vendor@example.com", "exp": exp })
                .to_string()
                .as_bytes(),
        );
        format!("{}.{}.sig", header, payload)
    }

    #[test]
    fn decodes_claims_without_verifying_signature() {
        let token = make_jwt(4_102_444_800); // 2100-01-01
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("vendor@example.com"));
        assert!(!token_is_expired(&token));
    }

    #[test]
    fn expired_or_malformed_tokens_are_treated_as_expired() {
        assert!(token_is_expired(&make_jwt(
            chrono::Utc::now().timestamp() - 10
        )));
        assert!(token_is_expired("not-a-jwt"));
        assert!(token_is_expired(""));
    }

    #[test]
    fn cooldown_blocks_immediate_resend() {
        let cooldown = ResendCooldown::new(Duration::from_secs(30));
        assert!(cooldown.try_begin().is_ok());
        let remaining = cooldown.try_begin().unwrap_err();
        assert!(remaining >= 1 && remaining <= 30);
    }

    #[test]
    fn elapsed_cooldown_allows_resend() {
        let cooldown = ResendCooldown::new(Duration::from_millis(0));
        assert!(cooldown.try_begin().is_ok());
        assert!(cooldown.try_begin().is_ok());
    }
}
