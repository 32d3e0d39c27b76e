//! End-to-end flows against an in-process mock backend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};

use asn_portal_core::config::{BackendConfig, ChatConfig, PortalConfig};
use asn_portal_core::core_types::SelectedOem;
use asn_portal_core::services::onboarding::DeploymentType;
use asn_portal_core::{
    GuardOutcome, OnboardingStep, Portal, Route, SessionStore, StepTracker,
};

fn make_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "sub": "vendor@example.com", "exp": exp })
            .to_string()
            .as_bytes(),
    );
    format!("{}.{}.sig", header, payload)
}

fn envelope(body: Value) -> Json<Value> {
    Json(json!({
        "responseCode": 200,
        "message": "ok",
        "ok": true,
        "body": body
    }))
}

fn require_bearer_and_oem(headers: &HeaderMap) -> Result<(), StatusCode> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !auth.starts_with("Bearer ") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if headers.get("x-oem-id").is_none() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

fn mock_backend() -> Router {
    Router::new()
        .route(
            "/auth/authenticate/2fa",
            post(|| async { Json(json!({ "message": "OTP sent" })) }),
        )
        .route(
            "/auth/authenticate/2fa/validate",
            post(|Json(body): Json<Value>| async move {
                if body["otp"] == "123456" {
                    let jwt = make_jwt(chrono::Utc::now().timestamp() + 3600);
                    Json(json!({ "jwt": jwt })).into_response()
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "message": "Invalid OTP" })),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/oems/available",
            get(|| async {
                envelope(json!({
                    "oems": [{
                        "id": "oem-1",
                        "oemCode": "TML",
                        "fullName": "Tata Motors",
                        "logoBackground": "#1d4ed8",
                        "features": ["ASN 2.1"],
                        "isComingSoon": false,
                        "noAccess": false
                    }],
                    "totalCount": 1
                }))
            }),
        )
        .route(
            "/onboarding/confirm-asn",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if let Err(status) = require_bearer_and_oem(&headers) {
                    return status.into_response();
                }
                assert_eq!(body["confirmationType"], "ASN_2_1_ACTIVATION");
                envelope(json!({ "confirmationId": "conf-1", "status": "CONFIRMED" }))
                    .into_response()
            }),
        )
        .route(
            "/onboarding/select-deployment",
            post(|Json(body): Json<Value>| async move {
                envelope(json!({
                    "selectionId": "sel-1",
                    "status": format!("{}-accepted", body["deploymentType"].as_str().unwrap())
                }))
            }),
        )
        .route(
            "/onboarding/create-credentials",
            post(|Json(body): Json<Value>| async move {
                if body["esakhaUserId"] == "fail" {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "message": "The provided e-Sakha credentials are not valid" })),
                    )
                        .into_response();
                }
                envelope(json!({
                    "credentialId": "cred-1",
                    "developerId": "DEV_V123456",
                    "apiKey": "ASN_A1B2C3D4",
                    "clientSecret": "SEC_x9y8z7",
                    "environment": body["environment"],
                    "endpointUrl": "https://api-tml.apigee.net/asn/v2.1/",
                    "status": "ACTIVE"
                }))
                .into_response()
            }),
        )
        .route(
            "/settings/gstin-management",
            get(|headers: HeaderMap| async move {
                if let Err(status) = require_bearer_and_oem(&headers) {
                    return status.into_response();
                }
                envelope(json!({
                    "gstinDetails": [
                        {
                            "gstinId": "g-1",
                            "gstin": "07AABCU9603R1ZM",
                            "stateCode": "07",
                            "vendorCode": "V123456",
                            "primary": false
                        },
                        {
                            "gstinId": "g-2",
                            "gstin": "27AAACJ9630N1ZV",
                            "stateCode": "27",
                            "vendorCode": "V123456",
                            "primary": true
                        }
                    ]
                }))
                .into_response()
            }),
        )
        .route(
            "/settings/company-info",
            put(|Json(_): Json<Value>| async move {
                envelope(json!({
                    "companyName": "Tata Vendor Pvt Ltd",
                    "panNumber": "ABCDE1234F",
                    "contactPerson": "A. Vendor",
                    "email": "vendor@example.com",
                    "phone": "9876543210",
                    "vendorCode": "V123456"
                }))
            }),
        )
        .route(
            "/dashboard/stats/{id}",
            get(|Path(_id): Path<String>| async move {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "token expired" })),
                )
            }),
        )
}

async fn spawn_backend(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn portal_for(addr: SocketAddr, snapshot: Option<std::path::PathBuf>) -> Portal {
    let mut config = PortalConfig {
        backend: BackendConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 5,
        },
        ..Default::default()
    };
    config.session.snapshot_path = snapshot;
    Portal::new(config).unwrap()
}

#[tokio::test]
async fn sign_in_two_fa_flow_authenticates_the_session() {
    let addr = spawn_backend(mock_backend()).await;
    let portal = portal_for(addr, None);
    let auth = portal.auth();

    auth.sign_in("vendor@example.com", "secret").await.unwrap();
    assert!(portal.session().two_fa_pending());
    assert!(!auth.is_authenticated());

    // Wrong OTP is surfaced with the backend message and stays pending.
    let err = auth.verify_otp("000000").await.unwrap_err();
    assert!(err.to_string().contains("Invalid OTP"));

    let claims = auth.verify_otp("123456").await.unwrap();
    assert_eq!(claims.sub.as_deref(), Some("vendor@example.com"));
    assert!(auth.is_authenticated());
    assert!(!portal.session().two_fa_pending());
}

#[tokio::test]
async fn onboarding_flow_confirms_pays_and_issues_credentials() {
    let addr = spawn_backend(mock_backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("session.json");
    let portal = portal_for(addr, Some(snapshot.clone()));

    let auth = portal.auth();
    auth.sign_in("vendor@example.com", "secret").await.unwrap();
    auth.verify_otp("123456").await.unwrap();

    let oems = portal.oems();
    let available = oems.available_oems().await.unwrap();
    oems.select_oem(&available.oems[0]).unwrap();

    let onboarding = portal.onboarding();
    let mut tracker = StepTracker::resume(portal.session().clone(), None);
    assert_eq!(tracker.current(), OnboardingStep::Confirmation);

    let ack = onboarding.confirm_asn().await.unwrap();
    assert_eq!(ack.status, "CONFIRMED");
    tracker.confirmation_acknowledged(true).unwrap();
    tracker.payment_method_selected("NEFT").unwrap();

    let selection = onboarding
        .select_deployment(DeploymentType::SelfDeployment)
        .await
        .unwrap();
    assert_eq!(selection.status, "self-accepted");
    let route = tracker
        .deployment_selected(DeploymentType::SelfDeployment)
        .unwrap();
    assert_eq!(route, Route::CredentialSetup);

    // Failed issuance surfaces the backend message; user-initiated retry
    // succeeds.
    let err = onboarding
        .create_credentials("sandbox", "fail", "pw", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("e-Sakha"));
    let credentials = onboarding
        .create_credentials("sandbox", "vendor", "pw", None)
        .await
        .unwrap();
    assert_eq!(credentials.api_key, "ASN_A1B2C3D4");

    let exported = asn_portal_core::export::export_to_dir(&credentials, dir.path())
        .await
        .unwrap();
    assert!(exported.exists());

    // Reload: a fresh portal over the same snapshot resumes at the same step.
    let reloaded = portal_for(addr, Some(snapshot));
    let resumed = StepTracker::resume(reloaded.session().clone(), None);
    assert_eq!(resumed.current(), OnboardingStep::SelfDeployment);
}

#[tokio::test]
async fn gstin_list_is_sorted_primary_first_and_cached() {
    let addr = spawn_backend(mock_backend()).await;
    let portal = portal_for(addr, None);

    let auth = portal.auth();
    auth.sign_in("vendor@example.com", "secret").await.unwrap();
    auth.verify_otp("123456").await.unwrap();
    portal.session().set_selected_oem(SelectedOem {
        id: "oem-1".into(),
        full_name: "Tata Motors".into(),
        oem_code: "TML".into(),
        logo_background: String::new(),
    });

    let details = portal.settings().gstin_management().await.unwrap();
    assert_eq!(details[0].gstin_id, "g-2");
    assert!(details[0].primary);
    assert_eq!(portal.session().gstin_details()[0].gstin_id, "g-2");
}

#[tokio::test]
async fn a_401_forces_logout_and_guards_redirect() {
    let addr = spawn_backend(mock_backend()).await;
    let portal = portal_for(addr, None);

    let auth = portal.auth();
    auth.sign_in("vendor@example.com", "secret").await.unwrap();
    auth.verify_otp("123456").await.unwrap();
    portal.session().set_selected_oem(SelectedOem {
        id: "oem-1".into(),
        full_name: "Tata Motors".into(),
        oem_code: "TML".into(),
        logo_background: String::new(),
    });
    assert_eq!(
        asn_portal_core::guards::require_oem(portal.session()),
        GuardOutcome::Allow
    );

    let err = portal.dashboard().stats().await.unwrap_err();
    assert!(err.is_unauthorized());

    // Forced logout cleared everything; protected pages redirect to sign-in.
    assert!(portal.session().token().is_none());
    assert_eq!(
        asn_portal_core::guards::require_auth(portal.session()),
        GuardOutcome::Redirect(Route::SignIn)
    );
}

#[tokio::test]
async fn webhook_misconfiguration_falls_back_to_demo_responses() {
    // A backend that answers chat posts with an HTML page, the signature of
    // static hosting intercepting the webhook.
    let router = Router::new().route(
        "/webhook/chat",
        post(|| async { axum::response::Html("<!DOCTYPE html><html><body>site</body></html>") }),
    );
    let addr = spawn_backend(router).await;

    let chat_config = ChatConfig {
        enabled: true,
        webhook_url: format!("http://{}/webhook/chat", addr),
        auth_header: String::new(),
        timeout_secs: 5,
    };
    let mut chat = asn_portal_core::chat::ChatService::new(&chat_config);

    let reply = chat.send_message("how does ASN onboarding work?").await.unwrap();
    assert_eq!(reply.sender, asn_portal_core::chat::MessageSender::Assistant);
    assert!(reply.content.contains("demo mode"));

    // An unreachable webhook degrades the same way.
    let dead_config = ChatConfig {
        enabled: true,
        webhook_url: "http://127.0.0.1:9/webhook/chat".into(),
        auth_header: String::new(),
        timeout_secs: 5,
    };
    let mut chat = asn_portal_core::chat::ChatService::new(&dead_config);
    let reply = chat.send_message("pricing?").await.unwrap();
    assert_eq!(reply.sender, asn_portal_core::chat::MessageSender::Assistant);
    assert!(reply.content.contains("demo mode"));
}

#[tokio::test]
async fn working_webhook_answers_without_fallback() {
    let router = Router::new().route(
        "/webhook/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["context"], "asn_implementation_expert");
            Json(json!({ "response": "live answer" }))
        }),
    );
    let addr = spawn_backend(router).await;

    let chat_config = ChatConfig {
        enabled: true,
        webhook_url: format!("http://{}/webhook/chat", addr),
        auth_header: String::new(),
        timeout_secs: 5,
    };
    let mut chat = asn_portal_core::chat::ChatService::new(&chat_config);
    let reply = chat.send_message("hello").await.unwrap();
    assert_eq!(reply.content, "live answer");
}

#[tokio::test]
async fn logout_clears_session_and_snapshot() {
    let addr = spawn_backend(mock_backend()).await;
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("session.json");
    let portal = portal_for(addr, Some(snapshot.clone()));

    let auth = portal.auth();
    auth.sign_in("vendor@example.com", "secret").await.unwrap();
    auth.verify_otp("123456").await.unwrap();
    assert!(snapshot.exists());

    auth.logout();
    assert!(portal.session().token().is_none());
    assert!(!snapshot.exists());

    let reopened = SessionStore::open(&snapshot);
    assert!(reopened.token().is_none());
}
