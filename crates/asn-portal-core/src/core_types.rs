//! Shared wire types for the portal backend protocol
//!
//! Every backend endpoint wraps its payload in the same response envelope
//! (`responseCode`, `message`, `ok`, `body`). The domain shapes here are the
//! ones referenced from more than one service module; request/response pairs
//! used by a single endpoint live next to their service.

use serde::{Deserialize, Serialize};

/// Uniform response envelope produced by the portal backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResponse<T> {
    pub response_code: i32,
    pub message: String,
    #[serde(default)]
    pub ok: bool,
    pub body: Option<T>,
}

impl<T> ServerResponse<T> {
    /// Unwrap the body, treating a missing body on an ok response as a
    /// protocol violation.
    pub fn into_body(self) -> Result<T, crate::errors::PortalError> {
        self.body.ok_or_else(|| {
            crate::errors::PortalError::Parsing(format!(
                "response marked ok but carried no body: {}",
                self.message
            ))
        })
    }
}

/// The OEM identity a vendor has chosen to onboard into. Once selected, every
/// dashboard/onboarding/settings call is scoped to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOem {
    pub id: String,
    pub full_name: String,
    pub oem_code: String,
    #[serde(default)]
    pub logo_background: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryGstin {
    pub gstin_id: String,
    pub gstin: String,
    pub state: String,
    pub state_code: String,
    pub vendor_code: String,
    pub status: String,
    pub verified: bool,
}

/// Company profile snapshot as returned by `settings/company-info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub company_name: String,
    pub pan_number: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub vendor_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_gstin: Option<PrimaryGstin>,
}

/// One GSTIN registration managed under settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstinDetail {
    pub gstin_id: String,
    pub gstin: String,
    #[serde(default)]
    pub state: String,
    pub state_code: String,
    pub vendor_code: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub primary: bool,
}

/// Status of a single onboarding/implementation step as tracked by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepProgress {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Progress record produced by the backend. The client only reflects it; the
/// backend owns the counts and percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed_steps: u32,
    pub total_steps: u32,
    #[serde(default)]
    pub current_step_id: u32,
    pub percentage: f32,
    pub steps: Vec<StepProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Progress {
    /// Title of the step the backend marks as `current`, if any.
    pub fn current_step_title(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Current)
            .map(|s| s.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_camel_case() {
        let raw = r##"{"responseCode":200,"message":"ok","ok":true,"body":{"id":"oem-1","fullName":"Tata Motors","oemCode":"TML","logoBackground":"#123456"}}"##;
        let parsed: ServerResponse<SelectedOem> = serde_json::from_str(raw).unwrap();
        assert!(parsed.ok);
        let oem = parsed.into_body().unwrap();
        assert_eq!(oem.oem_code, "TML");
    }

    #[test]
    fn missing_body_is_a_parsing_error() {
        let raw = r#"{"responseCode":200,"message":"empty","ok":true,"body":null}"#;
        let parsed: ServerResponse<SelectedOem> = serde_json::from_str(raw).unwrap();
        assert!(parsed.into_body().is_err());
    }

    #[test]
    fn current_step_title_follows_backend_status() {
        let progress = Progress {
            completed_steps: 1,
            total_steps: 3,
            current_step_id: 2,
            percentage: 33.0,
            steps: vec![
                StepProgress {
                    id: 1,
                    title: "Confirmation".into(),
                    description: String::new(),
                    status: StepStatus::Completed,
                    completed_at: None,
                },
                StepProgress {
                    id: 2,
                    title: "Payment".into(),
                    description: String::new(),
                    status: StepStatus::Current,
                    completed_at: None,
                },
            ],
            last_updated: None,
        };
        assert_eq!(progress.current_step_title(), Some("Payment"));
    }
}
