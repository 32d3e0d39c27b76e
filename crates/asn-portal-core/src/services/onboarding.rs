//! Onboarding endpoints: progress, ASN confirmation, deployment selection,
//! credential issuance
//!
//! These are 1:1 wrappers over the backend's `onboarding/*` routes. The
//! multi-step progression logic itself lives in [`crate::tracker`]; this
//! module only moves typed payloads.

use serde::{Deserialize, Serialize};

use crate::core_types::{Progress, ServerResponse};
use crate::errors::PortalError;
use crate::rest::{path_fragment, RestClient};
use crate::services::plans::PlanCatalog;
use crate::validation;

/// Confirmation type the backend expects for ASN 2.1 activation.
pub const ASN_CONFIRMATION_TYPE: &str = "ASN_2_1_ACTIVATION";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentType {
    #[serde(rename = "self")]
    SelfDeployment,
    #[serde(rename = "assisted")]
    Assisted,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationData {
    pub oem_code: String,
    pub confirmation_type: String,
    pub acknowledgment: bool,
    pub terms_accepted: bool,
    pub compliance_confirmed: bool,
    pub additional_notes: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationAck {
    #[serde(default)]
    pub confirmation_id: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDeploymentRequest {
    pub oem_code: String,
    pub deployment_type: DeploymentType,
    pub preferred_timeline: String,
    pub technical_expertise_level: String,
    pub existing_erp_system: String,
    pub integration_requirements: String,
    pub additional_services_required: bool,
    pub notes: String,
}

impl SelectDeploymentRequest {
    /// Defaults the portal submits for each deployment path.
    pub fn for_type(oem_code: String, deployment_type: DeploymentType) -> Self {
        let self_deploy = deployment_type == DeploymentType::SelfDeployment;
        Self {
            oem_code,
            deployment_type,
            preferred_timeline: if self_deploy { "immediate" } else { "1-2 weeks" }.to_string(),
            technical_expertise_level: if self_deploy {
                "intermediate"
            } else {
                "beginner"
            }
            .to_string(),
            existing_erp_system: "none".to_string(),
            integration_requirements: if self_deploy { "basic" } else { "full" }.to_string(),
            additional_services_required: !self_deploy,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSelectionAck {
    #[serde(default)]
    pub selection_id: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCredentialsRequest {
    pub oem_id: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub esakha_user_id: String,
    pub esakha_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimits {
    pub requests_per_minute: u32,
    pub requests_per_day: u32,
    pub requests_per_month: u32,
    #[serde(default)]
    pub burst_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    pub name: String,
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub authentication_required: bool,
}

/// Issued API credential material. The client only displays and exports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsData {
    pub credential_id: String,
    pub developer_id: String,
    pub api_key: String,
    pub client_secret: String,
    pub environment: String,
    pub endpoint_url: String,
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub expires_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limits: Option<RateLimits>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<ApiEndpoint>,
    #[serde(default)]
    pub documentation_url: String,
    #[serde(default)]
    pub support_contact: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionAck {
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub status: String,
}

pub struct OnboardingService {
    rest: RestClient,
}

impl OnboardingService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    fn selected_oem(&self) -> Result<crate::core_types::SelectedOem, PortalError> {
        self.rest.session().selected_oem().ok_or_else(|| {
            PortalError::Validation("no OEM selected; choose an OEM portal first".to_string())
        })
    }

    /// Server-tracked onboarding progress for the selected OEM.
    pub async fn progress(&self) -> Result<Progress, PortalError> {
        let oem = self.selected_oem()?;
        let response: ServerResponse<Progress> = self
            .rest
            .get(&path_fragment(["onboarding", "progress", &oem.id]))
            .await?;
        response.into_body()
    }

    /// Confirm ASN 2.1 activation for the selected OEM.
    pub async fn confirm_asn(&self) -> Result<ConfirmationAck, PortalError> {
        let oem = self.selected_oem()?;
        let data = ConfirmationData {
            oem_code: oem.oem_code,
            confirmation_type: ASN_CONFIRMATION_TYPE.to_string(),
            acknowledgment: true,
            terms_accepted: true,
            compliance_confirmed: true,
            additional_notes: String::new(),
        };
        let response: ServerResponse<ConfirmationAck> = self
            .rest
            .post(&path_fragment(["onboarding", "confirm-asn"]), &data)
            .await?;
        response.into_body()
    }

    pub async fn select_deployment(
        &self,
        deployment_type: DeploymentType,
    ) -> Result<DeploymentSelectionAck, PortalError> {
        let oem = self.selected_oem()?;
        let request = SelectDeploymentRequest::for_type(oem.oem_code, deployment_type);
        let response: ServerResponse<DeploymentSelectionAck> = self
            .rest
            .post(&path_fragment(["onboarding", "select-deployment"]), &request)
            .await?;
        response.into_body()
    }

    /// Issue API credentials for self-deployment. No automatic retry: a
    /// failure is surfaced and the caller decides whether to resubmit.
    pub async fn create_credentials(
        &self,
        environment: &str,
        esakha_user_id: &str,
        esakha_password: &str,
        webhook_url: Option<String>,
    ) -> Result<CredentialsData, PortalError> {
        validation::require_non_empty("e-Sakha user id", esakha_user_id)?;
        validation::require_non_empty("e-Sakha password", esakha_password)?;
        let oem = self.selected_oem()?;

        let request = CreateCredentialsRequest {
            oem_id: oem.id,
            environment: environment.to_string(),
            webhook_url,
            esakha_user_id: esakha_user_id.to_string(),
            esakha_password: esakha_password.to_string(),
            credential_id: None,
        };
        let response: ServerResponse<CredentialsData> = self
            .rest
            .post(&path_fragment(["onboarding", "create-credentials"]), &request)
            .await?;
        response.into_body()
    }

    pub async fn credentials(&self, credential_id: &str) -> Result<CredentialsData, PortalError> {
        let response: ServerResponse<CredentialsData> = self
            .rest
            .get(&path_fragment(["onboarding", "credentials", credential_id]))
            .await?;
        response.into_body()
    }

    /// Plans offered during onboarding for the selected OEM.
    pub async fn plans(&self) -> Result<PlanCatalog, PortalError> {
        let oem = self.selected_oem()?;
        let response: ServerResponse<PlanCatalog> = self
            .rest
            .get(&path_fragment(["onboarding", "plans", &oem.id]))
            .await?;
        response.into_body()
    }

    pub async fn complete(&self) -> Result<CompletionAck, PortalError> {
        let oem = self.selected_oem()?;
        let response: ServerResponse<CompletionAck> = self
            .rest
            .post(
                &path_fragment(["onboarding", "complete", &oem.id]),
                &serde_json::json!({}),
            )
            .await?;
        response.into_body()
    }
}
