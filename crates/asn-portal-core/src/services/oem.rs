//! OEM portal listing and selection
//!
//! A vendor onboards into exactly one OEM at a time. Selecting an OEM writes
//! it into the session store, after which every dashboard/onboarding/settings
//! call is scoped to it via the `X-OEM-ID` header.

use serde::{Deserialize, Serialize};

use crate::core_types::{SelectedOem, ServerResponse};
use crate::errors::PortalError;
use crate::rest::{path_fragment, RestClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Oem {
    pub id: String,
    pub oem_code: String,
    pub full_name: String,
    #[serde(default)]
    pub logo_background: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_coming_soon: bool,
    #[serde(default)]
    pub no_access: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableOems {
    pub oems: Vec<Oem>,
    #[serde(default)]
    pub total_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequestAck {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub status: String,
}

pub struct OemService {
    rest: RestClient,
}

impl OemService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn available_oems(&self) -> Result<AvailableOems, PortalError> {
        let response: ServerResponse<AvailableOems> =
            self.rest.get(&path_fragment(["oems", "available"])).await?;
        response.into_body()
    }

    pub async fn oem_details(&self, oem_id: &str) -> Result<Oem, PortalError> {
        let response: ServerResponse<Oem> =
            self.rest.get(&path_fragment(["oems", oem_id])).await?;
        response.into_body()
    }

    /// OEM-specific configuration blob; the shape is backend-defined and
    /// passed through untyped.
    pub async fn oem_config(&self, oem_id: &str) -> Result<serde_json::Value, PortalError> {
        let response: ServerResponse<serde_json::Value> = self
            .rest
            .get(&path_fragment(["oems", oem_id, "config"]))
            .await?;
        response.into_body()
    }

    pub async fn request_access(&self, oem_id: &str) -> Result<AccessRequestAck, PortalError> {
        let response: ServerResponse<AccessRequestAck> = self
            .rest
            .post(
                &path_fragment(["oems", oem_id, "request-access"]),
                &serde_json::json!({}),
            )
            .await?;
        response.into_body()
    }

    /// Record the vendor's choice in the session. Locked or coming-soon OEMs
    /// cannot be selected.
    pub fn select_oem(&self, oem: &Oem) -> Result<(), PortalError> {
        if oem.is_coming_soon {
            return Err(PortalError::Validation(format!(
                "{} is not yet open for onboarding",
                oem.full_name
            )));
        }
        if oem.no_access {
            return Err(PortalError::Validation(format!(
                "access to {} has not been granted; request access first",
                oem.full_name
            )));
        }
        self.rest.session().set_selected_oem(SelectedOem {
            id: oem.id.clone(),
            full_name: oem.full_name.clone(),
            oem_code: oem.oem_code.clone(),
            logo_background: oem.logo_background.clone(),
        });
        log::info!("Selected OEM {} ({})", oem.full_name, oem.oem_code);
        Ok(())
    }
}
