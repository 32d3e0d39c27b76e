//! Dashboard read models scoped to the selected OEM

use serde::{Deserialize, Serialize};

use crate::core_types::{Progress, ServerResponse};
use crate::errors::PortalError;
use crate::rest::{path_fragment, RestClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalAlert {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: String,
    #[serde(default)]
    pub action_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub completed_steps: String,
    #[serde(default)]
    pub days_remaining: i32,
    #[serde(default)]
    pub current_plan: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub next_action: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_alert: Option<CriticalAlert>,
}

pub struct DashboardService {
    rest: RestClient,
}

impl DashboardService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    fn oem_id(&self) -> Result<String, PortalError> {
        self.rest
            .session()
            .selected_oem()
            .map(|o| o.id)
            .ok_or_else(|| {
                PortalError::Validation(
                    "no OEM selected; choose an OEM portal first".to_string(),
                )
            })
    }

    pub async fn stats(&self) -> Result<DashboardStats, PortalError> {
        let oem_id = self.oem_id()?;
        let response: ServerResponse<DashboardStats> = self
            .rest
            .get(&path_fragment(["dashboard", "stats", &oem_id]))
            .await?;
        let stats = response.into_body()?;
        if !stats.current_plan.is_empty() {
            self.rest.session().set_current_plan(stats.current_plan.clone());
        }
        Ok(stats)
    }

    pub async fn onboarding_progress(&self) -> Result<Progress, PortalError> {
        let oem_id = self.oem_id()?;
        let response: ServerResponse<Progress> = self
            .rest
            .get(&path_fragment(["dashboard", "onboarding-progress", &oem_id]))
            .await?;
        response.into_body()
    }

    pub async fn implementation_progress(&self) -> Result<Progress, PortalError> {
        let oem_id = self.oem_id()?;
        let response: ServerResponse<Progress> = self
            .rest
            .get(&path_fragment([
                "dashboard",
                "implementation-progress",
                &oem_id,
            ]))
            .await?;
        response.into_body()
    }
}
