//! Subscription plan catalog and upgrades

use serde::{Deserialize, Serialize};

use crate::core_types::ServerResponse;
use crate::errors::PortalError;
use crate::rest::{path_fragment, RestClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub yearly: f64,
    #[serde(default)]
    pub monthly: f64,
    pub setup_fee: f64,
    #[serde(default)]
    pub gst_rate: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLimits {
    pub requests_per_minute: u32,
    pub requests_per_day: u32,
    pub requests_per_month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_usage: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeature {
    pub name: String,
    pub included: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub plan_id: String,
    pub plan_code: String,
    pub plan_name: String,
    pub pricing: PricingInfo,
    #[serde(default)]
    pub features: Vec<PlanFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_limits: Option<ApiLimits>,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCatalog {
    pub plans: Vec<SubscriptionPlan>,
    #[serde(default)]
    pub total_plans: u32,
    #[serde(default)]
    pub active_plans: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpgradeRequest {
    plan_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeAck {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub effective_from: Option<String>,
}

pub struct PlanService {
    rest: RestClient,
}

impl PlanService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Full plan catalog, sorted by the backend's display order.
    pub async fn plans(&self) -> Result<PlanCatalog, PortalError> {
        let response: ServerResponse<PlanCatalog> =
            self.rest.get(&path_fragment(["subscription-plans"])).await?;
        let mut catalog = response.into_body()?;
        catalog.plans.sort_by_key(|p| p.display_order);
        Ok(catalog)
    }

    pub async fn plan(&self, plan_id: &str) -> Result<SubscriptionPlan, PortalError> {
        let response: ServerResponse<SubscriptionPlan> = self
            .rest
            .get(&path_fragment(["subscription-plans", plan_id]))
            .await?;
        response.into_body()
    }

    /// Request a plan upgrade and cache the new plan name in the session on
    /// acknowledgement.
    pub async fn upgrade(&self, plan: &SubscriptionPlan) -> Result<UpgradeAck, PortalError> {
        let request = UpgradeRequest {
            plan_code: plan.plan_code.clone(),
        };
        let response: ServerResponse<UpgradeAck> = self
            .rest
            .post(&path_fragment(["subscription-plans", "upgrade"]), &request)
            .await?;
        let ack = response.into_body()?;
        self.rest.session().set_current_plan(plan.plan_name.clone());
        log::info!("Plan upgraded to {}", plan.plan_name);
        Ok(ack)
    }
}
