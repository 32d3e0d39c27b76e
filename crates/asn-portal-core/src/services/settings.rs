//! GSTIN, company-info and billing settings
//!
//! GSTIN lists always surface the primary-flagged registration first; the
//! client re-sorts every list it receives and caches it in the session so
//! dashboards can render without a refetch.

use serde::{Deserialize, Serialize};

use crate::core_types::{CompanyInfo, GstinDetail, ServerResponse};
use crate::errors::PortalError;
use crate::rest::{path_fragment, RestClient};
use crate::services::plans::{ApiLimits, PricingInfo};
use crate::validation;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GstinRequest {
    pub gstin: String,
    pub vendor_code: String,
    pub state_code: String,
    pub primary: bool,
}

impl GstinRequest {
    fn validate(&self) -> Result<(), PortalError> {
        validation::require_gstin(&self.gstin)?;
        validation::require_non_empty("vendor code", &self.vendor_code)?;
        if !validation::is_valid_state_code(&self.state_code) {
            return Err(PortalError::Validation(format!(
                "'{}' is not a valid 2-digit state code",
                self.state_code
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstinManagement {
    pub gstin_details: Vec<GstinDetail>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseSubscription {
    pub subscription_id: String,
    pub plan_name: String,
    pub status: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub next_billing_date: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSubscription {
    #[serde(flatten)]
    pub base: BaseSubscription,
    #[serde(default)]
    pub plan_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingInfo>,
    #[serde(default)]
    pub auto_renewal: bool,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_limits: Option<ApiLimits>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub total_paid: f64,
    pub pending_amount: f64,
    #[serde(default)]
    pub next_billing_date: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBilling {
    pub current_subscription: CurrentSubscription,
    #[serde(default)]
    pub subscription_history: Vec<BaseSubscription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_info: Option<BillingInfo>,
}

/// Primary-flagged registrations sort first; otherwise the backend order is
/// preserved.
pub fn sort_primary_first(mut details: Vec<GstinDetail>) -> Vec<GstinDetail> {
    details.sort_by_key(|d| !d.primary);
    details
}

pub struct SettingsService {
    rest: RestClient,
}

impl SettingsService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Settings are scoped to the selected OEM via the `X-OEM-ID` header.
    fn require_selected_oem(&self) -> Result<(), PortalError> {
        if self.rest.session().selected_oem().is_none() {
            return Err(PortalError::Validation(
                "no OEM selected; choose an OEM portal first".to_string(),
            ));
        }
        Ok(())
    }

    /// List GSTIN registrations, primary first, and cache them in the session.
    pub async fn gstin_management(&self) -> Result<Vec<GstinDetail>, PortalError> {
        self.require_selected_oem()?;
        let response: ServerResponse<GstinManagement> = self
            .rest
            .get(&path_fragment(["settings", "gstin-management"]))
            .await?;
        let details = sort_primary_first(response.into_body()?.gstin_details);
        self.rest.session().set_gstin_details(details.clone());
        Ok(details)
    }

    pub async fn create_gstin(&self, request: &GstinRequest) -> Result<GstinDetail, PortalError> {
        self.require_selected_oem()?;
        request.validate()?;
        let response: ServerResponse<GstinDetail> = self
            .rest
            .post(&path_fragment(["settings", "gstin"]), request)
            .await?;
        response.into_body()
    }

    pub async fn update_gstin(
        &self,
        gstin_id: &str,
        request: &GstinRequest,
    ) -> Result<GstinDetail, PortalError> {
        self.require_selected_oem()?;
        request.validate()?;
        let response: ServerResponse<GstinDetail> = self
            .rest
            .put(&path_fragment(["settings", "gstin", gstin_id]), request)
            .await?;
        response.into_body()
    }

    pub async fn delete_gstin(
        &self,
        gstin_id: &str,
        request: &GstinRequest,
    ) -> Result<(), PortalError> {
        self.require_selected_oem()?;
        let _: ServerResponse<serde_json::Value> = self
            .rest
            .delete_with_body(&path_fragment(["settings", "gstin", gstin_id]), request)
            .await?;
        Ok(())
    }

    /// Fetch the company profile and cache the snapshot in the session.
    pub async fn company_info(&self) -> Result<CompanyInfo, PortalError> {
        self.require_selected_oem()?;
        let response: ServerResponse<CompanyInfo> = self
            .rest
            .get(&path_fragment(["settings", "company-info"]))
            .await?;
        let info = response.into_body()?;
        self.rest.session().set_company_info(info.clone());
        if let Some(plan) = &info.current_plan {
            self.rest.session().set_current_plan(plan.clone());
        }
        Ok(info)
    }

    pub async fn update_company_info(
        &self,
        update: &CompanyInfoUpdate,
    ) -> Result<CompanyInfo, PortalError> {
        self.require_selected_oem()?;
        if let Some(phone) = &update.phone {
            validation::require_mobile(phone)?;
        }
        if let Some(email) = &update.email {
            validation::require_non_empty("email", email)?;
        }
        let response: ServerResponse<CompanyInfo> = self
            .rest
            .put(&path_fragment(["settings", "company-info"]), update)
            .await?;
        let info = response.into_body()?;
        self.rest.session().set_company_info(info.clone());
        Ok(info)
    }

    pub async fn subscription_billing(&self) -> Result<SubscriptionBilling, PortalError> {
        self.require_selected_oem()?;
        let response: ServerResponse<SubscriptionBilling> = self
            .rest
            .get(&path_fragment(["settings", "subscription-billing"]))
            .await?;
        let billing = response.into_body()?;
        self.rest
            .session()
            .set_current_plan(billing.current_subscription.base.plan_name.clone());
        Ok(billing)
    }
}
