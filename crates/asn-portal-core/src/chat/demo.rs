//! Offline chat simulator
//!
//! Keyword-matched canned responses used when no webhook is configured or
//! the configured one is unusable. Content mirrors the portal's demo script.

use async_trait::async_trait;

use crate::chat::ChatResponder;
use crate::errors::PortalError;

const DEMO_RESPONSES: [(&str, &str); 5] = [
    (
        "asn",
        "**ASN 2.1 Implementation**\n\nASN 2.1 is the Advance Shipping Notice standard your \
         OEM requires for inbound supply-chain documents. Implementation covers document \
         generation from your ERP, digital signing, and delivery over the OEM's API. Most \
         vendors complete the self-deployment path in under two weeks.",
    ),
    (
        "erp",
        "**ERP Integration**\n\nThe portal ships connectors for SAP, Oracle, Tally and \
         Microsoft Dynamics. For other systems the REST API accepts ASN payloads directly; \
         see the integration guide issued with your API credentials.",
    ),
    (
        "price",
        "**Plans & Pricing**\n\nThree plans are available: Basic, Professional and \
         Enterprise, billed yearly with a one-time setup fee. The Plans page shows current \
         pricing for your selected OEM, and upgrades take effect from the next billing cycle.",
    ),
    (
        "deployment",
        "**Deployment Options**\n\nChoose *self-deployment* to receive API credentials and \
         integrate at your own pace, or *assisted implementation* to have our team run the \
         integration with you. You can pick either on the onboarding Deployment step.",
    ),
    (
        "support",
        "**Support**\n\nEmail support is included in every plan; Professional and Enterprise \
         add 24/7 priority support and a dedicated account manager. Reach us at \
         support@taxgenie.in.",
    ),
];

pub struct DemoResponder;

impl DemoResponder {
    pub fn new() -> Self {
        Self
    }

    /// Keyword match against the canned script, with a generic default.
    pub fn reply(&self, message: &str) -> String {
        let lower = message.to_lowercase();
        for (keyword, response) in DEMO_RESPONSES {
            if lower.contains(keyword) {
                return response.to_string();
            }
        }
        format!(
            "**TaxGenie ASN Expert**\n\nThank you for your question: \"{}\"\n\nI can help with \
             ASN 2.1 implementation, ERP integration, deployment options, plans and pricing, \
             and support. Ask about any of these, or visit www.taxgenie.in for a consultation.\n\n\
             *Responses are generated in demonstration mode. Configure your webhook in settings \
             for live answers.*",
            message
        )
    }
}

impl Default for DemoResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatResponder for DemoResponder {
    async fn respond(&self, message: &str) -> Result<String, PortalError> {
        Ok(self.reply(message))
    }
}
