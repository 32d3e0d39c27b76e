//! Onboarding step tracker
//!
//! Linear progression `confirmation → payment → deployment`, with
//! `self-deployment` reachable only from `deployment`. The pointer moves
//! forward one step at a time and never skips; a failed step-advancing call
//! leaves it untouched because callers only advance after the backend has
//! acknowledged the action.
//!
//! The current step name is written through the session store on every
//! transition so a reload resumes at the same point. On resume the server's
//! own progress record, when available, is authoritative and overwrites the
//! local pointer; the persisted name is only trusted offline.

use std::sync::Arc;

use crate::core_types::Progress;
use crate::errors::PortalError;
use crate::guards::Route;
use crate::services::onboarding::DeploymentType;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OnboardingStep {
    Confirmation,
    Payment,
    Deployment,
    SelfDeployment,
}

impl OnboardingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::Confirmation => "confirmation",
            OnboardingStep::Payment => "payment",
            OnboardingStep::Deployment => "deployment",
            OnboardingStep::SelfDeployment => "self-deployment",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "confirmation" => Some(OnboardingStep::Confirmation),
            "payment" => Some(OnboardingStep::Payment),
            "deployment" => Some(OnboardingStep::Deployment),
            "self-deployment" => Some(OnboardingStep::SelfDeployment),
            _ => None,
        }
    }
}

/// Map the server's progress record onto a local step, keyed off the title of
/// the step the backend marks as current.
fn step_from_progress(progress: &Progress) -> Option<OnboardingStep> {
    let title = progress.current_step_title()?.to_lowercase();
    if title.contains("confirmation") || title.contains("asn") {
        Some(OnboardingStep::Confirmation)
    } else if title.contains("payment") {
        Some(OnboardingStep::Payment)
    } else if title.contains("deployment") {
        Some(OnboardingStep::Deployment)
    } else {
        None
    }
}

pub struct StepTracker {
    session: Arc<SessionStore>,
    current: OnboardingStep,
}

impl StepTracker {
    /// Resume the tracker. Server progress wins when present; the persisted
    /// step name is the offline fallback; a fresh session starts at
    /// confirmation.
    pub fn resume(session: Arc<SessionStore>, server_progress: Option<&Progress>) -> Self {
        let from_server = server_progress.and_then(step_from_progress);
        let from_session = session
            .onboarding_step()
            .as_deref()
            .and_then(OnboardingStep::parse);

        let current = match (from_server, from_session) {
            (Some(server), local) => {
                if local.is_some() && local != Some(server) {
                    log::info!(
                        "Local step pointer {:?} disagrees with server record; following server to {:?}",
                        local,
                        server
                    );
                }
                server
            }
            (None, Some(local)) => local,
            (None, None) => OnboardingStep::Confirmation,
        };

        let tracker = Self { session, current };
        tracker.persist();
        tracker
    }

    pub fn current(&self) -> OnboardingStep {
        self.current
    }

    /// Page the user should be looking at for the current step.
    pub fn route_for_current(&self) -> Route {
        match self.current {
            OnboardingStep::SelfDeployment => Route::CredentialSetup,
            _ => Route::Onboarding,
        }
    }

    /// Advance after the backend has acknowledged ASN confirmation and the
    /// user accepted the confirmation dialog. Declining keeps the pointer at
    /// confirmation.
    pub fn confirmation_acknowledged(&mut self, accepted: bool) -> Result<(), PortalError> {
        self.expect(OnboardingStep::Confirmation)?;
        if accepted {
            self.set(OnboardingStep::Payment);
        }
        Ok(())
    }

    /// Advance after the payment dialog returned a chosen method. No real
    /// payment processing happens; the selection itself completes the step.
    pub fn payment_method_selected(&mut self, method: &str) -> Result<(), PortalError> {
        self.expect(OnboardingStep::Payment)?;
        if method.trim().is_empty() {
            return Err(PortalError::Validation(
                "a payment method must be chosen".to_string(),
            ));
        }
        log::info!("Payment method '{}' selected", method);
        self.set(OnboardingStep::Deployment);
        Ok(())
    }

    /// Route the deployment choice: `self` moves to the self-deployment step
    /// and the credential setup page; `assisted` stays at deployment and
    /// hands over to the dashboard.
    pub fn deployment_selected(
        &mut self,
        deployment_type: DeploymentType,
    ) -> Result<Route, PortalError> {
        self.expect(OnboardingStep::Deployment)?;
        match deployment_type {
            DeploymentType::SelfDeployment => {
                self.set(OnboardingStep::SelfDeployment);
                Ok(Route::CredentialSetup)
            }
            DeploymentType::Assisted => Ok(Route::Dashboard),
        }
    }

    fn expect(&self, step: OnboardingStep) -> Result<(), PortalError> {
        if self.current == step {
            Ok(())
        } else {
            Err(PortalError::Validation(format!(
                "cannot act on the {} step while at {}",
                step.as_str(),
                self.current.as_str()
            )))
        }
    }

    fn set(&mut self, step: OnboardingStep) {
        debug_assert!(step > self.current, "step pointer only moves forward");
        self.current = step;
        self.persist();
    }

    fn persist(&self) {
        self.session.set_onboarding_step(self.current.as_str().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{StepProgress, StepStatus};

    fn progress_with_current(title: &str) -> Progress {
        Progress {
            completed_steps: 1,
            total_steps: 4,
            current_step_id: 2,
            percentage: 25.0,
            steps: vec![StepProgress {
                id: 2,
                title: title.into(),
                description: String::new(),
                status: StepStatus::Current,
                completed_at: None,
            }],
            last_updated: None,
        }
    }

    #[test]
    fn fresh_session_starts_at_confirmation() {
        let session = Arc::new(SessionStore::in_memory());
        let tracker = StepTracker::resume(session, None);
        assert_eq!(tracker.current(), OnboardingStep::Confirmation);
    }

    #[test]
    fn pointer_advances_forward_without_skipping() {
        let session = Arc::new(SessionStore::in_memory());
        let mut tracker = StepTracker::resume(session.clone(), None);

        // Deployment actions are rejected before their step is reached.
        assert!(tracker.payment_method_selected("NEFT").is_err());
        assert!(tracker
            .deployment_selected(DeploymentType::SelfDeployment)
            .is_err());
        assert_eq!(tracker.current(), OnboardingStep::Confirmation);

        tracker.confirmation_acknowledged(true).unwrap();
        assert_eq!(tracker.current(), OnboardingStep::Payment);

        tracker.payment_method_selected("NEFT").unwrap();
        assert_eq!(tracker.current(), OnboardingStep::Deployment);

        // Confirmation cannot be re-acknowledged once passed.
        assert!(tracker.confirmation_acknowledged(true).is_err());
    }

    #[test]
    fn declined_confirmation_stays_put() {
        let session = Arc::new(SessionStore::in_memory());
        let mut tracker = StepTracker::resume(session, None);
        tracker.confirmation_acknowledged(false).unwrap();
        assert_eq!(tracker.current(), OnboardingStep::Confirmation);
    }

    #[test]
    fn self_deployment_routes_to_credential_setup_never_dashboard() {
        let session = Arc::new(SessionStore::in_memory());
        let mut tracker = StepTracker::resume(session, None);
        tracker.confirmation_acknowledged(true).unwrap();
        tracker.payment_method_selected("UPI").unwrap();

        let route = tracker
            .deployment_selected(DeploymentType::SelfDeployment)
            .unwrap();
        assert_eq!(route, Route::CredentialSetup);
        assert_eq!(tracker.current(), OnboardingStep::SelfDeployment);
        assert_eq!(tracker.route_for_current(), Route::CredentialSetup);
    }

    #[test]
    fn assisted_deployment_routes_to_dashboard_and_stays_at_deployment() {
        let session = Arc::new(SessionStore::in_memory());
        let mut tracker = StepTracker::resume(session, None);
        tracker.confirmation_acknowledged(true).unwrap();
        tracker.payment_method_selected("UPI").unwrap();

        let route = tracker.deployment_selected(DeploymentType::Assisted).unwrap();
        assert_eq!(route, Route::Dashboard);
        assert_eq!(tracker.current(), OnboardingStep::Deployment);
    }

    #[test]
    fn reload_resumes_at_last_persisted_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = Arc::new(SessionStore::open(&path));
        let mut tracker = StepTracker::resume(session, None);
        tracker.confirmation_acknowledged(true).unwrap();
        tracker.payment_method_selected("card").unwrap();

        // Simulated reload: a new store over the same snapshot, offline.
        let reloaded = Arc::new(SessionStore::open(&path));
        let resumed = StepTracker::resume(reloaded, None);
        assert_eq!(resumed.current(), OnboardingStep::Deployment);
    }

    #[test]
    fn server_progress_overrides_local_pointer() {
        let session = Arc::new(SessionStore::in_memory());
        session.set_onboarding_step("deployment".into());

        let server = progress_with_current("Payment");
        let tracker = StepTracker::resume(session.clone(), Some(&server));
        assert_eq!(tracker.current(), OnboardingStep::Payment);
        // The reconciled pointer is persisted back.
        assert_eq!(session.onboarding_step().as_deref(), Some("payment"));
    }

    #[test]
    fn unrecognized_server_step_falls_back_to_local() {
        let session = Arc::new(SessionStore::in_memory());
        session.set_onboarding_step("payment".into());

        let server = progress_with_current("Production Go Live");
        let tracker = StepTracker::resume(session, Some(&server));
        assert_eq!(tracker.current(), OnboardingStep::Payment);
    }

    #[test]
    fn asn_confirmation_title_maps_to_confirmation_step() {
        let server = progress_with_current("ASN 2.1 Confirmation");
        assert_eq!(
            step_from_progress(&server),
            Some(OnboardingStep::Confirmation)
        );
        let server = progress_with_current("Deployment Method Selection");
        assert_eq!(step_from_progress(&server), Some(OnboardingStep::Deployment));
    }
}
