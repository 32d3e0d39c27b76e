//! Portal facade: wires configuration into a session, REST client and the
//! domain services.

use std::sync::Arc;

use crate::chat::ChatService;
use crate::config::PortalConfig;
use crate::errors::PortalError;
use crate::rest::RestClient;
use crate::services::{
    AuthService, DashboardService, OemService, OnboardingService, PlanService, SettingsService,
};
use crate::session::SessionStore;

pub struct Portal {
    config: PortalConfig,
    session: Arc<SessionStore>,
    rest: RestClient,
}

impl Portal {
    pub fn new(config: PortalConfig) -> Result<Self, PortalError> {
        config.validate()?;
        let session = Arc::new(match &config.session.snapshot_path {
            Some(path) => SessionStore::open(path),
            None => SessionStore::in_memory(),
        });
        let rest = RestClient::new(
            config.backend.base_url.clone(),
            config.backend.timeout(),
            session.clone(),
        )?;
        Ok(Self {
            config,
            session,
            rest,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.rest.clone())
    }

    pub fn oems(&self) -> OemService {
        OemService::new(self.rest.clone())
    }

    pub fn onboarding(&self) -> OnboardingService {
        OnboardingService::new(self.rest.clone())
    }

    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.rest.clone())
    }

    pub fn plans(&self) -> PlanService {
        PlanService::new(self.rest.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.rest.clone())
    }

    pub fn chat(&self) -> ChatService {
        ChatService::new(&self.config.chat)
    }
}
