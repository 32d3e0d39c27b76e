//! Typed session state for the portal client
//!
//! The original portal scattered raw storage reads and writes across every
//! component. This module replaces that with a single store exposing typed
//! get/set/clear operations plus change notifications, so callers subscribe
//! to state transitions instead of polling storage keys.
//!
//! The store is a cache of the last successful server responses, never a
//! source of truth. An optional JSON snapshot file gives it the same
//! reload-resume behavior the browser session storage provided: every
//! mutation is written through, and a store re-opened over the same path
//! resumes where the previous one left off. Logout wipes both the in-memory
//! state and the snapshot.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core_types::{CompanyInfo, GstinDetail, SelectedOem};
use crate::errors::PortalError;

/// Everything the portal keeps between page loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub two_fa_pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_fa_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_oem: Option<SelectedOem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info: Option<CompanyInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_step: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gstin_details: Vec<GstinDetail>,
}

/// Change notifications emitted on every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TokenChanged,
    TwoFaStateChanged,
    OemSelected,
    CompanyInfoUpdated,
    PlanChanged,
    StepChanged,
    GstinListUpdated,
    Cleared,
}

pub struct SessionStore {
    data: RwLock<SessionData>,
    events: broadcast::Sender<SessionEvent>,
    snapshot_path: Option<PathBuf>,
}

impl SessionStore {
    /// Volatile store with no snapshot file. State is lost on drop.
    pub fn in_memory() -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            data: RwLock::new(SessionData::default()),
            events,
            snapshot_path: None,
        }
    }

    /// Store backed by a JSON snapshot file. An existing readable snapshot is
    /// loaded; a missing or corrupt one starts the session empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<SessionData>(&content) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!(
                        "Discarding unreadable session snapshot {}: {}",
                        path.display(),
                        e
                    );
                    SessionData::default()
                }
            },
            Err(_) => SessionData::default(),
        };

        let (events, _) = broadcast::channel(32);
        Self {
            data: RwLock::new(data),
            events,
            snapshot_path: Some(path),
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionData {
        self.data.read().expect("session lock poisoned").clone()
    }

    pub fn token(&self) -> Option<String> {
        self.data.read().expect("session lock poisoned").token.clone()
    }

    pub fn set_token(&self, token: String) {
        self.mutate(SessionEvent::TokenChanged, |d| d.token = Some(token));
    }

    pub fn clear_token(&self) {
        self.mutate(SessionEvent::TokenChanged, |d| d.token = None);
    }

    pub fn two_fa_pending(&self) -> bool {
        self.data.read().expect("session lock poisoned").two_fa_pending
    }

    pub fn two_fa_email(&self) -> Option<String> {
        self.data
            .read()
            .expect("session lock poisoned")
            .two_fa_email
            .clone()
    }

    pub fn set_two_fa_pending(&self, email: Option<String>) {
        self.mutate(SessionEvent::TwoFaStateChanged, |d| {
            d.two_fa_pending = true;
            d.two_fa_email = email;
        });
    }

    pub fn complete_two_fa(&self) {
        self.mutate(SessionEvent::TwoFaStateChanged, |d| {
            d.two_fa_pending = false;
            d.two_fa_email = None;
        });
    }

    pub fn selected_oem(&self) -> Option<SelectedOem> {
        self.data
            .read()
            .expect("session lock poisoned")
            .selected_oem
            .clone()
    }

    pub fn set_selected_oem(&self, oem: SelectedOem) {
        self.mutate(SessionEvent::OemSelected, |d| d.selected_oem = Some(oem));
    }

    pub fn company_info(&self) -> Option<CompanyInfo> {
        self.data
            .read()
            .expect("session lock poisoned")
            .company_info
            .clone()
    }

    pub fn set_company_info(&self, info: CompanyInfo) {
        self.mutate(SessionEvent::CompanyInfoUpdated, |d| {
            d.company_info = Some(info)
        });
    }

    pub fn current_plan(&self) -> Option<String> {
        self.data
            .read()
            .expect("session lock poisoned")
            .current_plan
            .clone()
    }

    pub fn set_current_plan(&self, plan: String) {
        self.mutate(SessionEvent::PlanChanged, |d| d.current_plan = Some(plan));
    }

    pub fn onboarding_step(&self) -> Option<String> {
        self.data
            .read()
            .expect("session lock poisoned")
            .onboarding_step
            .clone()
    }

    pub fn set_onboarding_step(&self, step: String) {
        self.mutate(SessionEvent::StepChanged, |d| d.onboarding_step = Some(step));
    }

    pub fn gstin_details(&self) -> Vec<GstinDetail> {
        self.data
            .read()
            .expect("session lock poisoned")
            .gstin_details
            .clone()
    }

    pub fn set_gstin_details(&self, details: Vec<GstinDetail>) {
        self.mutate(SessionEvent::GstinListUpdated, |d| d.gstin_details = details);
    }

    /// Wipe everything, including the snapshot file. Used on logout and on a
    /// forced 401 logout; never fails.
    pub fn clear(&self) {
        {
            let mut data = self.data.write().expect("session lock poisoned");
            *data = SessionData::default();
        }
        if let Some(path) = &self.snapshot_path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    log::warn!("Failed to remove session snapshot {}: {}", path.display(), e);
                }
            }
        }
        let _ = self.events.send(SessionEvent::Cleared);
    }

    fn mutate<F: FnOnce(&mut SessionData)>(&self, event: SessionEvent, f: F) {
        {
            let mut data = self.data.write().expect("session lock poisoned");
            f(&mut data);
        }
        if let Err(e) = self.persist() {
            log::warn!("Failed to persist session snapshot: {}", e);
        }
        let _ = self.events.send(event);
    }

    fn persist(&self) -> Result<(), PortalError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let data = self.data.read().expect("session lock poisoned");
        let content = serde_json::to_string_pretty(&*data)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
