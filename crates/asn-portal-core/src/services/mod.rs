//! Domain services: typed wrappers over the portal backend's REST endpoints.
//!
//! Each service maps endpoints 1:1 to typed request/response shapes and
//! performs no business logic beyond shape conversion and client-side form
//! validation. Every call goes to the network; nothing here caches beyond
//! writing the last successful response into the session store.

pub mod auth;
pub mod dashboard;
pub mod oem;
pub mod onboarding;
pub mod plans;
pub mod settings;

pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use oem::OemService;
pub use onboarding::OnboardingService;
pub use plans::PlanService;
pub use settings::SettingsService;
