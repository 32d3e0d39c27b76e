//! Portal client configuration: types, loading, validation.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{BackendConfig, ChatConfig, PortalConfig, SessionConfig};
