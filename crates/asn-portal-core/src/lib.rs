//! Client library for the ASN vendor onboarding portal.
//!
//! This crate implements the portal's client-side logic against the remote
//! REST backend: authentication with 2FA, OEM portal selection, the
//! onboarding step progression, GSTIN and company settings, subscription
//! plans, credential issuance and export, and the AI-chat widget with its
//! offline fallback.
//!
//! # Architecture Overview
//!
//! - **Session store**: single typed cache of the last server responses with
//!   change notifications and reload-resume persistence
//! - **REST client**: uniform request builder with token and OEM scoping
//! - **Domain services**: 1:1 typed wrappers over backend endpoints
//! - **Step tracker**: the onboarding state machine, server-reconciled
//! - **Guards**: navigation predicates over session state
//! - **Chat**: webhook responder with a simulator fallback strategy

pub mod chat;
pub mod config;
pub mod core_types;
pub mod errors;
pub mod export;
pub mod guards;
pub mod portal;
pub mod rest;
pub mod services;
pub mod session;
pub mod tracker;
pub mod validation;

pub use config::{ConfigLoader, PortalConfig};
pub use errors::PortalError;
pub use guards::{GuardOutcome, Route};
pub use portal::Portal;
pub use rest::RestClient;
pub use session::{SessionEvent, SessionStore};
pub use tracker::{OnboardingStep, StepTracker};
