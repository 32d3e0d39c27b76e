//! Navigation guard predicates
//!
//! Three boolean questions gate every page of the portal: is there a live
//! token, has an OEM been selected, and is a 2FA verification pending. Each
//! guard answers with either `Allow` or the page the user must be sent to
//! instead.

use crate::services::auth;
use crate::session::SessionStore;

/// Navigable destinations referenced by guards and the step tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    TwoFactor,
    OemSelection,
    Dashboard,
    Onboarding,
    CredentialSetup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Route),
}

/// Protected pages require a present, unexpired token.
pub fn require_auth(session: &SessionStore) -> GuardOutcome {
    match session.token() {
        Some(token) if !auth::token_is_expired(&token) => GuardOutcome::Allow,
        _ => GuardOutcome::Redirect(Route::SignIn),
    }
}

/// OEM-scoped pages additionally require a selected OEM.
pub fn require_oem(session: &SessionStore) -> GuardOutcome {
    match require_auth(session) {
        GuardOutcome::Allow => {
            if session.selected_oem().is_some() {
                GuardOutcome::Allow
            } else {
                GuardOutcome::Redirect(Route::OemSelection)
            }
        }
        redirect => redirect,
    }
}

/// The OTP entry page is reachable only while a 2FA verification is pending.
pub fn require_two_fa(session: &SessionStore) -> GuardOutcome {
    if session.two_fa_pending() {
        GuardOutcome::Allow
    } else {
        GuardOutcome::Redirect(Route::SignIn)
    }
}

/// Sign-in/sign-up pages bounce already-authenticated users to the dashboard.
pub fn guest_only(session: &SessionStore) -> GuardOutcome {
    match require_auth(session) {
        GuardOutcome::Allow => GuardOutcome::Redirect(Route::Dashboard),
        _ => GuardOutcome::Allow,
    }
}
