//! Client-side form validators
//!
//! These mirror the form-level checks the portal applies before a request is
//! built. The backend performs its own validation; failing fast here just
//! avoids a round trip for obviously malformed input.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::PortalError;

const GSTIN_PATTERN: &str = r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}$";
const PAN_PATTERN: &str = r"^[A-Z]{5}[0-9]{4}[A-Z]{1}$";
const MOBILE_PATTERN: &str = r"^[6-9][0-9]{9}$";
const STATE_CODE_PATTERN: &str = r"^[0-9]{2}$";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("validator pattern is valid"))
}

pub fn is_valid_gstin(gstin: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, GSTIN_PATTERN).is_match(gstin)
}

pub fn is_valid_pan(pan: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, PAN_PATTERN).is_match(pan)
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, MOBILE_PATTERN).is_match(mobile)
}

pub fn is_valid_state_code(code: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, STATE_CODE_PATTERN).is_match(code)
}

pub fn require_gstin(gstin: &str) -> Result<(), PortalError> {
    if is_valid_gstin(gstin) {
        Ok(())
    } else {
        Err(PortalError::Validation(format!(
            "'{}' is not a valid GSTIN",
            gstin
        )))
    }
}

pub fn require_pan(pan: &str) -> Result<(), PortalError> {
    if is_valid_pan(pan) {
        Ok(())
    } else {
        Err(PortalError::Validation(format!(
            "'{}' is not a valid PAN number",
            pan
        )))
    }
}

pub fn require_mobile(mobile: &str) -> Result<(), PortalError> {
    if is_valid_mobile(mobile) {
        Ok(())
    } else {
        Err(PortalError::Validation(format!(
            "'{}' is not a valid 10-digit mobile number",
            mobile
        )))
    }
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), PortalError> {
    if value.trim().is_empty() {
        Err(PortalError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
