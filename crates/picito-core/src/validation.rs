//! Boundary validation for user-supplied values.
//!
//! All checks run before any write and fail with
//! [`PicitoError::Validation`].

use validator::ValidateEmail;

use crate::error::{PicitoError, PicitoResult};

pub const ORG_NAME_MIN: usize = 2;
pub const ORG_NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const PROJECT_NAME_MIN: usize = 2;
pub const PROJECT_NAME_MAX: usize = 100;
pub const SETTING_KEY_MAX: usize = 64;

/// Trims and lowercases an email address, then checks its shape.
///
/// Besides the HTML5 shape checked by [`ValidateEmail`], the domain must
/// be dotted: single-label hosts are not accepted as login addresses.
pub fn normalize_email(raw: &str) -> PicitoResult<String> {
    let email = raw.trim().to_lowercase();
    if !email.validate_email() {
        return Err(invalid_email(raw));
    }
    match email.rsplit_once('@') {
        Some((_, domain)) if domain.contains('.') => Ok(email),
        _ => Err(invalid_email(raw)),
    }
}

fn invalid_email(raw: &str) -> PicitoError {
    PicitoError::validation(format!("invalid email address: {raw}"))
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> PicitoResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(PicitoError::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Returns the trimmed organization name.
pub fn organization_name(raw: &str) -> PicitoResult<String> {
    let name = raw.trim();
    check_length("name", name, ORG_NAME_MIN, ORG_NAME_MAX)?;
    Ok(name.to_string())
}

pub fn description(raw: &str) -> PicitoResult<String> {
    let description = raw.trim();
    check_length("description", description, 0, DESCRIPTION_MAX)?;
    Ok(description.to_string())
}

pub fn project_name(raw: &str) -> PicitoResult<String> {
    let name = raw.trim();
    check_length("name", name, PROJECT_NAME_MIN, PROJECT_NAME_MAX)?;
    Ok(name.to_string())
}

/// Accepts absolute `http`/`https` URLs only.
pub fn embed_url(raw: &str) -> PicitoResult<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| PicitoError::validation(format!("invalid embed URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(PicitoError::validation(format!(
            "embed URL scheme must be http or https, got {other}"
        ))),
    }
}

/// Checks a semantic version string and returns it in canonical form.
pub fn semantic_version(raw: &str) -> PicitoResult<String> {
    semver::Version::parse(raw.trim())
        .map(|v| v.to_string())
        .map_err(|e| PicitoError::validation(format!("invalid semantic version {raw:?}: {e}")))
}

/// Setting keys: 1-64 chars of `[a-z0-9_.-]`.
pub fn setting_key(raw: &str) -> PicitoResult<String> {
    let ok = !raw.is_empty()
        && raw.len() <= SETTING_KEY_MAX
        && raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'.' | b'-'));
    if !ok {
        return Err(PicitoError::validation(format!("invalid setting key: {raw:?}")));
    }
    Ok(raw.to_string())
}
