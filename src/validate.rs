//! Checks for the command-line inputs. All functions are pure;
//! the pipeline aborts on the first error they return.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Mode;
use crate::error::{ProvisionError, ProvisionResult};

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.-]+$").expect("static regex is valid"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex is valid"));

/// Accept a host name made of ASCII letters, digits, dots and
/// hyphens, containing at least one dot. No IDNA normalization.
pub fn validate_domain(domain: &str) -> ProvisionResult<()> {
    if domain.is_empty() {
        return Err(invalid("domain", "must not be empty"));
    }
    if !DOMAIN_RE.is_match(domain) {
        return Err(invalid(
            "domain",
            format!("'{domain}' contains characters outside [A-Za-z0-9.-]"),
        ));
    }
    if !domain.contains('.') {
        return Err(invalid(
            "domain",
            format!("'{domain}' must contain at least one '.'"),
        ));
    }
    Ok(())
}

/// Accept `local@domain.tld`: a single `@` and a dot somewhere
/// after it. Deliberately looser than RFC 5322.
pub fn validate_email(email: &str) -> ProvisionResult<()> {
    if email.is_empty() {
        return Err(invalid("email", "must not be empty"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(invalid(
            "email",
            format!("'{email}' is not of the form local@domain.tld"),
        ));
    }
    Ok(())
}

/// Accept exactly `dev` or `live`.
pub fn validate_mode(mode: &str) -> ProvisionResult<Mode> {
    mode.parse()
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ProvisionError {
    ProvisionError::InvalidArgument {
        field,
        reason: reason.into(),
    }
}
