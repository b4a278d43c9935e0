//! Gmail accounts and the refresh-token variables derived from their names.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::Violation;
use super::secret::Secret;

static ACCOUNT_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// Prefix of the per-account refresh-token variable.
pub const REFRESH_TOKEN_PREFIX: &str = "GMAIL_REFRESH_TOKEN_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub refresh_token: Secret,
}

/// Account names become environment variable suffixes, so only
/// letters, digits and underscores are accepted.
pub fn validate_account_name(name: &str) -> Result<(), Violation> {
    if ACCOUNT_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(Violation::InvalidAccountName(name.to_string()))
    }
}

/// `work` -> `GMAIL_REFRESH_TOKEN_WORK`
pub fn refresh_token_var(name: &str) -> String {
    format!("{}{}", REFRESH_TOKEN_PREFIX, name.to_uppercase())
}

/// Split a comma-separated `GMAIL_ACCOUNTS` value, trimming entries and
/// dropping empty ones. Order is preserved.
pub fn split_account_names(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
