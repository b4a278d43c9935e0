//! Configuration errors.
//!
//! Loading runs in two phases. Schema checks collect every [`Violation`]
//! into [`ConfigError::Invalid`]; the provider key check only runs once
//! those pass and fails on its own.

use thiserror::Error;

use super::AiProvider;

/// A single schema problem found while reading the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{0} required")]
    Missing(&'static str),

    #[error("GMAIL_ACCOUNTS required (comma-separated account names)")]
    NoAccounts,

    #[error("Invalid account name \"{0}\": only letters, digits, and underscores allowed")]
    InvalidAccountName(String),

    #[error("Duplicate account name \"{0}\" in GMAIL_ACCOUNTS")]
    DuplicateAccount(String),

    #[error("{var} required for account \"{account}\"")]
    MissingRefreshToken { var: String, account: String },

    #[error("Invalid AI_PROVIDER \"{0}\": expected one of anthropic, openai, google")]
    UnknownProvider(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration:\n{}", list_violations(.0))]
    Invalid(Vec<Violation>),

    #[error("{var} required when AI_PROVIDER={provider}")]
    MissingProviderKey {
        var: &'static str,
        provider: AiProvider,
    },
}

impl ConfigError {
    /// Schema violations, empty for the provider key error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(v) => v,
            Self::MissingProviderKey { .. } => &[],
        }
    }
}

fn list_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
