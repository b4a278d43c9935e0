//! Environment configuration for the newsletter digest.
//!
//! Reads Gmail OAuth credentials, the account list, the AI provider and
//! app settings from environment variables. An empty variable counts as
//! unset.
//!
//! Accounts come from `GMAIL_ACCOUNTS` (comma-separated names), each with
//! its own `GMAIL_REFRESH_TOKEN_<NAME>`. Setups predating multi-account
//! support that only define `GMAIL_REFRESH_TOKEN` load as a single
//! account named `default`.

pub mod account;
pub mod error;
pub mod secret;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

pub use self::account::{refresh_token_var, split_account_names, validate_account_name, Account};
pub use self::error::{ConfigError, Violation};
pub use self::secret::Secret;

pub const CLIENT_ID_VAR: &str = "GMAIL_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "GMAIL_CLIENT_SECRET";
pub const ACCOUNTS_VAR: &str = "GMAIL_ACCOUNTS";
pub const LEGACY_REFRESH_TOKEN_VAR: &str = "GMAIL_REFRESH_TOKEN";
pub const PROVIDER_VAR: &str = "AI_PROVIDER";
pub const LABEL_VAR: &str = "GMAIL_LABEL";
pub const RECIPIENT_VAR: &str = "DIGEST_RECIPIENT";

pub const DEFAULT_LABEL: &str = "Newsletters";
pub const DEFAULT_RECIPIENT: &str = "me";
pub const LEGACY_ACCOUNT_NAME: &str = "default";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AiProvider {
    #[default]
    Anthropic,
    OpenAi,
    Google,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Google => "google",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Google => "GOOGLE_GENERATIVE_AI_API_KEY",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "google" => Ok(Self::Google),
            other => Err(Violation::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GmailConfig {
    pub client_id: String,
    pub client_secret: Secret,
    /// Non-empty, in the order listed in `GMAIL_ACCOUNTS`.
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub anthropic_key: Option<Secret>,
    pub openai_key: Option<Secret>,
    pub google_key: Option<Secret>,
}

impl AiConfig {
    /// Key for the selected provider.
    pub fn api_key(&self) -> Option<&Secret> {
        match self.provider {
            AiProvider::Anthropic => self.anthropic_key.as_ref(),
            AiProvider::OpenAi => self.openai_key.as_ref(),
            AiProvider::Google => self.google_key.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub label: String,
    pub recipient: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            recipient: DEFAULT_RECIPIENT.to_string(),
        }
    }
}

/// Validated configuration. Built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub gmail: GmailConfig,
    pub ai: AiConfig,
    pub app: AppConfig,
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    Config::from_lookup(|name| std::env::var(name).ok())
}

impl Config {
    /// Build a config from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let mut violations = Vec::new();

        let client_id = var(CLIENT_ID_VAR);
        if client_id.is_none() {
            violations.push(Violation::Missing(CLIENT_ID_VAR));
        }
        let client_secret = var(CLIENT_SECRET_VAR);
        if client_secret.is_none() {
            violations.push(Violation::Missing(CLIENT_SECRET_VAR));
        }

        let accounts = parse_accounts(&var, &mut violations);

        let provider = match var(PROVIDER_VAR) {
            None => AiProvider::default(),
            Some(raw) => raw.parse::<AiProvider>().unwrap_or_else(|v| {
                violations.push(v);
                AiProvider::default()
            }),
        };

        let (client_id, client_secret) = match (client_id, client_secret) {
            (Some(id), Some(secret)) if violations.is_empty() => (id, secret),
            _ => return Err(ConfigError::Invalid(violations)),
        };

        let config = Config {
            gmail: GmailConfig {
                client_id,
                client_secret: Secret::new(client_secret),
                accounts,
            },
            ai: AiConfig {
                provider,
                anthropic_key: var(AiProvider::Anthropic.api_key_var()).map(Secret::new),
                openai_key: var(AiProvider::OpenAi.api_key_var()).map(Secret::new),
                google_key: var(AiProvider::Google.api_key_var()).map(Secret::new),
            },
            app: AppConfig {
                label: var(LABEL_VAR).unwrap_or_else(|| DEFAULT_LABEL.to_string()),
                recipient: var(RECIPIENT_VAR).unwrap_or_else(|| DEFAULT_RECIPIENT.to_string()),
            },
        };

        if config.ai.api_key().is_none() {
            return Err(ConfigError::MissingProviderKey {
                var: provider.api_key_var(),
                provider,
            });
        }

        debug!(
            accounts = config.gmail.accounts.len(),
            provider = %config.ai.provider,
            label = %config.app.label,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn account_names(&self) -> Vec<&str> {
        self.gmail.accounts.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Resolve accounts from `GMAIL_ACCOUNTS`, falling back to the legacy
/// single `GMAIL_REFRESH_TOKEN`. Problems are pushed onto `violations`.
fn parse_accounts<F>(var: &F, violations: &mut Vec<Violation>) -> Vec<Account>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(ACCOUNTS_VAR) else {
        if let Some(token) = var(LEGACY_REFRESH_TOKEN_VAR) {
            debug!("{} unset, using {}", ACCOUNTS_VAR, LEGACY_REFRESH_TOKEN_VAR);
            return vec![Account {
                name: LEGACY_ACCOUNT_NAME.to_string(),
                refresh_token: Secret::new(token),
            }];
        }
        violations.push(Violation::NoAccounts);
        return Vec::new();
    };

    let names = split_account_names(&raw);
    if names.is_empty() {
        violations.push(Violation::NoAccounts);
        return Vec::new();
    }

    // Names differing only by case share a token variable.
    let mut seen = HashSet::new();
    let mut accounts = Vec::with_capacity(names.len());
    for name in names {
        if let Err(v) = validate_account_name(name) {
            violations.push(v);
            continue;
        }
        if !seen.insert(name.to_uppercase()) {
            violations.push(Violation::DuplicateAccount(name.to_string()));
            continue;
        }
        let token_var = refresh_token_var(name);
        match var(&token_var) {
            Some(token) => accounts.push(Account {
                name: name.to_string(),
                refresh_token: Secret::new(token),
            }),
            None => violations.push(Violation::MissingRefreshToken {
                var: token_var,
                account: name.to_string(),
            }),
        }
    }
    accounts
}
