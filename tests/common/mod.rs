//! Shared test fixtures and helpers.

#![allow(dead_code)]

use std::collections::HashMap;

use newsdigest::config::{Config, ConfigError};

/// A complete single-account environment using the default provider.
pub const BASE_ENV: &[(&str, &str)] = &[
    ("GMAIL_CLIENT_ID", "123.apps.googleusercontent.com"),
    ("GMAIL_CLIENT_SECRET", "client-secret"),
    ("GMAIL_ACCOUNTS", "work"),
    ("GMAIL_REFRESH_TOKEN_WORK", "1//rt-work"),
    ("ANTHROPIC_API_KEY", "sk-ant-test"),
];

/// BASE_ENV with `overrides` replacing or adding entries.
pub fn env_with(overrides: &[(&str, &str)]) -> HashMap<String, String> {
    let mut vars: HashMap<String, String> = BASE_ENV
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    vars
}

/// Remove `names` from an environment map.
pub fn without(mut vars: HashMap<String, String>, names: &[&str]) -> HashMap<String, String> {
    for name in names {
        vars.remove(*name);
    }
    vars
}

/// Run the loader against a map instead of the process environment.
pub fn load(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
    Config::from_lookup(|name| vars.get(name).cloned())
}
