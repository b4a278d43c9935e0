//! Load configuration from the environment and print what was found.

use anyhow::Result;

use crate::config::{load_config, Config};

/// Human-readable summary. Secrets are left out.
pub fn summary(config: &Config) -> String {
    format!(
        "Config loaded:\n  accounts:  {}\n  label:     {}\n  recipient: {}\n  provider:  {}",
        config.account_names().join(", "),
        config.app.label,
        config.app.recipient,
        config.ai.provider,
    )
}

/// newsdigest check-config
pub fn run() -> Result<()> {
    let config = load_config()?;
    println!("{}", summary(&config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_accounts_in_order() {
        let vars = [
            ("GMAIL_CLIENT_ID", "id"),
            ("GMAIL_CLIENT_SECRET", "secret"),
            ("GMAIL_ACCOUNTS", "work,personal"),
            ("GMAIL_REFRESH_TOKEN_WORK", "rt-work"),
            ("GMAIL_REFRESH_TOKEN_PERSONAL", "rt-personal"),
            ("AI_PROVIDER", "google"),
            ("GOOGLE_GENERATIVE_AI_API_KEY", "g-key"),
            ("GMAIL_LABEL", "Digest"),
        ];
        let config = Config::from_lookup(|name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
        .unwrap();

        let text = summary(&config);
        assert_eq!(
            text,
            "Config loaded:\n  accounts:  work, personal\n  label:     Digest\n  recipient: me\n  provider:  google"
        );
        assert!(!text.contains("rt-work"));
        assert!(!text.contains("g-key"));
    }
}
