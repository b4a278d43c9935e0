//! Gmail OAuth authorization.
//!
//! One session per process: print and open the consent URL, wait on
//! localhost for the redirect, trade the code for a refresh token, and
//! print it as an environment variable line ready for `.env`.

pub mod browser;
pub mod callback;
pub mod oauth;

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use thiserror::Error;
use tracing::warn;

use crate::config::{
    refresh_token_var, validate_account_name, Secret, CLIENT_ID_VAR, CLIENT_SECRET_VAR,
};

use self::oauth::OAuthClient;

/// Fixed so the redirect URI matches the one registered with Google.
pub const CALLBACK_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Network(String),

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("token response did not include a refresh_token")]
    MissingRefreshToken,

    #[error("callback server: {0}")]
    Server(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

pub fn redirect_uri(port: u16) -> String {
    format!("http://localhost:{port}{}", callback::CALLBACK_PATH)
}

/// The line operators paste into `.env`, e.g. `GMAIL_REFRESH_TOKEN_WORK=1//0g...`.
pub fn env_line(account: &str, refresh_token: &str) -> String {
    format!("{}={}", refresh_token_var(account), refresh_token)
}

/// Success banner followed by the `.env` line on its own line.
pub fn print_success(out: &mut impl Write, account: &str, refresh_token: &Secret) -> io::Result<()> {
    writeln!(out, "Authorization successful for account \"{}\"!\n", account)?;
    writeln!(out, "Add this to your .env file:\n")?;
    writeln!(out, "{}", env_line(account, refresh_token.expose()))?;
    writeln!(out)
}

/// newsdigest auth --account NAME [--no-browser]
pub fn run(account: &str, open_browser: bool) -> Result<()> {
    validate_account_name(account)?;

    let client_id = std::env::var(CLIENT_ID_VAR).ok().filter(|v| !v.is_empty());
    let client_secret = std::env::var(CLIENT_SECRET_VAR).ok().filter(|v| !v.is_empty());
    let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
        bail!("Missing {} or {} in .env", CLIENT_ID_VAR, CLIENT_SECRET_VAR);
    };

    let client = OAuthClient::new(client_id, Secret::new(client_secret), redirect_uri(CALLBACK_PORT));
    let auth_url = client.authorization_url();

    let server = callback::bind(CALLBACK_PORT)
        .with_context(|| format!("Cannot receive the OAuth callback on port {}", CALLBACK_PORT))?;

    println!("Authorizing account \"{}\"...\n", account);
    if open_browser {
        println!("Opening browser for authorization...\n");
    }
    println!("If browser doesn't open, visit:\n");
    println!("{}\n", auth_url);

    if open_browser {
        if let Err(e) = browser::open_browser(&auth_url) {
            warn!(error = %e, "failed to open browser");
            println!("Could not open browser automatically. Please visit the URL above.\n");
        }
    }

    println!("Waiting for callback on {} ...\n", client.redirect_uri());
    let token = callback::serve(&server, &client).context("Token exchange failed")?;
    drop(server);

    print_success(&mut io::stdout().lock(), account, &token)?;
    Ok(())
}
