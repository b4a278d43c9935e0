//! Google OAuth 2.0 authorization-code client.
//!
//! Builds the consent URL and trades the returned code for tokens at the
//! token endpoint. Requests are made once; there is no retry.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::form_urlencoded;

use super::{AuthError, AuthResult};
use crate::config::Secret;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Read, send, and modify access on the Gmail API.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.modify",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Anything that can turn an authorization code into a refresh token.
pub trait TokenExchange {
    fn refresh_token_for(&self, code: &str) -> AuthResult<Secret>;
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: Secret,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
}

impl OAuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Secret,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Point the consent URL somewhere other than Google.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Point token requests somewhere other than Google.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Consent URL asking for offline access, with the consent prompt
    /// forced so Google always issues a refresh token.
    pub fn authorization_url(&self) -> String {
        let scope = SCOPES.join(" ");
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &scope)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .finish();
        format!("{}?{}", self.auth_url, query)
    }

    /// POST the authorization code to the token endpoint.
    pub fn exchange_code(&self, code: &str) -> AuthResult<TokenResponse> {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        debug!(token_url = %self.token_url, "exchanging authorization code");

        let response = agent.post(&self.token_url).send_form(&[
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ]);

        let response = match response {
            Ok(r) => r,
            Err(ureq::Error::Status(status, r)) => {
                let body = r.into_string().unwrap_or_default();
                return Err(AuthError::TokenEndpoint { status, body });
            }
            Err(e) => return Err(AuthError::Network(e.to_string())),
        };

        let tokens: TokenResponse = response
            .into_json()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        info!(
            has_refresh_token = tokens.refresh_token.is_some(),
            "token exchange succeeded"
        );
        Ok(tokens)
    }
}

impl TokenExchange for OAuthClient {
    fn refresh_token_for(&self, code: &str) -> AuthResult<Secret> {
        self.exchange_code(code)?
            .refresh_token
            .filter(|t| !t.is_empty())
            .map(Secret::new)
            .ok_or(AuthError::MissingRefreshToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        OAuthClient::new(
            "123.apps.googleusercontent.com",
            Secret::new("shh"),
            "http://localhost:3000/callback",
        )
    }

    #[test]
    fn test_authorization_url_params() {
        let url = url::Url::parse(&client().authorization_url()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(url.path(), "/o/oauth2/v2/auth");

        let params: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "123.apps.googleusercontent.com");
        assert_eq!(params["redirect_uri"], "http://localhost:3000/callback");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["scope"], SCOPES.join(" "));
        assert!(!params.contains_key("client_secret"));
    }

    #[test]
    fn test_authorization_url_requests_mail_scopes() {
        let url = client().authorization_url();
        for scope in ["gmail.readonly", "gmail.send", "gmail.modify"] {
            assert!(url.contains(scope), "{scope} missing from {url}");
        }
    }

    #[test]
    fn test_authorization_url_override() {
        let url = client()
            .with_auth_url("http://127.0.0.1:9999/authorize")
            .authorization_url();
        assert!(url.starts_with("http://127.0.0.1:9999/authorize?client_id="), "{url}");
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("shh"));
    }
}
