//! Local HTTP listener for the OAuth redirect.
//!
//! The listener stays idle until a `/callback` request carries a `code`.
//! That request moves it to exchanging; the first exchange result, success
//! or failure, ends the session. Every other request is answered and the
//! listener keeps waiting. There is no timeout.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, error, info, warn};
use url::Url;

use super::oauth::TokenExchange;
use super::{AuthError, AuthResult};
use crate::config::Secret;

pub const CALLBACK_PATH: &str = "/callback";

const SUCCESS_PAGE: &str = "<h1>Authorization successful!</h1><p>You can close this window.</p>";

/// Status, content type and body sent back to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl Reply {
    fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
        }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8"),
            body: body.into(),
        }
    }

    fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/html; charset=utf-8"),
            body: body.into(),
        }
    }
}

#[derive(Debug)]
pub enum CallbackOutcome {
    /// Answer and keep listening.
    Continue(Reply),
    /// Answer, then stop with the exchange result.
    Done {
        reply: Reply,
        result: AuthResult<Secret>,
    },
}

impl CallbackOutcome {
    pub fn reply(&self) -> &Reply {
        match self {
            Self::Continue(reply) | Self::Done { reply, .. } => reply,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Route one request target (path plus query) through the callback state machine.
pub fn handle_request<E: TokenExchange + ?Sized>(target: &str, exchanger: &E) -> CallbackOutcome {
    let Ok(url) = Url::parse(&format!("http://localhost{target}")) else {
        return CallbackOutcome::Continue(Reply::text(400, "Bad Request"));
    };

    if url.path() != CALLBACK_PATH {
        debug!(path = url.path(), "ignoring request");
        return CallbackOutcome::Continue(Reply::empty(404));
    }

    let mut code = None;
    let mut denied = None;
    for (key, value) in url.query_pairs() {
        match &*key {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" => denied = Some(value.into_owned()),
            _ => {}
        }
    }

    let Some(code) = code else {
        if let Some(reason) = denied {
            warn!(%reason, "authorization was not granted");
            return CallbackOutcome::Continue(Reply::text(
                400,
                format!("Authorization failed: {reason}"),
            ));
        }
        return CallbackOutcome::Continue(Reply::text(400, "Missing authorization code"));
    };

    info!("received authorization code, exchanging for tokens");
    match exchanger.refresh_token_for(&code) {
        Ok(token) => CallbackOutcome::Done {
            reply: Reply::html(200, SUCCESS_PAGE),
            result: Ok(token),
        },
        Err(e) => {
            error!(error = %e, "token exchange failed");
            CallbackOutcome::Done {
                reply: Reply::text(500, "Failed to exchange code for tokens"),
                result: Err(e),
            }
        }
    }
}

/// Loopback listeners feeding one request queue.
///
/// `localhost` may resolve to either `127.0.0.1` or `::1`, so both are
/// bound when the host has IPv6. Dropping the value stops the listeners.
pub struct CallbackServer {
    servers: Vec<Arc<Server>>,
    requests: Receiver<Request>,
    port: u16,
}

impl CallbackServer {
    /// Port both listeners are bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn listens_on_ipv6(&self) -> bool {
        self.servers.len() > 1
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        for server in &self.servers {
            server.unblock();
        }
    }
}

/// Listen on loopback at `port`. Port 0 picks a free one.
///
/// IPv4 is required; `::1` on the same port is added when available.
pub fn bind(port: u16) -> AuthResult<CallbackServer> {
    let ipv4 = Server::http((Ipv4Addr::LOCALHOST, port)).map_err(|e| {
        AuthError::Server(format!("failed to listen on port {port}: {e}"))
    })?;
    let port = ipv4
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .ok_or_else(|| AuthError::Server("listener has no IP address".to_string()))?;

    let mut servers = vec![Arc::new(ipv4)];
    match Server::http((Ipv6Addr::LOCALHOST, port)) {
        Ok(ipv6) => servers.push(Arc::new(ipv6)),
        Err(e) => debug!(error = %e, port, "IPv6 loopback unavailable"),
    }

    let (tx, requests) = mpsc::channel();
    for server in &servers {
        let server = Arc::clone(server);
        let tx = tx.clone();
        thread::spawn(move || {
            while let Ok(request) = server.recv() {
                if tx.send(request).is_err() {
                    break;
                }
            }
        });
    }

    info!(port, ipv6 = servers.len() > 1, "callback server listening");
    Ok(CallbackServer {
        servers,
        requests,
        port,
    })
}

/// Answer requests one at a time until an exchange completes.
pub fn serve<E: TokenExchange + ?Sized>(
    server: &CallbackServer,
    exchanger: &E,
) -> AuthResult<Secret> {
    loop {
        let request = server
            .requests
            .recv()
            .map_err(|_| AuthError::Server("listeners stopped".to_string()))?;
        debug!(method = %request.method(), url = request.url(), "callback request");

        match handle_request(request.url(), exchanger) {
            CallbackOutcome::Continue(reply) => respond(request, reply),
            CallbackOutcome::Done { reply, result } => {
                respond(request, reply);
                return result;
            }
        }
    }
}

fn respond(request: Request, reply: Reply) {
    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Some(content_type) = reply.content_type {
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()) {
            response = response.with_header(header);
        }
    }
    if let Err(e) = request.respond(response) {
        warn!(error = %e, "failed to write callback response");
    }
}
