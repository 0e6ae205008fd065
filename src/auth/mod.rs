//! Bearer-token session authentication.
//!
//! Every protected endpoint resolves its acting identity through
//! [`SessionAuthenticator::authenticate`]: the `Authorization: Bearer <token>`
//! header is read, the token is looked up in the session store and the
//! matching user id is returned. The lookup is read-only and never touches
//! session lifetime, so repeated calls with the same token are idempotent.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

use crate::database::{DatabaseError, SessionStore};
use crate::types::UserId;

/// Literal, case-sensitive scheme prefix including the single space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Why a request carried no usable credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No `Authorization` header, or one without the `Bearer ` prefix.
    MissingHeader,
    /// The header value is not visible ASCII and cannot be read at all.
    MalformedHeader,
    /// Well-formed header whose token matches no session.
    UnknownToken,
}

impl RejectReason {
    /// Client-facing message for the 401 body.
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::MissingHeader | RejectReason::MalformedHeader => "Unauthorized",
            RejectReason::UnknownToken => "Invalid token",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(UserId),
    Rejected(RejectReason),
}

/// An [`AuthOutcome`] that still borrows the presented token.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Resolution<'h> {
    Session { user_id: UserId, token: &'h str },
    Rejected(RejectReason),
}

/// Infrastructure failure while authenticating. Never a credential problem.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session store unavailable: {0}")]
    StoreUnavailable(#[source] DatabaseError),
}

#[derive(Clone)]
pub struct SessionAuthenticator {
    store: Arc<dyn SessionStore>,
}

impl SessionAuthenticator {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthOutcome, AuthError> {
        Ok(match self.resolve(headers).await? {
            Resolution::Session { user_id, .. } => AuthOutcome::Authenticated(user_id),
            Resolution::Rejected(reason) => AuthOutcome::Rejected(reason),
        })
    }

    /// Like [`authenticate`](Self::authenticate), but keeps the token that
    /// resolved so the middleware can hand it on without re-reading headers.
    pub(crate) async fn resolve<'h>(&self, headers: &'h HeaderMap) -> Result<Resolution<'h>, AuthError> {
        let token = match bearer_token(headers) {
            Ok(token) => token,
            Err(reason) => {
                tracing::debug!(?reason, "request rejected before session lookup");
                return Ok(Resolution::Rejected(reason));
            }
        };

        match self.store.user_id_for_token(token).await {
            Ok(Some(user_id)) => {
                tracing::debug!(%user_id, token = %fingerprint(token), "session resolved");
                Ok(Resolution::Session { user_id, token })
            }
            Ok(None) => {
                tracing::warn!(token = %fingerprint(token), "unknown session token");
                Ok(Resolution::Rejected(RejectReason::UnknownToken))
            }
            Err(e) => {
                if e.is_unavailable() {
                    tracing::error!("session store unreachable: {}", e);
                } else {
                    tracing::error!("session lookup query failed: {}", e);
                }
                Err(AuthError::StoreUnavailable(e))
            }
        }
    }
}

/// Extracts the raw token following `Bearer `. The token is returned verbatim,
/// so an empty string is a valid (if unknown) token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, RejectReason> {
    let value = headers.get(AUTHORIZATION).ok_or(RejectReason::MissingHeader)?;
    let value = value.to_str().map_err(|_| RejectReason::MalformedHeader)?;
    value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(RejectReason::MissingHeader)
}

/// Short stable identifier for a token, safe to write to logs.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}
