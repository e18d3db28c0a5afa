//! Token authentication middleware.
//!
//! Users send their JWT in the `token` header (or `Authorization: Bearer`),
//! administrators in the `atoken` header. Every failure produces the same
//! response body so callers cannot tell why they were turned away.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use booking_types::{MessageResponse, UserId};

use super::jwt::JwtService;

pub const USER_TOKEN_HEADER: &str = "token";
pub const ADMIN_TOKEN_HEADER: &str = "atoken";

const NOT_AUTHORIZED: &str = "Not Authorized, Login Again";

/// Why a request was refused. Logged, never returned to the client.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no token presented")]
    MissingToken,

    #[error("token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("token does not grant access: {0}")]
    Forbidden(&'static str),
}

/// The authenticated caller, attached to the request by [`user_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

/// Verifier shared by both middleware variants.
pub struct AuthState {
    pub jwt: JwtService,
    pub admin_email: String,
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Extracts the user token from the `token` header, falling back to
/// `Authorization: Bearer <jwt>`.
fn user_token(headers: &HeaderMap) -> Option<&str> {
    header_value(headers, USER_TOKEN_HEADER).or_else(|| {
        header_value(headers, "Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

impl AuthState {
    fn authenticate_user(&self, headers: &HeaderMap) -> Result<UserId, AuthError> {
        let token = user_token(headers).ok_or(AuthError::MissingToken)?;
        let claims = self.jwt.verify(token)?;

        claims
            .id
            .map(UserId::new)
            .filter(|id| !id.is_blank())
            .ok_or(AuthError::Forbidden("token carries no user id"))
    }

    fn authenticate_admin(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = header_value(headers, ADMIN_TOKEN_HEADER).ok_or(AuthError::MissingToken)?;
        let claims = self.jwt.verify(token)?;

        match claims.email {
            Some(email) if email == self.admin_email => Ok(()),
            _ => Err(AuthError::Forbidden("not the administrator")),
        }
    }

    /// Stable identity behind a verified token, if any. Unverified tokens
    /// yield `None`.
    pub(crate) fn caller_identity(&self, headers: &HeaderMap) -> Option<String> {
        if let Ok(user) = self.authenticate_user(headers) {
            return Some(format!("user:{user}"));
        }
        self.authenticate_admin(headers)
            .ok()
            .map(|()| format!("admin:{}", self.admin_email))
    }
}

/// Requires a valid user token and attaches [`AuthUser`].
pub async fn user_auth(
    State(auth): State<Arc<AuthState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match auth.authenticate_user(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(AuthUser(user));
            next.run(request).await
        }
        Err(e) => denied(request.uri().path(), e),
    }
}

/// Requires a valid admin token whose email matches the configured admin.
pub async fn admin_auth(
    State(auth): State<Arc<AuthState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match auth.authenticate_admin(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(e) => denied(request.uri().path(), e),
    }
}

fn denied(path: &str, err: AuthError) -> Response {
    tracing::debug!(path, error = %err, "request not authorized");
    Json(MessageResponse::failed(NOT_AUTHORIZED)).into_response()
}
