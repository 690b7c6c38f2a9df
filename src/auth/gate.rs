//! Per-request authentication. Every request either passes through
//! anonymously (public path), passes with a resolved user attached to the
//! request extensions, or is rejected. The checks run strictly in order and
//! the first failure is final.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{TokenService, hash_token};
use crate::db::{CredentialStore, StoreError};
use crate::error::AppError;
use crate::state::SharedState;

pub const SESSION_COOKIE: &str = "auth_token";

#[derive(Debug)]
pub enum Rejection {
    TokenNotFound,
    TokenInvalid,
    TokenFormatInvalid,
    TokenExpired,
    UserNotFound,
    Store(StoreError),
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::UserNotFound => StatusCode::NOT_FOUND,
            Rejection::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rejection::TokenNotFound => "authentication token not found",
            Rejection::TokenInvalid => "authentication token invalid",
            Rejection::TokenFormatInvalid => "authentication token format invalid",
            Rejection::TokenExpired => "authentication token expired",
            Rejection::UserNotFound => "user not found",
            Rejection::Store(_) => "internal server error",
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        let message = rejection.message().to_string();
        match rejection {
            Rejection::Store(err) => AppError::Store(err),
            Rejection::UserNotFound => AppError::NotFound(message),
            _ => AppError::Unauthorized(message),
        }
    }
}

pub enum GateOutcome {
    /// Public path, no identity resolved.
    Anonymous,
    Authenticated(AuthUser),
}

/// Allowlist of paths that skip authentication. An entry ending in `/**`
/// matches that prefix and everything below it; any other entry must match
/// exactly.
#[derive(Debug, Clone)]
pub struct PublicPaths(Vec<String>);

impl PublicPaths {
    pub fn new(patterns: Vec<String>) -> Self {
        Self(patterns)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.0.iter().any(|pattern| match pattern.strip_suffix("/**") {
            Some(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            None => path == pattern,
        })
    }
}

#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
    credentials: Arc<dyn CredentialStore>,
    public: PublicPaths,
}

impl AuthGate {
    pub fn new(
        tokens: Arc<TokenService>,
        credentials: Arc<dyn CredentialStore>,
        public: PublicPaths,
    ) -> Self {
        Self {
            tokens,
            credentials,
            public,
        }
    }

    pub async fn check(&self, path: &str, headers: &HeaderMap) -> Result<GateOutcome, Rejection> {
        if self.public.is_public(path) {
            return Ok(GateOutcome::Anonymous);
        }

        let token = presented_token(headers)?;

        if !self.tokens.validate(&token, false) {
            return Err(Rejection::TokenInvalid);
        }

        let user_id = self
            .tokens
            .extract_user_id(&token)
            .map_err(|_| Rejection::TokenFormatInvalid)?;

        // A deleted row means the token was revoked, which callers see as expiry.
        self.credentials
            .find_user_token(user_id, &hash_token(&token))
            .await
            .map_err(Rejection::Store)?
            .ok_or(Rejection::TokenExpired)?;

        let user = self
            .credentials
            .find_by_id(user_id)
            .await
            .map_err(Rejection::Store)?
            .ok_or(Rejection::UserNotFound)?;

        Ok(GateOutcome::Authenticated(AuthUser { user, token }))
    }
}

/// Bearer header first. Without an `Authorization` header the session
/// cookie is used; a header that is present but not a bearer token is
/// never replaced by the cookie.
fn presented_token(headers: &HeaderMap) -> Result<String, Rejection> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::TokenNotFound)?;
        return Ok(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(Rejection::TokenNotFound)
}

/// Middleware wrapping every route.
pub async fn require_auth(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    match state.gate.check(&path, req.headers()).await {
        Ok(GateOutcome::Anonymous) => next.run(req).await,
        Ok(GateOutcome::Authenticated(auth)) => {
            tracing::debug!(user_id = %auth.user.id, %path, "request authenticated");
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(rejection) => {
            tracing::warn!(%path, reason = rejection.message(), "request rejected");
            AppError::from(rejection).into_response()
        }
    }
}
