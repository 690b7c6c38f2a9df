use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::gate::Rejection;
use crate::error::AppError;
use crate::models::User;

/// The identity the gate resolved for this request. Handlers take it as a
/// parameter; it is never looked up from shared state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// The raw token the caller presented.
    pub token: String,
}

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Absent when the route sits on the public allowlist.
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| Rejection::TokenNotFound.into())
    }
}
