use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::gate::SESSION_COOKIE;
use crate::error::AppError;
use crate::models::PublicUser;
use crate::response::ApiResponse;
use crate::state::SharedState;
use crate::validation::{self, validate_login, validate_registration};

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: PublicUser,
}

fn session_cookie(token: &str, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    validation::into_result(validate_registration(&req.name, &req.email, &req.password))?;

    let user = state.auth.register(&req.name, &req.email, &req.password).await?;

    Ok(ApiResponse::success("user registered", PublicUser::from(&user))
        .with_status(StatusCode::CREATED))
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AppError> {
    validation::into_result(validate_login(&req.email, &req.password))?;

    let (user, token) = state.auth.login(&req.email, &req.password).await?;
    let ttl = state.tokens.ttl();

    let jar = jar.add(session_cookie(&token, ttl));
    Ok((
        jar,
        ApiResponse::success(
            "login successful",
            LoginResponse {
                token,
                token_type: "Bearer",
                expires_in: ttl.num_seconds(),
                user: PublicUser::from(&user),
            },
        ),
    ))
}

pub async fn logout(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    state.auth.logout(auth.user_id()).await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, ApiResponse::message("logged out")))
}

pub async fn me(auth: AuthUser) -> ApiResponse<PublicUser> {
    ApiResponse::success("current user", PublicUser::from(&auth.user))
}
