use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::auth::gate::SESSION_COOKIE;
use crate::error::AppError;
use crate::models::PublicUser;
use crate::response::ApiResponse;
use crate::state::SharedState;
use crate::validation::{self, validate_password_change, validate_profile};

#[derive(Deserialize)]
pub struct UpdateProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ChangePassword {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn update_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UpdateProfile>,
) -> Result<ApiResponse<PublicUser>, AppError> {
    validation::into_result(validate_profile(&req.name, &req.email))?;

    let user = state
        .auth
        .update_profile(auth.user, &req.name, &req.email)
        .await?;
    Ok(ApiResponse::success("profile updated", PublicUser::from(&user)))
}

/// Every session ends here, including the caller's.
pub async fn change_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<ChangePassword>,
) -> Result<(CookieJar, ApiResponse<()>), AppError> {
    validation::into_result(validate_password_change(
        &req.current_password,
        &req.new_password,
    ))?;

    state
        .auth
        .change_password(auth.user, &req.current_password, &req.new_password)
        .await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, ApiResponse::message("password changed, please log in again")))
}
