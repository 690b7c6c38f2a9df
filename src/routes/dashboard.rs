use axum::extract::State;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::services::{Dashboard, dashboard_for};
use crate::state::SharedState;

pub async fn show(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<ApiResponse<Dashboard>, AppError> {
    let dashboard = dashboard_for(&state.customers, auth.user_id()).await?;
    Ok(ApiResponse::success("dashboard", dashboard))
}
