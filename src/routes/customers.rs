use std::collections::BTreeMap;

use axum::Json;
use axum::extract::multipart::{Field, Multipart};
use axum::extract::{FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::{Customer, CustomerData};
use crate::response::ApiResponse;
use crate::state::SharedState;
use crate::storage::UploadedFile;
use crate::validation::{self, validate_customer};

const FILE_FIELD: &str = "file";

/// The `{id}` path segment. A value that is not a UUID is a 400 in the
/// usual error envelope.
pub struct CustomerId(pub Uuid);

impl<S> FromRequestParts<S> for CustomerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state).await?;
        Ok(CustomerId(id))
    }
}

fn not_found() -> AppError {
    AppError::NotFound("customer not found".to_string())
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Text fields plus an optional `file` part. Unknown parts are skipped.
async fn read_customer_form(
    mut multipart: Multipart,
) -> Result<(CustomerData, Option<UploadedFile>), AppError> {
    let mut data = CustomerData::default();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                file = Some(UploadedFile::new(filename, content_type, bytes));
            }
            "name" => data.name = field_text(field).await?.trim().to_string(),
            "email" => data.email = field_text(field).await?.trim().to_string(),
            "phone" => data.phone = non_blank(field_text(field).await?),
            "address" => data.address = non_blank(field_text(field).await?),
            "type" => data.customer_type = non_blank(field_text(field).await?),
            other => tracing::debug!(field = %other, "ignoring unknown form field"),
        }
    }

    Ok((data, file))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<ApiResponse<Vec<Customer>>, AppError> {
    let customers = state.customers.list_by_user(auth.user_id()).await?;
    Ok(ApiResponse::success("customers", customers))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (data, file) = read_customer_form(multipart).await?;
    validation::into_result(validate_customer(&data))?;

    let customer = state
        .customers
        .create(data, auth.user_id(), file.as_ref())
        .await?;
    Ok(ApiResponse::success("customer created", customer).with_status(StatusCode::CREATED))
}

pub async fn chart(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<ApiResponse<BTreeMap<String, i64>>, AppError> {
    let summary = state.customers.chart_summary(auth.user_id()).await?;
    Ok(ApiResponse::success("customer types", summary))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    CustomerId(id): CustomerId,
) -> Result<ApiResponse<Customer>, AppError> {
    let customer = state
        .customers
        .get_by_id_for_user(id, auth.user_id())
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success("customer", customer))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    CustomerId(id): CustomerId,
    Json(data): Json<CustomerData>,
) -> Result<ApiResponse<Customer>, AppError> {
    validation::into_result(validate_customer(&data))?;

    let customer = state
        .customers
        .update(id, data, auth.user_id())
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success("customer updated", customer))
}

pub async fn update_image(
    auth: AuthUser,
    State(state): State<SharedState>,
    CustomerId(id): CustomerId,
    multipart: Multipart,
) -> Result<ApiResponse<Customer>, AppError> {
    let (_, file) = read_customer_form(multipart).await?;

    let customer = state
        .customers
        .update_image(id, file.as_ref(), auth.user_id())
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::success("customer image updated", customer))
}

/// Succeeds whether or not the id belonged to the caller.
pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    CustomerId(id): CustomerId,
) -> Result<ApiResponse<()>, AppError> {
    state.customers.delete(id, auth.user_id()).await?;
    Ok(ApiResponse::message("customer deleted"))
}
