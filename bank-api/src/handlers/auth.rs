//! Login handler.

use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::dtos::{LoginRequest, LoginResponse};
use crate::startup::AppState;
use crate::utils::ValidatedJson;

/// POST /v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        user_id: session.user_id,
    }))
}
