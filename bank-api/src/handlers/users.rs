//! User handlers: registration and self-service profile management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::dtos::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::middleware::AuthUser;
use crate::services::{NewUser, UserPatch};
use crate::startup::AppState;
use crate::utils::validation::check_user_id;
use crate::utils::ValidatedJson;

/// POST /v1/users
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state
        .users
        .create_user(NewUser {
            name: request.name,
            address: request.address.into(),
            phone_number: request.phone_number,
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /v1/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(authenticated_user_id): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    check_user_id(&user_id)?;
    let user = state.users.get_user(&user_id, &authenticated_user_id).await?;
    Ok(Json(user.into()))
}

/// PATCH /v1/users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(authenticated_user_id): AuthUser,
    Path(user_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    check_user_id(&user_id)?;
    let user = state
        .users
        .update_user(
            &user_id,
            &authenticated_user_id,
            UserPatch {
                name: request.name,
                address: request.address.map(Into::into),
                phone_number: request.phone_number,
                email: request.email,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

/// DELETE /v1/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(authenticated_user_id): AuthUser,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_user_id(&user_id)?;
    state
        .users
        .delete_user(&user_id, &authenticated_user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
