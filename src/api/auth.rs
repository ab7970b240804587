//! Authentication and registration endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::Role,
};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// User name
    pub user_name: String,
    /// Plain-text password
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Internal account id
    pub user_id: i64,
    /// Account role
    pub role: Role,
    /// Member number (absent for admin accounts)
    pub member_number: Option<i64>,
}

/// Register request
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "User name must not be empty"))]
    pub user_name: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    /// Account role: "admin" or "member"
    pub role: String,
}

/// Register response
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Status message
    pub message: String,
    /// Allocated member number (absent for admin accounts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_number: Option<i64>,
}

/// Authenticate with user name and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authentication succeeded", body = LoginResponse),
        (status = 401, description = "Invalid user name or password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state
        .services
        .users
        .authenticate(&request.user_name, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        user_id: user.user_id,
        role: user.role,
        member_number: user.member_number,
    }))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User name already taken")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let member_number = state
        .services
        .users
        .register(&request.user_name, &request.password, &request.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            member_number,
        }),
    ))
}
