//! Authentication handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::{AppResult, OptionExt};
use crate::services::{LoginResponse, RegisterInput};
use crate::types::{MessageResponse, NoContent};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Login name, unique across users
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "jsilva")]
    pub username: String,
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "SecurePass123!", min_length = 6)]
    pub password: String,
    /// Must match `password`
    #[schema(example = "SecurePass123!")]
    pub password_confirm: String,
    /// User display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "João Silva")]
    pub name: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or e-mail address
    #[validate(length(min = 1, message = "Username or e-mail is required"))]
    #[schema(example = "jsilva")]
    pub identifier: String,
    /// User password
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Password recovery request (sends the code)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecoverRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

/// Recovery code verification request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// 6-digit code received by e-mail
    #[validate(length(min = 1, message = "Code is required"))]
    #[schema(example = "483920")]
    pub code: String,
}

/// Password reset request (consumes the code)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Code is required"))]
    #[schema(example = "483920")]
    pub code: String,
    /// New password (minimum 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(min_length = 6)]
    pub password: String,
    /// Must match `password`
    pub password_confirm: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/recover", post(send_recovery_code))
        .route("/recover/verify", post(verify_recovery_code))
        .route("/recover/reset", post(reset_password))
        .route("/session", get(read_session))
        .route("/session", delete(clear_session))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or e-mail already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth_service
        .register(RegisterInput {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            password_confirm: payload.password_confirm,
            name: payload.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with username or e-mail, get JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Incorrect password"),
        (status = 404, description = "User or e-mail not found")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state
        .auth_service
        .login(payload.identifier, payload.password)
        .await?;

    Ok(Json(response))
}

/// E-mail a password recovery code
#[utoipa::path(
    post,
    path = "/auth/recover",
    tag = "Authentication",
    request_body = RecoverRequest,
    responses(
        (status = 200, description = "Recovery code sent", body = MessageResponse),
        (status = 404, description = "User or e-mail not found"),
        (status = 502, description = "Mail delivery failed")
    )
)]
pub async fn send_recovery_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecoverRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth_service.send_recovery_code(payload.email).await?;

    Ok(Json(MessageResponse::new(
        "A recovery code was sent to your e-mail",
    )))
}

/// Check a recovery code without consuming it
#[utoipa::path(
    post,
    path = "/auth/recover/verify",
    tag = "Authentication",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code is valid", body = MessageResponse),
        (status = 400, description = "Invalid or expired code")
    )
)]
pub async fn verify_recovery_code(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyCodeRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .verify_recovery_code(payload.email, payload.code)
        .await?;

    Ok(Json(MessageResponse::new("Code verified")))
}

/// Reset the password using a recovery code
#[utoipa::path(
    post,
    path = "/auth/recover/reset",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired code, or validation error")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .reset_password(
            payload.email,
            payload.code,
            payload.password,
            payload.password_confirm,
        )
        .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Read the same-day cached session snapshot
#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "Authentication",
    responses(
        (status = 200, description = "A session was cached today", body = UserResponse),
        (status = 404, description = "No session cached today")
    )
)]
pub async fn read_session(State(state): State<AppState>) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.session().ok_or_not_found()?;
    Ok(Json(user))
}

/// Drop the cached session snapshot
#[utoipa::path(
    delete,
    path = "/auth/session",
    tag = "Authentication",
    responses(
        (status = 204, description = "Session cleared")
    )
)]
pub async fn clear_session(State(state): State<AppState>) -> NoContent {
    state.auth_service.clear_session();
    NoContent
}
