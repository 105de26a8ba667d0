use axum::{
    Extension, Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::services::{AccountInfo, Role};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// The authenticated caller, inserted into request extensions by
/// `auth_middleware` and read by the role guards and handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl CurrentUser {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session cookie to a `CurrentUser` extension. Requests
/// without a live session are rejected before any handler runs.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(email) = session
        .get::<String>("user")
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
    else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    let account = state.auth_service().get_account(&email).await?;
    tracing::Span::current().record("user_id", account.id);

    request.extensions_mut().insert(CurrentUser {
        id: account.id,
        name: account.name,
        email: account.email,
        roles: account.roles,
    });
    Ok(next.run(request).await)
}

/// Rejects callers whose account does not carry `role`. Runs after
/// `auth_middleware`, so the extension is always present.
pub async fn require_role(
    role: Role,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::internal("Missing authenticated user"))?;

    if !user.has_role(role) {
        return Err(ApiError::forbidden(format!(
            "This action requires the {} role",
            role.as_str()
        )));
    }
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
/// Register a new account. Unauthenticated; roles default to student.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountInfo>>), ApiError> {
    let account = state
        .auth_service()
        .signup(
            &payload.name,
            &payload.email,
            &payload.password,
            &payload.roles,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

/// POST /auth/login
/// Authenticate with email and password, starts a session on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AccountInfo>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let account = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    // Fresh session id on every login.
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert("user", &account.email)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(account)))
}

/// POST /auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /user/me
/// Get current user information (requires authentication)
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<AccountInfo>>, ApiError> {
    let account = state.auth_service().get_account(&user.email).await?;
    Ok(Json(ApiResponse::success(account)))
}

/// PUT /user/change-password
/// Change password (requires current password verification)
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.current_password == payload.new_password {
        return Err(ApiError::validation(
            "New password must be different from current password",
        ));
    }

    state
        .auth_service()
        .change_password(&user.email, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}
