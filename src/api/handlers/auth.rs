use axum::extract::State;
use axum::response::Redirect;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::auth::AccessToken;
use crate::auth::LOGIN_ROUTE;
use crate::errors::AppError;
use crate::models::{AuthUser, Session};
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/auth/login: password sign-in through the auth provider
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".into()));
    }

    let session = state
        .auth
        .sign_in_with_password(body.email.trim(), &body.password)
        .await?;
    tracing::info!(user_id = %session.user.id, "User signed in");

    Ok(Json(ApiResponse::ok(session)))
}

/// POST /api/auth/refresh: exchange a refresh token for a new session
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let session = state.auth.refresh_session(&body.refresh_token).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// GET /api/auth/session: the user behind the bearer token
pub async fn session(Extension(user): Extension<AuthUser>) -> Json<ApiResponse<AuthUser>> {
    Json(ApiResponse::ok(user))
}

/// POST /api/auth/logout: revoke at the provider, then redirect to login.
/// Provider failures are logged and do not block the redirect.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(AccessToken(token)): Extension<AccessToken>,
) -> Redirect {
    if let Err(e) = state.auth.sign_out(&token).await {
        tracing::error!(error = %e, user_id = %user.id, "Provider sign-out failed");
    } else {
        tracing::info!(user_id = %user.id, "User signed out");
    }

    Redirect::to(LOGIN_ROUTE)
}
