use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;

use crate::auth::AuthError;
use crate::errors::AppError;
use crate::AppState;

/// Bearer token of the authenticated request, kept for provider calls
/// made on the user's behalf.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Bearer-token authentication middleware.
///
/// The token is resolved to a user through the auth provider; the resulting
/// `AuthUser` and `AccessToken` are attached as request extensions.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(&req) else {
        counter!("auth_failures_total").increment(1);
        return AppError::Unauthorized.into_response();
    };

    match state.auth.get_user(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(AccessToken(token));
            next.run(req).await
        }
        Err(AuthError::InvalidCredentials) => {
            counter!("auth_failures_total").increment(1);
            AppError::Unauthorized.into_response()
        }
        Err(e) => {
            counter!("auth_failures_total").increment(1);
            tracing::warn!(error = %e, "Token verification failed");
            AppError::Unauthorized.into_response()
        }
    }
}
