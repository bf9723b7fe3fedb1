pub mod client;
pub mod session;
pub mod supabase;

pub use client::{AuthClient, AuthEvent, SessionSource};
pub use session::{gate, AuthState, RouteGate, SessionHolder, LOGIN_ROUTE};
pub use supabase::SupabaseAuth;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AuthUser, Session};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no active session")]
    MissingSession,

    #[error("auth provider error: {0}")]
    Provider(String),
}

/// Operations the journal needs from the hosted auth service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the user owning an access token.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}
