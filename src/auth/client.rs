use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::{AuthError, AuthProvider};
use crate::models::Session;

/// Session-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl AuthEvent {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(s) | AuthEvent::TokenRefreshed(s) => Some(s),
            AuthEvent::SignedOut => None,
        }
    }
}

/// Where a [`SessionHolder`](super::SessionHolder) reads the session from.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Notifications sent after this call are delivered to the receiver.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Client-side session store. Construct one per consumer and pass it where
/// needed; there is no process-wide instance.
pub struct AuthClient {
    provider: Arc<dyn AuthProvider>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthClient {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self::with_session(provider, None)
    }

    /// Start from a previously persisted session.
    pub fn with_session(provider: Arc<dyn AuthProvider>, session: Option<Session>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            provider,
            session: RwLock::new(session),
            events,
        }
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        *self.session.write().await = Some(session.clone());
        tracing::info!(user_id = %session.user.id, "Signed in");
        let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or(AuthError::MissingSession)?;

        let session = self.provider.refresh_session(&refresh_token).await?;
        *self.session.write().await = Some(session.clone());
        tracing::debug!(user_id = %session.user.id, "Session refreshed");
        let _ = self.events.send(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }
}

#[async_trait]
impl SessionSource for AuthClient {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.session.read().await.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// The local session is dropped even when the provider call fails.
    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.session.write().await.take();
        let _ = self.events.send(AuthEvent::SignedOut);

        match previous {
            Some(session) => self.provider.sign_out(&session.access_token).await,
            None => Ok(()),
        }
    }
}
