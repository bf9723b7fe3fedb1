use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::client::{AuthEvent, SessionSource};
use crate::models::{AuthUser, Session};

/// Route dependent views are sent to when there is no user.
pub const LOGIN_ROUTE: &str = "/login";

/// Local mirror of the provider's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
    pub loading: bool,
    pub auth_initialized: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            session: None,
            loading: true,
            auth_initialized: false,
        }
    }
}

impl AuthState {
    fn set_session(&mut self, session: Option<Session>) {
        self.user = session.as_ref().map(|s| s.user.clone());
        self.session = session;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGate {
    /// Initial session fetch still outstanding.
    Pending,
    Allow,
    RedirectToLogin,
}

pub fn gate(state: &AuthState) -> RouteGate {
    if state.loading || !state.auth_initialized {
        RouteGate::Pending
    } else if state.user.is_some() {
        RouteGate::Allow
    } else {
        RouteGate::RedirectToLogin
    }
}

/// Owns the auth state for one consumer. The state is only written by the
/// holder's own background task and by [`SessionHolder::logout`].
pub struct SessionHolder {
    source: Arc<dyn SessionSource>,
    state: Arc<watch::Sender<AuthState>>,
    mounted: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SessionHolder {
    /// Fetch the current session once, settle, then follow notifications
    /// until [`unmount`](Self::unmount) or drop.
    pub fn mount(source: Arc<dyn SessionSource>) -> Self {
        let (tx, _) = watch::channel(AuthState::default());
        let state = Arc::new(tx);
        let mounted = Arc::new(AtomicBool::new(true));

        // Subscribe before fetching: notifications raised while the fetch is
        // in flight are applied after it, on top of its result.
        let events = source.subscribe();

        let task = tokio::spawn(follow_session(
            Arc::clone(&source),
            events,
            Arc::clone(&state),
            Arc::clone(&mounted),
        ));

        Self {
            source,
            state,
            mounted,
            task,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Resolves once the initial fetch has settled, or with the current
    /// (unsettled) state if the holder is unmounted first.
    pub async fn initialized(&self) -> AuthState {
        let mut rx = self.state.subscribe();
        let settled = |s: &AuthState| s.auth_initialized || !self.mounted.load(Ordering::SeqCst);
        let state = match rx.wait_for(settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    /// Clear the local session, ask the provider to revoke it, and return the
    /// route to redirect to. Provider failures are logged and ignored.
    pub async fn logout(&self) -> &'static str {
        self.state.send_modify(|s| s.set_session(None));

        if let Err(e) = self.source.sign_out().await {
            tracing::error!(error = %e, "Provider sign-out failed; local session already cleared");
        }

        LOGIN_ROUTE
    }

    /// Stop following the provider. Updates arriving afterwards are dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.task.abort();
        // Wake pending `initialized` callers; the state value is unchanged.
        self.state.send_modify(|_| {});
    }
}

impl Drop for SessionHolder {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn follow_session(
    source: Arc<dyn SessionSource>,
    mut events: broadcast::Receiver<AuthEvent>,
    state: Arc<watch::Sender<AuthState>>,
    mounted: Arc<AtomicBool>,
) {
    let initial = match source.current_session().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Initial session fetch failed; continuing signed out");
            None
        }
    };

    if !mounted.load(Ordering::SeqCst) {
        return;
    }

    state.send_modify(|s| {
        s.set_session(initial);
        s.auth_initialized = true;
        s.loading = false;
    });
    tracing::debug!("Auth state initialized");

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Session notifications lagged; re-reading session");
                match source.current_session().await {
                    Ok(session) if mounted.load(Ordering::SeqCst) => {
                        state.send_modify(|s| s.set_session(session));
                    }
                    Ok(_) => break,
                    Err(e) => tracing::warn!(error = %e, "Session re-read failed"),
                }
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if !mounted.load(Ordering::SeqCst) {
            break;
        }

        tracing::debug!(signed_in = event.session().is_some(), "Session change received");
        state.send_modify(|s| s.set_session(event.session().cloned()));
    }
}
