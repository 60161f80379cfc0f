//! Auth-session context for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Injected into the gateway and every hook instead of living in a global.
//! Views subscribe on mount and drop the returned [`SessionSubscription`] on
//! unmount; route guards use [`should_redirect_unauth`] to send signed-out
//! users away from protected views.
//!
//! DESIGN
//! ======
//! State lives in a `tokio::sync::watch` channel. Subscribers always observe
//! the latest state, and intermediate states may be coalesced, which is what
//! a redirect guard needs.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ApiError;
use crate::gateway::Gateway;

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// An authenticated backend session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

/// What caused the most recent session change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The stored session was restored (or found absent) at startup.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Snapshot of the session as seen by subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub event: SessionEvent,
    /// True until the stored session has been restored.
    pub loading: bool,
}

/// Shared, cloneable session holder.
#[derive(Clone, Debug)]
pub struct SessionContext {
    tx: Arc<watch::Sender<SessionState>>,
}

impl SessionContext {
    /// A context still waiting for the stored session to be restored.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState { session: None, event: SessionEvent::InitialSession, loading: true });
        Self { tx: Arc::new(tx) }
    }

    /// A context that starts signed in.
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        let ctx = Self::new();
        ctx.restore(Some(session));
        ctx
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().session.clone()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.tx.borrow().session.as_ref().map(|s| s.user_id.clone())
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tx.borrow().session.as_ref().map(|s| s.access_token.clone())
    }

    /// Finish startup with whatever session storage held.
    pub fn restore(&self, session: Option<Session>) {
        self.publish(session, SessionEvent::InitialSession);
    }

    pub fn sign_in(&self, session: Session) {
        tracing::info!(user_id = %session.user_id, "session signed in");
        self.publish(Some(session), SessionEvent::SignedIn);
    }

    /// Swap in a refreshed access token for the current user.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` if there is no session to refresh.
    pub fn refresh(&self, access_token: String) -> Result<(), ApiError> {
        let Some(mut session) = self.current() else {
            return Err(ApiError::NotAuthenticated);
        };
        session.access_token = access_token;
        self.publish(Some(session), SessionEvent::TokenRefreshed);
        Ok(())
    }

    /// Revoke the session at the backend and clear it locally.
    ///
    /// The local session is cleared even when the backend call fails, so a
    /// failed revoke never leaves the user looking signed in.
    ///
    /// # Errors
    ///
    /// Returns the backend error after the local state has been cleared.
    pub async fn sign_out(&self, gateway: &dyn Gateway) -> Result<(), ApiError> {
        let Some(session) = self.current() else {
            return Ok(());
        };
        let result = gateway.sign_out(&session.access_token).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, user_id = %session.user_id, "remote sign-out failed; clearing local session");
        }
        self.publish(None, SessionEvent::SignedOut);
        result
    }

    /// Subscribe to session changes. Dropping the handle unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription { rx: self.tx.subscribe() }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn publish(&self, session: Option<Session>, event: SessionEvent) {
        self.tx.send_replace(SessionState { session, event, loading: false });
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A live session subscription, held for the lifetime of a mounted view.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<SessionState>,
}

impl SessionSubscription {
    /// Wait for the next change. Returns `None` once the context is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    #[must_use]
    pub fn latest(&self) -> SessionState {
        self.rx.borrow().clone()
    }
}

/// Protected views redirect once loading has finished and nobody is signed in.
#[must_use]
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    !state.loading && state.session.is_none()
}
