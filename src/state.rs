//! Shared context injected into every hook.
//!
//! DESIGN
//! ======
//! `AppContext` bundles the gateway, the session and the notifier. It is
//! cheap to clone (all fields are `Arc`-backed) and is passed explicitly to
//! hook constructors. The settle helpers give every mutation the same error
//! policy: log, notify, hand the error back to the caller.

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::gateway::rest::RestGateway;
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::session::SessionContext;

#[derive(Clone)]
pub struct AppContext {
    pub gateway: Arc<dyn Gateway>,
    pub session: SessionContext,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, session: SessionContext, notifier: Arc<dyn Notifier>) -> Self {
        Self { gateway, session, notifier }
    }

    /// Context backed by the HTTP gateway, logging notices through `tracing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &BackendConfig, session: SessionContext) -> Result<Self, ApiError> {
        let gateway = RestGateway::new(config, session.clone())?;
        Ok(Self::new(Arc::new(gateway), session, Arc::new(TracingNotifier)))
    }

    /// Current user id, or `NotAuthenticated`.
    pub(crate) fn require_user(&self) -> Result<String, ApiError> {
        self.session.user_id().ok_or(ApiError::NotAuthenticated)
    }

    pub(crate) fn succeed(&self, title: &str) {
        self.notifier.notify(Notice::success(title));
    }

    pub(crate) fn fail(&self, title: &str, err: &ApiError) {
        tracing::warn!(error = %err, "{title}");
        self.notifier.notify(Notice::error(title, err));
    }

    /// Apply the mutation error policy to `result`.
    pub(crate) fn settle<T>(&self, result: Result<T, ApiError>, success: &str, failure: &str) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.succeed(success);
                Ok(value)
            }
            Err(e) => {
                self.fail(failure, &e);
                Err(e)
            }
        }
    }
}
