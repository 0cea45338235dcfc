//! Collaborators the gate consults. All of them are owned elsewhere; the
//! gate only reads from them.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::error::GateError;
use super::model::{DirectoryRecord, Identity, Role, TenantContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl fmt::Display for IdentityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityEvent::SignedIn => write!(f, "signed_in"),
            IdentityEvent::SignedOut => write!(f, "signed_out"),
            IdentityEvent::TokenRefreshed => write!(f, "token_refreshed"),
        }
    }
}

pub type IdentityListener = Arc<dyn Fn(IdentityEvent) + Send + Sync>;

/// Handle to a registered listener.
///
/// Disposing is idempotent; dropping the handle disposes it.
pub struct Subscription {
    disposer: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(disposer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            disposer: Some(Box::new(disposer)),
        }
    }

    pub fn dispose(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposer.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Source of the current identity and its change notifications.
///
/// Retry and timeout policy belong to the implementation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> Result<Option<Identity>, GateError>;

    /// Fires on sign-in, sign-out and token refresh.
    fn on_identity_change(&self, listener: IdentityListener) -> Subscription;
}

#[async_trait]
pub trait TenantContextProvider: Send + Sync {
    async fn tenant_context(&self, identity: &Identity) -> Result<TenantContext, GateError>;
}

#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Single-row lookup; a missing row is `Ok(None)`.
    async fn find_role_assignment(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Option<DirectoryRecord>, GateError>;
}
