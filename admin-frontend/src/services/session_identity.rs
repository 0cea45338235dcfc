//! Identity provider backed by the browser session.

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tower_sessions::Session;

use super::identity_client::TokenPair;
use super::identity_events::{IdentityEvents, SessionEvent};
use crate::gate::{
    Collaborator, GateError, Identity, IdentityListener, IdentityProvider, Subscription,
};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const IDENTITY_KEY: &str = "identity";

pub struct SessionIdentityProvider {
    session: Session,
    events: IdentityEvents,
}

impl SessionIdentityProvider {
    pub fn new(session: Session, events: IdentityEvents) -> Self {
        Self { session, events }
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentityProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, GateError> {
        let access_token: Option<String> = self
            .session
            .get(ACCESS_TOKEN_KEY)
            .await
            .map_err(|e| GateError::lookup(Collaborator::IdentityProvider, e))?;
        if access_token.is_none() {
            return Ok(None);
        }

        self.session
            .get::<Identity>(IDENTITY_KEY)
            .await
            .map_err(|e| GateError::lookup(Collaborator::IdentityProvider, e))
    }

    /// Only changes made through this provider's own session reach the
    /// listener. A session without an id has no cookie yet, so nothing can
    /// change it concurrently.
    fn on_identity_change(&self, listener: IdentityListener) -> Subscription {
        let Some(own_session) = self.session.id() else {
            return Subscription::new(|| {});
        };
        let mut receiver = self.events.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(SessionEvent { session, event }) if session == own_session => {
                        listener(event)
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Identity listener lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Subscription::new(move || task.abort())
    }
}

/// Stores tokens and the decoded identity after sign-in or refresh.
pub async fn store_identity(
    session: &Session,
    identity: &Identity,
    tokens: &TokenPair,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(ACCESS_TOKEN_KEY, &tokens.access_token)
        .await?;
    if let Some(refresh_token) = &tokens.refresh_token {
        session.insert(REFRESH_TOKEN_KEY, refresh_token).await?;
    }
    session.insert(IDENTITY_KEY, identity).await
}

pub async fn access_token(session: &Session) -> Option<String> {
    session.get(ACCESS_TOKEN_KEY).await.unwrap_or_default()
}

pub async fn refresh_token(session: &Session) -> Option<String> {
    session.get(REFRESH_TOKEN_KEY).await.unwrap_or_default()
}
