use tokio::sync::broadcast;
use tower_sessions::session::Id;

use crate::gate::IdentityEvent;

const DEFAULT_CAPACITY: usize = 64;

/// An identity change and the session it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: Id,
    pub event: IdentityEvent,
}

/// In-process fan-out of sign-in, sign-out and token refresh events to
/// mounted gates. Subscribers filter on the session they belong to.
#[derive(Clone)]
pub struct IdentityEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for IdentityEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl IdentityEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announces `event` to gates mounted for `session`.
    ///
    /// A session that was never saved has no id and nothing mounted for it
    /// can be listening, so the event is dropped.
    pub fn publish(&self, session: Option<Id>, event: IdentityEvent) {
        let Some(session) = session else {
            tracing::trace!(event = %event, "Identity event without a session id");
            return;
        };
        if self.sender.send(SessionEvent { session, event }).is_err() {
            tracing::trace!(event = %event, "No gates listening for identity events");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_carries_the_session() {
        let events = IdentityEvents::default();
        let mut first = events.subscribe();
        let mut second = events.subscribe();
        assert_eq!(events.listener_count(), 2);

        let session = Id::default();
        events.publish(Some(session), IdentityEvent::SignedIn);

        let expected = SessionEvent {
            session,
            event: IdentityEvent::SignedIn,
        };
        assert_eq!(first.recv().await.unwrap(), expected);
        assert_eq!(second.recv().await.unwrap(), expected);
    }

    #[test]
    fn test_publish_without_session_is_dropped() {
        let events = IdentityEvents::default();
        let mut receiver = events.subscribe();

        events.publish(None, IdentityEvent::SignedOut);

        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let events = IdentityEvents::new(0);
        events.publish(Some(Id::default()), IdentityEvent::SignedOut);
        assert_eq!(events.listener_count(), 0);
    }
}
