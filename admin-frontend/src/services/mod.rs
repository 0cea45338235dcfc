pub mod backend_client;
pub mod identity_client;
pub mod identity_events;
pub mod metrics;
pub mod session_identity;

pub use backend_client::BackendClient;
pub use identity_client::{IdentityClient, TokenPair};
pub use identity_events::{IdentityEvents, SessionEvent};
pub use session_identity::SessionIdentityProvider;
