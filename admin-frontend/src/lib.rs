pub mod config;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use middleware::GateServices;
use services::IdentityClient;
use std::sync::Arc;

/// Shared application state containing service clients
#[derive(Clone)]
pub struct AppState {
    pub identity_client: Arc<IdentityClient>,
    pub gates: GateServices,
    pub secure_cookies: bool,
    pub session_idle_hours: i64,
}

impl AppState {
    pub fn new(identity_client: Arc<IdentityClient>, gates: GateServices) -> Self {
        Self {
            identity_client,
            gates,
            secure_cookies: false,
            session_idle_hours: 24,
        }
    }

    pub fn with_session_settings(mut self, secure_cookies: bool, idle_hours: i64) -> Self {
        self.secure_cookies = secure_cookies;
        self.session_idle_hours = idle_hours;
        self
    }
}
