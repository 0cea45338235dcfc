use std::collections::HashMap;

use secrecy::Secret;
use serde::Deserialize;
use service_core::config::load_configuration;
use service_core::error::AppError;

use crate::gate::Role;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub identity_service: IdentityServiceSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub gate: GateSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Set to true in production behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_idle_hours")]
    pub session_idle_hours: i64,
}

fn default_session_idle_hours() -> i64 {
    24
}

#[derive(Deserialize, Clone)]
pub struct IdentityServiceSettings {
    /// Base URL of the identity service (login, logout, token refresh).
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the hosted backend REST API.
    pub url: String,
    /// Service key sent as `apikey` and bearer token.
    pub api_key: Secret<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GateSettings {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_landing_path")]
    pub landing_path: String,
    #[serde(default = "default_tenant_slug_correction")]
    pub tenant_slug_correction: bool,
    /// Privileged emails per role, consulted after metadata and directory.
    #[serde(default)]
    pub allow_list: HashMap<Role, Vec<String>>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            landing_path: default_landing_path(),
            tenant_slug_correction: default_tenant_slug_correction(),
            allow_list: HashMap::new(),
        }
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_landing_path() -> String {
    "/".to_string()
}

fn default_tenant_slug_correction() -> bool {
    true
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector, e.g. `http://tempo:4317`. Export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, AppError> {
    load_configuration::<Settings>("admin-frontend")
}
