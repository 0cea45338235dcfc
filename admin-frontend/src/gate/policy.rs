use std::collections::{HashMap, HashSet};

use super::model::Role;
use crate::config::GateSettings;

/// Redirect targets and the privileged-email allow-list.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub login_path: String,
    pub landing_path: String,
    /// Redirect a mismatched tenant slug to the resolved tenant's own path.
    pub tenant_slug_correction: bool,
    pub(crate) allow_list: HashMap<Role, HashSet<String>>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/".to_string(),
            tenant_slug_correction: true,
            allow_list: HashMap::new(),
        }
    }
}

impl GatePolicy {
    #[must_use]
    pub fn allow(mut self, role: Role, emails: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.allow_list
            .entry(role)
            .or_default()
            .extend(emails.into_iter().map(|e| normalize_email(e.as_ref())));
        self
    }

    /// Case-insensitive allow-list check.
    pub fn is_allow_listed(&self, role: Role, email: &str) -> bool {
        self.allow_list
            .get(&role)
            .is_some_and(|emails| emails.contains(&normalize_email(email)))
    }

    /// Login route, carrying the requested tenant so the login page can
    /// pre-fill it.
    pub fn login_redirect(&self, tenant_slug: Option<&str>) -> String {
        let Some(slug) = tenant_slug.filter(|s| !s.is_empty()) else {
            return self.login_path.clone();
        };
        match serde_urlencoded::to_string([("tenant", slug)].as_slice()) {
            Ok(query) => format!("{}?{}", self.login_path, query),
            Err(_) => self.login_path.clone(),
        }
    }
}

impl From<&GateSettings> for GatePolicy {
    fn from(settings: &GateSettings) -> Self {
        let policy = GatePolicy {
            login_path: settings.login_path.clone(),
            landing_path: settings.landing_path.clone(),
            tenant_slug_correction: settings.tenant_slug_correction,
            allow_list: HashMap::new(),
        };
        settings
            .allow_list
            .iter()
            .fold(policy, |policy, (role, emails)| policy.allow(*role, emails))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
