use std::sync::Arc;

use super::error::GateError;
use super::model::{Identity, RoleAssignment, Session, TenantContext};
use super::policy::GatePolicy;
use super::providers::{DirectoryLookup, IdentityProvider, TenantContextProvider};
use super::requirement::Requirement;
use super::role::resolve_role;

/// Collaborators and policy a gate is mounted with.
#[derive(Clone)]
pub struct GateContext {
    pub identity: Arc<dyn IdentityProvider>,
    pub tenants: Arc<dyn TenantContextProvider>,
    pub directory: Arc<dyn DirectoryLookup>,
    pub policy: Arc<GatePolicy>,
}

/// Everything one lookup round produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub session: Session,
    /// Only resolved for tenant-scoped gates.
    pub tenant: Option<TenantContext>,
    /// Only resolved for role-scoped gates.
    pub role: Option<RoleAssignment>,
    /// First lookup failure, already downgraded.
    pub failure: Option<GateError>,
}

impl Resolution {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            tenant: None,
            role: None,
            failure: None,
        }
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant: TenantContext) -> Self {
        self.tenant = Some(tenant);
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: RoleAssignment) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn with_failure(mut self, failure: GateError) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity.as_ref()
    }
}

/// Queries the collaborators the requirement needs. Errors are caught and
/// recorded, never returned.
pub async fn resolve(requirement: &Requirement, context: &GateContext) -> Resolution {
    let mut resolution = match context.identity.current_identity().await {
        Ok(identity) => Resolution::new(Session::resolved(identity)),
        Err(e) => {
            tracing::warn!(
                gate = requirement.gate_name(),
                error = %e,
                "Identity lookup failed; treating as signed out"
            );
            Resolution::new(Session::resolved(None)).with_failure(e)
        }
    };

    match requirement {
        Requirement::TenantScoped => {
            let tenant = match resolution.session.identity.as_ref() {
                Some(identity) => match context.tenants.tenant_context(identity).await {
                    Ok(tenant) => tenant,
                    Err(e) => {
                        tracing::warn!(
                            gate = requirement.gate_name(),
                            user_id = %identity.user_id,
                            error = %e,
                            "Tenant context lookup failed"
                        );
                        resolution.failure = Some(e);
                        TenantContext::empty()
                    }
                },
                None => TenantContext::empty(),
            };
            if !tenant.is_loading && !tenant.is_consistent() {
                resolution.failure = Some(GateError::InvariantViolation(format!(
                    "admin present: {}, tenant present: {}",
                    tenant.admin.is_some(),
                    tenant.tenant.is_some()
                )));
            }
            resolution.tenant = Some(tenant);
        }
        Requirement::RoleScoped(roles) => {
            if let Some(identity) = resolution.session.identity.as_ref() {
                resolution.role = resolve_role(
                    identity,
                    roles,
                    context.directory.as_ref(),
                    &context.policy,
                )
                .await;
            }
        }
        Requirement::Open | Requirement::Authenticated | Requirement::PublicOnly => {}
    }

    resolution
}
