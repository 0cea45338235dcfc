use super::model::Role;

/// Declarative authorization requirement attached to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Readable by anyone; identity failures never block rendering.
    Open,
    /// Requires a signed-in identity.
    Authenticated,
    /// Only for visitors without an identity (login, register).
    PublicOnly,
    /// Requires a resolved admin and tenant matching the route slug.
    TenantScoped,
    /// Requires one of the listed roles.
    RoleScoped(Vec<Role>),
}

impl Requirement {
    pub fn role(role: Role) -> Self {
        Requirement::RoleScoped(vec![role])
    }

    /// Stable label for logs and metrics.
    pub fn gate_name(&self) -> &'static str {
        match self {
            Requirement::Open => "open",
            Requirement::Authenticated => "authenticated",
            Requirement::PublicOnly => "public_only",
            Requirement::TenantScoped => "tenant_scoped",
            Requirement::RoleScoped(_) => "role_scoped",
        }
    }
}
