//! Inputs the gate observes: session, tenant context and role assignments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata embedded in the identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetadata {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub tenant_slug: Option<String>,
}

/// Opaque reference to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: IdentityMetadata,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
            metadata: IdentityMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: IdentityMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Account type used to pick a landing dashboard.
    ///
    /// Boolean flags win over the free-form fields.
    pub fn user_type(&self) -> UserType {
        if self.metadata.is_super_admin {
            return UserType::SuperAdmin;
        }
        if self.metadata.is_admin {
            return UserType::Admin;
        }
        self.metadata
            .user_type
            .as_deref()
            .or(self.metadata.role.as_deref())
            .and_then(UserType::parse)
            .unwrap_or(UserType::Customer)
    }
}

/// Current authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub is_loading: bool,
}

impl Session {
    pub fn loading() -> Self {
        Self {
            identity: None,
            is_loading: true,
        }
    }

    pub fn resolved(identity: Option<Identity>) -> Self {
        Self {
            identity,
            is_loading: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRef {
    pub id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Resolved tenant of an admin session.
///
/// `admin` and `tenant` are expected to be both present or both absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub admin: Option<AdminRef>,
    pub tenant: Option<TenantRecord>,
    pub is_loading: bool,
}

impl TenantContext {
    pub fn empty() -> Self {
        Self {
            admin: None,
            tenant: None,
            is_loading: false,
        }
    }

    pub fn resolved(admin: AdminRef, tenant: TenantRecord) -> Self {
        Self {
            admin: Some(admin),
            tenant: Some(tenant),
            is_loading: false,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.admin.is_some() == self.tenant.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Driver,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Driver => "driver",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which tier of the role chain produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
    EmbeddedMetadata,
    DirectoryRecord,
    AllowList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: Role,
    pub source: RoleSource,
}

/// Row returned by the directory for a role lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    SuperAdmin,
    Admin,
    Driver,
    Customer,
}

impl UserType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "super_admin" | "superadmin" => Some(UserType::SuperAdmin),
            "admin" | "tenant_admin" => Some(UserType::Admin),
            "driver" => Some(UserType::Driver),
            "customer" | "user" => Some(UserType::Customer),
            _ => None,
        }
    }
}

/// Landing dashboard for an account type.
pub fn dashboard_for(user_type: UserType, tenant_slug: Option<&str>) -> String {
    match (user_type, tenant_slug) {
        (UserType::SuperAdmin, _) => "/super-admin".to_string(),
        (UserType::Admin, Some(slug)) => canonical_admin_path(slug),
        (UserType::Admin, None) | (UserType::Customer, _) => "/dashboard".to_string(),
        (UserType::Driver, _) => "/driver/dashboard".to_string(),
    }
}

pub fn canonical_admin_path(slug: &str) -> String {
    format!("/{}/admin/dashboard", slug)
}

/// Tenant slugs are lowercase ASCII letters, digits and hyphens.
pub fn is_tenant_slug(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Parameters taken from the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub tenant_slug: Option<String>,
}

impl RouteParams {
    pub fn with_tenant(slug: impl Into<String>) -> Self {
        Self {
            tenant_slug: Some(slug.into()),
        }
    }
}
