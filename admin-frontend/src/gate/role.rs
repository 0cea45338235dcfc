//! Role resolution: embedded metadata, then the directory, then the
//! allow-list. First hit wins.

use super::model::{Identity, Role, RoleAssignment, RoleSource};
use super::policy::GatePolicy;
use super::providers::DirectoryLookup;

pub async fn resolve_role(
    identity: &Identity,
    roles: &[Role],
    directory: &dyn DirectoryLookup,
    policy: &GatePolicy,
) -> Option<RoleAssignment> {
    if let Some(assignment) = from_metadata(identity, roles) {
        return Some(assignment);
    }

    let email = identity.email.as_deref().filter(|e| !e.is_empty())?;

    if let Some(assignment) = from_directory(email, roles, directory).await {
        return Some(assignment);
    }

    from_allow_list(email, roles, policy)
}

fn from_metadata(identity: &Identity, roles: &[Role]) -> Option<RoleAssignment> {
    let metadata = &identity.metadata;
    roles
        .iter()
        .copied()
        .find(|role| {
            let flagged = match role {
                Role::SuperAdmin => metadata.is_super_admin,
                Role::Admin => metadata.is_admin,
                Role::Driver | Role::Customer => false,
            };
            flagged || metadata.role.as_deref() == Some(role.as_str())
        })
        .map(|role| RoleAssignment {
            role,
            source: RoleSource::EmbeddedMetadata,
        })
}

async fn from_directory(
    email: &str,
    roles: &[Role],
    directory: &dyn DirectoryLookup,
) -> Option<RoleAssignment> {
    for &role in roles {
        match directory.find_role_assignment(email, role).await {
            Ok(Some(record)) if record.role == role => {
                return Some(RoleAssignment {
                    role,
                    source: RoleSource::DirectoryRecord,
                });
            }
            Ok(Some(record)) => {
                tracing::debug!(
                    requested = %role,
                    returned = %record.role,
                    "Directory returned a row for another role; ignoring"
                );
            }
            Ok(None) => {}
            Err(e) => {
                // Counts as a miss; the allow-list is still consulted.
                tracing::warn!(error = %e, role = %role, "Directory role lookup failed");
            }
        }
    }
    None
}

fn from_allow_list(email: &str, roles: &[Role], policy: &GatePolicy) -> Option<RoleAssignment> {
    roles
        .iter()
        .copied()
        .find(|role| policy.is_allow_listed(*role, email))
        .map(|role| RoleAssignment {
            role,
            source: RoleSource::AllowList,
        })
}
