use std::fmt;
use thiserror::Error;

/// External collaborator a lookup was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    IdentityProvider,
    TenantContext,
    Directory,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::IdentityProvider => write!(f, "identity provider"),
            Collaborator::TenantContext => write!(f, "tenant context"),
            Collaborator::Directory => write!(f, "directory"),
        }
    }
}

/// Errors raised while resolving gate inputs.
///
/// These never reach the end user: the gate downgrades them to a verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("{collaborator} lookup failed: {message}")]
    LookupFailure {
        collaborator: Collaborator,
        message: String,
    },

    #[error("Tenant context invariant violated: {0}")]
    InvariantViolation(String),
}

impl GateError {
    pub fn lookup(collaborator: Collaborator, err: impl fmt::Display) -> Self {
        GateError::LookupFailure {
            collaborator,
            message: err.to_string(),
        }
    }
}
