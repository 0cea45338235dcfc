use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    AlreadyAuthenticated,
    LookupFailed,
    TenantMissing,
    TenantSlugMismatch,
    InvariantViolation,
    RoleMissing,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::AlreadyAuthenticated => "already_authenticated",
            DenyReason::LookupFailed => "lookup_failed",
            DenyReason::TenantMissing => "tenant_missing",
            DenyReason::TenantSlugMismatch => "tenant_slug_mismatch",
            DenyReason::InvariantViolation => "invariant_violation",
            DenyReason::RoleMissing => "role_missing",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub reason: DenyReason,
    pub redirect: String,
}

/// Authorization decision for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    Denied(Denial),
    Allowed,
}

impl Verdict {
    pub fn denied(reason: DenyReason, redirect: impl Into<String>) -> Self {
        Verdict::Denied(Denial {
            reason,
            redirect: redirect.into(),
        })
    }

    /// Label used by the decision metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            Verdict::Pending => "pending",
            Verdict::Allowed => "allowed",
            Verdict::Denied(denial) => denial.reason.as_str(),
        }
    }

    pub fn output(&self) -> GateOutput {
        match self {
            Verdict::Pending => GateOutput::Loading,
            Verdict::Allowed => GateOutput::Render,
            Verdict::Denied(denial) => GateOutput::Redirect(Navigation::replace(&denial.redirect)),
        }
    }
}

/// Lifecycle state of a mounted gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Initializing,
    Resolved(Verdict),
}

impl GateState {
    pub fn output(&self) -> GateOutput {
        match self {
            GateState::Initializing => GateOutput::Loading,
            GateState::Resolved(verdict) => verdict.output(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            GateState::Initializing => Verdict::Pending,
            GateState::Resolved(verdict) => verdict.clone(),
        }
    }
}

/// A navigation request for the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl Navigation {
    pub fn replace(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            replace: true,
        }
    }
}

/// What the guarded route renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutput {
    Loading,
    Redirect(Navigation),
    Render,
}
