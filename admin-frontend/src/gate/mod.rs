//! Route-level access gates.
//!
//! A gate wraps a route and decides, from the observed session, tenant
//! context and role assignments, whether the route renders, shows a loading
//! placeholder, or redirects elsewhere. Decisions are computed by the pure
//! [`evaluate`] function; [`Gate`] drives it from live collaborators.
pub mod error;
pub mod evaluate;
pub mod model;
pub mod policy;
pub mod providers;
pub mod requirement;
pub mod resolve;
pub mod role;
pub mod runtime;
pub mod verdict;

pub use error::{Collaborator, GateError};
pub use evaluate::evaluate;
pub use model::{
    canonical_admin_path, dashboard_for, is_tenant_slug, AdminRef, DirectoryRecord, Identity, IdentityMetadata,
    Role, RoleAssignment, RoleSource, RouteParams, Session, TenantContext, TenantRecord, UserType,
};
pub use policy::GatePolicy;
pub use providers::{
    DirectoryLookup, IdentityEvent, IdentityListener, IdentityProvider, Subscription,
    TenantContextProvider,
};
pub use requirement::Requirement;
pub use resolve::{resolve, GateContext, Resolution};
pub use role::resolve_role;
pub use runtime::Gate;
pub use verdict::{Denial, DenyReason, GateOutput, GateState, Navigation, Verdict};
