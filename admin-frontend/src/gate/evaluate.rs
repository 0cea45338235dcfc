//! Pure verdict computation. Same inputs, same verdict.

use super::model::{canonical_admin_path, dashboard_for, RouteParams, TenantContext};
use super::policy::GatePolicy;
use super::requirement::Requirement;
use super::resolve::Resolution;
use super::verdict::{DenyReason, Verdict};

/// `resolution` is `None` while the gate is still initializing.
pub fn evaluate(
    requirement: &Requirement,
    resolution: Option<&Resolution>,
    route: &RouteParams,
    policy: &GatePolicy,
) -> Verdict {
    let Some(resolution) = resolution else {
        return Verdict::Pending;
    };
    if resolution.session.is_loading {
        return Verdict::Pending;
    }

    match requirement {
        Requirement::Open => Verdict::Allowed,
        Requirement::Authenticated => match resolution.identity() {
            Some(_) => Verdict::Allowed,
            None => Verdict::denied(absent_identity_reason(resolution), policy.login_redirect(None)),
        },
        Requirement::PublicOnly => match resolution.identity() {
            Some(identity) => Verdict::denied(
                DenyReason::AlreadyAuthenticated,
                dashboard_for(identity.user_type(), identity.metadata.tenant_slug.as_deref()),
            ),
            None => Verdict::Allowed,
        },
        Requirement::TenantScoped => evaluate_tenant(resolution, route, policy),
        Requirement::RoleScoped(roles) => match (resolution.identity(), resolution.role) {
            (None, _) => Verdict::denied(absent_identity_reason(resolution), policy.login_redirect(None)),
            (Some(_), Some(assignment)) if roles.contains(&assignment.role) => Verdict::Allowed,
            (Some(_), _) => Verdict::denied(DenyReason::RoleMissing, policy.landing_path.clone()),
        },
    }
}

fn evaluate_tenant(resolution: &Resolution, route: &RouteParams, policy: &GatePolicy) -> Verdict {
    let requested = route.tenant_slug.as_deref();
    let empty = TenantContext::empty();
    let context = resolution.tenant.as_ref().unwrap_or(&empty);

    if context.is_loading {
        return Verdict::Pending;
    }

    match (&context.admin, &context.tenant) {
        (Some(_), Some(tenant)) => match requested {
            Some(slug) if slug != tenant.slug => {
                let redirect = if policy.tenant_slug_correction {
                    canonical_admin_path(&tenant.slug)
                } else {
                    policy.landing_path.clone()
                };
                Verdict::denied(DenyReason::TenantSlugMismatch, redirect)
            }
            _ => Verdict::Allowed,
        },
        (None, None) => {
            let reason = if resolution.failure.is_some() {
                DenyReason::LookupFailed
            } else if resolution.identity().is_none() {
                DenyReason::Unauthenticated
            } else {
                DenyReason::TenantMissing
            };
            Verdict::denied(reason, policy.login_redirect(requested))
        }
        _ => Verdict::denied(DenyReason::InvariantViolation, policy.login_redirect(requested)),
    }
}

fn absent_identity_reason(resolution: &Resolution) -> DenyReason {
    if resolution.failure.is_some() {
        DenyReason::LookupFailed
    } else {
        DenyReason::Unauthenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::error::{Collaborator, GateError};
    use crate::gate::model::{
        AdminRef, Identity, IdentityMetadata, Role, RoleAssignment, RoleSource, Session,
        TenantRecord,
    };

    fn signed_in() -> Resolution {
        Resolution::new(Session::resolved(Some(Identity::new(
            "user-1",
            Some("user@example.com".to_string()),
        ))))
    }

    fn signed_out() -> Resolution {
        Resolution::new(Session::resolved(None))
    }

    fn failed() -> Resolution {
        signed_out().with_failure(GateError::lookup(Collaborator::IdentityProvider, "timeout"))
    }

    fn admin() -> AdminRef {
        AdminRef {
            id: "admin-1".to_string(),
            user_id: "user-1".to_string(),
        }
    }

    fn tenant(slug: &str) -> TenantRecord {
        TenantRecord {
            id: format!("tenant-{}", slug),
            slug: slug.to_string(),
            name: None,
        }
    }

    fn redirect(verdict: &Verdict) -> Option<&str> {
        match verdict {
            Verdict::Denied(denial) => Some(denial.redirect.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_initializing_is_pending_for_every_requirement() {
        let policy = GatePolicy::default();
        let route = RouteParams::with_tenant("acme");
        for requirement in [
            Requirement::Open,
            Requirement::Authenticated,
            Requirement::PublicOnly,
            Requirement::TenantScoped,
            Requirement::role(Role::SuperAdmin),
        ] {
            assert_eq!(evaluate(&requirement, None, &route, &policy), Verdict::Pending);
            let loading = Resolution::new(Session::loading());
            assert_eq!(
                evaluate(&requirement, Some(&loading), &route, &policy),
                Verdict::Pending
            );
        }
    }

    #[test]
    fn test_open_renders_even_when_lookup_failed() {
        let verdict = evaluate(
            &Requirement::Open,
            Some(&failed()),
            &RouteParams::default(),
            &GatePolicy::default(),
        );
        assert_eq!(verdict, Verdict::Allowed);
    }

    #[test]
    fn test_authenticated() {
        let policy = GatePolicy::default();
        let route = RouteParams::default();

        assert_eq!(
            evaluate(&Requirement::Authenticated, Some(&signed_in()), &route, &policy),
            Verdict::Allowed
        );
        assert_eq!(
            evaluate(&Requirement::Authenticated, Some(&signed_out()), &route, &policy),
            Verdict::denied(DenyReason::Unauthenticated, "/login")
        );
        assert_eq!(
            evaluate(&Requirement::Authenticated, Some(&failed()), &route, &policy),
            Verdict::denied(DenyReason::LookupFailed, "/login")
        );
    }

    #[test]
    fn test_public_only_redirects_signed_in_to_dashboard() {
        let policy = GatePolicy::default();
        let route = RouteParams::default();
        let admin = Resolution::new(Session::resolved(Some(
            Identity::new("user-1", None).with_metadata(IdentityMetadata {
                is_admin: true,
                tenant_slug: Some("acme".to_string()),
                ..IdentityMetadata::default()
            }),
        )));

        assert_eq!(
            evaluate(&Requirement::PublicOnly, Some(&admin), &route, &policy),
            Verdict::denied(DenyReason::AlreadyAuthenticated, "/acme/admin/dashboard")
        );
        assert_eq!(
            evaluate(&Requirement::PublicOnly, Some(&signed_in()), &route, &policy),
            Verdict::denied(DenyReason::AlreadyAuthenticated, "/dashboard")
        );
        assert_eq!(
            evaluate(&Requirement::PublicOnly, Some(&signed_out()), &route, &policy),
            Verdict::Allowed
        );
    }

    #[test]
    fn test_tenant_missing_redirects_to_login() {
        let policy = GatePolicy::default();
        let resolution = signed_out().with_tenant(TenantContext::empty());

        let verdict = evaluate(
            &Requirement::TenantScoped,
            Some(&resolution),
            &RouteParams::default(),
            &policy,
        );
        assert_eq!(redirect(&verdict), Some("/login"));

        let verdict = evaluate(
            &Requirement::TenantScoped,
            Some(&resolution),
            &RouteParams::with_tenant("acme"),
            &policy,
        );
        assert_eq!(redirect(&verdict), Some("/login?tenant=acme"));
    }

    #[test]
    fn test_signed_in_without_tenant_is_tenant_missing() {
        let resolution = signed_in().with_tenant(TenantContext::empty());
        let verdict = evaluate(
            &Requirement::TenantScoped,
            Some(&resolution),
            &RouteParams::with_tenant("acme"),
            &GatePolicy::default(),
        );
        assert_eq!(
            verdict,
            Verdict::denied(DenyReason::TenantMissing, "/login?tenant=acme")
        );
    }

    #[test]
    fn test_tenant_slug_mismatch_goes_to_resolved_tenant() {
        let resolution = signed_in().with_tenant(TenantContext::resolved(admin(), tenant("acme")));
        let verdict = evaluate(
            &Requirement::TenantScoped,
            Some(&resolution),
            &RouteParams::with_tenant("beta"),
            &GatePolicy::default(),
        );
        assert_eq!(
            verdict,
            Verdict::denied(DenyReason::TenantSlugMismatch, "/acme/admin/dashboard")
        );
    }

    #[test]
    fn test_tenant_slug_mismatch_without_correction_goes_to_landing() {
        let policy = GatePolicy {
            tenant_slug_correction: false,
            ..GatePolicy::default()
        };
        let resolution = signed_in().with_tenant(TenantContext::resolved(admin(), tenant("acme")));
        let verdict = evaluate(
            &Requirement::TenantScoped,
            Some(&resolution),
            &RouteParams::with_tenant("beta"),
            &policy,
        );
        assert_eq!(verdict, Verdict::denied(DenyReason::TenantSlugMismatch, "/"));
    }

    #[test]
    fn test_tenant_match_and_no_route_slug_render() {
        let resolution = signed_in().with_tenant(TenantContext::resolved(admin(), tenant("acme")));
        let policy = GatePolicy::default();
        assert_eq!(
            evaluate(
                &Requirement::TenantScoped,
                Some(&resolution),
                &RouteParams::with_tenant("acme"),
                &policy
            ),
            Verdict::Allowed
        );
        assert_eq!(
            evaluate(
                &Requirement::TenantScoped,
                Some(&resolution),
                &RouteParams::default(),
                &policy
            ),
            Verdict::Allowed
        );
    }

    #[test]
    fn test_half_resolved_tenant_context_is_denied() {
        let only_admin = TenantContext {
            admin: Some(admin()),
            tenant: None,
            is_loading: false,
        };
        let only_tenant = TenantContext {
            admin: None,
            tenant: Some(tenant("acme")),
            is_loading: false,
        };
        for context in [only_admin, only_tenant] {
            let verdict = evaluate(
                &Requirement::TenantScoped,
                Some(&signed_in().with_tenant(context)),
                &RouteParams::with_tenant("acme"),
                &GatePolicy::default(),
            );
            assert_eq!(
                verdict,
                Verdict::denied(DenyReason::InvariantViolation, "/login?tenant=acme")
            );
        }
    }

    #[test]
    fn test_tenant_context_loading_is_pending() {
        let context = TenantContext {
            is_loading: true,
            ..TenantContext::empty()
        };
        let verdict = evaluate(
            &Requirement::TenantScoped,
            Some(&signed_in().with_tenant(context)),
            &RouteParams::default(),
            &GatePolicy::default(),
        );
        assert_eq!(verdict, Verdict::Pending);
    }

    #[test]
    fn test_role_scoped() {
        let policy = GatePolicy::default();
        let route = RouteParams::default();
        let requirement = Requirement::role(Role::SuperAdmin);
        let granted = signed_in().with_role(RoleAssignment {
            role: Role::SuperAdmin,
            source: RoleSource::DirectoryRecord,
        });
        let other_role = signed_in().with_role(RoleAssignment {
            role: Role::Driver,
            source: RoleSource::EmbeddedMetadata,
        });

        assert_eq!(
            evaluate(&requirement, Some(&granted), &route, &policy),
            Verdict::Allowed
        );
        assert_eq!(
            evaluate(&requirement, Some(&other_role), &route, &policy),
            Verdict::denied(DenyReason::RoleMissing, "/")
        );
        assert_eq!(
            evaluate(&requirement, Some(&signed_in()), &route, &policy),
            Verdict::denied(DenyReason::RoleMissing, "/")
        );
        assert_eq!(
            evaluate(&requirement, Some(&signed_out()), &route, &policy),
            Verdict::denied(DenyReason::Unauthenticated, "/login")
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let policy = GatePolicy::default();
        let route = RouteParams::with_tenant("beta");
        let resolution = signed_in().with_tenant(TenantContext::resolved(admin(), tenant("acme")));

        let first = evaluate(&Requirement::TenantScoped, Some(&resolution), &route, &policy);
        let second = evaluate(&Requirement::TenantScoped, Some(&resolution), &route, &policy);
        assert_eq!(first, second);
    }
}
