//! Route guard: mounts a [`Gate`] for the request and acts on its output.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::gate::{
    DirectoryLookup, Gate, GateContext, GateOutput, GatePolicy, Requirement, RouteParams,
    TenantContextProvider,
};
use crate::handlers::app::LoadingTemplate;
use crate::services::{metrics, IdentityEvents, SessionIdentityProvider};
use crate::utils::redirect_for;

/// Route parameter holding the requested tenant slug.
pub const TENANT_PATH_PARAM: &str = "tenant";

/// Collaborators shared by every guarded route.
#[derive(Clone)]
pub struct GateServices {
    pub tenants: Arc<dyn TenantContextProvider>,
    pub directory: Arc<dyn DirectoryLookup>,
    pub policy: Arc<GatePolicy>,
    pub identity_events: IdentityEvents,
}

impl GateServices {
    pub fn context_for(&self, session: Session) -> GateContext {
        GateContext {
            identity: Arc::new(SessionIdentityProvider::new(
                session,
                self.identity_events.clone(),
            )),
            tenants: Arc::clone(&self.tenants),
            directory: Arc::clone(&self.directory),
            policy: Arc::clone(&self.policy),
        }
    }

    pub fn guard(&self, requirement: Requirement) -> RouteGuard {
        RouteGuard {
            requirement,
            services: self.clone(),
        }
    }
}

/// Middleware state for one guarded route.
#[derive(Clone)]
pub struct RouteGuard {
    pub requirement: Requirement,
    pub services: GateServices,
}

pub async fn gate_middleware(
    State(guard): State<RouteGuard>,
    session: Session,
    path_params: Option<Path<HashMap<String, String>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let route = RouteParams {
        tenant_slug: path_params.and_then(|Path(mut params)| params.remove(TENANT_PATH_PARAM)),
    };

    let mut gate = Gate::mount(
        guard.requirement.clone(),
        route,
        guard.services.context_for(session),
    );
    let state = gate.settled().await;
    gate.unmount();

    let gate_name = guard.requirement.gate_name();
    metrics::record_decision(gate_name, state.verdict().outcome());

    match state.output() {
        GateOutput::Render => next.run(request).await,
        GateOutput::Redirect(navigation) => {
            tracing::debug!(
                gate = gate_name,
                path = %request.uri().path(),
                redirect = %navigation.path,
                "Redirecting guarded request"
            );
            redirect_for(request.headers(), &navigation.path)
        }
        GateOutput::Loading => LoadingTemplate {}.into_response(),
    }
}
