use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::request_id_middleware;
use service_core::observability::extract_traceparent;
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::gate::{Requirement, Role};
use crate::handlers::{
    app::{community, health_check, index, not_found},
    auth::{
        login_handler, login_page, logout_handler, refresh_handler, register_handler,
        register_page,
    },
    dashboard::{
        dashboard_handler, driver_dashboard_handler, super_admin_handler,
        tenant_admin_dashboard_handler,
    },
    metrics::metrics,
};
use crate::middleware::{gate_middleware, metrics_middleware};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(state.session_idle_hours)));

    let gates = state.gates.clone();
    let open = || from_fn_with_state(gates.guard(Requirement::Open), gate_middleware);
    let public_only = || from_fn_with_state(gates.guard(Requirement::PublicOnly), gate_middleware);

    Router::new()
        .route("/", get(index).layer(open()))
        .route("/community", get(community).layer(open()))
        // Form posts stay reachable while signed in; only the pages are gated.
        .route("/login", get(login_page).layer(public_only()).post(login_handler))
        .route(
            "/register",
            get(register_page).layer(public_only()).post(register_handler),
        )
        .route("/logout", get(logout_handler).post(logout_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route(
            "/dashboard",
            get(dashboard_handler).layer(from_fn_with_state(
                gates.guard(Requirement::Authenticated),
                gate_middleware,
            )),
        )
        .route(
            "/driver/dashboard",
            get(driver_dashboard_handler).layer(from_fn_with_state(
                gates.guard(Requirement::role(Role::Driver)),
                gate_middleware,
            )),
        )
        .route(
            "/:tenant/admin/dashboard",
            get(tenant_admin_dashboard_handler).layer(from_fn_with_state(
                gates.guard(Requirement::TenantScoped),
                gate_middleware,
            )),
        )
        .route(
            "/super-admin",
            get(super_admin_handler).layer(from_fn_with_state(
                gates.guard(Requirement::role(Role::SuperAdmin)),
                gate_middleware,
            )),
        )
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .nest_service("/static", ServeDir::new("admin-frontend/static"))
        .fallback(not_found)
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(service_core::middleware::REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                let traceparent = extract_traceparent(request.headers()).unwrap_or_default();

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    traceparent = %traceparent,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the trace span sees the generated id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
