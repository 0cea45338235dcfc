pub mod gate;
pub mod metrics;

pub use gate::{gate_middleware, GateServices, RouteGuard, TENANT_PATH_PARAM};
pub use metrics::metrics_middleware;
