//! Pages behind authenticated, tenant and role gates. Page data beyond the
//! session is loaded client-side.

use askama::Template;
use axum::{extract::Path, response::IntoResponse};

use crate::models::{CurrentIdentity, UserProfile};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: UserProfile,
    pub current_page: &'static str,
}

#[derive(Template)]
#[template(path = "driver.html")]
pub struct DriverTemplate {
    pub user: UserProfile,
    pub current_page: &'static str,
}

#[derive(Template)]
#[template(path = "tenant_admin.html")]
pub struct TenantAdminTemplate {
    pub user: UserProfile,
    pub tenant: String,
    pub current_page: &'static str,
}

#[derive(Template)]
#[template(path = "super_admin.html")]
pub struct SuperAdminTemplate {
    pub user: UserProfile,
    pub current_page: &'static str,
}

pub async fn dashboard_handler(identity: CurrentIdentity) -> impl IntoResponse {
    DashboardTemplate {
        user: identity.profile(),
        current_page: "dashboard",
    }
}

pub async fn driver_dashboard_handler(identity: CurrentIdentity) -> impl IntoResponse {
    DriverTemplate {
        user: identity.profile(),
        current_page: "routes",
    }
}

pub async fn tenant_admin_dashboard_handler(
    Path(tenant): Path<String>,
    identity: CurrentIdentity,
) -> impl IntoResponse {
    TenantAdminTemplate {
        user: identity.profile(),
        tenant,
        current_page: "orders",
    }
}

pub async fn super_admin_handler(identity: CurrentIdentity) -> impl IntoResponse {
    SuperAdminTemplate {
        user: identity.profile(),
        current_page: "tenants",
    }
}
