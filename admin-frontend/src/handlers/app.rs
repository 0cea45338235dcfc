use askama::Template;
use axum::{http::Uri, response::IntoResponse};
use service_core::error::AppError;

use crate::models::{CurrentIdentity, UserProfile};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: Option<UserProfile>,
}

#[derive(Template)]
#[template(path = "community.html")]
pub struct CommunityTemplate {
    pub user: Option<UserProfile>,
}

/// Shown while a gate has not resolved yet.
#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {}

pub async fn index(identity: Option<CurrentIdentity>) -> impl IntoResponse {
    IndexTemplate {
        user: identity.map(|i| i.profile()),
    }
}

pub async fn community(identity: Option<CurrentIdentity>) -> impl IntoResponse {
    CommunityTemplate {
        user: identity.map(|i| i.profile()),
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
