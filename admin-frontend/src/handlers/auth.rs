use crate::gate::{
    canonical_admin_path, dashboard_for, is_tenant_slug, Identity, IdentityEvent, UserType,
};
use crate::services::session_identity::{access_token, refresh_token, store_identity};
use crate::utils::hx_redirect;
use crate::utils::jwt::identity_from_access_token;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub tenant: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {}

#[derive(Deserialize, Default)]
pub struct LoginQuery {
    pub tenant: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub tenant: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::SessionError(anyhow::Error::new(e))
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        tenant: query
            .tenant
            .filter(|tenant| is_tenant_slug(tenant))
            .unwrap_or_default(),
        error: query.error,
    }
}

/// Where a freshly signed-in user lands.
///
/// A tenant picked on the login form only counts for admins, only when it is
/// a well-formed slug, and never overrides the tenant in their own metadata.
fn post_login_target(identity: &Identity, requested_tenant: Option<&str>) -> String {
    let own_slug = identity.metadata.tenant_slug.as_deref();
    let requested = requested_tenant
        .map(str::trim)
        .filter(|tenant| is_tenant_slug(tenant))
        .filter(|tenant| own_slug.map_or(true, |own| own == *tenant));

    match (identity.user_type(), requested) {
        (UserType::Admin, Some(tenant)) => canonical_admin_path(tenant),
        (user_type, _) => dashboard_for(user_type, own_slug),
    }
}

pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate {}
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, AppError> {
    let tokens = match state
        .identity_client
        .login(&payload.email, &payload.password)
        .await
    {
        Ok(tokens) => tokens,
        Err(AppError::Unauthorized(_)) => {
            // Return error fragment for HTMX
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html("<p class='text-red-500 text-sm'>Invalid email or password</p>"),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };

    let identity = match identity_from_access_token(&tokens.access_token) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!("Failed to decode JWT claims: {}", e);
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<p class='text-red-500 text-sm'>Authentication error</p>"),
            )
                .into_response());
        }
    };

    // Gates still hold the id the browser sent
    let previous_session = session.id();
    session.cycle_id().await.map_err(session_error)?;
    store_identity(&session, &identity, &tokens)
        .await
        .map_err(session_error)?;
    state
        .gates
        .identity_events
        .publish(previous_session, IdentityEvent::SignedIn);

    tracing::info!(
        user_id = %identity.user_id,
        user_type = ?identity.user_type(),
        "User logged in successfully"
    );

    let target = post_login_target(&identity, payload.tenant.as_deref());
    Ok(hx_redirect(&target))
}

pub async fn register_handler(
    State(state): State<AppState>,
    Form(payload): Form<RegisterRequest>,
) -> impl IntoResponse {
    match state
        .identity_client
        .register(&payload.email, &payload.password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Html("<p class='text-emerald-500 text-sm'>Registration successful! Please check your email.</p>"),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html("<p class='text-red-500 text-sm'>Registration failed. Email might already be in use.</p>"),
            )
                .into_response()
        }
    }
}

pub async fn logout_handler(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    if let Some(token) = access_token(&session).await {
        // Logout proceeds even if revocation fails
        if let Err(e) = state.identity_client.logout(&token).await {
            tracing::error!("Failed to revoke token during logout: {}", e);
        } else {
            tracing::info!("Token revoked successfully");
        }
    }

    let session_id = session.id();
    // Deletes the stored record so a replayed cookie is signed out too
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session during logout: {}", e);
    }
    state
        .gates
        .identity_events
        .publish(session_id, IdentityEvent::SignedOut);

    hx_redirect("/")
}

/// Exchanges the stored refresh token for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<StatusCode, AppError> {
    let token = refresh_token(&session)
        .await
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("No refresh token in session")))?;

    let tokens = state.identity_client.refresh(&token).await?;
    let identity = identity_from_access_token(&tokens.access_token)
        .map_err(|e| AppError::BadGateway(format!("Unreadable access token: {}", e)))?;

    store_identity(&session, &identity, &tokens)
        .await
        .map_err(session_error)?;
    state
        .gates
        .identity_events
        .publish(session.id(), IdentityEvent::TokenRefreshed);

    tracing::info!(user_id = %identity.user_id, "Session token refreshed");
    Ok(StatusCode::NO_CONTENT)
}
