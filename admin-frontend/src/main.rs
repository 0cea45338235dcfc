use admin_frontend::config::get_configuration;
use admin_frontend::gate::GatePolicy;
use admin_frontend::middleware::GateServices;
use admin_frontend::services::{BackendClient, IdentityClient, IdentityEvents};
use admin_frontend::startup::build_router;
use admin_frontend::AppState;
use dotenvy::dotenv;
use service_core::observability::logging::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "admin-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    admin_frontend::services::metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let backend = Arc::new(BackendClient::new(configuration.backend.clone()));
    let identity_client = Arc::new(IdentityClient::new(
        configuration.identity_service.clone(),
    ));
    let policy = GatePolicy::from(&configuration.gate);
    info!(
        login_path = %policy.login_path,
        tenant_slug_correction = policy.tenant_slug_correction,
        "Gate policy loaded"
    );

    let gates = GateServices {
        tenants: backend.clone(),
        directory: backend,
        policy: Arc::new(policy),
        identity_events: IdentityEvents::default(),
    };
    let state = AppState::new(identity_client, gates).with_session_settings(
        configuration.server.secure_cookies,
        configuration.server.session_idle_hours,
    );

    let app = build_router(state);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting admin-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
