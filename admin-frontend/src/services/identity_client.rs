use crate::config::IdentityServiceSettings;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Client for the identity service's session endpoints.
pub struct IdentityClient {
    client: Client,
    settings: IdentityServiceSettings,
}

impl IdentityClient {
    pub fn new(settings: IdentityServiceSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let response = self
            .post(
                "/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        Self::tokens(response).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<(), AppError> {
        let response = self
            .post(
                "/auth/register",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                Err(AppError::BadRequest(anyhow::anyhow!("Registration rejected")))
            }
            status => Err(AppError::BadGateway(format!(
                "identity service returned {}",
                status
            ))),
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let response = self
            .post(
                "/auth/refresh",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await?;
        Self::tokens(response).await
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .post("/auth/logout", serde_json::json!({ "token": access_token }))
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::BadGateway(format!(
                "token revocation returned {}",
                response.status()
            )))
        }
    }

    /// Send a POST request with trace context propagation.
    async fn post(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response, AppError> {
        let url = format!("{}{}", self.settings.url.trim_end_matches('/'), path);

        self.client
            .traced_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                AppError::from(e)
            })
    }

    async fn tokens(response: reqwest::Response) -> Result<TokenPair, AppError> {
        match response.status() {
            status if status.is_success() => Ok(response.json::<TokenPair>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST => Err(
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials")),
            ),
            status => Err(AppError::BadGateway(format!(
                "identity service returned {}",
                status
            ))),
        }
    }
}
