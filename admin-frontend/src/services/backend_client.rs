//! Client for the hosted backend's REST interface.
//!
//! Tables are queried with PostgREST-style filters (`column=eq.value`). An
//! empty result set is "not found", never an error.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service_core::observability::TracedClientExt;

use crate::config::BackendSettings;
use crate::gate::{
    AdminRef, Collaborator, DirectoryLookup, DirectoryRecord, GateError, Identity, Role,
    TenantContext, TenantContextProvider, TenantRecord,
};

const TENANT_ADMINS_TABLE: &str = "tenant_admins";
const ROLE_ASSIGNMENTS_TABLE: &str = "role_assignments";

#[derive(Debug, Deserialize)]
struct TenantAdminRow {
    id: String,
    user_id: String,
    #[serde(default)]
    tenant: Option<TenantRecord>,
}

pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.settings.url.trim_end_matches('/'), table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        collaborator: Collaborator,
    ) -> Result<Vec<T>, GateError> {
        let url = self.table_url(table);
        let api_key = self.settings.api_key.expose_secret();

        let response = self
            .client
            .traced_get(&url)
            .header("apikey", api_key)
            .bearer_auth(api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                GateError::lookup(collaborator, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GateError::lookup(
                collaborator,
                format!("{} returned {}", table, status),
            ));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| GateError::lookup(collaborator, e))
    }
}

#[async_trait]
impl TenantContextProvider for BackendClient {
    async fn tenant_context(&self, identity: &Identity) -> Result<TenantContext, GateError> {
        let rows: Vec<TenantAdminRow> = self
            .select(
                TENANT_ADMINS_TABLE,
                &[
                    ("select", "id,user_id,tenant:tenants(id,slug,name)".to_string()),
                    ("user_id", format!("eq.{}", identity.user_id)),
                    ("limit", "1".to_string()),
                ],
                Collaborator::TenantContext,
            )
            .await?;

        Ok(match rows.into_iter().next() {
            Some(row) => TenantContext {
                admin: Some(AdminRef {
                    id: row.id,
                    user_id: row.user_id,
                }),
                tenant: row.tenant,
                is_loading: false,
            },
            None => TenantContext::empty(),
        })
    }
}

#[async_trait]
impl DirectoryLookup for BackendClient {
    async fn find_role_assignment(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Option<DirectoryRecord>, GateError> {
        let rows: Vec<DirectoryRecord> = self
            .select(
                ROLE_ASSIGNMENTS_TABLE,
                &[
                    ("select", "email,role".to_string()),
                    ("email", format!("eq.{}", email)),
                    ("role", format!("eq.{}", role)),
                    ("limit", "1".to_string()),
                ],
                Collaborator::Directory,
            )
            .await?;

        Ok(rows.into_iter().next())
    }
}
