#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admin_frontend::gate::{
    AdminRef, Collaborator, DirectoryLookup, DirectoryRecord, GateContext, GateError, GatePolicy,
    Identity, IdentityEvent, IdentityListener, IdentityMetadata, IdentityProvider, Role,
    Subscription, TenantContext, TenantContextProvider, TenantRecord,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use tokio::sync::Semaphore;

pub fn customer(email: &str) -> Identity {
    Identity::new(format!("user-{}", email), Some(email.to_string()))
}

pub fn with_metadata(email: &str, metadata: IdentityMetadata) -> Identity {
    customer(email).with_metadata(metadata)
}

pub fn driver(email: &str) -> Identity {
    with_metadata(
        email,
        IdentityMetadata {
            role: Some("driver".to_string()),
            ..Default::default()
        },
    )
}

pub fn tenant_admin(email: &str, slug: &str) -> Identity {
    with_metadata(
        email,
        IdentityMetadata {
            is_admin: true,
            tenant_slug: Some(slug.to_string()),
            ..Default::default()
        },
    )
}

pub fn tenant_of(user_id: &str, slug: &str) -> TenantContext {
    TenantContext::resolved(
        AdminRef {
            id: format!("admin-{}", slug),
            user_id: user_id.to_string(),
        },
        TenantRecord {
            id: format!("tenant-{}", slug),
            slug: slug.to_string(),
            name: None,
        },
    )
}

/// Unsigned token in the identity service's format.
pub fn access_token_for(user_id: &str, email: &str, metadata: serde_json::Value) -> String {
    let payload = serde_json::json!({
        "sub": user_id,
        "email": email,
        "exp": 4_102_444_800_i64,
        "app_metadata": metadata,
    });
    format!(
        "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

/// Polls `condition` until it holds or a second passes.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    condition()
}

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out")
}

/// Identity provider whose answers and events the test controls.
#[derive(Default)]
pub struct FakeIdentityProvider {
    identity: Mutex<Option<Identity>>,
    fail: AtomicBool,
    hold: Mutex<Option<Arc<Semaphore>>>,
    listeners: Arc<Mutex<HashMap<u64, IdentityListener>>>,
    next_listener: AtomicU64,
    pub lookups: AtomicUsize,
    pub subscribes: AtomicUsize,
    pub disposes: Arc<AtomicUsize>,
}

impl FakeIdentityProvider {
    pub fn signed_in(identity: Identity) -> Arc<Self> {
        let provider = Self::default();
        *provider.identity.lock().unwrap() = Some(identity);
        Arc::new(provider)
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_identity(&self, identity: Option<Identity>) {
        *self.identity.lock().unwrap() = identity;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Lookups started after this wait until [`release`](Self::release).
    pub fn hold(&self) {
        *self.hold.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self) {
        if let Some(semaphore) = self.hold.lock().unwrap().take() {
            semaphore.close();
        }
    }

    pub fn emit(&self, event: IdentityEvent) {
        let listeners: Vec<IdentityListener> =
            self.listeners.lock().unwrap().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, GateError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let hold = self.hold.lock().unwrap().clone();
        if let Some(semaphore) = hold {
            let _permit = semaphore.acquire().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GateError::lookup(
                Collaborator::IdentityProvider,
                "identity service unavailable",
            ));
        }
        Ok(self.identity.lock().unwrap().clone())
    }

    fn on_identity_change(&self, listener: IdentityListener) -> Subscription {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().insert(id, listener);

        let listeners = Arc::clone(&self.listeners);
        let disposes = Arc::clone(&self.disposes);
        Subscription::new(move || {
            listeners.lock().unwrap().remove(&id);
            disposes.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// Tenant lookup keyed by user id.
#[derive(Default)]
pub struct FakeTenants {
    contexts: Mutex<HashMap<String, TenantContext>>,
    fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeTenants {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, user_id: &str, context: TenantContext) {
        self.contexts
            .lock()
            .unwrap()
            .insert(user_id.to_string(), context);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TenantContextProvider for FakeTenants {
    async fn tenant_context(&self, identity: &Identity) -> Result<TenantContext, GateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GateError::lookup(Collaborator::TenantContext, "timeout"));
        }
        Ok(self
            .contexts
            .lock()
            .unwrap()
            .get(&identity.user_id)
            .cloned()
            .unwrap_or_else(TenantContext::empty))
    }
}

/// Role directory backed by a list of records.
#[derive(Default)]
pub struct FakeDirectory {
    records: Mutex<Vec<DirectoryRecord>>,
    fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn grant(&self, email: &str, role: Role) {
        self.records.lock().unwrap().push(DirectoryRecord {
            email: email.to_string(),
            role,
        });
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DirectoryLookup for FakeDirectory {
    async fn find_role_assignment(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Option<DirectoryRecord>, GateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GateError::lookup(Collaborator::Directory, "connection reset"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.email == email && r.role == role)
            .cloned())
    }
}

pub fn gate_context(
    identity: Arc<FakeIdentityProvider>,
    tenants: Arc<FakeTenants>,
    directory: Arc<FakeDirectory>,
    policy: GatePolicy,
) -> GateContext {
    GateContext {
        identity,
        tenants,
        directory,
        policy: Arc::new(policy),
    }
}
