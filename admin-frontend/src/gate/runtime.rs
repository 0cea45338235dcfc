//! A mounted gate: one lookup at mount, re-evaluation on every identity
//! change, teardown on unmount.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::evaluate::evaluate;
use super::model::RouteParams;
use super::providers::{IdentityListener, Subscription};
use super::requirement::Requirement;
use super::resolve::{resolve, GateContext, Resolution};
use super::verdict::{DenyReason, GateOutput, GateState, Verdict};

pub struct Gate {
    inner: Arc<GateInner>,
    receiver: watch::Receiver<GateState>,
}

struct GateInner {
    requirement: Requirement,
    route: RouteParams,
    context: GateContext,
    runtime: Handle,
    /// Taken on unmount; a lookup only publishes while it is still here.
    state: Mutex<Option<watch::Sender<GateState>>>,
    cancel: CancellationToken,
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    subscription: Mutex<Option<Subscription>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Gate {
    /// Mounts the gate: subscribes to identity changes and starts the first
    /// lookup.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn mount(requirement: Requirement, route: RouteParams, context: GateContext) -> Self {
        let (sender, receiver) = watch::channel(GateState::Initializing);
        let inner = Arc::new(GateInner {
            requirement,
            route,
            context,
            runtime: Handle::current(),
            state: Mutex::new(Some(sender)),
            cancel: CancellationToken::new(),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        let listener: IdentityListener = Arc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                tracing::debug!(
                    gate = inner.requirement.gate_name(),
                    event = %event,
                    "Identity changed; re-evaluating gate"
                );
                inner.refresh();
            }
        });
        let subscription = inner.context.identity.on_identity_change(listener);
        *lock(&inner.subscription) = Some(subscription);

        inner.refresh();

        Self { inner, receiver }
    }

    pub fn requirement(&self) -> &Requirement {
        &self.inner.requirement
    }

    pub fn state(&self) -> GateState {
        self.receiver.borrow().clone()
    }

    pub fn output(&self) -> GateOutput {
        self.receiver.borrow().output()
    }

    /// A receiver that observes every state change until unmount.
    pub fn watch(&self) -> watch::Receiver<GateState> {
        self.receiver.clone()
    }

    /// Waits for the first resolved state.
    ///
    /// Returns `Initializing` only if the gate is unmounted first.
    pub async fn settled(&mut self) -> GateState {
        loop {
            {
                let state = self.receiver.borrow_and_update();
                if matches!(*state, GateState::Resolved(_)) {
                    return state.clone();
                }
            }
            if self.receiver.changed().await.is_err() {
                return self.receiver.borrow().clone();
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.inner.cancel.is_cancelled()
    }

    /// Tears the gate down. Safe to call more than once.
    pub fn unmount(&self) {
        self.inner.cancel.cancel();
        lock(&self.inner.state).take();
        if let Some(mut subscription) = lock(&self.inner.subscription).take() {
            subscription.dispose();
        }
        if let Some(task) = lock(&self.inner.in_flight).take() {
            task.abort();
        }
    }
}

impl Drop for Gate {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl GateInner {
    /// Starts a lookup, superseding any that is still running.
    fn refresh(self: &Arc<Self>) {
        if self.cancel.is_cancelled() {
            return;
        }

        // Held across bump, spawn and swap so the surviving task is always
        // the newest generation.
        let mut in_flight = lock(&self.in_flight);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            let resolution = tokio::select! {
                () = inner.cancel.cancelled() => return,
                resolution = resolve(&inner.requirement, &inner.context) => resolution,
            };
            inner.publish(generation, &resolution);
        });

        if let Some(previous) = in_flight.replace(task) {
            previous.abort();
        }
    }

    fn publish(&self, generation: u64, resolution: &Resolution) {
        let state = lock(&self.state);
        let Some(sender) = state.as_ref() else {
            return;
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                gate = self.requirement.gate_name(),
                "Discarding stale gate lookup"
            );
            return;
        }

        let verdict = evaluate(
            &self.requirement,
            Some(resolution),
            &self.route,
            &self.context.policy,
        );
        self.report(&verdict, resolution);
        sender.send_replace(GateState::Resolved(verdict));
    }

    fn report(&self, verdict: &Verdict, resolution: &Resolution) {
        let gate = self.requirement.gate_name();
        let requested_slug = self.route.tenant_slug.as_deref().unwrap_or("");
        match verdict {
            Verdict::Denied(denial) => match denial.reason {
                DenyReason::TenantSlugMismatch => {
                    let resolved_slug = resolution
                        .tenant
                        .as_ref()
                        .and_then(|t| t.tenant.as_ref())
                        .map(|t| t.slug.as_str())
                        .unwrap_or("");
                    tracing::info!(
                        gate,
                        requested_slug,
                        resolved_slug,
                        redirect = %denial.redirect,
                        "Tenant slug does not match the admin's tenant"
                    );
                }
                DenyReason::InvariantViolation => {
                    let tenant = resolution.tenant.as_ref();
                    tracing::warn!(
                        gate,
                        requested_slug,
                        has_admin = tenant.is_some_and(|t| t.admin.is_some()),
                        has_tenant = tenant.is_some_and(|t| t.tenant.is_some()),
                        "Tenant context resolved with only one of admin and tenant"
                    );
                }
                reason => {
                    tracing::debug!(
                        gate,
                        reason = %reason,
                        redirect = %denial.redirect,
                        "Gate denied access"
                    );
                }
            },
            Verdict::Allowed => {
                tracing::debug!(
                    gate,
                    lookup_failed = resolution.failure.is_some(),
                    "Gate allowed access"
                );
            }
            Verdict::Pending => {}
        }
    }
}
