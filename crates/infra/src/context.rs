//! Explicit execution context passed to every collaborator call.
//!
//! Seeding runs "as" a particular scope and area (e.g. admin) without flipping
//! any process-wide state: the context travels with the call. It also carries
//! the cancellation signal and the per-call timeout the applier enforces.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use forgeseed_core::TenantId;

/// Application area a reconciliation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionArea {
    #[default]
    Admin,
    Storefront,
    Global,
}

/// Cloneable, one-way cancellation signal.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called (immediately if it already was).
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a guarded call did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Cancelled,
    TimedOut(Duration),
}

/// Scope, area, cancellation and timeout for one reconciliation.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    scope: TenantId,
    area: ExecutionArea,
    call_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl ExecutionContext {
    pub fn new(scope: TenantId, area: ExecutionArea) -> Self {
        Self {
            scope,
            area,
            call_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Admin-area context, the area seed data is normally applied under.
    pub fn admin(scope: TenantId) -> Self {
        Self::new(scope, ExecutionArea::Admin)
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Copy of this context that uses `fallback` when no call timeout is set.
    /// The copy shares the cancellation token.
    pub fn or_call_timeout(&self, fallback: Option<Duration>) -> Self {
        let mut ctx = self.clone();
        ctx.call_timeout = ctx.call_timeout.or(fallback);
        ctx
    }

    pub fn scope(&self) -> TenantId {
        self.scope
    }

    pub fn area(&self) -> ExecutionArea {
        self.area
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` unless the context is cancelled or the call timeout elapses.
    ///
    /// A context that is already cancelled never polls `fut`.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        if self.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }

        let bounded = async {
            match self.call_timeout {
                Some(limit) => tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| Interrupted::TimedOut(limit)),
                None => Ok(fut.await),
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            out = bounded => out,
        }
    }
}
