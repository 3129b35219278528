//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. It is cheaply cloneable: every
//! backend sits behind an `Arc`.

use crate::domain::{MetricsPtr, RepositoryPtr, SessionStorePtr};

/// Shared application state passed to all Axum handlers.
///
/// Handlers depend on the `Repository`, `SessionStore` and `Metrics`
/// abstractions, never on a concrete backend. Built once in
/// `create_router()`, never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Persistent marketplace records (Postgres or in-memory).
    repository: RepositoryPtr,

    /// Bearer session tokens (Redis or in-memory).
    sessions: SessionStorePtr,

    /// Prometheus-backed or no-op.
    metrics: MetricsPtr,
}

impl AppState {
    // ---
    pub fn new(repository: RepositoryPtr, sessions: SessionStorePtr, metrics: MetricsPtr) -> Self {
        // ---
        AppState {
            repository,
            sessions,
            metrics,
        }
    }

    pub(crate) fn repository(&self) -> &RepositoryPtr {
        &self.repository
    }

    pub(crate) fn sessions(&self) -> &SessionStorePtr {
        &self.sessions
    }

    pub(crate) fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }
}
