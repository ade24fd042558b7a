// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer
//!
//! Orchestrates the write path around the pure handlers:
//!
//! ```text
//! Command
//!     ↓
//! CommandService::execute ── timeout, span, metrics
//!     ↓
//! load aggregate (snapshot + stream tail)
//!     ↓
//! expected_version check → hierarchy lookup → handlers::decide
//!     ↓
//! EventStore::append (optimistic concurrency)
//!     ↓
//! Projections (read_all)
//! ```
//!
//! Each `execute` is one transaction: if any step fails no event is
//! written.

pub mod command_service;
pub mod snapshot_cache;

pub use command_service::{CommandOutcome, CommandService};
pub use snapshot_cache::SnapshotCache;

use crate::errors::{DomainError, InfrastructureError};
use crate::event_store::EventStoreError;

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The command did not apply
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage or runtime failure; the caller may retry
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

impl ServiceError {
    /// HTTP-style status for the transport layer
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Domain(err) => err.status_code(),
            ServiceError::Infrastructure(_) => 503,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(err) => err.code(),
            ServiceError::Infrastructure(InfrastructureError::Timeout(_)) => "timeout",
            ServiceError::Infrastructure(_) => "service_unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Domain(_) => false,
            ServiceError::Infrastructure(err) => err.is_retryable(),
        }
    }

    /// Structured error payload (`{"error": ..., "code": ...}`)
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        })
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(err) => Some(err),
            ServiceError::Infrastructure(_) => None,
        }
    }
}

impl From<EventStoreError> for ServiceError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::ConcurrencyConflict {
                stream_id,
                expected,
                actual,
            } => ServiceError::Domain(DomainError::ConcurrencyConflict {
                stream_id,
                expected,
                actual,
            }),
            EventStoreError::Unavailable(msg) => {
                ServiceError::Infrastructure(InfrastructureError::StoreUnavailable(msg))
            }
            EventStoreError::Timeout(after) => {
                ServiceError::Infrastructure(InfrastructureError::Timeout(after))
            }
            other => ServiceError::Infrastructure(InfrastructureError::Generic(other.to_string())),
        }
    }
}
