// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for the repository core
//!
//! Two families are kept apart:
//! [`DomainError`] means the command simply did not apply, while
//! [`InfrastructureError`] means the store or runtime could not answer and the
//! request may be retried.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by command validation and aggregate rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Missing or malformed field
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Relation triple not present in the allow-list
    #[error("Relation '{relation}' is not allowed from {source_kind} to {target_kind}")]
    InvalidRelation {
        source_kind: String,
        target_kind: String,
        relation: String,
    },

    /// Lifecycle edge not permitted
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Parent assignment would close a loop
    #[error("Setting parent of {child} to {parent} would create a cycle")]
    CycleDetected { child: String, parent: String },

    /// Parent id does not resolve to a live aggregate of the same kind
    #[error("Unknown parent: {0}")]
    UnknownParent(String),

    /// Destructive command without approval context
    #[error("Missing approval context: {}", missing.join(", "))]
    MissingApprovalContext { missing: Vec<String> },

    /// Stale expected version
    #[error("Concurrency conflict on {stream_id}: expected version {expected}, actual {actual}")]
    ConcurrencyConflict {
        stream_id: String,
        expected: u64,
        actual: u64,
    },

    /// Unknown or deleted aggregate
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },
}

impl DomainError {
    /// Shorthand for a field validation failure
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a missing required field
    pub fn required(field: impl Into<String>) -> Self {
        Self::validation(field, "field is required")
    }

    /// Stable machine-readable code for the transport layer
    ///
    /// Invalid relations share `validation_error` with field failures.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } | DomainError::InvalidRelation { .. } => {
                "validation_error"
            }
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::CycleDetected { .. } => "cycle_detected",
            DomainError::UnknownParent(_) => "unknown_parent",
            DomainError::MissingApprovalContext { .. } => "missing_approval_context",
            DomainError::ConcurrencyConflict { .. } => "concurrency_conflict",
            DomainError::NotFound { .. } => "not_found",
        }
    }

    /// HTTP status hint for the transport layer
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::NotFound { .. } => 404,
            DomainError::ConcurrencyConflict { .. } => 409,
            _ => 400,
        }
    }

    /// Structured error payload (`{"error": ..., "code": ...}`)
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        })
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors that can occur in infrastructure operations
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Backing store could not be reached
    #[error("Event store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout error
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Generic infrastructure error
    #[error("Infrastructure error: {0}")]
    Generic(String),
}

impl InfrastructureError {
    /// Whether the caller may retry the request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InfrastructureError::StoreUnavailable(_) | InfrastructureError::Timeout(_)
        )
    }
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(DomainError::required("name"), 400, "validation_error")]
    #[test_case(
        DomainError::InvalidRelation {
            source_kind: "server".into(),
            target_kind: "application".into(),
            relation: "deployed_on".into(),
        },
        400,
        "validation_error"
    )]
    #[test_case(
        DomainError::InvalidTransition { from: "deprecated".into(), to: "planned".into() },
        400,
        "invalid_transition"
    )]
    #[test_case(
        DomainError::CycleDetected { child: "org-a".into(), parent: "org-b".into() },
        400,
        "cycle_detected"
    )]
    #[test_case(
        DomainError::MissingApprovalContext { missing: vec!["reason".into()] },
        400,
        "missing_approval_context"
    )]
    #[test_case(
        DomainError::ConcurrencyConflict { stream_id: "app-1".into(), expected: 1, actual: 2 },
        409,
        "concurrency_conflict"
    )]
    #[test_case(
        DomainError::NotFound { kind: "application".into(), id: "app-1".into() },
        404,
        "not_found"
    )]
    fn test_error_mapping(error: DomainError, status: u16, code: &str) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.code(), code);
    }

    #[test]
    fn test_payload_has_error_field() {
        let payload = DomainError::InvalidTransition {
            from: "deprecated".into(),
            to: "planned".into(),
        }
        .to_payload();

        assert!(payload.get("error").is_some());
        assert_eq!(payload["code"], "invalid_transition");
    }

    #[test]
    fn test_missing_approval_message_lists_fields() {
        let error = DomainError::MissingApprovalContext {
            missing: vec!["approval_id".into(), "reason".into()],
        };
        assert_eq!(
            error.to_string(),
            "Missing approval context: approval_id, reason"
        );
    }

    #[test]
    fn test_retryable_infrastructure_errors() {
        assert!(InfrastructureError::StoreUnavailable("down".into()).is_retryable());
        assert!(InfrastructureError::Timeout(Duration::from_millis(5)).is_retryable());
        assert!(!InfrastructureError::Configuration("bad".into()).is_retryable());
    }
}
