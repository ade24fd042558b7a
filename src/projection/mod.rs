// Copyright (c) 2025 - Cowboy AI, Inc.
//! Projections
//!
//! Read models are derived from the global event order, one family per
//! aggregate kind:
//!
//! ```text
//! EventStore::read_all(checkpoint)
//!     ↓
//! ProjectionWorker ── retry with backoff, park per aggregate
//!     ↓
//! pure::reduce(row?, event) → RowChange
//!     ↓
//! ReadModel (rows + tombstones)
//! ```
//!
//! Families run as independent tokio tasks. Inside a family events are
//! applied strictly in global order, and replaying any prefix again is a
//! no-op because rows remember the stream sequence they reached.

pub mod engine;
pub mod pure;
pub mod read_model;

pub use engine::{EntityProjection, ParkedEvent, Projection, ProjectionEngine, ProjectionWorker};
pub use pure::{reduce, replay, RowChange, Rows};
pub use read_model::{EntityView, ListQuery, Page, ReadModel};

use thiserror::Error;

use crate::domain::AggregateKind;
use crate::event_store::EventStoreError;

/// Errors raised while applying events to a read model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// Event skips ahead of the row's sequence
    #[error("Sequence gap on {stream_id}: expected {expected}, got {actual}")]
    SequenceGap {
        stream_id: String,
        expected: u64,
        actual: u64,
    },

    /// Event kind differs from the row's kind
    #[error("Stream {stream_id} is a {expected} row, got a {actual} event")]
    KindMismatch {
        stream_id: String,
        expected: AggregateKind,
        actual: AggregateKind,
    },

    /// First event of a stream is not a creation
    #[error("No row for {stream_id} at sequence {sequence}")]
    MissingRow { stream_id: String, sequence: u64 },

    /// Reading the log failed
    #[error("Event store error: {0}")]
    Store(#[from] EventStoreError),

    /// Custom projection failure
    #[error("Projection failed: {0}")]
    Failed(String),
}

/// Result type for projection operations
pub type ProjectionResult<T> = Result<T, ProjectionError>;
