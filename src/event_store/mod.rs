// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Store Abstraction
//!
//! Append-only, per-stream event log with a single global order.
//!
//! # Architecture
//!
//! ```text
//! Command → Handler → NewEvents → EventStore::append ─→ per-stream sequence
//!                                         │           └→ global offset
//!                                         ↓
//!                             read_all(offset) → Projections
//! ```
//!
//! # Guarantees
//!
//! 1. **Append-only**: events are never updated or deleted
//! 2. **Optimistic concurrency**: `append` succeeds only when the caller's
//!    expected version equals the stream's current version
//! 3. **Atomic batches**: all events of one append land contiguously or none do
//! 4. **Read-your-writes**: a successful append is visible to the next `read`
//! 5. **Total order**: `read_all` yields every event by global offset
//!
//! Streams are numbered from 1; version `0` means "no events yet". Offsets
//! are numbered from 1 as well, so a consumer that has processed nothing
//! reads from offset `0`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::AggregateKind;
use crate::events::DomainEvent;
use crate::trace::TraceContext;

pub mod instrumented;
pub mod memory;

pub use instrumented::InstrumentedEventStore;
pub use memory::InMemoryEventStore;

/// Event store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventStoreError {
    /// Expected version does not match the stream
    #[error("Concurrency conflict on {stream_id}: expected {expected}, actual {actual}")]
    ConcurrencyConflict {
        stream_id: String,
        expected: u64,
        actual: u64,
    },

    /// Events of another kind appended to an existing stream
    #[error("Stream {stream_id} holds {expected} events, got {actual}")]
    KindMismatch {
        stream_id: String,
        expected: AggregateKind,
        actual: AggregateKind,
    },

    /// Backing storage cannot be reached
    #[error("Event store unavailable: {0}")]
    Unavailable(String),

    /// Operation exceeded the caller's deadline
    #[error("Event store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Imported log violates ordering rules
    #[error("Invalid event log: {0}")]
    InvalidLog(String),
}

/// Result type for event store operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Lazy, finite event sequence; restart by calling `read` again
pub type EventStream = BoxStream<'static, EventStoreResult<StoredEvent>>;

/// Metadata attached to every event of one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// When the command was accepted
    pub timestamp: DateTime<Utc>,

    /// Command that caused the event
    pub causation_id: Uuid,

    /// Groups related commands across aggregates
    pub correlation_id: Option<Uuid>,

    /// Who issued the command
    pub actor: Option<String>,

    /// Caller's trace context
    pub trace: TraceContext,
}

/// Event ready to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub event_id: Uuid,
    pub data: DomainEvent,
    pub metadata: EventMetadata,
}

impl NewEvent {
    pub fn new(data: DomainEvent, metadata: EventMetadata) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            data,
            metadata,
        }
    }
}

/// Persisted event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent<E = DomainEvent> {
    /// Unique event ID (UUID v7 for time-ordering)
    pub event_id: Uuid,

    /// Stream (aggregate) id
    pub stream_id: String,

    /// Kind of the owning aggregate
    pub aggregate_kind: AggregateKind,

    /// Sequence number within the stream, gapless from 1
    pub sequence: u64,

    /// Position in the store-wide order, gapless from 1
    pub global_offset: u64,

    /// Qualified event type (`application.created`)
    pub event_type: String,

    /// When the command was accepted
    pub timestamp: DateTime<Utc>,

    /// Command id that produced the event
    pub causation_id: Uuid,

    /// Request-level correlation
    pub correlation_id: Option<Uuid>,

    /// Who issued the command
    pub actor: Option<String>,

    /// Caller's trace context
    #[serde(default)]
    pub trace: TraceContext,

    /// The domain event
    pub data: E,
}

impl StoredEvent {
    /// Seal a new event at its stream sequence and global offset
    pub fn seal(stream_id: &str, sequence: u64, global_offset: u64, event: NewEvent) -> Self {
        let NewEvent {
            event_id,
            data,
            metadata,
        } = event;
        Self {
            event_id,
            stream_id: stream_id.to_string(),
            aggregate_kind: data.kind(),
            sequence,
            global_offset,
            event_type: data.event_type(),
            timestamp: metadata.timestamp,
            causation_id: metadata.causation_id,
            correlation_id: metadata.correlation_id,
            actor: metadata.actor,
            trace: metadata.trace,
            data,
        }
    }
}

/// Event Store trait
///
/// Implementations must make `append` the single atomic mutation: the
/// per-stream version and the global offset advance together with the
/// events they number.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append events to a stream
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if `expected_version` is not the stream's
    ///   current version
    /// - `KindMismatch` if the events belong to another aggregate kind
    /// - `Unavailable` if storage cannot be reached
    async fn append(
        &self,
        stream_id: &str,
        expected_version: u64,
        events: Vec<NewEvent>,
    ) -> EventStoreResult<u64>;

    /// Events of one stream with `sequence > after_version`
    ///
    /// A missing stream yields an empty sequence.
    fn read(&self, stream_id: &str, after_version: u64, trace: &TraceContext) -> EventStream;

    /// Events of all streams with `global_offset > after_offset`
    fn read_all(&self, after_offset: u64) -> EventStream;

    /// Current version of a stream (0 when absent)
    async fn stream_version(&self, stream_id: &str) -> EventStoreResult<u64>;

    /// Highest global offset (0 when empty)
    async fn head_offset(&self) -> EventStoreResult<u64>;

    /// Watch channel carrying the head offset after every append
    fn subscribe(&self) -> watch::Receiver<u64>;
}

#[async_trait]
impl<S: EventStore + ?Sized> EventStore for Arc<S> {
    async fn append(
        &self,
        stream_id: &str,
        expected_version: u64,
        events: Vec<NewEvent>,
    ) -> EventStoreResult<u64> {
        (**self).append(stream_id, expected_version, events).await
    }

    fn read(&self, stream_id: &str, after_version: u64, trace: &TraceContext) -> EventStream {
        (**self).read(stream_id, after_version, trace)
    }

    fn read_all(&self, after_offset: u64) -> EventStream {
        (**self).read_all(after_offset)
    }

    async fn stream_version(&self, stream_id: &str) -> EventStoreResult<u64> {
        (**self).stream_version(stream_id).await
    }

    async fn head_offset(&self) -> EventStoreResult<u64> {
        (**self).head_offset().await
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        (**self).subscribe()
    }
}
