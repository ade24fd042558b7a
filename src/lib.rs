// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event-sourced core of an Enterprise Architecture repository
//!
//! Commands are validated by pure per-kind handlers and recorded as events
//! in an append-only store; read models are projections of the global log.
//!
//! ```text
//! Command ──> CommandService ──> handlers::decide ──> EventStore::append
//!                                                          │
//!                                    ProjectionEngine <────┘ read_all
//!                                          │
//!                                      ReadModel
//! ```
//!
//! Domain rules live in [`domain`] (relation matrix, hierarchy checks,
//! hostnames, classifications) and [`state_machine`] (lifecycles).

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod errors;
pub mod event_store;
pub mod events;
pub mod metrics;
pub mod projection;
pub mod service;
pub mod state_machine;
pub mod trace;

// Re-export commonly used types
pub use aggregate::{Aggregate, Command, CommandBody, CommandMetadata, CommandTarget, EntityState};
pub use config::{EngineConfig, ProjectionConfig};
pub use domain::AggregateKind;
pub use errors::{DomainError, DomainResult, InfrastructureError, InfrastructureResult};
pub use event_store::{
    EventStore, EventStoreError, EventStoreResult, InMemoryEventStore, InstrumentedEventStore,
    StoredEvent,
};
pub use events::DomainEvent;
pub use metrics::{InMemoryMetrics, MetricsSink, NoopMetrics, SharedMetrics};
pub use projection::{ListQuery, Page, ProjectionEngine, ProjectionError, ReadModel};
pub use service::{CommandOutcome, CommandService, ServiceError, ServiceResult};
pub use trace::TraceContext;
