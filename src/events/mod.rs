// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Events
//!
//! Events are immutable facts representing state changes that have occurred.
//!
//! # Event Sourcing Principles
//!
//! 1. **Events are immutable**: once appended, never changed or deleted
//! 2. **Events are past tense**: `created`, `owner_set`, not `create`
//! 3. **Events carry deltas**: only the fields that changed
//! 4. **Metadata lives on the envelope**: sequence, offset, causation and
//!    trace ids are attached by the event store (see
//!    [`StoredEvent`](crate::event_store::StoredEvent))
//!
//! # Event Flow
//!
//! ```text
//! Command → Handler → DomainEvent → EventStore → Projections
//! ```
//!
//! # Module Organization
//!
//! - [`domain`] - polymorphic envelope over all kinds
//! - one module per aggregate kind

pub mod application;
pub mod application_interface;
pub mod application_service;
pub mod business_capability;
pub mod data_entity;
pub mod domain;
pub mod integration;
pub mod organization;
pub mod relation;
pub mod server;

pub use application::ApplicationEvent;
pub use application_interface::ApplicationInterfaceEvent;
pub use application_service::ApplicationServiceEvent;
pub use business_capability::BusinessCapabilityEvent;
pub use data_entity::DataEntityEvent;
pub use domain::DomainEvent;
pub use integration::IntegrationEvent;
pub use organization::OrganizationEvent;
pub use relation::RelationEvent;
pub use server::ServerEvent;
