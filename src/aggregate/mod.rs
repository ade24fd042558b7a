// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Aggregates
//!
//! Every repository object is an event-sourced aggregate of one
//! [`AggregateKind`]. Each kind lives in its own module and exposes the
//! same three pure functions:
//!
//! ```text
//! decide(State?, Command, &HandlerContext) → Result<[Event], DomainError>
//! from_created(&Event) → State?
//! apply_event(State, &Event) → State
//! ```
//!
//! [`Aggregate`] wraps the kind-specific state in the tagged [`EntityState`]
//! together with the stream bookkeeping (version, timestamps, deletion flag)
//! shared by all kinds.
//!
//! # Fold Pattern
//!
//! ```rust,ignore
//! let aggregate = Aggregate::from_events(&stored_events);
//! ```
//!
//! # Time as Parameter
//!
//! Handlers never read the clock; timestamps come from the stored events.

pub mod application;
pub mod application_interface;
pub mod application_service;
pub mod business_capability;
pub mod commands;
pub mod data_entity;
pub mod handlers;
pub mod integration;
pub mod organization;
pub mod relation;
pub mod server;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use application::ApplicationState;
pub use application_interface::ApplicationInterfaceState;
pub use application_service::ApplicationServiceState;
pub use business_capability::BusinessCapabilityState;
pub use commands::{Command, CommandBody, CommandMetadata, CommandTarget};
pub use data_entity::DataEntityState;
pub use handlers::{decide, HandlerContext};
pub use integration::IntegrationState;
pub use organization::OrganizationState;
pub use relation::RelationState;
pub use server::ServerState;

use crate::domain::AggregateKind;
use crate::event_store::StoredEvent;
use crate::events::DomainEvent;
use crate::state_machine::Lifecycle;

/// Kind-specific aggregate state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate_type", content = "state", rename_all = "snake_case")]
pub enum EntityState {
    Application(ApplicationState),
    ApplicationService(ApplicationServiceState),
    ApplicationInterface(ApplicationInterfaceState),
    BusinessCapability(BusinessCapabilityState),
    DataEntity(DataEntityState),
    Integration(IntegrationState),
    Organization(OrganizationState),
    Server(ServerState),
    Relation(RelationState),
}

impl EntityState {
    pub fn kind(&self) -> AggregateKind {
        match self {
            EntityState::Application(_) => AggregateKind::Application,
            EntityState::ApplicationService(_) => AggregateKind::ApplicationService,
            EntityState::ApplicationInterface(_) => AggregateKind::ApplicationInterface,
            EntityState::BusinessCapability(_) => AggregateKind::BusinessCapability,
            EntityState::DataEntity(_) => AggregateKind::DataEntity,
            EntityState::Integration(_) => AggregateKind::Integration,
            EntityState::Organization(_) => AggregateKind::Organization,
            EntityState::Server(_) => AggregateKind::Server,
            EntityState::Relation(_) => AggregateKind::Relation,
        }
    }

    /// State produced by a creation event
    pub fn from_created(event: &DomainEvent) -> Option<Self> {
        match event {
            DomainEvent::Application(e) => application::from_created(e).map(Self::Application),
            DomainEvent::ApplicationService(e) => {
                application_service::from_created(e).map(Self::ApplicationService)
            }
            DomainEvent::ApplicationInterface(e) => {
                application_interface::from_created(e).map(Self::ApplicationInterface)
            }
            DomainEvent::BusinessCapability(e) => {
                business_capability::from_created(e).map(Self::BusinessCapability)
            }
            DomainEvent::DataEntity(e) => data_entity::from_created(e).map(Self::DataEntity),
            DomainEvent::Integration(e) => integration::from_created(e).map(Self::Integration),
            DomainEvent::Organization(e) => organization::from_created(e).map(Self::Organization),
            DomainEvent::Server(e) => server::from_created(e).map(Self::Server),
            DomainEvent::Relation(e) => relation::from_created(e).map(Self::Relation),
        }
    }

    /// Fold one event; an event of another kind returns the state in `Err`
    pub fn apply(self, event: &DomainEvent) -> Result<Self, Self> {
        Ok(match (self, event) {
            (Self::Application(s), DomainEvent::Application(e)) => {
                Self::Application(application::apply_event(s, e))
            }
            (Self::ApplicationService(s), DomainEvent::ApplicationService(e)) => {
                Self::ApplicationService(application_service::apply_event(s, e))
            }
            (Self::ApplicationInterface(s), DomainEvent::ApplicationInterface(e)) => {
                Self::ApplicationInterface(application_interface::apply_event(s, e))
            }
            (Self::BusinessCapability(s), DomainEvent::BusinessCapability(e)) => {
                Self::BusinessCapability(business_capability::apply_event(s, e))
            }
            (Self::DataEntity(s), DomainEvent::DataEntity(e)) => {
                Self::DataEntity(data_entity::apply_event(s, e))
            }
            (Self::Integration(s), DomainEvent::Integration(e)) => {
                Self::Integration(integration::apply_event(s, e))
            }
            (Self::Organization(s), DomainEvent::Organization(e)) => {
                Self::Organization(organization::apply_event(s, e))
            }
            (Self::Server(s), DomainEvent::Server(e)) => Self::Server(server::apply_event(s, e)),
            (Self::Relation(s), DomainEvent::Relation(e)) => {
                Self::Relation(relation::apply_event(s, e))
            }
            (state, _) => return Err(state),
        })
    }

    fn attribute(&self, key: &str) -> Option<String> {
        match self {
            EntityState::Application(s) => s.attribute(key),
            EntityState::ApplicationService(s) => s.attribute(key),
            EntityState::ApplicationInterface(s) => s.attribute(key),
            EntityState::BusinessCapability(s) => s.attribute(key),
            EntityState::DataEntity(s) => s.attribute(key),
            EntityState::Integration(s) => s.attribute(key),
            EntityState::Organization(s) => s.attribute(key),
            EntityState::Server(s) => s.attribute(key),
            EntityState::Relation(s) => s.attribute(key),
        }
    }
}

/// Current state of one aggregate, folded from its stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub id: String,
    pub kind: AggregateKind,
    /// Sequence of the last applied event
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub state: EntityState,
}

impl Aggregate {
    /// Start an aggregate from its creation event
    pub fn create(event: &StoredEvent) -> Option<Self> {
        let state = EntityState::from_created(&event.data)?;
        Some(Self {
            id: event.stream_id.clone(),
            kind: state.kind(),
            version: event.sequence,
            created_at: event.timestamp,
            updated_at: event.timestamp,
            deleted: false,
            state,
        })
    }

    /// Fold a whole stream; `None` when it does not start with a creation
    pub fn from_events(events: &[StoredEvent]) -> Option<Self> {
        let (first, rest) = events.split_first()?;
        Some(rest.iter().fold(Self::create(first)?, Self::apply))
    }

    /// Apply one stored event (infallible)
    pub fn apply(self, event: &StoredEvent) -> Self {
        let deleted = self.deleted || event.data.is_deletion();
        match self.state.apply(&event.data) {
            Ok(state) => Self {
                version: event.sequence,
                updated_at: event.timestamp,
                deleted,
                state,
                ..self
            },
            Err(state) => {
                warn!(
                    aggregate_id = %self.id,
                    event_type = %event.event_type,
                    "Ignoring event of another kind"
                );
                Self { state, ..self }
            }
        }
    }

    /// Terminal lifecycle reached (applications and interfaces only)
    pub fn is_retired(&self) -> bool {
        match &self.state {
            EntityState::Application(s) => s.lifecycle == Lifecycle::Retired,
            EntityState::ApplicationInterface(s) => s.status == Lifecycle::Retired,
            _ => false,
        }
    }

    /// Visible in queries and addressable by commands
    pub fn is_live(&self) -> bool {
        !self.deleted && !self.is_retired()
    }

    /// Parent link of hierarchical kinds
    pub fn parent_id(&self) -> Option<&str> {
        match &self.state {
            EntityState::Organization(s) => s.parent_id.as_deref(),
            EntityState::BusinessCapability(s) => s.parent_id.as_deref(),
            _ => None,
        }
    }

    pub fn display_name(&self) -> String {
        self.attribute("name").unwrap_or_else(|| self.id.clone())
    }

    /// Attribute used by read-model filters
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.clone()),
            "kind" => Some(self.kind.to_string()),
            _ => self.state.attribute(key),
        }
    }
}
