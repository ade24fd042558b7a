// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Event Envelope
//!
//! Polymorphic envelope over every aggregate kind's events. Consumers such
//! as projections can handle any event while each variant stays strongly
//! typed.

use serde::{Deserialize, Serialize};

use super::application::ApplicationEvent;
use super::application_interface::ApplicationInterfaceEvent;
use super::application_service::ApplicationServiceEvent;
use super::business_capability::BusinessCapabilityEvent;
use super::data_entity::DataEntityEvent;
use super::integration::IntegrationEvent;
use super::organization::OrganizationEvent;
use super::relation::RelationEvent;
use super::server::ServerEvent;
use crate::domain::AggregateKind;

/// Events from every aggregate kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate_type", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Application(ApplicationEvent),
    ApplicationService(ApplicationServiceEvent),
    ApplicationInterface(ApplicationInterfaceEvent),
    BusinessCapability(BusinessCapabilityEvent),
    DataEntity(DataEntityEvent),
    Integration(IntegrationEvent),
    Organization(OrganizationEvent),
    Server(ServerEvent),
    Relation(RelationEvent),
}

impl DomainEvent {
    /// Kind of the aggregate that emitted the event
    pub fn kind(&self) -> AggregateKind {
        match self {
            DomainEvent::Application(_) => AggregateKind::Application,
            DomainEvent::ApplicationService(_) => AggregateKind::ApplicationService,
            DomainEvent::ApplicationInterface(_) => AggregateKind::ApplicationInterface,
            DomainEvent::BusinessCapability(_) => AggregateKind::BusinessCapability,
            DomainEvent::DataEntity(_) => AggregateKind::DataEntity,
            DomainEvent::Integration(_) => AggregateKind::Integration,
            DomainEvent::Organization(_) => AggregateKind::Organization,
            DomainEvent::Server(_) => AggregateKind::Server,
            DomainEvent::Relation(_) => AggregateKind::Relation,
        }
    }

    /// Event name within its kind (`created`, `owner_set`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::Application(e) => e.name(),
            DomainEvent::ApplicationService(e) => e.name(),
            DomainEvent::ApplicationInterface(e) => e.name(),
            DomainEvent::BusinessCapability(e) => e.name(),
            DomainEvent::DataEntity(e) => e.name(),
            DomainEvent::Integration(e) => e.name(),
            DomainEvent::Organization(e) => e.name(),
            DomainEvent::Server(e) => e.name(),
            DomainEvent::Relation(e) => e.name(),
        }
    }

    /// Qualified type name stored with the event (`application.created`)
    pub fn event_type(&self) -> String {
        format!("{}.{}", self.kind(), self.name())
    }

    /// First event of a stream
    pub fn is_creation(&self) -> bool {
        self.name() == "created"
    }

    /// Terminal event of a stream
    pub fn is_deletion(&self) -> bool {
        self.name() == "deleted"
    }
}

macro_rules! impl_from_event {
    ($($event:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$event> for DomainEvent {
                fn from(event: $event) -> Self {
                    DomainEvent::$variant(event)
                }
            }
        )*
    };
}

impl_from_event! {
    ApplicationEvent => Application,
    ApplicationServiceEvent => ApplicationService,
    ApplicationInterfaceEvent => ApplicationInterface,
    BusinessCapabilityEvent => BusinessCapability,
    DataEntityEvent => DataEntity,
    IntegrationEvent => Integration,
    OrganizationEvent => Organization,
    ServerEvent => Server,
    RelationEvent => Relation,
}
