// Copyright (c) 2025 - Cowboy AI, Inc.
//! Command envelope
//!
//! Commands express intent and can be rejected; events express facts and
//! cannot. The transport decodes a request into a [`Command`]: a target, an
//! optional expected version, a kind-specific body and metadata.
//!
//! # Time Handling
//!
//! The accepting layer stamps `CommandMetadata::timestamp`. Handlers never
//! read the clock, so the same command against the same state always
//! produces the same events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::application::ApplicationCommand;
use super::application_interface::ApplicationInterfaceCommand;
use super::application_service::ApplicationServiceCommand;
use super::business_capability::BusinessCapabilityCommand;
use super::data_entity::DataEntityCommand;
use super::integration::IntegrationCommand;
use super::organization::OrganizationCommand;
use super::relation::RelationCommand;
use super::server::ServerCommand;
use crate::domain::AggregateKind;
use crate::event_store::EventMetadata;
use crate::trace::TraceContext;

/// Which aggregate a command addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandTarget {
    /// A fresh aggregate; the service assigns its id
    New,
    /// An existing aggregate by id
    Existing(String),
}

/// Who, when and under which trace a command was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub command_id: Uuid,
    pub correlation_id: Option<Uuid>,
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub trace: TraceContext,
}

impl CommandMetadata {
    /// Metadata with a fresh command id
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            command_id: Uuid::now_v7(),
            correlation_id: None,
            actor: None,
            timestamp,
            trace: TraceContext::none(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_trace(mut self, trace: TraceContext) -> Self {
        self.trace = trace;
        self
    }

    /// Metadata stamped on every event the command produces
    pub fn event_metadata(&self) -> EventMetadata {
        EventMetadata {
            timestamp: self.timestamp,
            causation_id: self.command_id,
            correlation_id: self.correlation_id,
            actor: self.actor.clone(),
            trace: self.trace.clone(),
        }
    }
}

/// Kind-specific command payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate_type", content = "command", rename_all = "snake_case")]
pub enum CommandBody {
    Application(ApplicationCommand),
    ApplicationService(ApplicationServiceCommand),
    ApplicationInterface(ApplicationInterfaceCommand),
    BusinessCapability(BusinessCapabilityCommand),
    DataEntity(DataEntityCommand),
    Integration(IntegrationCommand),
    Organization(OrganizationCommand),
    Server(ServerCommand),
    Relation(RelationCommand),
}

impl CommandBody {
    pub fn kind(&self) -> AggregateKind {
        match self {
            CommandBody::Application(_) => AggregateKind::Application,
            CommandBody::ApplicationService(_) => AggregateKind::ApplicationService,
            CommandBody::ApplicationInterface(_) => AggregateKind::ApplicationInterface,
            CommandBody::BusinessCapability(_) => AggregateKind::BusinessCapability,
            CommandBody::DataEntity(_) => AggregateKind::DataEntity,
            CommandBody::Integration(_) => AggregateKind::Integration,
            CommandBody::Organization(_) => AggregateKind::Organization,
            CommandBody::Server(_) => AggregateKind::Server,
            CommandBody::Relation(_) => AggregateKind::Relation,
        }
    }

    /// Verb as spelled on the wire (`set-owner`, `transition-lifecycle`, ...)
    pub fn verb(&self) -> &'static str {
        match self {
            CommandBody::Application(c) => c.verb(),
            CommandBody::ApplicationService(c) => c.verb(),
            CommandBody::ApplicationInterface(c) => c.verb(),
            CommandBody::BusinessCapability(c) => c.verb(),
            CommandBody::DataEntity(c) => c.verb(),
            CommandBody::Integration(c) => c.verb(),
            CommandBody::Organization(c) => c.verb(),
            CommandBody::Server(c) => c.verb(),
            CommandBody::Relation(c) => c.verb(),
        }
    }

    pub fn is_create(&self) -> bool {
        self.verb() == "create"
    }

    pub fn is_delete(&self) -> bool {
        self.verb() == "delete"
    }

    /// Non-null parent id proposed by a hierarchical command
    pub fn proposed_parent(&self) -> Option<&str> {
        match self {
            CommandBody::Organization(c) => c.proposed_parent(),
            CommandBody::BusinessCapability(c) => c.proposed_parent(),
            _ => None,
        }
    }
}

/// A command addressed to one aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub target: CommandTarget,
    /// Version the caller last observed; checked before any handler runs
    pub expected_version: Option<u64>,
    pub body: CommandBody,
    pub metadata: CommandMetadata,
}

impl Command {
    /// Command creating a new aggregate
    pub fn create(body: impl Into<CommandBody>, metadata: CommandMetadata) -> Self {
        Self {
            target: CommandTarget::New,
            expected_version: None,
            body: body.into(),
            metadata,
        }
    }

    /// Command addressed to an existing aggregate
    pub fn on(id: impl Into<String>, body: impl Into<CommandBody>, metadata: CommandMetadata) -> Self {
        Self {
            target: CommandTarget::Existing(id.into()),
            expected_version: None,
            body: body.into(),
            metadata,
        }
    }

    pub fn expecting(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

macro_rules! impl_from_command {
    ($($command:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$command> for CommandBody {
                fn from(command: $command) -> Self {
                    CommandBody::$variant(command)
                }
            }
        )*
    };
}

impl_from_command! {
    ApplicationCommand => Application,
    ApplicationServiceCommand => ApplicationService,
    ApplicationInterfaceCommand => ApplicationInterface,
    BusinessCapabilityCommand => BusinessCapability,
    DataEntityCommand => DataEntity,
    IntegrationCommand => Integration,
    OrganizationCommand => Organization,
    ServerCommand => Server,
    RelationCommand => Relation,
}

/// Deserialize a patch field where `null` differs from absent
///
/// Absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
