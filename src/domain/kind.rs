// Copyright (c) 2025 - Cowboy AI, Inc.
//! Aggregate kind discriminator
//!
//! Every stream belongs to exactly one kind. The kind also fixes the id
//! prefix handed out for new aggregates and the per-kind creation counter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Kind tag of an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Application,
    ApplicationService,
    ApplicationInterface,
    BusinessCapability,
    DataEntity,
    Integration,
    Organization,
    Server,
    Relation,
}

impl AggregateKind {
    /// Every kind, in declaration order
    pub const ALL: [AggregateKind; 9] = [
        AggregateKind::Application,
        AggregateKind::ApplicationService,
        AggregateKind::ApplicationInterface,
        AggregateKind::BusinessCapability,
        AggregateKind::DataEntity,
        AggregateKind::Integration,
        AggregateKind::Organization,
        AggregateKind::Server,
        AggregateKind::Relation,
    ];

    /// Wire name (`application_service`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Application => "application",
            AggregateKind::ApplicationService => "application_service",
            AggregateKind::ApplicationInterface => "application_interface",
            AggregateKind::BusinessCapability => "business_capability",
            AggregateKind::DataEntity => "data_entity",
            AggregateKind::Integration => "integration",
            AggregateKind::Organization => "organization",
            AggregateKind::Server => "server",
            AggregateKind::Relation => "relation",
        }
    }

    /// Prefix of generated aggregate ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            AggregateKind::Application => "app",
            AggregateKind::ApplicationService => "svc",
            AggregateKind::ApplicationInterface => "intf",
            AggregateKind::BusinessCapability => "cap",
            AggregateKind::DataEntity => "data",
            AggregateKind::Integration => "int",
            AggregateKind::Organization => "org",
            AggregateKind::Server => "srv",
            AggregateKind::Relation => "rel",
        }
    }

    /// Plural collection name, used for metric names
    pub fn collection(&self) -> &'static str {
        match self {
            AggregateKind::Application => "applications",
            AggregateKind::ApplicationService => "application_services",
            AggregateKind::ApplicationInterface => "application_interfaces",
            AggregateKind::BusinessCapability => "capabilities",
            AggregateKind::DataEntity => "data_entities",
            AggregateKind::Integration => "integrations",
            AggregateKind::Organization => "organizations",
            AggregateKind::Server => "servers",
            AggregateKind::Relation => "relations",
        }
    }

    /// Generate a fresh aggregate id (`app-<uuid v7>`)
    pub fn new_id(&self) -> String {
        format!("{}-{}", self.id_prefix(), Uuid::now_v7())
    }

    /// Whether this kind keeps a parent reference checked for cycles
    pub fn is_hierarchical(&self) -> bool {
        matches!(
            self,
            AggregateKind::Organization | AggregateKind::BusinessCapability
        )
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregateKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::validation("kind", format!("unknown kind '{s}'")))
    }
}
