// Copyright (c) 2025 - Cowboy AI, Inc.
//! Organization aggregate events

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrganizationEvent {
    Created {
        name: String,
        parent_id: Option<String>,
        domains: Vec<String>,
        contacts: Vec<String>,
    },

    Updated {
        name: Option<String>,
        domains: Option<Vec<String>>,
        contacts: Option<Vec<String>>,
    },

    /// `None` detaches the organization to the root
    ParentSet {
        parent_id: Option<String>,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl OrganizationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OrganizationEvent::Created { .. } => "created",
            OrganizationEvent::Updated { .. } => "updated",
            OrganizationEvent::ParentSet { .. } => "parent_set",
            OrganizationEvent::Deleted { .. } => "deleted",
        }
    }
}
