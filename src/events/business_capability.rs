// Copyright (c) 2025 - Cowboy AI, Inc.
//! Business Capability aggregate events

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusinessCapabilityEvent {
    Created {
        name: String,
        parent_id: Option<String>,
        description: Option<String>,
    },

    Renamed {
        name: String,
    },

    /// `None` detaches the capability to the root
    ParentSet {
        parent_id: Option<String>,
    },

    DescriptionUpdated {
        description: Option<String>,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl BusinessCapabilityEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BusinessCapabilityEvent::Created { .. } => "created",
            BusinessCapabilityEvent::Renamed { .. } => "renamed",
            BusinessCapabilityEvent::ParentSet { .. } => "parent_set",
            BusinessCapabilityEvent::DescriptionUpdated { .. } => "description_updated",
            BusinessCapabilityEvent::Deleted { .. } => "deleted",
        }
    }
}
