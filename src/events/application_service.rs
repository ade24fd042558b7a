// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Service aggregate events

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApplicationServiceEvent {
    Created {
        name: String,
        description: Option<String>,
        business_capability_id: Option<String>,
        sla: Option<String>,
        exposed_by_app_ids: Vec<String>,
        tags: Vec<String>,
    },

    Updated {
        name: Option<String>,
        description: Option<String>,
        sla: Option<String>,
        exposed_by_app_ids: Option<Vec<String>>,
        tags: Option<Vec<String>>,
    },

    BusinessCapabilitySet {
        business_capability_id: Option<String>,
    },

    ConsumerAdded {
        app_id: String,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl ApplicationServiceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ApplicationServiceEvent::Created { .. } => "created",
            ApplicationServiceEvent::Updated { .. } => "updated",
            ApplicationServiceEvent::BusinessCapabilitySet { .. } => "business_capability_set",
            ApplicationServiceEvent::ConsumerAdded { .. } => "consumer_added",
            ApplicationServiceEvent::Deleted { .. } => "deleted",
        }
    }
}
