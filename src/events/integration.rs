// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration aggregate events

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrationEvent {
    Created {
        source_app_id: String,
        target_app_id: String,
        protocol: Option<String>,
        data_contract: Option<String>,
        frequency: Option<String>,
        tags: Vec<String>,
    },

    Updated {
        source_app_id: Option<String>,
        target_app_id: Option<String>,
        protocol: Option<String>,
        data_contract: Option<String>,
        frequency: Option<String>,
        tags: Option<Vec<String>>,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl IntegrationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            IntegrationEvent::Created { .. } => "created",
            IntegrationEvent::Updated { .. } => "updated",
            IntegrationEvent::Deleted { .. } => "deleted",
        }
    }
}
