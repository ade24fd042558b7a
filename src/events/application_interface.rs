// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Interface aggregate events

use serde::{Deserialize, Serialize};

use crate::state_machine::Lifecycle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApplicationInterfaceEvent {
    Created {
        name: String,
        protocol: Option<String>,
        endpoint: Option<String>,
        version: Option<String>,
        exposed_by_app_id: Option<String>,
        serves_service_ids: Vec<String>,
        status: Lifecycle,
        tags: Vec<String>,
    },

    Updated {
        name: Option<String>,
        protocol: Option<String>,
        endpoint: Option<String>,
        version: Option<String>,
        exposed_by_app_id: Option<String>,
        tags: Option<Vec<String>>,
    },

    ServicesSet {
        service_ids: Vec<String>,
    },

    /// Status moved along the lifecycle table (`deprecate`, `retire`)
    StatusChanged {
        from: Lifecycle,
        to: Lifecycle,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl ApplicationInterfaceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ApplicationInterfaceEvent::Created { .. } => "created",
            ApplicationInterfaceEvent::Updated { .. } => "updated",
            ApplicationInterfaceEvent::ServicesSet { .. } => "services_set",
            ApplicationInterfaceEvent::StatusChanged { .. } => "status_changed",
            ApplicationInterfaceEvent::Deleted { .. } => "deleted",
        }
    }
}
