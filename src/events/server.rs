// Copyright (c) 2025 - Cowboy AI, Inc.
//! Server aggregate events

use serde::{Deserialize, Serialize};

use crate::domain::Hostname;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Created {
        hostname: Hostname,
        environment: Option<String>,
        region: Option<String>,
        platform: Option<String>,
        criticality: Option<String>,
        owning_team: Option<String>,
        tags: Vec<String>,
    },

    Updated {
        hostname: Option<Hostname>,
        environment: Option<String>,
        region: Option<String>,
        platform: Option<String>,
        criticality: Option<String>,
        owning_team: Option<String>,
        tags: Option<Vec<String>>,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Created { .. } => "created",
            ServerEvent::Updated { .. } => "updated",
            ServerEvent::Deleted { .. } => "deleted",
        }
    }
}
