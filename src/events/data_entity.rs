// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data Entity aggregate events

use serde::{Deserialize, Serialize};

use crate::domain::Classification;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataEntityEvent {
    Created {
        name: String,
        classification: Option<Classification>,
        domain: Option<String>,
        pii_flag: bool,
        glossary_terms: Vec<String>,
        lineage: Vec<String>,
    },

    Updated {
        name: Option<String>,
        classification: Option<Classification>,
        domain: Option<String>,
        pii_flag: Option<bool>,
        glossary_terms: Option<Vec<String>>,
        lineage: Option<Vec<String>>,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl DataEntityEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DataEntityEvent::Created { .. } => "created",
            DataEntityEvent::Updated { .. } => "updated",
            DataEntityEvent::Deleted { .. } => "deleted",
        }
    }
}
