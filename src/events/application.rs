// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application aggregate events
//!
//! Named commands produce narrow events (`owner_set`, `classification_set`,
//! `lifecycle_transitioned`) so the audit trail records exactly which fact
//! changed and why.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Classification;
use crate::state_machine::Lifecycle;

/// Events of the Application aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApplicationEvent {
    Created {
        name: String,
        lifecycle: Lifecycle,
        owner: Option<String>,
        classification: Option<Classification>,
        description: Option<String>,
        tags: Vec<String>,
    },

    /// Descriptive fields; `None` means unchanged
    Updated {
        name: Option<String>,
        description: Option<String>,
        tags: Option<Vec<String>>,
    },

    OwnerSet {
        owner: String,
        reason: Option<String>,
    },

    ClassificationSet {
        classification: Classification,
        reason: String,
    },

    LifecycleTransitioned {
        from: Lifecycle,
        to: Lifecycle,
        sunset_date: Option<NaiveDate>,
    },

    /// Audited deletion
    Deleted { approval_id: String, reason: String },
}

impl ApplicationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ApplicationEvent::Created { .. } => "created",
            ApplicationEvent::Updated { .. } => "updated",
            ApplicationEvent::OwnerSet { .. } => "owner_set",
            ApplicationEvent::ClassificationSet { .. } => "classification_set",
            ApplicationEvent::LifecycleTransitioned { .. } => "lifecycle_transitioned",
            ApplicationEvent::Deleted { .. } => "deleted",
        }
    }
}
