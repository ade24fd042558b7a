// Copyright (c) 2025 - Cowboy AI, Inc.
//! Relation aggregate events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::AggregateKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationEvent {
    /// Only emitted for triples present in the allow-list
    Created {
        source_id: String,
        source_type: AggregateKind,
        target_id: String,
        target_type: AggregateKind,
        relation_type: String,
        description: Option<String>,
        confidence: Option<f64>,
        effective_from: Option<NaiveDate>,
        effective_to: Option<NaiveDate>,
    },

    ConfidenceUpdated {
        confidence: f64,
    },

    EffectiveDatesSet {
        effective_from: Option<NaiveDate>,
        effective_to: Option<NaiveDate>,
    },

    DescriptionUpdated {
        description: Option<String>,
    },

    Deleted {
        reason: Option<String>,
    },
}

impl RelationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RelationEvent::Created { .. } => "created",
            RelationEvent::ConfidenceUpdated { .. } => "confidence_updated",
            RelationEvent::EffectiveDatesSet { .. } => "effective_dates_set",
            RelationEvent::DescriptionUpdated { .. } => "description_updated",
            RelationEvent::Deleted { .. } => "deleted",
        }
    }
}
