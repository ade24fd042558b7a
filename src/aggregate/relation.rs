// Copyright (c) 2025 - Cowboy AI, Inc.
//! Relation Aggregate
//!
//! A typed edge between two aggregates. The `(source_type, target_type,
//! relation_type)` triple is checked against
//! [`relation_rules::ALLOWED_RELATIONS`](crate::domain::relation_rules::ALLOWED_RELATIONS)
//! on create and fixed afterwards; only the edge attributes change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::handlers::HandlerContext;
use crate::domain::{relation_rules, validation, AggregateKind};
use crate::errors::{DomainError, DomainResult};
use crate::events::RelationEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationState {
    pub source_id: String,
    pub source_type: AggregateKind,
    pub target_id: String,
    pub target_type: AggregateKind,
    pub relation_type: String,
    pub description: Option<String>,
    pub confidence: Option<f64>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum RelationCommand {
    Create {
        source_id: Option<String>,
        source_type: Option<String>,
        target_id: Option<String>,
        target_type: Option<String>,
        relation_type: Option<String>,
        description: Option<String>,
        confidence: Option<f64>,
        effective_from: Option<NaiveDate>,
        effective_to: Option<NaiveDate>,
    },
    UpdateConfidence {
        confidence: Option<f64>,
    },
    SetEffectiveDates {
        effective_from: Option<NaiveDate>,
        effective_to: Option<NaiveDate>,
    },
    UpdateDescription {
        description: Option<String>,
    },
    Delete {
        reason: Option<String>,
    },
}

impl RelationCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            RelationCommand::Create { .. } => "create",
            RelationCommand::UpdateConfidence { .. } => "update-confidence",
            RelationCommand::SetEffectiveDates { .. } => "set-effective-dates",
            RelationCommand::UpdateDescription { .. } => "update-description",
            RelationCommand::Delete { .. } => "delete",
        }
    }
}

fn required<'a>(field: &str, value: &'a Option<String>) -> DomainResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::required(field))
}

pub fn decide(
    state: Option<&RelationState>,
    command: &RelationCommand,
    _ctx: &HandlerContext,
) -> DomainResult<Vec<RelationEvent>> {
    use RelationCommand::*;

    match (state, command) {
        (
            None,
            Create {
                source_id,
                source_type,
                target_id,
                target_type,
                relation_type,
                description,
                confidence,
                effective_from,
                effective_to,
            },
        ) => {
            let source_id = validation::reference("source_id", required("source_id", source_id)?)?;
            let target_id = validation::reference("target_id", required("target_id", target_id)?)?;
            let relation_type = required("relation_type", relation_type)?;
            let (source_type, target_type) = relation_rules::check(
                required("source_type", source_type)?,
                required("target_type", target_type)?,
                relation_type,
            )?;
            let (effective_from, effective_to) =
                validation::effective_window(*effective_from, *effective_to)?;

            Ok(vec![RelationEvent::Created {
                source_id,
                source_type,
                target_id,
                target_type,
                relation_type: relation_type.to_string(),
                description: description.clone(),
                confidence: confidence.map(validation::confidence).transpose()?,
                effective_from,
                effective_to,
            }])
        }

        (Some(_), UpdateConfidence { confidence }) => {
            let confidence = confidence.ok_or_else(|| DomainError::required("confidence"))?;
            Ok(vec![RelationEvent::ConfidenceUpdated {
                confidence: validation::confidence(confidence)?,
            }])
        }

        (
            Some(_),
            SetEffectiveDates {
                effective_from,
                effective_to,
            },
        ) => {
            let (effective_from, effective_to) =
                validation::effective_window(*effective_from, *effective_to)?;
            Ok(vec![RelationEvent::EffectiveDatesSet {
                effective_from,
                effective_to,
            }])
        }

        (Some(_), UpdateDescription { description }) => Ok(vec![RelationEvent::DescriptionUpdated {
            description: description.clone(),
        }]),

        (Some(_), Delete { reason }) => Ok(vec![RelationEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "relation already exists")),
        (None, _) => Err(DomainError::validation("id", "relation does not exist")),
    }
}

pub fn from_created(event: &RelationEvent) -> Option<RelationState> {
    match event {
        RelationEvent::Created {
            source_id,
            source_type,
            target_id,
            target_type,
            relation_type,
            description,
            confidence,
            effective_from,
            effective_to,
        } => Some(RelationState {
            source_id: source_id.clone(),
            source_type: *source_type,
            target_id: target_id.clone(),
            target_type: *target_type,
            relation_type: relation_type.clone(),
            description: description.clone(),
            confidence: *confidence,
            effective_from: *effective_from,
            effective_to: *effective_to,
        }),
        _ => None,
    }
}

pub fn apply_event(state: RelationState, event: &RelationEvent) -> RelationState {
    match event {
        RelationEvent::Created { .. } => from_created(event).unwrap_or(state),
        RelationEvent::ConfidenceUpdated { confidence } => RelationState {
            confidence: Some(*confidence),
            ..state
        },
        RelationEvent::EffectiveDatesSet {
            effective_from,
            effective_to,
        } => RelationState {
            effective_from: *effective_from,
            effective_to: *effective_to,
            ..state
        },
        RelationEvent::DescriptionUpdated { description } => RelationState {
            description: description.clone(),
            ..state
        },
        RelationEvent::Deleted { .. } => state,
    }
}

impl RelationState {
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.source_id, self.relation_type, self.target_id)
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.display_name()),
            "source_id" => Some(self.source_id.clone()),
            "target_id" => Some(self.target_id.clone()),
            "source_type" => Some(self.source_type.to_string()),
            "target_type" => Some(self.target_type.to_string()),
            "relation_type" => Some(self.relation_type.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn create(source_type: &str, target_type: &str, relation_type: &str) -> RelationCommand {
        RelationCommand::Create {
            source_id: Some("src-1".into()),
            source_type: Some(source_type.into()),
            target_id: Some("tgt-1".into()),
            target_type: Some(target_type.into()),
            relation_type: Some(relation_type.into()),
            description: None,
            confidence: Some(0.8),
            effective_from: None,
            effective_to: None,
        }
    }

    fn ctx() -> HandlerContext {
        HandlerContext::new("rel-1")
    }

    #[test_case("application", "server", "deployed_on", true)]
    #[test_case("organization", "application", "owns", true)]
    #[test_case("application_service", "business_capability", "realizes", true)]
    #[test_case("server", "application", "deployed_on", false)]
    #[test_case("application", "server", "owns", false)]
    #[test_case("widget", "server", "owns", false)]
    fn test_create_checks_allow_list(source: &str, target: &str, relation: &str, ok: bool) {
        let result = decide(None, &create(source, target, relation), &ctx());
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(
                err,
                DomainError::InvalidRelation {
                    source_kind: source.into(),
                    target_kind: target.into(),
                    relation: relation.into()
                }
            );
            assert_eq!(err.code(), "validation_error");
        }
    }

    #[test]
    fn test_confidence_must_be_in_range() {
        let state = from_created(
            &decide(None, &create("application", "server", "deployed_on"), &ctx()).unwrap()[0],
        )
        .unwrap();

        for bad in [-0.1, 1.5, f64::NAN] {
            let err = decide(
                Some(&state),
                &RelationCommand::UpdateConfidence {
                    confidence: Some(bad),
                },
                &ctx(),
            )
            .unwrap_err();
            assert_eq!(err.code(), "validation_error");
        }

        let events = decide(
            Some(&state),
            &RelationCommand::UpdateConfidence {
                confidence: Some(1.0),
            },
            &ctx(),
        )
        .unwrap();
        assert_eq!(apply_event(state, &events[0]).confidence, Some(1.0));
    }

    #[test]
    fn test_effective_dates_ordered() {
        let state = from_created(
            &decide(None, &create("application", "server", "deployed_on"), &ctx()).unwrap()[0],
        )
        .unwrap();
        let err = decide(
            Some(&state),
            &RelationCommand::SetEffectiveDates {
                effective_from: NaiveDate::from_ymd_opt(2026, 6, 1),
                effective_to: NaiveDate::from_ymd_opt(2026, 1, 1),
            },
            &ctx(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_missing_relation_type_is_required() {
        let mut command = create("application", "server", "deployed_on");
        if let RelationCommand::Create { relation_type, .. } = &mut command {
            *relation_type = None;
        }
        assert_eq!(
            decide(None, &command, &ctx()).unwrap_err(),
            DomainError::required("relation_type")
        );
    }
}
