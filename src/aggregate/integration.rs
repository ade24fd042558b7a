// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration Aggregate
//!
//! A directed data flow between two applications.

use serde::{Deserialize, Serialize};

use super::handlers::HandlerContext;
use crate::domain::validation;
use crate::errors::{DomainError, DomainResult};
use crate::events::IntegrationEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationState {
    pub source_app_id: String,
    pub target_app_id: String,
    pub protocol: Option<String>,
    pub data_contract: Option<String>,
    pub frequency: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationPatch {
    pub source_app_id: Option<String>,
    pub target_app_id: Option<String>,
    pub protocol: Option<String>,
    pub data_contract: Option<String>,
    pub frequency: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum IntegrationCommand {
    Create {
        source_app_id: Option<String>,
        target_app_id: Option<String>,
        protocol: Option<String>,
        data_contract: Option<String>,
        frequency: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    Update(IntegrationPatch),
    Delete {
        reason: Option<String>,
    },
}

impl IntegrationCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            IntegrationCommand::Create { .. } => "create",
            IntegrationCommand::Update(_) => "update",
            IntegrationCommand::Delete { .. } => "delete",
        }
    }
}

fn app_reference(field: &str, value: Option<&str>) -> DomainResult<String> {
    validation::reference(field, value.ok_or_else(|| DomainError::required(field))?)
}

fn optional_reference(field: &str, value: Option<&str>) -> DomainResult<Option<String>> {
    value.map(|v| validation::reference(field, v)).transpose()
}

pub fn decide(
    state: Option<&IntegrationState>,
    command: &IntegrationCommand,
    _ctx: &HandlerContext,
) -> DomainResult<Vec<IntegrationEvent>> {
    use IntegrationCommand::*;

    match (state, command) {
        (
            None,
            Create {
                source_app_id,
                target_app_id,
                protocol,
                data_contract,
                frequency,
                tags,
            },
        ) => Ok(vec![IntegrationEvent::Created {
            source_app_id: app_reference("source_app_id", source_app_id.as_deref())?,
            target_app_id: app_reference("target_app_id", target_app_id.as_deref())?,
            protocol: validation::optional_text("protocol", protocol.as_deref())?,
            data_contract: validation::optional_text("data_contract", data_contract.as_deref())?,
            frequency: validation::optional_text("frequency", frequency.as_deref())?,
            tags: validation::tags(tags)?,
        }]),

        (Some(_), Update(patch)) => {
            validation::non_empty_patch(*patch == IntegrationPatch::default())?;
            Ok(vec![IntegrationEvent::Updated {
                source_app_id: optional_reference("source_app_id", patch.source_app_id.as_deref())?,
                target_app_id: optional_reference("target_app_id", patch.target_app_id.as_deref())?,
                protocol: validation::optional_text("protocol", patch.protocol.as_deref())?,
                data_contract: validation::optional_text(
                    "data_contract",
                    patch.data_contract.as_deref(),
                )?,
                frequency: validation::optional_text("frequency", patch.frequency.as_deref())?,
                tags: patch.tags.as_deref().map(validation::tags).transpose()?,
            }])
        }

        (Some(_), Delete { reason }) => Ok(vec![IntegrationEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "integration already exists")),
        (None, _) => Err(DomainError::validation("id", "integration does not exist")),
    }
}

pub fn from_created(event: &IntegrationEvent) -> Option<IntegrationState> {
    match event {
        IntegrationEvent::Created {
            source_app_id,
            target_app_id,
            protocol,
            data_contract,
            frequency,
            tags,
        } => Some(IntegrationState {
            source_app_id: source_app_id.clone(),
            target_app_id: target_app_id.clone(),
            protocol: protocol.clone(),
            data_contract: data_contract.clone(),
            frequency: frequency.clone(),
            tags: tags.clone(),
        }),
        _ => None,
    }
}

pub fn apply_event(state: IntegrationState, event: &IntegrationEvent) -> IntegrationState {
    match event {
        IntegrationEvent::Created { .. } => from_created(event).unwrap_or(state),
        IntegrationEvent::Updated {
            source_app_id,
            target_app_id,
            protocol,
            data_contract,
            frequency,
            tags,
        } => IntegrationState {
            source_app_id: source_app_id.clone().unwrap_or(state.source_app_id),
            target_app_id: target_app_id.clone().unwrap_or(state.target_app_id),
            protocol: protocol.clone().or(state.protocol),
            data_contract: data_contract.clone().or(state.data_contract),
            frequency: frequency.clone().or(state.frequency),
            tags: tags.clone().unwrap_or(state.tags),
        },
        IntegrationEvent::Deleted { .. } => state,
    }
}

impl IntegrationState {
    /// Integrations have no name; they display as `source -> target`
    pub fn display_name(&self) -> String {
        format!("{} -> {}", self.source_app_id, self.target_app_id)
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.display_name()),
            "source_app_id" => Some(self.source_app_id.clone()),
            "target_app_id" => Some(self.target_app_id.clone()),
            "protocol" => self.protocol.clone(),
            "frequency" => self.frequency.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, Some("app-2"), "source_app_id")]
    #[test_case(Some("app-1"), None, "target_app_id")]
    fn test_create_requires_both_endpoints(source: Option<&str>, target: Option<&str>, field: &str) {
        let err = decide(
            None,
            &IntegrationCommand::Create {
                source_app_id: source.map(str::to_string),
                target_app_id: target.map(str::to_string),
                protocol: None,
                data_contract: None,
                frequency: None,
                tags: vec![],
            },
            &HandlerContext::new("int-1"),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::required(field));
    }

    #[test]
    fn test_update_keeps_untouched_fields() {
        let state = IntegrationState {
            source_app_id: "app-1".into(),
            target_app_id: "app-2".into(),
            protocol: Some("kafka".into()),
            data_contract: None,
            frequency: None,
            tags: vec![],
        };
        let patch = IntegrationPatch {
            frequency: Some("hourly".into()),
            ..Default::default()
        };
        let events = decide(
            Some(&state),
            &IntegrationCommand::Update(patch),
            &HandlerContext::new("int-1"),
        )
        .unwrap();
        let next = apply_event(state, &events[0]);
        assert_eq!(next.protocol.as_deref(), Some("kafka"));
        assert_eq!(next.frequency.as_deref(), Some("hourly"));
        assert_eq!(next.display_name(), "app-1 -> app-2");
    }
}
