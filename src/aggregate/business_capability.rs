// Copyright (c) 2025 - Cowboy AI, Inc.
//! Business Capability Aggregate
//!
//! Capabilities form a forest. Every command that proposes a parent is
//! checked against the ancestor chain in [`HandlerContext::parents`].

use serde::{Deserialize, Serialize};

use super::commands::nullable;
use super::handlers::HandlerContext;
use crate::domain::{validate_parent, validation};
use crate::errors::{DomainError, DomainResult};
use crate::events::BusinessCapabilityEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCapabilityState {
    pub name: String,
    pub parent_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCapabilityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `null` detaches the capability from its parent
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum BusinessCapabilityCommand {
    Create {
        name: Option<String>,
        parent_id: Option<String>,
        description: Option<String>,
    },
    Update(BusinessCapabilityPatch),
    SetParent {
        parent_id: Option<String>,
    },
    RemoveParent,
    UpdateDescription {
        description: Option<String>,
    },
    Delete {
        reason: Option<String>,
    },
}

impl BusinessCapabilityCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            BusinessCapabilityCommand::Create { .. } => "create",
            BusinessCapabilityCommand::Update(_) => "update",
            BusinessCapabilityCommand::SetParent { .. } => "set-parent",
            BusinessCapabilityCommand::RemoveParent => "remove-parent",
            BusinessCapabilityCommand::UpdateDescription { .. } => "update-description",
            BusinessCapabilityCommand::Delete { .. } => "delete",
        }
    }

    /// Parent id whose ancestor chain the handler needs, trimmed like the
    /// stored reference
    pub fn proposed_parent(&self) -> Option<&str> {
        let parent = match self {
            BusinessCapabilityCommand::Create { parent_id, .. }
            | BusinessCapabilityCommand::SetParent { parent_id } => parent_id.as_deref(),
            BusinessCapabilityCommand::Update(patch) => patch.parent_id.as_ref()?.as_deref(),
            _ => None,
        };
        parent.map(str::trim)
    }
}

pub fn decide(
    state: Option<&BusinessCapabilityState>,
    command: &BusinessCapabilityCommand,
    ctx: &HandlerContext,
) -> DomainResult<Vec<BusinessCapabilityEvent>> {
    use BusinessCapabilityCommand::*;

    match (state, command) {
        (
            None,
            Create {
                name,
                parent_id,
                description,
            },
        ) => Ok(vec![BusinessCapabilityEvent::Created {
            name: validation::require_text("name", name.as_deref())?,
            parent_id: checked_parent(ctx, parent_id.as_deref())?,
            description: description.clone(),
        }]),

        (Some(state), Update(patch)) => {
            validation::non_empty_patch(*patch == BusinessCapabilityPatch::default())?;
            let mut events = Vec::new();
            if let Some(name) = &patch.name {
                let name = validation::text("name", name)?;
                if name != state.name {
                    events.push(BusinessCapabilityEvent::Renamed { name });
                }
            }
            if patch.description.is_some() {
                events.push(BusinessCapabilityEvent::DescriptionUpdated {
                    description: patch.description.clone(),
                });
            }
            if let Some(parent_id) = &patch.parent_id {
                events.push(BusinessCapabilityEvent::ParentSet {
                    parent_id: checked_parent(ctx, parent_id.as_deref())?,
                });
            }
            Ok(events)
        }

        (Some(_), SetParent { parent_id }) => {
            let parent_id = parent_id
                .as_deref()
                .ok_or_else(|| DomainError::required("parent_id"))?;
            Ok(vec![BusinessCapabilityEvent::ParentSet {
                parent_id: checked_parent(ctx, Some(parent_id))?,
            }])
        }

        (Some(state), RemoveParent) => match state.parent_id {
            Some(_) => Ok(vec![BusinessCapabilityEvent::ParentSet { parent_id: None }]),
            None => Err(DomainError::validation("parent_id", "capability has no parent")),
        },

        (Some(_), UpdateDescription { description }) => {
            Ok(vec![BusinessCapabilityEvent::DescriptionUpdated {
                description: description.clone(),
            }])
        }

        (Some(_), Delete { reason }) => Ok(vec![BusinessCapabilityEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "capability already exists")),
        (None, _) => Err(DomainError::validation("id", "capability does not exist")),
    }
}

fn checked_parent(ctx: &HandlerContext, parent_id: Option<&str>) -> DomainResult<Option<String>> {
    let parent_id = parent_id
        .map(|id| validation::reference("parent_id", id))
        .transpose()?;
    validate_parent(&ctx.aggregate_id, parent_id.as_deref(), &ctx.parents)?;
    Ok(parent_id)
}

pub fn from_created(event: &BusinessCapabilityEvent) -> Option<BusinessCapabilityState> {
    match event {
        BusinessCapabilityEvent::Created {
            name,
            parent_id,
            description,
        } => Some(BusinessCapabilityState {
            name: name.clone(),
            parent_id: parent_id.clone(),
            description: description.clone(),
        }),
        _ => None,
    }
}

pub fn apply_event(
    state: BusinessCapabilityState,
    event: &BusinessCapabilityEvent,
) -> BusinessCapabilityState {
    match event {
        BusinessCapabilityEvent::Created { .. } => from_created(event).unwrap_or(state),
        BusinessCapabilityEvent::Renamed { name } => BusinessCapabilityState {
            name: name.clone(),
            ..state
        },
        BusinessCapabilityEvent::ParentSet { parent_id } => BusinessCapabilityState {
            parent_id: parent_id.clone(),
            ..state
        },
        BusinessCapabilityEvent::DescriptionUpdated { description } => BusinessCapabilityState {
            description: description.clone(),
            ..state
        },
        BusinessCapabilityEvent::Deleted { .. } => state,
    }
}

impl BusinessCapabilityState {
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "parent_id" => self.parent_id.clone(),
            _ => None,
        }
    }
}
