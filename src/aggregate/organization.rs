// Copyright (c) 2025 - Cowboy AI, Inc.
//! Organization Aggregate
//!
//! Organizations nest like capabilities. `remove-parent` and a patch with
//! `"parent_id": null` both detach the node.

use serde::{Deserialize, Serialize};

use super::commands::nullable;
use super::handlers::HandlerContext;
use crate::domain::{validate_parent, validation};
use crate::errors::{DomainError, DomainResult};
use crate::events::OrganizationEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationState {
    pub name: String,
    pub parent_id: Option<String>,
    pub domains: Vec<String>,
    pub contacts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub domains: Option<Vec<String>>,
    pub contacts: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum OrganizationCommand {
    Create {
        name: Option<String>,
        parent_id: Option<String>,
        #[serde(default)]
        domains: Vec<String>,
        #[serde(default)]
        contacts: Vec<String>,
    },
    Update(OrganizationPatch),
    SetParent {
        parent_id: Option<String>,
    },
    RemoveParent,
    Delete {
        reason: Option<String>,
    },
}

impl OrganizationCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            OrganizationCommand::Create { .. } => "create",
            OrganizationCommand::Update(_) => "update",
            OrganizationCommand::SetParent { .. } => "set-parent",
            OrganizationCommand::RemoveParent => "remove-parent",
            OrganizationCommand::Delete { .. } => "delete",
        }
    }

    /// Parent id whose ancestor chain the handler needs, trimmed like the
    /// stored reference
    pub fn proposed_parent(&self) -> Option<&str> {
        let parent = match self {
            OrganizationCommand::Create { parent_id, .. }
            | OrganizationCommand::SetParent { parent_id } => parent_id.as_deref(),
            OrganizationCommand::Update(patch) => patch.parent_id.as_ref()?.as_deref(),
            _ => None,
        };
        parent.map(str::trim)
    }
}

pub fn decide(
    state: Option<&OrganizationState>,
    command: &OrganizationCommand,
    ctx: &HandlerContext,
) -> DomainResult<Vec<OrganizationEvent>> {
    use OrganizationCommand::*;

    match (state, command) {
        (
            None,
            Create {
                name,
                parent_id,
                domains,
                contacts,
            },
        ) => Ok(vec![OrganizationEvent::Created {
            name: validation::require_text("name", name.as_deref())?,
            parent_id: checked_parent(ctx, parent_id.as_deref())?,
            domains: validation::tags(domains)?,
            contacts: validation::tags(contacts)?,
        }]),

        (Some(_), Update(patch)) => {
            validation::non_empty_patch(*patch == OrganizationPatch::default())?;
            let mut events = Vec::new();
            if patch.name.is_some() || patch.domains.is_some() || patch.contacts.is_some() {
                events.push(OrganizationEvent::Updated {
                    name: validation::optional_text("name", patch.name.as_deref())?,
                    domains: patch.domains.as_deref().map(validation::tags).transpose()?,
                    contacts: patch.contacts.as_deref().map(validation::tags).transpose()?,
                });
            }
            if let Some(parent_id) = &patch.parent_id {
                events.push(OrganizationEvent::ParentSet {
                    parent_id: checked_parent(ctx, parent_id.as_deref())?,
                });
            }
            Ok(events)
        }

        (Some(_), SetParent { parent_id }) => {
            let parent_id = parent_id
                .as_deref()
                .ok_or_else(|| DomainError::required("parent_id"))?;
            Ok(vec![OrganizationEvent::ParentSet {
                parent_id: checked_parent(ctx, Some(parent_id))?,
            }])
        }

        (Some(state), RemoveParent) => match state.parent_id {
            Some(_) => Ok(vec![OrganizationEvent::ParentSet { parent_id: None }]),
            None => Err(DomainError::validation("parent_id", "organization has no parent")),
        },

        (Some(_), Delete { reason }) => Ok(vec![OrganizationEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "organization already exists")),
        (None, _) => Err(DomainError::validation("id", "organization does not exist")),
    }
}

fn checked_parent(ctx: &HandlerContext, parent_id: Option<&str>) -> DomainResult<Option<String>> {
    let parent_id = parent_id
        .map(|id| validation::reference("parent_id", id))
        .transpose()?;
    validate_parent(&ctx.aggregate_id, parent_id.as_deref(), &ctx.parents)?;
    Ok(parent_id)
}

pub fn from_created(event: &OrganizationEvent) -> Option<OrganizationState> {
    match event {
        OrganizationEvent::Created {
            name,
            parent_id,
            domains,
            contacts,
        } => Some(OrganizationState {
            name: name.clone(),
            parent_id: parent_id.clone(),
            domains: domains.clone(),
            contacts: contacts.clone(),
        }),
        _ => None,
    }
}

pub fn apply_event(state: OrganizationState, event: &OrganizationEvent) -> OrganizationState {
    match event {
        OrganizationEvent::Created { .. } => from_created(event).unwrap_or(state),
        OrganizationEvent::Updated {
            name,
            domains,
            contacts,
        } => OrganizationState {
            name: name.clone().unwrap_or(state.name),
            domains: domains.clone().unwrap_or(state.domains),
            contacts: contacts.clone().unwrap_or(state.contacts),
            ..state
        },
        OrganizationEvent::ParentSet { parent_id } => OrganizationState {
            parent_id: parent_id.clone(),
            ..state
        },
        OrganizationEvent::Deleted { .. } => state,
    }
}

impl OrganizationState {
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "parent_id" => self.parent_id.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root(name: &str) -> OrganizationState {
        OrganizationState {
            name: name.into(),
            parent_id: None,
            domains: vec![],
            contacts: vec![],
        }
    }

    #[test]
    fn test_self_parent_rejected() {
        let mut ctx = HandlerContext::new("org-a");
        ctx.parents.insert("org-a".into(), None);
        let err = decide(
            Some(&root("A")),
            &OrganizationCommand::SetParent {
                parent_id: Some("org-a".into()),
            },
            &ctx,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::CycleDetected {
                child: "org-a".into(),
                parent: "org-a".into()
            }
        );
    }

    #[test]
    fn test_two_node_cycle_rejected() {
        // org-b already points at org-a
        let mut ctx = HandlerContext::new("org-a");
        ctx.parents.insert("org-a".into(), None);
        ctx.parents.insert("org-b".into(), Some("org-a".into()));
        let err = decide(
            Some(&root("A")),
            &OrganizationCommand::SetParent {
                parent_id: Some("org-b".into()),
            },
            &ctx,
        )
        .unwrap_err();
        assert_eq!(err.code(), "cycle_detected");
    }

    #[test]
    fn test_set_parent_requires_value() {
        let err = decide(
            Some(&root("A")),
            &OrganizationCommand::SetParent { parent_id: None },
            &HandlerContext::new("org-a"),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::required("parent_id"));
    }

    #[test]
    fn test_remove_parent() {
        let state = OrganizationState {
            parent_id: Some("org-root".into()),
            ..root("A")
        };
        let events = decide(
            Some(&state),
            &OrganizationCommand::RemoveParent,
            &HandlerContext::new("org-a"),
        )
        .unwrap();
        assert_eq!(apply_event(state, &events[0]).parent_id, None);
    }

    #[test]
    fn test_update_fields() {
        let patch = OrganizationPatch {
            domains: Some(vec!["example.com".into(), "example.com".into()]),
            ..Default::default()
        };
        let events = decide(
            Some(&root("A")),
            &OrganizationCommand::Update(patch),
            &HandlerContext::new("org-a"),
        )
        .unwrap();
        assert_eq!(
            apply_event(root("A"), &events[0]).domains,
            vec!["example.com".to_string()]
        );
    }
}
