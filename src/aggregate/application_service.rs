// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Service Aggregate

use serde::{Deserialize, Serialize};

use super::handlers::HandlerContext;
use crate::domain::validation;
use crate::errors::{DomainError, DomainResult};
use crate::events::ApplicationServiceEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationServiceState {
    pub name: String,
    pub description: Option<String>,
    pub business_capability_id: Option<String>,
    pub sla: Option<String>,
    pub exposed_by_app_ids: Vec<String>,
    pub consumer_app_ids: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sla: Option<String>,
    pub exposed_by_app_ids: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum ApplicationServiceCommand {
    Create {
        name: Option<String>,
        description: Option<String>,
        business_capability_id: Option<String>,
        sla: Option<String>,
        #[serde(default)]
        exposed_by_app_ids: Vec<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    Update(ApplicationServicePatch),
    /// `null` clears the capability link
    SetBusinessCapability {
        business_capability_id: Option<String>,
    },
    AddConsumer {
        app_id: Option<String>,
    },
    Delete {
        reason: Option<String>,
    },
}

impl ApplicationServiceCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            ApplicationServiceCommand::Create { .. } => "create",
            ApplicationServiceCommand::Update(_) => "update",
            ApplicationServiceCommand::SetBusinessCapability { .. } => "set-business-capability",
            ApplicationServiceCommand::AddConsumer { .. } => "add-consumer",
            ApplicationServiceCommand::Delete { .. } => "delete",
        }
    }
}

pub fn decide(
    state: Option<&ApplicationServiceState>,
    command: &ApplicationServiceCommand,
    _ctx: &HandlerContext,
) -> DomainResult<Vec<ApplicationServiceEvent>> {
    use ApplicationServiceCommand::*;

    match (state, command) {
        (
            None,
            Create {
                name,
                description,
                business_capability_id,
                sla,
                exposed_by_app_ids,
                tags,
            },
        ) => Ok(vec![ApplicationServiceEvent::Created {
            name: validation::require_text("name", name.as_deref())?,
            description: description.clone(),
            business_capability_id: business_capability_id
                .as_deref()
                .map(|id| validation::reference("business_capability_id", id))
                .transpose()?,
            sla: validation::optional_text("sla", sla.as_deref())?,
            exposed_by_app_ids: validation::references("exposed_by_app_ids", exposed_by_app_ids)?,
            tags: validation::tags(tags)?,
        }]),

        (Some(_), Update(patch)) => {
            let ApplicationServicePatch {
                name,
                description,
                sla,
                exposed_by_app_ids,
                tags,
            } = patch;
            validation::non_empty_patch(*patch == ApplicationServicePatch::default())?;
            Ok(vec![ApplicationServiceEvent::Updated {
                name: validation::optional_text("name", name.as_deref())?,
                description: description.clone(),
                sla: validation::optional_text("sla", sla.as_deref())?,
                exposed_by_app_ids: exposed_by_app_ids
                    .as_deref()
                    .map(|ids| validation::references("exposed_by_app_ids", ids))
                    .transpose()?,
                tags: tags.as_deref().map(validation::tags).transpose()?,
            }])
        }

        (
            Some(_),
            SetBusinessCapability {
                business_capability_id,
            },
        ) => Ok(vec![ApplicationServiceEvent::BusinessCapabilitySet {
            business_capability_id: business_capability_id
                .as_deref()
                .map(|id| validation::reference("business_capability_id", id))
                .transpose()?,
        }]),

        (Some(state), AddConsumer { app_id }) => {
            let app_id = validation::reference(
                "app_id",
                app_id.as_deref().ok_or_else(|| DomainError::required("app_id"))?,
            )?;
            if state.consumer_app_ids.contains(&app_id) {
                return Err(DomainError::validation(
                    "app_id",
                    format!("{app_id} already consumes this service"),
                ));
            }
            Ok(vec![ApplicationServiceEvent::ConsumerAdded { app_id }])
        }

        (Some(_), Delete { reason }) => Ok(vec![ApplicationServiceEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "service already exists")),
        (None, _) => Err(DomainError::validation("id", "service does not exist")),
    }
}

pub fn from_created(event: &ApplicationServiceEvent) -> Option<ApplicationServiceState> {
    match event {
        ApplicationServiceEvent::Created {
            name,
            description,
            business_capability_id,
            sla,
            exposed_by_app_ids,
            tags,
        } => Some(ApplicationServiceState {
            name: name.clone(),
            description: description.clone(),
            business_capability_id: business_capability_id.clone(),
            sla: sla.clone(),
            exposed_by_app_ids: exposed_by_app_ids.clone(),
            consumer_app_ids: Vec::new(),
            tags: tags.clone(),
        }),
        _ => None,
    }
}

pub fn apply_event(
    state: ApplicationServiceState,
    event: &ApplicationServiceEvent,
) -> ApplicationServiceState {
    match event {
        ApplicationServiceEvent::Created { .. } => from_created(event).unwrap_or(state),

        ApplicationServiceEvent::Updated {
            name,
            description,
            sla,
            exposed_by_app_ids,
            tags,
        } => ApplicationServiceState {
            name: name.clone().unwrap_or(state.name),
            description: description.clone().or(state.description),
            sla: sla.clone().or(state.sla),
            exposed_by_app_ids: exposed_by_app_ids.clone().unwrap_or(state.exposed_by_app_ids),
            tags: tags.clone().unwrap_or(state.tags),
            ..state
        },

        ApplicationServiceEvent::BusinessCapabilitySet {
            business_capability_id,
        } => ApplicationServiceState {
            business_capability_id: business_capability_id.clone(),
            ..state
        },

        ApplicationServiceEvent::ConsumerAdded { app_id } => {
            let mut consumer_app_ids = state.consumer_app_ids;
            if !consumer_app_ids.contains(app_id) {
                consumer_app_ids.push(app_id.clone());
            }
            ApplicationServiceState {
                consumer_app_ids,
                ..state
            }
        }

        ApplicationServiceEvent::Deleted { .. } => state,
    }
}

impl ApplicationServiceState {
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "business_capability_id" => self.business_capability_id.clone(),
            "sla" => self.sla.clone(),
            _ => None,
        }
    }
}
