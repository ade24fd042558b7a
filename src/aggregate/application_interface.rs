// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Interface Aggregate
//!
//! Interfaces carry a status driven by the shared [`Lifecycle`] table.
//! New interfaces start `active`; `deprecate` and `retire` are shorthands
//! for the matching status change.

use serde::{Deserialize, Serialize};

use super::handlers::HandlerContext;
use crate::domain::validation;
use crate::errors::{DomainError, DomainResult};
use crate::events::ApplicationInterfaceEvent;
use crate::state_machine::{Lifecycle, StateMachine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInterfaceState {
    pub name: String,
    pub protocol: Option<String>,
    pub endpoint: Option<String>,
    pub version: Option<String>,
    pub exposed_by_app_id: Option<String>,
    pub serves_service_ids: Vec<String>,
    pub status: Lifecycle,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInterfacePatch {
    pub name: Option<String>,
    pub protocol: Option<String>,
    pub endpoint: Option<String>,
    pub version: Option<String>,
    pub exposed_by_app_id: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum ApplicationInterfaceCommand {
    Create {
        name: Option<String>,
        protocol: Option<String>,
        endpoint: Option<String>,
        version: Option<String>,
        exposed_by_app_id: Option<String>,
        #[serde(default)]
        serves_service_ids: Vec<String>,
        status: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    Update(ApplicationInterfacePatch),
    /// Replaces the full set of served services
    SetService {
        #[serde(default)]
        service_ids: Vec<String>,
    },
    Deprecate,
    Retire,
    Delete {
        reason: Option<String>,
    },
}

impl ApplicationInterfaceCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            ApplicationInterfaceCommand::Create { .. } => "create",
            ApplicationInterfaceCommand::Update(_) => "update",
            ApplicationInterfaceCommand::SetService { .. } => "set-service",
            ApplicationInterfaceCommand::Deprecate => "deprecate",
            ApplicationInterfaceCommand::Retire => "retire",
            ApplicationInterfaceCommand::Delete { .. } => "delete",
        }
    }
}

pub fn decide(
    state: Option<&ApplicationInterfaceState>,
    command: &ApplicationInterfaceCommand,
    _ctx: &HandlerContext,
) -> DomainResult<Vec<ApplicationInterfaceEvent>> {
    use ApplicationInterfaceCommand::*;

    match (state, command) {
        (
            None,
            Create {
                name,
                protocol,
                endpoint,
                version,
                exposed_by_app_id,
                serves_service_ids,
                status,
                tags,
            },
        ) => Ok(vec![ApplicationInterfaceEvent::Created {
            name: validation::require_text("name", name.as_deref())?,
            protocol: validation::optional_text("protocol", protocol.as_deref())?,
            endpoint: validation::optional_text("endpoint", endpoint.as_deref())?,
            version: validation::optional_text("version", version.as_deref())?,
            exposed_by_app_id: exposed_by_app_id
                .as_deref()
                .map(|id| validation::reference("exposed_by_app_id", id))
                .transpose()?,
            serves_service_ids: validation::references("serves_service_ids", serves_service_ids)?,
            status: match status {
                Some(status) => status.parse()?,
                None => Lifecycle::Active,
            },
            tags: validation::tags(tags)?,
        }]),

        (Some(state), Update(patch)) => {
            validation::non_empty_patch(*patch == ApplicationInterfacePatch::default())?;
            let mut events = Vec::new();
            let fields = ApplicationInterfacePatch {
                status: None,
                ..patch.clone()
            };
            if fields != ApplicationInterfacePatch::default() {
                events.push(ApplicationInterfaceEvent::Updated {
                    name: validation::optional_text("name", fields.name.as_deref())?,
                    protocol: validation::optional_text("protocol", fields.protocol.as_deref())?,
                    endpoint: validation::optional_text("endpoint", fields.endpoint.as_deref())?,
                    version: validation::optional_text("version", fields.version.as_deref())?,
                    exposed_by_app_id: fields
                        .exposed_by_app_id
                        .as_deref()
                        .map(|id| validation::reference("exposed_by_app_id", id))
                        .transpose()?,
                    tags: fields.tags.as_deref().map(validation::tags).transpose()?,
                });
            }
            if let Some(status) = &patch.status {
                events.push(change_status(state, status.parse()?)?);
            }
            Ok(events)
        }

        (Some(_), SetService { service_ids }) => Ok(vec![ApplicationInterfaceEvent::ServicesSet {
            service_ids: validation::references("service_ids", service_ids)?,
        }]),

        (Some(state), Deprecate) => Ok(vec![change_status(state, Lifecycle::Deprecated)?]),
        (Some(state), Retire) => Ok(vec![change_status(state, Lifecycle::Retired)?]),

        (Some(_), Delete { reason }) => Ok(vec![ApplicationInterfaceEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "interface already exists")),
        (None, _) => Err(DomainError::validation("id", "interface does not exist")),
    }
}

fn change_status(
    state: &ApplicationInterfaceState,
    target: Lifecycle,
) -> DomainResult<ApplicationInterfaceEvent> {
    let (to, ()) = state.status.transition(&target)?;
    Ok(ApplicationInterfaceEvent::StatusChanged {
        from: state.status,
        to,
    })
}

pub fn from_created(event: &ApplicationInterfaceEvent) -> Option<ApplicationInterfaceState> {
    match event {
        ApplicationInterfaceEvent::Created {
            name,
            protocol,
            endpoint,
            version,
            exposed_by_app_id,
            serves_service_ids,
            status,
            tags,
        } => Some(ApplicationInterfaceState {
            name: name.clone(),
            protocol: protocol.clone(),
            endpoint: endpoint.clone(),
            version: version.clone(),
            exposed_by_app_id: exposed_by_app_id.clone(),
            serves_service_ids: serves_service_ids.clone(),
            status: *status,
            tags: tags.clone(),
        }),
        _ => None,
    }
}

pub fn apply_event(
    state: ApplicationInterfaceState,
    event: &ApplicationInterfaceEvent,
) -> ApplicationInterfaceState {
    match event {
        ApplicationInterfaceEvent::Created { .. } => from_created(event).unwrap_or(state),

        ApplicationInterfaceEvent::Updated {
            name,
            protocol,
            endpoint,
            version,
            exposed_by_app_id,
            tags,
        } => ApplicationInterfaceState {
            name: name.clone().unwrap_or(state.name),
            protocol: protocol.clone().or(state.protocol),
            endpoint: endpoint.clone().or(state.endpoint),
            version: version.clone().or(state.version),
            exposed_by_app_id: exposed_by_app_id.clone().or(state.exposed_by_app_id),
            tags: tags.clone().unwrap_or(state.tags),
            ..state
        },

        ApplicationInterfaceEvent::ServicesSet { service_ids } => ApplicationInterfaceState {
            serves_service_ids: service_ids.clone(),
            ..state
        },

        ApplicationInterfaceEvent::StatusChanged { to, .. } => ApplicationInterfaceState {
            status: *to,
            ..state
        },

        ApplicationInterfaceEvent::Deleted { .. } => state,
    }
}

impl ApplicationInterfaceState {
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "protocol" => self.protocol.clone(),
            "status" | "lifecycle" => Some(self.status.to_string()),
            "exposed_by_app_id" | "application_id" => self.exposed_by_app_id.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> HandlerContext {
        HandlerContext::new("intf-1")
    }

    fn created() -> ApplicationInterfaceState {
        let events = decide(
            None,
            &ApplicationInterfaceCommand::Create {
                name: Some("Orders API".into()),
                protocol: Some("REST".into()),
                endpoint: None,
                version: Some("v1".into()),
                exposed_by_app_id: Some("app-1".into()),
                serves_service_ids: vec![],
                status: None,
                tags: vec![],
            },
            &ctx(),
        )
        .unwrap();
        from_created(&events[0]).unwrap()
    }

    #[test]
    fn test_new_interface_is_active() {
        assert_eq!(created().status, Lifecycle::Active);
    }

    #[test]
    fn test_deprecate_then_retire() {
        let state = created();
        let events = decide(Some(&state), &ApplicationInterfaceCommand::Deprecate, &ctx()).unwrap();
        let state = apply_event(state, &events[0]);
        let events = decide(Some(&state), &ApplicationInterfaceCommand::Retire, &ctx()).unwrap();
        let state = apply_event(state, &events[0]);
        assert_eq!(state.status, Lifecycle::Retired);
    }

    #[test]
    fn test_retire_from_active_is_invalid() {
        let err = decide(Some(&created()), &ApplicationInterfaceCommand::Retire, &ctx()).unwrap_err();
        assert_eq!(err.code(), "invalid_transition");
    }

    #[test]
    fn test_update_status_goes_through_state_machine() {
        let patch = ApplicationInterfacePatch {
            version: Some("v2".into()),
            status: Some("planned".into()),
            ..Default::default()
        };
        let err = decide(Some(&created()), &ApplicationInterfaceCommand::Update(patch), &ctx())
            .unwrap_err();
        assert_eq!(err.code(), "invalid_transition");

        let patch = ApplicationInterfacePatch {
            version: Some("v2".into()),
            status: Some("deprecated".into()),
            ..Default::default()
        };
        let events =
            decide(Some(&created()), &ApplicationInterfaceCommand::Update(patch), &ctx()).unwrap();
        let state = events.iter().fold(created(), apply_event);
        assert_eq!(state.version.as_deref(), Some("v2"));
        assert_eq!(state.status, Lifecycle::Deprecated);
    }

    #[test]
    fn test_set_service_replaces_list() {
        let events = decide(
            Some(&created()),
            &ApplicationInterfaceCommand::SetService {
                service_ids: vec!["svc-1".into(), "svc-2".into()],
            },
            &ctx(),
        )
        .unwrap();
        let state = apply_event(created(), &events[0]);
        assert_eq!(state.serves_service_ids, vec!["svc-1", "svc-2"]);
    }
}
