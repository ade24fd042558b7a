// Copyright (c) 2025 - Cowboy AI, Inc.
//! Server Aggregate
//!
//! Hostnames are validated and normalized through [`Hostname`] before any
//! event is emitted.

use serde::{Deserialize, Serialize};

use super::handlers::HandlerContext;
use crate::domain::{validation, Hostname};
use crate::errors::{DomainError, DomainResult};
use crate::events::ServerEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerState {
    pub hostname: Hostname,
    pub environment: Option<String>,
    pub region: Option<String>,
    pub platform: Option<String>,
    pub criticality: Option<String>,
    pub owning_team: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPatch {
    pub hostname: Option<String>,
    pub environment: Option<String>,
    pub region: Option<String>,
    pub platform: Option<String>,
    pub criticality: Option<String>,
    pub owning_team: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum ServerCommand {
    Create {
        hostname: Option<String>,
        environment: Option<String>,
        region: Option<String>,
        platform: Option<String>,
        criticality: Option<String>,
        owning_team: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    Update(ServerPatch),
    Delete {
        reason: Option<String>,
    },
}

impl ServerCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            ServerCommand::Create { .. } => "create",
            ServerCommand::Update(_) => "update",
            ServerCommand::Delete { .. } => "delete",
        }
    }
}

pub fn decide(
    state: Option<&ServerState>,
    command: &ServerCommand,
    _ctx: &HandlerContext,
) -> DomainResult<Vec<ServerEvent>> {
    use ServerCommand::*;

    match (state, command) {
        (
            None,
            Create {
                hostname,
                environment,
                region,
                platform,
                criticality,
                owning_team,
                tags,
            },
        ) => {
            let hostname = hostname
                .as_deref()
                .ok_or_else(|| DomainError::required("hostname"))?;
            Ok(vec![ServerEvent::Created {
                hostname: Hostname::new(hostname)?,
                environment: validation::optional_text("environment", environment.as_deref())?,
                region: validation::optional_text("region", region.as_deref())?,
                platform: validation::optional_text("platform", platform.as_deref())?,
                criticality: validation::optional_text("criticality", criticality.as_deref())?,
                owning_team: validation::optional_text("owning_team", owning_team.as_deref())?,
                tags: validation::tags(tags)?,
            }])
        }

        (Some(_), Update(patch)) => {
            validation::non_empty_patch(*patch == ServerPatch::default())?;
            Ok(vec![ServerEvent::Updated {
                hostname: patch.hostname.as_deref().map(Hostname::new).transpose()?,
                environment: validation::optional_text("environment", patch.environment.as_deref())?,
                region: validation::optional_text("region", patch.region.as_deref())?,
                platform: validation::optional_text("platform", patch.platform.as_deref())?,
                criticality: validation::optional_text("criticality", patch.criticality.as_deref())?,
                owning_team: validation::optional_text("owning_team", patch.owning_team.as_deref())?,
                tags: patch.tags.as_deref().map(validation::tags).transpose()?,
            }])
        }

        (Some(_), Delete { reason }) => Ok(vec![ServerEvent::Deleted {
            reason: reason.clone(),
        }]),

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "server already exists")),
        (None, _) => Err(DomainError::validation("id", "server does not exist")),
    }
}

pub fn from_created(event: &ServerEvent) -> Option<ServerState> {
    match event {
        ServerEvent::Created {
            hostname,
            environment,
            region,
            platform,
            criticality,
            owning_team,
            tags,
        } => Some(ServerState {
            hostname: hostname.clone(),
            environment: environment.clone(),
            region: region.clone(),
            platform: platform.clone(),
            criticality: criticality.clone(),
            owning_team: owning_team.clone(),
            tags: tags.clone(),
        }),
        _ => None,
    }
}

pub fn apply_event(state: ServerState, event: &ServerEvent) -> ServerState {
    match event {
        ServerEvent::Created { .. } => from_created(event).unwrap_or(state),
        ServerEvent::Updated {
            hostname,
            environment,
            region,
            platform,
            criticality,
            owning_team,
            tags,
        } => ServerState {
            hostname: hostname.clone().unwrap_or(state.hostname),
            environment: environment.clone().or(state.environment),
            region: region.clone().or(state.region),
            platform: platform.clone().or(state.platform),
            criticality: criticality.clone().or(state.criticality),
            owning_team: owning_team.clone().or(state.owning_team),
            tags: tags.clone().unwrap_or(state.tags),
        },
        ServerEvent::Deleted { .. } => state,
    }
}

impl ServerState {
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" | "hostname" => Some(self.hostname.to_string()),
            "environment" => self.environment.clone(),
            "region" => self.region.clone(),
            "platform" => self.platform.clone(),
            "criticality" => self.criticality.clone(),
            "owning_team" => self.owning_team.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create(hostname: &str) -> ServerCommand {
        ServerCommand::Create {
            hostname: Some(hostname.into()),
            environment: Some("prod".into()),
            region: None,
            platform: None,
            criticality: None,
            owning_team: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_hostname_is_normalized() {
        let events = decide(None, &create(" Web01.Example.COM "), &HandlerContext::new("srv-1"))
            .unwrap();
        let state = from_created(&events[0]).unwrap();
        assert_eq!(state.hostname.as_str(), "web01.example.com");
        assert_eq!(state.attribute("environment").as_deref(), Some("prod"));
    }

    #[test]
    fn test_invalid_hostname_rejected() {
        let err = decide(None, &create("-bad-.example.com"), &HandlerContext::new("srv-1"))
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }
}
