// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Aggregate
//!
//! The only audited kind: deletion needs an approval id and a reason.
//! Lifecycle changes always pass through the [`Lifecycle`] state machine,
//! including lifecycle values arriving inside a generic `update`.
//!
//! ```text
//! decide(State?, Command) → Result<[ApplicationEvent], DomainError>
//! apply_event(State, &ApplicationEvent) → State
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::handlers::HandlerContext;
use crate::domain::validation;
use crate::domain::Classification;
use crate::errors::{DomainError, DomainResult};
use crate::events::ApplicationEvent;
use crate::state_machine::{Lifecycle, StateMachine};

/// Immutable Application state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationState {
    pub name: String,
    pub lifecycle: Lifecycle,
    pub owner: Option<String>,
    pub classification: Option<Classification>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub sunset_date: Option<NaiveDate>,
}

/// Partial update; absent fields stay unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPatch {
    pub name: Option<String>,
    pub lifecycle: Option<String>,
    pub sunset_date: Option<NaiveDate>,
    pub owner: Option<String>,
    pub classification: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ApplicationPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.lifecycle.is_none()
            && self.sunset_date.is_none()
            && self.owner.is_none()
            && self.classification.is_none()
            && self.description.is_none()
            && self.tags.is_none()
    }
}

/// Application commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "kebab-case")]
pub enum ApplicationCommand {
    Create {
        name: Option<String>,
        lifecycle: Option<String>,
        owner: Option<String>,
        classification: Option<String>,
        description: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    Update(ApplicationPatch),
    SetOwner {
        owner: Option<String>,
        reason: Option<String>,
    },
    SetClassification {
        classification: Option<String>,
        reason: Option<String>,
    },
    TransitionLifecycle {
        target_lifecycle: Option<String>,
        sunset_date: Option<NaiveDate>,
    },
    Delete {
        approval_id: Option<String>,
        reason: Option<String>,
    },
}

impl ApplicationCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            ApplicationCommand::Create { .. } => "create",
            ApplicationCommand::Update(_) => "update",
            ApplicationCommand::SetOwner { .. } => "set-owner",
            ApplicationCommand::SetClassification { .. } => "set-classification",
            ApplicationCommand::TransitionLifecycle { .. } => "transition-lifecycle",
            ApplicationCommand::Delete { .. } => "delete",
        }
    }
}

/// Handle an Application command (pure)
pub fn decide(
    state: Option<&ApplicationState>,
    command: &ApplicationCommand,
    _ctx: &HandlerContext,
) -> DomainResult<Vec<ApplicationEvent>> {
    use ApplicationCommand::*;

    match (state, command) {
        (
            None,
            Create {
                name,
                lifecycle,
                owner,
                classification,
                description,
                tags,
            },
        ) => {
            let name = validation::require_text("name", name.as_deref())?;
            let lifecycle = match lifecycle {
                Some(value) => value.parse::<Lifecycle>()?,
                None => Lifecycle::default(),
            };
            let owner = validation::optional_text("owner", owner.as_deref())?;
            let classification = classification
                .as_deref()
                .map(str::parse::<Classification>)
                .transpose()?;
            let tags = validation::tags(tags)?;

            Ok(vec![ApplicationEvent::Created {
                name,
                lifecycle,
                owner,
                classification,
                description: description.clone(),
                tags,
            }])
        }

        (Some(state), Update(patch)) => handle_update(state, patch),

        (Some(_), SetOwner { owner, reason }) => Ok(vec![ApplicationEvent::OwnerSet {
            owner: validation::require_text("owner", owner.as_deref())?,
            reason: reason.clone(),
        }]),

        (
            Some(_),
            SetClassification {
                classification,
                reason,
            },
        ) => {
            let classification = classification
                .as_deref()
                .ok_or_else(|| DomainError::required("classification"))?
                .parse::<Classification>()?;
            let reason = validation::require_text("reason", reason.as_deref())?;
            Ok(vec![ApplicationEvent::ClassificationSet {
                classification,
                reason,
            }])
        }

        (
            Some(state),
            TransitionLifecycle {
                target_lifecycle,
                sunset_date,
            },
        ) => {
            let target = target_lifecycle
                .as_deref()
                .ok_or_else(|| DomainError::required("target_lifecycle"))?
                .parse::<Lifecycle>()?;
            Ok(vec![transition(state, target, *sunset_date)?])
        }

        (Some(_), Delete { approval_id, reason }) => {
            let approval_id = present(approval_id);
            let reason = present(reason);
            match (approval_id, reason) {
                (Some(approval_id), Some(reason)) => {
                    Ok(vec![ApplicationEvent::Deleted { approval_id, reason }])
                }
                (approval_id, reason) => {
                    let mut missing = Vec::new();
                    if approval_id.is_none() {
                        missing.push("approval_id".to_string());
                    }
                    if reason.is_none() {
                        missing.push("reason".to_string());
                    }
                    Err(DomainError::MissingApprovalContext { missing })
                }
            }
        }

        (Some(_), Create { .. }) => Err(DomainError::validation("id", "application already exists")),
        (None, _) => Err(DomainError::validation("id", "application does not exist")),
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn transition(
    state: &ApplicationState,
    target: Lifecycle,
    sunset_date: Option<NaiveDate>,
) -> DomainResult<ApplicationEvent> {
    let (to, ()) = state.lifecycle.transition(&target)?;
    if sunset_date.is_some() && to != Lifecycle::Deprecated {
        return Err(DomainError::validation(
            "sunset_date",
            "only allowed when deprecating",
        ));
    }
    Ok(ApplicationEvent::LifecycleTransitioned {
        from: state.lifecycle,
        to,
        sunset_date,
    })
}

fn handle_update(
    state: &ApplicationState,
    patch: &ApplicationPatch,
) -> DomainResult<Vec<ApplicationEvent>> {
    validation::non_empty_patch(patch.is_empty())?;

    if patch.classification.is_some() {
        return Err(DomainError::validation(
            "classification",
            "use set-classification with a reason",
        ));
    }

    let mut events = Vec::new();

    if patch.name.is_some() || patch.description.is_some() || patch.tags.is_some() {
        events.push(ApplicationEvent::Updated {
            name: validation::optional_text("name", patch.name.as_deref())?,
            description: patch.description.clone(),
            tags: patch.tags.as_deref().map(validation::tags).transpose()?,
        });
    }

    if let Some(owner) = &patch.owner {
        events.push(ApplicationEvent::OwnerSet {
            owner: validation::text("owner", owner)?,
            reason: None,
        });
    }

    match (&patch.lifecycle, patch.sunset_date) {
        (Some(lifecycle), sunset_date) => {
            let target = lifecycle.parse::<Lifecycle>()?;
            events.push(transition(state, target, sunset_date)?);
        }
        (None, Some(_)) => {
            return Err(DomainError::validation(
                "sunset_date",
                "only allowed together with a lifecycle change",
            ));
        }
        (None, None) => {}
    }

    Ok(events)
}

/// Initial state from the creation event
pub fn from_created(event: &ApplicationEvent) -> Option<ApplicationState> {
    match event {
        ApplicationEvent::Created {
            name,
            lifecycle,
            owner,
            classification,
            description,
            tags,
        } => Some(ApplicationState {
            name: name.clone(),
            lifecycle: *lifecycle,
            owner: owner.clone(),
            classification: *classification,
            description: description.clone(),
            tags: tags.clone(),
            sunset_date: None,
        }),
        _ => None,
    }
}

/// Apply event to state (pure, never fails)
pub fn apply_event(state: ApplicationState, event: &ApplicationEvent) -> ApplicationState {
    match event {
        ApplicationEvent::Created { .. } => from_created(event).unwrap_or(state),

        ApplicationEvent::Updated {
            name,
            description,
            tags,
        } => ApplicationState {
            name: name.clone().unwrap_or(state.name),
            description: description.clone().or(state.description),
            tags: tags.clone().unwrap_or(state.tags),
            ..state
        },

        ApplicationEvent::OwnerSet { owner, .. } => ApplicationState {
            owner: Some(owner.clone()),
            ..state
        },

        ApplicationEvent::ClassificationSet { classification, .. } => ApplicationState {
            classification: Some(*classification),
            ..state
        },

        ApplicationEvent::LifecycleTransitioned {
            to, sunset_date, ..
        } => ApplicationState {
            lifecycle: *to,
            sunset_date: sunset_date.or(state.sunset_date),
            ..state
        },

        ApplicationEvent::Deleted { .. } => state,
    }
}

impl ApplicationState {
    /// Queryable attribute by name
    pub fn attribute(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "lifecycle" | "status" => Some(self.lifecycle.to_string()),
            "owner" => self.owner.clone(),
            "classification" => self.classification.map(|c| c.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn ctx() -> HandlerContext {
        HandlerContext::new("app-1")
    }

    fn create(name: Option<&str>, lifecycle: Option<&str>) -> ApplicationCommand {
        ApplicationCommand::Create {
            name: name.map(str::to_string),
            lifecycle: lifecycle.map(str::to_string),
            owner: None,
            classification: None,
            description: None,
            tags: vec![],
        }
    }

    fn state(lifecycle: Lifecycle) -> ApplicationState {
        ApplicationState {
            name: "CRM".into(),
            lifecycle,
            owner: None,
            classification: None,
            description: None,
            tags: vec![],
            sunset_date: None,
        }
    }

    fn fold(events: &[ApplicationEvent]) -> ApplicationState {
        let (first, rest) = events.split_first().unwrap();
        rest.iter()
            .fold(from_created(first).unwrap(), apply_event)
    }

    #[test]
    fn test_create_defaults_to_planned() {
        let events = decide(None, &create(Some("CRM"), None), &ctx()).unwrap();
        assert_eq!(fold(&events), state(Lifecycle::Planned));
    }

    #[test]
    fn test_create_requires_name() {
        assert_eq!(
            decide(None, &create(None, None), &ctx()).unwrap_err(),
            DomainError::required("name")
        );
    }

    #[test]
    fn test_create_rejects_unknown_lifecycle() {
        let err = decide(None, &create(Some("CRM"), Some("sunset")), &ctx()).unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test_case(Lifecycle::Planned, "active", true)]
    #[test_case(Lifecycle::Active, "deprecated", true)]
    #[test_case(Lifecycle::Deprecated, "retired", true)]
    #[test_case(Lifecycle::Deprecated, "planned", false)]
    #[test_case(Lifecycle::Planned, "retired", false)]
    #[test_case(Lifecycle::Active, "active", false)]
    fn test_transition_lifecycle(from: Lifecycle, target: &str, ok: bool) {
        let command = ApplicationCommand::TransitionLifecycle {
            target_lifecycle: Some(target.into()),
            sunset_date: None,
        };
        let result = decide(Some(&state(from)), &command, &ctx());
        assert_eq!(result.is_ok(), ok, "{from} -> {target}");
        if let Err(err) = result {
            assert_eq!(err.code(), "invalid_transition");
        }
    }

    #[test]
    fn test_deprecate_with_sunset_date() {
        let sunset = NaiveDate::from_ymd_opt(2027, 1, 31).unwrap();
        let command = ApplicationCommand::TransitionLifecycle {
            target_lifecycle: Some("deprecated".into()),
            sunset_date: Some(sunset),
        };
        let events = decide(Some(&state(Lifecycle::Active)), &command, &ctx()).unwrap();
        let next = apply_event(state(Lifecycle::Active), &events[0]);
        assert_eq!(next.lifecycle, Lifecycle::Deprecated);
        assert_eq!(next.sunset_date, Some(sunset));
    }

    #[test]
    fn test_sunset_date_only_when_deprecating() {
        let command = ApplicationCommand::TransitionLifecycle {
            target_lifecycle: Some("active".into()),
            sunset_date: NaiveDate::from_ymd_opt(2027, 1, 31),
        };
        let err = decide(Some(&state(Lifecycle::Planned)), &command, &ctx()).unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_update_routes_lifecycle_and_owner_to_narrow_events() {
        let patch = ApplicationPatch {
            name: Some("CRM 2".into()),
            lifecycle: Some("active".into()),
            owner: Some("team-sales".into()),
            ..Default::default()
        };
        let events =
            decide(Some(&state(Lifecycle::Planned)), &ApplicationCommand::Update(patch), &ctx())
                .unwrap();
        let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["updated", "owner_set", "lifecycle_transitioned"]);

        let next = events.iter().fold(state(Lifecycle::Planned), apply_event);
        assert_eq!(next.name, "CRM 2");
        assert_eq!(next.owner.as_deref(), Some("team-sales"));
        assert_eq!(next.lifecycle, Lifecycle::Active);
    }

    #[test]
    fn test_update_rejects_invalid_lifecycle_edge() {
        let patch = ApplicationPatch {
            lifecycle: Some("planned".into()),
            ..Default::default()
        };
        let err = decide(
            Some(&state(Lifecycle::Deprecated)),
            &ApplicationCommand::Update(patch),
            &ctx(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: "deprecated".into(),
                to: "planned".into()
            }
        );
    }

    #[test]
    fn test_update_rejects_classification_and_empty_patch() {
        let patch = ApplicationPatch {
            classification: Some("public".into()),
            ..Default::default()
        };
        assert!(decide(Some(&state(Lifecycle::Active)), &ApplicationCommand::Update(patch), &ctx()).is_err());
        assert!(decide(
            Some(&state(Lifecycle::Active)),
            &ApplicationCommand::Update(ApplicationPatch::default()),
            &ctx()
        )
        .is_err());
    }

    #[test]
    fn test_set_classification_requires_reason_and_known_level() {
        let command = |classification: &str, reason: Option<&str>| {
            ApplicationCommand::SetClassification {
                classification: Some(classification.into()),
                reason: reason.map(str::to_string),
            }
        };
        let current = state(Lifecycle::Active);

        assert_eq!(
            decide(Some(&current), &command("internal", None), &ctx()).unwrap_err(),
            DomainError::required("reason")
        );
        assert!(decide(Some(&current), &command("secret", Some("audit")), &ctx()).is_err());

        let events = decide(Some(&current), &command("confidential", Some("audit")), &ctx()).unwrap();
        assert_eq!(
            apply_event(current, &events[0]).classification,
            Some(Classification::Confidential)
        );
    }

    #[test_case(None, None, &["approval_id", "reason"])]
    #[test_case(Some("CHG-1"), None, &["reason"])]
    #[test_case(None, Some("decommissioned"), &["approval_id"])]
    #[test_case(Some("  "), Some("decommissioned"), &["approval_id"])]
    fn test_delete_requires_approval_context(
        approval_id: Option<&str>,
        reason: Option<&str>,
        missing: &[&str],
    ) {
        let command = ApplicationCommand::Delete {
            approval_id: approval_id.map(str::to_string),
            reason: reason.map(str::to_string),
        };
        let err = decide(Some(&state(Lifecycle::Active)), &command, &ctx()).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingApprovalContext {
                missing: missing.iter().map(|m| m.to_string()).collect()
            }
        );
    }

    #[test]
    fn test_delete_with_approval_context() {
        let command = ApplicationCommand::Delete {
            approval_id: Some("CHG-1".into()),
            reason: Some("decommissioned".into()),
        };
        let events = decide(Some(&state(Lifecycle::Active)), &command, &ctx()).unwrap();
        assert_eq!(
            events,
            vec![ApplicationEvent::Deleted {
                approval_id: "CHG-1".into(),
                reason: "decommissioned".into()
            }]
        );
    }
}
