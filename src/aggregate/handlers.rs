// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Functional Command Handlers
//!
//! [`decide`] routes a [`CommandBody`] to the handler of its kind after the
//! checks every kind shares:
//!
//! - a non-create command needs a live aggregate of the same kind
//! - a retired aggregate only accepts `delete`
//!
//! ```text
//! decide(Aggregate?, CommandBody, &HandlerContext) → Result<[DomainEvent], DomainError>
//! ```
//!
//! Handlers are pure: no I/O, no clock, no mutation. Everything they need
//! beyond the aggregate itself comes in through [`HandlerContext`].

use std::collections::HashMap;

use super::commands::CommandBody;
use super::{
    application, application_interface, application_service, business_capability, data_entity,
    integration, organization, relation, server, Aggregate, EntityState,
};
use crate::errors::{DomainError, DomainResult};
use crate::events::DomainEvent;

/// Inputs a handler may need besides the aggregate's own state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerContext {
    /// Id of the addressed aggregate (assigned before `create` runs)
    pub aggregate_id: String,

    /// Parent links of the same kind, for hierarchy validation
    ///
    /// Maps every known live node to its parent. Only loaded for commands
    /// that propose a parent.
    pub parents: HashMap<String, Option<String>>,
}

impl HandlerContext {
    pub fn new(aggregate_id: impl Into<String>) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            parents: HashMap::new(),
        }
    }

    pub fn with_parents(mut self, parents: HashMap<String, Option<String>>) -> Self {
        self.parents = parents;
        self
    }
}

macro_rules! dispatch {
    ($body:expr, $state:expr, $ctx:expr, { $($variant:ident => $module:ident),* $(,)? }) => {
        match $body {
            $(
                CommandBody::$variant(command) => {
                    let state = match $state {
                        Some(EntityState::$variant(state)) => Some(state),
                        _ => None,
                    };
                    $module::decide(state, command, $ctx)
                        .map(|events| events.into_iter().map(DomainEvent::from).collect())
                }
            )*
        }
    };
}

/// Decide the events for a command against the current aggregate
///
/// # Errors
///
/// - `NotFound` for a non-create command on a missing, deleted or
///   other-kind aggregate
/// - `Validation` for a non-delete command on a retired aggregate
/// - whatever the kind's handler rejects
pub fn decide(
    aggregate: Option<&Aggregate>,
    body: &CommandBody,
    ctx: &HandlerContext,
) -> DomainResult<Vec<DomainEvent>> {
    let kind = body.kind();

    let current = if body.is_create() {
        if aggregate.is_some() {
            return Err(DomainError::validation(
                "id",
                format!("{} already exists", ctx.aggregate_id),
            ));
        }
        None
    } else {
        let aggregate = aggregate
            .filter(|a| !a.deleted && a.kind == kind)
            .ok_or_else(|| DomainError::NotFound {
                kind: kind.to_string(),
                id: ctx.aggregate_id.clone(),
            })?;
        if aggregate.is_retired() && !body.is_delete() {
            return Err(DomainError::validation(
                "lifecycle",
                format!("{} is retired and only accepts delete", aggregate.id),
            ));
        }
        Some(&aggregate.state)
    };

    dispatch!(body, current, ctx, {
        Application => application,
        ApplicationService => application_service,
        ApplicationInterface => application_interface,
        BusinessCapability => business_capability,
        DataEntity => data_entity,
        Integration => integration,
        Organization => organization,
        Server => server,
        Relation => relation,
    })
}
