// Copyright (c) 2025 - Cowboy AI, Inc.
//! Relation Constraint Table
//!
//! A relation is valid only when its `(source kind, target kind, relation)`
//! triple appears in [`ALLOWED_RELATIONS`]. Direction matters: the table
//! lists `application -> server` but not `server -> application`.

use super::kind::AggregateKind;
use crate::errors::{DomainError, DomainResult};

use AggregateKind::*;

/// One row of the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRule {
    pub source: AggregateKind,
    pub target: AggregateKind,
    pub relations: &'static [&'static str],
}

const fn rule(
    source: AggregateKind,
    target: AggregateKind,
    relations: &'static [&'static str],
) -> RelationRule {
    RelationRule {
        source,
        target,
        relations,
    }
}

/// The allow-list
pub const ALLOWED_RELATIONS: &[RelationRule] = &[
    rule(Application, Application, &["depends_on", "communicates_with", "calls"]),
    rule(Application, ApplicationService, &["realizes", "uses"]),
    rule(Application, ApplicationInterface, &["exposes"]),
    rule(ApplicationInterface, ApplicationService, &["serves"]),
    rule(Application, Server, &["deployed_on", "stores_data_on"]),
    rule(Server, Server, &["connected_to"]),
    rule(Application, DataEntity, &["reads", "writes"]),
    rule(Application, BusinessCapability, &["supports"]),
    rule(ApplicationService, BusinessCapability, &["realizes", "supports"]),
    rule(Organization, Application, &["owns"]),
    rule(Organization, Server, &["owns"]),
];

/// Whether the typed triple is in the allow-list
pub fn is_allowed(source: AggregateKind, target: AggregateKind, relation: &str) -> bool {
    ALLOWED_RELATIONS
        .iter()
        .any(|r| r.source == source && r.target == target && r.relations.contains(&relation))
}

/// String form used at the command boundary; unknown kinds are never allowed
pub fn is_allowed_str(source: &str, target: &str, relation: &str) -> bool {
    match (source.parse(), target.parse()) {
        (Ok(source), Ok(target)) => is_allowed(source, target, relation),
        _ => false,
    }
}

/// Check a triple, returning the rejected triple on failure
pub fn check(source: &str, target: &str, relation: &str) -> DomainResult<(AggregateKind, AggregateKind)> {
    let invalid = || DomainError::InvalidRelation {
        source_kind: source.to_string(),
        target_kind: target.to_string(),
        relation: relation.to_string(),
    };

    let source_kind: AggregateKind = source.parse().map_err(|_| invalid())?;
    let target_kind: AggregateKind = target.parse().map_err(|_| invalid())?;

    if is_allowed(source_kind, target_kind, relation) {
        Ok((source_kind, target_kind))
    } else {
        Err(invalid())
    }
}

/// Relation names valid between two kinds, for diagnostics
pub fn allowed_between(source: AggregateKind, target: AggregateKind) -> Vec<&'static str> {
    ALLOWED_RELATIONS
        .iter()
        .filter(|r| r.source == source && r.target == target)
        .flat_map(|r| r.relations.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("application", "application", "depends_on")]
    #[test_case("application", "application", "calls")]
    #[test_case("application", "application_service", "realizes")]
    #[test_case("application", "application_interface", "exposes")]
    #[test_case("application_interface", "application_service", "serves")]
    #[test_case("application", "server", "deployed_on")]
    #[test_case("application", "server", "stores_data_on")]
    #[test_case("server", "server", "connected_to")]
    #[test_case("application", "data_entity", "writes")]
    #[test_case("application", "business_capability", "supports")]
    #[test_case("application_service", "business_capability", "realizes")]
    #[test_case("organization", "application", "owns")]
    #[test_case("organization", "server", "owns")]
    fn test_allowed_triples(source: &str, target: &str, relation: &str) {
        assert!(is_allowed_str(source, target, relation));
        assert!(check(source, target, relation).is_ok());
    }

    #[test_case("server", "application", "deployed_on"; "reversed direction")]
    #[test_case("application", "server", "owns"; "wrong relation")]
    #[test_case("data_entity", "application", "reads"; "reads is one way")]
    #[test_case("organization", "data_entity", "owns"; "organization owns data")]
    #[test_case("mainframe", "server", "connected_to"; "unknown source kind")]
    #[test_case("application", "application", "DEPENDS_ON"; "case sensitive")]
    fn test_rejected_triples(source: &str, target: &str, relation: &str) {
        assert!(!is_allowed_str(source, target, relation));
        let err = check(source, target, relation).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidRelation {
                source_kind: source.into(),
                target_kind: target.into(),
                relation: relation.into(),
            }
        );
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_allowed_between() {
        assert_eq!(
            allowed_between(Application, Server),
            vec!["deployed_on", "stores_data_on"]
        );
        assert!(allowed_between(Server, Application).is_empty());
    }
}
