// Copyright (c) 2025 - Cowboy AI, Inc.
//! Relation allow-list properties

use eatool_core::aggregate::relation::RelationCommand;
use eatool_core::aggregate::{decide, Command, CommandBody, HandlerContext};
use eatool_core::domain::relation_rules::{self, ALLOWED_RELATIONS};
use eatool_core::{AggregateKind, DomainError};
use proptest::prelude::*;

use crate::fixtures::metadata;

const RELATION_NAMES: &[&str] = &[
    "depends_on",
    "communicates_with",
    "calls",
    "realizes",
    "uses",
    "exposes",
    "serves",
    "deployed_on",
    "stores_data_on",
    "connected_to",
    "reads",
    "writes",
    "supports",
    "owns",
    "contains",
];

fn kind() -> impl Strategy<Value = AggregateKind> {
    prop::sample::select(AggregateKind::ALL.to_vec())
}

fn relation_name() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(RELATION_NAMES.to_vec()).prop_map(str::to_string),
        "[a-z_]{1,16}",
    ]
}

fn listed(source: AggregateKind, target: AggregateKind, relation: &str) -> bool {
    ALLOWED_RELATIONS
        .iter()
        .filter(|rule| rule.source == source && rule.target == target)
        .any(|rule| rule.relations.contains(&relation))
}

fn create_body(source: AggregateKind, target: AggregateKind, relation: &str) -> CommandBody {
    let command = Command::create(
        RelationCommand::Create {
            source_id: Some(format!("{}-1", source.id_prefix())),
            source_type: Some(source.to_string()),
            target_id: Some(format!("{}-2", target.id_prefix())),
            target_type: Some(target.to_string()),
            relation_type: Some(relation.to_string()),
            description: None,
            confidence: Some(0.5),
            effective_from: None,
            effective_to: None,
        },
        metadata(),
    );
    command.body
}

proptest! {
    /// A relation create succeeds exactly for listed triples
    #[test]
    fn prop_create_matches_allow_list(
        source in kind(),
        target in kind(),
        relation in relation_name(),
    ) {
        let ctx = HandlerContext::new("rel-under-test");
        let result = decide(None, &create_body(source, target, &relation), &ctx);

        if listed(source, target, &relation) {
            prop_assert!(result.is_ok(), "{source} -{relation}-> {target} rejected: {result:?}");
        } else {
            let is_invalid_relation = matches!(
                &result,
                Err(DomainError::InvalidRelation { source_kind, target_kind, relation: rel })
                    if *source_kind == source.to_string()
                        && *target_kind == target.to_string()
                        && *rel == relation
            );
            prop_assert!(is_invalid_relation, "unexpected {result:?}");
        }
    }

    /// Reversing a listed directed triple is allowed only if it is listed too
    #[test]
    fn prop_direction_matters(index in 0..ALLOWED_RELATIONS.len()) {
        let rule = ALLOWED_RELATIONS[index];
        for relation in rule.relations {
            prop_assert_eq!(
                relation_rules::is_allowed(rule.target, rule.source, relation),
                listed(rule.target, rule.source, relation)
            );
        }
    }

    /// Unknown kind names never pass
    #[test]
    fn prop_unknown_kinds_rejected(source in "[a-z]{3,12}", relation in relation_name()) {
        prop_assume!(source.parse::<AggregateKind>().is_err());
        prop_assert!(!relation_rules::is_allowed_str(&source, "server", &relation));
        prop_assert!(relation_rules::check("application", &source, &relation).is_err());
    }
}
