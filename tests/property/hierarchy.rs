// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hierarchy validator properties
//!
//! Random parent updates are applied only when `validate_parent` accepts
//! them; the resulting forest must never contain a loop.

use std::collections::HashMap;

use eatool_core::domain::hierarchy::ancestors;
use eatool_core::domain::validate_parent;
use eatool_core::DomainError;
use proptest::prelude::*;

fn node(i: usize) -> String {
    format!("org-{i}")
}

fn forest(size: usize) -> HashMap<String, Option<String>> {
    (0..size).map(|i| (node(i), None)).collect()
}

/// Follows parent links from `start`; true when it revisits a node
fn has_loop(links: &HashMap<String, Option<String>>, start: &str) -> bool {
    let mut seen = std::collections::HashSet::new();
    let mut cursor = Some(start.to_string());
    while let Some(id) = cursor {
        if !seen.insert(id.clone()) {
            return true;
        }
        cursor = links.get(&id).cloned().flatten();
    }
    false
}

proptest! {
    #[test]
    fn prop_accepted_updates_never_create_cycles(
        size in 2usize..12,
        updates in prop::collection::vec((0usize..12, prop::option::of(0usize..12)), 1..60),
    ) {
        let mut links = forest(size);
        for (child, parent) in updates {
            let child = node(child % size);
            let parent = parent.map(|p| node(p % size));
            if validate_parent(&child, parent.as_deref(), &links).is_ok() {
                links.insert(child, parent);
            }
        }
        for id in links.keys() {
            prop_assert!(!has_loop(&links, id), "loop through {id}");
        }
    }

    #[test]
    fn prop_self_parent_always_rejected(size in 1usize..10, i in 0usize..10) {
        let links = forest(size);
        let id = node(i % size);
        let is_cycle = matches!(
            validate_parent(&id, Some(id.as_str()), &links),
            Err(DomainError::CycleDetected { .. })
        );
        prop_assert!(is_cycle);
    }

    /// Any node on a chain rejects every descendant as its parent
    #[test]
    fn prop_descendants_rejected_on_chains(depth in 2usize..40) {
        let mut links = forest(depth);
        for i in 1..depth {
            links.insert(node(i), Some(node(i - 1)));
        }
        let leaf = node(depth - 1);
        prop_assert_eq!(ancestors(&leaf, &links).len(), depth - 1);

        for i in 1..depth {
            let is_cycle = matches!(
                validate_parent(&node(0), Some(node(i).as_str()), &links),
                Err(DomainError::CycleDetected { .. })
            );
            prop_assert!(is_cycle);
        }
        prop_assert!(validate_parent(&node(0), None, &links).is_ok());
    }

    #[test]
    fn prop_unknown_parent_rejected(size in 1usize..10, missing in 10usize..20) {
        let links = forest(size);
        prop_assert_eq!(
            validate_parent(&node(0), Some(node(missing).as_str()), &links),
            Err(DomainError::UnknownParent(node(missing)))
        );
    }
}
