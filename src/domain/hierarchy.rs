// Copyright (c) 2025 - Cowboy AI, Inc.
//! Parent/child hierarchy validation
//!
//! Organizations and business capabilities form forests. Before a parent
//! reference is written, [`validate_parent`] walks the candidate's ancestor
//! chain and rejects the change if the child shows up on it.

use std::collections::{HashMap, HashSet};

use crate::errors::{DomainError, DomainResult};

/// Read access to the current parent links
pub trait ParentLookup {
    /// `None` when the node does not exist, `Some(None)` for a root
    fn parent_of(&self, id: &str) -> Option<Option<&str>>;
}

impl ParentLookup for HashMap<String, Option<String>> {
    fn parent_of(&self, id: &str) -> Option<Option<&str>> {
        self.get(id).map(|parent| parent.as_deref())
    }
}

/// Check that `child` may point at `candidate`
///
/// A `None` candidate detaches the node and always succeeds. The walk keeps
/// a visited set, so it terminates on chains of any depth and on loops that
/// already exist higher up in the data.
pub fn validate_parent<L: ParentLookup + ?Sized>(
    child: &str,
    candidate: Option<&str>,
    lookup: &L,
) -> DomainResult<()> {
    let Some(candidate) = candidate else {
        return Ok(());
    };

    let cycle = || DomainError::CycleDetected {
        child: child.to_string(),
        parent: candidate.to_string(),
    };

    if candidate == child {
        return Err(cycle());
    }

    let mut cursor = match lookup.parent_of(candidate) {
        Some(parent) => parent,
        None => return Err(DomainError::UnknownParent(candidate.to_string())),
    };

    let mut visited: HashSet<&str> = HashSet::from([candidate]);
    while let Some(ancestor) = cursor {
        if ancestor == child {
            return Err(cycle());
        }
        if !visited.insert(ancestor) {
            break;
        }
        // A dangling ancestor ends the chain like a root does.
        cursor = lookup.parent_of(ancestor).flatten();
    }

    Ok(())
}

/// Ancestor chain of `id`, nearest first, stopping at roots or loops
pub fn ancestors<'a, L: ParentLookup + ?Sized>(id: &'a str, lookup: &'a L) -> Vec<&'a str> {
    let mut chain = Vec::new();
    let mut visited: HashSet<&str> = HashSet::from([id]);
    let mut cursor = lookup.parent_of(id).flatten();
    while let Some(ancestor) = cursor {
        if !visited.insert(ancestor) {
            break;
        }
        chain.push(ancestor);
        cursor = lookup.parent_of(ancestor).flatten();
    }
    chain
}
