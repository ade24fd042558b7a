// Copyright (c) 2025 - Cowboy AI, Inc.
//! Replay idempotence
//!
//! Random command sequences are recorded through the service; replaying
//! the resulting log into fresh rows, or twice into the same rows, must
//! give identical read models.

use eatool_core::aggregate::organization::{OrganizationCommand, OrganizationPatch};
use eatool_core::projection::{replay, Rows};
use eatool_core::{Command, CommandService, EngineConfig, EventStore, InMemoryEventStore, StoredEvent};
use futures::TryStreamExt;
use proptest::prelude::*;

use crate::fixtures::{create_organization, metadata};

#[derive(Debug, Clone)]
enum Step {
    Create(String),
    Rename(usize, String),
    Reparent(usize, Option<usize>),
    Delete(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => "[A-Z][a-z]{2,8}".prop_map(Step::Create),
        2 => (any::<usize>(), "[A-Z][a-z]{2,8}").prop_map(|(i, n)| Step::Rename(i, n)),
        2 => (any::<usize>(), prop::option::of(any::<usize>())).prop_map(|(i, p)| Step::Reparent(i, p)),
        1 => any::<usize>().prop_map(Step::Delete),
    ]
}

/// Run the steps, ignoring rejected commands, and return the global log
async fn record(steps: Vec<Step>) -> Vec<StoredEvent> {
    let store = InMemoryEventStore::new();
    let service = CommandService::new(store.clone(), EngineConfig::default());
    let mut ids: Vec<String> = Vec::new();

    for step in steps {
        let command = match step {
            Step::Create(name) => create_organization(&name, None),
            _ if ids.is_empty() => continue,
            Step::Rename(i, name) => Command::on(
                &ids[i % ids.len()],
                OrganizationCommand::Update(OrganizationPatch {
                    name: Some(name),
                    ..OrganizationPatch::default()
                }),
                metadata(),
            ),
            Step::Reparent(i, parent) => Command::on(
                &ids[i % ids.len()],
                OrganizationCommand::SetParent {
                    parent_id: parent.map(|p| ids[p % ids.len()].clone()),
                },
                metadata(),
            ),
            Step::Delete(i) => Command::on(
                &ids[i % ids.len()],
                OrganizationCommand::Delete { reason: None },
                metadata(),
            ),
        };
        let is_create = command.body.is_create();
        if let Ok(outcome) = service.execute(command).await {
            if is_create {
                ids.push(outcome.aggregate_id);
            }
        }
    }

    store.read_all(0).try_collect().await.unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_replay_twice_is_identical(steps in prop::collection::vec(step(), 1..30)) {
        let log = tokio_test::block_on(record(steps));

        let once = replay(Rows::new(), &log).unwrap();
        let fresh = replay(Rows::new(), &log).unwrap();
        let twice = replay(once.clone(), &log).unwrap();

        prop_assert_eq!(&once, &fresh);
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn prop_prefix_replay_converges(
        steps in prop::collection::vec(step(), 1..30),
        cut in any::<prop::sample::Index>(),
    ) {
        let log = tokio_test::block_on(record(steps));
        let split = cut.index(log.len() + 1);

        let partial = replay(Rows::new(), &log[..split]).unwrap();
        let resumed = replay(partial, &log).unwrap();
        let full = replay(Rows::new(), &log).unwrap();

        prop_assert_eq!(resumed, full);
    }
}
