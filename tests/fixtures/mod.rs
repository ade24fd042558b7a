// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for eatool-core
//!
//! Deterministic commands and services shared by the integration suites.
//! Timestamps and correlation ids are fixed constants; only aggregate ids
//! handed out by the service vary between runs.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use uuid::Uuid;

use eatool_core::aggregate::application::ApplicationCommand;
use eatool_core::aggregate::business_capability::BusinessCapabilityCommand;
use eatool_core::aggregate::organization::OrganizationCommand;
use eatool_core::aggregate::relation::RelationCommand;
use eatool_core::aggregate::server::ServerCommand;
use eatool_core::event_store::{EventStream, NewEvent};
use eatool_core::{
    Command, CommandMetadata, CommandService, EngineConfig, EventStore, EventStoreResult,
    InMemoryEventStore, InMemoryMetrics, ProjectionConfig, ProjectionEngine, TraceContext,
};

pub const CORRELATION_ID_1: &str = "01934f4a-c001-7000-8000-00000000c001";

pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const PARENT_SPAN_ID: &str = "00f067aa0ba902b7";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub const ACTOR: &str = "architect@example.com";

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("Invalid date in test fixture")
}

pub fn metadata() -> CommandMetadata {
    CommandMetadata::new(fixed_timestamp())
        .with_actor(ACTOR)
        .with_correlation_id(Uuid::parse_str(CORRELATION_ID_1).expect("Invalid UUID in test fixture"))
        .with_trace(TraceContext::new(TRACE_ID, PARENT_SPAN_ID))
}

/// Projection settings with millisecond backoff
pub fn fast_projection_config() -> ProjectionConfig {
    ProjectionConfig {
        batch_size: 8,
        poll_interval: Duration::from_millis(10),
        max_retries: 1,
        backoff_base: Duration::from_millis(1),
        backoff_max: Duration::from_millis(2),
    }
}

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        snapshot_interval: 2,
        projection: fast_projection_config(),
        ..EngineConfig::default()
    }
}

/// Command service over a fresh store, with its metrics sink
pub struct Harness {
    pub store: InMemoryEventStore,
    pub metrics: InMemoryMetrics,
    pub service: CommandService<InMemoryEventStore>,
}

impl Harness {
    pub fn new() -> Self {
        let store = InMemoryEventStore::from_config(&engine_config());
        let metrics = InMemoryMetrics::new();
        let service = CommandService::new(store.clone(), engine_config())
            .with_metrics(Arc::new(metrics.clone()));
        Self {
            store,
            metrics,
            service,
        }
    }

    pub fn projections(&self) -> ProjectionEngine<InMemoryEventStore> {
        ProjectionEngine::with_metrics(
            self.store.clone(),
            fast_projection_config(),
            Arc::new(self.metrics.clone()),
        )
    }

    /// Execute and return the aggregate id, panicking on rejection
    pub async fn accept(&self, command: Command) -> String {
        self.service
            .execute(command)
            .await
            .expect("command should be accepted")
            .aggregate_id
    }
}

/// In-memory store with artificial latency
///
/// `append_delay` runs before every append; `tail_read_delay` before the
/// first event of any stream read that starts past version 0.
#[derive(Clone, Default)]
pub struct SlowStore {
    pub inner: InMemoryEventStore,
    pub append_delay: Duration,
    pub tail_read_delay: Duration,
}

#[async_trait]
impl EventStore for SlowStore {
    async fn append(
        &self,
        stream_id: &str,
        expected_version: u64,
        events: Vec<NewEvent>,
    ) -> EventStoreResult<u64> {
        tokio::time::sleep(self.append_delay).await;
        self.inner.append(stream_id, expected_version, events).await
    }

    fn read(&self, stream_id: &str, after_version: u64, trace: &TraceContext) -> EventStream {
        let inner = self.inner.read(stream_id, after_version, trace);
        if after_version == 0 || self.tail_read_delay.is_zero() {
            return inner;
        }
        let delay = self.tail_read_delay;
        stream::once(async move {
            tokio::time::sleep(delay).await;
            inner
        })
        .flatten()
        .boxed()
    }

    fn read_all(&self, after_offset: u64) -> EventStream {
        self.inner.read_all(after_offset)
    }

    async fn stream_version(&self, stream_id: &str) -> EventStoreResult<u64> {
        self.inner.stream_version(stream_id).await
    }

    async fn head_offset(&self) -> EventStoreResult<u64> {
        self.inner.head_offset().await
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.subscribe()
    }
}

pub fn create_application(name: &str) -> Command {
    Command::create(
        ApplicationCommand::Create {
            name: Some(name.into()),
            lifecycle: None,
            owner: Some("platform-team".into()),
            classification: Some("internal".into()),
            description: None,
            tags: vec!["core".into()],
        },
        metadata(),
    )
}

pub fn transition(id: &str, target: &str) -> Command {
    Command::on(
        id,
        ApplicationCommand::TransitionLifecycle {
            target_lifecycle: Some(target.into()),
            sunset_date: None,
        },
        metadata(),
    )
}

pub fn delete_application(id: &str, approval_id: Option<&str>, reason: Option<&str>) -> Command {
    Command::on(
        id,
        ApplicationCommand::Delete {
            approval_id: approval_id.map(str::to_string),
            reason: reason.map(str::to_string),
        },
        metadata(),
    )
}

pub fn create_organization(name: &str, parent_id: Option<&str>) -> Command {
    Command::create(
        OrganizationCommand::Create {
            name: Some(name.into()),
            parent_id: parent_id.map(str::to_string),
            domains: vec![],
            contacts: vec![],
        },
        metadata(),
    )
}

pub fn set_organization_parent(id: &str, parent_id: &str) -> Command {
    Command::on(
        id,
        OrganizationCommand::SetParent {
            parent_id: Some(parent_id.into()),
        },
        metadata(),
    )
}

pub fn create_capability(name: &str, parent_id: Option<&str>) -> Command {
    Command::create(
        BusinessCapabilityCommand::Create {
            name: Some(name.into()),
            parent_id: parent_id.map(str::to_string),
            description: None,
        },
        metadata(),
    )
}

pub fn create_server(hostname: &str, environment: &str) -> Command {
    Command::create(
        ServerCommand::Create {
            hostname: Some(hostname.into()),
            environment: Some(environment.into()),
            region: Some("eu-west".into()),
            platform: None,
            criticality: None,
            owning_team: None,
            tags: vec![],
        },
        metadata(),
    )
}

pub fn create_relation(
    source: (&str, &str),
    target: (&str, &str),
    relation_type: &str,
    confidence: Option<f64>,
) -> Command {
    Command::create(
        RelationCommand::Create {
            source_id: Some(source.0.into()),
            source_type: Some(source.1.into()),
            target_id: Some(target.0.into()),
            target_type: Some(target.1.into()),
            relation_type: Some(relation_type.into()),
            description: None,
            confidence,
            effective_from: None,
            effective_to: None,
        },
        metadata(),
    )
}
