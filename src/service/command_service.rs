// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event-sourced command service
//!
//! # Transaction Semantics
//!
//! 1. Load the aggregate (snapshot plus stream tail)
//! 2. Check the caller's expected version
//! 3. Load the ancestor chain when the command proposes a parent
//! 4. Run the pure handler
//! 5. Append with the loaded version as expected version
//!
//! Step 5 is the only write. Two commands racing on one aggregate both pass
//! step 2 but only one append succeeds; the other gets
//! `ConcurrencyConflict`.
//!
//! Commands that propose a parent hold their family's hierarchy lock from
//! step 1 through step 5. The ancestor chain read in step 3 lives on other
//! streams, so the per-stream version check alone would let `A -> B` and
//! `B -> A` both commit. The lock is per service instance; all writers of
//! one store must share it.
//!
//! `command_timeout` bounds steps 1 to 5 only. Once the append returns the
//! command has applied, and the read-back of the written events runs to
//! completion.

use std::collections::{HashMap, HashSet};

use futures::TryStreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn, Instrument};

use super::{ServiceError, ServiceResult, SnapshotCache};
use crate::aggregate::{handlers, Aggregate, Command, CommandTarget, HandlerContext};
use crate::config::EngineConfig;
use crate::domain::AggregateKind;
use crate::errors::{DomainError, InfrastructureError};
use crate::event_store::{EventStore, NewEvent, StoredEvent};
use crate::metrics::{created_counter, names, MetricsTimer, NoopMetrics, SharedMetrics};
use crate::trace::TraceContext;

/// Result of an accepted command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub aggregate_id: String,
    /// Stream version after the append
    pub version: u64,
    /// Events written by this command, in order
    pub events: Vec<StoredEvent>,
}

/// A command whose events are in the store
struct Committed {
    id: String,
    aggregate: Option<Aggregate>,
    /// Stream version the append started from
    from: u64,
    version: u64,
    trace: TraceContext,
}

/// Write-side entry point
pub struct CommandService<S> {
    store: S,
    metrics: SharedMetrics,
    snapshots: SnapshotCache,
    /// Serializes parent changes within one hierarchical family
    hierarchy_locks: HashMap<AggregateKind, Mutex<()>>,
    config: EngineConfig,
}

impl<S: EventStore> CommandService<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let hierarchy_locks = [AggregateKind::Organization, AggregateKind::BusinessCapability]
            .into_iter()
            .map(|kind| (kind, Mutex::new(())))
            .collect();
        Self {
            store,
            metrics: std::sync::Arc::new(NoopMetrics),
            snapshots: SnapshotCache::new(config.snapshot_interval),
            hierarchy_locks,
            config,
        }
    }

    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshots(&self) -> &SnapshotCache {
        &self.snapshots
    }

    /// Validate and apply one command
    ///
    /// # Errors
    ///
    /// - `ServiceError::Domain` when the command is rejected
    /// - `ServiceError::Infrastructure` when the store fails or the
    ///   command exceeds `command_timeout` before its append
    ///
    /// An error always means nothing was written.
    pub async fn execute(&self, command: Command) -> ServiceResult<CommandOutcome> {
        let kind = command.body.kind();
        let verb = command.body.verb();
        let is_create = command.body.is_create();
        let span = command.metadata.trace.command_span(kind.as_str(), verb);
        let timeout = self.config.command_timeout;
        let timer = MetricsTimer::start();

        let committed = self.commit(command).instrument(span.clone());
        let result = match tokio::time::timeout(timeout, committed).await {
            Ok(Ok(committed)) => Ok(self.finish(committed).instrument(span).await),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(InfrastructureError::Timeout(timeout).into()),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.code(),
        };
        let labels = [("kind", kind.as_str()), ("verb", verb), ("outcome", outcome)];
        self.metrics
            .increment(names::COMMANDS_PROCESSED, &labels, 1);
        timer.record(self.metrics.as_ref(), names::COMMANDS_DURATION, &labels);

        match &result {
            Ok(accepted) => {
                if is_create {
                    self.metrics.increment(&created_counter(kind), &[], 1);
                }
                info!(
                    aggregate_id = %accepted.aggregate_id,
                    version = accepted.version,
                    events = accepted.events.len(),
                    "Command accepted"
                );
            }
            Err(err) => debug!(%kind, verb, code = err.code(), error = %err, "Command rejected"),
        }

        result
    }

    /// Load, decide and append
    async fn commit(&self, command: Command) -> ServiceResult<Committed> {
        let Command {
            target,
            expected_version,
            body,
            metadata,
        } = command;
        let kind = body.kind();

        let id = match target {
            CommandTarget::New if body.is_create() => kind.new_id(),
            CommandTarget::New => return Err(DomainError::required("id").into()),
            CommandTarget::Existing(id) => id,
        };

        let _hierarchy = match (body.proposed_parent(), self.hierarchy_locks.get(&kind)) {
            (Some(_), Some(lock)) => Some(lock.lock().await),
            _ => None,
        };

        let aggregate = self.load(&id, &metadata.trace).await?;
        let current = aggregate.as_ref().map_or(0, |a| a.version);

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(DomainError::ConcurrencyConflict {
                    stream_id: id,
                    expected,
                    actual: current,
                }
                .into());
            }
        }

        let mut ctx = HandlerContext::new(id.clone());
        if let Some(parent) = body.proposed_parent() {
            ctx.parents = self.ancestry(kind, parent, &metadata.trace).await?;
        }

        let events = handlers::decide(aggregate.as_ref(), &body, &ctx)?;
        let version = if events.is_empty() {
            current
        } else {
            let event_metadata = metadata.event_metadata();
            let new_events = events
                .into_iter()
                .map(|data| NewEvent::new(data, event_metadata.clone()))
                .collect();
            self.store.append(&id, current, new_events).await?
        };

        Ok(Committed {
            id,
            aggregate,
            from: current,
            version,
            trace: metadata.trace,
        })
    }

    /// Read back the written events and refresh the snapshot
    ///
    /// The events are already committed, so a failed read-back is logged and
    /// the outcome carries no events rather than an error.
    async fn finish(&self, committed: Committed) -> CommandOutcome {
        let Committed {
            id,
            aggregate,
            from,
            version,
            trace,
        } = committed;

        let mut outcome = CommandOutcome {
            aggregate_id: id,
            version,
            events: Vec::new(),
        };
        if version == from {
            return outcome;
        }

        let written: Vec<StoredEvent> = match self
            .store
            .read(&outcome.aggregate_id, from, &trace)
            .try_filter(|event| futures::future::ready(event.sequence <= version))
            .try_collect()
            .await
        {
            Ok(written) => written,
            Err(err) => {
                warn!(
                    aggregate_id = %outcome.aggregate_id,
                    version,
                    error = %err,
                    "Committed events could not be read back"
                );
                return outcome;
            }
        };

        let folded = match aggregate {
            Some(aggregate) => Some(written.iter().fold(aggregate, Aggregate::apply)),
            None => Aggregate::from_events(&written),
        };
        if let Some(folded) = &folded {
            self.snapshots.store(folded).await;
        }

        outcome.events = written;
        outcome
    }

    /// Current aggregate state, `None` for an empty stream
    pub async fn load(&self, id: &str, trace: &TraceContext) -> ServiceResult<Option<Aggregate>> {
        let snapshot = self.snapshots.get(id).await;
        let after = snapshot.as_ref().map_or(0, |s| s.version);

        let tail: Vec<StoredEvent> = self.store.read(id, after, trace).try_collect().await?;

        let aggregate = match snapshot {
            Some(snapshot) => Some(tail.iter().fold(snapshot, Aggregate::apply)),
            None => Aggregate::from_events(&tail),
        };

        if !tail.is_empty() {
            if let Some(aggregate) = &aggregate {
                self.snapshots.store(aggregate).await;
            }
        }
        Ok(aggregate)
    }

    /// A live aggregate of `kind`
    pub async fn get(&self, kind: AggregateKind, id: &str) -> ServiceResult<Aggregate> {
        self.load(id, &TraceContext::none())
            .await?
            .filter(|a| a.kind == kind && !a.deleted)
            .ok_or_else(|| {
                DomainError::NotFound {
                    kind: kind.to_string(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// Full event history of a stream, deleted aggregates included
    pub async fn history(&self, id: &str) -> ServiceResult<Vec<StoredEvent>> {
        self.store
            .read(id, 0, &TraceContext::none())
            .try_collect()
            .await
            .map_err(ServiceError::from)
    }

    /// Parent links from `candidate` up to its root, same kind only
    ///
    /// Deleted or foreign-kind nodes are left out, so a candidate that is
    /// not a live node of `kind` shows up as unknown.
    async fn ancestry(
        &self,
        kind: AggregateKind,
        candidate: &str,
        trace: &TraceContext,
    ) -> ServiceResult<HashMap<String, Option<String>>> {
        let mut links = HashMap::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate.to_string());

        while let Some(id) = cursor.take() {
            if !visited.insert(id.clone()) {
                break;
            }
            let Some(node) = self.load(&id, trace).await? else {
                break;
            };
            if node.kind != kind || node.deleted {
                break;
            }
            let parent = node.parent_id().map(str::to_string);
            cursor = parent.clone();
            links.insert(id, parent);
        }

        Ok(links)
    }
}
