// Copyright (c) 2025 - Cowboy AI, Inc.
//! Projection workers
//!
//! A [`ProjectionWorker`] owns one read-model family and a checkpoint into
//! the global log. Each batch reads `batch_size` events after the
//! checkpoint and hands the ones its [`Projection`] handles to the reducer.
//!
//! # Failure isolation
//!
//! ```text
//! reduce fails ──retry (backoff)──> still failing after max_retries
//!                                        ↓
//!                               park event under its stream
//!                                        ↓
//!              later events of that stream queue behind it,
//!              other streams keep flowing, checkpoint advances
//! ```
//!
//! Parked events are never dropped; [`ProjectionWorker::retry_parked`]
//! re-drives them in stream order.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use futures::future::try_join_all;
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::pure::{self, RowChange};
use super::read_model::{EntityView, ReadModel};
use super::ProjectionResult;
use crate::config::ProjectionConfig;
use crate::domain::AggregateKind;
use crate::event_store::{EventStore, StoredEvent};
use crate::metrics::{names, MetricsTimer, NoopMetrics, SharedMetrics};

/// Row reducer of one read-model family
pub trait Projection: Send + Sync {
    /// Family name, used as the `family` metrics label
    fn name(&self) -> &str;

    /// Whether this family consumes `event` at all
    fn handles(&self, event: &StoredEvent) -> bool;

    fn reduce(
        &self,
        row: Option<&EntityView>,
        event: &StoredEvent,
    ) -> ProjectionResult<RowChange>;
}

/// Projection of one aggregate kind into its read model
#[derive(Debug, Clone, Copy)]
pub struct EntityProjection {
    kind: AggregateKind,
}

impl EntityProjection {
    pub fn new(kind: AggregateKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }
}

impl Projection for EntityProjection {
    fn name(&self) -> &str {
        self.kind.collection()
    }

    fn handles(&self, event: &StoredEvent) -> bool {
        event.aggregate_kind == self.kind
    }

    fn reduce(
        &self,
        row: Option<&EntityView>,
        event: &StoredEvent,
    ) -> ProjectionResult<RowChange> {
        pure::reduce(row, event)
    }
}

/// Event waiting for a retry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkedEvent {
    pub stream_id: String,
    pub sequence: u64,
    pub global_offset: u64,
    pub event_type: String,
    /// Last failure; `None` for events queued behind a failed one
    pub error: Option<String>,
    #[serde(skip)]
    event: StoredEvent,
}

impl ParkedEvent {
    fn new(event: StoredEvent, error: Option<String>) -> Self {
        Self {
            stream_id: event.stream_id.clone(),
            sequence: event.sequence,
            global_offset: event.global_offset,
            event_type: event.event_type.clone(),
            error,
            event,
        }
    }
}

#[derive(Debug, Default)]
struct WorkerState {
    checkpoint: u64,
    parked: BTreeMap<String, VecDeque<ParkedEvent>>,
}

impl WorkerState {
    fn parked_len(&self) -> usize {
        self.parked.values().map(VecDeque::len).sum()
    }
}

/// Drives one projection over the global log
pub struct ProjectionWorker<S> {
    store: S,
    projection: Arc<dyn Projection>,
    read_model: ReadModel,
    metrics: SharedMetrics,
    config: ProjectionConfig,
    state: Mutex<WorkerState>,
}

impl<S: EventStore> ProjectionWorker<S> {
    pub fn new(store: S, projection: Arc<dyn Projection>, config: ProjectionConfig) -> Self {
        Self {
            store,
            projection,
            read_model: ReadModel::new(),
            metrics: Arc::new(NoopMetrics),
            config,
            state: Mutex::new(WorkerState::default()),
        }
    }

    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn name(&self) -> &str {
        self.projection.name()
    }

    pub fn read_model(&self) -> &ReadModel {
        &self.read_model
    }

    /// Global offset of the last event this worker has passed
    pub async fn checkpoint(&self) -> u64 {
        self.state.lock().await.checkpoint
    }

    /// Parked events in stream order
    pub async fn parked(&self) -> Vec<ParkedEvent> {
        self.state
            .lock()
            .await
            .parked
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    /// Process one batch; returns the number of events read
    pub async fn process_batch(&self) -> ProjectionResult<usize> {
        let timer = MetricsTimer::start();
        let mut state = self.state.lock().await;

        let events: Vec<StoredEvent> = self
            .store
            .read_all(state.checkpoint)
            .take(self.config.batch_size.max(1))
            .try_collect()
            .await?;
        let read = events.len();
        let mut applied = 0u64;

        for event in events {
            let offset = event.global_offset;
            if self.projection.handles(&event) {
                if let Some(queue) = state.parked.get_mut(&event.stream_id) {
                    debug!(
                        family = self.name(),
                        stream_id = %event.stream_id,
                        sequence = event.sequence,
                        "Queued behind parked event"
                    );
                    queue.push_back(ParkedEvent::new(event, None));
                } else if let Err(err) = self.apply_with_retry(&event).await {
                    error!(
                        family = self.name(),
                        stream_id = %event.stream_id,
                        sequence = event.sequence,
                        error = %err,
                        "Parking event"
                    );
                    let stream_id = event.stream_id.clone();
                    let parked = ParkedEvent::new(event, Some(err.to_string()));
                    state.parked.insert(stream_id, VecDeque::from([parked]));
                } else {
                    applied += 1;
                }
            }
            state.checkpoint = offset;
        }

        let labels = [("family", self.name())];
        if applied > 0 {
            self.metrics
                .increment(names::PROJECTIONS_EVENTS_PROCESSED, &labels, applied);
        }
        self.metrics.gauge(
            names::PROJECTIONS_PARKED,
            &labels,
            i64::try_from(state.parked_len()).unwrap_or(i64::MAX),
        );
        let head = self.store.head_offset().await?;
        self.record_lag(head, state.checkpoint);
        timer.record(self.metrics.as_ref(), names::PROJECTIONS_BATCH_DURATION, &labels);

        if read > 0 {
            debug!(
                family = self.name(),
                read,
                applied,
                checkpoint = state.checkpoint,
                "Batch processed"
            );
        }
        Ok(read)
    }

    /// Process batches until the checkpoint reaches the head
    pub async fn catch_up(&self) -> ProjectionResult<u64> {
        loop {
            let head = self.store.head_offset().await?;
            if self.checkpoint().await >= head {
                return Ok(head);
            }
            if self.process_batch().await? == 0 {
                return Ok(self.checkpoint().await);
            }
        }
    }

    /// Re-drive parked events; returns how many were applied
    pub async fn retry_parked(&self) -> ProjectionResult<usize> {
        let mut state = self.state.lock().await;
        let streams: Vec<String> = state.parked.keys().cloned().collect();
        let mut drained = 0;

        for stream_id in streams {
            let Some(mut queue) = state.parked.remove(&stream_id) else {
                continue;
            };
            while let Some(parked) = queue.pop_front() {
                match self.apply_with_retry(&parked.event).await {
                    Ok(()) => drained += 1,
                    Err(err) => {
                        warn!(
                            family = self.name(),
                            stream_id = %stream_id,
                            sequence = parked.sequence,
                            error = %err,
                            "Parked event still failing"
                        );
                        queue.push_front(ParkedEvent::new(parked.event, Some(err.to_string())));
                        break;
                    }
                }
            }
            if !queue.is_empty() {
                state.parked.insert(stream_id, queue);
            }
        }

        if drained > 0 {
            self.metrics.increment(
                names::PROJECTIONS_EVENTS_PROCESSED,
                &[("family", self.name())],
                drained as u64,
            );
        }
        self.metrics.gauge(
            names::PROJECTIONS_PARKED,
            &[("family", self.name())],
            i64::try_from(state.parked_len()).unwrap_or(i64::MAX),
        );
        info!(family = self.name(), drained, "Retried parked events");
        Ok(drained)
    }

    /// Drop the read model and replay from offset 0
    pub async fn rebuild(&self) -> ProjectionResult<u64> {
        {
            let mut state = self.state.lock().await;
            state.checkpoint = 0;
            state.parked.clear();
            self.read_model.clear().await;
        }
        info!(family = self.name(), "Rebuilding read model");
        self.catch_up().await
    }

    async fn apply(&self, event: &StoredEvent) -> ProjectionResult<()> {
        let row = self.read_model.row(&event.stream_id).await;
        match self.projection.reduce(row.as_ref(), event)? {
            RowChange::Upsert(view) | RowChange::Remove(view) => self.read_model.put(view).await,
            RowChange::Skip => {}
        }
        Ok(())
    }

    async fn apply_with_retry(&self, event: &StoredEvent) -> ProjectionResult<()> {
        let mut attempt = 0;
        loop {
            match self.apply(event).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    self.metrics
                        .increment(names::PROJECTIONS_FAILURES, &[("family", self.name())], 1);
                    if attempt >= self.config.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.config.backoff(attempt);
                    warn!(
                        family = self.name(),
                        stream_id = %event.stream_id,
                        sequence = event.sequence,
                        attempt,
                        ?delay,
                        error = %err,
                        "Projection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn record_lag(&self, head: u64, checkpoint: u64) {
        let lag = head.saturating_sub(checkpoint);
        self.metrics.gauge(
            names::PROJECTIONS_LAG,
            &[("family", self.name())],
            i64::try_from(lag).unwrap_or(i64::MAX),
        );
    }
}

impl<S: EventStore + 'static> ProjectionWorker<S> {
    /// Run in the background until `shutdown` turns true or its sender drops
    ///
    /// Wakes on every head change, and on `poll_interval` as a fallback.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut head = self.store.subscribe();
            let mut head_open = true;
            let mut ticker = tokio::time::interval(self.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(family = self.name(), "Projection worker started");

            loop {
                if *shutdown.borrow() {
                    break;
                }
                if let Err(err) = self.catch_up().await {
                    warn!(family = self.name(), error = %err, "Catch-up failed");
                }
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = head.changed(), if head_open => {
                        if changed.is_err() {
                            head_open = false;
                        }
                    }
                    _ = ticker.tick() => {}
                }
            }

            info!(family = self.name(), "Projection worker stopped");
        })
    }
}

/// One worker per aggregate kind over a shared store
pub struct ProjectionEngine<S> {
    workers: BTreeMap<AggregateKind, Arc<ProjectionWorker<S>>>,
}

impl<S: EventStore + Clone + 'static> ProjectionEngine<S> {
    pub fn new(store: S, config: ProjectionConfig) -> Self {
        Self::with_metrics(store, config, Arc::new(NoopMetrics))
    }

    pub fn with_metrics(store: S, config: ProjectionConfig, metrics: SharedMetrics) -> Self {
        let workers = AggregateKind::ALL
            .into_iter()
            .map(|kind| {
                let worker = ProjectionWorker::new(
                    store.clone(),
                    Arc::new(EntityProjection::new(kind)),
                    config.clone(),
                )
                .with_metrics(metrics.clone());
                (kind, Arc::new(worker))
            })
            .collect();
        Self { workers }
    }

    pub fn worker(&self, kind: AggregateKind) -> Option<&Arc<ProjectionWorker<S>>> {
        self.workers.get(&kind)
    }

    pub fn read_model(&self, kind: AggregateKind) -> Option<&ReadModel> {
        self.worker(kind).map(|worker| worker.read_model())
    }

    pub fn workers(&self) -> impl Iterator<Item = (AggregateKind, &Arc<ProjectionWorker<S>>)> {
        self.workers.iter().map(|(kind, worker)| (*kind, worker))
    }

    /// Bring every family up to the head, families in parallel
    pub async fn catch_up_all(&self) -> ProjectionResult<()> {
        try_join_all(self.workers.values().map(|worker| worker.catch_up())).await?;
        Ok(())
    }

    pub async fn rebuild_all(&self) -> ProjectionResult<()> {
        try_join_all(self.workers.values().map(|worker| worker.rebuild())).await?;
        Ok(())
    }

    pub fn spawn_all(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        self.workers
            .values()
            .map(|worker| Arc::clone(worker).spawn(shutdown.clone()))
            .collect()
    }
}
