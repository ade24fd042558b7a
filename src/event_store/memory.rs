// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory event store
//!
//! Process-local implementation of [`EventStore`]. One `RwLock` guards both
//! the global log and the per-stream index, and `append` never awaits while
//! holding the write guard, so a cancelled append either happened completely
//! or not at all. Reads page through the log lazily and take the read guard
//! once per page.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use super::{
    EventStore, EventStoreError, EventStoreResult, EventStream, NewEvent, StoredEvent,
};
use crate::config::EngineConfig;
use crate::domain::AggregateKind;
use crate::trace::TraceContext;

/// Default number of events fetched per lock acquisition
pub const DEFAULT_PAGE_SIZE: usize = 256;

#[derive(Debug, Default)]
struct Log {
    events: Vec<StoredEvent>,
    /// Positions in `events` per stream, in sequence order
    streams: HashMap<String, Vec<usize>>,
}

impl Log {
    fn stream_version(&self, stream_id: &str) -> u64 {
        self.streams
            .get(stream_id)
            .map_or(0, |positions| positions.len() as u64)
    }

    fn stream_kind(&self, stream_id: &str) -> Option<AggregateKind> {
        self.streams
            .get(stream_id)
            .and_then(|positions| positions.first())
            .and_then(|&index| self.events.get(index))
            .map(|event| event.aggregate_kind)
    }

    fn head(&self) -> u64 {
        self.events.len() as u64
    }

    fn push(&mut self, event: StoredEvent) {
        let index = self.events.len();
        self.streams
            .entry(event.stream_id.clone())
            .or_default()
            .push(index);
        self.events.push(event);
    }
}

/// In-memory, append-only event store
#[derive(Clone)]
pub struct InMemoryEventStore {
    log: Arc<RwLock<Log>>,
    head: Arc<watch::Sender<u64>>,
    available: Arc<AtomicBool>,
    page_size: usize,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Store whose reads fetch `page_size` events per lock acquisition
    pub fn with_page_size(page_size: usize) -> Self {
        let (head, _) = watch::channel(0);
        Self {
            log: Arc::new(RwLock::new(Log::default())),
            head: Arc::new(head),
            available: Arc::new(AtomicBool::new(true)),
            page_size: page_size.max(1),
        }
    }

    /// Store paged by `config.store_page_size`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_page_size(config.store_page_size)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Simulate loss of the backing storage
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> EventStoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EventStoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ))
        }
    }

    /// Restore a previously exported log
    ///
    /// Events must arrive in global order with gapless offsets and gapless
    /// per-stream sequences. Nothing is imported when any check fails.
    pub async fn import<I>(&self, events: I) -> EventStoreResult<u64>
    where
        I: IntoIterator<Item = StoredEvent>,
    {
        self.check_available()?;
        let mut log = self.log.write().await;

        let mut staged = Log {
            events: log.events.clone(),
            streams: log.streams.clone(),
        };
        for event in events {
            let expected_offset = staged.head() + 1;
            if event.global_offset != expected_offset {
                return Err(EventStoreError::InvalidLog(format!(
                    "event {} has offset {}, expected {}",
                    event.event_id, event.global_offset, expected_offset
                )));
            }
            let expected_sequence = staged.stream_version(&event.stream_id) + 1;
            if event.sequence != expected_sequence {
                return Err(EventStoreError::InvalidLog(format!(
                    "event {} in {} has sequence {}, expected {}",
                    event.event_id, event.stream_id, event.sequence, expected_sequence
                )));
            }
            if event.data.kind() != event.aggregate_kind {
                return Err(EventStoreError::InvalidLog(format!(
                    "event {} is tagged {} but carries {} data",
                    event.event_id,
                    event.aggregate_kind,
                    event.data.kind()
                )));
            }
            if let Some(kind) = staged.stream_kind(&event.stream_id) {
                if kind != event.aggregate_kind {
                    return Err(EventStoreError::KindMismatch {
                        stream_id: event.stream_id.clone(),
                        expected: kind,
                        actual: event.aggregate_kind,
                    });
                }
            }
            staged.push(event);
        }

        let imported = staged.head() - log.head();
        *log = staged;
        let head = log.head();
        drop(log);

        self.head.send_replace(head);
        debug!(imported, head, "Imported event log");
        Ok(imported)
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        stream_id: &str,
        expected_version: u64,
        events: Vec<NewEvent>,
    ) -> EventStoreResult<u64> {
        self.check_available()?;

        let mut log = self.log.write().await;

        let current = log.stream_version(stream_id);
        if current != expected_version {
            warn!(
                stream_id,
                expected_version, current, "Rejected append: stale expected version"
            );
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id: stream_id.to_string(),
                expected: expected_version,
                actual: current,
            });
        }

        let stream_kind = log
            .stream_kind(stream_id)
            .or_else(|| events.first().map(|e| e.data.kind()));
        if let Some(expected) = stream_kind {
            if let Some(event) = events.iter().find(|e| e.data.kind() != expected) {
                return Err(EventStoreError::KindMismatch {
                    stream_id: stream_id.to_string(),
                    expected,
                    actual: event.data.kind(),
                });
            }
        }

        let count = events.len() as u64;
        let base_offset = log.head();
        for (i, event) in events.into_iter().enumerate() {
            let i = i as u64;
            log.push(StoredEvent::seal(
                stream_id,
                current + i + 1,
                base_offset + i + 1,
                event,
            ));
        }

        let new_version = current + count;
        let head = log.head();
        drop(log);

        if count > 0 {
            self.head.send_replace(head);
        }
        debug!(stream_id, new_version, head, count, "Appended events");
        Ok(new_version)
    }

    fn read(&self, stream_id: &str, after_version: u64, trace: &TraceContext) -> EventStream {
        if let Err(err) = self.check_available() {
            return stream::once(async move { Err(err) }).boxed();
        }

        debug!(
            stream_id,
            after_version,
            trace_id = trace.trace_id_or_dash(),
            "Reading stream"
        );

        let log = Arc::clone(&self.log);
        let stream_id = stream_id.to_string();
        let page_size = self.page_size;

        stream::unfold(after_version, move |cursor| {
            let log = Arc::clone(&log);
            let stream_id = stream_id.clone();
            async move {
                let page: Vec<StoredEvent> = {
                    let log = log.read().await;
                    let positions = log
                        .streams
                        .get(&stream_id)
                        .and_then(|positions| positions.get(cursor as usize..))
                        .unwrap_or(&[]);
                    positions
                        .iter()
                        .take(page_size)
                        .filter_map(|&index| log.events.get(index).cloned())
                        .collect()
                };
                if page.is_empty() {
                    return None;
                }
                let next = cursor + page.len() as u64;
                Some((stream::iter(page.into_iter().map(Ok)), next))
            }
        })
        .flatten()
        .boxed()
    }

    fn read_all(&self, after_offset: u64) -> EventStream {
        if let Err(err) = self.check_available() {
            return stream::once(async move { Err(err) }).boxed();
        }

        let log = Arc::clone(&self.log);
        let page_size = self.page_size;

        stream::unfold(after_offset, move |cursor| {
            let log = Arc::clone(&log);
            async move {
                let page: Vec<StoredEvent> = {
                    let log = log.read().await;
                    log.events
                        .get(cursor as usize..)
                        .unwrap_or(&[])
                        .iter()
                        .take(page_size)
                        .cloned()
                        .collect()
                };
                if page.is_empty() {
                    return None;
                }
                let next = cursor + page.len() as u64;
                Some((stream::iter(page.into_iter().map(Ok)), next))
            }
        })
        .flatten()
        .boxed()
    }

    async fn stream_version(&self, stream_id: &str) -> EventStoreResult<u64> {
        self.check_available()?;
        Ok(self.log.read().await.stream_version(stream_id))
    }

    async fn head_offset(&self) -> EventStoreResult<u64> {
        self.check_available()?;
        Ok(self.log.read().await.head())
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.head.subscribe()
    }
}
