// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event store wrapper that adds metrics and spans
//!
//! Counts every append and read, records their durations and wraps each
//! call in an `event_store` span. Reads are lazy, so their span is entered
//! on every poll of the returned stream, and their duration is recorded
//! when the stream is exhausted.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{Instrument, Span};

use super::{EventStore, EventStoreResult, EventStream, NewEvent};
use crate::metrics::{names, MetricsSink, MetricsTimer, SharedMetrics};
use crate::trace::TraceContext;

/// Metrics-recording decorator over any [`EventStore`]
#[derive(Clone)]
pub struct InstrumentedEventStore<S> {
    inner: S,
    metrics: SharedMetrics,
}

impl<S: EventStore> InstrumentedEventStore<S> {
    pub fn new(inner: S, metrics: SharedMetrics) -> Self {
        Self { inner, metrics }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn timed_stream(
        &self,
        inner: EventStream,
        span: Span,
        labels: &'static [(&'static str, &'static str)],
    ) -> EventStream {
        let metrics: Arc<dyn MetricsSink> = Arc::clone(&self.metrics);
        let timer = MetricsTimer::start();
        let spanned = stream::unfold((inner, span), |(mut inner, span)| async move {
            let item = inner.next().instrument(span.clone()).await?;
            Some((item, (inner, span)))
        });
        let finish = stream::once(async move {
            timer.record(metrics.as_ref(), names::EVENTSTORE_READ_DURATION, labels);
            None
        });
        spanned.map(Some).chain(finish).filter_map(future::ready).boxed()
    }
}

#[async_trait]
impl<S: EventStore> EventStore for InstrumentedEventStore<S> {
    async fn append(
        &self,
        stream_id: &str,
        expected_version: u64,
        events: Vec<NewEvent>,
    ) -> EventStoreResult<u64> {
        let span = match events.first() {
            Some(event) => event.metadata.trace.store_span("append", stream_id),
            None => TraceContext::none().store_span("append", stream_id),
        };
        let timer = MetricsTimer::start();

        let result = self
            .inner
            .append(stream_id, expected_version, events)
            .instrument(span)
            .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        let labels = [("outcome", outcome)];
        timer.record(self.metrics.as_ref(), names::EVENTSTORE_APPEND_DURATION, &labels);
        self.metrics
            .increment(names::EVENTSTORE_APPENDS, &labels, 1);
        result
    }

    fn read(&self, stream_id: &str, after_version: u64, trace: &TraceContext) -> EventStream {
        let span = trace.store_span("read", stream_id);
        self.metrics
            .increment(names::EVENTSTORE_READS, &[("scope", "stream")], 1);
        let inner = span.in_scope(|| self.inner.read(stream_id, after_version, trace));
        self.timed_stream(inner, span, &[("scope", "stream")])
    }

    fn read_all(&self, after_offset: u64) -> EventStream {
        let span = TraceContext::none().store_span("read_all", "*");
        self.metrics
            .increment(names::EVENTSTORE_READS, &[("scope", "all")], 1);
        let inner = span.in_scope(|| self.inner.read_all(after_offset));
        self.timed_stream(inner, span, &[("scope", "all")])
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::{EventMetadata, InMemoryEventStore, StoredEvent};
    use crate::events::ServerEvent;
    use crate::metrics::InMemoryMetrics;
    use chrono::Utc;
    use futures::TryStreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use uuid::Uuid;

    fn deleted() -> NewEvent {
        NewEvent::new(
            ServerEvent::Deleted { reason: None }.into(),
            EventMetadata {
                timestamp: Utc::now(),
                causation_id: Uuid::now_v7(),
                correlation_id: None,
                actor: None,
                trace: TraceContext::new("t", "s"),
            },
        )
    }

    #[tokio::test]
    async fn test_appends_and_reads_are_counted() {
        let metrics = InMemoryMetrics::new();
        let store = InstrumentedEventStore::new(
            InMemoryEventStore::new(),
            Arc::new(metrics.clone()),
        );

        store.append("srv-1", 0, vec![deleted()]).await.unwrap();
        let _ = store.append("srv-1", 0, vec![deleted()]).await.unwrap_err();

        assert_eq!(metrics.counter(names::EVENTSTORE_APPENDS), 2);
        assert_eq!(
            metrics.counter_with(names::EVENTSTORE_APPENDS, &[("outcome", "error")]),
            1
        );
        assert_eq!(metrics.duration_count(names::EVENTSTORE_APPEND_DURATION), 2);

        let events: Vec<StoredEvent> = store
            .read("srv-1", 0, &TraceContext::none())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(metrics.counter(names::EVENTSTORE_READS), 1);
        assert_eq!(metrics.duration_count(names::EVENTSTORE_READ_DURATION), 1);
    }

    /// Counts span entries on the current thread
    struct EnterCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for EnterCounter {
        fn on_enter(&self, _id: &tracing::span::Id, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_read_span_covers_lazy_pages() {
        let inner = InMemoryEventStore::with_page_size(1);
        for id in ["srv-1", "srv-2", "srv-3"] {
            inner.append(id, 0, vec![deleted()]).await.unwrap();
        }
        let store = InstrumentedEventStore::new(inner, Arc::new(InMemoryMetrics::new()));

        let entered = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(EnterCounter(entered.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let stream = store.read_all(0);
        let before_polling = entered.load(Ordering::SeqCst);
        let events: Vec<StoredEvent> = stream.try_collect().await.unwrap();

        assert_eq!(events.len(), 3);
        // one entry per yielded event plus the final empty poll
        assert!(entered.load(Ordering::SeqCst) - before_polling >= 4);
    }

    #[tokio::test]
    async fn test_read_duration_recorded_for_empty_stream() {
        let metrics = InMemoryMetrics::new();
        let store = InstrumentedEventStore::new(
            InMemoryEventStore::new(),
            Arc::new(metrics.clone()),
        );

        let events: Vec<StoredEvent> = store.read_all(0).try_collect().await.unwrap();
        assert!(events.is_empty());
        assert_eq!(metrics.counter_with(names::EVENTSTORE_READS, &[("scope", "all")]), 1);
        assert_eq!(metrics.duration_count(names::EVENTSTORE_READ_DURATION), 1);
    }
}
