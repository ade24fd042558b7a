// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metrics hooks
//!
//! The core only emits named measurements through [`MetricsSink`]; an
//! exporter outside this crate decides how they are rendered. Sinks are
//! injected into the store, the command service and the projection workers,
//! so each test can own an isolated [`InMemoryMetrics`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::domain::AggregateKind;

/// Metric names
pub mod names {
    pub const COMMANDS_PROCESSED: &str = "eatool.commands.processed";
    pub const COMMANDS_DURATION: &str = "eatool.commands.duration";
    pub const EVENTSTORE_APPENDS: &str = "eatool.eventstore.appends";
    pub const EVENTSTORE_APPEND_DURATION: &str = "eatool.eventstore.append.duration";
    pub const EVENTSTORE_READS: &str = "eatool.eventstore.reads";
    pub const EVENTSTORE_READ_DURATION: &str = "eatool.eventstore.read.duration";
    pub const PROJECTIONS_EVENTS_PROCESSED: &str = "eatool.projections.events_processed";
    pub const PROJECTIONS_FAILURES: &str = "eatool.projections.failures";
    pub const PROJECTIONS_LAG: &str = "eatool.projections.lag";
    pub const PROJECTIONS_BATCH_DURATION: &str = "eatool.projections.batch.duration";
    pub const PROJECTIONS_PARKED: &str = "eatool.projections.parked";
}

/// Per-kind creation counter (`eatool.applications.created`)
pub fn created_counter(kind: AggregateKind) -> String {
    format!("eatool.{}.created", kind.collection())
}

/// Label pairs attached to a measurement
pub type Labels<'a> = &'a [(&'a str, &'a str)];

/// Destination for counters, gauges and durations
pub trait MetricsSink: Send + Sync {
    /// Add `value` to a monotonic counter
    fn increment(&self, name: &str, labels: Labels<'_>, value: u64);

    /// Set a gauge
    fn gauge(&self, name: &str, labels: Labels<'_>, value: i64);

    /// Record one duration sample
    fn record_duration(&self, name: &str, labels: Labels<'_>, duration: Duration);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _: &str, _: Labels<'_>, _: u64) {}
    fn gauge(&self, _: &str, _: Labels<'_>, _: i64) {}
    fn record_duration(&self, _: &str, _: Labels<'_>, _: Duration) {}
}

/// Shared handle used across the crate
pub type SharedMetrics = Arc<dyn MetricsSink>;

/// In-process sink keeping every series in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetrics {
    counters: Arc<RwLock<HashMap<String, u64>>>,
    gauges: Arc<RwLock<HashMap<String, i64>>>,
    durations: Arc<RwLock<HashMap<String, Vec<Duration>>>>,
}

/// Series key: `name` or `name{k=v,...}` with labels sorted
fn series_key(name: &str, labels: Labels<'_>) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let mut pairs: Vec<String> = labels.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    format!("{name}{{{}}}", pairs.join(","))
}

fn series_matches(key: &str, name: &str) -> bool {
    key == name || key.strip_prefix(name).is_some_and(|rest| rest.starts_with('{'))
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter summed over every label set
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        counters
            .iter()
            .filter(|(key, _)| series_matches(key, name))
            .map(|(_, value)| *value)
            .sum()
    }

    /// Counter for one exact label set
    pub fn counter_with(&self, name: &str, labels: Labels<'_>) -> u64 {
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        counters.get(&series_key(name, labels)).copied().unwrap_or(0)
    }

    /// Gauge for one exact label set
    pub fn gauge_value(&self, name: &str, labels: Labels<'_>) -> Option<i64> {
        let gauges = self.gauges.read().unwrap_or_else(|e| e.into_inner());
        gauges.get(&series_key(name, labels)).copied()
    }

    /// Number of duration samples over every label set
    pub fn duration_count(&self, name: &str) -> usize {
        let durations = self.durations.read().unwrap_or_else(|e| e.into_inner());
        durations
            .iter()
            .filter(|(key, _)| series_matches(key, name))
            .map(|(_, samples)| samples.len())
            .sum()
    }

    /// Snapshot of all counters, for logging summaries
    pub fn counters(&self) -> HashMap<String, u64> {
        self.counters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment(&self, name: &str, labels: Labels<'_>, value: u64) {
        let mut counters = self.counters.write().unwrap_or_else(|e| e.into_inner());
        *counters.entry(series_key(name, labels)).or_insert(0) += value;
    }

    fn gauge(&self, name: &str, labels: Labels<'_>, value: i64) {
        let mut gauges = self.gauges.write().unwrap_or_else(|e| e.into_inner());
        gauges.insert(series_key(name, labels), value);
    }

    fn record_duration(&self, name: &str, labels: Labels<'_>, duration: Duration) {
        let mut durations = self.durations.write().unwrap_or_else(|e| e.into_inner());
        let samples = durations.entry(series_key(name, labels)).or_default();
        samples.push(duration);
        // Keep only the last 1000 samples per series
        if samples.len() > 1000 {
            let excess = samples.len() - 1000;
            samples.drain(0..excess);
        }
    }
}

/// Records elapsed time into a duration series when finished
pub struct MetricsTimer {
    started: Instant,
}

impl MetricsTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn record(self, sink: &dyn MetricsSink, name: &str, labels: Labels<'_>) {
        sink.record_duration(name, labels, self.started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_sum_across_labels() {
        let metrics = InMemoryMetrics::new();
        metrics.increment(names::COMMANDS_PROCESSED, &[("outcome", "ok")], 2);
        metrics.increment(names::COMMANDS_PROCESSED, &[("outcome", "error")], 1);
        metrics.increment("eatool.commands.processed_total", &[], 7);

        assert_eq!(metrics.counter(names::COMMANDS_PROCESSED), 3);
        assert_eq!(
            metrics.counter_with(names::COMMANDS_PROCESSED, &[("outcome", "ok")]),
            2
        );
    }

    #[test]
    fn test_label_order_is_irrelevant() {
        let metrics = InMemoryMetrics::new();
        metrics.increment("m", &[("a", "1"), ("b", "2")], 1);
        assert_eq!(metrics.counter_with("m", &[("b", "2"), ("a", "1")]), 1);
    }

    #[test]
    fn test_gauge_overwrites() {
        let metrics = InMemoryMetrics::new();
        metrics.gauge(names::PROJECTIONS_LAG, &[("family", "server")], 5);
        metrics.gauge(names::PROJECTIONS_LAG, &[("family", "server")], 0);
        assert_eq!(
            metrics.gauge_value(names::PROJECTIONS_LAG, &[("family", "server")]),
            Some(0)
        );
    }

    #[test]
    fn test_duration_samples_are_bounded() {
        let metrics = InMemoryMetrics::new();
        for _ in 0..1_005 {
            metrics.record_duration("d", &[], Duration::from_millis(1));
        }
        assert_eq!(metrics.duration_count("d"), 1000);
    }

    #[test]
    fn test_created_counter_names() {
        assert_eq!(
            created_counter(AggregateKind::Application),
            "eatool.applications.created"
        );
        assert_eq!(
            created_counter(AggregateKind::BusinessCapability),
            "eatool.capabilities.created"
        );
    }

    #[test]
    fn test_timer_records() {
        let metrics = InMemoryMetrics::new();
        MetricsTimer::start().record(&metrics, names::COMMANDS_DURATION, &[]);
        assert_eq!(metrics.duration_count(names::COMMANDS_DURATION), 1);
    }
}
