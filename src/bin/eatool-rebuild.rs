// Copyright (c) 2025 - Cowboy AI, Inc.
//! Read-model rebuild tool
//!
//! Loads an exported event log (one JSON `StoredEvent` per line), replays
//! every projection family from offset 0 and reports what it built.
//!
//! Run with: cargo run --bin eatool-rebuild -- events.jsonl
//!
//! The log path may also come from `EATOOL_EVENT_LOG`. Engine settings use
//! the usual `EATOOL_*` variables.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use eatool_core::{
    metrics::names, projection::ListQuery, AggregateKind, EngineConfig, InMemoryEventStore,
    InMemoryMetrics, InstrumentedEventStore, ProjectionEngine, StoredEvent,
};
use tokio::fs;
use tracing::{info, warn};

fn log_path() -> Result<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("EATOOL_EVENT_LOG").ok())
        .context("Usage: eatool-rebuild <events.jsonl> (or set EATOOL_EVENT_LOG)")
}

fn parse_log(raw: &str) -> Result<Vec<StoredEvent>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<StoredEvent>(line)
                .with_context(|| format!("Malformed event on line {}", index + 1))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting read-model rebuild");

    let config = EngineConfig::from_env().context("Invalid EATOOL_* configuration")?;
    let path = log_path()?;
    info!("📋 Configuration loaded:");
    info!("  - Event log: {}", path);
    info!("  - Batch size: {}", config.projection.batch_size);
    info!("  - Max retries: {}", config.projection.max_retries);

    let raw = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {path}"))?;
    let events = parse_log(&raw)?;
    info!("📥 Parsed {} events", events.len());

    let metrics = InMemoryMetrics::new();
    let store = InMemoryEventStore::from_config(&config);
    let head = store
        .import(events)
        .await
        .context("Event log failed ordering checks")?;
    info!("✅ Imported log up to offset {}", head);

    let store = InstrumentedEventStore::new(store, Arc::new(metrics.clone()));
    let engine = ProjectionEngine::with_metrics(store, config.projection, Arc::new(metrics.clone()));
    engine
        .rebuild_all()
        .await
        .context("Projection rebuild failed")?;

    let mut parked_total = 0;
    for (kind, worker) in engine.workers() {
        let visible = worker.read_model().list(&ListQuery::new()).await.total;
        let parked = worker.parked().await;
        let lag = metrics
            .gauge_value(names::PROJECTIONS_LAG, &[("family", worker.name())])
            .unwrap_or(0);
        info!(
            "  - {:<24} rows={:<6} checkpoint={:<8} lag={} parked={}",
            kind.collection(),
            visible,
            worker.checkpoint().await,
            lag,
            parked.len()
        );
        for event in &parked {
            warn!(
                "⚠️  Parked {} #{} ({}): {}",
                event.stream_id,
                event.sequence,
                event.event_type,
                event.error.as_deref().unwrap_or("queued")
            );
        }
        parked_total += parked.len();
    }

    info!(
        "📊 Processed {} events, {} failures",
        metrics.counter(names::PROJECTIONS_EVENTS_PROCESSED),
        metrics.counter(names::PROJECTIONS_FAILURES)
    );

    if parked_total > 0 {
        bail!("{parked_total} events parked; read models are incomplete");
    }
    info!(
        "✅ Rebuild complete across {} families",
        AggregateKind::ALL.len()
    );
    Ok(())
}
