// Copyright (c) 2025 - Cowboy AI, Inc.
//! Snapshot cache for aggregate loading
//!
//! Keeps the latest folded [`Aggregate`] per stream. A load starts from the
//! snapshot and only reads the stream tail after `snapshot.version`, so a
//! stale entry is corrected by the next load instead of being trusted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::aggregate::Aggregate;

/// Latest known state per stream
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    entries: Arc<RwLock<HashMap<String, Aggregate>>>,
    /// Minimum stream length worth caching; 0 disables the cache
    interval: u64,
}

impl SnapshotCache {
    pub fn new(interval: u64) -> Self {
        Self {
            entries: Arc::default(),
            interval,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0
    }

    pub async fn get(&self, id: &str) -> Option<Aggregate> {
        if !self.is_enabled() {
            return None;
        }
        self.entries.read().await.get(id).cloned()
    }

    /// Remember `aggregate` unless the cache already holds a newer version
    pub async fn store(&self, aggregate: &Aggregate) {
        if !self.is_enabled() || aggregate.version < self.interval {
            return;
        }
        let mut entries = self.entries.write().await;
        match entries.get(&aggregate.id) {
            Some(existing) if existing.version >= aggregate.version => {}
            _ => {
                entries.insert(aggregate.id.clone(), aggregate.clone());
            }
        }
    }

    pub async fn invalidate(&self, id: &str) {
        self.entries.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
