// Copyright (c) 2025 - Cowboy AI, Inc.
//! Queryable read models
//!
//! One [`ReadModel`] per aggregate kind. Rows for deleted or retired
//! aggregates stay in the map as tombstones so a replayed event can still
//! be recognized as already applied; queries never return them.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::aggregate::Aggregate;

/// One projected row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    #[serde(flatten)]
    pub aggregate: Aggregate,
    /// Global offset of the last applied event
    pub last_offset: u64,
}

impl EntityView {
    pub fn id(&self) -> &str {
        &self.aggregate.id
    }

    /// Stream sequence of the last applied event
    pub fn version(&self) -> u64 {
        self.aggregate.version
    }

    pub fn is_visible(&self) -> bool {
        self.aggregate.is_live()
    }

    fn matches(&self, query: &ListQuery) -> bool {
        if let Some(search) = &query.search {
            let name = self.aggregate.display_name().to_lowercase();
            if !name.contains(&search.to_lowercase()) {
                return false;
            }
        }
        query
            .filters
            .iter()
            .all(|(key, value)| self.aggregate.attribute(key).as_deref() == Some(value.as_str()))
    }
}

/// List filters and paging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring of the display name
    pub search: Option<String>,
    /// Exact attribute matches, all must hold
    pub filters: Vec<(String, String)>,
    pub offset: usize,
    /// `None` returns everything after `offset`
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

/// One page of results with the total match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// In-memory rows of one family, ordered by id
#[derive(Debug, Clone, Default)]
pub struct ReadModel {
    rows: Arc<RwLock<BTreeMap<String, EntityView>>>,
}

impl ReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible row by id
    pub async fn get(&self, id: &str) -> Option<EntityView> {
        self.rows
            .read()
            .await
            .get(id)
            .filter(|row| row.is_visible())
            .cloned()
    }

    /// Row by id, tombstones included
    pub async fn row(&self, id: &str) -> Option<EntityView> {
        self.rows.read().await.get(id).cloned()
    }

    pub async fn list(&self, query: &ListQuery) -> Page<EntityView> {
        let rows = self.rows.read().await;
        let matching: Vec<&EntityView> = rows
            .values()
            .filter(|row| row.is_visible() && row.matches(query))
            .collect();
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Page {
            items,
            total,
            offset: query.offset,
            limit: query.limit,
        }
    }

    /// Number of visible rows
    pub async fn count(&self) -> usize {
        self.rows
            .read()
            .await
            .values()
            .filter(|row| row.is_visible())
            .count()
    }

    pub(crate) async fn put(&self, view: EntityView) {
        self.rows.write().await.insert(view.id().to_string(), view);
    }

    pub(crate) async fn clear(&self) {
        self.rows.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{EntityState, ServerState};
    use crate::domain::{AggregateKind, Hostname};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn server(id: &str, hostname: &str, environment: &str, deleted: bool) -> EntityView {
        EntityView {
            aggregate: Aggregate {
                id: id.into(),
                kind: AggregateKind::Server,
                version: 1,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                deleted,
                state: EntityState::Server(ServerState {
                    hostname: Hostname::new(hostname).unwrap(),
                    environment: Some(environment.into()),
                    region: None,
                    platform: None,
                    criticality: None,
                    owning_team: None,
                    tags: vec![],
                }),
            },
            last_offset: 1,
        }
    }

    async fn model() -> ReadModel {
        let model = ReadModel::new();
        model.put(server("srv-1", "web01.example.com", "prod", false)).await;
        model.put(server("srv-2", "web02.example.com", "test", false)).await;
        model.put(server("srv-3", "db01.example.com", "prod", false)).await;
        model.put(server("srv-4", "web03.example.com", "prod", true)).await;
        model
    }

    #[tokio::test]
    async fn test_tombstones_are_hidden() {
        let model = model().await;
        assert!(model.get("srv-4").await.is_none());
        assert!(model.row("srv-4").await.is_some());
        assert_eq!(model.count().await, 3);
    }

    #[tokio::test]
    async fn test_search_and_filter() {
        let model = model().await;
        let page = model
            .list(&ListQuery::new().search("WEB").filter("environment", "prod"))
            .await;
        let ids: Vec<&str> = page.items.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["srv-1"]);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_paging_reports_total() {
        let model = model().await;
        let page = model.list(&ListQuery::new().page(1, 1)).await;
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id(), "srv-2");
    }
}
