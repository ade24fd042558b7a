// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Projection Functions
//!
//! The reducer decides what an event does to one read-model row and returns
//! that decision as data; the worker performs the write.
//!
//! ```text
//! (Row?, StoredEvent) → Result<RowChange, ProjectionError>
//! ```
//!
//! # Apply-by-sequence
//!
//! A row remembers the stream sequence it has reached. An event at or below
//! that sequence is skipped, so replaying any prefix of the log again leaves
//! the rows unchanged. An event that jumps ahead is a gap and fails.

use std::collections::BTreeMap;

use super::read_model::EntityView;
use super::ProjectionError;
use crate::aggregate::Aggregate;
use crate::event_store::StoredEvent;

/// Effect of one event on one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowChange {
    /// Insert or replace a visible row
    Upsert(EntityView),
    /// Replace with a hidden tombstone (deleted or retired)
    Remove(EntityView),
    /// Already applied
    Skip,
}

impl RowChange {
    pub fn view(&self) -> Option<&EntityView> {
        match self {
            RowChange::Upsert(view) | RowChange::Remove(view) => Some(view),
            RowChange::Skip => None,
        }
    }
}

/// Reduce one event against the current row
pub fn reduce(row: Option<&EntityView>, event: &StoredEvent) -> Result<RowChange, ProjectionError> {
    let aggregate = match row {
        None => {
            if event.sequence != 1 {
                return Err(ProjectionError::SequenceGap {
                    stream_id: event.stream_id.clone(),
                    expected: 1,
                    actual: event.sequence,
                });
            }
            Aggregate::create(event).ok_or_else(|| ProjectionError::MissingRow {
                stream_id: event.stream_id.clone(),
                sequence: event.sequence,
            })?
        }
        Some(row) => {
            if event.sequence <= row.version() {
                return Ok(RowChange::Skip);
            }
            if event.sequence != row.version() + 1 {
                return Err(ProjectionError::SequenceGap {
                    stream_id: event.stream_id.clone(),
                    expected: row.version() + 1,
                    actual: event.sequence,
                });
            }
            if event.aggregate_kind != row.aggregate.kind {
                return Err(ProjectionError::KindMismatch {
                    stream_id: event.stream_id.clone(),
                    expected: row.aggregate.kind,
                    actual: event.aggregate_kind,
                });
            }
            row.aggregate.clone().apply(event)
        }
    };

    let view = EntityView {
        aggregate,
        last_offset: event.global_offset,
    };
    Ok(if view.is_visible() {
        RowChange::Upsert(view)
    } else {
        RowChange::Remove(view)
    })
}

/// Rows keyed by aggregate id
pub type Rows = BTreeMap<String, EntityView>;

/// Fold events into rows, stopping at the first failure
pub fn replay<'a, I>(rows: Rows, events: I) -> Result<Rows, ProjectionError>
where
    I: IntoIterator<Item = &'a StoredEvent>,
{
    events.into_iter().try_fold(rows, |mut rows, event| {
        if let Some(view) = reduce(rows.get(&event.stream_id), event)?.view() {
            rows.insert(view.id().to_string(), view.clone());
        }
        Ok(rows)
    })
}
