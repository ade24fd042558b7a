// Copyright (c) 2025 - Cowboy AI, Inc.
//! Trace context propagation
//!
//! The transport decodes whatever header format it speaks and hands the core
//! an opaque [`TraceContext`]. The core records it on its `tracing` spans and
//! copies it into event metadata, so an event can be tied back to the request
//! that produced it. Header encoding stays outside this crate.

use serde::{Deserialize, Serialize};
use tracing::Span;

/// Opaque distributed-trace identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceContext {
    /// Trace id as supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Caller's span id (parent of the core's spans)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    /// Sampling decision
    #[serde(default)]
    pub sampled: bool,

    /// Vendor state carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TraceContext {
    /// Context with trace and parent span ids
    pub fn new(trace_id: impl Into<String>, parent_span_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            parent_span_id: Some(parent_span_id.into()),
            sampled: true,
            state: None,
        }
    }

    /// Empty context for calls that arrive without one
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.trace_id.is_none()
    }

    /// Trace id or `-` for log fields
    pub fn trace_id_or_dash(&self) -> &str {
        self.trace_id.as_deref().unwrap_or("-")
    }

    /// Span for a command, carrying the trace ids as fields
    pub fn command_span(&self, kind: &str, verb: &str) -> Span {
        tracing::info_span!(
            "command",
            kind = kind,
            verb = verb,
            trace_id = self.trace_id_or_dash(),
            parent_span_id = self.parent_span_id.as_deref().unwrap_or("-"),
        )
    }

    /// Span for an event store operation
    pub fn store_span(&self, operation: &'static str, stream_id: &str) -> Span {
        tracing::debug_span!(
            "event_store",
            operation = operation,
            stream_id = stream_id,
            trace_id = self.trace_id_or_dash(),
        )
    }
}
