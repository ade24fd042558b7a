// Copyright (c) 2025 - Cowboy AI, Inc.
//! Enterprise Architecture Domain Models
//!
//! Value objects and the declarative rule tables that command handlers
//! consult. Everything here is pure: no I/O, no clocks.
//!
//! - [`AggregateKind`] - kind discriminator and id prefixes
//! - [`Hostname`] - RFC 1123 server hostname
//! - [`Classification`] - data sensitivity levels
//! - [`relation_rules`] - relation allow-list
//! - [`hierarchy`] - parent cycle detection
//! - [`validation`] - shared field checks

pub mod classification;
pub mod hierarchy;
pub mod hostname;
pub mod kind;
pub mod relation_rules;
pub mod validation;

pub use classification::Classification;
pub use hierarchy::{validate_parent, ParentLookup};
pub use hostname::{Hostname, HostnameError};
pub use kind::AggregateKind;
