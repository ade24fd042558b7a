// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the relation allow-list, the hierarchy validator and
//! projection replay that must hold for all generated inputs.

mod hierarchy;
mod relation_matrix;
mod replay;
