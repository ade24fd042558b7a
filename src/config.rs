// Copyright (c) 2025 - Cowboy AI, Inc.
//! Engine configuration
//!
//! Defaults suit tests and local runs. [`EngineConfig::from_env`] overrides
//! them from `EATOOL_*` variables:
//!
//! | Variable                          | Field                               |
//! |-----------------------------------|-------------------------------------|
//! | `EATOOL_COMMAND_TIMEOUT_MS`       | `command_timeout`                   |
//! | `EATOOL_STORE_PAGE_SIZE`          | `store_page_size`                   |
//! | `EATOOL_SNAPSHOT_INTERVAL`        | `snapshot_interval`                 |
//! | `EATOOL_PROJECTION_BATCH_SIZE`    | `projection.batch_size`             |
//! | `EATOOL_PROJECTION_POLL_MS`       | `projection.poll_interval`          |
//! | `EATOOL_PROJECTION_MAX_RETRIES`   | `projection.max_retries`            |
//! | `EATOOL_PROJECTION_BACKOFF_MS`    | `projection.backoff_base`           |
//! | `EATOOL_PROJECTION_BACKOFF_MAX_MS`| `projection.backoff_max`            |

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{InfrastructureError, InfrastructureResult};

/// Projection worker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Events read per batch
    pub batch_size: usize,

    /// Fallback poll when no head notification arrives
    pub poll_interval: Duration,

    /// Attempts after the first failure before an event is parked
    pub max_retries: u32,

    /// First retry delay, doubled per attempt
    pub backoff_base: Duration,

    /// Upper bound for the retry delay
    pub backoff_max: Duration,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            poll_interval: Duration::from_millis(500),
            max_retries: 3,
            backoff_base: Duration::from_millis(10),
            backoff_max: Duration::from_secs(1),
        }
    }
}

impl ProjectionConfig {
    /// Delay before retry `attempt` (1-based), capped at `backoff_max`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff_base
            .checked_mul(factor)
            .map_or(self.backoff_max, |delay| delay.min(self.backoff_max))
    }
}

/// Top-level configuration for the command service and projections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deadline for one command, load to append
    pub command_timeout: Duration,

    /// Events per page when streaming from the store; applied when the
    /// store is built with `InMemoryEventStore::from_config`
    pub store_page_size: usize,

    /// Streams with at least this many events are cached as snapshots
    /// (0 disables the cache)
    pub snapshot_interval: u64,

    pub projection: ProjectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(5),
            store_page_size: 256,
            snapshot_interval: 16,
            projection: ProjectionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> InfrastructureResult<Self> {
        let defaults = Self::default();
        let config = Self {
            command_timeout: env_millis("EATOOL_COMMAND_TIMEOUT_MS", defaults.command_timeout)?,
            store_page_size: env_parse("EATOOL_STORE_PAGE_SIZE", defaults.store_page_size)?,
            snapshot_interval: env_parse("EATOOL_SNAPSHOT_INTERVAL", defaults.snapshot_interval)?,
            projection: ProjectionConfig {
                batch_size: env_parse(
                    "EATOOL_PROJECTION_BATCH_SIZE",
                    defaults.projection.batch_size,
                )?,
                poll_interval: env_millis(
                    "EATOOL_PROJECTION_POLL_MS",
                    defaults.projection.poll_interval,
                )?,
                max_retries: env_parse(
                    "EATOOL_PROJECTION_MAX_RETRIES",
                    defaults.projection.max_retries,
                )?,
                backoff_base: env_millis(
                    "EATOOL_PROJECTION_BACKOFF_MS",
                    defaults.projection.backoff_base,
                )?,
                backoff_max: env_millis(
                    "EATOOL_PROJECTION_BACKOFF_MAX_MS",
                    defaults.projection.backoff_max,
                )?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> InfrastructureResult<()> {
        let invalid = |msg: &str| Err(InfrastructureError::Configuration(msg.to_string()));

        if self.command_timeout.is_zero() {
            return invalid("command_timeout must be positive");
        }
        if self.store_page_size == 0 {
            return invalid("store_page_size must be positive");
        }
        if self.projection.batch_size == 0 {
            return invalid("projection.batch_size must be positive");
        }
        if self.projection.poll_interval.is_zero() {
            return invalid("projection.poll_interval must be positive");
        }
        if self.projection.backoff_base > self.projection.backoff_max {
            return invalid("projection.backoff_base exceeds projection.backoff_max");
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> InfrastructureResult<T> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            InfrastructureError::Configuration(format!("{name}={raw} is not a valid value"))
        }),
        Err(_) => Ok(default),
    }
}

fn env_millis(name: &str, default: Duration) -> InfrastructureResult<Duration> {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    env_parse(name, default_ms).map(Duration::from_millis)
}
