// Copyright (c) 2025 - Cowboy AI, Inc.
//! Server Hostname Value Object with DNS Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::errors::DomainError;

/// Hostname validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostnameError {
    #[error("hostname is empty")]
    Empty,

    #[error("hostname exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("label is empty")]
    EmptyLabel,

    #[error("label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("invalid character in hostname: {0:?}")]
    InvalidCharacter(char),

    #[error("label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),

    #[error("top-level label cannot be all numeric: {0}")]
    NumericTopLevel(String),
}

impl From<HostnameError> for DomainError {
    fn from(err: HostnameError) -> Self {
        DomainError::validation("hostname", err.to_string())
    }
}

/// RFC 1123 hostname of a server
///
/// Stored lowercase with surrounding whitespace trimmed, so two servers
/// registered as `WEB01.example.com` and `web01.example.com` compare equal.
///
/// ```rust
/// use eatool_core::domain::Hostname;
///
/// let host = Hostname::new("Web-01.Example.com").unwrap();
/// assert_eq!(host.as_str(), "web-01.example.com");
/// assert!(Hostname::new("-invalid").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hostname(String);

impl Hostname {
    /// Maximum total length (RFC 1123)
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length for a single label (RFC 1123)
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Validate and normalize a hostname
    pub fn new(hostname: impl AsRef<str>) -> Result<Self, HostnameError> {
        let hostname = hostname.as_ref().trim().to_ascii_lowercase();

        if hostname.is_empty() {
            return Err(HostnameError::Empty);
        }
        if hostname.len() > Self::MAX_LENGTH {
            return Err(HostnameError::TooLong(hostname.len()));
        }

        let labels: Vec<&str> = hostname.split('.').collect();
        for label in &labels {
            Self::validate_label(label)?;
        }

        // Only the last label must not look like an address octet.
        if let Some(top) = labels.last() {
            if top.chars().all(|c| c.is_ascii_digit()) {
                return Err(HostnameError::NumericTopLevel(top.to_string()));
            }
        }

        Ok(Self(hostname))
    }

    fn validate_label(label: &str) -> Result<(), HostnameError> {
        if label.is_empty() {
            return Err(HostnameError::EmptyLabel);
        }
        if label.len() > Self::MAX_LABEL_LENGTH {
            return Err(HostnameError::LabelTooLong(label.to_string()));
        }
        if let Some(ch) = label
            .chars()
            .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '-')
        {
            return Err(HostnameError::InvalidCharacter(ch));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(HostnameError::InvalidLabelFormat(label.to_string()));
        }
        Ok(())
    }

    /// Get the hostname as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First label (`web01` for `web01.example.com`)
    pub fn short_name(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// Everything after the first label
    pub fn domain(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, domain)| domain)
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Hostname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Hostname {
    type Error = HostnameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Hostname> for String {
    fn from(value: Hostname) -> Self {
        value.0
    }
}
