//! # Error Taxonomy
//!
//! Only request-level failures are modelled as errors. Per-target failures
//! (unresolvable names, failed probes) are data and live in
//! [`DiscoveryEntry`](crate::network::host::DiscoveryEntry) instead.

use std::fmt;

use thiserror::Error;

/// The request field a [`ValidationError`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Body,
    Targets,
    Range,
    Cidr,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Body => "body",
            Field::Targets => "targets",
            Field::Range => "range",
            Field::Cidr => "cidr",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request was rejected before any network activity took place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failure to expand a dashed range or a CIDR block.
///
/// The messages are user facing; they end up in the `details` of a
/// validation response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Range must be in start-end format")]
    MissingSeparator,
    #[error("'{0}' does not appear to be an IPv4 or IPv6 address")]
    InvalidAddress(String),
    #[error("'{0}' does not appear to be an IPv4 or IPv6 network")]
    InvalidNetwork(String),
    #[error("Range start and end must be the same IP version")]
    FamilyMismatch,
    #[error("Range end must be greater than or equal to start")]
    Descending,
}

/// Rejected [`DiscoveryConfig`](crate::config::DiscoveryConfig) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_targets must be between 1 and {ceiling}, got {value}")]
    MaxTargets { value: usize, ceiling: usize },
    #[error("concurrency must be at least 1")]
    Concurrency,
    #[error("{name} must be a positive duration")]
    Timeout { name: &'static str },
}
