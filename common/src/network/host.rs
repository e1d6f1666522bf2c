//! Per-target discovery results.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

pub const UNRESOLVED_ERROR: &str = "Unable to resolve hostname or IP";
pub const CANCELLED_ERROR: &str = "Discovery cancelled";

/// A requested target and what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    #[serde(rename = "input")]
    pub original_input: String,
    /// `None` when resolution failed, or was cancelled before it finished.
    #[serde(rename = "ip")]
    pub canonical_ip: Option<String>,
    pub hostname: Option<String>,
}

impl ResolvedTarget {
    pub fn new(original_input: impl Into<String>, ip: IpAddr, hostname: Option<String>) -> Self {
        Self {
            original_input: original_input.into(),
            canonical_ip: Some(ip.to_string()),
            hostname,
        }
    }

    pub fn unresolved(original_input: impl Into<String>) -> Self {
        Self {
            original_input: original_input.into(),
            canonical_ip: None,
            hostname: None,
        }
    }
}

/// Outcome of a single reachability probe.
///
/// Either reachable (RTT when the tool reported one) or unreachable with an
/// error. Build it through [`ProbeResult::reachable`] or
/// [`ProbeResult::unreachable`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub reachable: bool,
    #[serde(rename = "rtt_ms")]
    pub round_trip_ms: Option<f64>,
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn reachable(round_trip_ms: Option<f64>) -> Self {
        Self {
            reachable: true,
            round_trip_ms,
            error: None,
        }
    }

    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            reachable: false,
            round_trip_ms: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    #[serde(flatten)]
    pub target: ResolvedTarget,
    #[serde(flatten)]
    pub probe: ProbeResult,
}

impl DiscoveryEntry {
    pub fn new(target: ResolvedTarget, probe: ProbeResult) -> Self {
        Self { target, probe }
    }

    /// Entry for a target whose name could not be resolved. No probe was sent.
    pub fn unresolved(input: &str) -> Self {
        Self::new(
            ResolvedTarget::unresolved(input),
            ProbeResult::unreachable(UNRESOLVED_ERROR),
        )
    }

    /// Entry for a target that was skipped or interrupted by cancellation.
    ///
    /// `target` carries the address if resolution finished before the cancel.
    pub fn cancelled(target: ResolvedTarget) -> Self {
        Self::new(target, ProbeResult::unreachable(CANCELLED_ERROR))
    }

    pub fn input(&self) -> &str {
        &self.target.original_input
    }

    pub fn is_reachable(&self) -> bool {
        self.probe.reachable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySummary {
    pub requested: usize,
    pub reachable: usize,
}

impl DiscoverySummary {
    pub fn from_entries(entries: &[DiscoveryEntry]) -> Self {
        Self {
            requested: entries.len(),
            reachable: entries.iter().filter(|e| e.is_reachable()).count(),
        }
    }
}

/// The outbound payload of a discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub summary: DiscoverySummary,
    pub results: Vec<DiscoveryEntry>,
}

impl DiscoveryReport {
    pub fn new(results: Vec<DiscoveryEntry>) -> Self {
        Self {
            summary: DiscoverySummary::from_entries(&results),
            results,
        }
    }
}
