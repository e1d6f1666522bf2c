use std::time::Duration;

use crate::error::ConfigError;
use crate::platform::PingPlatform;

pub const DEFAULT_MAX_TARGETS: usize = 256;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1_500);
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for `max_targets`. Deduplication keeps at most this many
/// distinct targets in memory, whatever the request expands to.
pub const MAX_TARGETS_CEILING: usize = 65_536;

/// Knobs for a discovery run, handed to the engine at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Largest number of distinct targets a single request may expand to.
    pub max_targets: usize,
    /// Time the ping tool is given to get a reply.
    ///
    /// The child process itself is killed one second after this elapses.
    pub probe_timeout: Duration,
    /// Bound on each forward and reverse lookup.
    pub dns_timeout: Duration,
    /// Number of targets probed at the same time. `1` is fully sequential.
    pub concurrency: usize,
    /// Disables PTR lookups for resolved addresses.
    pub reverse_dns: bool,
    pub platform: PingPlatform,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_targets: DEFAULT_MAX_TARGETS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            dns_timeout: DEFAULT_DNS_TIMEOUT,
            concurrency: 1,
            reverse_dns: true,
            platform: PingPlatform::current(),
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_targets == 0 || self.max_targets > MAX_TARGETS_CEILING {
            return Err(ConfigError::MaxTargets {
                value: self.max_targets,
                ceiling: MAX_TARGETS_CEILING,
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Concurrency);
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::Timeout { name: "probe_timeout" });
        }
        if self.dns_timeout.is_zero() {
            return Err(ConfigError::Timeout { name: "dns_timeout" });
        }
        Ok(())
    }

    /// Hard ceiling for a single ping invocation.
    pub fn probe_deadline(&self) -> Duration {
        self.probe_timeout + Duration::from_secs(1)
    }
}
