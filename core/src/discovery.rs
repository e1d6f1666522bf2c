//! # Network Discovery Service
//!
//! Runs a discovery request end to end:
//!
//! 1. **Parse & expand**: literal targets, then the range, then the CIDR block.
//! 2. **Deduplicate**: first occurrence wins, order is kept.
//! 3. **Guardrail**: reject empty requests and requests over `max_targets`.
//! 4. **Probe**: per target resolve → ping → reverse lookup.
//! 5. **Summarize**: count reachable entries.
//!
//! Steps 1-3 fail with a [`ValidationError`] before anything touches the
//! network. Step 4 never fails; each target ends up as exactly one
//! [`DiscoveryEntry`], whatever went wrong for it.

use std::collections::HashSet;
use std::net::IpAddr;

use futures::stream::{self, StreamExt};
use probr_common::config::{DiscoveryConfig, MAX_TARGETS_CEILING};
use probr_common::error::{Field, ValidationError};
use probr_common::network::host::{DiscoveryEntry, DiscoveryReport, ResolvedTarget};
use probr_common::network::target::{self, DiscoveryRequest, TargetSpec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::prober::{Prober, SystemPing};
use crate::resolver::{NameResolver, SystemResolver};

/// Called with the number of finished targets, in result order.
pub type ProgressCallback<'a> = &'a (dyn Fn(usize) + Send + Sync);

/// Orchestrates discovery over an injected resolver and prober.
pub struct DiscoveryService {
    config: DiscoveryConfig,
    resolver: Box<dyn NameResolver>,
    prober: Box<dyn Prober>,
}

impl DiscoveryService {
    pub fn new(
        config: DiscoveryConfig,
        resolver: Box<dyn NameResolver>,
        prober: Box<dyn Prober>,
    ) -> Self {
        Self {
            config,
            resolver,
            prober,
        }
    }

    /// Wires the OS resolver and the OS `ping` according to `config`.
    pub fn system(config: DiscoveryConfig) -> Self {
        let resolver: Box<dyn NameResolver> = if config.reverse_dns {
            Box::new(SystemResolver::new(config.dns_timeout))
        } else {
            Box::new(SystemResolver::forward_only(config.dns_timeout))
        };
        let prober = Box::new(SystemPing::from_config(&config));
        Self::new(config, resolver, prober)
    }

    /// Expands, deduplicates and guards a request, returning the targets to probe.
    ///
    /// Expansion is pulled lazily and stops once [`MAX_TARGETS_CEILING`]
    /// distinct targets have been seen, so a huge IPv6 range costs no more
    /// than a large one.
    pub fn plan(&self, request: &DiscoveryRequest) -> Result<Vec<String>, ValidationError> {
        let max = self.config.max_targets;
        let specs = request.specs()?;

        let candidates: u128 = specs
            .iter()
            .map(TargetSpec::size)
            .fold(0, u128::saturating_add);
        debug!("Expanding {candidates} candidate target(s)");

        let capacity = usize::try_from(candidates).unwrap_or(usize::MAX).min(max);
        let mut seen: HashSet<String> = HashSet::new();
        let mut unique: Vec<String> = Vec::with_capacity(capacity);
        let mut saturated = false;

        for candidate in target::flatten(specs) {
            if seen.contains(&candidate) {
                continue;
            }
            if seen.len() == MAX_TARGETS_CEILING {
                saturated = true;
                break;
            }
            if unique.len() < max {
                unique.push(candidate.clone());
            }
            seen.insert(candidate);
        }

        let count = seen.len();
        if count == 0 {
            return Err(ValidationError::new(
                Field::Targets,
                "Provide at least one IP/hostname or range",
            ));
        }
        if saturated {
            return Err(too_many(format!("more than {MAX_TARGETS_CEILING}"), max));
        }
        if count > max {
            return Err(too_many(count.to_string(), max));
        }

        Ok(unique)
    }

    /// Resolves, probes and reverse-resolves a single target.
    ///
    /// An unresolvable target is returned without probing. Once an address is
    /// known the reverse lookup runs whatever the probe said.
    pub async fn discover_target(&self, target: &str) -> DiscoveryEntry {
        let Some(ip) = self.resolver.resolve(target).await else {
            debug!("Unable to resolve {target}");
            return DiscoveryEntry::unresolved(target);
        };
        self.inspect(target, ip).await
    }

    async fn inspect(&self, target: &str, ip: IpAddr) -> DiscoveryEntry {
        let probe = self.prober.probe(ip).await;
        debug!(
            "{target} ({ip}) reachable={} rtt={:?}",
            probe.reachable, probe.round_trip_ms
        );

        let hostname = if self.config.reverse_dns {
            self.resolver.reverse(ip).await
        } else {
            None
        };

        DiscoveryEntry::new(ResolvedTarget::new(target, ip, hostname), probe)
    }

    pub async fn run(&self, request: &DiscoveryRequest) -> Result<DiscoveryReport, ValidationError> {
        self.run_with_cancel(request, &CancellationToken::new(), None)
            .await
    }

    /// Like [`Self::run`], but stops starting new targets once `cancel` fires.
    pub async fn run_with_cancel(
        &self,
        request: &DiscoveryRequest,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<DiscoveryReport, ValidationError> {
        let targets = self.plan(request)?;
        Ok(self.run_planned(&targets, cancel, on_progress).await)
    }

    /// Discovers targets already returned by [`Self::plan`], in order.
    ///
    /// Targets that were never started, or were interrupted, are reported as
    /// cancelled so the report still has one entry per target.
    pub async fn run_planned(
        &self,
        targets: &[String],
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> DiscoveryReport {
        info!("Probing {} target(s)", targets.len());

        let mut finished: usize = 0;
        let results: Vec<DiscoveryEntry> = stream::iter(targets.iter())
            .map(|target| self.discover_or_cancel(target, cancel))
            .buffered(self.config.concurrency.max(1))
            .inspect(|_| {
                finished += 1;
                if let Some(callback) = on_progress {
                    callback(finished);
                }
            })
            .collect()
            .await;

        let report = DiscoveryReport::new(results);
        debug!(
            "Discovery finished: {}/{} reachable",
            report.summary.reachable, report.summary.requested
        );
        report
    }

    async fn discover_or_cancel(&self, target: &str, cancel: &CancellationToken) -> DiscoveryEntry {
        if cancel.is_cancelled() {
            return DiscoveryEntry::cancelled(ResolvedTarget::unresolved(target));
        }

        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return DiscoveryEntry::cancelled(ResolvedTarget::unresolved(target));
            }
            ip = self.resolver.resolve(target) => ip,
        };
        let Some(ip) = resolved else {
            debug!("Unable to resolve {target}");
            return DiscoveryEntry::unresolved(target);
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => DiscoveryEntry::cancelled(ResolvedTarget::new(target, ip, None)),
            entry = self.inspect(target, ip) => entry,
        }
    }
}

fn too_many(requested: String, max: usize) -> ValidationError {
    ValidationError::new(
        Field::Targets,
        format!("Too many targets requested ({requested}). Limit is {max}."),
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
