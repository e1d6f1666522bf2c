//! Forward and reverse name resolution for discovery targets.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf;
use tracing::{debug, warn};

/// Maps targets to addresses and addresses back to names.
///
/// Both directions degrade to `None` instead of failing; the caller decides
/// what a missing answer means.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Literal addresses come back unchanged; hostnames resolve to their first IPv4 address.
    async fn resolve(&self, target: &str) -> Option<IpAddr>;

    /// PTR lookup, without the trailing dot.
    async fn reverse(&self, ip: IpAddr) -> Option<String>;
}

/// Parses `target` as an IPv4 or IPv6 literal.
pub fn parse_literal(target: &str) -> Option<IpAddr> {
    target.parse::<IpAddr>().ok()
}

/// Uses the operating system resolver for forward lookups and the system DNS
/// configuration for PTR queries.
pub struct SystemResolver {
    lookup_timeout: Duration,
    ptr: Option<TokioAsyncResolver>,
}

impl SystemResolver {
    pub fn new(lookup_timeout: Duration) -> Self {
        let ptr = match system_conf::read_system_conf() {
            Ok((config, opts)) => Some(build_resolver(config, opts, lookup_timeout)),
            Err(e) => {
                warn!("Reverse DNS disabled, unable to read system resolver configuration: {e}");
                None
            }
        };
        Self {
            lookup_timeout,
            ptr,
        }
    }

    /// Forward lookups only; [`NameResolver::reverse`] always answers `None`.
    pub fn forward_only(lookup_timeout: Duration) -> Self {
        Self {
            lookup_timeout,
            ptr: None,
        }
    }
}

fn build_resolver(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> TokioAsyncResolver {
    opts.timeout = timeout;
    opts.attempts = 1;
    TokioAsyncResolver::tokio(config, opts)
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn resolve(&self, target: &str) -> Option<IpAddr> {
        if let Some(ip) = parse_literal(target) {
            return Some(ip);
        }

        let lookup = tokio::net::lookup_host((target, 0));
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(mut addrs)) => addrs.find(|addr| addr.is_ipv4()).map(|addr| addr.ip()),
            Ok(Err(e)) => {
                debug!("Resolution error for {target}: {e}");
                None
            }
            Err(_elapsed) => {
                debug!("Resolution of {target} timed out");
                None
            }
        }
    }

    async fn reverse(&self, ip: IpAddr) -> Option<String> {
        let resolver = self.ptr.as_ref()?;
        let lookup = resolver.reverse_lookup(ip);
        let names = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(names)) => names,
            Ok(Err(e)) => {
                debug!("Reverse lookup failed for {ip}: {e}");
                return None;
            }
            Err(_elapsed) => {
                debug!("Reverse lookup timed out for {ip}");
                return None;
            }
        };

        names
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
            .filter(|name| !name.is_empty())
    }
}
