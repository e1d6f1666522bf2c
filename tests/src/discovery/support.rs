//! Deterministic resolver and prober for driving the service end to end.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use probr_common::config::DiscoveryConfig;
use probr_common::network::host::ProbeResult;
use probr_core::DiscoveryService;
use probr_core::prober::Prober;
use probr_core::resolver::NameResolver;

/// Every probe the service sent, in order.
#[derive(Clone, Default)]
pub struct ProbeLog(Arc<Mutex<Vec<IpAddr>>>);

impl ProbeLog {
    pub fn probed(&self) -> Vec<IpAddr> {
        self.0.lock().unwrap().clone()
    }
}

/// A small fake network: a hosts table, a PTR table and a set of live addresses.
#[derive(Default)]
pub struct FakeNetwork {
    hosts: HashMap<String, IpAddr>,
    ptr: HashMap<IpAddr, String>,
    live: HashMap<IpAddr, f64>,
}

impl FakeNetwork {
    pub fn host(mut self, name: &str, ip: &str) -> Self {
        self.hosts.insert(name.to_string(), ip.parse().unwrap());
        self
    }

    pub fn ptr(mut self, ip: &str, name: &str) -> Self {
        self.ptr.insert(ip.parse().unwrap(), name.to_string());
        self
    }

    pub fn live(mut self, ip: &str, rtt_ms: f64) -> Self {
        self.live.insert(ip.parse().unwrap(), rtt_ms);
        self
    }

    pub fn service(self, config: DiscoveryConfig) -> (DiscoveryService, ProbeLog) {
        let log = ProbeLog::default();
        let network = Arc::new(self);
        let svc = DiscoveryService::new(
            config,
            Box::new(TableResolver(network.clone())),
            Box::new(TableProber {
                network,
                log: log.clone(),
            }),
        );
        (svc, log)
    }
}

struct TableResolver(Arc<FakeNetwork>);

#[async_trait]
impl NameResolver for TableResolver {
    async fn resolve(&self, target: &str) -> Option<IpAddr> {
        target
            .parse()
            .ok()
            .or_else(|| self.0.hosts.get(target).copied())
    }

    async fn reverse(&self, ip: IpAddr) -> Option<String> {
        self.0.ptr.get(&ip).cloned()
    }
}

struct TableProber {
    network: Arc<FakeNetwork>,
    log: ProbeLog,
}

#[async_trait]
impl Prober for TableProber {
    async fn probe(&self, ip: IpAddr) -> ProbeResult {
        self.log.0.lock().unwrap().push(ip);
        match self.network.live.get(&ip) {
            Some(rtt) => ProbeResult::reachable(Some(*rtt)),
            None => ProbeResult::unreachable("No response"),
        }
    }
}
