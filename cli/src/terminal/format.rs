use std::net::IpAddr;

use colored::*;
use probr_common::network::host::DiscoveryEntry;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// Key/value rows describing one discovery entry.
pub fn entry_to_details(entry: &DiscoveryEntry) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if entry.target.canonical_ip.as_deref() != Some(entry.input()) {
        details.push(("Input".to_string(), entry.input().normal()));
    }

    if let Some(ip) = &entry.target.canonical_ip {
        details.push(ip_to_detail(ip));
    }

    details.push(status_to_detail(entry));

    if let Some(rtt) = entry.probe.round_trip_ms {
        details.push(("RTT".to_string(), format!("{rtt:.3} ms").color(colors::ACCENT)));
    }

    if let Some(error) = &entry.probe.error {
        let first_line = error.lines().next().unwrap_or_default();
        details.push(("Error".to_string(), first_line.color(colors::MUTED)));
    }

    details
}

/// Display name for the tree head: PTR name, then input.
pub fn entry_title(entry: &DiscoveryEntry) -> &str {
    entry.target.hostname.as_deref().unwrap_or(entry.input())
}

fn ip_to_detail(ip: &str) -> Detail {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => ("IPv6".to_string(), ip.color(colors::IPV6_ADDR)),
        _ => ("IPv4".to_string(), ip.color(colors::IPV4_ADDR)),
    }
}

fn status_to_detail(entry: &DiscoveryEntry) -> Detail {
    let value = if entry.is_reachable() {
        "reachable".color(colors::REACHABLE).bold()
    } else {
        "unreachable".color(colors::UNREACHABLE)
    };
    ("Status".to_string(), value)
}
