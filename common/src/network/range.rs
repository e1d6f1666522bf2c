//! # Address Ranges
//!
//! Dashed ranges (`10.0.0.1-10.0.0.20`) and CIDR blocks (`10.0.0.0/28`) both
//! collapse into an [`IpRange`]: an inclusive, single-family span of addresses.
//!
//! Nothing is materialized here. A range spanning most of the IPv6 space is
//! just two addresses; the caller decides how many items it is willing to pull.

use std::iter::FusedIterator;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;

use crate::error::RangeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    start_addr: IpAddr,
    end_addr: IpAddr,
}

impl IpRange {
    /// Builds an inclusive range, rejecting mixed families and descending bounds.
    pub fn new(start_addr: IpAddr, end_addr: IpAddr) -> Result<Self, RangeError> {
        if start_addr.is_ipv4() != end_addr.is_ipv4() {
            return Err(RangeError::FamilyMismatch);
        }
        if to_u128(end_addr) < to_u128(start_addr) {
            return Err(RangeError::Descending);
        }
        Ok(Self {
            start_addr,
            end_addr,
        })
    }

    /// Number of addresses in the range, saturating at `u128::MAX` for `::/0`.
    pub fn size(&self) -> u128 {
        (to_u128(self.end_addr) - to_u128(self.start_addr)).saturating_add(1)
    }

    pub fn iter(&self) -> IpRangeIter {
        IpRangeIter {
            v4: self.start_addr.is_ipv4(),
            next: to_u128(self.start_addr),
            last: to_u128(self.end_addr),
            done: false,
        }
    }
}

impl IntoIterator for IpRange {
    type Item = IpAddr;
    type IntoIter = IpRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending walk over an [`IpRange`].
#[derive(Debug, Clone)]
pub struct IpRangeIter {
    v4: bool,
    next: u128,
    last: u128,
    done: bool,
}

impl Iterator for IpRangeIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.next;
        if current == self.last {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some(from_u128(current, self.v4))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match usize::try_from(self.last - self.next) {
            Ok(rest) => match rest.checked_add(1) {
                Some(len) => (len, Some(len)),
                None => (usize::MAX, None),
            },
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for IpRangeIter {}

/// Parses a dashed `start-end` range of full addresses.
///
/// Splits on the first `-`; both halves are trimmed.
pub fn parse_range(s: &str) -> Result<IpRange, RangeError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Err(RangeError::MissingSeparator);
    };

    let start_addr = parse_addr(start_str.trim())?;
    let end_addr = parse_addr(end_str.trim())?;

    IpRange::new(start_addr, end_addr)
}

/// Parses CIDR notation and returns the usable host span.
///
/// Host bits may be set (`10.0.0.7/24` is `10.0.0.0/24`) and a bare address is
/// a single-address network.
///
/// * IPv4 drops the network and broadcast addresses, except for /31 (both
///   addresses) and /32 (the one address).
/// * IPv6 drops the subnet-router anycast address, except for /127 (both
///   addresses) and /128 (the one address).
pub fn cidr_hosts(s: &str) -> Result<IpRange, RangeError> {
    let network = s
        .parse::<IpNetwork>()
        .map_err(|_| RangeError::InvalidNetwork(s.to_string()))?;

    let (first, last, host_bits) = match network {
        IpNetwork::V4(net) => (
            u32::from(net.network()) as u128,
            u32::from(net.broadcast()) as u128,
            32 - net.prefix(),
        ),
        IpNetwork::V6(net) => {
            let first = u128::from(net.network());
            let host_bits = 128 - net.prefix();
            let mask = if host_bits == 128 { u128::MAX } else { (1u128 << host_bits) - 1 };
            (first, first | mask, host_bits)
        }
    };

    let (start, end) = match (network, host_bits) {
        (_, 0) | (_, 1) => (first, last),
        (IpNetwork::V4(_), _) => (first + 1, last - 1),
        (IpNetwork::V6(_), _) => (first + 1, last),
    };

    let v4 = network.is_ipv4();
    IpRange::new(from_u128(start, v4), from_u128(end, v4))
}

fn parse_addr(s: &str) -> Result<IpAddr, RangeError> {
    s.parse::<IpAddr>()
        .map_err(|_| RangeError::InvalidAddress(s.to_string()))
}

fn to_u128(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(v4) as u128,
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn from_u128(value: u128, v4: bool) -> IpAddr {
    if v4 {
        IpAddr::V4(Ipv4Addr::from(value as u32))
    } else {
        IpAddr::V6(Ipv6Addr::from(value))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
