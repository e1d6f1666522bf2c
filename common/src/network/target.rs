//! # Discovery Targets
//!
//! Turns the loosely typed request payload into an ordered list of target
//! strings.
//!
//! A payload can carry:
//! * `targets`: a single string of hosts separated by commas and/or whitespace,
//!   or an array of strings.
//! * `range`: a dashed range such as `192.168.1.10-192.168.1.20`.
//! * `cidr`: a network such as `192.168.1.0/28`.
//!
//! Literal targets come first, then the range, then the CIDR block.
//! Deduplication is left to the caller.

use std::net::IpAddr;

use serde_json::{Map, Value};

use crate::error::{Field, ValidationError};
use crate::network::range::{self, IpRange};

/// A discovery request after JSON decoding, before expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryRequest {
    /// Trimmed, non-empty literal targets (IP addresses or hostnames).
    pub targets: Vec<String>,
    pub range: Option<String>,
    pub cidr: Option<String>,
}

/// One unit of requested work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// An IP address or a hostname, passed through untouched.
    Literal(String),
    /// The addresses of a dashed range.
    Range(IpRange),
    /// The usable host addresses of a CIDR block.
    Cidr(IpRange),
}

impl TargetSpec {
    /// Number of target strings this entry expands to.
    pub fn size(&self) -> u128 {
        match self {
            TargetSpec::Literal(_) => 1,
            TargetSpec::Range(range) | TargetSpec::Cidr(range) => range.size(),
        }
    }
}

impl DiscoveryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds targets from a free-form string (`"a, b c\nd"`).
    pub fn with_targets(mut self, raw: &str) -> Self {
        self.targets.extend(split_targets(raw));
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = non_blank(range.into());
        self
    }

    pub fn with_cidr(mut self, cidr: impl Into<String>) -> Self {
        self.cidr = non_blank(cidr.into());
        self
    }

    /// Decodes a raw request body. Anything that is not a JSON object is rejected.
    pub fn from_json_str(body: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(body).map_err(|_| body_must_be_json())?;
        Self::from_json(&value)
    }

    /// Decodes an already parsed payload.
    ///
    /// A `null` body counts as an empty payload. `targets` of an unexpected
    /// type is ignored, as are `null` and empty `range`/`cidr` values. A
    /// `range` or `cidr` that is present but not a string is rejected for that
    /// field.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let payload = match value {
            Value::Object(payload) => payload,
            Value::Null => return Ok(Self::default()),
            _ => return Err(body_must_be_json()),
        };

        Ok(Self {
            targets: normalize_targets(payload.get("targets")),
            range: optional_string(payload, Field::Range)?,
            cidr: optional_string(payload, Field::Cidr)?,
        })
    }

    /// Validates the range and CIDR fields and lays out the work in request order.
    pub fn specs(&self) -> Result<Vec<TargetSpec>, ValidationError> {
        let mut specs: Vec<TargetSpec> = self
            .targets
            .iter()
            .cloned()
            .map(TargetSpec::Literal)
            .collect();

        if let Some(range_value) = &self.range {
            let ip_range = range::parse_range(range_value.trim())
                .map_err(|e| ValidationError::new(Field::Range, e.to_string()))?;
            specs.push(TargetSpec::Range(ip_range));
        }

        if let Some(cidr_value) = &self.cidr {
            let hosts = range::cidr_hosts(cidr_value.trim())
                .map_err(|e| ValidationError::new(Field::Cidr, e.to_string()))?;
            specs.push(TargetSpec::Cidr(hosts));
        }

        Ok(specs)
    }
}

/// Lazily flattens specs into target strings, preserving order.
pub fn flatten(specs: Vec<TargetSpec>) -> impl Iterator<Item = String> {
    specs.into_iter().flat_map(|spec| -> Box<dyn Iterator<Item = String>> {
        match spec {
            TargetSpec::Literal(target) => Box::new(std::iter::once(target)),
            TargetSpec::Range(ip_range) | TargetSpec::Cidr(ip_range) => {
                Box::new(ip_range.into_iter().map(|ip: IpAddr| ip.to_string()))
            }
        }
    })
}

/// Splits a free-form target string on commas and whitespace.
pub fn split_targets(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes the `targets` field, whatever shape it arrived in.
pub fn normalize_targets(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::String(s)) => split_targets(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn optional_string(payload: &Map<String, Value>, field: Field) -> Result<Option<String>, ValidationError> {
    match payload.get(field.as_str()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_blank(s.clone())),
        Some(_) => Err(ValidationError::new(
            field,
            format!("{} must be a string", capitalize(field.as_str())),
        )),
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn body_must_be_json() -> ValidationError {
    ValidationError::new(Field::Body, "Request body must be JSON")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
