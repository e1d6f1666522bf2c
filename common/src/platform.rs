//! Platform specific `ping` syntax.
//!
//! The flags and, more annoyingly, the timeout units differ between the
//! Windows, BSD/macOS and iputils flavours of the tool.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PingPlatform {
    Linux,
    MacOs,
    Windows,
}

impl PingPlatform {
    /// The flavour matching the target this binary was built for.
    ///
    /// Anything that is neither Windows nor macOS is assumed to ship an
    /// iputils/busybox compatible `ping`.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            PingPlatform::Windows
        } else if cfg!(target_os = "macos") {
            PingPlatform::MacOs
        } else {
            PingPlatform::Linux
        }
    }

    pub fn count_flag(&self) -> &'static str {
        match self {
            PingPlatform::Windows => "-n",
            _ => "-c",
        }
    }

    pub fn timeout_flag(&self) -> &'static str {
        match self {
            PingPlatform::Windows => "-w",
            _ => "-W",
        }
    }

    /// Renders `timeout` in the unit this flavour expects after [`Self::timeout_flag`].
    ///
    /// Windows and macOS take milliseconds (truncated). Linux takes whole
    /// seconds, rounded half to even and never below one.
    pub fn timeout_value(&self, timeout: Duration) -> String {
        match self {
            PingPlatform::Windows | PingPlatform::MacOs => {
                (timeout.as_secs_f64() * 1000.0).trunc().to_string()
            }
            PingPlatform::Linux => {
                let secs = timeout.as_secs_f64().round_ties_even().max(1.0);
                format!("{}", secs as u64)
            }
        }
    }
}

impl Default for PingPlatform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for PingPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PingPlatform::Linux => "linux",
            PingPlatform::MacOs => "macos",
            PingPlatform::Windows => "windows",
        };
        f.write_str(name)
    }
}

impl FromStr for PingPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(PingPlatform::Linux),
            "macos" | "darwin" | "osx" => Ok(PingPlatform::MacOs),
            "windows" | "win" => Ok(PingPlatform::Windows),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}
