//! # Reachability Probing
//!
//! A [`Prober`] answers one question about one address: does it reply to an
//! ICMP echo, and how fast?
//!
//! [`SystemPing`] shells out to the operating system's `ping`, which is the only
//! way to send ICMP without raw-socket privileges. The command line and the
//! output format vary by platform, so building the command ([`ping_command`])
//! and reading its output ([`parse_rtt`], [`classify`]) are pure functions
//! that can be tested without a network.

use std::io;
use std::net::IpAddr;
use std::process::{Output, Stdio};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use probr_common::config::DiscoveryConfig;
use probr_common::network::host::ProbeResult;
use probr_common::platform::PingPlatform;
use regex::Regex;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

const PING_PROGRAM: &str = "ping";
const MAX_ERROR_CHARS: usize = 200;
const NO_RESPONSE: &str = "No response";

static RTT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn rtt_pattern() -> &'static Regex {
    RTT_PATTERN.get_or_init(|| Regex::new(r"time[=<]([\d.]+)\s*ms").expect("valid RTT pattern"))
}

/// Sends a single reachability probe.
///
/// Implementations never fail: every problem is folded into an unreachable
/// [`ProbeResult`] so one bad target cannot take down a batch.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, ip: IpAddr) -> ProbeResult;
}

/// Reasons a `ping` invocation produced no verdict.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Ping utility not available on server")]
    Unavailable,
    #[error("Ping timed out")]
    TimedOut,
    #[error("{0}")]
    Spawn(#[source] io::Error),
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ProbeError::Unavailable,
            _ => ProbeError::Spawn(err),
        }
    }
}

/// Probes through the platform `ping` binary, one echo request per call.
#[derive(Debug, Clone)]
pub struct SystemPing {
    program: String,
    platform: PingPlatform,
    timeout: Duration,
    deadline: Duration,
}

impl SystemPing {
    pub fn new(platform: PingPlatform, timeout: Duration) -> Self {
        Self {
            program: PING_PROGRAM.to_string(),
            platform,
            timeout,
            deadline: timeout + Duration::from_secs(1),
        }
    }

    pub fn from_config(cfg: &DiscoveryConfig) -> Self {
        Self::new(cfg.platform, cfg.probe_timeout)
    }

    /// Runs `program` instead of `ping`, keeping the platform argument syntax.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(&self, ip: IpAddr) -> Result<Output, ProbeError> {
        let args = ping_command(self.platform, &ip.to_string(), self.timeout);
        debug!("Running {} {}", self.program, args.join(" "));

        let mut command = Command::new(&self.program);
        command.args(&args);
        output_within(command, self.deadline).await
    }
}

/// Runs `command` to completion, killing it if `deadline` passes first.
async fn output_within(mut command: Command, deadline: Duration) -> Result<Output, ProbeError> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    match tokio::time::timeout(deadline, child.wait_with_output()).await {
        Ok(output) => Ok(output?),
        Err(_elapsed) => Err(ProbeError::TimedOut),
    }
}

#[async_trait]
impl Prober for SystemPing {
    async fn probe(&self, ip: IpAddr) -> ProbeResult {
        match self.run(ip).await {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                classify(output.status.success(), &text)
            }
            Err(err @ ProbeError::Spawn(_)) => {
                warn!("Ping failed for {ip}: {err}");
                ProbeResult::unreachable(err.to_string())
            }
            Err(err) => {
                debug!("Ping failed for {ip}: {err}");
                ProbeResult::unreachable(err.to_string())
            }
        }
    }
}

/// Arguments for a single-echo `ping` (program name excluded).
pub fn ping_command(platform: PingPlatform, target: &str, timeout: Duration) -> Vec<String> {
    vec![
        platform.count_flag().to_string(),
        "1".to_string(),
        platform.timeout_flag().to_string(),
        platform.timeout_value(timeout),
        target.to_string(),
    ]
}

/// First `time=<n> ms` / `time<<n>ms` value in the output.
pub fn parse_rtt(output: &str) -> Option<f64> {
    rtt_pattern()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Turns an exit status and the captured output into a [`ProbeResult`].
///
/// Success is decided by the exit status alone. Output only provides the
/// RTT on success and the error detail on failure.
pub fn classify(success: bool, output: &str) -> ProbeResult {
    if success {
        ProbeResult::reachable(parse_rtt(output))
    } else {
        ProbeResult::unreachable(failure_detail(output))
    }
}

fn failure_detail(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return NO_RESPONSE.to_string();
    }
    trimmed.chars().take(MAX_ERROR_CHARS).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LINUX_REPLY: &str = "PING 10.0.0.1 (10.0.0.1) 56(84) bytes of data.\n\
        64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.318 ms\n\n\
        --- 10.0.0.1 ping statistics ---\n\
        1 packets transmitted, 1 received, 0% packet loss, time 0ms\n\
        rtt min/avg/max/mdev = 0.318/0.318/0.318/0.000 ms\n";

    const WINDOWS_REPLY: &str = "Pinging 10.0.0.1 with 32 bytes of data:\r\n\
        Reply from 10.0.0.1: bytes=32 time<1ms TTL=128\r\n";

    const LINUX_TIMEOUT: &str = "PING 10.0.0.9 (10.0.0.9) 56(84) bytes of data.\n\n\
        --- 10.0.0.9 ping statistics ---\n\
        1 packets transmitted, 0 received, 100% packet loss, time 0ms\n";

    #[test]
    fn command_per_platform() {
        let timeout = Duration::from_millis(1500);
        assert_eq!(
            ping_command(PingPlatform::Linux, "10.0.0.1", timeout),
            vec!["-c", "1", "-W", "2", "10.0.0.1"]
        );
        assert_eq!(
            ping_command(PingPlatform::MacOs, "10.0.0.1", timeout),
            vec!["-c", "1", "-W", "1500", "10.0.0.1"]
        );
        assert_eq!(
            ping_command(PingPlatform::Windows, "10.0.0.1", timeout),
            vec!["-n", "1", "-w", "1500", "10.0.0.1"]
        );
    }

    #[test]
    fn parses_rtt_from_common_outputs() {
        assert_eq!(parse_rtt(LINUX_REPLY), Some(0.318));
        assert_eq!(parse_rtt(WINDOWS_REPLY), Some(1.0));
        assert_eq!(parse_rtt("64 bytes from ::1: icmp_seq=0 hlim=64 time=12.5 ms"), Some(12.5));
        assert_eq!(parse_rtt(LINUX_TIMEOUT), None);
        assert_eq!(parse_rtt("time=1.2.3 ms"), None);
    }

    #[test]
    fn success_without_rtt_is_still_reachable() {
        let result = classify(true, "something localized");
        assert_eq!(result, ProbeResult::reachable(None));
    }

    #[test]
    fn exit_status_wins_over_output() {
        let result = classify(false, LINUX_REPLY);
        assert!(!result.reachable);
        assert_eq!(result.round_trip_ms, None);
        assert!(result.error.unwrap().starts_with("PING 10.0.0.1"));
    }

    #[test]
    fn failure_detail_is_truncated() {
        let long = format!("  {}  ", "x".repeat(500));
        let result = classify(false, &long);
        assert_eq!(result.error.unwrap(), "x".repeat(200));
    }

    #[test]
    fn empty_failure_output_means_no_response() {
        assert_eq!(classify(false, " \n "), ProbeResult::unreachable("No response"));
    }

    #[test]
    fn io_errors_map_to_probe_errors() {
        let missing = ProbeError::from(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(missing.to_string(), "Ping utility not available on server");

        let denied = ProbeError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(denied.to_string(), "denied");
        assert_eq!(ProbeError::TimedOut.to_string(), "Ping timed out");
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let prober = SystemPing::new(PingPlatform::Linux, Duration::from_millis(100))
            .with_program("probr-definitely-not-a-ping-binary");
        let result = prober.probe(IpAddr::V4(Ipv4Addr::LOCALHOST)).await;
        assert_eq!(
            result,
            ProbeResult::unreachable("Ping utility not available on server")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_child_is_killed_at_deadline() {
        let mut command = Command::new("sleep");
        command.arg("5");
        let started = std::time::Instant::now();
        let result = output_within(command, Duration::from_millis(200)).await;
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(matches!(result, Err(ProbeError::TimedOut)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_output_is_captured() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo time=3.5 ms; echo oops >&2; exit 1"]);
        let output = output_within(command, Duration::from_secs(5)).await.unwrap();
        assert!(!output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "time=3.5 ms\n");
        assert_eq!(String::from_utf8_lossy(&output.stderr), "oops\n");
    }

    #[tokio::test]
    #[ignore]
    async fn loopback_replies() {
        let prober = SystemPing::new(PingPlatform::current(), Duration::from_millis(1500));
        let result = prober.probe(IpAddr::V4(Ipv4Addr::LOCALHOST)).await;
        assert!(result.reachable, "{result:?}");
    }
}
