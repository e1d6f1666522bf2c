pub mod discover;
pub mod request;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use probr_common::config::DiscoveryConfig;
use probr_common::platform::PingPlatform;

#[derive(Parser)]
#[command(name = "probr", version)]
#[command(about = "Bounded ICMP discovery for hosts, ranges and subnets.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe hosts, a dashed range and/or a CIDR block
    #[command(alias = "d")]
    Discover(DiscoverArgs),
    /// Answer a JSON discovery request read from a file or stdin
    #[command(alias = "r")]
    Request {
        /// Payload file; stdin when omitted or "-"
        file: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// IP addresses or hostnames, separated by spaces or commas
    pub targets: Vec<String>,

    /// Dashed range of full addresses, e.g. 192.168.1.10-192.168.1.20
    #[arg(short, long)]
    pub range: Option<String>,

    /// Network in CIDR notation, e.g. 192.168.1.0/28
    #[arg(short, long)]
    pub cidr: Option<String>,

    /// Print the JSON response instead of the result tree
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct GlobalOptions {
    /// Seconds to wait for each echo reply
    #[arg(long, global = true, value_name = "SECS", default_value_t = 1.5)]
    pub timeout: f64,

    /// Seconds allowed for each forward or reverse DNS lookup
    #[arg(long, global = true, value_name = "SECS", default_value_t = 2.0)]
    pub dns_timeout: f64,

    /// Largest number of distinct targets a request may expand to
    #[arg(long, global = true, value_name = "N", default_value_t = 256)]
    pub max_targets: usize,

    /// Number of targets probed at the same time
    #[arg(short = 'j', long, global = true, value_name = "N", default_value_t = 1)]
    pub concurrency: usize,

    /// Skip reverse DNS lookups
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Ping syntax to use: linux, macos or windows (detected by default)
    #[arg(long, global = true)]
    pub platform: Option<PingPlatform>,

    /// Less output; repeat to print only the summary
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl GlobalOptions {
    pub fn to_config(&self) -> anyhow::Result<DiscoveryConfig> {
        let cfg = DiscoveryConfig {
            max_targets: self.max_targets,
            probe_timeout: Duration::try_from_secs_f64(self.timeout)
                .context("invalid --timeout")?,
            dns_timeout: Duration::try_from_secs_f64(self.dns_timeout)
                .context("invalid --dns-timeout")?,
            concurrency: self.concurrency,
            reverse_dns: !self.no_dns,
            platform: self.platform.unwrap_or_else(PingPlatform::current),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
