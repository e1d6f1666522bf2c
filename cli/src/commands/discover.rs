use std::time::{Duration, Instant};

use colored::*;
use probr_common::config::DiscoveryConfig;
use probr_common::network::host::{DiscoveryEntry, DiscoveryReport};
use probr_common::network::target::DiscoveryRequest;
use probr_common::response::{success_response, validation_error_response};
use probr_common::success;
use probr_core::DiscoveryService;
use tokio_util::sync::CancellationToken;

use crate::commands::DiscoverArgs;
use crate::terminal::{colors, format, print, spinner::DiscoverySpinner};

pub async fn discover(
    args: DiscoverArgs,
    cfg: DiscoveryConfig,
    quiet: u8,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let request = build_request(&args);
    let service = DiscoveryService::system(cfg);

    let targets = match service.plan(&request) {
        Ok(targets) => targets,
        Err(err) => {
            if args.json {
                print::json(&validation_error_response(&err))?;
            }
            anyhow::bail!("{err}");
        }
    };

    if args.json {
        let report = service.run_planned(&targets, cancel, None).await;
        return print::json(&success_response(&report));
    }

    if quiet == 0 {
        print::header("getting ready for discovery");
    }
    success!("{} target(s) parsed successfully", targets.len());

    let start_time: Instant = Instant::now();
    let report = {
        let spinner = DiscoverySpinner::start(targets.len());
        let on_progress = |done: usize| spinner.report_progress(done);
        service
            .run_planned(&targets, cancel, Some(&on_progress))
            .await
    };

    discovery_ends(&report, start_time.elapsed(), quiet);
    Ok(())
}

fn build_request(args: &DiscoverArgs) -> DiscoveryRequest {
    let mut request = DiscoveryRequest::new().with_targets(&args.targets.join(" "));
    if let Some(range) = &args.range {
        request = request.with_range(range.as_str());
    }
    if let Some(cidr) = &args.cidr {
        request = request.with_cidr(cidr.as_str());
    }
    request
}

fn discovery_ends(report: &DiscoveryReport, total_time: Duration, quiet: u8) {
    if quiet < 2 {
        print::header("Network Discovery");
        print_entries(&report.results);
    }
    print_summary(report, total_time);
}

fn print_entries(entries: &[DiscoveryEntry]) {
    for (idx, entry) in entries.iter().enumerate() {
        print::tree_head(idx, format::entry_title(entry));
        print::as_tree_one_level(format::entry_to_details(entry));
        if idx + 1 != entries.len() {
            print::blank();
        }
    }
}

fn print_summary(report: &DiscoveryReport, total_time: Duration) {
    let reachable: ColoredString = format!("{} reachable", report.summary.reachable)
        .bold()
        .green();
    let requested: ColoredString = report.summary.requested.to_string().bold();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("Discovery Complete: {reachable} of {requested} in {total_time}")
            .color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&output.to_string());
}
