use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use probr_common::config::DiscoveryConfig;
use probr_common::network::target::DiscoveryRequest;
use probr_common::response::{success_response, validation_error_response};
use probr_core::DiscoveryService;
use tokio_util::sync::CancellationToken;

use crate::terminal::print;

/// Answers one JSON discovery payload with a JSON envelope on stdout.
///
/// Validation failures print the error envelope and exit non-zero.
pub async fn request(
    file: Option<PathBuf>,
    cfg: DiscoveryConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let body: String = read_body(file)?;
    let service = DiscoveryService::system(cfg);

    let outcome = match DiscoveryRequest::from_json_str(&body) {
        Ok(request) => service.run_with_cancel(&request, cancel, None).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(report) => print::json(&success_response(&report)),
        Err(err) => {
            print::json(&validation_error_response(&err))?;
            anyhow::bail!("request rejected: {err}");
        }
    }
}

fn read_body(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("reading request from stdin")?;
            Ok(body)
        }
    }
}
