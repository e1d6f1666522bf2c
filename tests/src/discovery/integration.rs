#![cfg(test)]
use std::net::IpAddr;
use std::time::Duration;

use probr_common::config::DiscoveryConfig;
use probr_common::network::host::DiscoveryReport;
use probr_common::network::target::DiscoveryRequest;
use probr_common::response::{success_response, validation_error_response};
use probr_core::DiscoveryService;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::support::FakeNetwork;

fn lab() -> FakeNetwork {
    FakeNetwork::default()
        .host("nas.lan", "192.168.1.20")
        .ptr("192.168.1.1", "router.lan")
        .ptr("192.168.1.20", "nas.lan")
        .live("192.168.1.1", 0.41)
        .live("192.168.1.2", 3.0)
        .live("192.168.1.20", 1.2)
}

/// Runs one raw request body the way an HTTP handler would and returns the envelope.
async fn handle(svc: &DiscoveryService, body: &str) -> Value {
    let outcome = match DiscoveryRequest::from_json_str(body) {
        Ok(request) => svc.run(&request).await,
        Err(err) => Err(err),
    };
    match outcome {
        Ok(report) => serde_json::to_value(success_response(report)).unwrap(),
        Err(err) => serde_json::to_value(validation_error_response(&err)).unwrap(),
    }
}

#[tokio::test]
async fn cidr_skips_network_and_broadcast() {
    let (svc, log) = lab().service(DiscoveryConfig::default());

    let envelope = handle(&svc, r#"{"cidr": "192.168.1.0/30"}"#).await;

    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["data"]["summary"], json!({ "requested": 2, "reachable": 2 }));
    let inputs: Vec<&str> = envelope["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["input"].as_str().unwrap())
        .collect();
    assert_eq!(inputs, vec!["192.168.1.1", "192.168.1.2"]);
    assert_eq!(log.probed().len(), 2);
}

#[tokio::test]
async fn mixed_request_keeps_input_order_and_shapes() {
    let (svc, log) = lab().service(DiscoveryConfig::default());

    let envelope = handle(
        &svc,
        r#"{"targets": "nas.lan, bad..hostname 192.168.1.1", "range": "192.168.1.1-192.168.1.3"}"#,
    )
    .await;

    let results = &envelope["data"]["results"];
    assert_eq!(
        results[0],
        json!({
            "input": "nas.lan",
            "ip": "192.168.1.20",
            "hostname": "nas.lan",
            "reachable": true,
            "rtt_ms": 1.2,
            "error": null
        })
    );
    assert_eq!(
        results[1],
        json!({
            "input": "bad..hostname",
            "ip": null,
            "hostname": null,
            "reachable": false,
            "rtt_ms": null,
            "error": "Unable to resolve hostname or IP"
        })
    );
    assert_eq!(results[2]["hostname"], json!("router.lan"));
    assert_eq!(results[3]["input"], json!("192.168.1.2"));
    assert_eq!(results[4]["error"], json!("No response"));
    assert_eq!(results.as_array().unwrap().len(), 5);
    assert_eq!(envelope["data"]["summary"], json!({ "requested": 5, "reachable": 3 }));

    let probed: Vec<IpAddr> = log.probed();
    assert_eq!(probed.len(), 4);
    assert_eq!(probed[0], "192.168.1.20".parse::<IpAddr>().unwrap());
}

#[tokio::test]
async fn descending_range_is_a_validation_error() {
    let (svc, log) = lab().service(DiscoveryConfig::default());

    let envelope = handle(&svc, r#"{"range": "10.0.0.5-10.0.0.2"}"#).await;

    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["error_code"], json!("VALIDATION_ERROR"));
    assert!(envelope["details"]["range"].is_array());
    assert!(log.probed().is_empty());
}

#[tokio::test]
async fn empty_and_non_object_payloads_are_rejected() {
    let (svc, _) = lab().service(DiscoveryConfig::default());

    let empty = handle(&svc, r#"{"targets": []}"#).await;
    assert_eq!(
        empty["details"]["targets"],
        json!(["Provide at least one IP/hostname or range"])
    );

    let null = handle(&svc, "null").await;
    assert_eq!(
        null["details"]["targets"],
        json!(["Provide at least one IP/hostname or range"])
    );

    let list = handle(&svc, r#"["10.0.0.1"]"#).await;
    assert_eq!(list["details"]["body"], json!(["Request body must be JSON"]));
}

#[tokio::test]
async fn oversized_request_probes_nothing() {
    let (svc, log) = lab().service(DiscoveryConfig::default());

    let envelope = handle(&svc, r#"{"range": "10.0.0.1-10.0.1.1"}"#).await;

    assert_eq!(
        envelope["details"]["targets"],
        json!(["Too many targets requested (257). Limit is 256."])
    );
    assert!(log.probed().is_empty());
}

#[tokio::test]
async fn duplicates_count_once_against_the_limit() {
    let config = DiscoveryConfig {
        max_targets: 3,
        ..DiscoveryConfig::default()
    };
    let (svc, log) = lab().service(config);

    let envelope = handle(
        &svc,
        r#"{"targets": ["192.168.1.1", "192.168.1.2"], "cidr": "192.168.1.0/30", "range": "192.168.1.3-192.168.1.3"}"#,
    )
    .await;

    assert_eq!(envelope["data"]["summary"]["requested"], json!(3));
    assert_eq!(log.probed().len(), 3);
}

#[tokio::test]
async fn concurrency_does_not_reorder_results() {
    let config = DiscoveryConfig {
        concurrency: 8,
        ..DiscoveryConfig::default()
    };
    let (svc, _) = lab().service(config);
    let request = DiscoveryRequest::new().with_cidr("192.168.1.0/28");

    let report: DiscoveryReport = svc.run(&request).await.unwrap();

    let inputs: Vec<String> = report.results.iter().map(|e| e.input().to_string()).collect();
    let expected: Vec<String> = (1..=14).map(|i| format!("192.168.1.{i}")).collect();
    assert_eq!(inputs, expected);
}

#[tokio::test]
async fn cancelled_run_still_reports_every_target() {
    let (svc, log) = lab().service(DiscoveryConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let request = DiscoveryRequest::new().with_range("192.168.1.1-192.168.1.4");
    let report = svc.run_with_cancel(&request, &cancel, None).await.unwrap();

    assert_eq!(report.summary.requested, 4);
    assert_eq!(report.summary.reachable, 0);
    assert!(report
        .results
        .iter()
        .all(|e| e.probe.error.as_deref() == Some("Discovery cancelled")));
    assert!(log.probed().is_empty());
}

/// Uses the real system resolver and `ping`.
#[tokio::test]
#[ignore]
async fn discovery_single_loopback() {
    let config = DiscoveryConfig {
        probe_timeout: Duration::from_millis(1500),
        reverse_dns: false,
        ..DiscoveryConfig::default()
    };
    let svc = DiscoveryService::system(config);

    let request = DiscoveryRequest::new().with_targets("127.0.0.1");
    let report = svc.run(&request).await.unwrap();

    assert_eq!(report.summary.requested, 1);
    assert!(report.results[0].is_reachable(), "{:?}", report.results[0]);
}

#[tokio::test]
#[ignore]
async fn discovery_range_loopback() {
    let svc = DiscoveryService::system(DiscoveryConfig::default());
    let request = DiscoveryRequest::new().with_range("127.0.0.1-127.0.0.3");

    let report = svc.run(&request).await.unwrap();

    assert_eq!(report.results.len(), 3, "Found incorrect amount of hosts");
}
