use std::time::Duration;

use uuid::Uuid;

use sondr_common::config::Config;
use sondr_common::model::scan::{ScanMode, ScanRequest, ScanSummary};
use sondr_core::scanner::ScanService;

pub fn fast_sim_config() -> Config {
    Config {
        sim_step_ms: 5,
        ..Config::default()
    }
}

pub fn request(start: &str, end: &str, mode: ScanMode) -> ScanRequest {
    ScanRequest {
        start_ip: start.to_string(),
        end_ip: end.to_string(),
        subnet: None,
        communities: vec![],
        mode,
        timeout_ms: None,
    }
}

/// Polls until the scan reaches a terminal state, bounded so a stuck scan
/// fails the test instead of hanging it.
pub async fn wait_terminal(service: &ScanService, id: Uuid) -> ScanSummary {
    for _ in 0..1_000 {
        let summary = service.scan_status(id).await.expect("scan should exist");
        if summary.status.is_terminal() {
            return summary;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("scan {id} never reached a terminal state");
}
