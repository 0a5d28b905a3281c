//! End-to-end scan lifecycle over the public library API.

use std::time::Duration;

use sondr_common::config::Config;
use sondr_common::error::ScanError;
use sondr_common::model::scan::{ScanMode, ScanStatus};
use sondr_core::scanner::ScanService;

use super::util::{fast_sim_config, request, wait_terminal};

/// The headline scenario: a five-address simulated scan returns its id
/// immediately and finishes with a full, plausible result set.
#[tokio::test]
async fn simulated_scan_lifecycle() {
    let service = ScanService::in_memory(fast_sim_config());

    let id = service
        .start_scan(request("10.0.0.1", "10.0.0.5", ScanMode::Simulation))
        .await
        .expect("scan should start");

    // Immediate, synchronous visibility of the registry entry.
    let initial = service.scan_status(id).await.unwrap();
    assert_eq!(initial.total_ips, 5);

    let done = wait_terminal(&service, id).await;
    assert_eq!(done.status, ScanStatus::Completed);
    assert_eq!(done.progress, 100);
    assert_eq!(done.scanned_ips, 5);
    assert!((3..=10).contains(&done.devices_found));

    let devices = service.scan_results(id).await.unwrap();
    assert_eq!(devices.len(), done.devices_found);

    // Uniqueness invariant: one entry per address.
    for (i, a) in devices.iter().enumerate() {
        for b in devices.iter().skip(i + 1) {
            assert_ne!(a.ip, b.ip);
        }
    }
}

#[tokio::test]
async fn progress_never_regresses_while_polling() {
    let service = ScanService::in_memory(fast_sim_config());
    let id = service
        .start_scan(request("192.168.1.1", "192.168.1.100", ScanMode::Simulation))
        .await
        .unwrap();

    let mut last = 0u8;
    loop {
        let summary = service.scan_status(id).await.unwrap();
        assert!(
            summary.progress >= last,
            "progress regressed from {last} to {}",
            summary.progress
        );
        assert!(summary.scanned_ips <= summary.total_ips);
        last = summary.progress;
        if summary.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Real mode with nothing listening: every batch settles, the scan
/// completes cleanly with an empty device list.
#[tokio::test]
async fn real_scan_against_silent_range_completes() {
    let config = Config {
        batch_size: 5,
        probe_timeout_ms: 25,
        ..Config::default()
    };
    let service = ScanService::in_memory(config);

    let id = service
        .start_scan(request("127.0.0.1", "127.0.0.12", ScanMode::Real))
        .await
        .unwrap();

    let done = wait_terminal(&service, id).await;
    assert_eq!(done.status, ScanStatus::Completed);
    assert_eq!(done.devices_found, 0);
    assert_eq!(done.scanned_ips, 12);
    assert_eq!(done.progress, 100);
    assert!(done.errors.is_empty());
}

#[tokio::test]
async fn malformed_range_never_creates_a_scan() {
    let service = ScanService::in_memory(fast_sim_config());

    for (start, end) in [
        ("10.0.0.300", "10.0.0.1"),
        ("not-an-ip", "10.0.0.1"),
        ("10.0.0.9", "10.0.0.1"),
    ] {
        let err = service
            .start_scan(request(start, end, ScanMode::Simulation))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidRange(_)), "{start}-{end}");
    }
}

/// Overlapping concurrent scans are allowed and tracked independently.
#[tokio::test]
async fn overlapping_scans_run_independently() {
    let service = ScanService::in_memory(fast_sim_config());

    let first = service
        .start_scan(request("10.1.0.1", "10.1.0.5", ScanMode::Simulation))
        .await
        .unwrap();
    let second = service
        .start_scan(request("10.1.0.1", "10.1.0.5", ScanMode::Simulation))
        .await
        .unwrap();

    assert_ne!(first, second);
    let a = wait_terminal(&service, first).await;
    let b = wait_terminal(&service, second).await;
    assert_eq!(a.status, ScanStatus::Completed);
    assert_eq!(b.status, ScanStatus::Completed);
}
