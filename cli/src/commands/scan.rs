use std::time::Duration;

use anyhow::Context;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use sondr_common::config::Config;
use sondr_common::model::device::DiscoveredDevice;
use sondr_common::model::inventory::{ImportDefaults, ImportRequest};
use sondr_common::model::scan::{ScanMode, ScanRequest, ScanStatus, ScanSummary};
use sondr_core::import::ImportPipeline;
use sondr_core::scanner::ScanService;

use crate::commands::ScanArgs;
use crate::inventory::JsonInventory;
use crate::terminal::print;

const POLL_INTERVAL: Duration = Duration::from_millis(150);

type Detail = (String, ColoredString);

pub async fn scan(args: ScanArgs) -> anyhow::Result<()> {
    let config = Config::from_env();
    let request = to_request(&args, &config)?;
    let service = ScanService::in_memory(config);

    let id = service.start_scan(request).await?;
    print::status(&format!("scan {id} started"));

    let summary = poll_until_done(&service, id).await?;
    let devices = service.scan_results(id).await?;

    print_outcome(&summary, &devices);

    if let Some(path) = &args.import_to {
        let inventory = JsonInventory::open(path)
            .with_context(|| format!("opening inventory file {}", path.display()))?;
        let outcome = ImportPipeline::default()
            .import_devices(
                service.store().as_ref(),
                &inventory,
                ImportRequest {
                    scan_id: id,
                    addresses: devices.iter().map(|d| d.ip).collect(),
                    defaults: ImportDefaults {
                        tier: args.tier.clone(),
                        location: args.location.clone(),
                        customer_ref: args.customer_ref.clone(),
                    },
                },
            )
            .await;

        print::header("inventory import");
        print::status(&format!(
            "{} imported, {} skipped, {} errors",
            outcome.imported,
            outcome.skipped,
            outcome.errors.len()
        ));
        for error in &outcome.errors {
            print::status(&format!("{}", error.red()));
        }
    }

    Ok(())
}

fn to_request(args: &ScanArgs, config: &Config) -> anyhow::Result<ScanRequest> {
    let mode = match args.mode.as_deref() {
        None => config.mode,
        Some("real") => ScanMode::Real,
        Some("simulation") => ScanMode::Simulation,
        Some(other) => anyhow::bail!("unknown mode '{other}', expected 'real' or 'simulation'"),
    };

    Ok(ScanRequest {
        start_ip: args.start.clone(),
        end_ip: args.end.clone(),
        subnet: args.subnet.clone(),
        communities: args.communities.clone(),
        mode,
        timeout_ms: args.timeout_ms,
    })
}

async fn poll_until_done(service: &ScanService, id: uuid::Uuid) -> anyhow::Result<ScanSummary> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos:>3}% {msg}")?
            .progress_chars("=>-"),
    );

    loop {
        let summary = service.scan_status(id).await?;
        bar.set_position(summary.progress as u64);
        bar.set_message(format!(
            "{}/{} addresses, {} devices",
            summary.scanned_ips, summary.total_ips, summary.devices_found
        ));

        if summary.status.is_terminal() {
            bar.finish_and_clear();
            return Ok(summary);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn print_outcome(summary: &ScanSummary, devices: &[DiscoveredDevice]) {
    if summary.status == ScanStatus::Failed {
        print::header("SCAN FAILED");
        for error in &summary.errors {
            print::status(&format!("{}", error.red()));
        }
        return;
    }

    if devices.is_empty() {
        print::header("ZERO DEVICES DISCOVERED");
        print::status("no device answered the system-information query");
        return;
    }

    print::header("discovered devices");
    for (idx, device) in devices.iter().enumerate() {
        print_device_tree(device, idx);
        if idx + 1 != devices.len() {
            println!();
        }
    }
    print_summary(summary);
}

fn print_device_tree(device: &DiscoveredDevice, idx: usize) {
    let hostname = if device.hostname.is_empty() {
        "no hostname"
    } else {
        &device.hostname
    };
    print::tree_head(idx, hostname);

    let mut details: Vec<Detail> = vec![
        ("Address".into(), device.ip.to_string().cyan()),
        ("Vendor".into(), device.vendor.normal()),
        ("Model".into(), device.model.normal()),
        ("Type".into(), device.device_type.normal()),
    ];

    if let Some(firmware) = &device.firmware {
        details.push(("Firmware".into(), firmware.normal()));
    }
    if let Some(mac) = &device.mac {
        details.push(("MAC".into(), mac.normal()));
    }
    if !device.open_ports.is_empty() {
        let ports = device
            .open_ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        details.push(("Ports".into(), ports.normal()));
    }
    details.push((
        "Latency".into(),
        format!("{}ms", device.response_time_ms).yellow(),
    ));

    print::as_tree_one_level(details);
}

fn print_summary(summary: &ScanSummary) {
    let found = format!("{} devices", summary.devices_found).bold().green();
    let scanned = format!("{} addresses", summary.scanned_ips).bold().yellow();
    println!();
    print::status(&format!("Discovery complete: {found} across {scanned}"));
}
