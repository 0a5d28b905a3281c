//! Scan orchestration: bounded-concurrency batch probing over an address
//! range, with state tracked in the scan registry.
//!
//! `start_scan` is fire-and-forget: it validates the range, registers the
//! entry and spawns a detached task that owns exclusive write access to
//! that entry. Callers only ever hold the scan id. There is no cancellation;
//! a started scan runs to completion or internal failure.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use sondr_common::config::Config;
use sondr_common::error::ScanError;
use sondr_common::model::device::DiscoveredDevice;
use sondr_common::model::scan::{ScanMode, ScanRequest, ScanResult, ScanSummary};
use sondr_common::network::range::Ipv4Range;

use crate::fingerprint;
use crate::probe::{ProbeClient, ProbeReply};
use crate::registry::{MemoryScanStore, ScanStore};
use crate::simulate;

/// Number of timed progress steps a simulated scan walks through.
const SIM_STEPS: u8 = 5;

pub struct ScanService {
    store: Arc<dyn ScanStore>,
    config: Config,
}

impl ScanService {
    pub fn new(store: Arc<dyn ScanStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// Convenience constructor with the default in-memory registry.
    pub fn in_memory(config: Config) -> Self {
        Self::new(MemoryScanStore::shared(), config)
    }

    pub fn store(&self) -> Arc<dyn ScanStore> {
        Arc::clone(&self.store)
    }

    /// Registers a scan and spawns its background task. Returns the scan id
    /// immediately, before any probing happens.
    pub async fn start_scan(&self, request: ScanRequest) -> Result<Uuid, ScanError> {
        let range = Ipv4Range::parse(&request.start_ip, &request.end_ip)?;
        let id = Uuid::new_v4();

        self.store
            .put(ScanResult::new(id, request.clone(), range.len() as u32))
            .await;

        info!(scan_id = %id, start = %range.start_addr, end = %range.end_addr,
              total = range.len(), mode = ?request.mode, "scan started");

        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        tokio::spawn(async move {
            let outcome = run_scan(Arc::clone(&store), &config, id, request, range).await;
            match outcome {
                Ok(()) => {
                    store.update(id, Box::new(|scan| scan.complete())).await;
                    debug!(scan_id = %id, "scan completed");
                }
                Err(e) => {
                    // Task boundary: nothing may escape a detached worker
                    // without landing in the registry entry.
                    error!(scan_id = %id, "scan task failed: {e:#}");
                    let message = format!("scan task failed: {e:#}");
                    store.update(id, Box::new(move |scan| scan.fail(message))).await;
                }
            }
        });

        Ok(id)
    }

    /// Current status snapshot for pollers.
    pub async fn scan_status(&self, id: Uuid) -> Result<ScanSummary, ScanError> {
        self.store
            .get(id)
            .await
            .map(|scan| ScanSummary::from(&scan))
            .ok_or(ScanError::ScanNotFound(id))
    }

    /// Ordered device list discovered so far.
    pub async fn scan_results(&self, id: Uuid) -> Result<Vec<DiscoveredDevice>, ScanError> {
        self.store
            .get(id)
            .await
            .map(|scan| scan.devices)
            .ok_or(ScanError::ScanNotFound(id))
    }
}

async fn run_scan(
    store: Arc<dyn ScanStore>,
    config: &Config,
    id: Uuid,
    request: ScanRequest,
    range: Ipv4Range,
) -> anyhow::Result<()> {
    match request.mode {
        ScanMode::Simulation => run_simulation(store, config, id, range).await,
        ScanMode::Real => run_batches(store, config, id, &request, range).await,
    }
}

/// Real-mode scheduler: fixed-size batches, one probe task per address,
/// full-batch barrier between registry updates.
async fn run_batches(
    store: Arc<dyn ScanStore>,
    config: &Config,
    id: Uuid,
    request: &ScanRequest,
    range: Ipv4Range,
) -> anyhow::Result<()> {
    let communities = if request.communities.is_empty() {
        config.communities.clone()
    } else {
        request.communities.clone()
    };
    let timeout = Duration::from_millis(request.timeout_ms.unwrap_or(config.probe_timeout_ms));
    let client = Arc::new(ProbeClient::new(timeout));

    let addrs: Vec<Ipv4Addr> = range.iter().collect();
    let communities = Arc::new(communities);
    let mut processed = 0usize;

    for batch in addrs.chunks(config.batch_size.max(1)) {
        let mut handles = Vec::with_capacity(batch.len());
        for &addr in batch {
            let client = Arc::clone(&client);
            let communities = Arc::clone(&communities);
            handles.push(tokio::spawn(async move {
                let reply = client.probe(addr, &communities).await?;
                Some(build_device(addr, reply))
            }));
        }

        // Barrier: the whole batch settles before progress advances. A
        // single failed probe task reduces results, never aborts the batch.
        let mut found = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(device)) => found.push(device),
                Ok(None) => {}
                Err(e) => warn!(scan_id = %id, "probe task panicked: {e}"),
            }
        }

        processed += batch.len();
        debug!(scan_id = %id, processed, found = found.len(), "batch settled");
        store
            .update(id, Box::new(move |scan| scan.absorb_batch(found, processed)))
            .await;
    }

    Ok(())
}

/// Simulation scheduler: timed progress steps, then a synthetic device list
/// replaces whatever is there wholesale.
async fn run_simulation(
    store: Arc<dyn ScanStore>,
    config: &Config,
    id: Uuid,
    range: Ipv4Range,
) -> anyhow::Result<()> {
    let step_delay = Duration::from_millis(config.sim_step_ms);

    for step in 1..=SIM_STEPS {
        tokio::time::sleep(step_delay).await;
        let progress = step * (100 / SIM_STEPS);
        store
            .update(id, Box::new(move |scan| scan.advance_to(progress)))
            .await;
    }

    let devices = simulate::generate(range.start_addr);
    debug!(scan_id = %id, devices = devices.len(), "simulation generated");
    store
        .update(
            id,
            Box::new(move |scan| {
                scan.devices = devices;
            }),
        )
        .await;

    Ok(())
}

fn build_device(addr: Ipv4Addr, reply: ProbeReply) -> DiscoveredDevice {
    let fp = fingerprint::classify(&reply.descr);
    let sophos_device = fp.vendor == "Sophos";

    DiscoveredDevice {
        ip: addr,
        hostname: reply.name,
        device_type: fp.device_type,
        vendor: fp.vendor,
        model: fp.model,
        firmware: fp.firmware,
        snmp_reachable: true,
        reachable: true,
        open_ports: vec![sondr_protocols::snmp::SNMP_PORT],
        response_time_ms: reply.elapsed.as_millis() as u64,
        mac: None,
        community: reply.community,
        raw_descr: reply.descr,
        sophos_device,
        discovered_at: Utc::now(),
    }
}
