//! Import pipeline: reconciles selected discovered devices against the
//! inventory collaborator and persists the new ones.
//!
//! Per-device failures are tallied, never fatal: every selected address is
//! attempted regardless of what happened to the ones before it. Inventory
//! calls go through the resilient client, so a dead inventory backend
//! degrades to error entries instead of hammering the collaborator.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use sondr_common::error::ScanError;
use sondr_common::model::device::{DiscoveredDevice, meta};
use sondr_common::model::inventory::{AssetRecord, ImportOutcome, ImportRequest};

use crate::registry::ScanStore;
use crate::resilience::{ResilienceConfig, ResilientClient};

/// Lookup/create contract of the external inventory store. The engine never
/// sees more of the inventory than this.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn find_by_address(&self, ip: Ipv4Addr) -> anyhow::Result<Option<AssetRecord>>;
    async fn create(&self, record: AssetRecord) -> anyhow::Result<AssetRecord>;
}

pub struct ImportPipeline {
    guard: ResilientClient,
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::new(ResilienceConfig::default())
    }
}

impl ImportPipeline {
    pub fn new(resilience: ResilienceConfig) -> Self {
        Self {
            guard: ResilientClient::new(resilience),
        }
    }

    /// Imports the requested addresses out of a finished (or still-running)
    /// scan. Unknown scan ids yield a zero outcome with a single error.
    pub async fn import_devices(
        &self,
        store: &dyn ScanStore,
        inventory: &dyn Inventory,
        request: ImportRequest,
    ) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();

        let Some(scan) = store.get(request.scan_id).await else {
            outcome
                .errors
                .push(format!("scan not found: {}", request.scan_id));
            return outcome;
        };

        for ip in &request.addresses {
            let Some(device) = scan.devices.iter().find(|d| d.ip == *ip) else {
                // Selected but never discovered; nothing to persist.
                debug!(%ip, "address not in scan results, skipping");
                outcome.skipped += 1;
                continue;
            };

            match self.import_one(inventory, device, &request).await {
                Ok(true) => outcome.imported += 1,
                Ok(false) => outcome.skipped += 1,
                Err(e) => outcome.errors.push(format!("{ip}: {e:#}")),
            }
        }

        info!(
            scan_id = %request.scan_id,
            imported = outcome.imported,
            skipped = outcome.skipped,
            errors = outcome.errors.len(),
            "import finished"
        );
        outcome
    }

    /// Returns Ok(true) when a record was created, Ok(false) when an
    /// existing record made this a skip.
    async fn import_one(
        &self,
        inventory: &dyn Inventory,
        device: &DiscoveredDevice,
        request: &ImportRequest,
    ) -> anyhow::Result<bool> {
        let existing = self
            .guard
            .call(|| inventory.find_by_address(device.ip))
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let record = build_record(device, request);
        self.guard
            .call(|| inventory.create(record.clone()))
            .await
            .map_err(|e| match e.downcast_ref::<ScanError>() {
                Some(ScanError::CircuitOpen) => e,
                _ => ScanError::Persistence(format!("{e:#}")).into(),
            })?;
        Ok(true)
    }
}

fn build_record(device: &DiscoveredDevice, request: &ImportRequest) -> AssetRecord {
    let defaults = &request.defaults;
    let mut metadata = BTreeMap::new();
    if let Some(fw) = &device.firmware {
        metadata.insert(meta::OS_VERSION.to_string(), fw.clone());
    }
    if let Some(mac) = &device.mac {
        metadata.insert(meta::HARDWARE_ADDRESS.to_string(), mac.clone());
    }
    metadata.insert(
        meta::DISCOVERED_AT.to_string(),
        device.discovered_at.to_rfc3339(),
    );
    metadata.insert(meta::CREDENTIAL_USED.to_string(), device.community.clone());
    metadata.insert(meta::PROTOCOL_VERSION.to_string(), "2c".to_string());
    metadata.insert(
        meta::VENDOR_FLAG.to_string(),
        device.sophos_device.to_string(),
    );
    metadata.insert(
        meta::RAW_DESCRIPTION.to_string(),
        device.raw_descr.clone(),
    );

    AssetRecord {
        id: Uuid::new_v4(),
        ip: device.ip,
        hostname: device.hostname.clone(),
        device_type: device.device_type.clone(),
        vendor: device.vendor.clone(),
        model: device.model.clone(),
        tier: defaults.tier.clone().unwrap_or_else(|| "standard".into()),
        location: defaults
            .location
            .clone()
            .unwrap_or_else(|| "unassigned".into()),
        customer_ref: defaults.customer_ref.clone(),
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use sondr_common::model::inventory::ImportDefaults;
    use sondr_common::model::scan::{ScanMode, ScanRequest, ScanResult};

    use crate::registry::MemoryScanStore;

    #[derive(Default)]
    struct MemoryInventory {
        records: Mutex<HashMap<Ipv4Addr, AssetRecord>>,
        fail_creates: bool,
    }

    #[async_trait]
    impl Inventory for MemoryInventory {
        async fn find_by_address(&self, ip: Ipv4Addr) -> anyhow::Result<Option<AssetRecord>> {
            Ok(self.records.lock().unwrap().get(&ip).cloned())
        }

        async fn create(&self, record: AssetRecord) -> anyhow::Result<AssetRecord> {
            if self.fail_creates {
                anyhow::bail!("datastore unavailable");
            }
            self.records
                .lock()
                .unwrap()
                .insert(record.ip, record.clone());
            Ok(record)
        }
    }

    fn device(ip: Ipv4Addr) -> DiscoveredDevice {
        DiscoveredDevice {
            ip,
            hostname: format!("host-{}", ip.octets()[3]),
            device_type: "router".into(),
            vendor: "Cisco".into(),
            model: "IOS Device".into(),
            firmware: Some("15.2".into()),
            snmp_reachable: true,
            reachable: true,
            open_ports: vec![161],
            response_time_ms: 9,
            mac: Some("aa:bb:cc:dd:ee:ff".into()),
            community: "public".into(),
            raw_descr: "Cisco IOS Software".into(),
            sophos_device: false,
            discovered_at: Utc::now(),
        }
    }

    async fn seeded_store(ips: &[Ipv4Addr]) -> (MemoryScanStore, Uuid) {
        let store = MemoryScanStore::new();
        let id = Uuid::new_v4();
        let request = ScanRequest {
            start_ip: "10.0.0.1".into(),
            end_ip: "10.0.0.10".into(),
            subnet: None,
            communities: vec![],
            mode: ScanMode::Real,
            timeout_ms: None,
        };
        let mut scan = ScanResult::new(id, request, 10);
        scan.absorb_batch(ips.iter().map(|ip| device(*ip)).collect(), 10);
        scan.complete();
        store.put(scan).await;
        (store, id)
    }

    fn request(scan_id: Uuid, addresses: Vec<Ipv4Addr>) -> ImportRequest {
        ImportRequest {
            scan_id,
            addresses,
            defaults: ImportDefaults {
                tier: Some("gold".into()),
                location: Some("dc-1".into()),
                customer_ref: None,
            },
        }
    }

    #[tokio::test]
    async fn imports_new_devices_with_metadata() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        let (store, scan_id) = seeded_store(&[ip]).await;
        let inventory = MemoryInventory::default();
        let pipeline = ImportPipeline::default();

        let outcome = pipeline
            .import_devices(&store, &inventory, request(scan_id, vec![ip]))
            .await;

        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.skipped, 0);
        assert!(outcome.errors.is_empty());

        let records = inventory.records.lock().unwrap();
        let record = records.get(&ip).unwrap();
        assert_eq!(record.tier, "gold");
        assert_eq!(record.metadata.get(meta::CREDENTIAL_USED).unwrap(), "public");
        assert_eq!(record.metadata.get(meta::PROTOCOL_VERSION).unwrap(), "2c");
        assert_eq!(record.metadata.get(meta::OS_VERSION).unwrap(), "15.2");
    }

    #[tokio::test]
    async fn second_import_of_same_address_is_skipped() {
        let ip = Ipv4Addr::new(10, 0, 0, 2);
        let (store, scan_id) = seeded_store(&[ip]).await;
        let inventory = MemoryInventory::default();
        let pipeline = ImportPipeline::default();

        let first = pipeline
            .import_devices(&store, &inventory, request(scan_id, vec![ip]))
            .await;
        let second = pipeline
            .import_devices(&store, &inventory, request(scan_id, vec![ip]))
            .await;

        assert_eq!(first.imported, 1);
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(inventory.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_scan_id_yields_single_error() {
        let store = MemoryScanStore::new();
        let inventory = MemoryInventory::default();
        let pipeline = ImportPipeline::default();

        let outcome = pipeline
            .import_devices(
                &store,
                &inventory,
                request(Uuid::new_v4(), vec![Ipv4Addr::new(10, 0, 0, 1)]),
            )
            .await;

        assert_eq!(outcome.imported, 0);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("scan not found"));
    }

    #[tokio::test]
    async fn address_missing_from_scan_counts_as_skipped() {
        let known = Ipv4Addr::new(10, 0, 0, 3);
        let (store, scan_id) = seeded_store(&[known]).await;
        let inventory = MemoryInventory::default();
        let pipeline = ImportPipeline::default();

        let outcome = pipeline
            .import_devices(
                &store,
                &inventory,
                request(scan_id, vec![known, Ipv4Addr::new(10, 0, 0, 99)]),
            )
            .await;

        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn create_failures_accumulate_without_aborting() {
        let ips = [
            Ipv4Addr::new(10, 0, 0, 4),
            Ipv4Addr::new(10, 0, 0, 5),
            Ipv4Addr::new(10, 0, 0, 6),
        ];
        let (store, scan_id) = seeded_store(&ips).await;
        let inventory = MemoryInventory {
            fail_creates: true,
            ..Default::default()
        };
        // Tight retry budget keeps the failing test fast.
        let pipeline = ImportPipeline::new(ResilienceConfig {
            max_failures: 100,
            max_retries: 1,
            backoff_base: std::time::Duration::from_millis(1),
            ..ResilienceConfig::default()
        });

        let outcome = pipeline
            .import_devices(&store, &inventory, request(scan_id, ips.to_vec()))
            .await;

        assert_eq!(outcome.imported, 0);
        assert_eq!(outcome.errors.len(), 3);
    }
}
