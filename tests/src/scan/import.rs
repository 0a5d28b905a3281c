//! Scan-then-import flow against an in-memory inventory double.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use sondr_common::model::inventory::{AssetRecord, ImportDefaults, ImportRequest};
use sondr_common::model::scan::ScanMode;
use sondr_core::import::{ImportPipeline, Inventory};
use sondr_core::scanner::ScanService;

use super::util::{fast_sim_config, request, wait_terminal};

#[derive(Default)]
struct MemoryInventory {
    records: Mutex<HashMap<Ipv4Addr, AssetRecord>>,
}

#[async_trait]
impl Inventory for MemoryInventory {
    async fn find_by_address(&self, ip: Ipv4Addr) -> anyhow::Result<Option<AssetRecord>> {
        Ok(self.records.lock().unwrap().get(&ip).cloned())
    }

    async fn create(&self, record: AssetRecord) -> anyhow::Result<AssetRecord> {
        self.records
            .lock()
            .unwrap()
            .insert(record.ip, record.clone());
        Ok(record)
    }
}

fn import_request(scan_id: Uuid, addresses: Vec<Ipv4Addr>) -> ImportRequest {
    ImportRequest {
        scan_id,
        addresses,
        defaults: ImportDefaults {
            tier: Some("silver".into()),
            location: Some("branch-7".into()),
            customer_ref: Some("cust-42".into()),
        },
    }
}

#[tokio::test]
async fn discovered_devices_land_in_inventory_once() {
    let service = ScanService::in_memory(fast_sim_config());
    let inventory = MemoryInventory::default();
    let pipeline = ImportPipeline::default();

    let id = service
        .start_scan(request("10.0.0.1", "10.0.0.10", ScanMode::Simulation))
        .await
        .unwrap();
    wait_terminal(&service, id).await;

    let devices = service.scan_results(id).await.unwrap();
    let addresses: Vec<Ipv4Addr> = devices.iter().map(|d| d.ip).collect();
    let store = service.store();

    let first = pipeline
        .import_devices(store.as_ref(), &inventory, import_request(id, addresses.clone()))
        .await;
    assert_eq!(first.imported as usize, devices.len());
    assert!(first.errors.is_empty());

    // Importing the same selection again only skips.
    let second = pipeline
        .import_devices(store.as_ref(), &inventory, import_request(id, addresses))
        .await;
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped as usize, devices.len());
    assert_eq!(inventory.records.lock().unwrap().len(), devices.len());

    // Defaults made it onto the records.
    for record in inventory.records.lock().unwrap().values() {
        assert_eq!(record.tier, "silver");
        assert_eq!(record.location, "branch-7");
        assert_eq!(record.customer_ref.as_deref(), Some("cust-42"));
    }
}

#[tokio::test]
async fn import_against_unknown_scan_reports_not_found() {
    let service = ScanService::in_memory(fast_sim_config());
    let inventory = MemoryInventory::default();
    let pipeline = ImportPipeline::default();

    let outcome = pipeline
        .import_devices(
            service.store().as_ref(),
            &inventory,
            import_request(Uuid::new_v4(), vec![Ipv4Addr::new(10, 0, 0, 1)]),
        )
        .await;

    assert_eq!(outcome.imported, 0);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("scan not found"));
    assert!(inventory.records.lock().unwrap().is_empty());
}
