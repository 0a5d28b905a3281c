//! JSON-file inventory adapter.
//!
//! The discovery engine only knows the lookup/create contract; this adapter
//! is what the CLI plugs into it so an import has somewhere local to land.
//! One file holds the whole record list, rewritten on every create.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;

use sondr_common::model::inventory::AssetRecord;
use sondr_core::import::Inventory;

pub struct JsonInventory {
    path: PathBuf,
    records: Mutex<HashMap<Ipv4Addr, AssetRecord>>,
}

impl JsonInventory {
    /// Opens (or initializes) the inventory file.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let records = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let list: Vec<AssetRecord> =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
            list.into_iter().map(|r| (r.ip, r)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            records: Mutex::new(records),
        })
    }

    fn persist(&self, records: &HashMap<Ipv4Addr, AssetRecord>) -> anyhow::Result<()> {
        let mut list: Vec<&AssetRecord> = records.values().collect();
        list.sort_by_key(|r| r.ip);
        let raw = serde_json::to_string_pretty(&list)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl Inventory for JsonInventory {
    async fn find_by_address(&self, ip: Ipv4Addr) -> anyhow::Result<Option<AssetRecord>> {
        Ok(self.records.lock().expect("inventory poisoned").get(&ip).cloned())
    }

    async fn create(&self, record: AssetRecord) -> anyhow::Result<AssetRecord> {
        let mut records = self.records.lock().expect("inventory poisoned");
        records.insert(record.ip, record.clone());
        self.persist(&records)?;
        Ok(record)
    }
}
