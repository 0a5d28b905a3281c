//! Inventory-side model: the record shape handed to the external asset
//! store, plus the import request/outcome contracts.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A managed-device record as the inventory collaborator expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: Uuid,
    pub ip: Ipv4Addr,
    pub hostname: String,
    pub device_type: String,
    pub vendor: String,
    pub model: String,
    pub tier: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_ref: Option<String>,
    /// Fixed-key attribute map, see [`crate::model::device::meta`].
    pub metadata: BTreeMap<String, String>,
}

/// Defaults applied to every record created by one import call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportDefaults {
    pub tier: Option<String>,
    pub location: Option<String>,
    pub customer_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub scan_id: Uuid,
    /// Addresses selected out of the scan's device list.
    pub addresses: Vec<Ipv4Addr>,
    #[serde(default)]
    pub defaults: ImportDefaults,
}

/// Per-call import tally. `errors` accumulates per-device failures; the
/// import loop itself never aborts early.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub imported: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}
