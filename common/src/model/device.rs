//! Discovered-device model.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed key set for the metadata map carried onto imported inventory
/// records. Kept as string keys for forward compatibility with consumers
/// that treat the blob as opaque.
pub mod meta {
    pub const OS_VERSION: &str = "os_version";
    pub const HARDWARE_ADDRESS: &str = "hardware_address";
    pub const DISCOVERED_AT: &str = "discovered_at";
    pub const CREDENTIAL_USED: &str = "credential_used";
    pub const PROTOCOL_VERSION: &str = "protocol_version";
    pub const VENDOR_FLAG: &str = "vendor_flag";
    pub const RAW_DESCRIPTION: &str = "raw_description";
}

/// One device found by a scan.
///
/// Append-only: once pushed onto a scan's device list an entry is never
/// mutated, and a scan holds at most one entry per address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub ip: Ipv4Addr,
    pub hostname: String,
    pub device_type: String,
    pub vendor: String,
    pub model: String,
    pub firmware: Option<String>,
    /// The device answered the community-authenticated system query.
    pub snmp_reachable: bool,
    pub reachable: bool,
    pub open_ports: Vec<u16>,
    pub response_time_ms: u64,
    pub mac: Option<String>,
    /// The community string the device accepted.
    pub community: String,
    /// The device's self-reported description, verbatim.
    pub raw_descr: String,
    /// Set when the description matched the Sophos appliance family.
    pub sophos_device: bool,
    pub discovered_at: DateTime<Utc>,
}
