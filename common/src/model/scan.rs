//! Scan lifecycle model: request, status, and the registry entry itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::device::DiscoveredDevice;

/// Probe mode. Simulation synthesizes results without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Simulation,
    Real,
}

/// Parameters of one scan. Immutable once the scan starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub start_ip: String,
    pub end_ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    /// Community strings tried in order; empty means "use configured defaults".
    #[serde(default)]
    pub communities: Vec<String>,
    #[serde(default)]
    pub mode: ScanMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Registry entry for one scan.
///
/// Single-writer: only the owning background task mutates an entry, and it
/// does so through the store's atomic update so readers never observe a
/// half-applied batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: Uuid,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request: ScanRequest,
    /// 0–100, non-decreasing.
    pub progress: u8,
    /// Fixed at creation from the (capped) range length.
    pub total_ips: u32,
    /// Always <= total_ips.
    pub scanned_ips: u32,
    pub devices: Vec<DiscoveredDevice>,
    pub errors: Vec<String>,
}

impl ScanResult {
    pub fn new(id: Uuid, request: ScanRequest, total_ips: u32) -> Self {
        Self {
            id,
            status: ScanStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            request,
            progress: 0,
            total_ips,
            scanned_ips: 0,
            devices: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Folds one settled batch into the entry: appends new devices (first
    /// sighting of an address wins), advances counters, recomputes progress.
    pub fn absorb_batch(&mut self, found: Vec<DiscoveredDevice>, processed: usize) {
        for device in found {
            if !self.devices.iter().any(|d| d.ip == device.ip) {
                self.devices.push(device);
            }
        }
        self.scanned_ips = (processed as u32).min(self.total_ips);
        self.progress = self.compute_progress();
    }

    /// Advances simulated progress without touching the device list.
    pub fn advance_to(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
        self.scanned_ips = ((self.total_ips as u64 * self.progress as u64) / 100) as u32;
    }

    /// Marks the scan completed. A terminal entry is never re-transitioned.
    pub fn complete(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ScanStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.progress = 100;
        self.scanned_ips = self.total_ips;
    }

    /// Marks the scan failed, recording the cause.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ScanStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.errors.push(message.into());
    }

    fn compute_progress(&self) -> u8 {
        if self.total_ips == 0 {
            return 100;
        }
        let pct = (self.scanned_ips as f64 / self.total_ips as f64) * 100.0;
        pct.round().min(100.0) as u8
    }
}

/// The status snapshot handed to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub id: Uuid,
    pub status: ScanStatus,
    pub progress: u8,
    pub total_ips: u32,
    pub scanned_ips: u32,
    pub devices_found: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub errors: Vec<String>,
}

impl From<&ScanResult> for ScanSummary {
    fn from(scan: &ScanResult) -> Self {
        Self {
            id: scan.id,
            status: scan.status,
            progress: scan.progress,
            total_ips: scan.total_ips,
            scanned_ips: scan.scanned_ips,
            devices_found: scan.devices.len(),
            started_at: scan.started_at,
            completed_at: scan.completed_at,
            errors: scan.errors.clone(),
        }
    }
}
