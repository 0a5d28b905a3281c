//! Heuristic vendor/model classification of a device's self-reported
//! description string.
//!
//! The precedence is load-bearing: the Sophos appliance check runs before
//! the generic marker table, so a description containing both a Sophos and
//! a generic marker always classifies as the appliance family. Reordering
//! changes results for ambiguous strings.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub vendor: String,
    pub model: String,
    pub device_type: String,
    pub firmware: Option<String>,
}

const SOPHOS_MARKERS: [&str; 3] = ["sophos", "xg firewall", "sfos"];

struct Marker {
    token: &'static str,
    vendor: &'static str,
    model: &'static str,
    device_type: &'static str,
}

/// Generic markers, checked in order; first match wins.
const GENERIC_MARKERS: [Marker; 13] = [
    Marker { token: "cisco", vendor: "Cisco", model: "IOS Device", device_type: "router" },
    Marker { token: "ios", vendor: "Cisco", model: "IOS Device", device_type: "router" },
    Marker { token: "juniper", vendor: "Juniper", model: "JunOS Device", device_type: "router" },
    Marker { token: "junos", vendor: "Juniper", model: "JunOS Device", device_type: "router" },
    Marker { token: "mikrotik", vendor: "MikroTik", model: "RouterOS Device", device_type: "router" },
    Marker { token: "routeros", vendor: "MikroTik", model: "RouterOS Device", device_type: "router" },
    Marker { token: "fortinet", vendor: "Fortinet", model: "FortiGate", device_type: "firewall" },
    Marker { token: "fortigate", vendor: "Fortinet", model: "FortiGate", device_type: "firewall" },
    Marker { token: "pfsense", vendor: "Netgate", model: "pfSense", device_type: "firewall" },
    Marker { token: "ubiquiti", vendor: "Ubiquiti", model: "EdgeOS Device", device_type: "router" },
    Marker { token: "edgeos", vendor: "Ubiquiti", model: "EdgeOS Device", device_type: "router" },
    Marker { token: "procurve", vendor: "HP", model: "ProCurve", device_type: "switch" },
    Marker { token: "linux", vendor: "Linux", model: "Generic", device_type: "server" },
];

fn sophos_model_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)XGS?\s*\d+\w?").expect("static regex"))
}

fn firmware_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:SFOS|Version|v)\s*([\d.]+)").expect("static regex"))
}

/// Classifies a raw description. Pure; safe on any input including empty.
pub fn classify(descr: &str) -> Fingerprint {
    let lower = descr.to_ascii_lowercase();

    if SOPHOS_MARKERS.iter().any(|m| lower.contains(m)) {
        return sophos_fingerprint(descr);
    }

    for marker in &GENERIC_MARKERS {
        if lower.contains(marker.token) {
            return Fingerprint {
                vendor: marker.vendor.to_string(),
                model: marker.model.to_string(),
                device_type: marker.device_type.to_string(),
                firmware: firmware_version(descr),
            };
        }
    }

    fallback_fingerprint(descr)
}

fn sophos_fingerprint(descr: &str) -> Fingerprint {
    let model = sophos_model_re()
        .find(descr)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "XG Series".to_string());

    Fingerprint {
        vendor: "Sophos".to_string(),
        model,
        device_type: "firewall".to_string(),
        firmware: firmware_version(descr),
    }
}

/// Vendor = first token, model = next two tokens, type defaults to router.
fn fallback_fingerprint(descr: &str) -> Fingerprint {
    let mut tokens = descr.split_whitespace();
    let vendor = tokens.next().unwrap_or("Unknown").to_string();
    let model_tokens: Vec<&str> = tokens.by_ref().take(2).collect();
    let model = if model_tokens.is_empty() {
        "Unknown".to_string()
    } else {
        model_tokens.join(" ")
    };

    Fingerprint {
        vendor,
        model,
        device_type: "router".to_string(),
        firmware: firmware_version(descr),
    }
}

fn firmware_version(descr: &str) -> Option<String> {
    firmware_re()
        .captures(descr)
        .map(|caps| caps[1].to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
