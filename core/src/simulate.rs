//! Synthetic discovery results for deployments where real probing is
//! disabled. Anchored to the request's start address so repeated simulated
//! scans over the same range look consistent to a human.

use std::net::Ipv4Addr;

use chrono::Utc;
use rand::Rng;
use rand::seq::{IndexedRandom, IteratorRandom};

use sondr_common::model::device::DiscoveredDevice;

const MIN_DEVICES: u32 = 3;
const MAX_DEVICES: u32 = 10;

const PORT_CANDIDATES: [u16; 7] = [22, 23, 80, 161, 443, 8080, 8443];

struct VendorProfile {
    vendor: &'static str,
    device_type: &'static str,
    models: &'static [&'static str],
}

const CATALOG: [VendorProfile; 7] = [
    VendorProfile {
        vendor: "Cisco",
        device_type: "router",
        models: &["ISR 4331", "Catalyst 9300", "ASR 1001-X"],
    },
    VendorProfile {
        vendor: "Juniper",
        device_type: "router",
        models: &["MX204", "SRX340", "EX4300"],
    },
    VendorProfile {
        vendor: "MikroTik",
        device_type: "router",
        models: &["CCR2004", "RB5009", "hEX S"],
    },
    VendorProfile {
        vendor: "Fortinet",
        device_type: "firewall",
        models: &["FortiGate 60F", "FortiGate 100F"],
    },
    VendorProfile {
        vendor: "HP",
        device_type: "switch",
        models: &["ProCurve 2530", "Aruba 6100"],
    },
    VendorProfile {
        vendor: "Ubiquiti",
        device_type: "router",
        models: &["EdgeRouter 4", "UDM Pro"],
    },
    VendorProfile {
        vendor: "Sophos",
        device_type: "firewall",
        models: &["XGS 116", "XGS 136", "XG 210"],
    },
];

/// Generates a plausible device list at consecutive offsets from `start`.
pub fn generate(start: Ipv4Addr) -> Vec<DiscoveredDevice> {
    let mut rng = rand::rng();
    let count = rng.random_range(MIN_DEVICES..=MAX_DEVICES);
    let base: u32 = start.into();

    (0..count)
        .map(|offset| {
            let ip = Ipv4Addr::from(base.wrapping_add(offset));
            let profile = CATALOG.choose(&mut rng).expect("catalog is non-empty");
            let model = profile.models.choose(&mut rng).expect("models non-empty");
            let firmware = format!(
                "{}.{}.{}",
                rng.random_range(1..20),
                rng.random_range(0..10),
                rng.random_range(0..10)
            );
            let open_ports = random_ports(&mut rng);
            let sophos_device = profile.vendor == "Sophos";

            DiscoveredDevice {
                ip,
                hostname: format!(
                    "{}-{}",
                    profile.vendor.to_ascii_lowercase(),
                    ip.octets()[3]
                ),
                device_type: profile.device_type.to_string(),
                vendor: profile.vendor.to_string(),
                model: model.to_string(),
                firmware: Some(firmware.clone()),
                snmp_reachable: true,
                reachable: true,
                open_ports,
                response_time_ms: rng.random_range(5..=150),
                mac: Some(random_mac(&mut rng)),
                community: "public".to_string(),
                raw_descr: format!("{} {} {}", profile.vendor, model, firmware),
                sophos_device,
                discovered_at: Utc::now(),
            }
        })
        .collect()
}

fn random_ports(rng: &mut impl Rng) -> Vec<u16> {
    let take = rng.random_range(1..=PORT_CANDIDATES.len());
    let mut ports: Vec<u16> = PORT_CANDIDATES
        .iter()
        .copied()
        .choose_multiple(rng, take);
    ports.sort_unstable();
    ports
}

fn random_mac(rng: &mut impl Rng) -> String {
    let octets: [u8; 6] = rng.random();
    octets
        .iter()
        .map(|o| format!("{o:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_count_stays_in_bounds() {
        for _ in 0..50 {
            let devices = generate(Ipv4Addr::new(10, 0, 0, 1));
            assert!((MIN_DEVICES..=MAX_DEVICES).contains(&(devices.len() as u32)));
        }
    }

    #[test]
    fn addresses_are_unique_and_anchored_to_start() {
        let start = Ipv4Addr::new(192, 168, 50, 10);
        let devices = generate(start);

        assert_eq!(devices[0].ip, start);
        let mut ips: Vec<_> = devices.iter().map(|d| d.ip).collect();
        ips.dedup();
        assert_eq!(ips.len(), devices.len());
    }

    #[test]
    fn ports_come_from_the_candidate_list() {
        let devices = generate(Ipv4Addr::new(10, 0, 0, 1));
        for device in &devices {
            assert!(!device.open_ports.is_empty());
            for port in &device.open_ports {
                assert!(PORT_CANDIDATES.contains(port));
            }
        }
    }

    #[test]
    fn sophos_devices_carry_the_vendor_flag() {
        // Enough iterations to see every vendor with overwhelming odds.
        let mut saw_sophos = false;
        for _ in 0..100 {
            for device in generate(Ipv4Addr::new(10, 0, 0, 1)) {
                assert_eq!(device.sophos_device, device.vendor == "Sophos");
                saw_sophos |= device.sophos_device;
            }
        }
        assert!(saw_sophos);
    }

    #[test]
    fn mac_addresses_are_well_formed() {
        for device in generate(Ipv4Addr::new(10, 0, 0, 1)) {
            let mac = device.mac.expect("simulated devices carry a MAC");
            assert_eq!(mac.split(':').count(), 6);
        }
    }
}
