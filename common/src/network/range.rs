//! # Scan Range Model
//!
//! An inclusive IPv4 address range, the unit of work for one scan.
//!
//! Enumeration is a pure, restartable iterator over the integer form of the
//! endpoints. Ranges larger than [`MAX_RANGE`] are truncated, not rejected:
//! the cap bounds scan cost, it is not a validation failure.

use std::net::Ipv4Addr;

use crate::error::ScanError;

/// Hard ceiling on addresses enumerated per scan, regardless of the
/// requested range size.
pub const MAX_RANGE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    /// Builds a range, rejecting a start address above the end address.
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Result<Self, ScanError> {
        if u32::from(start_addr) > u32::from(end_addr) {
            return Err(ScanError::InvalidRange(format!(
                "start {start_addr} is above end {end_addr}"
            )));
        }
        Ok(Self {
            start_addr,
            end_addr,
        })
    }

    /// Parses two dotted-quad strings into a validated range.
    ///
    /// Malformed octets (non-numeric, > 255, wrong arity) are rejected here
    /// rather than left to wrap during integer conversion.
    pub fn parse(start: &str, end: &str) -> Result<Self, ScanError> {
        let start_addr = parse_addr(start)?;
        let end_addr = parse_addr(end)?;
        Self::new(start_addr, end_addr)
    }

    /// Number of addresses this range enumerates, after the cap.
    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        let span = (end - start) as usize + 1;
        span.min(MAX_RANGE)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ordered enumeration of the range, capped at [`MAX_RANGE`] addresses.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).take(MAX_RANGE).map(Ipv4Addr::from)
    }
}

fn parse_addr(s: &str) -> Result<Ipv4Addr, ScanError> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| ScanError::InvalidRange(format!("'{s}' is not a dotted-quad IPv4 address")))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
