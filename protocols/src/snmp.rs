//! Minimal SNMP v2c codec for the two system-information queries the probe
//! client sends.
//!
//! Only the subset of BER needed for a GetRequest/GetResponse exchange is
//! implemented: SEQUENCE, INTEGER, OCTET STRING, NULL, OBJECT IDENTIFIER and
//! the context-specific PDU tags, with definite short- and long-form lengths.
//! Anything outside that subset is a decode error, never a panic.

use thiserror::Error;

pub const SNMP_PORT: u16 = 161;

/// v2c wire version value.
const VERSION_2C: i64 = 1;

const TAG_INTEGER: u8 = 0x02;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_NULL: u8 = 0x05;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_GET_REQUEST: u8 = 0xA0;
const TAG_GET_RESPONSE: u8 = 0xA2;

/// sysDescr.0 — the device's self-reported description.
pub const OID_SYS_DESCR: [u32; 9] = [1, 3, 6, 1, 2, 1, 1, 1, 0];
/// sysName.0 — the administratively assigned hostname.
pub const OID_SYS_NAME: [u32; 9] = [1, 3, 6, 1, 2, 1, 1, 5, 0];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnmpError {
    #[error("message truncated")]
    Truncated,
    #[error("expected tag {expected:#04x}, found {found:#04x}")]
    Tag { expected: u8, found: u8 },
    #[error("unsupported BER length encoding")]
    Length,
    #[error("unsupported SNMP version {0}")]
    Version(i64),
    #[error("response id {found} does not match request id {expected}")]
    RequestId { expected: i32, found: i64 },
    #[error("agent returned error-status {0}")]
    ErrorStatus(i64),
    #[error("response carries no sysDescr varbind")]
    MissingSysDescr,
}

/// The decoded payload of a successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysInfo {
    pub descr: String,
    /// Empty when the agent answered sysDescr but not sysName.
    pub name: String,
}

/// Encodes a GetRequest for sysDescr.0 and sysName.0, authenticated by
/// `community`.
pub fn encode_get(community: &str, request_id: i32) -> Vec<u8> {
    let varbinds = tlv(
        TAG_SEQUENCE,
        [
            null_varbind(&OID_SYS_DESCR),
            null_varbind(&OID_SYS_NAME),
        ]
        .concat(),
    );

    let pdu = tlv(
        TAG_GET_REQUEST,
        [
            encode_int(request_id as i64),
            encode_int(0), // error-status
            encode_int(0), // error-index
            varbinds,
        ]
        .concat(),
    );

    tlv(
        TAG_SEQUENCE,
        [
            encode_int(VERSION_2C),
            tlv(TAG_OCTET_STRING, community.as_bytes().to_vec()),
            pdu,
        ]
        .concat(),
    )
}

/// Decodes a GetResponse, checking version, request id and error-status.
///
/// OCTET STRING values are taken as UTF-8, lossily; agents routinely emit
/// vendor-specific bytes in sysDescr.
pub fn decode_response(bytes: &[u8], expected_id: i32) -> Result<SysInfo, SnmpError> {
    let mut msg = Reader::new(bytes);
    let mut msg = msg.enter(TAG_SEQUENCE)?;

    let version = msg.read_int()?;
    if version != VERSION_2C {
        return Err(SnmpError::Version(version));
    }
    let _community = msg.read_slice(TAG_OCTET_STRING)?;

    let mut pdu = msg.enter(TAG_GET_RESPONSE)?;
    let found = pdu.read_int()?;
    if found != expected_id as i64 {
        return Err(SnmpError::RequestId {
            expected: expected_id,
            found,
        });
    }

    let error_status = pdu.read_int()?;
    if error_status != 0 {
        return Err(SnmpError::ErrorStatus(error_status));
    }
    let _error_index = pdu.read_int()?;

    let mut varbinds = pdu.enter(TAG_SEQUENCE)?;
    let mut descr: Option<String> = None;
    let mut name: Option<String> = None;

    while !varbinds.is_empty() {
        let mut varbind = varbinds.enter(TAG_SEQUENCE)?;
        let oid = varbind.read_slice(TAG_OID)?.to_vec();
        let (tag, value) = varbind.read_any()?;

        // Non-string values (noSuchObject, Counter, ...) are ignored.
        if tag != TAG_OCTET_STRING {
            continue;
        }
        let text = String::from_utf8_lossy(value).into_owned();

        if oid == encode_oid(&OID_SYS_DESCR) {
            descr = Some(text);
        } else if oid == encode_oid(&OID_SYS_NAME) {
            name = Some(text);
        }
    }

    Ok(SysInfo {
        descr: descr.ok_or(SnmpError::MissingSysDescr)?,
        name: name.unwrap_or_default(),
    })
}

fn null_varbind(oid: &[u32]) -> Vec<u8> {
    tlv(
        TAG_SEQUENCE,
        [
            tlv(TAG_OID, encode_oid(oid)),
            tlv(TAG_NULL, Vec::new()),
        ]
        .concat(),
    )
}

fn tlv(tag: u8, content: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(tag);
    encode_len(&mut out, content.len());
    out.extend_from_slice(&content);
    out
}

fn encode_len(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

fn encode_int(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    // Strip redundant leading bytes while keeping the sign bit intact.
    let mut start = 0;
    while start < 7 {
        let cur = bytes[start];
        let next = bytes[start + 1];
        let redundant = (cur == 0x00 && next & 0x80 == 0) || (cur == 0xFF && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    tlv(TAG_INTEGER, bytes[start..].to_vec())
}

fn encode_oid(arcs: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(arcs.len());
    if arcs.len() >= 2 {
        out.push((arcs[0] * 40 + arcs[1]) as u8);
    }
    for &arc in &arcs[2.min(arcs.len())..] {
        if arc < 0x80 {
            out.push(arc as u8);
        } else {
            let mut stack = Vec::new();
            let mut v = arc;
            stack.push((v & 0x7F) as u8);
            v >>= 7;
            while v > 0 {
                stack.push((v & 0x7F) as u8 | 0x80);
                v >>= 7;
            }
            stack.reverse();
            out.extend_from_slice(&stack);
        }
    }
    out
}

/// Cursor over a BER byte slice.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn byte(&mut self) -> Result<u8, SnmpError> {
        let b = *self.data.get(self.pos).ok_or(SnmpError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn read_len(&mut self) -> Result<usize, SnmpError> {
        let first = self.byte()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let count = (first & 0x7F) as usize;
        if count == 0 || count > 4 {
            return Err(SnmpError::Length);
        }
        let mut len = 0usize;
        for _ in 0..count {
            len = (len << 8) | self.byte()? as usize;
        }
        Ok(len)
    }

    fn read_content(&mut self, expected: u8) -> Result<&'a [u8], SnmpError> {
        let found = self.byte()?;
        if found != expected {
            return Err(SnmpError::Tag { expected, found });
        }
        let len = self.read_len()?;
        let end = self.pos.checked_add(len).ok_or(SnmpError::Truncated)?;
        if end > self.data.len() {
            return Err(SnmpError::Truncated);
        }
        let content = &self.data[self.pos..end];
        self.pos = end;
        Ok(content)
    }

    /// Descends into a constructed element, yielding a reader over its body.
    fn enter(&mut self, expected: u8) -> Result<Reader<'a>, SnmpError> {
        Ok(Reader::new(self.read_content(expected)?))
    }

    fn read_slice(&mut self, expected: u8) -> Result<&'a [u8], SnmpError> {
        self.read_content(expected)
    }

    fn read_any(&mut self) -> Result<(u8, &'a [u8]), SnmpError> {
        let tag = *self.data.get(self.pos).ok_or(SnmpError::Truncated)?;
        let content = self.read_content(tag)?;
        Ok((tag, content))
    }

    fn read_int(&mut self) -> Result<i64, SnmpError> {
        let content = self.read_content(TAG_INTEGER)?;
        if content.is_empty() || content.len() > 8 {
            return Err(SnmpError::Length);
        }
        let mut value: i64 = if content[0] & 0x80 != 0 { -1 } else { 0 };
        for &b in content {
            value = (value << 8) | b as i64;
        }
        Ok(value)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
