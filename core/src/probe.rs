//! Community-authenticated probe against a single candidate address.
//!
//! Credentials are tried strictly in list order; the first one the device
//! answers wins. Every failure path resolves to `None` so the batch
//! scheduler can treat a silent address exactly like a timed-out one.

use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::trace;

use sondr_protocols::snmp::{self, SNMP_PORT, SysInfo};

/// Slack added on top of the configured timeout. Forces an attempt to
/// resolve even if the socket exchange itself wedges.
const HARD_GUARD: Duration = Duration::from_millis(500);

const RECV_BUF_LEN: usize = 4096;

/// Result of the first successful credential attempt.
#[derive(Debug, Clone)]
pub struct ProbeReply {
    pub descr: String,
    pub name: String,
    /// The community string the device accepted.
    pub community: String,
    /// Elapsed time of the successful attempt only.
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ProbeClient {
    timeout: Duration,
}

impl ProbeClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Probes `addr` with each community in order. Never fails: all socket,
    /// timeout and decode errors collapse into `None`.
    pub async fn probe(&self, addr: Ipv4Addr, communities: &[String]) -> Option<ProbeReply> {
        for community in communities {
            let started = Instant::now();
            let attempt = self.query(addr, community);

            match tokio::time::timeout(self.timeout + HARD_GUARD, attempt).await {
                Ok(Ok(info)) => {
                    let elapsed = started.elapsed();
                    trace!(%addr, ms = elapsed.as_millis() as u64, "probe answered");
                    return Some(ProbeReply {
                        descr: info.descr,
                        name: info.name,
                        community: community.clone(),
                        elapsed,
                    });
                }
                Ok(Err(e)) => trace!(%addr, community, "probe attempt failed: {e:#}"),
                Err(_) => trace!(%addr, community, "probe attempt hit hard deadline"),
            }
        }
        None
    }

    async fn query(&self, addr: Ipv4Addr, community: &str) -> anyhow::Result<SysInfo> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .context("binding probe socket")?;
        socket
            .connect((addr, SNMP_PORT))
            .await
            .context("connecting probe socket")?;

        let request_id: i32 = rand::random_range(1..i32::MAX);
        let request = snmp::encode_get(community, request_id);
        socket.send(&request).await.context("sending query")?;

        let receive = async {
            let mut buf = [0u8; RECV_BUF_LEN];
            loop {
                let n = socket.recv(&mut buf).await.context("receiving response")?;
                // Stray datagrams (late answers to earlier ids, other
                // speakers on the port) are skipped, not fatal.
                match snmp::decode_response(&buf[..n], request_id) {
                    Ok(info) => return Ok(info),
                    Err(e) => trace!(%addr, "discarding datagram: {e}"),
                }
            }
        };

        tokio::time::timeout(self.timeout, receive)
            .await
            .map_err(|_| anyhow::anyhow!("no response within {:?}", self.timeout))?
    }
}
