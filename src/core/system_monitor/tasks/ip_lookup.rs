//! Local and public IP address lookup.

use std::net::{IpAddr, UdpSocket};
use std::time::Duration;

use crate::core::sampler::Collector;
use crate::core::system_monitor::IpSnapshot;
use crate::error::{Result, SysdeckError};

/// Shown instead of the public address when the lookup fails.
pub const OFFLINE: &str = "Offline";

const LOOPBACK: &str = "127.0.0.1";
// Connecting a UDP socket sends nothing; it only selects the outbound interface
const ROUTE_TARGET: &str = "8.8.8.8:80";

/// Collector for the IP row of the monitoring panel.
///
/// Polling frequency: 60 seconds. The HTTP request carries its own timeout,
/// which must stay below the sampler's stop timeout.
pub struct IpLookupCollector {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl IpLookupCollector {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("sysdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn fetch_public_ip(&self) -> Result<String> {
        let response = self.client.get(&self.endpoint).send()?;
        if !response.status().is_success() {
            return Err(SysdeckError::other(format!(
                "IP lookup returned status {}",
                response.status()
            )));
        }

        parse_ip_body(&response.text()?)
    }
}

impl Collector for IpLookupCollector {
    type Snapshot = IpSnapshot;

    fn name(&self) -> &str {
        "ip"
    }

    fn collect(&mut self) -> Result<IpSnapshot> {
        let public_ip = self.fetch_public_ip().unwrap_or_else(|e| {
            log::debug!("Public IP lookup failed: {}", e);
            OFFLINE.to_string()
        });

        Ok(IpSnapshot {
            local_ip: local_ip(),
            public_ip,
        })
    }
}

/// Address of the interface used for outbound traffic, or loopback.
pub fn local_ip() -> String {
    let discover = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(ROUTE_TARGET)?;
        Ok(socket.local_addr()?.ip())
    };

    match discover() {
        Ok(ip) if !ip.is_unspecified() => ip.to_string(),
        _ => LOOPBACK.to_string(),
    }
}

/// The endpoint answers with the bare address as plain text.
fn parse_ip_body(body: &str) -> Result<String> {
    let trimmed = body.trim();
    trimmed
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| SysdeckError::other(format!("unexpected IP lookup response: {:?}", trimmed)))
}
