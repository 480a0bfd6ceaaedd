//! Bind-address and LAN-address discovery for the server-info endpoint
//! and the startup banner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

/// Loopback alias the Android emulator uses to reach its host.
pub const EMULATOR_HOST: &str = "10.0.2.2";

/// Host as it must appear in a URL or `host:port` string: IPv6 literals
/// are bracketed, everything else is returned unchanged.
pub fn host_for_url(host: &str) -> String {
    match host.parse::<Ipv6Addr>() {
        Ok(ip) => format!("[{}]", ip),
        Err(_) => host.to_string(),
    }
}

/// Discover the outward-facing IPv4 address of this host.
///
/// Connecting a UDP socket only selects a route; no packet is sent.
pub fn lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_unspecified() || ip.is_loopback() {
        None
    } else {
        Some(ip)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerUrls {
    pub local: String,
    pub lan: Option<String>,
    pub emulator: String,
}

/// Identity of the running server, computed once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
    pub lan_ip: Option<IpAddr>,
    pub urls: ServerUrls,
    pub capacity: usize,
    pub version: String,
    pub started_at: DateTime<Utc>,
}

impl ServerInfo {
    pub fn new(host: &str, port: u16, lan_ip: Option<IpAddr>, capacity: usize) -> Self {
        // A wildcard bind is reachable on localhost; a specific host is not
        // necessarily.
        let local_host = match host {
            "0.0.0.0" | "::" | "[::]" => "localhost",
            other => other,
        };
        let local_host = host_for_url(local_host);
        Self {
            host: host.to_string(),
            port,
            lan_ip,
            urls: ServerUrls {
                local: format!("http://{}:{}", local_host, port),
                lan: lan_ip.map(|ip| format!("http://{}", SocketAddr::new(ip, port))),
                emulator: format!("http://{}:{}", EMULATOR_HOST, port),
            },
            capacity,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
