//! Host name resolution used during record generation.
//!
//! Generation never talks to the network directly; it goes through a
//! [`Resolver`] so lookups can be swapped for a fixed table.

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};

/// Blocking host name resolution and local interface discovery.
pub trait Resolver {
    /// Resolve `host` to every IPv4 and IPv6 address, in resolver order.
    fn lookup_host(&self, host: &str) -> io::Result<Vec<IpAddr>>;

    /// Addresses bound to the local network interfaces.
    fn interface_addrs(&self) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup_host(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in (host, 0).to_socket_addrs()? {
            let ip = addr.ip().to_canonical();
            // getaddrinfo returns one entry per socket type
            if !ips.contains(&ip) {
                ips.push(ip);
            }
        }
        Ok(ips)
    }

    fn interface_addrs(&self) -> io::Result<Vec<IpAddr>> {
        Ok(if_addrs::get_if_addrs()?
            .into_iter()
            .map(|iface| iface.ip())
            .collect())
    }
}

/// Resolver answering from a fixed host table.
///
/// Hosts missing from the table fail with [`io::ErrorKind::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
    interfaces: Vec<IpAddr>,
}

impl StaticResolver {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `host` to `ips`, replacing any previous entry.
    pub fn with_host(mut self, host: &str, ips: &[IpAddr]) -> Self {
        self.hosts.insert(host.to_string(), ips.to_vec());
        self
    }

    /// Set the addresses reported for local interfaces.
    pub fn with_interfaces(mut self, ips: &[IpAddr]) -> Self {
        self.interfaces = ips.to_vec();
        self
    }
}

impl Resolver for StaticResolver {
    fn lookup_host(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.hosts.get(host).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such host: {host}"))
        })
    }

    fn interface_addrs(&self) -> io::Result<Vec<IpAddr>> {
        Ok(self.interfaces.clone())
    }
}
