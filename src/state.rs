//! Typed model of the Mesos master `state.json` document.
//!
//! Only the fields record generation needs are modelled; everything else in
//! the document is ignored during deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;

use crate::error::GeneratorError;
use crate::names::{parse_ip, split_host_port};

/// Task state eligible for DNS records.
pub const TASK_RUNNING: &str = "TASK_RUNNING";

/// Status label carrying the Docker containerizer IP.
pub const DOCKER_IP_LABEL: &str = "Docker.NetworkSettings.IPAddress";

/// Status label carrying the Mesos containerizer IP.
pub const MESOS_IP_LABEL: &str = "MesosContainerizer.NetworkSettings.IPAddress";

/// Snapshot of the cluster as reported by the leading master.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct State {
    /// Leading master PID, `master@host:port`.
    pub leader: String,
    /// Registered frameworks and their tasks.
    pub frameworks: Vec<Framework>,
    /// Registered agents.
    pub slaves: Vec<Slave>,
}

/// A libprocess PID: `id@host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upid {
    /// Process identifier, e.g. `slave(1)`.
    pub id: String,
    /// Host the process listens on.
    pub host: String,
    /// Port the process listens on.
    pub port: u16,
}

impl FromStr for Upid {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, addr) = s
            .split_once('@')
            .ok_or_else(|| GeneratorError::InvalidAddress(s.to_string()))?;
        let (host, port) = split_host_port(addr)?;
        Ok(Self {
            id: id.to_string(),
            host,
            port,
        })
    }
}

impl fmt::Display for Upid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}@[{}]:{}", self.id, self.host, self.port)
        } else {
            write!(f, "{}@{}:{}", self.id, self.host, self.port)
        }
    }
}

/// Absent, null and empty PIDs all mean "no PID".
fn deserialize_pid<'de, D>(deserializer: D) -> Result<Option<Upid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// A registered framework.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Framework {
    /// Human-readable framework name.
    pub name: String,
    /// Scheduler driver PID, absent for HTTP API frameworks.
    #[serde(deserialize_with = "deserialize_pid")]
    pub pid: Option<Upid>,
    /// Host the scheduler registered from.
    pub hostname: String,
    /// Tasks launched by this framework.
    pub tasks: Vec<Task>,
}

impl Framework {
    /// Host and driver port of the scheduler. Without a PID only the
    /// registered hostname is known.
    pub fn host_port(&self) -> (&str, Option<u16>) {
        match &self.pid {
            Some(pid) => (pid.host.as_str(), Some(pid.port)),
            None => (self.hostname.as_str(), None),
        }
    }
}

/// A registered agent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Slave {
    /// Agent identifier.
    pub id: String,
    /// Agent hostname.
    pub hostname: String,
    /// Agent process PID.
    #[serde(deserialize_with = "deserialize_pid")]
    pub pid: Option<Upid>,
}

impl Slave {
    /// Host the agent listens on, preferring the PID host.
    pub fn host(&self) -> &str {
        self.pid
            .as_ref()
            .map_or(self.hostname.as_str(), |pid| pid.host.as_str())
    }

    /// Port the agent listens on, if known.
    pub fn port(&self) -> Option<u16> {
        self.pid.as_ref().map(|pid| pid.port)
    }
}

/// A task scheduled onto an agent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Task {
    /// Task identifier.
    pub id: String,
    /// Task name.
    pub name: String,
    /// Owning framework identifier.
    pub framework_id: String,
    /// Agent running the task.
    pub slave_id: String,
    /// Current task state, e.g. `TASK_RUNNING`.
    pub state: String,
    /// Status updates, in no guaranteed order.
    pub statuses: Vec<Status>,
    /// Allocated resources.
    pub resources: Resources,
    /// Optional service discovery metadata.
    pub discovery: Option<DiscoveryInfo>,
}

impl Task {
    /// Whether the task is running.
    pub fn is_running(&self) -> bool {
        self.state == TASK_RUNNING
    }

    /// Discovery metadata, if present with a name.
    pub fn discovery_info(&self) -> Option<&DiscoveryInfo> {
        self.discovery.as_ref().filter(|d| !d.name.is_empty())
    }

    /// Whether the task carries named discovery metadata.
    pub fn has_discovery_info(&self) -> bool {
        self.discovery_info().is_some()
    }

    /// Individual ports allocated to the task.
    pub fn ports(&self) -> Vec<u16> {
        self.resources.ports()
    }

    /// Pick the task's address from the first IP source that yields one.
    ///
    /// `slave_ip` answers the [`IpSource::Host`] strategy.
    pub fn ip(&self, sources: &[IpSource], slave_ip: &str) -> Option<String> {
        self.ips(sources, slave_ip)
            .into_iter()
            .next()
            .map(|ip| ip.to_string())
    }

    /// All addresses of the first IP source that yields any.
    pub fn ips(&self, sources: &[IpSource], slave_ip: &str) -> Vec<IpAddr> {
        for source in sources {
            let ips: Vec<IpAddr> = source
                .candidates(self, slave_ip)
                .iter()
                .filter_map(|ip| parse_ip(ip))
                .collect();
            if !ips.is_empty() {
                return ips;
            }
        }
        Vec::new()
    }

    /// The running status with the greatest timestamp.
    fn latest_running_status(&self) -> Option<&Status> {
        self.statuses
            .iter()
            .filter(|s| s.state == TASK_RUNNING)
            .fold(None, |latest: Option<&Status>, s| match latest {
                Some(l) if l.timestamp >= s.timestamp => Some(l),
                _ => Some(s),
            })
    }
}

/// Strategy for choosing a task's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpSource {
    /// The agent's address.
    Host,
    /// The Mesos containerizer IP label.
    Mesos,
    /// The Docker containerizer IP label.
    Docker,
    /// Container network info addresses.
    Netinfo,
}

impl IpSource {
    /// Default preference order.
    pub fn defaults() -> Vec<IpSource> {
        vec![IpSource::Netinfo, IpSource::Mesos, IpSource::Host]
    }

    fn candidates(self, task: &Task, slave_ip: &str) -> Vec<String> {
        match self {
            Self::Host => vec![slave_ip.to_string()],
            Self::Mesos => task
                .latest_running_status()
                .map(|s| s.label_values(MESOS_IP_LABEL))
                .unwrap_or_default(),
            Self::Docker => task
                .latest_running_status()
                .map(|s| s.label_values(DOCKER_IP_LABEL))
                .unwrap_or_default(),
            Self::Netinfo => task
                .latest_running_status()
                .map(Status::network_ips)
                .unwrap_or_default(),
        }
    }
}

/// A task status update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Status {
    /// Task state at the time of the update.
    pub state: String,
    /// Seconds since the epoch.
    pub timestamp: f64,
    /// Labels attached by the containerizer.
    pub labels: Vec<Label>,
    /// Container details.
    pub container_status: ContainerStatus,
}

impl Status {
    fn label_values(&self, key: &str) -> Vec<String> {
        self.labels
            .iter()
            .filter(|l| l.key == key)
            .map(|l| l.value.clone())
            .collect()
    }

    fn network_ips(&self) -> Vec<String> {
        self.container_status
            .network_infos
            .iter()
            .flat_map(NetworkInfo::ips)
            .collect()
    }
}

/// Key/value label.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Label {
    /// Label key.
    pub key: String,
    /// Label value.
    pub value: String,
}

/// Container status details.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContainerStatus {
    /// Networks the container joined.
    pub network_infos: Vec<NetworkInfo>,
}

/// A container network attachment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkInfo {
    /// Addresses on this network.
    pub ip_addresses: Vec<IpAddress>,
    /// Single address reported by older agents.
    pub ip_address: String,
}

impl NetworkInfo {
    fn ips(&self) -> Vec<String> {
        let mut ips: Vec<String> = self
            .ip_addresses
            .iter()
            .map(|a| a.ip_address.clone())
            .filter(|ip| !ip.is_empty())
            .collect();
        if ips.is_empty() && !self.ip_address.is_empty() {
            ips.push(self.ip_address.clone());
        }
        ips
    }
}

/// One address of a network attachment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IpAddress {
    /// The address literal.
    pub ip_address: String,
}

/// Allocated resources.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Resources {
    /// Port ranges, e.g. `[31000-31002, 31005-31005]`.
    #[serde(rename = "ports")]
    pub port_ranges: String,
}

impl Resources {
    /// Expand the port ranges into individual ports.
    pub fn ports(&self) -> Vec<u16> {
        let inner = self
            .port_ranges
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');

        let mut ports = Vec::new();
        for range in inner.split(',').map(str::trim).filter(|r| !r.is_empty()) {
            let (lo, hi) = range.split_once('-').unwrap_or((range, range));
            match (lo.trim().parse::<u16>(), hi.trim().parse::<u16>()) {
                (Ok(lo), Ok(hi)) => ports.extend(lo..=hi),
                _ => debug!(range, "skipping malformed port range"),
            }
        }
        ports
    }
}

/// Service discovery metadata attached to a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoveryInfo {
    /// Service name overriding the task name.
    pub name: String,
    /// Declared service ports.
    pub ports: DiscoveryPorts,
}

/// Wrapper matching the document's `ports.ports` nesting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoveryPorts {
    /// Declared ports.
    #[serde(rename = "ports")]
    pub discovery_ports: Vec<DiscoveryPort>,
}

/// A declared service port.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoveryPort {
    /// Port number.
    pub number: u16,
    /// Protocol, e.g. `tcp`; empty means both tcp and udp.
    pub protocol: String,
    /// Optional port alias.
    pub name: String,
}
