//! Configuration types for mesos-records.

use hickory_proto::rr::Name;
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::labels::HostnameSpec;
use crate::state::IpSource;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record generation configuration.
    #[serde(default)]
    pub records: GeneratorConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Record generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Domain records are generated under (e.g., "mesos").
    /// A trailing dot is accepted and ignored.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Fallback master addresses (`host:port`). Their order is the order
    /// `masterN` names are assigned in.
    #[serde(default)]
    pub masters: Vec<String>,

    /// Address the DNS server binds to. "0.0.0.0" publishes every local
    /// non-loopback IPv4 address instead.
    #[serde(default = "default_listener")]
    pub listener: String,

    /// Primary nameserver name listed in SOA replies (e.g., "ns1.mesos").
    #[serde(default = "default_soa_mname")]
    pub soa_mname: String,

    /// Ordered preference of task address sources.
    #[serde(default = "IpSource::defaults")]
    pub ip_sources: Vec<IpSource>,

    /// Sanitize labels with the legacy RFC 952 rules instead of RFC 1123.
    #[serde(default)]
    pub enforce_rfc952: bool,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "mesos_records=trace,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_domain() -> String {
    "mesos".to_string()
}

fn default_listener() -> String {
    "0.0.0.0".to_string()
}

fn default_soa_mname() -> String {
    "ns1.mesos".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            masters: Vec::new(),
            listener: default_listener(),
            soa_mname: default_soa_mname(),
            ip_sources: IpSource::defaults(),
            enforce_rfc952: false,
        }
    }
}

impl GeneratorConfig {
    /// Configuration for `domain` with every other field defaulted.
    pub fn with_domain(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    /// The domain without leading or trailing dots.
    pub fn domain(&self) -> &str {
        self.domain.trim_matches('.')
    }

    /// The SOA primary nameserver as a fully-qualified name.
    pub fn soa_mname_fqdn(&self) -> String {
        let mname = self.soa_mname.trim_end_matches('.');
        format!("{mname}.")
    }

    /// Label rules selected by `enforce_rfc952`.
    pub fn hostname_spec(&self) -> HostnameSpec {
        if self.enforce_rfc952 {
            HostnameSpec::Rfc952
        } else {
            HostnameSpec::Rfc1123
        }
    }

    /// Check the configuration before generating records.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.domain().is_empty() {
            return Err(GeneratorError::Config("domain must not be empty".to_string()));
        }
        Name::from_ascii(self.domain())
            .map_err(|e| GeneratorError::Config(format!("invalid domain {:?}: {e}", self.domain)))?;
        Name::from_ascii(self.soa_mname_fqdn()).map_err(|e| {
            GeneratorError::Config(format!("invalid soa_mname {:?}: {e}", self.soa_mname))
        })?;
        if self.ip_sources.is_empty() {
            return Err(GeneratorError::Config(
                "ip_sources must name at least one source".to_string(),
            ));
        }
        Ok(())
    }
}
