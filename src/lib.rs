//! Mesos Records - DNS records generated from Mesos cluster state.
//!
//! This crate turns one snapshot of a Mesos cluster (leading master,
//! frameworks, agents and tasks) into the A, AAAA and SRV records a
//! Mesos-DNS style server answers from. Generation is a pure function of the
//! snapshot, the configuration and a hostname [`Resolver`]; serving the
//! records over DNS is left to the caller.
//!
//! ## Features
//!
//! - Framework, agent, leader and `masterN` records
//! - Per-task A/AAAA records, both shared (`web.marathon.mesos.`) and unique
//!   per instance (`web-<hash>-<agent>.marathon.mesos.`)
//! - SRV records for task ports and declared discovery ports
//! - Configurable task address sources (netinfo, mesos, docker, host)
//! - RFC 1123 or legacy RFC 952 label sanitization
//! - A frameworks -> tasks -> records enumeration for HTTP APIs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         mesos-records                           │
//! │                                                                 │
//! │  ┌──────────────────┐    ┌──────────────────┐                  │
//! │  │   StateLoader    │───▶│ RecordGenerator  │                  │
//! │  │ (state.json)     │    │ (one snapshot)   │                  │
//! │  └──────────────────┘    └────────┬─────────┘                  │
//! │                                   │ publish                     │
//! │  ┌──────────────────┐             ▼                             │
//! │  │    Resolver      │    ┌──────────────────┐                  │
//! │  │ (hosts, ifaces)  │    │  SharedRecords   │◀── lookups       │
//! │  └──────────────────┘    └──────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use mesos_records::{FileStateLoader, GeneratorConfig, RecordKind, SharedRecords, SystemResolver};
//!
//! let config = GeneratorConfig::with_domain("mesos");
//! let records = SharedRecords::new();
//! records.refresh(&FileStateLoader::new("state.json"), &config, &SystemResolver)?;
//!
//! for ip in records.lookup("leader.mesos.", RecordKind::A) {
//!     println!("{ip}");
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod enumeration;
pub mod error;
pub mod generator;
pub mod labels;
pub mod loader;
mod masters;
pub mod metrics;
pub mod names;
pub mod records;
pub mod resolver;
pub mod shared;
pub mod srv;
pub mod state;
mod tasks;
pub mod telemetry;

// Re-export main types
pub use config::{Config, GeneratorConfig, TelemetryConfig};
pub use enumeration::EnumerationData;
pub use error::GeneratorError;
pub use generator::{Diagnostic, RecordGenerator, Severity};
pub use labels::HostnameSpec;
pub use loader::{FileStateLoader, StateLoader};
pub use records::{RecordExport, RecordKind, RecordStore};
pub use resolver::{Resolver, StaticResolver, SystemResolver};
pub use shared::SharedRecords;
pub use state::{IpSource, State};
