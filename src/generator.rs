//! Record generation from a cluster state snapshot.
//!
//! A [`RecordGenerator`] is built in one pass over a [`State`]: frameworks,
//! agents, the listener, masters and finally tasks, in that order. The
//! finished generator is immutable; a new snapshot means a new generator.
//!
//! ```text
//! marathon.mesos.                          A     framework host
//! _framework._tcp.marathon.mesos.          SRV   marathon.mesos.:8080
//! slave.mesos.                             A     every agent
//! _slave._tcp.mesos.                       SRV   slave.mesos.:5051
//! leader.mesos. / master.mesos.            A     leading / all masters
//! masterN.mesos.                           A     one per master
//! web.marathon.mesos.                      A     every "web" task
//! web-<hash>-<agent>.marathon.mesos.       A     one task instance
//! _web._tcp.marathon.slave.mesos.          SRV   task ports
//! ```

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, error, info_span, warn};

use crate::config::GeneratorConfig;
use crate::enumeration::EnumerationData;
use crate::error::GeneratorError;
use crate::labels::{domain_frag, HostnameSpec, SEP};
use crate::loader::StateLoader;
use crate::metrics::{self, GenerationResult, Timer};
use crate::names::{host_to_ips, host_to_ipv4, parse_ip};
use crate::records::{AxfrResourceRecordSet, RecordExport, RecordKind, RecordSet, RecordStore};
use crate::resolver::Resolver;
use crate::state::State;

/// Severity of a recoverable generation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected flake, e.g. the leader missing from the fallback masters.
    Warning,
    /// A record could not be produced.
    Error,
}

/// A recoverable problem met while generating records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How bad it is.
    pub severity: Severity,
    /// What happened.
    pub message: String,
}

/// DNS records generated from one cluster state snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecordGenerator {
    pub(crate) records: RecordStore,
    pub(crate) slave_ips: HashMap<String, String>,
    pub(crate) enumeration: EnumerationData,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl RecordGenerator {
    /// Load a snapshot through `loader` and generate its records.
    ///
    /// Loader failures and an empty leader are fatal; nothing is generated.
    pub fn from_loader(
        loader: &dyn StateLoader,
        config: &GeneratorConfig,
        resolver: &dyn Resolver,
    ) -> Result<Self, GeneratorError> {
        let state = loader.load(&config.masters).inspect_err(|e| {
            error!(error = %e, "failed to fetch cluster state");
        })?;
        Self::insert_state(&state, config, resolver)
    }

    /// Generate records for `state`.
    pub fn insert_state(
        state: &State,
        config: &GeneratorConfig,
        resolver: &dyn Resolver,
    ) -> Result<Self, GeneratorError> {
        let timer = Timer::start();
        let result = Self::generate(state, config, resolver);
        metrics::record_generation(
            match &result {
                Ok(_) => GenerationResult::Success,
                Err(_) => GenerationResult::Failure,
            },
            timer.elapsed(),
        );
        result
    }

    fn generate(
        state: &State,
        config: &GeneratorConfig,
        resolver: &dyn Resolver,
    ) -> Result<Self, GeneratorError> {
        if state.leader.is_empty() {
            error!("cluster state has no leader");
            return Err(GeneratorError::EmptyLeader);
        }
        config.validate()?;

        let span = info_span!("generate", domain = config.domain());
        let _enter = span.enter();

        let mut builder = Builder::new(config, resolver);
        builder.framework_records(state);
        builder.slave_records(state);
        builder.listener_record();
        builder.master_records(&state.leader);
        builder.task_records(state);

        let generator = builder.finish();
        debug!(
            a = generator.records.by_kind(RecordKind::A).len(),
            aaaa = generator.records.by_kind(RecordKind::Aaaa).len(),
            srv = generator.records.by_kind(RecordKind::Srv).len(),
            diagnostics = generator.diagnostics.len(),
            "generated records"
        );
        Ok(generator)
    }

    /// Records of `kind`.
    pub fn records(&self, kind: RecordKind) -> &RecordSet {
        self.records.by_kind(kind)
    }

    /// The whole record store.
    pub fn store(&self) -> &RecordStore {
        &self.records
    }

    /// Agent identifier -> representative agent address.
    pub fn slave_ips(&self) -> &HashMap<String, String> {
        &self.slave_ips
    }

    /// Frameworks -> tasks -> records tree.
    pub fn enumeration(&self) -> &EnumerationData {
        &self.enumeration
    }

    /// Recoverable problems met during generation.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Export records of `kind`.
    pub fn export(&self, kind: RecordKind) -> AxfrResourceRecordSet {
        self.records.export(kind)
    }

    /// Export every record kind.
    pub fn export_all(&self) -> RecordExport {
        RecordExport::from(&self.records)
    }
}

/// In-progress generation state. Builders for masters and tasks live in
/// their own modules.
pub(crate) struct Builder<'a> {
    pub(crate) config: &'a GeneratorConfig,
    pub(crate) resolver: &'a dyn Resolver,
    pub(crate) spec: HostnameSpec,
    pub(crate) domain: String,
    pub(crate) out: RecordGenerator,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(config: &'a GeneratorConfig, resolver: &'a dyn Resolver) -> Self {
        Self {
            config,
            resolver,
            spec: config.hostname_spec(),
            domain: config.domain().to_string(),
            out: RecordGenerator::default(),
        }
    }

    pub(crate) fn finish(self) -> RecordGenerator {
        self.out
    }

    /// `<name>.<domain>.`
    pub(crate) fn fqdn(&self, name: &str) -> String {
        format!("{name}.{}.", self.domain)
    }

    pub(crate) fn insert(&mut self, name: &str, target: &str, kind: RecordKind) -> bool {
        self.out.records.insert(name, target, kind)
    }

    /// Insert `ip` under `name` as A or AAAA by address family.
    pub(crate) fn insert_ip(&mut self, name: &str, ip: IpAddr) -> bool {
        self.insert(name, &ip.to_string(), address_kind(ip))
    }

    pub(crate) fn warn(&mut self, message: String) {
        warn!("{message}");
        self.out.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    pub(crate) fn error(&mut self, message: String) {
        error!("{message}");
        self.out.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }

    /// Resolve `host`, reporting a failure against `owner`. An empty result
    /// means the caller skips its records.
    pub(crate) fn resolve(&mut self, host: &str, owner: &str) -> Vec<IpAddr> {
        match host_to_ips(self.resolver, host) {
            Ok(addrs) if !addrs.is_empty() => addrs,
            Ok(_) => {
                self.error(format!("host {host:?} of {owner} has no addresses"));
                Vec::new()
            }
            Err(e) => {
                self.error(format!("cannot resolve host {host:?} of {owner}: {e}"));
                Vec::new()
            }
        }
    }

    /// Resolve `host` to a single IPv4 address, reporting a failure against
    /// `owner`.
    pub(crate) fn resolve_ipv4(&mut self, host: &str, owner: &str) -> Option<Ipv4Addr> {
        match host_to_ipv4(self.resolver, host) {
            Ok(Some(ip)) => Some(ip),
            Ok(None) => {
                self.error(format!("host {host:?} of {owner} has no ip4 address"));
                None
            }
            Err(e) => {
                self.error(format!("cannot resolve host {host:?} of {owner}: {e}"));
                None
            }
        }
    }

    /// Framework records:
    ///
    /// - `<framework>.<domain>.` A/AAAA to the scheduler host
    /// - `_framework._tcp.<framework>.<domain>.` SRV to the driver port
    pub(crate) fn framework_records(&mut self, state: &State) {
        for framework in &state.frameworks {
            let fname = domain_frag(&framework.name, SEP, self.spec);
            let (host, port) = framework.host_port();

            let addrs = self.resolve(host, &format!("framework {:?}", framework.name));
            if addrs.is_empty() {
                continue;
            }

            let a = self.fqdn(&fname);
            for addr in addrs {
                self.insert_ip(&a, addr);
            }
            if let Some(port) = port {
                self.insert(&format!("_framework._tcp.{a}"), &format!("{a}:{port}"), RecordKind::Srv);
            }
        }
    }

    /// Agent records:
    ///
    /// - `slave.<domain>.` A/AAAA to every agent
    /// - `_slave._tcp.<domain>.` SRV to every agent port
    ///
    /// Also fills the agent ID -> address mapping tasks are resolved against.
    pub(crate) fn slave_records(&mut self, state: &State) {
        let a = self.fqdn("slave");
        let srv = self.fqdn("_slave._tcp");

        for slave in &state.slaves {
            let host = slave.host();

            let addrs = self.resolve(host, &format!("agent {:?}", slave.id));
            let slave_ip = addrs.iter().find(|ip| ip.is_ipv4()).map(IpAddr::to_string);
            if !addrs.is_empty() {
                for addr in addrs {
                    self.insert_ip(&a, addr);
                }
                if let Some(port) = slave.port() {
                    self.insert(&srv, &format!("{a}:{port}"), RecordKind::Srv);
                }
            }

            let slave_ip = slave_ip.unwrap_or_else(|| domain_frag(host, SEP, self.spec));
            self.out.slave_ips.insert(slave.id.clone(), slave_ip);
        }
    }

    /// A record for the DNS server itself, under the SOA primary name.
    pub(crate) fn listener_record(&mut self) {
        let config = self.config;
        let ns = config.soa_mname_fqdn();
        let listener = config.listener.as_str();

        match parse_ip(listener) {
            Some(ip) if ip.is_unspecified() => self.local_interface_records(&ns),
            Some(ip) => {
                self.insert_ip(&ns, ip);
            }
            None => match self.resolve_ipv4(listener, "the listener") {
                Some(ip) => {
                    self.insert(&ns, &ip.to_string(), RecordKind::A);
                }
                None => {
                    self.insert(&ns, listener, RecordKind::A);
                }
            },
        }
    }

    /// Every local non-loopback IPv4 address under `ns`.
    fn local_interface_records(&mut self, ns: &str) {
        let addrs = match self.resolver.interface_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                self.error(format!("cannot list local interfaces: {e}"));
                return;
            }
        };

        for ip in addrs.into_iter().map(|ip| ip.to_canonical()) {
            if ip.is_ipv4() && !ip.is_loopback() {
                self.insert_ip(ns, ip);
            }
        }
    }
}

/// A for IPv4, AAAA for IPv6.
pub(crate) fn address_kind(ip: IpAddr) -> RecordKind {
    match ip {
        IpAddr::V4(_) => RecordKind::A,
        IpAddr::V6(_) => RecordKind::Aaaa,
    }
}

/// Record kind for a target that may not be an IP literal; non-IP fallback
/// targets are published as A records.
pub(crate) fn target_kind(target: &str) -> RecordKind {
    parse_ip(target).map_or(RecordKind::A, address_kind)
}
