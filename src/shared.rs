//! Published record snapshot shared with readers.
//!
//! A snapshot is never mutated after publication. Refreshing builds a whole
//! new [`RecordGenerator`] and swaps it in, so readers always see either the
//! previous or the next snapshot, never a partial one.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::generator::{RecordGenerator, Severity};
use crate::loader::StateLoader;
use crate::metrics;
use crate::records::RecordKind;
use crate::resolver::Resolver;

/// Thread-safe handle to the current record snapshot.
#[derive(Debug, Clone)]
pub struct SharedRecords {
    inner: Arc<RwLock<SharedRecordsInner>>,
}

#[derive(Debug)]
struct SharedRecordsInner {
    /// Current snapshot.
    generator: Arc<RecordGenerator>,

    /// Serial number for SOA (incremented on every publish)
    serial: u32,

    /// True once a snapshot has been published.
    ready: bool,
}

impl Default for SharedRecords {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedRecords {
    /// Create a handle holding an empty snapshot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SharedRecordsInner {
                generator: Arc::new(RecordGenerator::default()),
                serial: 0,
                ready: false,
            })),
        }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, generator: RecordGenerator) {
        let generator = Arc::new(generator);
        let mut inner = self.inner.write();
        inner.generator = generator;
        inner.serial = inner.serial.wrapping_add(1);
        inner.ready = true;
        debug!(serial = inner.serial, "published record snapshot");
    }

    /// Load a fresh state, generate records and publish them.
    ///
    /// On failure the previous snapshot stays published and the error is
    /// returned so the caller can retry later.
    pub fn refresh(
        &self,
        loader: &dyn StateLoader,
        config: &GeneratorConfig,
        resolver: &dyn Resolver,
    ) -> Result<(), GeneratorError> {
        match RecordGenerator::from_loader(loader, config, resolver) {
            Ok(generator) => {
                info!(
                    frameworks = generator.enumeration().frameworks.len(),
                    tasks = generator.enumeration().task_count(),
                    "generated record snapshot"
                );
                self.publish(generator);
                self.emit_metrics();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, serial = self.serial(), "keeping previous record snapshot");
                Err(e)
            }
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<RecordGenerator> {
        Arc::clone(&self.inner.read().generator)
    }

    /// Targets of `name` for `kind` in the current snapshot.
    /// Returns empty vec if name not found.
    pub fn lookup(&self, name: &str, kind: RecordKind) -> Vec<String> {
        let inner = self.inner.read();
        inner
            .generator
            .records(kind)
            .get(name)
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get current SOA serial.
    pub fn serial(&self) -> u32 {
        self.inner.read().serial
    }

    /// Whether any snapshot has been published.
    pub fn is_ready(&self) -> bool {
        self.inner.read().ready
    }

    /// Emit current snapshot metrics.
    pub fn emit_metrics(&self) {
        let inner = self.inner.read();
        let generator = &inner.generator;

        metrics::record_snapshot_counts(
            generator.records(RecordKind::A).len(),
            generator.records(RecordKind::Aaaa).len(),
            generator.records(RecordKind::Srv).len(),
        );
        metrics::record_enumeration_counts(
            generator.enumeration().frameworks.len(),
            generator.enumeration().task_count(),
        );

        let warnings = generator
            .diagnostics()
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        metrics::record_diagnostics(warnings, generator.diagnostics().len() - warnings);
        metrics::record_serial(inner.serial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticResolver;
    use crate::state::State;

    fn leader_state(leader: &str) -> Result<State, GeneratorError> {
        Ok(State {
            leader: leader.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_new_is_empty_and_not_ready() {
        let shared = SharedRecords::new();
        assert!(!shared.is_ready());
        assert_eq!(shared.serial(), 0);
        assert!(shared.lookup("leader.mesos.", RecordKind::A).is_empty());
    }

    #[test]
    fn test_refresh_publishes_snapshot() {
        let shared = SharedRecords::new();
        let loader = |_: &[String]| leader_state("master@10.0.0.1:5050");

        shared
            .refresh(&loader, &GeneratorConfig::default(), &StaticResolver::new())
            .unwrap();

        assert!(shared.is_ready());
        assert_eq!(shared.serial(), 1);
        assert_eq!(shared.lookup("leader.mesos.", RecordKind::A), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let shared = SharedRecords::new();
        let config = GeneratorConfig::default();
        let resolver = StaticResolver::new();

        let good = |_: &[String]| leader_state("master@10.0.0.1:5050");
        shared.refresh(&good, &config, &resolver).unwrap();
        let before = shared.current();

        let empty_leader = |_: &[String]| leader_state("");
        let err = shared.refresh(&empty_leader, &config, &resolver).unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyLeader));

        let failing = |_: &[String]| -> Result<State, GeneratorError> {
            Err(GeneratorError::Config("unreachable master".to_string()))
        };
        assert!(shared.refresh(&failing, &config, &resolver).is_err());

        assert_eq!(shared.serial(), 1);
        assert!(Arc::ptr_eq(&before, &shared.current()));
        assert_eq!(shared.lookup("leader.mesos.", RecordKind::A), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_publish() {
        let shared = SharedRecords::new();
        let resolver = StaticResolver::new();
        let config = GeneratorConfig::default();

        let first = |_: &[String]| leader_state("master@10.0.0.1:5050");
        shared.refresh(&first, &config, &resolver).unwrap();
        let held = shared.current();

        let second = |_: &[String]| leader_state("master@10.0.0.2:5050");
        shared.refresh(&second, &config, &resolver).unwrap();

        assert!(held.store().contains("leader.mesos.", "10.0.0.1", RecordKind::A));
        assert_eq!(shared.lookup("leader.mesos.", RecordKind::A), vec!["10.0.0.2"]);
        assert_eq!(shared.serial(), 2);
    }
}
