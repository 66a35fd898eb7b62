//! Generated resource record storage.
//!
//! Every (name, kind) pair maps to a *set* of targets: an IP literal for A and
//! AAAA records, a `host:port` string for SRV records. Inserting a triple that
//! is already present is a no-op, and a name never maps to an empty set.

use hickory_proto::rr::RecordType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::trace;

use crate::enumeration::{EnumerableRecord, EnumerableTask};

/// Kind of generated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    /// IPv4 address record.
    #[serde(rename = "A")]
    A,
    /// IPv6 address record.
    #[serde(rename = "AAAA")]
    Aaaa,
    /// Service locator record.
    #[serde(rename = "SRV")]
    Srv,
}

impl RecordKind {
    /// All kinds, in export order.
    pub const ALL: [RecordKind; 3] = [RecordKind::A, RecordKind::Aaaa, RecordKind::Srv];

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Srv => "SRV",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecordKind> for RecordType {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::A => RecordType::A,
            RecordKind::Aaaa => RecordType::AAAA,
            RecordKind::Srv => RecordType::SRV,
        }
    }
}

/// Flat, serializable form of one record kind: name -> targets.
pub type AxfrResourceRecordSet = BTreeMap<String, Vec<String>>;

/// Name -> set of distinct targets, for a single record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl RecordSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `target` under `name`. Returns `false` if the pair already existed
    /// or `target` is empty; no entry is created in that case.
    pub fn insert(&mut self, name: &str, target: &str) -> bool {
        if target.is_empty() {
            return false;
        }
        match self.entries.get_mut(name) {
            Some(targets) => targets.insert(target.to_string()),
            None => {
                self.entries
                    .insert(name.to_string(), BTreeSet::from([target.to_string()]));
                true
            }
        }
    }

    /// Any one target stored under `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|targets| targets.iter().next())
            .map(String::as_str)
    }

    /// All targets stored under `name`.
    pub fn get(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(name)
    }

    /// Whether the exact pair is present.
    pub fn contains(&self, name: &str, target: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|targets| targets.contains(target))
    }

    /// Iterate over names and their targets.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(name, targets)| (name.as_str(), targets))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no names are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (name, target) pairs.
    pub fn record_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Materialize the set for external consumers.
    pub fn to_axfr(&self) -> AxfrResourceRecordSet {
        self.entries
            .iter()
            .map(|(name, targets)| (name.clone(), targets.iter().cloned().collect()))
            .collect()
    }
}

/// One [`RecordSet`] per record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    a: RecordSet,
    aaaa: RecordSet,
    srv: RecordSet,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The set holding records of `kind`.
    pub fn by_kind(&self, kind: RecordKind) -> &RecordSet {
        match kind {
            RecordKind::A => &self.a,
            RecordKind::Aaaa => &self.aaaa,
            RecordKind::Srv => &self.srv,
        }
    }

    fn by_kind_mut(&mut self, kind: RecordKind) -> &mut RecordSet {
        match kind {
            RecordKind::A => &mut self.a,
            RecordKind::Aaaa => &mut self.aaaa,
            RecordKind::Srv => &mut self.srv,
        }
    }

    /// Insert a record; returns whether it was new.
    pub fn insert(&mut self, name: &str, target: &str, kind: RecordKind) -> bool {
        let added = self.by_kind_mut(kind).insert(name, target);
        if added {
            trace!("[{kind}]\t{name}: {target}");
        }
        added
    }

    /// Insert a record on behalf of `task`, appending it to the task's
    /// enumeration only when it was new.
    pub fn insert_tracked(
        &mut self,
        name: &str,
        target: &str,
        kind: RecordKind,
        task: &mut EnumerableTask,
    ) -> bool {
        let added = self.insert(name, target, kind);
        if added {
            task.records.push(EnumerableRecord {
                name: name.to_string(),
                host: target.to_string(),
                rtype: kind,
            });
        }
        added
    }

    /// Whether the exact triple is present.
    pub fn contains(&self, name: &str, target: &str, kind: RecordKind) -> bool {
        self.by_kind(kind).contains(name, target)
    }

    /// Any one target stored under `name` for `kind`.
    pub fn first(&self, name: &str, kind: RecordKind) -> Option<&str> {
        self.by_kind(kind).first(name)
    }

    /// Export the records of `kind`.
    pub fn export(&self, kind: RecordKind) -> AxfrResourceRecordSet {
        self.by_kind(kind).to_axfr()
    }
}

/// Every record kind in exportable form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExport {
    /// A records.
    #[serde(rename = "A")]
    pub a: AxfrResourceRecordSet,
    /// AAAA records.
    #[serde(rename = "AAAA")]
    pub aaaa: AxfrResourceRecordSet,
    /// SRV records.
    #[serde(rename = "SRV")]
    pub srv: AxfrResourceRecordSet,
}

impl From<&RecordStore> for RecordExport {
    fn from(store: &RecordStore) -> Self {
        Self {
            a: store.export(RecordKind::A),
            aaaa: store.export(RecordKind::Aaaa),
            srv: store.export(RecordKind::Srv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut store = RecordStore::new();
        assert!(store.insert("leader.mesos.", "10.0.0.1", RecordKind::A));
        assert!(!store.insert("leader.mesos.", "10.0.0.1", RecordKind::A));

        let targets = store.by_kind(RecordKind::A).get("leader.mesos.").unwrap();
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_kinds_are_separate() {
        let mut store = RecordStore::new();
        assert!(store.insert("n.mesos.", "10.0.0.1", RecordKind::A));
        assert!(store.insert("n.mesos.", "10.0.0.1", RecordKind::Srv));
        assert!(store.by_kind(RecordKind::Aaaa).is_empty());
    }

    #[test]
    fn test_empty_target_creates_no_entry() {
        let mut store = RecordStore::new();
        assert!(!store.insert("web.marathon.mesos.", "", RecordKind::A));
        assert!(store.by_kind(RecordKind::A).get("web.marathon.mesos.").is_none());
        assert!(store.first("web.marathon.mesos.", RecordKind::A).is_none());
    }

    #[test]
    fn test_first_returns_a_member() {
        let mut store = RecordStore::new();
        store.insert("slave.mesos.", "10.0.0.9", RecordKind::A);
        store.insert("slave.mesos.", "10.0.0.8", RecordKind::A);

        let first = store.first("slave.mesos.", RecordKind::A).unwrap();
        assert!(store.contains("slave.mesos.", first, RecordKind::A));
    }

    #[test]
    fn test_insert_tracked_skips_duplicates() {
        let mut store = RecordStore::new();
        let mut task = EnumerableTask {
            name: "web".to_string(),
            id: "task-1".to_string(),
            records: Vec::new(),
        };

        store.insert_tracked("web.marathon.mesos.", "10.0.0.9", RecordKind::A, &mut task);
        store.insert_tracked("web.marathon.mesos.", "10.0.0.9", RecordKind::A, &mut task);
        store.insert_tracked("web.marathon.mesos.", "", RecordKind::A, &mut task);

        assert_eq!(task.records.len(), 1);
        assert_eq!(task.records[0].rtype, RecordKind::A);
        assert_eq!(task.records[0].host, "10.0.0.9");
    }

    #[test]
    fn test_export_is_complete() {
        let mut store = RecordStore::new();
        store.insert("master.mesos.", "10.0.0.1", RecordKind::A);
        store.insert("master.mesos.", "10.0.0.2", RecordKind::A);
        store.insert("master.mesos.", "10.0.0.2", RecordKind::A);
        store.insert("_leader._tcp.mesos.", "leader.mesos.:5050", RecordKind::Srv);

        let export = RecordExport::from(&store);
        assert_eq!(
            export.a.get("master.mesos.").unwrap(),
            &vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]
        );
        assert_eq!(export.srv.len(), 1);
        assert!(export.aaaa.is_empty());
    }

    #[test]
    fn test_record_kind_maps_to_record_type() {
        assert_eq!(RecordType::from(RecordKind::Aaaa), RecordType::AAAA);
        assert_eq!(RecordKind::Srv.to_string(), "SRV");
    }
}
