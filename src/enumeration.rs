//! Frameworks -> tasks -> records tree built alongside the record store.
//!
//! The tree mirrors exactly the task records that were inserted, so a listing
//! API can show which names each task contributed.

use serde::{Deserialize, Serialize};

use crate::records::RecordKind;

/// A single generated record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerableRecord {
    /// Fully-qualified record name.
    pub name: String,
    /// Record target.
    pub host: String,
    /// Record kind.
    pub rtype: RecordKind,
}

/// Records derived from one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerableTask {
    /// Task name as reported by the orchestrator.
    pub name: String,
    /// Task identifier.
    pub id: String,
    /// Records this task added.
    pub records: Vec<EnumerableRecord>,
}

/// Tasks of one framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerableFramework {
    /// Framework name as reported by the orchestrator.
    pub name: String,
    /// Running tasks with known agents.
    pub tasks: Vec<EnumerableTask>,
}

/// Root of the enumeration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationData {
    /// Every framework in the snapshot, in state order.
    pub frameworks: Vec<EnumerableFramework>,
}

impl EnumerationData {
    /// Iterate over every enumerated record with its owning task.
    pub fn records(&self) -> impl Iterator<Item = (&EnumerableTask, &EnumerableRecord)> {
        self.frameworks
            .iter()
            .flat_map(|f| f.tasks.iter())
            .flat_map(|t| t.records.iter().map(move |r| (t, r)))
    }

    /// Number of enumerated tasks.
    pub fn task_count(&self) -> usize {
        self.frameworks.iter().map(|f| f.tasks.len()).sum()
    }
}
