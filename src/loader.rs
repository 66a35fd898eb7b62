//! Sources of cluster state snapshots.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::GeneratorError;
use crate::state::State;

/// Produces a fully parsed cluster state.
///
/// `masters` are the configured fallback master addresses, which a
/// network-backed loader may use to locate the leader.
pub trait StateLoader {
    /// Fetch and parse one snapshot.
    fn load(&self, masters: &[String]) -> Result<State, GeneratorError>;
}

impl<F> StateLoader for F
where
    F: Fn(&[String]) -> Result<State, GeneratorError>,
{
    fn load(&self, masters: &[String]) -> Result<State, GeneratorError> {
        self(masters)
    }
}

/// Reads a `state.json` document from disk.
#[derive(Debug, Clone)]
pub struct FileStateLoader {
    path: PathBuf,
}

impl FileStateLoader {
    /// Loader for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateLoader for FileStateLoader {
    fn load(&self, _masters: &[String]) -> Result<State, GeneratorError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let state: State = serde_json::from_reader(reader)?;
        debug!(
            path = %self.path.display(),
            frameworks = state.frameworks.len(),
            slaves = state.slaves.len(),
            "loaded cluster state"
        );
        Ok(state)
    }
}
