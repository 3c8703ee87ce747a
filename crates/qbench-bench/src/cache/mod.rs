//! Persistent storage of task artifacts.
//!
//! Entries are keyed by (workflow identifier, task, timestamp) and are
//! append-only: writing an existing key fails. A missing entry is a normal
//! cache miss, reported as `None` rather than an error.

mod file;
mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use crate::error::BenchResult;
use crate::task::{Task, Timestamp};

/// Byte-oriented artifact store.
pub trait TaskCache: Send + Sync {
    /// All timestamps stored for `(workflow, task)`, ascending.
    fn timestamps(&self, workflow: &str, task: Task) -> BenchResult<Vec<Timestamp>>;

    /// Read one entry.
    fn read(&self, workflow: &str, task: Task, timestamp: Timestamp)
    -> BenchResult<Option<Vec<u8>>>;

    /// Store a new entry. Fails if the key already exists.
    fn write(&self, workflow: &str, task: Task, timestamp: Timestamp, bytes: &[u8])
    -> BenchResult<()>;

    /// Whether any entry exists for `(workflow, task)`.
    fn has(&self, workflow: &str, task: Task) -> BenchResult<bool> {
        Ok(self.latest_timestamp(workflow, task)?.is_some())
    }

    /// Most recent timestamp for `(workflow, task)`.
    fn latest_timestamp(&self, workflow: &str, task: Task) -> BenchResult<Option<Timestamp>> {
        Ok(self.timestamps(workflow, task)?.last().copied())
    }

    /// Most recent entry for `(workflow, task)`.
    fn read_latest(&self, workflow: &str, task: Task) -> BenchResult<Option<(Timestamp, Vec<u8>)>> {
        match self.latest_timestamp(workflow, task)? {
            Some(ts) => Ok(self.read(workflow, task, ts)?.map(|bytes| (ts, bytes))),
            None => Ok(None),
        }
    }
}
