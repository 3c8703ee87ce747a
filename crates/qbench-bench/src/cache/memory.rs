//! In-memory cache for tests and one-shot runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use rustc_hash::FxHashMap;

use super::TaskCache;
use crate::error::{BenchError, BenchResult};
use crate::task::{Task, Timestamp};

type Slot = BTreeMap<Timestamp, Vec<u8>>;

/// Process-local [`TaskCache`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<FxHashMap<(String, Task), Slot>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries.
    pub fn len(&self) -> usize {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.values().map(BTreeMap::len).sum()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskCache for MemoryCache {
    fn timestamps(&self, workflow: &str, task: Task) -> BenchResult<Vec<Timestamp>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries
            .get(&(workflow.to_string(), task))
            .map(|slot| slot.keys().copied().collect())
            .unwrap_or_default())
    }

    fn read(
        &self,
        workflow: &str,
        task: Task,
        timestamp: Timestamp,
    ) -> BenchResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries
            .get(&(workflow.to_string(), task))
            .and_then(|slot| slot.get(&timestamp))
            .cloned())
    }

    fn write(
        &self,
        workflow: &str,
        task: Task,
        timestamp: Timestamp,
        bytes: &[u8],
    ) -> BenchResult<()> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let slot = entries.entry((workflow.to_string(), task)).or_default();
        if slot.contains_key(&timestamp) {
            return Err(BenchError::storage(
                workflow,
                task,
                Some(timestamp),
                "entry already exists",
            ));
        }
        slot.insert(timestamp, bytes.to_vec());
        Ok(())
    }
}
