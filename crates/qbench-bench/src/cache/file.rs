//! File-per-artifact cache on disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::TaskCache;
use crate::error::{BenchError, BenchResult};
use crate::task::{Task, Timestamp};

/// [`TaskCache`] storing each entry at `<root>/<workflow>/<task>/<timestamp>.json`.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open a cache rooted at `root`. Directories are created on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_dir(&self, workflow: &str, task: Task) -> PathBuf {
        self.root.join(workflow).join(task.name())
    }

    fn entry_path(&self, workflow: &str, task: Task, timestamp: Timestamp) -> PathBuf {
        self.slot_dir(workflow, task).join(format!("{timestamp}.json"))
    }
}

impl TaskCache for FileCache {
    fn timestamps(&self, workflow: &str, task: Task) -> BenchResult<Vec<Timestamp>> {
        let dir = self.slot_dir(workflow, task);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(BenchError::storage(workflow, task, None, e)),
        };

        let mut timestamps = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| BenchError::storage(workflow, task, None, e))?
                .path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<i64>().ok())
            {
                Some(ts) => timestamps.push(Timestamp(ts)),
                None => warn!("Skipping unrecognized cache file {:?}", path),
            }
        }
        timestamps.sort_unstable();
        Ok(timestamps)
    }

    fn read(
        &self,
        workflow: &str,
        task: Task,
        timestamp: Timestamp,
    ) -> BenchResult<Option<Vec<u8>>> {
        let path = self.entry_path(workflow, task, timestamp);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BenchError::storage(workflow, task, Some(timestamp), e)),
        }
    }

    fn write(
        &self,
        workflow: &str,
        task: Task,
        timestamp: Timestamp,
        bytes: &[u8],
    ) -> BenchResult<()> {
        let storage = |e: std::io::Error| BenchError::storage(workflow, task, Some(timestamp), e);

        let dir = self.slot_dir(workflow, task);
        fs::create_dir_all(&dir).map_err(storage)?;
        let path = self.entry_path(workflow, task, timestamp);

        // Staged under a dot-name without the `.json` extension, so a failed
        // write never leaves a visible entry behind.
        let mut staged = NamedTempFile::new_in(&dir).map_err(storage)?;
        staged.write_all(bytes).map_err(storage)?;
        match staged.persist_noclobber(&path) {
            Ok(_) => {}
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                return Err(BenchError::storage(
                    workflow,
                    task,
                    Some(timestamp),
                    format!("entry {} already exists", path.display()),
                ));
            }
            Err(e) => return Err(storage(e.error)),
        }
        debug!("Wrote cache entry {:?}", path);
        Ok(())
    }
}
