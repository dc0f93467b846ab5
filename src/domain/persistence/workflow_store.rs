use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::workflow::workflow::WorkflowDocument;
use crate::error::Result;
use crate::loader::parser::{parse_json_file, to_pretty_json};

pub const DEFAULT_STORE_DIR: &str = "generated_workflows";
pub const LATEST_FILE_NAME: &str = "latest_workflow.json";
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Where one `persist` call put its two copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPaths {
    pub archive: PathBuf,
    pub latest: PathBuf,
}

/// File-backed storage for generated documents: a timestamped archive copy per call plus one
/// "latest" copy that is replaced on every call.
///
/// Assumes a single writer. Every file is written to a temporary sibling first and renamed into
/// place, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct WorkflowStore {
    directory: PathBuf,
}

impl WorkflowStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        WorkflowStore { directory: directory.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn latest_path(&self) -> PathBuf {
        self.directory.join(LATEST_FILE_NAME)
    }

    /// Best-effort persistence: failures are logged and reported as `None`.
    pub fn persist(&self, document: &WorkflowDocument) -> Option<PersistedPaths> {
        match self.try_persist(document) {
            Ok(paths) => {
                log::info!("Workflow '{}' saved to '{}' and '{}'.", document.name, paths.archive.display(), paths.latest.display());
                Some(paths)
            }
            Err(e) => {
                log::error!("Failed to persist workflow '{}' in '{}': {}", document.name, self.directory.display(), e);
                None
            }
        }
    }

    pub fn try_persist(&self, document: &WorkflowDocument) -> Result<PersistedPaths> {
        fs::create_dir_all(&self.directory)?;
        let encoded = to_pretty_json(document)?;

        let archive = self.next_archive_path();
        write_atomically(&archive, encoded.as_bytes())?;

        let latest = self.latest_path();
        write_atomically(&latest, encoded.as_bytes())?;

        Ok(PersistedPaths { archive, latest })
    }

    /// The most recently persisted document, or `None` when nothing was persisted yet.
    pub fn load_latest(&self) -> Result<Option<WorkflowDocument>> {
        let latest = self.latest_path();
        if !latest.exists() {
            return Ok(None);
        }

        let document = parse_json_file::<WorkflowDocument>(&latest)?;
        log::debug!("Loaded latest workflow '{}' from '{}'.", document.name, latest.display());
        Ok(Some(document))
    }

    /// Archive files, oldest first.
    pub fn archived(&self) -> Result<Vec<PathBuf>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }

        let mut archives: Vec<PathBuf> = fs::read_dir(&self.directory)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_archive_file(path))
            .collect();
        archives.sort();
        Ok(archives)
    }

    fn next_archive_path(&self) -> PathBuf {
        let stamp = Local::now().format(ARCHIVE_TIMESTAMP_FORMAT).to_string();
        let mut candidate = self.directory.join(format!("workflow_{}.json", stamp));
        let mut suffix = 1;

        while candidate.exists() {
            candidate = self.directory.join(format!("workflow_{}_{}.json", stamp, suffix));
            suffix += 1;
        }

        candidate
    }
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_DIR)
    }
}

fn is_archive_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    name.starts_with("workflow_") && name.ends_with(".json")
}

fn write_atomically(target: &Path, contents: &[u8]) -> Result<()> {
    let mut temporary = target.as_os_str().to_owned();
    temporary.push(".tmp");
    let temporary = PathBuf::from(temporary);

    let written = write_then_rename(&temporary, target, contents);
    if written.is_err() && temporary.exists() {
        let _ = fs::remove_file(&temporary);
    }
    written
}

fn write_then_rename(temporary: &Path, target: &Path, contents: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temporary)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temporary, target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_names_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkflowStore::new(dir.path());

        let first = store.next_archive_path();
        fs::write(&first, b"{}").unwrap();
        let second = store.next_archive_path();

        assert_ne!(first, second);
        assert!(is_archive_file(&first));
        assert!(is_archive_file(&second));
    }

    #[test]
    fn test_latest_file_is_not_an_archive() {
        assert!(!is_archive_file(Path::new("generated_workflows/latest_workflow.json")));
        assert!(!is_archive_file(Path::new("generated_workflows/workflow_1.json.tmp")));
    }

    #[test]
    fn test_atomic_write_leaves_no_temporary() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");

        write_atomically(&target, b"first").unwrap();
        write_atomically(&target, b"second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        assert!(!dir.path().join("out.json.tmp").exists());
    }

    #[test]
    fn test_failed_write_leaves_no_temporary() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        assert!(write_atomically(&target, b"contents").is_err());
        assert!(!dir.path().join("occupied.json.tmp").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_load_latest_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkflowStore::new(dir.path().join("missing"));
        assert!(store.load_latest().unwrap().is_none());
        assert!(store.archived().unwrap().is_empty());
    }
}
