use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use log::{info, warn};
use thiserror::Error;
use walkdir::WalkDir;

const BACKUP_PREFIX: &str = "financial_data_";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const SAFETY_COPY_PREFIX: &str = "current_backup_";
const SAFETY_COPY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Error, Debug)]
pub(crate) enum BackupError {
    #[error("backup failed on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("backup '{0}' not found")]
    NotFound(String),

    #[error("'{0}' is not a backup file name")]
    InvalidName(String),

    #[error("backup {0} already exists, try again in a second")]
    AlreadyExists(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BackupInfo {
    pub(crate) filename: String,
    pub(crate) size: u64,
    pub(crate) modified: Option<NaiveDateTime>,
}

/// Timestamped copies of the data file kept in a backup directory
pub(crate) struct BackupManager {
    backup_dir: PathBuf,
    data_file: PathBuf,
}

impl BackupManager {
    pub(crate) fn new(backup_dir: &Path, data_file: &Path) -> BackupManager {
        BackupManager {
            backup_dir: backup_dir.to_path_buf(),
            data_file: data_file.to_path_buf(),
        }
    }

    /// Copy the data file into the backup directory. Returns None when there is no data file yet.
    pub(crate) fn create(&self, now: NaiveDateTime) -> Result<Option<PathBuf>, BackupError> {
        if !self.data_file.exists() {
            info!("No data file at {}, nothing to back up", self.data_file.display());
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir).map_err(|source| self.io_error(&self.backup_dir, source))?;
        let backup_file = self.backup_dir.join(format!("{BACKUP_PREFIX}{}.json", now.format(BACKUP_TIMESTAMP_FORMAT)));
        if backup_file.exists() {
            return Err(BackupError::AlreadyExists(backup_file));
        }
        fs::copy(&self.data_file, &backup_file).map_err(|source| self.io_error(&backup_file, source))?;
        info!("Backup created: {}", backup_file.display());

        Ok(Some(backup_file))
    }

    /// Create a backup when none exists yet or the newest one is at least `interval_days` old
    pub(crate) fn auto_backup(&self, interval_days: u32, now: NaiveDateTime) -> Result<Option<PathBuf>, BackupError> {
        let latest = self.list()?
            .into_iter()
            .map(|b| b.filename)
            .filter(|f| f.starts_with(BACKUP_PREFIX))
            .max();

        let should_backup = match latest {
            None => true,
            Some(filename) => match backup_timestamp(&filename) {
                Some(last_backup) => (now - last_backup).num_days() >= interval_days as i64,
                None => {
                    warn!("Unable to read timestamp from backup {filename}");
                    true
                }
            },
        };

        if should_backup {
            self.create(now)
        } else {
            Ok(None)
        }
    }

    /// All `.json` files in the backup directory, newest name first
    pub(crate) fn list(&self) -> Result<Vec<BackupInfo>, BackupError> {
        if !self.backup_dir.is_dir() {
            return Ok(vec![]);
        }

        let mut backups = vec![];
        for entry in WalkDir::new(&self.backup_dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping backup entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str() else {
                continue;
            };
            if !filename.ends_with(".json") {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Unable to read {}: {e}", entry.path().display());
                    continue;
                }
            };
            let modified = metadata.modified()
                .ok()
                .map(|m| DateTime::<Local>::from(m).naive_local());

            backups.push(BackupInfo {
                filename: filename.to_string(),
                size: metadata.len(),
                modified,
            });
        }

        backups.sort_by(|a, b| b.filename.cmp(&a.filename));
        Ok(backups)
    }

    /// Replace the data file with a backup. The current data file is first copied aside
    /// as a `current_backup_*` file. Returns the path of that copy, if one was made.
    pub(crate) fn restore(&self, filename: &str, now: NaiveDateTime) -> Result<Option<PathBuf>, BackupError> {
        let backup_file = self.backup_path(filename)?;

        let mut safety_copy = None;
        if self.data_file.exists() {
            let path = self.backup_dir.join(format!("{SAFETY_COPY_PREFIX}{}.json", now.format(SAFETY_COPY_TIMESTAMP_FORMAT)));
            fs::copy(&self.data_file, &path).map_err(|source| self.io_error(&path, source))?;
            safety_copy = Some(path);
        }

        fs::copy(&backup_file, &self.data_file).map_err(|source| self.io_error(&self.data_file, source))?;
        info!("Backup restored: {filename}");

        Ok(safety_copy)
    }

    /// Path of an existing backup, given its bare file name
    pub(crate) fn backup_path(&self, filename: &str) -> Result<PathBuf, BackupError> {
        let is_plain_name = Path::new(filename).file_name().and_then(|n| n.to_str()) == Some(filename);
        if !is_plain_name || !filename.ends_with(".json") {
            return Err(BackupError::InvalidName(filename.to_string()));
        }

        let backup_file = self.backup_dir.join(filename);
        if !backup_file.is_file() {
            return Err(BackupError::NotFound(filename.to_string()));
        }
        Ok(backup_file)
    }

    pub(crate) fn latest(&self) -> Result<Option<BackupInfo>, BackupError> {
        Ok(self.list()?.into_iter().next())
    }

    fn io_error(&self, path: &Path, source: io::Error) -> BackupError {
        BackupError::Io { path: path.to_path_buf(), source }
    }
}

/// Parse the timestamp out of `financial_data_YYYY-MM-DD_HH-MM-SS.json`
fn backup_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let timestamp = filename.strip_prefix(BACKUP_PREFIX)?.strip_suffix(".json")?;
    NaiveDateTime::parse_from_str(timestamp, BACKUP_TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use tempfile::TempDir;
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::from_str(s).unwrap()
    }

    fn setup() -> (TempDir, BackupManager) {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("financial_data.json");
        fs::write(&data_file, "{\"transactions\": []}").unwrap();
        let manager = BackupManager::new(&dir.path().join("backups"), &data_file);
        (dir, manager)
    }

    #[test]
    fn test_backup_timestamp() {
        assert_eq!(backup_timestamp("financial_data_2024-03-01_10-20-30.json"), Some(at("2024-03-01T10:20:30")));
        assert_eq!(backup_timestamp("current_backup_20240301_102030.json"), None);
    }

    #[test]
    fn test_create_and_list() {
        let (_dir, manager) = setup();
        let created = manager.create(at("2024-03-01T10:20:30")).unwrap().unwrap();
        assert!(created.ends_with("financial_data_2024-03-01_10-20-30.json"));
        manager.create(at("2024-03-02T10:20:30")).unwrap();

        let backups = manager.list().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].filename, "financial_data_2024-03-02_10-20-30.json");
        assert!(backups[0].size > 0);
    }

    #[test]
    fn test_same_second_backup_is_refused() {
        let (_dir, manager) = setup();
        manager.create(at("2024-03-01T10:20:30")).unwrap();
        assert!(matches!(manager.create(at("2024-03-01T10:20:30")), Err(BackupError::AlreadyExists(_))));
        assert_eq!(manager.list().unwrap().len(), 1);
    }

    #[test]
    fn test_no_data_file_no_backup() {
        let dir = TempDir::new().unwrap();
        let manager = BackupManager::new(&dir.path().join("backups"), &dir.path().join("missing.json"));
        assert_eq!(manager.create(at("2024-03-01T10:20:30")).unwrap(), None);
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn test_auto_backup_interval() {
        let (_dir, manager) = setup();
        assert!(manager.auto_backup(7, at("2024-03-01T10:00:00")).unwrap().is_some());
        assert!(manager.auto_backup(7, at("2024-03-07T09:59:59")).unwrap().is_none());
        assert!(manager.auto_backup(7, at("2024-03-08T10:00:00")).unwrap().is_some());
        assert_eq!(manager.list().unwrap().len(), 2);
    }

    #[test]
    fn test_auto_backup_when_newest_name_is_unreadable() {
        let (dir, manager) = setup();
        manager.create(at("2024-03-01T10:00:00")).unwrap();
        fs::write(dir.path().join("backups").join("financial_data_copy.json"), "{}").unwrap();

        let created = manager.auto_backup(7, at("2024-03-02T10:00:00")).unwrap();
        assert!(created.unwrap().ends_with("financial_data_2024-03-02_10-00-00.json"));
    }

    #[test]
    fn test_restore_keeps_safety_copy() {
        let (dir, manager) = setup();
        manager.create(at("2024-03-01T10:00:00")).unwrap();
        let data_file = dir.path().join("financial_data.json");
        fs::write(&data_file, "changed").unwrap();

        let safety_copy = manager.restore("financial_data_2024-03-01_10-00-00.json", at("2024-03-02T11:00:00")).unwrap().unwrap();
        assert!(safety_copy.ends_with("current_backup_20240302_110000.json"));
        assert_eq!(fs::read_to_string(&safety_copy).unwrap(), "changed");
        assert_eq!(fs::read_to_string(&data_file).unwrap(), "{\"transactions\": []}");

        assert!(matches!(manager.restore("nope.json", at("2024-03-02T11:00:00")), Err(BackupError::NotFound(_))));
        assert!(matches!(manager.restore("../financial_data.json", at("2024-03-02T11:00:00")), Err(BackupError::InvalidName(_))));
    }
}
