//! Applied-migration log: which migrations have been applied, and when.
//!
//! The log lives in `.applied.json` inside the migrations directory. The
//! migration files are the source of truth for schema history; the log only
//! records how far along this copy of the project is.

use crate::migration::error::MigrationError;
use crate::migration::repo::NumberedMigration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Log file name, inside the migrations directory.
pub const LOG_FILE: &str = ".applied.json";

/// One applied migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedMigration {
    /// Migration id.
    pub id: String,
    /// Sequence number of the migration file.
    pub number: u32,
    /// When it was applied.
    pub applied_at: DateTime<Utc>,
    /// Number of statements in the migration.
    pub statements: usize,
}

/// The applied log, in application order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationLog {
    /// Applied migrations, oldest first.
    pub entries: Vec<AppliedMigration>,
}

impl MigrationLog {
    /// Load the log from a migrations directory. A missing file is an empty
    /// log.
    pub fn load(dir: &Path) -> Result<Self, MigrationError> {
        let path = dir.join(LOG_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(MigrationLog::default())
            }
            Err(e) => return Err(MigrationError::io(path.display().to_string(), e)),
        };
        serde_json::from_str(&content).map_err(|e| MigrationError::LogCorrupted(e.to_string()))
    }

    /// Save the log into a migrations directory.
    pub fn save(&self, dir: &Path) -> Result<(), MigrationError> {
        fs::create_dir_all(dir).map_err(|e| MigrationError::io(dir.display().to_string(), e))?;
        let path = dir.join(LOG_FILE);
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MigrationError::LogCorrupted(e.to_string()))?;
        fs::write(&path, content).map_err(|e| MigrationError::io(path.display().to_string(), e))
    }

    /// Record a migration as applied now.
    pub fn record(&mut self, migration: &NumberedMigration) {
        self.entries.push(AppliedMigration {
            id: migration.script.id.clone(),
            number: migration.number,
            applied_at: Utc::now(),
            statements: migration.script.statements.len(),
        });
    }

    /// Number of applied migrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been applied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently applied migration.
    pub fn last(&self) -> Option<&AppliedMigration> {
        self.entries.last()
    }
}

/// How the applied log relates to the migration files.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStatus {
    /// Everything on disk has been applied.
    UpToDate,
    /// This many migrations are waiting to be applied.
    Pending(usize),
    /// The log does not match the files; history was edited after apply.
    Diverged {
        /// Number where the mismatch starts.
        number: u32,
        /// Id the log recorded.
        logged: String,
        /// Id found on disk, or `missing` when the file is gone.
        on_disk: String,
    },
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStatus::UpToDate => write!(f, "up to date"),
            MigrationStatus::Pending(n) => write!(f, "{n} pending"),
            MigrationStatus::Diverged { number, .. } => {
                write!(f, "diverged at {number:05}")
            }
        }
    }
}

/// Compare the applied log against the loaded migration files.
pub fn status(log: &MigrationLog, migrations: &[NumberedMigration]) -> MigrationStatus {
    for (index, entry) in log.entries.iter().enumerate() {
        match migrations.get(index) {
            Some(m) if m.script.id == entry.id => {}
            Some(m) => {
                return MigrationStatus::Diverged {
                    number: m.number,
                    logged: entry.id.clone(),
                    on_disk: m.script.id.clone(),
                }
            }
            None => {
                return MigrationStatus::Diverged {
                    number: entry.number,
                    logged: entry.id.clone(),
                    on_disk: "missing".to_string(),
                }
            }
        }
    }
    match migrations.len() - log.entries.len() {
        0 => MigrationStatus::UpToDate,
        pending => MigrationStatus::Pending(pending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectTypeDef;
    use crate::migration::repo::MigrationRepo;
    use crate::migration::script::MigrationScript;
    use crate::migration::DdlStatement;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn migrations_in(dir: &Path, names: &[&str]) -> Vec<NumberedMigration> {
        let repo = MigrationRepo::new(dir);
        let mut parent: Option<String> = None;
        for (i, name) in names.iter().enumerate() {
            let script = MigrationScript::new(
                parent.as_deref(),
                vec![DdlStatement::CreateType(ObjectTypeDef::new(*name))],
            );
            repo.write(&script, i as u32 + 1).unwrap();
            parent = Some(script.id);
        }
        repo.load().unwrap()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        let log = MigrationLog::load(tmp.path()).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let migrations = migrations_in(tmp.path(), &["default::A", "default::B"]);

        let mut log = MigrationLog::default();
        log.record(&migrations[0]);
        log.save(tmp.path()).unwrap();

        let loaded = MigrationLog::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.last().unwrap().id, migrations[0].script.id);
        assert_eq!(loaded.last().unwrap().number, 1);
    }

    #[test]
    fn test_corrupted_log_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LOG_FILE), "not json").unwrap();
        let err = MigrationLog::load(tmp.path()).unwrap_err();
        assert!(matches!(err, MigrationError::LogCorrupted(_)));
    }

    #[test]
    fn test_status_pending_and_up_to_date() {
        let tmp = TempDir::new().unwrap();
        let migrations = migrations_in(tmp.path(), &["default::A", "default::B"]);

        let mut log = MigrationLog::default();
        assert_eq!(status(&log, &migrations), MigrationStatus::Pending(2));
        log.record(&migrations[0]);
        assert_eq!(status(&log, &migrations), MigrationStatus::Pending(1));
        log.record(&migrations[1]);
        assert_eq!(status(&log, &migrations), MigrationStatus::UpToDate);
    }

    #[test]
    fn test_status_diverged_on_mismatch() {
        let tmp = TempDir::new().unwrap();
        let migrations = migrations_in(tmp.path(), &["default::A"]);

        let mut log = MigrationLog::default();
        log.record(&migrations[0]);
        let mut forged = log.clone();
        forged.entries[0].id = "m1somethingelse".to_string();

        assert!(matches!(
            status(&forged, &migrations),
            MigrationStatus::Diverged { number: 1, .. }
        ));
    }

    #[test]
    fn test_status_diverged_on_missing_file() {
        let tmp = TempDir::new().unwrap();
        let migrations = migrations_in(tmp.path(), &["default::A"]);
        let mut log = MigrationLog::default();
        log.record(&migrations[0]);

        assert!(matches!(
            status(&log, &[]),
            MigrationStatus::Diverged { on_disk, .. } if on_disk == "missing"
        ));
    }
}
