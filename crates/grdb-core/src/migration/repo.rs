//! On-disk migration repository: `migrations/NNNNN.ddl`.

use crate::migration::error::MigrationError;
use crate::migration::hash::INITIAL_PARENT;
use crate::migration::script::MigrationScript;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension for migration scripts.
pub const MIGRATION_EXT: &str = "ddl";

/// A migration script with its position in the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedMigration {
    /// One-based sequence number, matching the file name.
    pub number: u32,
    /// Path the script was read from.
    pub path: PathBuf,
    /// The verified script.
    pub script: MigrationScript,
}

impl NumberedMigration {
    /// File name for a given sequence number.
    pub fn file_name(number: u32) -> String {
        format!("{number:05}.{MIGRATION_EXT}")
    }
}

/// The migrations directory of a project.
#[derive(Debug, Clone)]
pub struct MigrationRepo {
    dir: PathBuf,
}

impl MigrationRepo {
    /// Point at a migrations directory. It does not need to exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this repository reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load and verify all migrations.
    ///
    /// Checks three invariants: every file parses and matches its embedded
    /// hash, numbering starts at 00001 with no gaps, and each migration's
    /// parent is the id of the one before it.
    pub fn load(&self) -> Result<Vec<NumberedMigration>, MigrationError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| MigrationError::io(self.dir.display().to_string(), e))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| MigrationError::io(self.dir.display().to_string(), e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MIGRATION_EXT) {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            let number = stem.parse::<u32>().map_err(|_| MigrationError::InvalidScript {
                file: file_label(&path),
                message: "migration files must be named NNNNN.ddl".to_string(),
            })?;
            numbered.push((number, path));
        }
        numbered.sort_by_key(|(n, _)| *n);

        let mut migrations = Vec::with_capacity(numbered.len());
        let mut expected_parent = INITIAL_PARENT.to_string();
        for (index, (number, path)) in numbered.into_iter().enumerate() {
            let expected_number = index as u32 + 1;
            if number != expected_number {
                return Err(MigrationError::BadNumbering {
                    expected: expected_number,
                    found: number,
                });
            }
            let content = fs::read_to_string(&path)
                .map_err(|e| MigrationError::io(path.display().to_string(), e))?;
            let script = MigrationScript::parse_file(&file_label(&path), &content)?;
            if script.parent != expected_parent {
                return Err(MigrationError::BrokenChain {
                    file: file_label(&path),
                    stated_parent: script.parent.clone(),
                    actual_parent: expected_parent,
                });
            }
            expected_parent = script.id.clone();
            migrations.push(NumberedMigration {
                number,
                path,
                script,
            });
        }

        debug!(count = migrations.len(), dir = %self.dir.display(), "loaded migrations");
        Ok(migrations)
    }

    /// Id of the last migration on disk, if any.
    pub fn latest_id(&self) -> Result<Option<String>, MigrationError> {
        Ok(self.load()?.last().map(|m| m.script.id.clone()))
    }

    /// Write a script as migration `number`, creating the directory if
    /// needed. Refuses to overwrite an existing file.
    pub fn write(&self, script: &MigrationScript, number: u32) -> Result<PathBuf, MigrationError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| MigrationError::io(self.dir.display().to_string(), e))?;
        let path = self.dir.join(NumberedMigration::file_name(number));
        if path.exists() {
            return Err(MigrationError::io(
                path.display().to_string(),
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "migration file already exists",
                ),
            ));
        }
        fs::write(&path, script.render_file())
            .map_err(|e| MigrationError::io(path.display().to_string(), e))?;
        debug!(number, id = %script.id, path = %path.display(), "wrote migration");
        Ok(path)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectTypeDef;
    use crate::migration::DdlStatement;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_stmt(name: &str) -> DdlStatement {
        DdlStatement::CreateType(ObjectTypeDef::new(name))
    }

    fn drop_stmt(name: &str) -> DdlStatement {
        DdlStatement::DropType { name: name.into() }
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let repo = MigrationRepo::new(tmp.path().join("migrations"));
        assert!(repo.load().unwrap().is_empty());
        assert_eq!(repo.latest_id().unwrap(), None);
    }

    #[test]
    fn test_write_and_load_chain() {
        let tmp = TempDir::new().unwrap();
        let repo = MigrationRepo::new(tmp.path().join("migrations"));

        let first = MigrationScript::new(None, vec![create_stmt("default::User")]);
        let second = MigrationScript::new(Some(&first.id), vec![create_stmt("default::Post")]);
        repo.write(&first, 1).unwrap();
        repo.write(&second, 2).unwrap();

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].number, 1);
        assert_eq!(loaded[0].script, first);
        assert_eq!(loaded[1].script.parent, first.id);
        assert_eq!(repo.latest_id().unwrap(), Some(second.id));
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let repo = MigrationRepo::new(tmp.path().join("migrations"));
        let script = MigrationScript::new(None, vec![create_stmt("default::User")]);
        repo.write(&script, 1).unwrap();
        assert!(repo.write(&script, 1).is_err());
    }

    #[test]
    fn test_gap_in_numbering_detected() {
        let tmp = TempDir::new().unwrap();
        let repo = MigrationRepo::new(tmp.path().join("migrations"));
        let first = MigrationScript::new(None, vec![create_stmt("default::User")]);
        let second = MigrationScript::new(Some(&first.id), vec![drop_stmt("default::User")]);
        repo.write(&first, 1).unwrap();
        repo.write(&second, 3).unwrap();

        let err = repo.load().unwrap_err();
        assert!(matches!(
            err,
            MigrationError::BadNumbering {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_broken_chain_detected() {
        let tmp = TempDir::new().unwrap();
        let repo = MigrationRepo::new(tmp.path().join("migrations"));
        let first = MigrationScript::new(None, vec![create_stmt("default::User")]);
        // Second migration chains onto a parent that is not the first.
        let stray = MigrationScript::new(Some(&first.id), vec![create_stmt("default::Post")]);
        let second = MigrationScript::new(Some(&stray.id), vec![drop_stmt("default::Post")]);
        repo.write(&first, 1).unwrap();
        repo.write(&second, 2).unwrap();

        let err = repo.load().unwrap_err();
        assert!(matches!(err, MigrationError::BrokenChain { .. }));
    }

    #[test]
    fn test_tampered_file_detected_on_load() {
        let tmp = TempDir::new().unwrap();
        let repo = MigrationRepo::new(tmp.path().join("migrations"));
        let script = MigrationScript::new(None, vec![create_stmt("default::User")]);
        let path = repo.write(&script, 1).unwrap();

        let tampered = std::fs::read_to_string(&path)
            .unwrap()
            .replace("default::User", "default::Admin");
        std::fs::write(&path, tampered).unwrap();

        let err = repo.load().unwrap_err();
        assert!(matches!(err, MigrationError::HashMismatch { .. }));
    }

    #[test]
    fn test_unrelated_files_ignored() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("migrations");
        let repo = MigrationRepo::new(&dir);
        let script = MigrationScript::new(None, vec![create_stmt("default::User")]);
        repo.write(&script, 1).unwrap();
        std::fs::write(dir.join(".applied.json"), "[]").unwrap();
        std::fs::write(dir.join("README.md"), "notes").unwrap();

        assert_eq!(repo.load().unwrap().len(), 1);
    }
}
