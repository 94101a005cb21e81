//! Applying migrations: replaying history into a schema snapshot and
//! advancing the applied log.

use crate::catalog::Schema;
use crate::migration::error::MigrationError;
use crate::migration::log::{self, MigrationLog, MigrationStatus};
use crate::migration::repo::{MigrationRepo, NumberedMigration};
use tracing::info;

/// Replay migrations in order into a schema snapshot.
///
/// This is the only way the current schema is ever computed; the schema
/// directory is never consulted for it.
pub fn replay(migrations: &[NumberedMigration]) -> Result<Schema, MigrationError> {
    let mut schema = Schema::new();
    for migration in migrations {
        for (index, stmt) in migration.script.statements.iter().enumerate() {
            stmt.apply_to(&mut schema, true)
                .map_err(|source| MigrationError::ReplayFailed {
                    id: migration.script.id.clone(),
                    statement_index: index,
                    source,
                })?;
        }
    }
    Ok(schema)
}

/// Result of an apply run.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    /// Ids applied during this run, oldest first.
    pub applied: Vec<String>,
    /// Whether the log was left untouched.
    pub dry_run: bool,
    /// Schema after all migrations on disk.
    pub schema: Schema,
}

/// Apply all pending migrations, recording them in the log.
///
/// The whole chain is replayed first, so a broken migration is detected
/// before the log is advanced. With `dry_run` the log is not written.
pub fn apply_pending(repo: &MigrationRepo, dry_run: bool) -> Result<ApplyReport, MigrationError> {
    let migrations = repo.load()?;
    let mut log = MigrationLog::load(repo.dir())?;

    if let MigrationStatus::Diverged {
        number,
        logged,
        on_disk,
    } = log::status(&log, &migrations)
    {
        return Err(MigrationError::Diverged {
            number,
            logged,
            on_disk,
        });
    }

    let schema = replay(&migrations)?;

    let pending = &migrations[log.len()..];
    let applied: Vec<String> = pending.iter().map(|m| m.script.id.clone()).collect();
    if !dry_run {
        for migration in pending {
            log.record(migration);
            info!(number = migration.number, id = %migration.script.id, "applied migration");
        }
        log.save(repo.dir())?;
    }

    Ok(ApplyReport {
        applied,
        dry_run,
        schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ObjectTypeDef, PropertyDef, ScalarRef};
    use crate::migration::ddl::{AlterTypeOp, DdlStatement};
    use crate::migration::script::MigrationScript;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn seed_repo(dir: &std::path::Path) -> (MigrationRepo, Vec<MigrationScript>) {
        let repo = MigrationRepo::new(dir);
        let first = MigrationScript::new(
            None,
            vec![DdlStatement::CreateType(
                ObjectTypeDef::new("default::User")
                    .with_property(PropertyDef::new("name", ScalarRef::str()).required()),
            )],
        );
        let second = MigrationScript::new(
            Some(&first.id),
            vec![DdlStatement::AlterType {
                name: "default::User".into(),
                ops: vec![AlterTypeOp::AddProperty(PropertyDef::new(
                    "email",
                    ScalarRef::str(),
                ))],
            }],
        );
        repo.write(&first, 1).unwrap();
        repo.write(&second, 2).unwrap();
        (repo, vec![first, second])
    }

    #[test]
    fn test_replay_builds_schema() {
        let tmp = TempDir::new().unwrap();
        let (repo, _) = seed_repo(tmp.path());
        let schema = replay(&repo.load().unwrap()).unwrap();
        let user = schema.get_object_type("default::User").unwrap();
        assert!(user.get_property("name").unwrap().required);
        assert!(user.get_property("email").is_some());
    }

    #[test]
    fn test_apply_records_log() {
        let tmp = TempDir::new().unwrap();
        let (repo, scripts) = seed_repo(tmp.path());

        let report = apply_pending(&repo, false).unwrap();
        assert_eq!(report.applied, vec![scripts[0].id.clone(), scripts[1].id.clone()]);

        let log = MigrationLog::load(repo.dir()).unwrap();
        assert_eq!(log.len(), 2);

        // A second run has nothing to do.
        let report = apply_pending(&repo, false).unwrap();
        assert!(report.applied.is_empty());
    }

    #[test]
    fn test_dry_run_leaves_log_alone() {
        let tmp = TempDir::new().unwrap();
        let (repo, _) = seed_repo(tmp.path());

        let report = apply_pending(&repo, true).unwrap();
        assert_eq!(report.applied.len(), 2);
        assert!(MigrationLog::load(repo.dir()).unwrap().is_empty());
    }

    #[test]
    fn test_apply_refuses_diverged_history() {
        let tmp = TempDir::new().unwrap();
        let (repo, _) = seed_repo(tmp.path());
        apply_pending(&repo, false).unwrap();

        let mut log = MigrationLog::load(repo.dir()).unwrap();
        log.entries[0].id = "m1forged".to_string();
        log.save(repo.dir()).unwrap();

        let err = apply_pending(&repo, false).unwrap_err();
        assert!(matches!(err, MigrationError::Diverged { number: 1, .. }));
    }
}
