//! The `migration create` workflow: load history, parse the schema
//! directory, diff, and produce proposals.

use crate::catalog::{lower, Schema};
use crate::error::Error;
use crate::migration::apply::replay;
use crate::migration::ddl::DdlStatement;
use crate::migration::diff::SchemaDiff;
use crate::migration::proposal::{order_statements, propose, Proposal};
use crate::migration::repo::{MigrationRepo, NumberedMigration};
use crate::migration::script::MigrationScript;
use grdb_sdl::SchemaDocument;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// File extension for schema source files.
pub const SCHEMA_EXT: &str = "sdl";

/// Where a project keeps its schema and migrations.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root.
    pub root: PathBuf,
    /// Directory of `*.sdl` schema files.
    pub schema_dir: PathBuf,
    /// Directory of migration files.
    pub migrations_dir: PathBuf,
}

impl ProjectLayout {
    /// Standard layout: `schema/` and `migrations/` under the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            schema_dir: root.join("schema"),
            migrations_dir: root.join("migrations"),
            root,
        }
    }

    /// Override the schema directory.
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = dir.into();
        self
    }
}

/// A prepared migration: where history stands and what the proposal engine
/// suggests.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    /// Id of the migration the new one will chain onto.
    pub parent: Option<String>,
    /// Sequence number the new migration will get.
    pub next_number: u32,
    /// Schema as of the last migration on disk.
    pub current_schema: Schema,
    /// Schema declared in the schema directory.
    pub target_schema: Schema,
    /// The computed diff.
    pub diff: SchemaDiff,
    /// Proposals covering the diff, in application order.
    pub proposals: Vec<Proposal>,
}

impl MigrationPlan {
    /// Whether the schema directory already matches migration history.
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

/// Plans and writes migrations for one project.
#[derive(Debug, Clone)]
pub struct Planner {
    layout: ProjectLayout,
}

impl Planner {
    /// Create a planner over a project layout.
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    /// The project layout.
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// The project's migration repository.
    pub fn repo(&self) -> MigrationRepo {
        MigrationRepo::new(&self.layout.migrations_dir)
    }

    /// Load and verify migration history.
    pub fn history(&self) -> Result<Vec<NumberedMigration>, Error> {
        Ok(self.repo().load()?)
    }

    /// Parse and lower the schema directory into a target schema.
    ///
    /// Files are read in name order so lowering diagnostics are stable. A
    /// missing or empty directory is an empty target schema, which plans a
    /// migration dropping everything.
    pub fn load_target_schema(&self) -> Result<Schema, Error> {
        let dir = &self.layout.schema_dir;
        if !dir.exists() {
            debug!(dir = %dir.display(), "schema directory missing, target is empty");
            return Ok(Schema::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| Error::io(dir.display().to_string(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(SCHEMA_EXT))
            .collect();
        paths.sort();

        let mut documents: Vec<SchemaDocument> = Vec::with_capacity(paths.len());
        for path in &paths {
            let source = fs::read_to_string(path)
                .map_err(|e| Error::io(path.display().to_string(), e))?;
            let doc = grdb_sdl::parse_schema(&source).map_err(|e| Error::SchemaParse {
                path: path.display().to_string(),
                message: e.format_with_source(&source),
            })?;
            documents.push(doc);
        }

        lower(&documents).map_err(|e| Error::SchemaLower {
            path: dir.display().to_string(),
            message: e.message.clone(),
        })
    }

    /// Prepare a migration taking history to the declared schema.
    pub fn plan(&self) -> Result<MigrationPlan, Error> {
        let migrations = self.history()?;
        let current_schema = replay(&migrations).map_err(Error::from)?;
        let target_schema = self.load_target_schema()?;

        let diff = SchemaDiff::compute(&current_schema, &target_schema);
        let proposals = propose(&current_schema, &diff);
        debug!(
            changes = diff.change_count(),
            proposals = proposals.len(),
            "planned migration"
        );

        Ok(MigrationPlan {
            parent: migrations.last().map(|m| m.script.id.clone()),
            next_number: migrations.len() as u32 + 1,
            current_schema,
            target_schema,
            diff,
            proposals,
        })
    }

    /// Write accepted statements as the plan's migration file.
    ///
    /// Statements are put into replay order and the resulting script is
    /// verified by replaying it onto the plan's current schema before
    /// anything touches disk.
    pub fn write_migration(
        &self,
        plan: &MigrationPlan,
        statements: Vec<DdlStatement>,
    ) -> Result<(PathBuf, MigrationScript), Error> {
        let statements = order_statements(statements);
        let script = MigrationScript::new(plan.parent.as_deref(), statements);

        let mut check = plan.current_schema.clone();
        for (index, stmt) in script.statements.iter().enumerate() {
            stmt.apply_to(&mut check, true).map_err(|source| {
                crate::migration::MigrationError::ReplayFailed {
                    id: script.id.clone(),
                    statement_index: index,
                    source,
                }
            })?;
        }

        let path = self.repo().write(&script, plan.next_number)?;
        info!(
            number = plan.next_number,
            id = %script.id,
            statements = script.statements.len(),
            "created migration"
        );
        Ok((path, script))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_schema(layout: &ProjectLayout, content: &str) {
        fs::create_dir_all(&layout.schema_dir).unwrap();
        fs::write(layout.schema_dir.join("default.sdl"), content).unwrap();
    }

    fn accept_all(planner: &Planner, plan: &MigrationPlan) -> MigrationScript {
        let statements: Vec<DdlStatement> = plan
            .proposals
            .iter()
            .flat_map(|p| p.statements.clone())
            .collect();
        planner.write_migration(plan, statements).unwrap().1
    }

    #[test]
    fn test_initial_plan_creates_everything() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        write_schema(
            &layout,
            "module default {\n    type User {\n        required property name -> str;\n    }\n}\n",
        );

        let planner = Planner::new(layout);
        let plan = planner.plan().unwrap();
        assert_eq!(plan.parent, None);
        assert_eq!(plan.next_number, 1);
        assert_eq!(plan.proposals.len(), 1);

        let script = accept_all(&planner, &plan);
        assert_eq!(script.parent, "initial");

        // History now matches the schema directory.
        let plan = planner.plan().unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.parent, Some(script.id));
        assert_eq!(plan.next_number, 2);
    }

    #[test]
    fn test_incremental_plan_chains_onto_parent() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        write_schema(
            &layout,
            "module default {\n    type User {\n        required property name -> str;\n    }\n}\n",
        );
        let planner = Planner::new(layout.clone());
        let first = accept_all(&planner, &planner.plan().unwrap());

        write_schema(
            &layout,
            "module default {\n    type User {\n        required property name -> str;\n        property email -> str;\n    }\n}\n",
        );
        let plan = planner.plan().unwrap();
        assert_eq!(plan.parent, Some(first.id.clone()));
        assert_eq!(plan.proposals.len(), 1);
        assert!(plan.proposals[0].prompt.contains("create property 'email'"));

        let second = accept_all(&planner, &plan);
        assert_eq!(second.parent, first.id);

        let user = planner
            .plan()
            .unwrap()
            .current_schema
            .get_object_type("default::User")
            .unwrap()
            .clone();
        assert!(user.get_property("email").is_some());
    }

    #[test]
    fn test_missing_schema_dir_plans_drops() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        write_schema(&layout, "module default { type User; }");
        let planner = Planner::new(layout.clone());
        accept_all(&planner, &planner.plan().unwrap());

        fs::remove_dir_all(&layout.schema_dir).unwrap();
        let plan = planner.plan().unwrap();
        assert_eq!(plan.proposals.len(), 1);
        assert!(plan.proposals[0].prompt.contains("drop object type"));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        write_schema(&layout, "module default { type }");

        let err = Planner::new(layout).plan().unwrap_err();
        let Error::SchemaParse { path, .. } = err else {
            panic!("expected a parse error, got {err:?}");
        };
        assert!(path.ends_with("default.sdl"));
    }

    #[test]
    fn test_write_migration_rejects_bad_statements() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        write_schema(&layout, "module default { type User; }");
        let planner = Planner::new(layout);
        let plan = planner.plan().unwrap();

        let err = planner
            .write_migration(
                &plan,
                vec![DdlStatement::DropType {
                    name: "default::Ghost".into(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Migration(_)));
    }
}
