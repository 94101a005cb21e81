//! Schema migration engine.
//!
//! Migration history is a chain of hash-identified DDL scripts under
//! `migrations/NNNNN.ddl`. The current schema is always reconstructed by
//! replaying that chain ([`apply::replay`]); the schema directory only
//! describes the desired end state. Creating a migration diffs the replayed
//! schema against the declared one ([`planner::Planner`]) and turns the
//! differences into confirmable proposals ([`proposal::propose`]).

pub mod apply;
pub mod ddl;
pub mod diff;
pub mod error;
pub mod hash;
pub mod log;
pub mod parse;
pub mod planner;
pub mod proposal;
pub mod repo;
pub mod script;

// Re-export main types

pub use apply::{apply_pending, replay, ApplyReport};
pub use ddl::{AlterTypeOp, DdlStatement, LinkAlter, PropertyAlter, ScalarAlter};
pub use diff::{LinkChange, PropertyChange, ScalarChange, SchemaDiff, TypeChange};
pub use error::{MigrationError, ReplayError};
pub use hash::{migration_id, INITIAL_PARENT};
pub use log::{status, AppliedMigration, MigrationLog, MigrationStatus};
pub use planner::{MigrationPlan, Planner, ProjectLayout};
pub use proposal::{propose, Proposal, RequiredInput, SafetyClass, AUTO_ACCEPT_THRESHOLD};
pub use repo::{MigrationRepo, NumberedMigration};
pub use script::MigrationScript;
