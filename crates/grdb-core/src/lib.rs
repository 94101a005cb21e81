//! grdb core: schema catalog and migration engine.
//!
//! This crate turns parsed SDL (from `grdb-sdl`) into a resolved schema
//! catalog and manages migration history for a project:
//!
//! ```rust,no_run
//! use grdb_core::migration::{Planner, ProjectLayout};
//!
//! let planner = Planner::new(ProjectLayout::new("."));
//! let plan = planner.plan().unwrap();
//! for proposal in &plan.proposals {
//!     println!("{} (confidence {:.2})", proposal.prompt, proposal.confidence);
//! }
//! ```
//!
//! The schema directory declares the desired state; the migration chain is
//! the source of truth for the current state. See [`migration`] for the
//! engine and [`catalog`] for the type model.

pub mod catalog;
pub mod error;
pub mod migration;

pub use catalog::Schema;
pub use error::Error;

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
