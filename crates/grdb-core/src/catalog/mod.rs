//! Schema catalog: the resolved type model of a grdb schema.
//!
//! The catalog is built either by lowering parsed SDL documents
//! ([`lower`]) or by replaying migration DDL (see
//! [`crate::migration::apply`]). Both paths produce the same [`Schema`]
//! snapshot type, which is what the migration engine diffs.

pub mod constraint;
pub mod lower;
pub mod object;
pub mod scalar;
pub mod schema;
pub mod types;

// Re-export main types

pub use constraint::{ConstraintDef, IndexDef};
pub use lower::{lower, LowerError, LowerErrorKind};
pub use object::{LinkDef, ObjectTypeDef, PropertyDef};
pub use scalar::ScalarTypeDef;
pub use schema::Schema;
pub use types::{BuiltinScalar, Cardinality, OnTargetDelete, ScalarRef};
