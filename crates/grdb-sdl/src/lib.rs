//! grdb Schema Definition Language
//!
//! This crate provides the lexer and parser for grdb's declarative schema
//! language. A schema is a set of module blocks declaring object types,
//! scalar types, properties, links, constraints and indexes:
//!
//! ```text
//! module default {
//!     scalar type post_status extending str {
//!         constraint one_of('draft', 'published');
//!     }
//!
//!     abstract type Auditable {
//!         required property created_at -> datetime {
//!             default := datetime_current();
//!         }
//!     }
//!
//!     type User extending Auditable {
//!         required property name -> str;
//!         property email -> str {
//!             constraint exclusive;
//!         }
//!         multi link posts -> Post {
//!             on target delete allow;
//!         }
//!         index on (name);
//!     }
//! }
//! ```
//!
//! Parsing produces a purely syntactic [`SchemaDocument`]; lowering into a
//! resolved schema catalog lives in `grdb-core`.
//!
//! # Usage
//!
//! ```rust
//! use grdb_sdl::parse_schema;
//!
//! let doc = parse_schema("module default { type User; }").unwrap();
//! assert_eq!(doc.modules[0].name.value, "default");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export main types
pub use ast::{
    CardinalityKw, ConstraintDecl, Declaration, IndexDecl, LinkDecl, ModuleDecl, ObjectTypeDecl,
    OnTargetDeleteKw, PropertyDecl, ScalarTypeDecl, SchemaDocument, TypeItem,
};
pub use error::ParseError;
pub use span::{Span, Spanned};

/// Parse an SDL source string into a document.
///
/// # Example
///
/// ```rust
/// use grdb_sdl::parse_schema;
///
/// let doc = parse_schema("module default { type Base; }").unwrap();
/// assert_eq!(doc.modules.len(), 1);
/// ```
pub fn parse_schema(source: &str) -> Result<SchemaDocument, ParseError> {
    parser::Parser::new(source).parse_document()
}
