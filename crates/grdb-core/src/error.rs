//! Top-level error type for grdb-core.

use thiserror::Error;

/// Errors surfaced by the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse an SDL source file.
    #[error("schema parse error in {path}: {message}")]
    SchemaParse {
        /// Path of the offending file.
        path: String,
        /// Rendered diagnostic.
        message: String,
    },

    /// Failed to lower parsed SDL into a schema.
    #[error("schema error in {path}: {message}")]
    SchemaLower {
        /// Path of the offending file.
        path: String,
        /// Rendered diagnostic.
        message: String,
    },

    /// Migration engine error.
    #[error(transparent)]
    Migration(#[from] crate::migration::MigrationError),

    /// I/O error with path context.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
