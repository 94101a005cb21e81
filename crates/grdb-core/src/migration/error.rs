//! Migration-specific error types.

use thiserror::Error;

/// Errors from the migration engine.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A migration file's embedded id does not match its recomputed hash.
    #[error("hash mismatch in {file}: header says {expected}, content hashes to {actual}")]
    HashMismatch {
        /// File the mismatch was found in.
        file: String,
        /// Id stated in the file header.
        expected: String,
        /// Id recomputed from the file content.
        actual: String,
    },

    /// A migration file's ONTO parent does not match the preceding migration.
    #[error("broken migration chain at {file}: expects parent {stated_parent}, previous migration is {actual_parent}")]
    BrokenChain {
        /// File where the chain breaks.
        file: String,
        /// Parent stated in the ONTO clause.
        stated_parent: String,
        /// Id of the actual preceding migration.
        actual_parent: String,
    },

    /// Migration numbering has a gap or duplicate.
    #[error("bad migration numbering: expected {expected:05}, found {found:05}")]
    BadNumbering {
        /// The number that should come next.
        expected: u32,
        /// The number actually found.
        found: u32,
    },

    /// A migration file could not be parsed.
    #[error("invalid migration file {file}: {message}")]
    InvalidScript {
        /// The offending file.
        file: String,
        /// What went wrong.
        message: String,
    },

    /// Replaying a migration statement onto the schema failed.
    #[error("migration {id} failed at statement {statement_index}: {source}")]
    ReplayFailed {
        /// Id of the failing migration.
        id: String,
        /// Zero-based index of the failing statement.
        statement_index: usize,
        /// The underlying replay error.
        #[source]
        source: ReplayError,
    },

    /// The applied log references history that no longer matches the files.
    #[error("applied log diverged at {number:05}: log has {logged}, file chain has {on_disk}")]
    Diverged {
        /// Migration number where the divergence starts.
        number: u32,
        /// Id recorded in the applied log.
        logged: String,
        /// Id found in the migration file.
        on_disk: String,
    },

    /// Applied log is corrupted.
    #[error("applied log corrupted: {0}")]
    LogCorrupted(String),

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

impl MigrationError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        MigrationError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from replaying a DDL statement onto a schema snapshot.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Referenced type does not exist.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Created type already exists.
    #[error("type '{0}' already exists")]
    DuplicateType(String),

    /// Referenced member does not exist on the type.
    #[error("type '{type_name}' has no member '{member}'")]
    UnknownMember {
        /// The type being altered.
        type_name: String,
        /// The missing property or link.
        member: String,
    },

    /// Created member already exists on the type.
    #[error("type '{type_name}' already has a member '{member}'")]
    DuplicateMember {
        /// The type being altered.
        type_name: String,
        /// The clashing property or link.
        member: String,
    },

    /// A property was made required without a fill expression.
    #[error("missing required value: cannot make '{type_name}.{member}' required without a USING expression")]
    RequiredWithoutFill {
        /// The type being altered.
        type_name: String,
        /// The property being made required.
        member: String,
    },

    /// A type cannot be dropped while other definitions still reference it.
    #[error("cannot drop type '{type_name}': still referenced by '{referrer}.{member}'")]
    TypeInUse {
        /// The type being dropped.
        type_name: String,
        /// Type holding the remaining reference.
        referrer: String,
        /// Member (or `extending`) holding the reference.
        member: String,
    },

    /// Constraint to drop was not found.
    #[error("no constraint '{constraint}' on '{subject}'")]
    UnknownConstraint {
        /// The property, link or type carrying constraints.
        subject: String,
        /// Rendered form of the missing constraint.
        constraint: String,
    },

    /// Index to drop was not found.
    #[error("no index on ({expr}) for type '{type_name}'")]
    UnknownIndex {
        /// The type being altered.
        type_name: String,
        /// The index expression.
        expr: String,
    },
}
