//! Content-derived migration identities.
//!
//! A migration's id is a function of its parent id and its rendered DDL
//! text, which makes the migration history a hash chain: editing an applied
//! file, reordering files, or splicing in a different parent is detectable
//! by recomputing ids.

use sha2::{Digest, Sha256};

/// Parent name used by the first migration in a chain.
pub const INITIAL_PARENT: &str = "initial";

/// Compute the id for a migration with the given parent and rendered
/// statement text.
pub fn migration_id(parent: Option<&str>, statements_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"ONTO ");
    hasher.update(parent.unwrap_or(INITIAL_PARENT).as_bytes());
    hasher.update(b"\n");
    hasher.update(statements_text.as_bytes());
    format!("m1{}", hex::encode(hasher.finalize()))
}

/// Check that a name has the shape of a migration id.
pub fn is_migration_id(name: &str) -> bool {
    name.len() == 66
        && name.starts_with("m1")
        && name[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_deterministic() {
        let a = migration_id(None, "CREATE TYPE default::User;");
        let b = migration_id(None, "CREATE TYPE default::User;");
        assert_eq!(a, b);
        assert!(is_migration_id(&a));
    }

    #[test]
    fn test_id_depends_on_content() {
        let a = migration_id(None, "CREATE TYPE default::User;");
        let b = migration_id(None, "CREATE TYPE default::Post;");
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_depends_on_parent() {
        let a = migration_id(None, "CREATE TYPE default::User;");
        let b = migration_id(Some("m1ff"), "CREATE TYPE default::User;");
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_migration_id_rejects_garbage() {
        assert!(!is_migration_id("initial"));
        assert!(!is_migration_id("m1xyz"));
        assert!(!is_migration_id("m2"));
    }
}
