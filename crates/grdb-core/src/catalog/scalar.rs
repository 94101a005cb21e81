//! Custom scalar type definitions.

use super::constraint::ConstraintDef;
use super::types::ScalarRef;
use serde::{Deserialize, Serialize};

/// A schema-defined scalar type extending a base scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarTypeDef {
    /// Fully qualified name, e.g. `default::post_status`.
    pub name: String,
    /// Base scalar being extended.
    pub base: ScalarRef,
    /// Constraints narrowing the base scalar.
    pub constraints: Vec<ConstraintDef>,
}

impl ScalarTypeDef {
    /// Create a new scalar type definition.
    pub fn new(name: impl Into<String>, base: ScalarRef) -> Self {
        Self {
            name: name.into(),
            base,
            constraints: Vec::new(),
        }
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: ConstraintDef) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Unqualified scalar name.
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit_once("::")
            .map(|(_, n)| n)
            .unwrap_or(&self.name)
    }
}
