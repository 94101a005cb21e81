//! Constraint and index definitions.

use serde::{Deserialize, Serialize};

/// A constraint on a property, link, type or scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintDef {
    /// Values must be unique across all objects of the type.
    Exclusive,
    /// Value must be one of the listed literals.
    OneOf(Vec<String>),
    /// Arbitrary boolean expression over the value.
    Expression(String),
}

impl ConstraintDef {
    /// Constraint rendered in SDL/DDL argument form, e.g. `one_of('a', 'b')`.
    pub fn render(&self) -> String {
        match self {
            ConstraintDef::Exclusive => "exclusive".to_string(),
            ConstraintDef::OneOf(values) => {
                let list = values
                    .iter()
                    .map(|v| format!("'{}'", v.replace('\'', "\\'")))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("one_of({})", list)
            }
            ConstraintDef::Expression(expr) => format!("expression on ({})", expr),
        }
    }

    /// Short name of the constraint kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstraintDef::Exclusive => "exclusive",
            ConstraintDef::OneOf(_) => "one_of",
            ConstraintDef::Expression(_) => "expression",
        }
    }
}

impl std::fmt::Display for ConstraintDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// An index over an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    /// Indexed expression, as written in the schema.
    pub expr: String,
}

impl IndexDef {
    /// Create a new index definition.
    pub fn new(expr: impl Into<String>) -> Self {
        Self { expr: expr.into() }
    }
}
