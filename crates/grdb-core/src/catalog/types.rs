//! Scalar types, cardinality and link policies.

use serde::{Deserialize, Serialize};

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinScalar {
    /// UTF-8 string.
    Str,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Boolean.
    Bool,
    /// UUID.
    Uuid,
    /// Timestamp with timezone.
    Datetime,
    /// Arbitrary JSON document.
    Json,
    /// Raw bytes.
    Bytes,
}

impl BuiltinScalar {
    /// Look up a builtin scalar by its SDL name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "str" => Some(BuiltinScalar::Str),
            "int32" => Some(BuiltinScalar::Int32),
            "int64" => Some(BuiltinScalar::Int64),
            "float32" => Some(BuiltinScalar::Float32),
            "float64" => Some(BuiltinScalar::Float64),
            "bool" => Some(BuiltinScalar::Bool),
            "uuid" => Some(BuiltinScalar::Uuid),
            "datetime" => Some(BuiltinScalar::Datetime),
            "json" => Some(BuiltinScalar::Json),
            "bytes" => Some(BuiltinScalar::Bytes),
            _ => None,
        }
    }

    /// SDL name of the scalar.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinScalar::Str => "str",
            BuiltinScalar::Int32 => "int32",
            BuiltinScalar::Int64 => "int64",
            BuiltinScalar::Float32 => "float32",
            BuiltinScalar::Float64 => "float64",
            BuiltinScalar::Bool => "bool",
            BuiltinScalar::Uuid => "uuid",
            BuiltinScalar::Datetime => "datetime",
            BuiltinScalar::Json => "json",
            BuiltinScalar::Bytes => "bytes",
        }
    }

    /// Whether a value of `self` converts to `to` without loss.
    ///
    /// Used to distinguish widening target changes (safe with an implicit
    /// cast) from narrowing ones (which need a user-supplied cast
    /// expression).
    pub fn widens_to(&self, to: &BuiltinScalar) -> bool {
        use BuiltinScalar::*;
        matches!(
            (self, to),
            (Int32, Int64) | (Float32, Float64) | (Int32, Float64) | (Int64, Float64)
        )
    }
}

impl std::fmt::Display for BuiltinScalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a scalar type: builtin or a schema-defined custom scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarRef {
    /// A built-in scalar.
    Builtin(BuiltinScalar),
    /// A custom scalar, by fully qualified name.
    Custom(String),
}

impl ScalarRef {
    /// Builtin string scalar, the most common target in tests.
    pub fn str() -> Self {
        ScalarRef::Builtin(BuiltinScalar::Str)
    }

    /// Construct a builtin scalar reference.
    pub fn builtin(scalar: BuiltinScalar) -> Self {
        ScalarRef::Builtin(scalar)
    }

    /// Construct a custom scalar reference.
    pub fn custom(name: impl Into<String>) -> Self {
        ScalarRef::Custom(name.into())
    }

    /// The builtin scalar, if this is a builtin reference.
    pub fn as_builtin(&self) -> Option<BuiltinScalar> {
        match self {
            ScalarRef::Builtin(b) => Some(*b),
            ScalarRef::Custom(_) => None,
        }
    }

    /// SDL name of the referenced type.
    pub fn name(&self) -> &str {
        match self {
            ScalarRef::Builtin(b) => b.name(),
            ScalarRef::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for ScalarRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Cardinality of a property or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one value.
    #[default]
    Single,
    /// A set of values.
    Multi,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Multi => write!(f, "multi"),
        }
    }
}

/// Referential action when the target of a link is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnTargetDelete {
    /// Refuse the deletion while links point at the target.
    #[default]
    Restrict,
    /// Allow the deletion; the link is dropped.
    Allow,
    /// Delete the source object along with the target.
    DeleteSource,
}

impl std::fmt::Display for OnTargetDelete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnTargetDelete::Restrict => write!(f, "restrict"),
            OnTargetDelete::Allow => write!(f, "allow"),
            OnTargetDelete::DeleteSource => write!(f, "delete source"),
        }
    }
}
