//! Object type, property and link definitions.

use super::constraint::{ConstraintDef, IndexDef};
use super::types::{Cardinality, OnTargetDelete, ScalarRef};
use serde::{Deserialize, Serialize};

/// An object type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeDef {
    /// Fully qualified name, e.g. `default::User`.
    pub name: String,
    /// Whether the type is abstract (cannot be instantiated).
    pub is_abstract: bool,
    /// Fully qualified parent type names.
    pub extends: Vec<String>,
    /// Property definitions, in declaration order.
    pub properties: Vec<PropertyDef>,
    /// Link definitions, in declaration order.
    pub links: Vec<LinkDef>,
    /// Type-level constraints.
    pub constraints: Vec<ConstraintDef>,
    /// Index definitions.
    pub indexes: Vec<IndexDef>,
}

impl ObjectTypeDef {
    /// Create a new object type definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            extends: Vec::new(),
            properties: Vec::new(),
            links: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Mark the type abstract.
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add a parent type.
    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a link.
    pub fn with_link(mut self, link: LinkDef) -> Self {
        self.links.push(link);
        self
    }

    /// Add a type-level constraint.
    pub fn with_constraint(mut self, constraint: ConstraintDef) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add an index.
    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Get a property by name.
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Get a link by name.
    pub fn get_link(&self, name: &str) -> Option<&LinkDef> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Module part of the fully qualified name.
    pub fn module(&self) -> &str {
        self.name.rsplit_once("::").map(|(m, _)| m).unwrap_or("")
    }

    /// Unqualified type name.
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit_once("::")
            .map(|(_, n)| n)
            .unwrap_or(&self.name)
    }
}

/// A property definition (scalar-valued member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name (unqualified).
    pub name: String,
    /// Target scalar type.
    pub target: ScalarRef,
    /// Whether a value is required.
    pub required: bool,
    /// Single or multi cardinality.
    pub cardinality: Cardinality,
    /// Default expression, verbatim.
    pub default: Option<String>,
    /// Constraints on the property.
    pub constraints: Vec<ConstraintDef>,
}

impl PropertyDef {
    /// Create an optional single property.
    pub fn new(name: impl Into<String>, target: ScalarRef) -> Self {
        Self {
            name: name.into(),
            target,
            required: false,
            cardinality: Cardinality::Single,
            default: None,
            constraints: Vec::new(),
        }
    }

    /// Mark the property required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Make the property multi-valued.
    pub fn multi(mut self) -> Self {
        self.cardinality = Cardinality::Multi;
        self
    }

    /// Set a default expression.
    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: ConstraintDef) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Whether two properties have the same shape (target, required,
    /// cardinality), ignoring name, default and constraints. Used by rename
    /// inference.
    pub fn same_shape(&self, other: &PropertyDef) -> bool {
        self.target == other.target
            && self.required == other.required
            && self.cardinality == other.cardinality
    }
}

/// A link definition (object-valued member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDef {
    /// Link name (unqualified).
    pub name: String,
    /// Fully qualified target object type name.
    pub target: String,
    /// Whether a value is required.
    pub required: bool,
    /// Single or multi cardinality.
    pub cardinality: Cardinality,
    /// Action when the link target is deleted.
    pub on_target_delete: OnTargetDelete,
    /// Constraints on the link.
    pub constraints: Vec<ConstraintDef>,
}

impl LinkDef {
    /// Create an optional single link.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            required: false,
            cardinality: Cardinality::Single,
            on_target_delete: OnTargetDelete::Restrict,
            constraints: Vec::new(),
        }
    }

    /// Mark the link required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Make the link multi-valued.
    pub fn multi(mut self) -> Self {
        self.cardinality = Cardinality::Multi;
        self
    }

    /// Set the delete policy.
    pub fn on_target_delete(mut self, policy: OnTargetDelete) -> Self {
        self.on_target_delete = policy;
        self
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: ConstraintDef) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Whether two links have the same shape (target, required,
    /// cardinality), ignoring name and policies. Used by rename inference.
    pub fn same_shape(&self, other: &LinkDef) -> bool {
        self.target == other.target
            && self.required == other.required
            && self.cardinality == other.cardinality
    }
}
