//! Structural diff between two schema snapshots.
//!
//! The diff is purely descriptive: it records what differs, keyed by name,
//! without deciding how to express the difference as DDL. Turning changes
//! into ordered statements (including rename inference) is the proposal
//! engine's job.

use crate::catalog::{
    Cardinality, ConstraintDef, IndexDef, LinkDef, ObjectTypeDef, OnTargetDelete, PropertyDef,
    ScalarRef, ScalarTypeDef, Schema,
};

/// All differences between two schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDiff {
    /// Custom scalar type changes, in name order.
    pub scalar_changes: Vec<ScalarChange>,
    /// Object type changes, in name order.
    pub type_changes: Vec<TypeChange>,
}

/// A change to a custom scalar type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarChange {
    /// Scalar exists only in the new schema.
    Added(ScalarTypeDef),
    /// Scalar exists only in the old schema.
    Removed(ScalarTypeDef),
    /// Same name and base, different constraints.
    ConstraintsChanged {
        /// Fully qualified scalar name.
        name: String,
        /// Constraints present only in the new schema.
        added: Vec<ConstraintDef>,
        /// Constraints present only in the old schema.
        removed: Vec<ConstraintDef>,
    },
    /// Same name, different base scalar.
    BaseChanged {
        /// Old definition.
        from: ScalarTypeDef,
        /// New definition.
        to: ScalarTypeDef,
    },
}

/// A change to an object type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeChange {
    /// Type exists only in the new schema.
    Added(ObjectTypeDef),
    /// Type exists only in the old schema.
    Removed(ObjectTypeDef),
    /// Type exists in both, with member or flag differences.
    Modified(TypeModification),
}

/// Differences within one object type present in both schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeModification {
    /// Fully qualified type name.
    pub name: String,
    /// New abstractness, when it changed.
    pub abstract_changed: Option<bool>,
    /// New parent list, when it changed.
    pub extends_changed: Option<Vec<String>>,
    /// Property-level changes, old-schema order then additions.
    pub property_changes: Vec<PropertyChange>,
    /// Link-level changes, old-schema order then additions.
    pub link_changes: Vec<LinkChange>,
    /// Type-level constraints present only in the new schema.
    pub constraints_added: Vec<ConstraintDef>,
    /// Type-level constraints present only in the old schema.
    pub constraints_removed: Vec<ConstraintDef>,
    /// Indexes present only in the new schema.
    pub indexes_added: Vec<IndexDef>,
    /// Indexes present only in the old schema.
    pub indexes_removed: Vec<IndexDef>,
}

impl TypeModification {
    fn has_changes(&self) -> bool {
        self.abstract_changed.is_some()
            || self.extends_changed.is_some()
            || !self.property_changes.is_empty()
            || !self.link_changes.is_empty()
            || !self.constraints_added.is_empty()
            || !self.constraints_removed.is_empty()
            || !self.indexes_added.is_empty()
            || !self.indexes_removed.is_empty()
    }
}

/// A change to one property of a type present in both schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyChange {
    /// Property exists only in the new schema.
    Added(PropertyDef),
    /// Property exists only in the old schema.
    Removed(PropertyDef),
    /// Target scalar changed.
    TargetChanged {
        /// Property name.
        name: String,
        /// Old target.
        from: ScalarRef,
        /// New target.
        to: ScalarRef,
    },
    /// Required flag changed.
    RequiredChanged {
        /// Property name.
        name: String,
        /// New required flag.
        required: bool,
        /// Whether the property carries a default in the new schema.
        has_default: bool,
    },
    /// Cardinality changed.
    CardinalityChanged {
        /// Property name.
        name: String,
        /// Old cardinality.
        from: Cardinality,
        /// New cardinality.
        to: Cardinality,
    },
    /// Default expression changed or was removed.
    DefaultChanged {
        /// Property name.
        name: String,
        /// New default, `None` when removed.
        to: Option<String>,
    },
    /// Constraint set changed.
    ConstraintsChanged {
        /// Property name.
        name: String,
        /// Constraints present only in the new schema.
        added: Vec<ConstraintDef>,
        /// Constraints present only in the old schema.
        removed: Vec<ConstraintDef>,
    },
}

/// A change to one link of a type present in both schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkChange {
    /// Link exists only in the new schema.
    Added(LinkDef),
    /// Link exists only in the old schema.
    Removed(LinkDef),
    /// Target type changed.
    TargetChanged {
        /// Link name.
        name: String,
        /// Old target.
        from: String,
        /// New target.
        to: String,
    },
    /// Required flag changed.
    RequiredChanged {
        /// Link name.
        name: String,
        /// New required flag.
        required: bool,
    },
    /// Cardinality changed.
    CardinalityChanged {
        /// Link name.
        name: String,
        /// Old cardinality.
        from: Cardinality,
        /// New cardinality.
        to: Cardinality,
    },
    /// Delete policy changed.
    OnDeleteChanged {
        /// Link name.
        name: String,
        /// New policy.
        to: OnTargetDelete,
    },
    /// Constraint set changed.
    ConstraintsChanged {
        /// Link name.
        name: String,
        /// Constraints present only in the new schema.
        added: Vec<ConstraintDef>,
        /// Constraints present only in the old schema.
        removed: Vec<ConstraintDef>,
    },
}

impl SchemaDiff {
    /// Compute the diff taking `old` to `new`.
    pub fn compute(old: &Schema, new: &Schema) -> Self {
        let mut diff = SchemaDiff::default();

        for (name, old_def) in &old.scalar_types {
            match new.scalar_types.get(name) {
                None => diff.scalar_changes.push(ScalarChange::Removed(old_def.clone())),
                Some(new_def) if new_def.base != old_def.base => {
                    diff.scalar_changes.push(ScalarChange::BaseChanged {
                        from: old_def.clone(),
                        to: new_def.clone(),
                    })
                }
                Some(new_def) => {
                    let (added, removed) =
                        constraint_set_diff(&old_def.constraints, &new_def.constraints);
                    if !added.is_empty() || !removed.is_empty() {
                        diff.scalar_changes.push(ScalarChange::ConstraintsChanged {
                            name: name.clone(),
                            added,
                            removed,
                        });
                    }
                }
            }
        }
        for (name, new_def) in &new.scalar_types {
            if !old.scalar_types.contains_key(name) {
                diff.scalar_changes.push(ScalarChange::Added(new_def.clone()));
            }
        }

        for (name, old_def) in &old.object_types {
            match new.object_types.get(name) {
                None => diff.type_changes.push(TypeChange::Removed(old_def.clone())),
                Some(new_def) => {
                    let modification = diff_type(old_def, new_def);
                    if modification.has_changes() {
                        diff.type_changes.push(TypeChange::Modified(modification));
                    }
                }
            }
        }
        for (name, new_def) in &new.object_types {
            if !old.object_types.contains_key(name) {
                diff.type_changes.push(TypeChange::Added(new_def.clone()));
            }
        }

        diff
    }

    /// Whether the two schemas were identical.
    pub fn is_empty(&self) -> bool {
        self.scalar_changes.is_empty() && self.type_changes.is_empty()
    }

    /// Number of leaf changes, for reporting.
    pub fn change_count(&self) -> usize {
        let type_leaves: usize = self
            .type_changes
            .iter()
            .map(|c| match c {
                TypeChange::Added(_) | TypeChange::Removed(_) => 1,
                TypeChange::Modified(m) => {
                    m.abstract_changed.iter().count()
                        + m.extends_changed.iter().count()
                        + m.property_changes.len()
                        + m.link_changes.len()
                        + m.constraints_added.len()
                        + m.constraints_removed.len()
                        + m.indexes_added.len()
                        + m.indexes_removed.len()
                }
            })
            .sum();
        self.scalar_changes.len() + type_leaves
    }
}

fn diff_type(old: &ObjectTypeDef, new: &ObjectTypeDef) -> TypeModification {
    let mut m = TypeModification {
        name: old.name.clone(),
        ..TypeModification::default()
    };

    if old.is_abstract != new.is_abstract {
        m.abstract_changed = Some(new.is_abstract);
    }
    if old.extends != new.extends {
        m.extends_changed = Some(new.extends.clone());
    }

    for old_prop in &old.properties {
        match new.get_property(&old_prop.name) {
            None => m.property_changes.push(PropertyChange::Removed(old_prop.clone())),
            Some(new_prop) => diff_property(old_prop, new_prop, &mut m.property_changes),
        }
    }
    for new_prop in &new.properties {
        if old.get_property(&new_prop.name).is_none() {
            m.property_changes.push(PropertyChange::Added(new_prop.clone()));
        }
    }

    for old_link in &old.links {
        match new.get_link(&old_link.name) {
            None => m.link_changes.push(LinkChange::Removed(old_link.clone())),
            Some(new_link) => diff_link(old_link, new_link, &mut m.link_changes),
        }
    }
    for new_link in &new.links {
        if old.get_link(&new_link.name).is_none() {
            m.link_changes.push(LinkChange::Added(new_link.clone()));
        }
    }

    let (added, removed) = constraint_set_diff(&old.constraints, &new.constraints);
    m.constraints_added = added;
    m.constraints_removed = removed;

    m.indexes_added = new
        .indexes
        .iter()
        .filter(|i| !old.indexes.contains(i))
        .cloned()
        .collect();
    m.indexes_removed = old
        .indexes
        .iter()
        .filter(|i| !new.indexes.contains(i))
        .cloned()
        .collect();

    m
}

fn diff_property(old: &PropertyDef, new: &PropertyDef, out: &mut Vec<PropertyChange>) {
    if old.target != new.target {
        out.push(PropertyChange::TargetChanged {
            name: old.name.clone(),
            from: old.target.clone(),
            to: new.target.clone(),
        });
    }
    if old.required != new.required {
        out.push(PropertyChange::RequiredChanged {
            name: old.name.clone(),
            required: new.required,
            has_default: new.default.is_some(),
        });
    }
    if old.cardinality != new.cardinality {
        out.push(PropertyChange::CardinalityChanged {
            name: old.name.clone(),
            from: old.cardinality,
            to: new.cardinality,
        });
    }
    if old.default != new.default {
        out.push(PropertyChange::DefaultChanged {
            name: old.name.clone(),
            to: new.default.clone(),
        });
    }
    let (added, removed) = constraint_set_diff(&old.constraints, &new.constraints);
    if !added.is_empty() || !removed.is_empty() {
        out.push(PropertyChange::ConstraintsChanged {
            name: old.name.clone(),
            added,
            removed,
        });
    }
}

fn diff_link(old: &LinkDef, new: &LinkDef, out: &mut Vec<LinkChange>) {
    if old.target != new.target {
        out.push(LinkChange::TargetChanged {
            name: old.name.clone(),
            from: old.target.clone(),
            to: new.target.clone(),
        });
    }
    if old.required != new.required {
        out.push(LinkChange::RequiredChanged {
            name: old.name.clone(),
            required: new.required,
        });
    }
    if old.cardinality != new.cardinality {
        out.push(LinkChange::CardinalityChanged {
            name: old.name.clone(),
            from: old.cardinality,
            to: new.cardinality,
        });
    }
    if old.on_target_delete != new.on_target_delete {
        out.push(LinkChange::OnDeleteChanged {
            name: old.name.clone(),
            to: new.on_target_delete,
        });
    }
    let (added, removed) = constraint_set_diff(&old.constraints, &new.constraints);
    if !added.is_empty() || !removed.is_empty() {
        out.push(LinkChange::ConstraintsChanged {
            name: old.name.clone(),
            added,
            removed,
        });
    }
}

/// Multiset difference of two constraint lists, preserving input order.
fn constraint_set_diff(
    old: &[ConstraintDef],
    new: &[ConstraintDef],
) -> (Vec<ConstraintDef>, Vec<ConstraintDef>) {
    let mut remaining: Vec<&ConstraintDef> = new.iter().collect();
    let mut removed = Vec::new();
    for c in old {
        match remaining.iter().position(|n| *n == c) {
            Some(pos) => {
                remaining.remove(pos);
            }
            None => removed.push(c.clone()),
        }
    }
    let added = remaining.into_iter().cloned().collect();
    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuiltinScalar;
    use pretty_assertions::assert_eq;

    fn schema_with_user() -> Schema {
        Schema::new().with_object_type(
            ObjectTypeDef::new("default::User")
                .with_property(PropertyDef::new("name", ScalarRef::str()).required())
                .with_property(PropertyDef::new("age", ScalarRef::builtin(BuiltinScalar::Int32))),
        )
    }

    #[test]
    fn test_identical_schemas_diff_empty() {
        let diff = SchemaDiff::compute(&schema_with_user(), &schema_with_user());
        assert!(diff.is_empty());
        assert_eq!(diff.change_count(), 0);
    }

    #[test]
    fn test_type_added_and_removed() {
        let old = schema_with_user();
        let new = Schema::new().with_object_type(ObjectTypeDef::new("default::Post"));

        let diff = SchemaDiff::compute(&old, &new);
        assert_eq!(diff.type_changes.len(), 2);
        assert!(matches!(
            &diff.type_changes[0],
            TypeChange::Removed(t) if t.name == "default::User"
        ));
        assert!(matches!(
            &diff.type_changes[1],
            TypeChange::Added(t) if t.name == "default::Post"
        ));
    }

    #[test]
    fn test_property_added() {
        let old = schema_with_user();
        let mut new = schema_with_user();
        new.object_types
            .get_mut("default::User")
            .unwrap()
            .properties
            .push(PropertyDef::new("email", ScalarRef::str()));

        let diff = SchemaDiff::compute(&old, &new);
        let TypeChange::Modified(m) = &diff.type_changes[0] else {
            panic!("expected modification");
        };
        assert_eq!(m.property_changes.len(), 1);
        assert!(matches!(
            &m.property_changes[0],
            PropertyChange::Added(p) if p.name == "email"
        ));
    }

    #[test]
    fn test_property_target_and_required_changed() {
        let old = schema_with_user();
        let mut new = schema_with_user();
        {
            let user = new.object_types.get_mut("default::User").unwrap();
            let age = user.properties.iter_mut().find(|p| p.name == "age").unwrap();
            age.target = ScalarRef::builtin(BuiltinScalar::Int64);
            age.required = true;
        }

        let diff = SchemaDiff::compute(&old, &new);
        let TypeChange::Modified(m) = &diff.type_changes[0] else {
            panic!("expected modification");
        };
        assert_eq!(m.property_changes.len(), 2);
        assert!(matches!(
            &m.property_changes[0],
            PropertyChange::TargetChanged { name, .. } if name == "age"
        ));
        assert!(matches!(
            &m.property_changes[1],
            PropertyChange::RequiredChanged { required: true, .. }
        ));
        assert_eq!(diff.change_count(), 2);
    }

    #[test]
    fn test_link_policy_changed() {
        let mk = |policy| {
            Schema::new()
                .with_object_type(ObjectTypeDef::new("default::User"))
                .with_object_type(
                    ObjectTypeDef::new("default::Post")
                        .with_link(LinkDef::new("author", "default::User").on_target_delete(policy)),
                )
        };
        let diff = SchemaDiff::compute(&mk(OnTargetDelete::Restrict), &mk(OnTargetDelete::Allow));
        let TypeChange::Modified(m) = &diff.type_changes[0] else {
            panic!("expected modification");
        };
        assert!(matches!(
            &m.link_changes[0],
            LinkChange::OnDeleteChanged { to: OnTargetDelete::Allow, .. }
        ));
    }

    #[test]
    fn test_constraint_set_diff_is_multiset() {
        let old = vec![ConstraintDef::Exclusive];
        let new = vec![
            ConstraintDef::Exclusive,
            ConstraintDef::OneOf(vec!["a".into()]),
        ];
        let (added, removed) = constraint_set_diff(&old, &new);
        assert_eq!(added, vec![ConstraintDef::OneOf(vec!["a".into()])]);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_scalar_changes() {
        let old = Schema::new().with_scalar_type(ScalarTypeDef::new(
            "default::status",
            ScalarRef::str(),
        ));
        let new = Schema::new().with_scalar_type(
            ScalarTypeDef::new("default::status", ScalarRef::str())
                .with_constraint(ConstraintDef::OneOf(vec!["draft".into()])),
        );
        let diff = SchemaDiff::compute(&old, &new);
        assert!(matches!(
            &diff.scalar_changes[0],
            ScalarChange::ConstraintsChanged { name, added, .. }
                if name == "default::status" && added.len() == 1
        ));

        let diff = SchemaDiff::compute(&old, &Schema::new());
        assert!(matches!(&diff.scalar_changes[0], ScalarChange::Removed(_)));
    }

    #[test]
    fn test_scalar_base_changed() {
        let old = Schema::new().with_scalar_type(ScalarTypeDef::new(
            "default::code",
            ScalarRef::str(),
        ));
        let new = Schema::new().with_scalar_type(ScalarTypeDef::new(
            "default::code",
            ScalarRef::builtin(BuiltinScalar::Int64),
        ));
        let diff = SchemaDiff::compute(&old, &new);
        assert!(matches!(&diff.scalar_changes[0], ScalarChange::BaseChanged { .. }));
    }

    #[test]
    fn test_extends_and_abstract_changed() {
        let old = Schema::new()
            .with_object_type(ObjectTypeDef::new("default::Base").abstract_())
            .with_object_type(ObjectTypeDef::new("default::User"));
        let new = Schema::new()
            .with_object_type(ObjectTypeDef::new("default::Base").abstract_())
            .with_object_type(ObjectTypeDef::new("default::User").extending("default::Base"));

        let diff = SchemaDiff::compute(&old, &new);
        let TypeChange::Modified(m) = &diff.type_changes[0] else {
            panic!("expected modification");
        };
        assert_eq!(m.extends_changed, Some(vec!["default::Base".to_string()]));
        assert!(m.abstract_changed.is_none());
    }
}
