//! DDL statements: the unit of change recorded in migration files.
//!
//! A statement both renders to deterministic text (what gets hashed and
//! written to disk) and replays onto a [`Schema`] snapshot (how the current
//! schema is reconstructed from migration history).

use crate::catalog::{
    Cardinality, ConstraintDef, IndexDef, LinkDef, ObjectTypeDef, OnTargetDelete, PropertyDef,
    ScalarRef, ScalarTypeDef, Schema,
};
use crate::migration::error::ReplayError;

const INDENT: &str = "    ";

/// A single schema-changing statement.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlStatement {
    /// Create a custom scalar type.
    CreateScalarType(ScalarTypeDef),
    /// Alter a custom scalar type's constraints.
    AlterScalarType {
        /// Fully qualified scalar name.
        name: String,
        /// Alterations, applied in order.
        ops: Vec<ScalarAlter>,
    },
    /// Drop a custom scalar type.
    DropScalarType {
        /// Fully qualified scalar name.
        name: String,
    },
    /// Create an object type with all its members.
    CreateType(ObjectTypeDef),
    /// Rename an object type.
    RenameType {
        /// Current fully qualified name.
        name: String,
        /// New fully qualified name.
        new_name: String,
    },
    /// Alter an object type.
    AlterType {
        /// Fully qualified type name.
        name: String,
        /// Alterations, applied in order.
        ops: Vec<AlterTypeOp>,
    },
    /// Drop an object type.
    DropType {
        /// Fully qualified type name.
        name: String,
    },
}

/// An alteration to a custom scalar type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarAlter {
    /// Add a constraint.
    AddConstraint(ConstraintDef),
    /// Remove a constraint.
    DropConstraint(ConstraintDef),
    /// Change the base scalar being extended.
    SetBase(ScalarRef),
}

/// An alteration inside `ALTER TYPE`.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterTypeOp {
    /// Add a property.
    AddProperty(PropertyDef),
    /// Alter an existing property.
    AlterProperty {
        /// Property name.
        name: String,
        /// Sub-alterations, applied in order.
        changes: Vec<PropertyAlter>,
    },
    /// Rename a property.
    RenameProperty {
        /// Current name.
        name: String,
        /// New name.
        new_name: String,
    },
    /// Drop a property.
    DropProperty {
        /// Property name.
        name: String,
    },
    /// Add a link.
    AddLink(LinkDef),
    /// Alter an existing link.
    AlterLink {
        /// Link name.
        name: String,
        /// Sub-alterations, applied in order.
        changes: Vec<LinkAlter>,
    },
    /// Rename a link.
    RenameLink {
        /// Current name.
        name: String,
        /// New name.
        new_name: String,
    },
    /// Drop a link.
    DropLink {
        /// Link name.
        name: String,
    },
    /// Add a type-level constraint.
    AddConstraint(ConstraintDef),
    /// Remove a type-level constraint.
    DropConstraint(ConstraintDef),
    /// Add an index.
    AddIndex(IndexDef),
    /// Remove an index.
    DropIndex(IndexDef),
    /// Change whether the type is abstract.
    SetAbstract(bool),
    /// Replace the parent type list.
    SetExtends(Vec<String>),
}

/// An alteration inside `ALTER PROPERTY`.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyAlter {
    /// Change the target scalar. `cast` carries a conversion expression for
    /// existing values when the change is not a lossless widening.
    SetType {
        /// New target scalar.
        target: ScalarRef,
        /// Conversion expression for existing values.
        cast: Option<String>,
    },
    /// Make the property required. `fill` supplies a value for objects that
    /// have none.
    SetRequired {
        /// Fill expression for existing objects.
        fill: Option<String>,
    },
    /// Make the property optional.
    SetOptional,
    /// Change cardinality.
    SetCardinality(Cardinality),
    /// Set the default expression.
    SetDefault(String),
    /// Remove the default expression.
    DropDefault,
    /// Add a constraint.
    AddConstraint(ConstraintDef),
    /// Remove a constraint.
    DropConstraint(ConstraintDef),
}

/// An alteration inside `ALTER LINK`.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkAlter {
    /// Change the target object type.
    SetTarget {
        /// New fully qualified target name.
        target: String,
    },
    /// Make the link required. `fill` supplies a target for objects that
    /// have none.
    SetRequired {
        /// Fill expression for existing objects.
        fill: Option<String>,
    },
    /// Make the link optional.
    SetOptional,
    /// Change cardinality.
    SetCardinality(Cardinality),
    /// Change the delete policy.
    SetOnTargetDelete(OnTargetDelete),
    /// Add a constraint.
    AddConstraint(ConstraintDef),
    /// Remove a constraint.
    DropConstraint(ConstraintDef),
}

impl DdlStatement {
    /// Render the statement as DDL text, terminated by `;`.
    ///
    /// Rendering is deterministic: the same statement always produces the
    /// same bytes, which is what makes migration ids stable.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            DdlStatement::CreateScalarType(def) => {
                out.push_str(&format!(
                    "CREATE SCALAR TYPE {} EXTENDING {}",
                    def.name,
                    def.base.name()
                ));
                if def.constraints.is_empty() {
                    out.push(';');
                } else {
                    out.push_str(" {\n");
                    for c in &def.constraints {
                        out.push_str(&format!("{INDENT}CREATE CONSTRAINT {};\n", c.render()));
                    }
                    out.push_str("};");
                }
            }
            DdlStatement::AlterScalarType { name, ops } => {
                out.push_str(&format!("ALTER SCALAR TYPE {name} {{\n"));
                for op in ops {
                    match op {
                        ScalarAlter::AddConstraint(c) => {
                            out.push_str(&format!("{INDENT}CREATE CONSTRAINT {};\n", c.render()))
                        }
                        ScalarAlter::DropConstraint(c) => {
                            out.push_str(&format!("{INDENT}DROP CONSTRAINT {};\n", c.render()))
                        }
                        ScalarAlter::SetBase(base) => {
                            out.push_str(&format!("{INDENT}SET EXTENDING {};\n", base.name()))
                        }
                    }
                }
                out.push_str("};");
            }
            DdlStatement::DropScalarType { name } => {
                out.push_str(&format!("DROP SCALAR TYPE {name};"));
            }
            DdlStatement::CreateType(def) => {
                out.push_str("CREATE ");
                if def.is_abstract {
                    out.push_str("ABSTRACT ");
                }
                out.push_str(&format!("TYPE {}", def.name));
                if !def.extends.is_empty() {
                    out.push_str(&format!(" EXTENDING {}", def.extends.join(", ")));
                }
                let has_body = !def.properties.is_empty()
                    || !def.links.is_empty()
                    || !def.constraints.is_empty()
                    || !def.indexes.is_empty();
                if !has_body {
                    out.push(';');
                    return;
                }
                out.push_str(" {\n");
                for p in &def.properties {
                    render_property_create(p, 1, out);
                }
                for l in &def.links {
                    render_link_create(l, 1, out);
                }
                for c in &def.constraints {
                    out.push_str(&format!("{INDENT}CREATE CONSTRAINT {};\n", c.render()));
                }
                for i in &def.indexes {
                    out.push_str(&format!("{INDENT}CREATE INDEX ON ({});\n", i.expr));
                }
                out.push_str("};");
            }
            DdlStatement::RenameType { name, new_name } => {
                out.push_str(&format!("ALTER TYPE {name} RENAME TO {new_name};"));
            }
            DdlStatement::AlterType { name, ops } => {
                out.push_str(&format!("ALTER TYPE {name} {{\n"));
                for op in ops {
                    render_alter_op(op, out);
                }
                out.push_str("};");
            }
            DdlStatement::DropType { name } => {
                out.push_str(&format!("DROP TYPE {name};"));
            }
        }
    }

    /// Replay the statement onto a schema snapshot.
    ///
    /// With `strict` set, statements that would need data the snapshot does
    /// not carry (making a property required without a fill) are rejected.
    /// Replay of generated migrations uses strict mode; the proposal engine
    /// always includes the needed expressions.
    pub fn apply_to(&self, schema: &mut Schema, strict: bool) -> Result<(), ReplayError> {
        match self {
            DdlStatement::CreateScalarType(def) => {
                if schema.scalar_types.contains_key(&def.name)
                    || schema.object_types.contains_key(&def.name)
                {
                    return Err(ReplayError::DuplicateType(def.name.clone()));
                }
                schema.scalar_types.insert(def.name.clone(), def.clone());
                Ok(())
            }
            DdlStatement::AlterScalarType { name, ops } => {
                let def = schema
                    .scalar_types
                    .get_mut(name)
                    .ok_or_else(|| ReplayError::UnknownType(name.clone()))?;
                for op in ops {
                    match op {
                        ScalarAlter::AddConstraint(c) => def.constraints.push(c.clone()),
                        ScalarAlter::DropConstraint(c) => {
                            remove_constraint(&mut def.constraints, c, name)?
                        }
                        ScalarAlter::SetBase(base) => def.base = base.clone(),
                    }
                }
                Ok(())
            }
            DdlStatement::DropScalarType { name } => {
                if !schema.scalar_types.contains_key(name) {
                    return Err(ReplayError::UnknownType(name.clone()));
                }
                for t in schema.object_types.values() {
                    for p in &t.properties {
                        if p.target == ScalarRef::Custom(name.clone()) {
                            return Err(ReplayError::TypeInUse {
                                type_name: name.clone(),
                                referrer: t.name.clone(),
                                member: p.name.clone(),
                            });
                        }
                    }
                }
                schema.scalar_types.remove(name);
                Ok(())
            }
            DdlStatement::CreateType(def) => {
                if schema.object_types.contains_key(&def.name)
                    || schema.scalar_types.contains_key(&def.name)
                {
                    return Err(ReplayError::DuplicateType(def.name.clone()));
                }
                for parent in &def.extends {
                    if !schema.object_types.contains_key(parent) {
                        return Err(ReplayError::UnknownType(parent.clone()));
                    }
                }
                for link in &def.links {
                    if link.target != def.name && !schema.object_types.contains_key(&link.target) {
                        return Err(ReplayError::UnknownType(link.target.clone()));
                    }
                }
                schema.object_types.insert(def.name.clone(), def.clone());
                Ok(())
            }
            DdlStatement::RenameType { name, new_name } => {
                if schema.object_types.contains_key(new_name) {
                    return Err(ReplayError::DuplicateType(new_name.clone()));
                }
                let mut def = schema
                    .object_types
                    .remove(name)
                    .ok_or_else(|| ReplayError::UnknownType(name.clone()))?;
                def.name = new_name.clone();
                // References to the old name follow the rename.
                for link in &mut def.links {
                    if link.target == *name {
                        link.target = new_name.clone();
                    }
                }
                schema.object_types.insert(new_name.clone(), def);
                for t in schema.object_types.values_mut() {
                    for link in &mut t.links {
                        if link.target == *name {
                            link.target = new_name.clone();
                        }
                    }
                    for parent in &mut t.extends {
                        if parent == name {
                            *parent = new_name.clone();
                        }
                    }
                }
                Ok(())
            }
            DdlStatement::AlterType { name, ops } => {
                for op in ops {
                    apply_alter_op(schema, name, op, strict)?;
                }
                Ok(())
            }
            DdlStatement::DropType { name } => {
                if !schema.object_types.contains_key(name) {
                    return Err(ReplayError::UnknownType(name.clone()));
                }
                for t in schema.object_types.values() {
                    if t.name == *name {
                        continue;
                    }
                    if let Some(link) = t.links.iter().find(|l| l.target == *name) {
                        return Err(ReplayError::TypeInUse {
                            type_name: name.clone(),
                            referrer: t.name.clone(),
                            member: link.name.clone(),
                        });
                    }
                    if t.extends.iter().any(|p| p == name) {
                        return Err(ReplayError::TypeInUse {
                            type_name: name.clone(),
                            referrer: t.name.clone(),
                            member: "extending".to_string(),
                        });
                    }
                }
                schema.object_types.remove(name);
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

fn render_property_create(p: &PropertyDef, depth: usize, out: &mut String) {
    let pad = indent(depth);
    out.push_str(&format!("{pad}CREATE "));
    if p.required {
        out.push_str("REQUIRED ");
    }
    if p.cardinality == Cardinality::Multi {
        out.push_str("MULTI ");
    }
    out.push_str(&format!("PROPERTY {} -> {}", p.name, p.target.name()));
    if p.default.is_none() && p.constraints.is_empty() {
        out.push_str(";\n");
        return;
    }
    out.push_str(" {\n");
    let inner = indent(depth + 1);
    if let Some(default) = &p.default {
        out.push_str(&format!("{inner}SET default := ({default});\n"));
    }
    for c in &p.constraints {
        out.push_str(&format!("{inner}CREATE CONSTRAINT {};\n", c.render()));
    }
    out.push_str(&format!("{pad}}};\n"));
}

fn render_link_create(l: &LinkDef, depth: usize, out: &mut String) {
    let pad = indent(depth);
    out.push_str(&format!("{pad}CREATE "));
    if l.required {
        out.push_str("REQUIRED ");
    }
    if l.cardinality == Cardinality::Multi {
        out.push_str("MULTI ");
    }
    out.push_str(&format!("LINK {} -> {}", l.name, l.target));
    if l.on_target_delete == OnTargetDelete::Restrict && l.constraints.is_empty() {
        out.push_str(";\n");
        return;
    }
    out.push_str(" {\n");
    let inner = indent(depth + 1);
    if l.on_target_delete != OnTargetDelete::Restrict {
        out.push_str(&format!("{inner}ON TARGET DELETE {};\n", l.on_target_delete));
    }
    for c in &l.constraints {
        out.push_str(&format!("{inner}CREATE CONSTRAINT {};\n", c.render()));
    }
    out.push_str(&format!("{pad}}};\n"));
}

fn render_alter_op(op: &AlterTypeOp, out: &mut String) {
    match op {
        AlterTypeOp::AddProperty(p) => render_property_create(p, 1, out),
        AlterTypeOp::AlterProperty { name, changes } => {
            out.push_str(&format!("{INDENT}ALTER PROPERTY {name} {{\n"));
            for change in changes {
                render_property_alter(change, out);
            }
            out.push_str(&format!("{INDENT}}};\n"));
        }
        AlterTypeOp::RenameProperty { name, new_name } => {
            out.push_str(&format!("{INDENT}RENAME PROPERTY {name} TO {new_name};\n"));
        }
        AlterTypeOp::DropProperty { name } => {
            out.push_str(&format!("{INDENT}DROP PROPERTY {name};\n"));
        }
        AlterTypeOp::AddLink(l) => render_link_create(l, 1, out),
        AlterTypeOp::AlterLink { name, changes } => {
            out.push_str(&format!("{INDENT}ALTER LINK {name} {{\n"));
            for change in changes {
                render_link_alter(change, out);
            }
            out.push_str(&format!("{INDENT}}};\n"));
        }
        AlterTypeOp::RenameLink { name, new_name } => {
            out.push_str(&format!("{INDENT}RENAME LINK {name} TO {new_name};\n"));
        }
        AlterTypeOp::DropLink { name } => {
            out.push_str(&format!("{INDENT}DROP LINK {name};\n"));
        }
        AlterTypeOp::AddConstraint(c) => {
            out.push_str(&format!("{INDENT}CREATE CONSTRAINT {};\n", c.render()));
        }
        AlterTypeOp::DropConstraint(c) => {
            out.push_str(&format!("{INDENT}DROP CONSTRAINT {};\n", c.render()));
        }
        AlterTypeOp::AddIndex(i) => {
            out.push_str(&format!("{INDENT}CREATE INDEX ON ({});\n", i.expr));
        }
        AlterTypeOp::DropIndex(i) => {
            out.push_str(&format!("{INDENT}DROP INDEX ON ({});\n", i.expr));
        }
        AlterTypeOp::SetAbstract(value) => {
            out.push_str(&format!("{INDENT}SET ABSTRACT {value};\n"));
        }
        AlterTypeOp::SetExtends(parents) => {
            if parents.is_empty() {
                out.push_str(&format!("{INDENT}SET EXTENDING;\n"));
            } else {
                out.push_str(&format!("{INDENT}SET EXTENDING {};\n", parents.join(", ")));
            }
        }
    }
}

fn render_property_alter(change: &PropertyAlter, out: &mut String) {
    let pad = indent(2);
    match change {
        PropertyAlter::SetType { target, cast } => match cast {
            Some(expr) => out.push_str(&format!(
                "{pad}SET TYPE {} USING ({expr});\n",
                target.name()
            )),
            None => out.push_str(&format!("{pad}SET TYPE {};\n", target.name())),
        },
        PropertyAlter::SetRequired { fill } => match fill {
            Some(expr) => out.push_str(&format!("{pad}SET REQUIRED USING ({expr});\n")),
            None => out.push_str(&format!("{pad}SET REQUIRED;\n")),
        },
        PropertyAlter::SetOptional => out.push_str(&format!("{pad}SET OPTIONAL;\n")),
        PropertyAlter::SetCardinality(card) => {
            out.push_str(&format!("{pad}SET CARDINALITY {card};\n"))
        }
        PropertyAlter::SetDefault(expr) => {
            out.push_str(&format!("{pad}SET default := ({expr});\n"))
        }
        PropertyAlter::DropDefault => out.push_str(&format!("{pad}DROP default;\n")),
        PropertyAlter::AddConstraint(c) => {
            out.push_str(&format!("{pad}CREATE CONSTRAINT {};\n", c.render()))
        }
        PropertyAlter::DropConstraint(c) => {
            out.push_str(&format!("{pad}DROP CONSTRAINT {};\n", c.render()))
        }
    }
}

fn render_link_alter(change: &LinkAlter, out: &mut String) {
    let pad = indent(2);
    match change {
        LinkAlter::SetTarget { target } => out.push_str(&format!("{pad}SET TARGET {target};\n")),
        LinkAlter::SetRequired { fill } => match fill {
            Some(expr) => out.push_str(&format!("{pad}SET REQUIRED USING ({expr});\n")),
            None => out.push_str(&format!("{pad}SET REQUIRED;\n")),
        },
        LinkAlter::SetOptional => out.push_str(&format!("{pad}SET OPTIONAL;\n")),
        LinkAlter::SetCardinality(card) => {
            out.push_str(&format!("{pad}SET CARDINALITY {card};\n"))
        }
        LinkAlter::SetOnTargetDelete(policy) => {
            out.push_str(&format!("{pad}ON TARGET DELETE {policy};\n"))
        }
        LinkAlter::AddConstraint(c) => {
            out.push_str(&format!("{pad}CREATE CONSTRAINT {};\n", c.render()))
        }
        LinkAlter::DropConstraint(c) => {
            out.push_str(&format!("{pad}DROP CONSTRAINT {};\n", c.render()))
        }
    }
}

fn remove_constraint(
    constraints: &mut Vec<ConstraintDef>,
    target: &ConstraintDef,
    subject: &str,
) -> Result<(), ReplayError> {
    match constraints.iter().position(|c| c == target) {
        Some(pos) => {
            constraints.remove(pos);
            Ok(())
        }
        None => Err(ReplayError::UnknownConstraint {
            subject: subject.to_string(),
            constraint: target.render(),
        }),
    }
}

fn apply_alter_op(
    schema: &mut Schema,
    type_name: &str,
    op: &AlterTypeOp,
    strict: bool,
) -> Result<(), ReplayError> {
    // Validate cross-type references before taking a mutable borrow.
    match op {
        AlterTypeOp::AddLink(l) => {
            if l.target != type_name && !schema.object_types.contains_key(&l.target) {
                return Err(ReplayError::UnknownType(l.target.clone()));
            }
        }
        AlterTypeOp::AlterLink { changes, .. } => {
            for change in changes {
                if let LinkAlter::SetTarget { target } = change {
                    if target != type_name && !schema.object_types.contains_key(target) {
                        return Err(ReplayError::UnknownType(target.clone()));
                    }
                }
            }
        }
        AlterTypeOp::SetExtends(parents) => {
            for parent in parents {
                if !schema.object_types.contains_key(parent) {
                    return Err(ReplayError::UnknownType(parent.clone()));
                }
            }
        }
        _ => {}
    }

    let def = schema
        .object_types
        .get_mut(type_name)
        .ok_or_else(|| ReplayError::UnknownType(type_name.to_string()))?;

    match op {
        AlterTypeOp::AddProperty(p) => {
            if def.get_property(&p.name).is_some() || def.get_link(&p.name).is_some() {
                return Err(ReplayError::DuplicateMember {
                    type_name: def.name.clone(),
                    member: p.name.clone(),
                });
            }
            def.properties.push(p.clone());
        }
        AlterTypeOp::AlterProperty { name, changes } => {
            let type_name = def.name.clone();
            let prop = def
                .properties
                .iter_mut()
                .find(|p| p.name == *name)
                .ok_or_else(|| ReplayError::UnknownMember {
                    type_name: type_name.clone(),
                    member: name.clone(),
                })?;
            for change in changes {
                apply_property_alter(prop, change, &type_name, strict)?;
            }
        }
        AlterTypeOp::RenameProperty { name, new_name } => {
            if def.get_property(new_name).is_some() || def.get_link(new_name).is_some() {
                return Err(ReplayError::DuplicateMember {
                    type_name: def.name.clone(),
                    member: new_name.clone(),
                });
            }
            let type_name = def.name.clone();
            let prop = def
                .properties
                .iter_mut()
                .find(|p| p.name == *name)
                .ok_or_else(|| ReplayError::UnknownMember {
                    type_name,
                    member: name.clone(),
                })?;
            prop.name = new_name.clone();
        }
        AlterTypeOp::DropProperty { name } => {
            let pos = def.properties.iter().position(|p| p.name == *name).ok_or_else(|| {
                ReplayError::UnknownMember {
                    type_name: def.name.clone(),
                    member: name.clone(),
                }
            })?;
            def.properties.remove(pos);
        }
        AlterTypeOp::AddLink(l) => {
            if def.get_property(&l.name).is_some() || def.get_link(&l.name).is_some() {
                return Err(ReplayError::DuplicateMember {
                    type_name: def.name.clone(),
                    member: l.name.clone(),
                });
            }
            def.links.push(l.clone());
        }
        AlterTypeOp::AlterLink { name, changes } => {
            let type_name = def.name.clone();
            let link = def
                .links
                .iter_mut()
                .find(|l| l.name == *name)
                .ok_or_else(|| ReplayError::UnknownMember {
                    type_name: type_name.clone(),
                    member: name.clone(),
                })?;
            for change in changes {
                apply_link_alter(link, change, &type_name, strict)?;
            }
        }
        AlterTypeOp::RenameLink { name, new_name } => {
            if def.get_property(new_name).is_some() || def.get_link(new_name).is_some() {
                return Err(ReplayError::DuplicateMember {
                    type_name: def.name.clone(),
                    member: new_name.clone(),
                });
            }
            let type_name = def.name.clone();
            let link = def
                .links
                .iter_mut()
                .find(|l| l.name == *name)
                .ok_or_else(|| ReplayError::UnknownMember {
                    type_name,
                    member: name.clone(),
                })?;
            link.name = new_name.clone();
        }
        AlterTypeOp::DropLink { name } => {
            let pos = def.links.iter().position(|l| l.name == *name).ok_or_else(|| {
                ReplayError::UnknownMember {
                    type_name: def.name.clone(),
                    member: name.clone(),
                }
            })?;
            def.links.remove(pos);
        }
        AlterTypeOp::AddConstraint(c) => def.constraints.push(c.clone()),
        AlterTypeOp::DropConstraint(c) => {
            let name = def.name.clone();
            remove_constraint(&mut def.constraints, c, &name)?;
        }
        AlterTypeOp::AddIndex(i) => def.indexes.push(i.clone()),
        AlterTypeOp::DropIndex(i) => {
            let pos = def.indexes.iter().position(|x| x == i).ok_or_else(|| {
                ReplayError::UnknownIndex {
                    type_name: def.name.clone(),
                    expr: i.expr.clone(),
                }
            })?;
            def.indexes.remove(pos);
        }
        AlterTypeOp::SetAbstract(value) => def.is_abstract = *value,
        AlterTypeOp::SetExtends(parents) => def.extends = parents.clone(),
    }
    Ok(())
}

fn apply_property_alter(
    prop: &mut PropertyDef,
    change: &PropertyAlter,
    type_name: &str,
    strict: bool,
) -> Result<(), ReplayError> {
    match change {
        PropertyAlter::SetType { target, .. } => prop.target = target.clone(),
        PropertyAlter::SetRequired { fill } => {
            if strict && fill.is_none() && prop.default.is_none() {
                return Err(ReplayError::RequiredWithoutFill {
                    type_name: type_name.to_string(),
                    member: prop.name.clone(),
                });
            }
            prop.required = true;
        }
        PropertyAlter::SetOptional => prop.required = false,
        PropertyAlter::SetCardinality(card) => prop.cardinality = *card,
        PropertyAlter::SetDefault(expr) => prop.default = Some(expr.clone()),
        PropertyAlter::DropDefault => prop.default = None,
        PropertyAlter::AddConstraint(c) => prop.constraints.push(c.clone()),
        PropertyAlter::DropConstraint(c) => {
            let subject = format!("{type_name}.{}", prop.name);
            remove_constraint(&mut prop.constraints, c, &subject)?;
        }
    }
    Ok(())
}

fn apply_link_alter(
    link: &mut LinkDef,
    change: &LinkAlter,
    type_name: &str,
    strict: bool,
) -> Result<(), ReplayError> {
    match change {
        LinkAlter::SetTarget { target } => link.target = target.clone(),
        LinkAlter::SetRequired { fill } => {
            if strict && fill.is_none() {
                return Err(ReplayError::RequiredWithoutFill {
                    type_name: type_name.to_string(),
                    member: link.name.clone(),
                });
            }
            link.required = true;
        }
        LinkAlter::SetOptional => link.required = false,
        LinkAlter::SetCardinality(card) => link.cardinality = *card,
        LinkAlter::SetOnTargetDelete(policy) => link.on_target_delete = *policy,
        LinkAlter::AddConstraint(c) => link.constraints.push(c.clone()),
        LinkAlter::DropConstraint(c) => {
            let subject = format!("{type_name}.{}", link.name);
            remove_constraint(&mut link.constraints, c, &subject)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuiltinScalar;
    use pretty_assertions::assert_eq;

    fn user_type() -> ObjectTypeDef {
        ObjectTypeDef::new("default::User")
            .with_property(
                PropertyDef::new("name", ScalarRef::str())
                    .required()
                    .with_constraint(ConstraintDef::Exclusive),
            )
            .with_property(PropertyDef::new("age", ScalarRef::builtin(BuiltinScalar::Int64)))
    }

    #[test]
    fn test_render_create_type() {
        let def = ObjectTypeDef::new("default::Post")
            .with_property(PropertyDef::new("title", ScalarRef::str()).required())
            .with_link(
                LinkDef::new("author", "default::User")
                    .required()
                    .on_target_delete(OnTargetDelete::DeleteSource),
            )
            .with_index(IndexDef::new("title"));

        let text = DdlStatement::CreateType(def).render();
        assert_eq!(
            text,
            "CREATE TYPE default::Post {\n\
             \x20   CREATE REQUIRED PROPERTY title -> str;\n\
             \x20   CREATE REQUIRED LINK author -> default::User {\n\
             \x20       ON TARGET DELETE delete source;\n\
             \x20   };\n\
             \x20   CREATE INDEX ON (title);\n\
             };"
        );
    }

    #[test]
    fn test_render_empty_create_type() {
        let text = DdlStatement::CreateType(ObjectTypeDef::new("default::Marker")).render();
        assert_eq!(text, "CREATE TYPE default::Marker;");
    }

    #[test]
    fn test_render_alter_type() {
        let stmt = DdlStatement::AlterType {
            name: "default::User".into(),
            ops: vec![
                AlterTypeOp::AlterProperty {
                    name: "name".into(),
                    changes: vec![PropertyAlter::SetRequired {
                        fill: Some("'unknown'".into()),
                    }],
                },
                AlterTypeOp::RenameProperty {
                    name: "nick".into(),
                    new_name: "handle".into(),
                },
            ],
        };
        assert_eq!(
            stmt.render(),
            "ALTER TYPE default::User {\n\
             \x20   ALTER PROPERTY name {\n\
             \x20       SET REQUIRED USING ('unknown');\n\
             \x20   };\n\
             \x20   RENAME PROPERTY nick TO handle;\n\
             };"
        );
    }

    #[test]
    fn test_render_scalar_type() {
        let def = ScalarTypeDef::new("default::status", ScalarRef::str())
            .with_constraint(ConstraintDef::OneOf(vec!["draft".into(), "live".into()]));
        assert_eq!(
            DdlStatement::CreateScalarType(def).render(),
            "CREATE SCALAR TYPE default::status EXTENDING str {\n\
             \x20   CREATE CONSTRAINT one_of('draft', 'live');\n\
             };"
        );
    }

    #[test]
    fn test_apply_create_and_alter() {
        let mut schema = Schema::new();
        DdlStatement::CreateType(user_type())
            .apply_to(&mut schema, true)
            .unwrap();

        DdlStatement::AlterType {
            name: "default::User".into(),
            ops: vec![AlterTypeOp::AddProperty(PropertyDef::new(
                "email",
                ScalarRef::str(),
            ))],
        }
        .apply_to(&mut schema, true)
        .unwrap();

        let user = schema.get_object_type("default::User").unwrap();
        assert!(user.get_property("email").is_some());
    }

    #[test]
    fn test_apply_duplicate_type_fails() {
        let mut schema = Schema::new();
        DdlStatement::CreateType(user_type())
            .apply_to(&mut schema, true)
            .unwrap();
        let err = DdlStatement::CreateType(user_type())
            .apply_to(&mut schema, true)
            .unwrap_err();
        assert!(matches!(err, ReplayError::DuplicateType(_)));
    }

    #[test]
    fn test_apply_set_required_without_fill_strict() {
        let mut schema = Schema::new();
        DdlStatement::CreateType(user_type())
            .apply_to(&mut schema, true)
            .unwrap();

        let stmt = DdlStatement::AlterType {
            name: "default::User".into(),
            ops: vec![AlterTypeOp::AlterProperty {
                name: "age".into(),
                changes: vec![PropertyAlter::SetRequired { fill: None }],
            }],
        };
        let err = stmt.apply_to(&mut schema, true).unwrap_err();
        assert!(matches!(err, ReplayError::RequiredWithoutFill { .. }));

        // Non-strict replay tolerates the missing fill.
        stmt.apply_to(&mut schema, false).unwrap();
        assert!(
            schema
                .get_object_type("default::User")
                .unwrap()
                .get_property("age")
                .unwrap()
                .required
        );
    }

    #[test]
    fn test_apply_drop_type_in_use_fails() {
        let mut schema = Schema::new();
        DdlStatement::CreateType(user_type())
            .apply_to(&mut schema, true)
            .unwrap();
        DdlStatement::CreateType(
            ObjectTypeDef::new("default::Post")
                .with_link(LinkDef::new("author", "default::User")),
        )
        .apply_to(&mut schema, true)
        .unwrap();

        let err = DdlStatement::DropType {
            name: "default::User".into(),
        }
        .apply_to(&mut schema, true)
        .unwrap_err();
        assert!(matches!(err, ReplayError::TypeInUse { .. }));

        DdlStatement::DropType {
            name: "default::Post".into(),
        }
        .apply_to(&mut schema, true)
        .unwrap();
        DdlStatement::DropType {
            name: "default::User".into(),
        }
        .apply_to(&mut schema, true)
        .unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn test_apply_rename_type_rewrites_references() {
        let mut schema = Schema::new();
        DdlStatement::CreateType(user_type())
            .apply_to(&mut schema, true)
            .unwrap();
        DdlStatement::CreateType(
            ObjectTypeDef::new("default::Post")
                .with_link(LinkDef::new("author", "default::User")),
        )
        .apply_to(&mut schema, true)
        .unwrap();

        DdlStatement::RenameType {
            name: "default::User".into(),
            new_name: "default::Person".into(),
        }
        .apply_to(&mut schema, true)
        .unwrap();

        assert!(schema.get_object_type("default::User").is_none());
        assert!(schema.get_object_type("default::Person").is_some());
        let post = schema.get_object_type("default::Post").unwrap();
        assert_eq!(post.get_link("author").unwrap().target, "default::Person");
    }

    #[test]
    fn test_apply_self_link() {
        let mut schema = Schema::new();
        let def = ObjectTypeDef::new("default::Node")
            .with_link(LinkDef::new("parent", "default::Node"));
        DdlStatement::CreateType(def)
            .apply_to(&mut schema, true)
            .unwrap();
        assert!(schema.get_object_type("default::Node").is_some());
    }

    #[test]
    fn test_apply_drop_missing_constraint_fails() {
        let mut schema = Schema::new();
        DdlStatement::CreateType(user_type())
            .apply_to(&mut schema, true)
            .unwrap();

        let err = DdlStatement::AlterType {
            name: "default::User".into(),
            ops: vec![AlterTypeOp::AlterProperty {
                name: "age".into(),
                changes: vec![PropertyAlter::DropConstraint(ConstraintDef::Exclusive)],
            }],
        }
        .apply_to(&mut schema, true)
        .unwrap_err();
        assert!(matches!(err, ReplayError::UnknownConstraint { .. }));
    }

    #[test]
    fn test_render_is_stable() {
        let def = user_type();
        let a = DdlStatement::CreateType(def.clone()).render();
        let b = DdlStatement::CreateType(def).render();
        assert_eq!(a, b);
    }
}
