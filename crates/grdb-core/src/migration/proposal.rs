//! Proposal engine: turns a schema diff into an ordered list of DDL
//! proposals for the user to confirm.
//!
//! Each proposal carries one logical change, a confidence score, a safety
//! class, and optionally alternatives (offered when the user rejects the
//! primary guess) and required input slots (cast and fill expressions the
//! engine cannot invent). Rename inference pairs a removal with a
//! same-shaped addition instead of proposing a destructive drop.

use crate::catalog::{Cardinality, LinkDef, ObjectTypeDef, PropertyDef, Schema};
use crate::migration::ddl::{
    AlterTypeOp, DdlStatement, LinkAlter, PropertyAlter, ScalarAlter,
};
use crate::migration::diff::{
    LinkChange, PropertyChange, ScalarChange, SchemaDiff, TypeChange, TypeModification,
};
use std::collections::BTreeSet;

/// Confidence at or above which non-interactive mode accepts a proposal.
pub const AUTO_ACCEPT_THRESHOLD: f64 = 0.8;

/// Confidence assigned to an inferred object type rename.
const TYPE_RENAME_CONFIDENCE: f64 = 0.8;

/// Confidence assigned to an inferred property or link rename.
const MEMBER_RENAME_CONFIDENCE: f64 = 0.66;

/// Confidence assigned to a target change needing a user-supplied cast.
const LOSSY_CAST_CONFIDENCE: f64 = 0.66;

/// How much damage a proposal can do to existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SafetyClass {
    /// No effect on existing data.
    Safe,
    /// Existing data is rewritten or validated, but preserved.
    Backfill,
    /// Existing data is discarded.
    Destructive,
}

impl SafetyClass {
    /// Whether non-interactive mode refuses this without `--allow-unsafe`.
    pub fn needs_unsafe_flag(&self) -> bool {
        matches!(self, SafetyClass::Destructive)
    }
}

impl std::fmt::Display for SafetyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafetyClass::Safe => write!(f, "safe"),
            SafetyClass::Backfill => write!(f, "backfill"),
            SafetyClass::Destructive => write!(f, "destructive"),
        }
    }
}

/// An expression the user must supply before the proposal can be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredInput {
    /// Short slot name, e.g. `fill_expr` or `cast_expr`.
    pub placeholder: String,
    /// Question shown when prompting for the expression.
    pub prompt: String,
}

/// One confirmable unit of schema change.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Question shown to the user, e.g. `did you create object type
    /// 'default::Post'?`.
    pub prompt: String,
    /// Statements realizing the change. Input slots (casts, fills) may be
    /// unfilled until [`Proposal::resolve_inputs`] is called.
    pub statements: Vec<DdlStatement>,
    /// How sure the engine is that this is what the user meant, in `[0, 1]`.
    pub confidence: f64,
    /// Data-safety classification.
    pub safety: SafetyClass,
    /// Expressions the user must supply, in slot order.
    pub required_input: Vec<RequiredInput>,
    /// Fallbacks offered when the user rejects this proposal.
    pub alternatives: Vec<Proposal>,
}

impl Proposal {
    fn new(prompt: impl Into<String>, statements: Vec<DdlStatement>) -> Self {
        Self {
            prompt: prompt.into(),
            statements,
            confidence: 1.0,
            safety: SafetyClass::Safe,
            required_input: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    fn confidence(mut self, value: f64) -> Self {
        self.confidence = value;
        self
    }

    fn safety(mut self, class: SafetyClass) -> Self {
        self.safety = class;
        self
    }

    fn with_input(mut self, placeholder: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.required_input.push(RequiredInput {
            placeholder: placeholder.into(),
            prompt: prompt.into(),
        });
        self
    }

    fn with_alternative(mut self, alternative: Proposal) -> Self {
        self.alternatives.push(alternative);
        self
    }

    /// Statements with input slots filled from `values`, which must line up
    /// with [`Proposal::required_input`].
    pub fn resolve_inputs(&self, values: &[String]) -> Vec<DdlStatement> {
        let mut statements = self.statements.clone();
        let mut supply = values.iter();
        for stmt in &mut statements {
            let DdlStatement::AlterType { ops, .. } = stmt else {
                continue;
            };
            for op in ops {
                match op {
                    AlterTypeOp::AlterProperty { changes, .. } => {
                        for change in changes {
                            match change {
                                PropertyAlter::SetType { cast: slot @ None, .. }
                                | PropertyAlter::SetRequired { fill: slot @ None } => {
                                    *slot = supply.next().cloned();
                                }
                                _ => {}
                            }
                        }
                    }
                    AlterTypeOp::AlterLink { changes, .. } => {
                        for change in changes {
                            if let LinkAlter::SetRequired { fill: slot @ None } = change {
                                *slot = supply.next().cloned();
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        statements
    }

    /// Rendered statement text, one statement per block.
    pub fn render_statements(&self) -> String {
        self.statements
            .iter()
            .map(DdlStatement::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Generate proposals for the changes in `diff`, in application order.
///
/// `old` is the schema the diff starts from; it is consulted for link
/// topology when ordering type creations.
pub fn propose(old: &Schema, diff: &SchemaDiff) -> Vec<Proposal> {
    let mut proposals = Vec::new();

    let mut scalar_removed = Vec::new();
    for change in &diff.scalar_changes {
        match change {
            ScalarChange::Added(def) => {
                proposals.push(Proposal::new(
                    format!("did you create scalar type '{}'?", def.name),
                    vec![DdlStatement::CreateScalarType(def.clone())],
                ));
            }
            ScalarChange::Removed(def) => scalar_removed.push(def),
            ScalarChange::ConstraintsChanged { name, added, removed } => {
                for c in added {
                    proposals.push(
                        Proposal::new(
                            format!(
                                "did you create constraint '{}' of scalar type '{name}'?",
                                c.kind_name()
                            ),
                            vec![DdlStatement::AlterScalarType {
                                name: name.clone(),
                                ops: vec![ScalarAlter::AddConstraint(c.clone())],
                            }],
                        )
                        .safety(SafetyClass::Backfill),
                    );
                }
                for c in removed {
                    proposals.push(Proposal::new(
                        format!(
                            "did you drop constraint '{}' of scalar type '{name}'?",
                            c.kind_name()
                        ),
                        vec![DdlStatement::AlterScalarType {
                            name: name.clone(),
                            ops: vec![ScalarAlter::DropConstraint(c.clone())],
                        }],
                    ));
                }
            }
            ScalarChange::BaseChanged { from, to } => {
                proposals.push(
                    Proposal::new(
                        format!(
                            "did you alter scalar type '{}' to extend {}?",
                            from.name,
                            to.base.name()
                        ),
                        vec![DdlStatement::AlterScalarType {
                            name: from.name.clone(),
                            ops: vec![ScalarAlter::SetBase(to.base.clone())],
                        }],
                    )
                    .safety(SafetyClass::Destructive),
                );
            }
        }
    }

    let mut added: Vec<&ObjectTypeDef> = Vec::new();
    let mut removed: Vec<&ObjectTypeDef> = Vec::new();
    let mut modified: Vec<&TypeModification> = Vec::new();
    for change in &diff.type_changes {
        match change {
            TypeChange::Added(def) => added.push(def),
            TypeChange::Removed(def) => removed.push(def),
            TypeChange::Modified(m) => modified.push(m),
        }
    }

    // Rename inference: pair each removed type with the first same-shaped
    // added type.
    let mut paired_added: Vec<bool> = vec![false; added.len()];
    let mut rename_pairs: Vec<(&ObjectTypeDef, &ObjectTypeDef)> = Vec::new();
    let mut unpaired_removed: Vec<&ObjectTypeDef> = Vec::new();
    for r in &removed {
        let candidate = added
            .iter()
            .enumerate()
            .find(|(i, a)| !paired_added[*i] && same_type_shape(r, a));
        match candidate {
            Some((i, a)) => {
                paired_added[i] = true;
                rename_pairs.push((r, a));
            }
            None => unpaired_removed.push(r),
        }
    }
    let unpaired_added: Vec<&ObjectTypeDef> = added
        .iter()
        .enumerate()
        .filter(|(i, _)| !paired_added[*i])
        .map(|(_, a)| *a)
        .collect();

    for (r, a) in &rename_pairs {
        let alternative = Proposal::new(
            format!(
                "did you drop object type '{}' and create object type '{}'?",
                r.name, a.name
            ),
            vec![
                DdlStatement::CreateType((*a).clone()),
                DdlStatement::DropType {
                    name: r.name.clone(),
                },
            ],
        )
        .safety(SafetyClass::Destructive);

        proposals.push(
            Proposal::new(
                format!(
                    "did you rename object type '{}' to '{}'?",
                    r.name, a.name
                ),
                vec![DdlStatement::RenameType {
                    name: r.name.clone(),
                    new_name: a.name.clone(),
                }],
            )
            .confidence(TYPE_RENAME_CONFIDENCE)
            .with_alternative(alternative),
        );
    }

    // New types, in name order, with links to not-yet-created types split
    // off into follow-up additions so every creation replays cleanly.
    let added_names: BTreeSet<&str> = unpaired_added.iter().map(|a| a.name.as_str()).collect();
    let mut known: BTreeSet<&str> = old.object_types.keys().map(String::as_str).collect();
    known.extend(rename_pairs.iter().map(|(_, a)| a.name.as_str()));
    let mut deferred_links: Vec<(&str, &LinkDef)> = Vec::new();
    for def in &unpaired_added {
        let mut create = (*def).clone();
        create.links.retain(|l| {
            let ready = l.target == def.name
                || known.contains(l.target.as_str())
                || !added_names.contains(l.target.as_str());
            if !ready {
                // Borrowing from the original def, which outlives this pass.
                let original = def.links.iter().find(|o| o.name == l.name).unwrap();
                deferred_links.push((def.name.as_str(), original));
            }
            ready
        });
        known.insert(def.name.as_str());
        proposals.push(Proposal::new(
            format!("did you create object type '{}'?", def.name),
            vec![DdlStatement::CreateType(create)],
        ));
    }
    for (type_name, link) in deferred_links {
        proposals.push(Proposal::new(
            format!(
                "did you create link '{}' of object type '{type_name}'?",
                link.name
            ),
            vec![DdlStatement::AlterType {
                name: type_name.to_string(),
                ops: vec![AlterTypeOp::AddLink(link.clone())],
            }],
        ));
    }

    for m in &modified {
        propose_modification(m, &mut proposals);
    }

    for r in &unpaired_removed {
        proposals.push(
            Proposal::new(
                format!("did you drop object type '{}'?", r.name),
                vec![DdlStatement::DropType {
                    name: r.name.clone(),
                }],
            )
            .safety(SafetyClass::Destructive),
        );
    }
    for def in scalar_removed {
        proposals.push(
            Proposal::new(
                format!("did you drop scalar type '{}'?", def.name),
                vec![DdlStatement::DropScalarType {
                    name: def.name.clone(),
                }],
            )
            .safety(SafetyClass::Destructive),
        );
    }

    proposals
}

/// Order accepted statements for writing: drops of whole types come after
/// everything else, so retargeted and removed references are gone before
/// the type they pointed at.
pub fn order_statements(statements: Vec<DdlStatement>) -> Vec<DdlStatement> {
    let (drops, rest): (Vec<_>, Vec<_>) = statements.into_iter().partition(|s| {
        matches!(
            s,
            DdlStatement::DropType { .. } | DdlStatement::DropScalarType { .. }
        )
    });
    let mut out = rest;
    out.extend(drops);
    out
}

fn same_type_shape(old: &ObjectTypeDef, new: &ObjectTypeDef) -> bool {
    old.is_abstract == new.is_abstract
        && old.properties.len() == new.properties.len()
        && old.links.len() == new.links.len()
        && old.properties.iter().all(|p| {
            new.get_property(&p.name)
                .is_some_and(|q| p.same_shape(q))
        })
        && old.links.iter().all(|l| {
            new.get_link(&l.name)
                .is_some_and(|m| link_shape_matches(l, m, &old.name, &new.name))
        })
}

/// Link shape comparison that treats a self-link as unchanged across the
/// candidate rename.
fn link_shape_matches(old: &LinkDef, new: &LinkDef, old_type: &str, new_type: &str) -> bool {
    let target_matches =
        old.target == new.target || (old.target == old_type && new.target == new_type);
    target_matches && old.required == new.required && old.cardinality == new.cardinality
}

fn propose_modification(m: &TypeModification, proposals: &mut Vec<Proposal>) {
    let type_name = &m.name;

    // Member rename inference, properties then links.
    let mut prop_changes: Vec<&PropertyChange> = m.property_changes.iter().collect();
    let mut i = 0;
    while i < prop_changes.len() {
        let PropertyChange::Removed(old_prop) = prop_changes[i] else {
            i += 1;
            continue;
        };
        let paired = prop_changes.iter().position(|c| {
            matches!(c, PropertyChange::Added(new_prop) if old_prop.same_shape(new_prop))
        });
        if let Some(j) = paired {
            let PropertyChange::Added(new_prop) = prop_changes[j] else {
                unreachable!()
            };
            proposals.push(propose_property_rename(type_name, old_prop, new_prop));
            let (first, second) = if i < j { (j, i) } else { (i, j) };
            prop_changes.remove(first);
            prop_changes.remove(second);
        } else {
            i += 1;
        }
    }
    for change in prop_changes {
        propose_property_change(type_name, change, proposals);
    }

    let mut link_changes: Vec<&LinkChange> = m.link_changes.iter().collect();
    let mut i = 0;
    while i < link_changes.len() {
        let LinkChange::Removed(old_link) = link_changes[i] else {
            i += 1;
            continue;
        };
        let paired = link_changes.iter().position(|c| {
            matches!(c, LinkChange::Added(new_link) if old_link.same_shape(new_link))
        });
        if let Some(j) = paired {
            let LinkChange::Added(new_link) = link_changes[j] else {
                unreachable!()
            };
            proposals.push(propose_link_rename(type_name, old_link, new_link));
            let (first, second) = if i < j { (j, i) } else { (i, j) };
            link_changes.remove(first);
            link_changes.remove(second);
        } else {
            i += 1;
        }
    }
    for change in link_changes {
        propose_link_change(type_name, change, proposals);
    }

    for c in &m.constraints_added {
        proposals.push(
            Proposal::new(
                format!(
                    "did you create constraint '{}' of object type '{type_name}'?",
                    c.kind_name()
                ),
                vec![alter(type_name, AlterTypeOp::AddConstraint(c.clone()))],
            )
            .safety(SafetyClass::Backfill),
        );
    }
    for c in &m.constraints_removed {
        proposals.push(Proposal::new(
            format!(
                "did you drop constraint '{}' of object type '{type_name}'?",
                c.kind_name()
            ),
            vec![alter(type_name, AlterTypeOp::DropConstraint(c.clone()))],
        ));
    }
    for idx in &m.indexes_added {
        proposals.push(Proposal::new(
            format!("did you create index on ({}) of object type '{type_name}'?", idx.expr),
            vec![alter(type_name, AlterTypeOp::AddIndex(idx.clone()))],
        ));
    }
    for idx in &m.indexes_removed {
        proposals.push(Proposal::new(
            format!("did you drop index on ({}) of object type '{type_name}'?", idx.expr),
            vec![alter(type_name, AlterTypeOp::DropIndex(idx.clone()))],
        ));
    }
    if let Some(value) = m.abstract_changed {
        let safety = if value {
            SafetyClass::Destructive
        } else {
            SafetyClass::Safe
        };
        proposals.push(
            Proposal::new(
                format!(
                    "did you make object type '{type_name}' {}?",
                    if value { "abstract" } else { "concrete" }
                ),
                vec![alter(type_name, AlterTypeOp::SetAbstract(value))],
            )
            .safety(safety),
        );
    }
    if let Some(parents) = &m.extends_changed {
        proposals.push(
            Proposal::new(
                format!("did you alter the parents of object type '{type_name}'?"),
                vec![alter(type_name, AlterTypeOp::SetExtends(parents.clone()))],
            )
            .safety(SafetyClass::Backfill),
        );
    }
}

fn alter(type_name: &str, op: AlterTypeOp) -> DdlStatement {
    DdlStatement::AlterType {
        name: type_name.to_string(),
        ops: vec![op],
    }
}

fn alter_property(type_name: &str, property: &str, change: PropertyAlter) -> DdlStatement {
    alter(
        type_name,
        AlterTypeOp::AlterProperty {
            name: property.to_string(),
            changes: vec![change],
        },
    )
}

fn alter_link(type_name: &str, link: &str, change: LinkAlter) -> DdlStatement {
    alter(
        type_name,
        AlterTypeOp::AlterLink {
            name: link.to_string(),
            changes: vec![change],
        },
    )
}

/// Proposal for a brand-new property on an existing type. A required
/// property without a default needs a fill expression for existing objects.
fn propose_add_property(type_name: &str, p: &PropertyDef) -> Proposal {
    let prompt = format!(
        "did you create property '{}' of object type '{type_name}'?",
        p.name
    );
    if p.required && p.default.is_none() {
        let mut optional = p.clone();
        optional.required = false;
        Proposal::new(
            prompt,
            vec![
                alter(type_name, AlterTypeOp::AddProperty(optional)),
                alter_property(type_name, &p.name, PropertyAlter::SetRequired { fill: None }),
            ],
        )
        .safety(SafetyClass::Backfill)
        .with_input(
            "fill_expr",
            format!(
                "fill expression for required property '{type_name}.{}'",
                p.name
            ),
        )
    } else {
        Proposal::new(prompt, vec![alter(type_name, AlterTypeOp::AddProperty(p.clone()))])
    }
}

fn propose_drop_property(type_name: &str, name: &str) -> Proposal {
    Proposal::new(
        format!("did you drop property '{name}' of object type '{type_name}'?"),
        vec![alter(
            type_name,
            AlterTypeOp::DropProperty {
                name: name.to_string(),
            },
        )],
    )
    .safety(SafetyClass::Destructive)
}

fn propose_property_rename(type_name: &str, old: &PropertyDef, new: &PropertyDef) -> Proposal {
    let add = propose_add_property(type_name, new);
    let drop = propose_drop_property(type_name, &old.name);
    let mut alternative = Proposal::new(
        format!(
            "did you drop property '{}' and create property '{}' of object type '{type_name}'?",
            old.name, new.name
        ),
        add.statements
            .iter()
            .chain(drop.statements.iter())
            .cloned()
            .collect(),
    )
    .safety(SafetyClass::Destructive);
    alternative.required_input = add.required_input.clone();

    Proposal::new(
        format!(
            "did you rename property '{}' of object type '{type_name}' to '{}'?",
            old.name, new.name
        ),
        vec![alter(
            type_name,
            AlterTypeOp::RenameProperty {
                name: old.name.clone(),
                new_name: new.name.clone(),
            },
        )],
    )
    .confidence(MEMBER_RENAME_CONFIDENCE)
    .with_alternative(alternative)
}

fn propose_property_change(
    type_name: &str,
    change: &PropertyChange,
    proposals: &mut Vec<Proposal>,
) {
    match change {
        PropertyChange::Added(p) => proposals.push(propose_add_property(type_name, p)),
        PropertyChange::Removed(p) => proposals.push(propose_drop_property(type_name, &p.name)),
        PropertyChange::TargetChanged { name, from, to } => {
            let widening = match (from.as_builtin(), to.as_builtin()) {
                (Some(a), Some(b)) => a.widens_to(&b),
                _ => false,
            };
            let prompt = format!(
                "did you alter the type of property '{name}' of object type '{type_name}'?"
            );
            if widening {
                proposals.push(Proposal::new(
                    prompt,
                    vec![alter_property(
                        type_name,
                        name,
                        PropertyAlter::SetType {
                            target: to.clone(),
                            cast: None,
                        },
                    )],
                ));
            } else {
                proposals.push(
                    Proposal::new(
                        prompt,
                        vec![alter_property(
                            type_name,
                            name,
                            PropertyAlter::SetType {
                                target: to.clone(),
                                cast: None,
                            },
                        )],
                    )
                    .confidence(LOSSY_CAST_CONFIDENCE)
                    .safety(SafetyClass::Backfill)
                    .with_input(
                        "cast_expr",
                        format!(
                            "cast expression to convert '{type_name}.{name}' from {} to {}",
                            from.name(),
                            to.name()
                        ),
                    ),
                );
            }
        }
        PropertyChange::RequiredChanged {
            name,
            required,
            has_default,
        } => {
            if *required {
                let prompt = format!(
                    "did you make property '{name}' of object type '{type_name}' required?"
                );
                let mut proposal = Proposal::new(
                    prompt,
                    vec![alter_property(
                        type_name,
                        name,
                        PropertyAlter::SetRequired { fill: None },
                    )],
                )
                .safety(SafetyClass::Backfill);
                // The default covers objects with no value; no fill needed.
                if !*has_default {
                    proposal = proposal.with_input(
                        "fill_expr",
                        format!("fill expression for required property '{type_name}.{name}'"),
                    );
                }
                proposals.push(proposal);
            } else {
                proposals.push(Proposal::new(
                    format!(
                        "did you make property '{name}' of object type '{type_name}' optional?"
                    ),
                    vec![alter_property(type_name, name, PropertyAlter::SetOptional)],
                ));
            }
        }
        PropertyChange::CardinalityChanged { name, to, .. } => {
            let safety = match to {
                Cardinality::Multi => SafetyClass::Safe,
                Cardinality::Single => SafetyClass::Destructive,
            };
            proposals.push(
                Proposal::new(
                    format!(
                        "did you make property '{name}' of object type '{type_name}' {to}?"
                    ),
                    vec![alter_property(
                        type_name,
                        name,
                        PropertyAlter::SetCardinality(*to),
                    )],
                )
                .safety(safety),
            );
        }
        PropertyChange::DefaultChanged { name, to } => {
            let change = match to {
                Some(expr) => PropertyAlter::SetDefault(expr.clone()),
                None => PropertyAlter::DropDefault,
            };
            proposals.push(Proposal::new(
                format!(
                    "did you alter the default of property '{name}' of object type '{type_name}'?"
                ),
                vec![alter_property(type_name, name, change)],
            ));
        }
        PropertyChange::ConstraintsChanged { name, added, removed } => {
            for c in added {
                proposals.push(
                    Proposal::new(
                        format!(
                            "did you create constraint '{}' of property '{name}' of object type '{type_name}'?",
                            c.kind_name()
                        ),
                        vec![alter_property(
                            type_name,
                            name,
                            PropertyAlter::AddConstraint(c.clone()),
                        )],
                    )
                    .safety(SafetyClass::Backfill),
                );
            }
            for c in removed {
                proposals.push(Proposal::new(
                    format!(
                        "did you drop constraint '{}' of property '{name}' of object type '{type_name}'?",
                        c.kind_name()
                    ),
                    vec![alter_property(
                        type_name,
                        name,
                        PropertyAlter::DropConstraint(c.clone()),
                    )],
                ));
            }
        }
    }
}

/// Proposal for a brand-new link on an existing type. A required link needs
/// a fill expression for existing objects.
fn propose_add_link(type_name: &str, l: &LinkDef) -> Proposal {
    let prompt = format!(
        "did you create link '{}' of object type '{type_name}'?",
        l.name
    );
    if l.required {
        let mut optional = l.clone();
        optional.required = false;
        Proposal::new(
            prompt,
            vec![
                alter(type_name, AlterTypeOp::AddLink(optional)),
                alter_link(type_name, &l.name, LinkAlter::SetRequired { fill: None }),
            ],
        )
        .safety(SafetyClass::Backfill)
        .with_input(
            "fill_expr",
            format!("fill expression for required link '{type_name}.{}'", l.name),
        )
    } else {
        Proposal::new(prompt, vec![alter(type_name, AlterTypeOp::AddLink(l.clone()))])
    }
}

fn propose_drop_link(type_name: &str, name: &str) -> Proposal {
    Proposal::new(
        format!("did you drop link '{name}' of object type '{type_name}'?"),
        vec![alter(
            type_name,
            AlterTypeOp::DropLink {
                name: name.to_string(),
            },
        )],
    )
    .safety(SafetyClass::Destructive)
}

fn propose_link_rename(type_name: &str, old: &LinkDef, new: &LinkDef) -> Proposal {
    let add = propose_add_link(type_name, new);
    let drop = propose_drop_link(type_name, &old.name);
    let mut alternative = Proposal::new(
        format!(
            "did you drop link '{}' and create link '{}' of object type '{type_name}'?",
            old.name, new.name
        ),
        add.statements
            .iter()
            .chain(drop.statements.iter())
            .cloned()
            .collect(),
    )
    .safety(SafetyClass::Destructive);
    alternative.required_input = add.required_input.clone();

    Proposal::new(
        format!(
            "did you rename link '{}' of object type '{type_name}' to '{}'?",
            old.name, new.name
        ),
        vec![alter(
            type_name,
            AlterTypeOp::RenameLink {
                name: old.name.clone(),
                new_name: new.name.clone(),
            },
        )],
    )
    .confidence(MEMBER_RENAME_CONFIDENCE)
    .with_alternative(alternative)
}

fn propose_link_change(type_name: &str, change: &LinkChange, proposals: &mut Vec<Proposal>) {
    match change {
        LinkChange::Added(l) => proposals.push(propose_add_link(type_name, l)),
        LinkChange::Removed(l) => proposals.push(propose_drop_link(type_name, &l.name)),
        LinkChange::TargetChanged { name, to, .. } => {
            proposals.push(
                Proposal::new(
                    format!(
                        "did you alter the target of link '{name}' of object type '{type_name}'?"
                    ),
                    vec![alter_link(
                        type_name,
                        name,
                        LinkAlter::SetTarget { target: to.clone() },
                    )],
                )
                .safety(SafetyClass::Backfill),
            );
        }
        LinkChange::RequiredChanged { name, required } => {
            if *required {
                proposals.push(
                    Proposal::new(
                        format!(
                            "did you make link '{name}' of object type '{type_name}' required?"
                        ),
                        vec![alter_link(
                            type_name,
                            name,
                            LinkAlter::SetRequired { fill: None },
                        )],
                    )
                    .safety(SafetyClass::Backfill)
                    .with_input(
                        "fill_expr",
                        format!("fill expression for required link '{type_name}.{name}'"),
                    ),
                );
            } else {
                proposals.push(Proposal::new(
                    format!("did you make link '{name}' of object type '{type_name}' optional?"),
                    vec![alter_link(type_name, name, LinkAlter::SetOptional)],
                ));
            }
        }
        LinkChange::CardinalityChanged { name, to, .. } => {
            let safety = match to {
                Cardinality::Multi => SafetyClass::Safe,
                Cardinality::Single => SafetyClass::Destructive,
            };
            proposals.push(
                Proposal::new(
                    format!("did you make link '{name}' of object type '{type_name}' {to}?"),
                    vec![alter_link(type_name, name, LinkAlter::SetCardinality(*to))],
                )
                .safety(safety),
            );
        }
        LinkChange::OnDeleteChanged { name, to } => {
            proposals.push(Proposal::new(
                format!(
                    "did you alter the delete policy of link '{name}' of object type '{type_name}'?"
                ),
                vec![alter_link(
                    type_name,
                    name,
                    LinkAlter::SetOnTargetDelete(*to),
                )],
            ));
        }
        LinkChange::ConstraintsChanged { name, added, removed } => {
            for c in added {
                proposals.push(
                    Proposal::new(
                        format!(
                            "did you create constraint '{}' of link '{name}' of object type '{type_name}'?",
                            c.kind_name()
                        ),
                        vec![alter_link(type_name, name, LinkAlter::AddConstraint(c.clone()))],
                    )
                    .safety(SafetyClass::Backfill),
                );
            }
            for c in removed {
                proposals.push(Proposal::new(
                    format!(
                        "did you drop constraint '{}' of link '{name}' of object type '{type_name}'?",
                        c.kind_name()
                    ),
                    vec![alter_link(type_name, name, LinkAlter::DropConstraint(c.clone()))],
                ));
            }
        }
    }
}
