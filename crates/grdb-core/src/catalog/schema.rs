//! Schema snapshot: all types of a schema at one point in history.

use super::object::{LinkDef, ObjectTypeDef, PropertyDef};
use super::scalar::ScalarTypeDef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A complete schema snapshot.
///
/// Types are keyed by fully qualified name in ordered maps so that diffing
/// and DDL rendering are deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Object types keyed by fully qualified name.
    pub object_types: BTreeMap<String, ObjectTypeDef>,
    /// Custom scalar types keyed by fully qualified name.
    pub scalar_types: BTreeMap<String, ScalarTypeDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object type.
    pub fn with_object_type(mut self, def: ObjectTypeDef) -> Self {
        self.object_types.insert(def.name.clone(), def);
        self
    }

    /// Add a scalar type.
    pub fn with_scalar_type(mut self, def: ScalarTypeDef) -> Self {
        self.scalar_types.insert(def.name.clone(), def);
        self
    }

    /// Get an object type by fully qualified name.
    pub fn get_object_type(&self, name: &str) -> Option<&ObjectTypeDef> {
        self.object_types.get(name)
    }

    /// Get a scalar type by fully qualified name.
    pub fn get_scalar_type(&self, name: &str) -> Option<&ScalarTypeDef> {
        self.scalar_types.get(name)
    }

    /// Whether the schema has no types at all.
    pub fn is_empty(&self) -> bool {
        self.object_types.is_empty() && self.scalar_types.is_empty()
    }

    /// All module names present in the schema, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self
            .object_types
            .values()
            .map(|t| t.module())
            .chain(
                self.scalar_types
                    .keys()
                    .map(|n| n.rsplit_once("::").map(|(m, _)| m).unwrap_or("")),
            )
            .collect();
        modules.sort_unstable();
        modules.dedup();
        modules
    }

    /// Object types that link to `target`, with the linking link names.
    pub fn links_into(&self, target: &str) -> Vec<(&ObjectTypeDef, &LinkDef)> {
        self.object_types
            .values()
            .flat_map(|t| t.links.iter().map(move |l| (t, l)))
            .filter(|(_, l)| l.target == target)
            .collect()
    }

    /// Properties of a type including inherited ones, parent-first, with
    /// child declarations overriding parents by name.
    pub fn effective_properties(&self, name: &str) -> Vec<&PropertyDef> {
        let mut out: Vec<&PropertyDef> = Vec::new();
        let mut visited = HashSet::new();
        self.collect_members(name, &mut visited, &mut |t| {
            for prop in &t.properties {
                if let Some(slot) = out.iter_mut().find(|p| p.name == prop.name) {
                    *slot = prop;
                } else {
                    out.push(prop);
                }
            }
        });
        out
    }

    /// Links of a type including inherited ones, parent-first, with child
    /// declarations overriding parents by name.
    pub fn effective_links(&self, name: &str) -> Vec<&LinkDef> {
        let mut out: Vec<&LinkDef> = Vec::new();
        let mut visited = HashSet::new();
        self.collect_members(name, &mut visited, &mut |t| {
            for link in &t.links {
                if let Some(slot) = out.iter_mut().find(|l| l.name == link.name) {
                    *slot = link;
                } else {
                    out.push(link);
                }
            }
        });
        out
    }

    /// Walk the `extends` chain parent-first, invoking `visit` per type.
    /// Cycles are broken by the visited set.
    fn collect_members<'a>(
        &'a self,
        name: &str,
        visited: &mut HashSet<String>,
        visit: &mut impl FnMut(&'a ObjectTypeDef),
    ) {
        if !visited.insert(name.to_string()) {
            return;
        }
        let Some(def) = self.object_types.get(name) else {
            return;
        };
        for parent in &def.extends {
            self.collect_members(parent, visited, visit);
        }
        visit(def);
    }
}
