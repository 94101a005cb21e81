//! Lowering parsed SDL documents into a resolved [`Schema`].
//!
//! Lowering resolves bare type names against their enclosing module,
//! classifies targets as scalar or object, and rejects schemas with
//! duplicate or dangling declarations. All errors carry the source span of
//! the offending declaration.

use super::constraint::{ConstraintDef, IndexDef};
use super::object::{LinkDef, ObjectTypeDef, PropertyDef};
use super::scalar::ScalarTypeDef;
use super::schema::Schema;
use super::types::{BuiltinScalar, Cardinality, OnTargetDelete, ScalarRef};
use grdb_sdl::ast::{
    CardinalityKw, ConstraintDecl, Declaration, LinkDecl, ObjectTypeDecl, OnTargetDeleteKw,
    PropertyDecl, ScalarTypeDecl, SchemaDocument, TypeItem,
};
use grdb_sdl::span::Span;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Error during lowering (AST to schema).
#[derive(Debug, Error)]
pub struct LowerError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Error kind for programmatic handling.
    pub kind: LowerErrorKind,
}

impl std::fmt::Display for LowerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Kinds of lowering errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowerErrorKind {
    /// Type declared twice in the same module.
    DuplicateType,
    /// Property or link declared twice in the same type.
    DuplicateMember,
    /// Reference to a type that does not exist.
    UnknownType,
    /// A link targeting a scalar, or a property targeting an object type.
    InvalidTarget,
    /// Reference to an unknown constraint.
    UnknownConstraint,
    /// Constraint arguments do not match the constraint.
    InvalidConstraintArgs,
}

impl LowerError {
    fn new(message: impl Into<String>, span: Span, kind: LowerErrorKind) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }
}

/// Lower a set of parsed documents into a schema.
///
/// Multiple documents may contribute to the same module; a schema directory
/// is parsed file by file and lowered in one call.
pub fn lower(documents: &[SchemaDocument]) -> Result<Schema, LowerError> {
    Lowerer::new(documents)?.lower()
}

/// What a name refers to, used during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Object,
    Scalar,
}

struct Lowerer<'a> {
    documents: &'a [SchemaDocument],
    /// Fully qualified name -> declared kind.
    declared: HashMap<String, TypeKind>,
}

impl<'a> Lowerer<'a> {
    /// First pass: register every declared type name.
    fn new(documents: &'a [SchemaDocument]) -> Result<Self, LowerError> {
        let mut declared = HashMap::new();

        for doc in documents {
            for module in &doc.modules {
                for decl in &module.declarations {
                    let fq = format!("{}::{}", module.name.value, decl.name());
                    let kind = match decl {
                        Declaration::Object(_) => TypeKind::Object,
                        Declaration::Scalar(_) => TypeKind::Scalar,
                    };
                    if declared.insert(fq.clone(), kind).is_some() {
                        return Err(LowerError::new(
                            format!("type '{}' is declared more than once", fq),
                            decl.span(),
                            LowerErrorKind::DuplicateType,
                        ));
                    }
                }
            }
        }

        Ok(Self {
            documents,
            declared,
        })
    }

    /// Second pass: build resolved definitions.
    fn lower(&self) -> Result<Schema, LowerError> {
        let mut schema = Schema::new();

        for doc in self.documents {
            for module in &doc.modules {
                let module_name = &module.name.value;
                for decl in &module.declarations {
                    match decl {
                        Declaration::Object(obj) => {
                            let def = self.lower_object_type(module_name, obj)?;
                            schema.object_types.insert(def.name.clone(), def);
                        }
                        Declaration::Scalar(scalar) => {
                            let def = self.lower_scalar_type(module_name, scalar)?;
                            schema.scalar_types.insert(def.name.clone(), def);
                        }
                    }
                }
            }
        }

        Ok(schema)
    }

    fn lower_object_type(
        &self,
        module: &str,
        decl: &ObjectTypeDecl,
    ) -> Result<ObjectTypeDef, LowerError> {
        let fq = format!("{}::{}", module, decl.name.value);
        let mut def = ObjectTypeDef::new(fq);
        def.is_abstract = decl.is_abstract;

        for parent in &decl.extends {
            let (name, kind) = self.resolve_type(module, &parent.value, parent.span)?;
            if kind != TypeKind::Object {
                return Err(LowerError::new(
                    format!("'{}' cannot extend scalar type '{}'", def.name, name),
                    parent.span,
                    LowerErrorKind::InvalidTarget,
                ));
            }
            def.extends.push(name);
        }

        let mut member_names = HashSet::new();
        for item in &decl.items {
            match item {
                TypeItem::Property(prop) => {
                    if !member_names.insert(prop.name.value.clone()) {
                        return Err(duplicate_member(&def.name, &prop.name.value, prop.span));
                    }
                    def.properties.push(self.lower_property(module, prop)?);
                }
                TypeItem::Link(link) => {
                    if !member_names.insert(link.name.value.clone()) {
                        return Err(duplicate_member(&def.name, &link.name.value, link.span));
                    }
                    def.links.push(self.lower_link(module, link)?);
                }
                TypeItem::Constraint(c) => {
                    def.constraints.push(lower_constraint(c)?);
                }
                TypeItem::Index(index) => {
                    def.indexes.push(IndexDef::new(index.expr.clone()));
                }
            }
        }

        Ok(def)
    }

    fn lower_scalar_type(
        &self,
        module: &str,
        decl: &ScalarTypeDecl,
    ) -> Result<ScalarTypeDef, LowerError> {
        let fq = format!("{}::{}", module, decl.name.value);
        let base = self.resolve_scalar(module, &decl.base.value, decl.base.span)?;

        let mut def = ScalarTypeDef::new(fq, base);
        for c in &decl.constraints {
            def.constraints.push(lower_constraint(c)?);
        }
        Ok(def)
    }

    fn lower_property(
        &self,
        module: &str,
        decl: &PropertyDecl,
    ) -> Result<PropertyDef, LowerError> {
        let target = self.resolve_scalar(module, &decl.target.value, decl.target.span)?;

        let mut def = PropertyDef::new(decl.name.value.clone(), target);
        def.required = decl.required.unwrap_or(false);
        def.cardinality = match decl.cardinality {
            Some(CardinalityKw::Multi) => Cardinality::Multi,
            _ => Cardinality::Single,
        };
        def.default = decl.default.as_ref().map(|d| d.value.clone());
        for c in &decl.constraints {
            def.constraints.push(lower_constraint(c)?);
        }
        Ok(def)
    }

    fn lower_link(&self, module: &str, decl: &LinkDecl) -> Result<LinkDef, LowerError> {
        let (target, kind) = self.resolve_type(module, &decl.target.value, decl.target.span)?;
        if kind != TypeKind::Object {
            return Err(LowerError::new(
                format!(
                    "link '{}' targets scalar type '{}'; links must target object types",
                    decl.name.value, target
                ),
                decl.target.span,
                LowerErrorKind::InvalidTarget,
            ));
        }

        let mut def = LinkDef::new(decl.name.value.clone(), target);
        def.required = decl.required.unwrap_or(false);
        def.cardinality = match decl.cardinality {
            Some(CardinalityKw::Multi) => Cardinality::Multi,
            _ => Cardinality::Single,
        };
        def.on_target_delete = match decl.on_target_delete {
            Some(OnTargetDeleteKw::Allow) => OnTargetDelete::Allow,
            Some(OnTargetDeleteKw::DeleteSource) => OnTargetDelete::DeleteSource,
            Some(OnTargetDeleteKw::Restrict) | None => OnTargetDelete::Restrict,
        };
        for c in &decl.constraints {
            def.constraints.push(lower_constraint(c)?);
        }
        Ok(def)
    }

    /// Resolve a (possibly qualified) name to a declared type.
    fn resolve_type(
        &self,
        module: &str,
        name: &str,
        span: Span,
    ) -> Result<(String, TypeKind), LowerError> {
        let candidate = if name.contains("::") {
            name.to_string()
        } else {
            format!("{}::{}", module, name)
        };

        match self.declared.get(&candidate) {
            Some(kind) => Ok((candidate, *kind)),
            None => Err(LowerError::new(
                format!("unknown type '{}'", name),
                span,
                LowerErrorKind::UnknownType,
            )),
        }
    }

    /// Resolve a property target or scalar base: builtin first, then custom
    /// scalars.
    fn resolve_scalar(
        &self,
        module: &str,
        name: &str,
        span: Span,
    ) -> Result<ScalarRef, LowerError> {
        if let Some(builtin) = BuiltinScalar::from_name(name) {
            return Ok(ScalarRef::Builtin(builtin));
        }

        let (resolved, kind) = self.resolve_type(module, name, span).map_err(|_| {
            LowerError::new(
                format!("unknown scalar type '{}'", name),
                span,
                LowerErrorKind::UnknownType,
            )
        })?;
        match kind {
            TypeKind::Scalar => Ok(ScalarRef::Custom(resolved)),
            TypeKind::Object => Err(LowerError::new(
                format!(
                    "'{}' is an object type; properties must target scalar types",
                    resolved
                ),
                span,
                LowerErrorKind::InvalidTarget,
            )),
        }
    }
}

fn duplicate_member(type_name: &str, member: &str, span: Span) -> LowerError {
    LowerError::new(
        format!("duplicate member '{}' in type '{}'", member, type_name),
        span,
        LowerErrorKind::DuplicateMember,
    )
}

fn lower_constraint(decl: &ConstraintDecl) -> Result<ConstraintDef, LowerError> {
    match decl.name.value.as_str() {
        "exclusive" => {
            if decl.args.is_some() {
                return Err(LowerError::new(
                    "constraint 'exclusive' takes no arguments",
                    decl.span,
                    LowerErrorKind::InvalidConstraintArgs,
                ));
            }
            Ok(ConstraintDef::Exclusive)
        }
        "one_of" => {
            let args = decl.args.as_deref().unwrap_or("");
            let values = parse_string_list(args).ok_or_else(|| {
                LowerError::new(
                    "constraint 'one_of' expects a list of string literals",
                    decl.span,
                    LowerErrorKind::InvalidConstraintArgs,
                )
            })?;
            Ok(ConstraintDef::OneOf(values))
        }
        "expression" => {
            let expr = decl.args.as_deref().unwrap_or("").trim().to_string();
            if expr.is_empty() {
                return Err(LowerError::new(
                    "constraint 'expression' expects an expression argument",
                    decl.span,
                    LowerErrorKind::InvalidConstraintArgs,
                ));
            }
            Ok(ConstraintDef::Expression(expr))
        }
        other => Err(LowerError::new(
            format!("unknown constraint '{}'", other),
            decl.span,
            LowerErrorKind::UnknownConstraint,
        )),
    }
}

/// Parse `'a', 'b', "c"` into `["a", "b", "c"]`; `None` on anything else.
fn parse_string_list(args: &str) -> Option<Vec<String>> {
    let mut values = Vec::new();
    for part in args.split(',') {
        let part = part.trim();
        let inner = part
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .or_else(|| part.strip_prefix('"').and_then(|s| s.strip_suffix('"')))?;
        values.push(inner.to_string());
    }
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grdb_sdl::parse_schema;

    fn lower_source(source: &str) -> Result<Schema, LowerError> {
        let doc = parse_schema(source).expect("parse failed");
        lower(&[doc])
    }

    #[test]
    fn test_lower_basic_schema() {
        let schema = lower_source(
            r#"
            module default {
                type User {
                    required property name -> str;
                    property email -> str {
                        constraint exclusive;
                    }
                    multi link posts -> Post {
                        on target delete allow;
                    }
                    index on (name);
                }
                type Post {
                    required property title -> str;
                }
            }
            "#,
        )
        .unwrap();

        let user = schema.get_object_type("default::User").unwrap();
        assert!(user.get_property("name").unwrap().required);
        assert_eq!(
            user.get_property("email").unwrap().constraints,
            vec![ConstraintDef::Exclusive]
        );
        let posts = user.get_link("posts").unwrap();
        assert_eq!(posts.target, "default::Post");
        assert_eq!(posts.cardinality, Cardinality::Multi);
        assert_eq!(posts.on_target_delete, OnTargetDelete::Allow);
        assert_eq!(user.indexes, vec![IndexDef::new("name")]);
    }

    #[test]
    fn test_lower_scalar_type() {
        let schema = lower_source(
            r#"
            module default {
                scalar type post_status extending str {
                    constraint one_of('draft', 'published');
                }
                type Post {
                    required property status -> post_status;
                }
            }
            "#,
        )
        .unwrap();

        let status = schema.get_scalar_type("default::post_status").unwrap();
        assert_eq!(
            status.constraints,
            vec![ConstraintDef::OneOf(vec![
                "draft".into(),
                "published".into()
            ])]
        );

        let post = schema.get_object_type("default::Post").unwrap();
        assert_eq!(
            post.get_property("status").unwrap().target,
            ScalarRef::custom("default::post_status")
        );
    }

    #[test]
    fn test_lower_cross_module_reference() {
        let schema = lower_source(
            r#"
            module auth {
                type Identity {
                    required property subject -> str;
                }
            }
            module default {
                type User {
                    link identity -> auth::Identity;
                }
            }
            "#,
        )
        .unwrap();

        let user = schema.get_object_type("default::User").unwrap();
        assert_eq!(user.get_link("identity").unwrap().target, "auth::Identity");
    }

    #[test]
    fn test_lower_extending() {
        let schema = lower_source(
            r#"
            module default {
                abstract type Auditable {
                    required property created_at -> datetime;
                }
                type User extending Auditable {
                    required property name -> str;
                }
            }
            "#,
        )
        .unwrap();

        let user = schema.get_object_type("default::User").unwrap();
        assert_eq!(user.extends, vec!["default::Auditable"]);
        let names: Vec<_> = schema
            .effective_properties("default::User")
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["created_at", "name"]);
    }

    #[test]
    fn test_error_unknown_link_target() {
        let err = lower_source(
            r#"
            module default {
                type User {
                    link posts -> Post;
                }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::UnknownType);
        assert!(err.message.contains("Post"));
    }

    #[test]
    fn test_error_link_to_scalar() {
        let err = lower_source(
            r#"
            module default {
                scalar type status extending str;
                type User {
                    link current -> status;
                }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::InvalidTarget);
    }

    #[test]
    fn test_error_property_to_object() {
        let err = lower_source(
            r#"
            module default {
                type Post;
                type User {
                    property post -> Post;
                }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::InvalidTarget);
    }

    #[test]
    fn test_error_duplicate_type() {
        let err = lower_source("module default { type User; type User; }").unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::DuplicateType);
    }

    #[test]
    fn test_error_duplicate_member() {
        let err = lower_source(
            r#"
            module default {
                type User {
                    property name -> str;
                    property name -> str;
                }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::DuplicateMember);
    }

    #[test]
    fn test_error_unknown_constraint() {
        let err = lower_source(
            r#"
            module default {
                type User {
                    property name -> str {
                        constraint unique;
                    }
                }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::UnknownConstraint);
    }

    #[test]
    fn test_error_one_of_bad_args() {
        let err = lower_source(
            r#"
            module default {
                scalar type status extending str {
                    constraint one_of(1, 2);
                }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind, LowerErrorKind::InvalidConstraintArgs);
    }

    #[test]
    fn test_lower_multiple_documents() {
        let doc1 = parse_schema("module default { type User { link post -> Post; } }").unwrap();
        let doc2 = parse_schema("module default { type Post; }").unwrap();
        let schema = lower(&[doc1, doc2]).unwrap();
        assert_eq!(schema.object_types.len(), 2);
    }

    #[test]
    fn test_parse_string_list() {
        assert_eq!(
            parse_string_list("'a', \"b\""),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(parse_string_list("1, 2"), None);
        assert_eq!(parse_string_list(""), None);
    }
}
