//! AST for parsed SDL documents.
//!
//! The AST is purely syntactic: names are unresolved, expressions are kept
//! as verbatim source text, and every declaration carries its span. Name
//! resolution and validation happen during lowering into the catalog.

use crate::span::{Span, Spanned};

/// A parsed SDL document (one source file).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDocument {
    /// Module blocks in declaration order.
    pub modules: Vec<ModuleDecl>,
}

/// A `module <name> { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    /// Module name.
    pub name: Spanned<String>,
    /// Declarations inside the block.
    pub declarations: Vec<Declaration>,
    /// Span of the whole block.
    pub span: Span,
}

/// A top-level declaration inside a module.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// An object type declaration.
    Object(ObjectTypeDecl),
    /// A scalar type declaration.
    Scalar(ScalarTypeDecl),
}

impl Declaration {
    /// Name of the declared type.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Object(o) => &o.name.value,
            Declaration::Scalar(s) => &s.name.value,
        }
    }

    /// Span of the declaration.
    pub fn span(&self) -> Span {
        match self {
            Declaration::Object(o) => o.span,
            Declaration::Scalar(s) => s.span,
        }
    }
}

/// An object type: `[abstract] type Name [extending A, B] { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeDecl {
    /// Type name.
    pub name: Spanned<String>,
    /// Whether the type is abstract.
    pub is_abstract: bool,
    /// Parent types (possibly qualified).
    pub extends: Vec<Spanned<String>>,
    /// Members of the type body.
    pub items: Vec<TypeItem>,
    /// Span of the whole declaration.
    pub span: Span,
}

/// A scalar type: `scalar type name extending base { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTypeDecl {
    /// Scalar name.
    pub name: Spanned<String>,
    /// Base scalar (possibly qualified).
    pub base: Spanned<String>,
    /// Constraints on the scalar.
    pub constraints: Vec<ConstraintDecl>,
    /// Span of the whole declaration.
    pub span: Span,
}

/// A member of an object type body.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeItem {
    /// A property declaration.
    Property(PropertyDecl),
    /// A link declaration.
    Link(LinkDecl),
    /// A type-level constraint.
    Constraint(ConstraintDecl),
    /// An index declaration.
    Index(IndexDecl),
}

/// Explicit cardinality qualifier on a property or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityKw {
    /// `single`
    Single,
    /// `multi`
    Multi,
}

/// A property: `[required|optional] [multi|single] property name -> target`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    /// Property name.
    pub name: Spanned<String>,
    /// Explicit required/optional qualifier, if any.
    pub required: Option<bool>,
    /// Explicit cardinality qualifier, if any.
    pub cardinality: Option<CardinalityKw>,
    /// Target type reference (scalar).
    pub target: Spanned<String>,
    /// Default expression, verbatim source text.
    pub default: Option<Spanned<String>>,
    /// Constraints declared in the body.
    pub constraints: Vec<ConstraintDecl>,
    /// Span of the whole declaration.
    pub span: Span,
}

/// Referential action when a link target is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnTargetDeleteKw {
    /// `on target delete restrict`
    Restrict,
    /// `on target delete allow`
    Allow,
    /// `on target delete delete source`
    DeleteSource,
}

/// A link: `[required|optional] [multi|single] link name -> Target`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDecl {
    /// Link name.
    pub name: Spanned<String>,
    /// Explicit required/optional qualifier, if any.
    pub required: Option<bool>,
    /// Explicit cardinality qualifier, if any.
    pub cardinality: Option<CardinalityKw>,
    /// Target type reference (object type, possibly qualified).
    pub target: Spanned<String>,
    /// `on target delete` policy, if declared.
    pub on_target_delete: Option<OnTargetDeleteKw>,
    /// Constraints declared in the body.
    pub constraints: Vec<ConstraintDecl>,
    /// Span of the whole declaration.
    pub span: Span,
}

/// A constraint: `constraint name[(args)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    /// Constraint name (possibly qualified).
    pub name: Spanned<String>,
    /// Argument list, verbatim source text without the parens.
    pub args: Option<String>,
    /// Span of the whole declaration.
    pub span: Span,
}

/// An index: `index on (expr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDecl {
    /// Indexed expression, verbatim source text without the parens.
    pub expr: String,
    /// Span of the whole declaration.
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_name() {
        let decl = Declaration::Object(ObjectTypeDecl {
            name: Spanned::new("User".to_string(), Span::new(5, 9)),
            is_abstract: false,
            extends: vec![],
            items: vec![],
            span: Span::new(0, 12),
        });
        assert_eq!(decl.name(), "User");
        assert_eq!(decl.span(), Span::new(0, 12));
    }
}
