//! Recursive descent parser for SDL documents.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Parser for SDL source files.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    /// Parse a complete document: a sequence of module blocks.
    pub fn parse_document(&mut self) -> Result<SchemaDocument, ParseError> {
        let mut modules = Vec::new();

        while self.peek()?.is_some() {
            modules.push(self.parse_module()?);
        }

        Ok(SchemaDocument { modules })
    }

    fn parse_module(&mut self) -> Result<ModuleDecl, ParseError> {
        let start = self.expect(Token::Module)?.span;
        let name = self.expect_name()?;
        self.expect(Token::LBrace)?;

        let mut declarations = Vec::new();
        let end = loop {
            match self.peek_required("inside module block")? {
                SpannedToken {
                    token: Token::RBrace,
                    ..
                } => break self.advance()?.span,
                SpannedToken {
                    token: Token::Semicolon,
                    ..
                } => {
                    // Stray semicolons between declarations are tolerated.
                    self.advance()?;
                }
                _ => declarations.push(self.parse_declaration()?),
            }
        };

        Ok(ModuleDecl {
            name,
            declarations,
            span: start.merge(end),
        })
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let tok = self.peek_required("expected a type declaration")?;
        match tok.token {
            Token::Abstract => {
                let start = self.advance()?.span;
                self.expect(Token::Type)?;
                Ok(Declaration::Object(self.parse_object_type(start, true)?))
            }
            Token::Type => {
                let start = self.advance()?.span;
                Ok(Declaration::Object(self.parse_object_type(start, false)?))
            }
            Token::Scalar => {
                let start = self.advance()?.span;
                self.expect(Token::Type)?;
                Ok(Declaration::Scalar(self.parse_scalar_type(start)?))
            }
            _ => Err(ParseError::new(
                format!("expected 'type' or 'scalar type', found {:?}", tok.token),
                tok.span,
            )),
        }
    }

    fn parse_object_type(
        &mut self,
        start: Span,
        is_abstract: bool,
    ) -> Result<ObjectTypeDecl, ParseError> {
        let name = self.expect_name()?;

        let mut extends = Vec::new();
        if self.eat(Token::Extending)? {
            loop {
                extends.push(self.parse_qualified_name()?);
                if !self.eat(Token::Comma)? {
                    break;
                }
            }
        }

        let mut items = Vec::new();
        let end = if self.eat(Token::LBrace)? {
            loop {
                match self.peek_required("inside type body")? {
                    SpannedToken {
                        token: Token::RBrace,
                        ..
                    } => break self.advance()?.span,
                    SpannedToken {
                        token: Token::Semicolon,
                        ..
                    } => {
                        self.advance()?;
                    }
                    _ => items.push(self.parse_type_item()?),
                }
            }
        } else {
            // `type Base;` is a body-less declaration.
            self.expect(Token::Semicolon)?.span
        };

        Ok(ObjectTypeDecl {
            name,
            is_abstract,
            extends,
            items,
            span: start.merge(end),
        })
    }

    fn parse_scalar_type(&mut self, start: Span) -> Result<ScalarTypeDecl, ParseError> {
        let name = self.expect_name()?;
        self.expect(Token::Extending)?;
        let base = self.parse_qualified_name()?;

        let mut constraints = Vec::new();
        let end = if self.eat(Token::LBrace)? {
            loop {
                match self.peek_required("inside scalar type body")? {
                    SpannedToken {
                        token: Token::RBrace,
                        ..
                    } => break self.advance()?.span,
                    SpannedToken {
                        token: Token::Semicolon,
                        ..
                    } => {
                        self.advance()?;
                    }
                    SpannedToken {
                        token: Token::Constraint,
                        ..
                    } => constraints.push(self.parse_constraint()?),
                    tok => {
                        return Err(ParseError::new(
                            format!(
                                "expected 'constraint' in scalar type body, found {:?}",
                                tok.token
                            ),
                            tok.span,
                        ))
                    }
                }
            }
        } else {
            self.expect(Token::Semicolon)?.span
        };

        Ok(ScalarTypeDecl {
            name,
            base,
            constraints,
            span: start.merge(end),
        })
    }

    fn parse_type_item(&mut self) -> Result<TypeItem, ParseError> {
        let tok = self.peek_required("expected a type member")?;
        let start = tok.span;

        match tok.token {
            Token::Constraint => Ok(TypeItem::Constraint(self.parse_constraint()?)),
            Token::Index => Ok(TypeItem::Index(self.parse_index()?)),
            _ => {
                // Qualifier prefix: [required|optional] [multi|single]
                let mut required = None;
                let mut cardinality = None;

                loop {
                    let tok = self.peek_required("expected 'property' or 'link'")?;
                    match tok.token {
                        Token::Required if required.is_none() => {
                            self.advance()?;
                            required = Some(true);
                        }
                        Token::Optional if required.is_none() => {
                            self.advance()?;
                            required = Some(false);
                        }
                        Token::Multi if cardinality.is_none() => {
                            self.advance()?;
                            cardinality = Some(CardinalityKw::Multi);
                        }
                        Token::Single if cardinality.is_none() => {
                            self.advance()?;
                            cardinality = Some(CardinalityKw::Single);
                        }
                        _ => break,
                    }
                }

                let tok = self.advance()?;
                match tok.token {
                    Token::Property => Ok(TypeItem::Property(self.parse_property(
                        start,
                        required,
                        cardinality,
                    )?)),
                    Token::Link => {
                        Ok(TypeItem::Link(self.parse_link(start, required, cardinality)?))
                    }
                    _ => Err(ParseError::new(
                        format!("expected 'property' or 'link', found {:?}", tok.token),
                        tok.span,
                    )
                    .with_hint("type members are properties, links, constraints or indexes")),
                }
            }
        }
    }

    fn parse_property(
        &mut self,
        start: Span,
        required: Option<bool>,
        cardinality: Option<CardinalityKw>,
    ) -> Result<PropertyDecl, ParseError> {
        let name = self.expect_name()?;
        self.expect(Token::Arrow)?;
        let target = self.parse_qualified_name()?;

        let mut default = None;
        let mut constraints = Vec::new();
        let end = self.parse_pointer_body(&mut constraints, &mut default, None)?;

        Ok(PropertyDecl {
            name,
            required,
            cardinality,
            target,
            default,
            constraints,
            span: start.merge(end),
        })
    }

    fn parse_link(
        &mut self,
        start: Span,
        required: Option<bool>,
        cardinality: Option<CardinalityKw>,
    ) -> Result<LinkDecl, ParseError> {
        let name = self.expect_name()?;
        self.expect(Token::Arrow)?;
        let target = self.parse_qualified_name()?;

        let mut default = None;
        let mut constraints = Vec::new();
        let mut on_target_delete = None;
        let end =
            self.parse_pointer_body(&mut constraints, &mut default, Some(&mut on_target_delete))?;

        if let Some(dflt) = &default {
            return Err(ParseError::new(
                "links cannot declare a default expression",
                dflt.span,
            ));
        }

        Ok(LinkDecl {
            name,
            required,
            cardinality,
            target,
            on_target_delete,
            constraints,
            span: start.merge(end),
        })
    }

    /// Parse the optional `{ ... }` body shared by properties and links.
    ///
    /// `on_target_delete` is `Some` only for links; the `on target delete`
    /// clause is rejected for properties.
    fn parse_pointer_body(
        &mut self,
        constraints: &mut Vec<ConstraintDecl>,
        default: &mut Option<Spanned<String>>,
        mut on_target_delete: Option<&mut Option<OnTargetDeleteKw>>,
    ) -> Result<Span, ParseError> {
        if !self.eat(Token::LBrace)? {
            return Ok(self.expect(Token::Semicolon)?.span);
        }

        loop {
            let tok = self.peek_required("inside property/link body")?;
            match &tok.token {
                Token::RBrace => return Ok(self.advance()?.span),
                Token::Semicolon => {
                    self.advance()?;
                }
                Token::Constraint => constraints.push(self.parse_constraint()?),
                Token::Ident(name) if name == "default" => {
                    let start = self.advance()?.span;
                    self.expect(Token::Assign)?;
                    let expr = self.parse_expression_text()?;
                    if default.is_some() {
                        return Err(ParseError::new(
                            "duplicate 'default' declaration",
                            start,
                        ));
                    }
                    *default = Some(expr);
                }
                Token::On => {
                    let span = tok.span;
                    match on_target_delete.as_deref_mut() {
                        Some(slot) => *slot = Some(self.parse_on_target_delete()?),
                        None => {
                            return Err(ParseError::new(
                                "'on target delete' is only valid on links",
                                span,
                            ))
                        }
                    }
                }
                other => {
                    return Err(ParseError::new(
                        format!("unexpected {:?} in property/link body", other),
                        tok.span,
                    ))
                }
            }
        }
    }

    fn parse_on_target_delete(&mut self) -> Result<OnTargetDeleteKw, ParseError> {
        self.expect(Token::On)?;
        self.expect_keyword("target")?;
        self.expect_keyword("delete")?;

        let tok = self.advance()?;
        let word = tok.as_name().unwrap_or_default();
        match word.as_str() {
            "restrict" => Ok(OnTargetDeleteKw::Restrict),
            "allow" => Ok(OnTargetDeleteKw::Allow),
            "delete" => {
                self.expect_keyword("source")?;
                Ok(OnTargetDeleteKw::DeleteSource)
            }
            _ => Err(ParseError::new(
                format!("unknown delete policy '{}'", word),
                tok.span,
            )
            .with_hint("expected 'restrict', 'allow' or 'delete source'")),
        }
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self.expect(Token::Constraint)?.span;
        let name = self.parse_qualified_name()?;

        let mut args = None;
        let mut end = name.span;
        if let Some(Ok(tok)) = self.lexer.peek() {
            if tok.token == Token::LParen {
                self.advance()?;
                let (text, close) = self.capture_until_balanced_rparen()?;
                args = Some(text);
                end = close;
            }
        }

        Ok(ConstraintDecl {
            name,
            args,
            span: start.merge(end),
        })
    }

    fn parse_index(&mut self) -> Result<IndexDecl, ParseError> {
        let start = self.expect(Token::Index)?.span;
        self.expect(Token::On)?;
        self.expect(Token::LParen)?;
        let (expr, close) = self.capture_until_balanced_rparen()?;

        Ok(IndexDecl {
            expr,
            span: start.merge(close),
        })
    }

    /// Capture expression text up to a `;` or `}` at nesting depth zero.
    ///
    /// The expression is returned as the verbatim source slice so default
    /// expressions survive round-trips exactly as written.
    fn parse_expression_text(&mut self) -> Result<Spanned<String>, ParseError> {
        let mut depth = 0usize;
        let mut span: Option<Span> = None;

        loop {
            let tok = self.peek_required("in expression")?;
            match tok.token {
                Token::Semicolon if depth == 0 => break,
                Token::RBrace if depth == 0 => break,
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            let tok = self.advance()?;
            span = Some(match span {
                Some(s) => s.merge(tok.span),
                None => tok.span,
            });
        }

        match span {
            Some(span) => Ok(Spanned::new(span.slice(self.source).to_string(), span)),
            None => {
                let tok = self.peek_required("in expression")?;
                Err(ParseError::new("expected an expression", tok.span))
            }
        }
    }

    /// Capture verbatim text until the `)` matching an already-consumed `(`.
    fn capture_until_balanced_rparen(&mut self) -> Result<(String, Span), ParseError> {
        let mut depth = 0usize;
        let mut span: Option<Span> = None;

        loop {
            let tok = self.advance()?;
            match tok.token {
                Token::RParen if depth == 0 => {
                    let text = span
                        .map(|s| s.slice(self.source).to_string())
                        .unwrap_or_default();
                    return Ok((text, tok.span));
                }
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            span = Some(match span {
                Some(s) => s.merge(tok.span),
                None => tok.span,
            });
        }
    }

    /// Parse a possibly `::`-qualified name into a single dotted string.
    fn parse_qualified_name(&mut self) -> Result<Spanned<String>, ParseError> {
        let first = self.expect_name()?;
        let mut name = first.value;
        let mut span = first.span;

        while let Some(Ok(tok)) = self.lexer.peek() {
            if tok.token != Token::PathSep {
                break;
            }
            self.advance()?;
            let part = self.expect_name()?;
            name.push_str("::");
            name.push_str(&part.value);
            span = span.merge(part.span);
        }

        Ok(Spanned::new(name, span))
    }

    fn expect_name(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.advance()?;
        match tok.as_name() {
            Some(name) => Ok(Spanned::new(name, tok.span)),
            None => Err(ParseError::new(
                format!("expected an identifier, found {:?}", tok.token),
                tok.span,
            )),
        }
    }

    /// Expect a soft keyword that lexes as an identifier.
    fn expect_keyword(&mut self, word: &str) -> Result<Span, ParseError> {
        let tok = self.advance()?;
        match tok.as_name() {
            Some(name) if name == word => Ok(tok.span),
            _ => Err(ParseError::new(
                format!("expected '{}', found {:?}", word, tok.token),
                tok.span,
            )),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.advance()?;
        if tok.token == expected {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {:?}, found {:?}", expected, tok.token),
                tok.span,
            ))
        }
    }

    /// Consume the next token if it matches.
    fn eat(&mut self, expected: Token) -> Result<bool, ParseError> {
        if let Some(tok) = self.peek()? {
            if tok.token == expected {
                self.advance()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn advance(&mut self) -> Result<SpannedToken, ParseError> {
        match self.lexer.next_token() {
            Some(Ok(tok)) => Ok(tok),
            Some(Err(span)) => Err(ParseError::new(
                format!("unexpected character '{}'", span.slice(self.source)),
                span,
            )),
            None => Err(ParseError::new(
                "unexpected end of input",
                self.lexer.eof_span(),
            )),
        }
    }

    fn peek(&mut self) -> Result<Option<&SpannedToken>, ParseError> {
        match self.lexer.peek() {
            Some(Ok(_)) => {
                // Re-borrow to satisfy the borrow checker.
                if let Some(Ok(tok)) = self.lexer.peek() {
                    Ok(Some(tok))
                } else {
                    unreachable!()
                }
            }
            Some(Err(span)) => {
                let span = *span;
                Err(ParseError::new(
                    format!("unexpected character '{}'", span.slice(self.source)),
                    span,
                ))
            }
            None => Ok(None),
        }
    }

    fn peek_required(&mut self, context: &str) -> Result<SpannedToken, ParseError> {
        let eof = self.lexer.eof_span();
        match self.peek()? {
            Some(tok) => Ok(tok.clone()),
            None => Err(ParseError::new(
                format!("unexpected end of input {}", context),
                eof,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> SchemaDocument {
        Parser::new(source)
            .parse_document()
            .unwrap_or_else(|e| panic!("{}", e.format_with_source(source)))
    }

    fn parse_err(source: &str) -> ParseError {
        Parser::new(source)
            .parse_document()
            .expect_err("expected parse failure")
    }

    #[test]
    fn test_empty_module() {
        let doc = parse("module default { }");
        assert_eq!(doc.modules.len(), 1);
        assert_eq!(doc.modules[0].name.value, "default");
        assert!(doc.modules[0].declarations.is_empty());
    }

    #[test]
    fn test_bodyless_type() {
        let doc = parse("module default { type Base; }");
        let decl = &doc.modules[0].declarations[0];
        assert_eq!(decl.name(), "Base");
    }

    #[test]
    fn test_type_with_properties() {
        let doc = parse(
            r#"
            module default {
                type User {
                    required property name -> str;
                    property email -> str;
                }
            }
            "#,
        );

        let Declaration::Object(user) = &doc.modules[0].declarations[0] else {
            panic!("expected object type");
        };
        assert_eq!(user.name.value, "User");
        assert_eq!(user.items.len(), 2);

        let TypeItem::Property(name) = &user.items[0] else {
            panic!("expected property");
        };
        assert_eq!(name.name.value, "name");
        assert_eq!(name.required, Some(true));
        assert_eq!(name.target.value, "str");

        let TypeItem::Property(email) = &user.items[1] else {
            panic!("expected property");
        };
        assert_eq!(email.required, None);
    }

    #[test]
    fn test_abstract_type_with_extending() {
        let doc = parse(
            r#"
            module default {
                abstract type Auditable { }
                type User extending Auditable, HasName { }
            }
            "#,
        );

        let Declaration::Object(auditable) = &doc.modules[0].declarations[0] else {
            panic!("expected object type");
        };
        assert!(auditable.is_abstract);

        let Declaration::Object(user) = &doc.modules[0].declarations[1] else {
            panic!("expected object type");
        };
        assert_eq!(
            user.extends.iter().map(|e| e.value.as_str()).collect::<Vec<_>>(),
            vec!["Auditable", "HasName"]
        );
    }

    #[test]
    fn test_property_with_default_and_constraint() {
        let doc = parse(
            r#"
            module default {
                type User {
                    required property created_at -> datetime {
                        default := datetime_current();
                    }
                    property email -> str {
                        constraint exclusive;
                    }
                }
            }
            "#,
        );

        let Declaration::Object(user) = &doc.modules[0].declarations[0] else {
            panic!("expected object type");
        };

        let TypeItem::Property(created) = &user.items[0] else {
            panic!("expected property");
        };
        assert_eq!(
            created.default.as_ref().map(|d| d.value.as_str()),
            Some("datetime_current()")
        );

        let TypeItem::Property(email) = &user.items[1] else {
            panic!("expected property");
        };
        assert_eq!(email.constraints.len(), 1);
        assert_eq!(email.constraints[0].name.value, "exclusive");
    }

    #[test]
    fn test_link_with_delete_policy() {
        let doc = parse(
            r#"
            module default {
                type User {
                    multi link posts -> Post {
                        on target delete allow;
                    }
                    link best_post -> default::Post {
                        on target delete delete source;
                    }
                }
            }
            "#,
        );

        let Declaration::Object(user) = &doc.modules[0].declarations[0] else {
            panic!("expected object type");
        };

        let TypeItem::Link(posts) = &user.items[0] else {
            panic!("expected link");
        };
        assert_eq!(posts.cardinality, Some(CardinalityKw::Multi));
        assert_eq!(posts.on_target_delete, Some(OnTargetDeleteKw::Allow));

        let TypeItem::Link(best) = &user.items[1] else {
            panic!("expected link");
        };
        assert_eq!(best.target.value, "default::Post");
        assert_eq!(best.on_target_delete, Some(OnTargetDeleteKw::DeleteSource));
    }

    #[test]
    fn test_constraint_with_args() {
        let doc = parse(
            r#"
            module default {
                scalar type post_status extending str {
                    constraint one_of('draft', 'published');
                }
            }
            "#,
        );

        let Declaration::Scalar(status) = &doc.modules[0].declarations[0] else {
            panic!("expected scalar type");
        };
        assert_eq!(status.base.value, "str");
        assert_eq!(status.constraints.len(), 1);
        assert_eq!(
            status.constraints[0].args.as_deref(),
            Some("'draft', 'published'")
        );
    }

    #[test]
    fn test_index_declaration() {
        let doc = parse(
            r#"
            module default {
                type User {
                    property name -> str;
                    index on (name);
                }
            }
            "#,
        );

        let Declaration::Object(user) = &doc.modules[0].declarations[0] else {
            panic!("expected object type");
        };
        let TypeItem::Index(index) = &user.items[1] else {
            panic!("expected index");
        };
        assert_eq!(index.expr, "name");
    }

    #[test]
    fn test_nested_parens_in_default() {
        let doc = parse(
            r#"
            module default {
                type Event {
                    property slot -> int64 {
                        default := max(len(title), 1);
                    }
                }
            }
            "#,
        );

        let Declaration::Object(event) = &doc.modules[0].declarations[0] else {
            panic!("expected object type");
        };
        let TypeItem::Property(slot) = &event.items[0] else {
            panic!("expected property");
        };
        assert_eq!(
            slot.default.as_ref().map(|d| d.value.as_str()),
            Some("max(len(title), 1)")
        );
    }

    #[test]
    fn test_multiple_modules() {
        let doc = parse("module default { } module auth { type Identity; }");
        assert_eq!(doc.modules.len(), 2);
        assert_eq!(doc.modules[1].name.value, "auth");
        assert_eq!(doc.modules[1].declarations.len(), 1);
    }

    #[test]
    fn test_error_on_property_default_for_link() {
        let err = parse_err(
            r#"
            module default {
                type User {
                    link friend -> User {
                        default := foo;
                    }
                }
            }
            "#,
        );
        assert!(err.message.contains("links cannot declare a default"));
    }

    #[test]
    fn test_error_unterminated_body() {
        let err = parse_err("module default { type User {");
        assert!(err.message.contains("unexpected end of input"));
    }

    #[test]
    fn test_error_on_target_delete_on_property() {
        let err = parse_err(
            r#"
            module default {
                type User {
                    property name -> str {
                        on target delete allow;
                    }
                }
            }
            "#,
        );
        assert!(err.message.contains("only valid on links"));
    }

    #[test]
    fn test_error_has_span() {
        let source = "module default { type 42 }";
        let err = parse_err(source);
        assert!(err.span.start > 0);
        let rendered = err.format_with_source(source);
        assert!(rendered.contains("line 1"));
    }
}
