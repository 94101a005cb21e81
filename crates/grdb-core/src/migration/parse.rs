//! Parser for the DDL dialect written into migration files.
//!
//! This reads back exactly the text [`DdlStatement::render`] produces, on
//! top of the SDL lexer: DDL keywords are uppercase, so they arrive as
//! plain identifiers and never collide with SDL's lowercase keywords.

use crate::catalog::{
    BuiltinScalar, Cardinality, ConstraintDef, IndexDef, LinkDef, ObjectTypeDef, OnTargetDelete,
    PropertyDef, ScalarRef, ScalarTypeDef,
};
use crate::migration::ddl::{
    AlterTypeOp, DdlStatement, LinkAlter, PropertyAlter, ScalarAlter,
};
use grdb_sdl::lexer::{Lexer, SpannedToken, Token};

/// Parse a sequence of DDL statements. Errors are plain messages; callers
/// attach file context.
pub fn parse_statements(text: &str) -> Result<Vec<DdlStatement>, String> {
    let mut parser = DdlParser::new(text);
    let mut statements = Vec::new();
    while parser.peek_some() {
        statements.push(parser.parse_statement()?);
    }
    Ok(statements)
}

struct DdlParser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> DdlParser<'source> {
    fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    fn peek_some(&mut self) -> bool {
        self.lexer.peek().is_some()
    }

    fn next(&mut self) -> Result<SpannedToken, String> {
        match self.lexer.next_token() {
            Some(Ok(tok)) => Ok(tok),
            Some(Err(span)) => Err(format!(
                "unexpected character {:?}",
                span.slice(self.source)
            )),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        match self.lexer.peek() {
            Some(Ok(tok)) => Some(&tok.token),
            _ => None,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        let tok = self.next()?;
        if tok.token == expected {
            Ok(())
        } else {
            Err(format!("expected {expected:?}, found {:?}", tok.token))
        }
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            let _ = self.next();
            true
        } else {
            false
        }
    }

    /// Consume an uppercase DDL keyword, which lexes as an identifier.
    fn expect_word(&mut self, word: &str) -> Result<(), String> {
        let tok = self.next()?;
        match &tok.token {
            Token::Ident(s) if s == word => Ok(()),
            other => Err(format!("expected {word}, found {other:?}")),
        }
    }

    fn peek_word(&mut self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek_word(word) {
            let _ = self.next();
            true
        } else {
            false
        }
    }

    /// A member name: identifier or one of the soft keywords.
    fn expect_name(&mut self) -> Result<String, String> {
        let tok = self.next()?;
        tok.as_name()
            .ok_or_else(|| format!("expected a name, found {:?}", tok.token))
    }

    /// A possibly qualified name, e.g. `default::User`.
    fn expect_qualified_name(&mut self) -> Result<String, String> {
        let mut name = self.expect_name()?;
        while self.eat(&Token::PathSep) {
            name.push_str("::");
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }

    fn expect_scalar_ref(&mut self) -> Result<ScalarRef, String> {
        let name = self.expect_qualified_name()?;
        Ok(match BuiltinScalar::from_name(&name) {
            Some(builtin) => ScalarRef::Builtin(builtin),
            None => ScalarRef::Custom(name),
        })
    }

    /// `( expr )` with the expression captured verbatim from the source.
    fn capture_parens(&mut self) -> Result<String, String> {
        self.expect(Token::LParen)?;
        let start = match self.lexer.peek() {
            Some(Ok(tok)) => tok.span.start,
            Some(Err(span)) => span.start,
            None => return Err("unterminated expression".to_string()),
        };
        let mut depth = 0usize;
        loop {
            match self.lexer.next_token() {
                Some(Ok(tok)) => match tok.token {
                    Token::LParen => depth += 1,
                    Token::RParen => {
                        if depth == 0 {
                            return Ok(self.source[start..tok.span.start].trim().to_string());
                        }
                        depth -= 1;
                    }
                    _ => {}
                },
                // Raw capture: characters the lexer rejects are still part
                // of the expression text.
                Some(Err(_)) => {}
                None => return Err("unterminated expression".to_string()),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<DdlStatement, String> {
        let tok = self.next()?;
        let word = match &tok.token {
            Token::Ident(s) => s.clone(),
            other => return Err(format!("expected a statement, found {other:?}")),
        };
        match word.as_str() {
            "CREATE" => self.parse_create(),
            "ALTER" => self.parse_alter(),
            "DROP" => self.parse_drop(),
            other => Err(format!("unknown statement {other}")),
        }
    }

    fn parse_drop(&mut self) -> Result<DdlStatement, String> {
        if self.eat_word("SCALAR") {
            self.expect_word("TYPE")?;
            let name = self.expect_qualified_name()?;
            self.expect(Token::Semicolon)?;
            return Ok(DdlStatement::DropScalarType { name });
        }
        self.expect_word("TYPE")?;
        let name = self.expect_qualified_name()?;
        self.expect(Token::Semicolon)?;
        Ok(DdlStatement::DropType { name })
    }

    fn parse_create(&mut self) -> Result<DdlStatement, String> {
        if self.eat_word("SCALAR") {
            self.expect_word("TYPE")?;
            let name = self.expect_qualified_name()?;
            self.expect_word("EXTENDING")?;
            let base = self.expect_scalar_ref()?;
            let mut def = ScalarTypeDef::new(name, base);
            if self.eat(&Token::LBrace) {
                while !self.eat(&Token::RBrace) {
                    self.expect_word("CREATE")?;
                    self.expect_word("CONSTRAINT")?;
                    def.constraints.push(self.parse_constraint()?);
                    self.expect(Token::Semicolon)?;
                }
            }
            self.expect(Token::Semicolon)?;
            return Ok(DdlStatement::CreateScalarType(def));
        }

        let is_abstract = self.eat_word("ABSTRACT");
        self.expect_word("TYPE")?;
        let name = self.expect_qualified_name()?;
        let mut def = ObjectTypeDef::new(name);
        def.is_abstract = is_abstract;
        if self.eat_word("EXTENDING") {
            def.extends.push(self.expect_qualified_name()?);
            while self.eat(&Token::Comma) {
                def.extends.push(self.expect_qualified_name()?);
            }
        }
        if self.eat(&Token::LBrace) {
            while !self.eat(&Token::RBrace) {
                self.expect_word("CREATE")?;
                match self.parse_member_create()? {
                    AlterTypeOp::AddProperty(p) => def.properties.push(p),
                    AlterTypeOp::AddLink(l) => def.links.push(l),
                    AlterTypeOp::AddConstraint(c) => def.constraints.push(c),
                    AlterTypeOp::AddIndex(i) => def.indexes.push(i),
                    _ => unreachable!(),
                }
            }
        }
        self.expect(Token::Semicolon)?;
        Ok(DdlStatement::CreateType(def))
    }

    /// A `CREATE ...` member inside a type body or `ALTER TYPE` block, with
    /// the leading `CREATE` already consumed.
    fn parse_member_create(&mut self) -> Result<AlterTypeOp, String> {
        let required = self.eat_word("REQUIRED");
        let multi = self.eat_word("MULTI");

        if self.eat_word("PROPERTY") {
            let name = self.expect_name()?;
            self.expect(Token::Arrow)?;
            let target = self.expect_scalar_ref()?;
            let mut prop = PropertyDef::new(name, target);
            prop.required = required;
            if multi {
                prop.cardinality = Cardinality::Multi;
            }
            if self.eat(&Token::LBrace) {
                while !self.eat(&Token::RBrace) {
                    if self.eat_word("SET") {
                        self.expect_word("default")?;
                        self.expect(Token::Assign)?;
                        prop.default = Some(self.capture_parens()?);
                    } else {
                        self.expect_word("CREATE")?;
                        self.expect_word("CONSTRAINT")?;
                        prop.constraints.push(self.parse_constraint()?);
                    }
                    self.expect(Token::Semicolon)?;
                }
            }
            self.expect(Token::Semicolon)?;
            return Ok(AlterTypeOp::AddProperty(prop));
        }

        if self.eat_word("LINK") {
            let name = self.expect_name()?;
            self.expect(Token::Arrow)?;
            let target = self.expect_qualified_name()?;
            let mut link = LinkDef::new(name, target);
            link.required = required;
            if multi {
                link.cardinality = Cardinality::Multi;
            }
            if self.eat(&Token::LBrace) {
                while !self.eat(&Token::RBrace) {
                    if self.eat_word("ON") {
                        self.expect_word("TARGET")?;
                        self.expect_word("DELETE")?;
                        link.on_target_delete = self.parse_policy()?;
                    } else {
                        self.expect_word("CREATE")?;
                        self.expect_word("CONSTRAINT")?;
                        link.constraints.push(self.parse_constraint()?);
                    }
                    self.expect(Token::Semicolon)?;
                }
            }
            self.expect(Token::Semicolon)?;
            return Ok(AlterTypeOp::AddLink(link));
        }

        if required || multi {
            return Err("REQUIRED and MULTI apply only to properties and links".to_string());
        }

        if self.eat_word("CONSTRAINT") {
            let constraint = self.parse_constraint()?;
            self.expect(Token::Semicolon)?;
            return Ok(AlterTypeOp::AddConstraint(constraint));
        }
        if self.eat_word("INDEX") {
            self.expect_word("ON")?;
            let expr = self.capture_parens()?;
            self.expect(Token::Semicolon)?;
            return Ok(AlterTypeOp::AddIndex(IndexDef::new(expr)));
        }
        Err(format!("unexpected token after CREATE: {:?}", self.peek()))
    }

    fn parse_alter(&mut self) -> Result<DdlStatement, String> {
        if self.eat_word("SCALAR") {
            self.expect_word("TYPE")?;
            let name = self.expect_qualified_name()?;
            self.expect(Token::LBrace)?;
            let mut ops = Vec::new();
            while !self.eat(&Token::RBrace) {
                if self.eat_word("CREATE") {
                    self.expect_word("CONSTRAINT")?;
                    ops.push(ScalarAlter::AddConstraint(self.parse_constraint()?));
                } else if self.eat_word("DROP") {
                    self.expect_word("CONSTRAINT")?;
                    ops.push(ScalarAlter::DropConstraint(self.parse_constraint()?));
                } else {
                    self.expect_word("SET")?;
                    self.expect_word("EXTENDING")?;
                    ops.push(ScalarAlter::SetBase(self.expect_scalar_ref()?));
                }
                self.expect(Token::Semicolon)?;
            }
            self.expect(Token::Semicolon)?;
            return Ok(DdlStatement::AlterScalarType { name, ops });
        }

        self.expect_word("TYPE")?;
        let name = self.expect_qualified_name()?;

        if self.eat_word("RENAME") {
            self.expect_word("TO")?;
            let new_name = self.expect_qualified_name()?;
            self.expect(Token::Semicolon)?;
            return Ok(DdlStatement::RenameType { name, new_name });
        }

        self.expect(Token::LBrace)?;
        let mut ops = Vec::new();
        while !self.eat(&Token::RBrace) {
            ops.push(self.parse_alter_op()?);
        }
        self.expect(Token::Semicolon)?;
        Ok(DdlStatement::AlterType { name, ops })
    }

    fn parse_alter_op(&mut self) -> Result<AlterTypeOp, String> {
        if self.eat_word("CREATE") {
            return self.parse_member_create();
        }
        if self.eat_word("ALTER") {
            if self.eat_word("PROPERTY") {
                let name = self.expect_name()?;
                self.expect(Token::LBrace)?;
                let mut changes = Vec::new();
                while !self.eat(&Token::RBrace) {
                    changes.push(self.parse_property_alter()?);
                }
                self.expect(Token::Semicolon)?;
                return Ok(AlterTypeOp::AlterProperty { name, changes });
            }
            self.expect_word("LINK")?;
            let name = self.expect_name()?;
            self.expect(Token::LBrace)?;
            let mut changes = Vec::new();
            while !self.eat(&Token::RBrace) {
                changes.push(self.parse_link_alter()?);
            }
            self.expect(Token::Semicolon)?;
            return Ok(AlterTypeOp::AlterLink { name, changes });
        }
        if self.eat_word("RENAME") {
            let is_property = self.eat_word("PROPERTY");
            if !is_property {
                self.expect_word("LINK")?;
            }
            let name = self.expect_name()?;
            self.expect_word("TO")?;
            let new_name = self.expect_name()?;
            self.expect(Token::Semicolon)?;
            return Ok(if is_property {
                AlterTypeOp::RenameProperty { name, new_name }
            } else {
                AlterTypeOp::RenameLink { name, new_name }
            });
        }
        if self.eat_word("DROP") {
            if self.eat_word("PROPERTY") {
                let name = self.expect_name()?;
                self.expect(Token::Semicolon)?;
                return Ok(AlterTypeOp::DropProperty { name });
            }
            if self.eat_word("LINK") {
                let name = self.expect_name()?;
                self.expect(Token::Semicolon)?;
                return Ok(AlterTypeOp::DropLink { name });
            }
            if self.eat_word("CONSTRAINT") {
                let constraint = self.parse_constraint()?;
                self.expect(Token::Semicolon)?;
                return Ok(AlterTypeOp::DropConstraint(constraint));
            }
            self.expect_word("INDEX")?;
            self.expect_word("ON")?;
            let expr = self.capture_parens()?;
            self.expect(Token::Semicolon)?;
            return Ok(AlterTypeOp::DropIndex(IndexDef::new(expr)));
        }
        self.expect_word("SET")?;
        if self.eat_word("ABSTRACT") {
            let tok = self.next()?;
            let value = match tok.token {
                Token::True => true,
                Token::False => false,
                other => return Err(format!("expected true or false, found {other:?}")),
            };
            self.expect(Token::Semicolon)?;
            return Ok(AlterTypeOp::SetAbstract(value));
        }
        self.expect_word("EXTENDING")?;
        let mut parents = Vec::new();
        if !self.eat(&Token::Semicolon) {
            parents.push(self.expect_qualified_name()?);
            while self.eat(&Token::Comma) {
                parents.push(self.expect_qualified_name()?);
            }
            self.expect(Token::Semicolon)?;
        }
        Ok(AlterTypeOp::SetExtends(parents))
    }

    fn parse_property_alter(&mut self) -> Result<PropertyAlter, String> {
        if self.eat_word("SET") {
            if self.eat_word("TYPE") {
                let target = self.expect_scalar_ref()?;
                let cast = if self.eat_word("USING") {
                    Some(self.capture_parens()?)
                } else {
                    None
                };
                self.expect(Token::Semicolon)?;
                return Ok(PropertyAlter::SetType { target, cast });
            }
            if self.eat_word("REQUIRED") {
                let fill = if self.eat_word("USING") {
                    Some(self.capture_parens()?)
                } else {
                    None
                };
                self.expect(Token::Semicolon)?;
                return Ok(PropertyAlter::SetRequired { fill });
            }
            if self.eat_word("OPTIONAL") {
                self.expect(Token::Semicolon)?;
                return Ok(PropertyAlter::SetOptional);
            }
            if self.eat_word("CARDINALITY") {
                let card = self.parse_cardinality()?;
                self.expect(Token::Semicolon)?;
                return Ok(PropertyAlter::SetCardinality(card));
            }
            self.expect_word("default")?;
            self.expect(Token::Assign)?;
            let expr = self.capture_parens()?;
            self.expect(Token::Semicolon)?;
            return Ok(PropertyAlter::SetDefault(expr));
        }
        if self.eat_word("CREATE") {
            self.expect_word("CONSTRAINT")?;
            let constraint = self.parse_constraint()?;
            self.expect(Token::Semicolon)?;
            return Ok(PropertyAlter::AddConstraint(constraint));
        }
        self.expect_word("DROP")?;
        if self.eat_word("CONSTRAINT") {
            let constraint = self.parse_constraint()?;
            self.expect(Token::Semicolon)?;
            return Ok(PropertyAlter::DropConstraint(constraint));
        }
        self.expect_word("default")?;
        self.expect(Token::Semicolon)?;
        Ok(PropertyAlter::DropDefault)
    }

    fn parse_link_alter(&mut self) -> Result<LinkAlter, String> {
        if self.eat_word("ON") {
            self.expect_word("TARGET")?;
            self.expect_word("DELETE")?;
            let policy = self.parse_policy()?;
            self.expect(Token::Semicolon)?;
            return Ok(LinkAlter::SetOnTargetDelete(policy));
        }
        if self.eat_word("SET") {
            if self.eat_word("TARGET") {
                let target = self.expect_qualified_name()?;
                self.expect(Token::Semicolon)?;
                return Ok(LinkAlter::SetTarget { target });
            }
            if self.eat_word("REQUIRED") {
                let fill = if self.eat_word("USING") {
                    Some(self.capture_parens()?)
                } else {
                    None
                };
                self.expect(Token::Semicolon)?;
                return Ok(LinkAlter::SetRequired { fill });
            }
            if self.eat_word("OPTIONAL") {
                self.expect(Token::Semicolon)?;
                return Ok(LinkAlter::SetOptional);
            }
            self.expect_word("CARDINALITY")?;
            let card = self.parse_cardinality()?;
            self.expect(Token::Semicolon)?;
            return Ok(LinkAlter::SetCardinality(card));
        }
        if self.eat_word("CREATE") {
            self.expect_word("CONSTRAINT")?;
            let constraint = self.parse_constraint()?;
            self.expect(Token::Semicolon)?;
            return Ok(LinkAlter::AddConstraint(constraint));
        }
        self.expect_word("DROP")?;
        self.expect_word("CONSTRAINT")?;
        let constraint = self.parse_constraint()?;
        self.expect(Token::Semicolon)?;
        Ok(LinkAlter::DropConstraint(constraint))
    }

    fn parse_cardinality(&mut self) -> Result<Cardinality, String> {
        let tok = self.next()?;
        match tok.token {
            Token::Single => Ok(Cardinality::Single),
            Token::Multi => Ok(Cardinality::Multi),
            other => Err(format!("expected single or multi, found {other:?}")),
        }
    }

    fn parse_policy(&mut self) -> Result<OnTargetDelete, String> {
        let tok = self.next()?;
        let word = tok
            .as_name()
            .ok_or_else(|| format!("expected a delete policy, found {:?}", tok.token))?;
        match word.as_str() {
            "restrict" => Ok(OnTargetDelete::Restrict),
            "allow" => Ok(OnTargetDelete::Allow),
            "delete" => {
                self.expect_word("source")?;
                Ok(OnTargetDelete::DeleteSource)
            }
            other => Err(format!("unknown delete policy {other}")),
        }
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDef, String> {
        let name = self.expect_name()?;
        match name.as_str() {
            "exclusive" => Ok(ConstraintDef::Exclusive),
            "one_of" => {
                self.expect(Token::LParen)?;
                let mut values = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        let tok = self.next()?;
                        match tok.token {
                            Token::String(s) | Token::StringSingle(s) => values.push(s),
                            other => {
                                return Err(format!(
                                    "expected a string literal in one_of, found {other:?}"
                                ))
                            }
                        }
                        if self.eat(&Token::RParen) {
                            break;
                        }
                        self.expect(Token::Comma)?;
                    }
                }
                Ok(ConstraintDef::OneOf(values))
            }
            "expression" => {
                self.expect(Token::On)?;
                let expr = self.capture_parens()?;
                Ok(ConstraintDef::Expression(expr))
            }
            other => Err(format!("unknown constraint {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roundtrip(stmt: DdlStatement) {
        let text = stmt.render();
        let parsed = parse_statements(&text).unwrap();
        assert_eq!(parsed, vec![stmt]);
    }

    #[test]
    fn test_parse_create_type() {
        let def = ObjectTypeDef::new("default::Post")
            .extending("default::Auditable")
            .with_property(
                PropertyDef::new("title", ScalarRef::str())
                    .required()
                    .with_constraint(ConstraintDef::Exclusive),
            )
            .with_property(
                PropertyDef::new("status", ScalarRef::custom("default::post_status"))
                    .with_default("'draft'"),
            )
            .with_link(
                LinkDef::new("author", "default::User")
                    .required()
                    .on_target_delete(OnTargetDelete::DeleteSource),
            )
            .with_index(IndexDef::new("title"));
        roundtrip(DdlStatement::CreateType(def));
    }

    #[test]
    fn test_parse_abstract_marker_type() {
        roundtrip(DdlStatement::CreateType(
            ObjectTypeDef::new("default::Marker").abstract_(),
        ));
    }

    #[test]
    fn test_parse_alter_type() {
        roundtrip(DdlStatement::AlterType {
            name: "default::User".into(),
            ops: vec![
                AlterTypeOp::AddProperty(
                    PropertyDef::new("age", ScalarRef::builtin(BuiltinScalar::Int64)).multi(),
                ),
                AlterTypeOp::AlterProperty {
                    name: "name".into(),
                    changes: vec![
                        PropertyAlter::SetRequired {
                            fill: Some("'unknown'".into()),
                        },
                        PropertyAlter::SetType {
                            target: ScalarRef::str(),
                            cast: None,
                        },
                        PropertyAlter::SetDefault("'n/a'".into()),
                        PropertyAlter::DropDefault,
                        PropertyAlter::SetCardinality(Cardinality::Multi),
                    ],
                },
                AlterTypeOp::RenameProperty {
                    name: "nick".into(),
                    new_name: "handle".into(),
                },
                AlterTypeOp::DropLink {
                    name: "posts".into(),
                },
                AlterTypeOp::SetAbstract(true),
                AlterTypeOp::SetExtends(vec!["default::Base".into()]),
            ],
        });
    }

    #[test]
    fn test_parse_alter_link() {
        roundtrip(DdlStatement::AlterType {
            name: "default::Post".into(),
            ops: vec![AlterTypeOp::AlterLink {
                name: "author".into(),
                changes: vec![
                    LinkAlter::SetTarget {
                        target: "default::Person".into(),
                    },
                    LinkAlter::SetOnTargetDelete(OnTargetDelete::Allow),
                    LinkAlter::SetRequired {
                        fill: Some("(select default::Person limit 1)".into()),
                    },
                ],
            }],
        });
    }

    #[test]
    fn test_parse_rename_and_drop_type() {
        roundtrip(DdlStatement::RenameType {
            name: "default::User".into(),
            new_name: "default::Person".into(),
        });
        roundtrip(DdlStatement::DropType {
            name: "default::User".into(),
        });
    }

    #[test]
    fn test_parse_scalar_statements() {
        roundtrip(DdlStatement::CreateScalarType(
            ScalarTypeDef::new("default::status", ScalarRef::str()).with_constraint(
                ConstraintDef::OneOf(vec!["draft".into(), "published".into()]),
            ),
        ));
        roundtrip(DdlStatement::AlterScalarType {
            name: "default::status".into(),
            ops: vec![
                ScalarAlter::DropConstraint(ConstraintDef::OneOf(vec!["draft".into()])),
                ScalarAlter::SetBase(ScalarRef::builtin(BuiltinScalar::Int64)),
            ],
        });
        roundtrip(DdlStatement::DropScalarType {
            name: "default::status".into(),
        });
    }

    #[test]
    fn test_parse_expression_constraint() {
        roundtrip(DdlStatement::AlterType {
            name: "default::User".into(),
            ops: vec![AlterTypeOp::AddConstraint(ConstraintDef::Expression(
                "len(__subject__.name) > 3".into(),
            ))],
        });
    }

    #[test]
    fn test_parse_multiple_statements() {
        let text = "CREATE TYPE default::A;\nCREATE TYPE default::B;";
        let parsed = parse_statements(text).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_error_reports_context() {
        let err = parse_statements("CREATE NONSENSE default::A;").unwrap_err();
        assert!(err.contains("NONSENSE"));
    }

    #[test]
    fn test_parse_unknown_constraint_rejected() {
        let text = "ALTER TYPE default::A {\n    CREATE CONSTRAINT bogus;\n};";
        let err = parse_statements(text).unwrap_err();
        assert!(err.contains("unknown constraint"));
    }
}
