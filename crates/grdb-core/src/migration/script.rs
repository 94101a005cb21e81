//! Migration script: one hash-identified block of DDL statements.

use crate::migration::error::MigrationError;
use crate::migration::hash::{is_migration_id, migration_id, INITIAL_PARENT};
use crate::migration::parse::parse_statements;
use crate::migration::DdlStatement;
use grdb_sdl::lexer::{Lexer, Token};

/// A migration: an id, the parent it chains onto, and its statements.
///
/// The id is derived from the parent and the canonical statement text, so a
/// script cannot be edited or re-parented without the mismatch being
/// detected on the next load.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationScript {
    /// Content-derived id, `m1` followed by 64 hex digits.
    pub id: String,
    /// Parent id, or `initial` for the first migration.
    pub parent: String,
    /// The statements, in application order.
    pub statements: Vec<DdlStatement>,
    /// Canonical rendered statement text (the hashed bytes).
    pub text: String,
}

impl MigrationScript {
    /// Build a script from statements, computing its id.
    pub fn new(parent: Option<&str>, statements: Vec<DdlStatement>) -> Self {
        let text = statements
            .iter()
            .map(DdlStatement::render)
            .collect::<Vec<_>>()
            .join("\n");
        let id = migration_id(parent, &text);
        Self {
            id,
            parent: parent.unwrap_or(INITIAL_PARENT).to_string(),
            statements,
            text,
        }
    }

    /// Parent id, `None` for the first migration in a chain.
    pub fn parent_id(&self) -> Option<&str> {
        (self.parent != INITIAL_PARENT).then_some(self.parent.as_str())
    }

    /// Render the full migration file content.
    pub fn render_file(&self) -> String {
        let mut out = format!("CREATE MIGRATION {} ONTO {} {{\n", self.id, self.parent);
        for line in self.text.lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str("};\n");
        out
    }

    /// Parse a migration file and verify its id against the content.
    ///
    /// `file` is used for error context only.
    pub fn parse_file(file: &str, content: &str) -> Result<Self, MigrationError> {
        let invalid = |message: String| MigrationError::InvalidScript {
            file: file.to_string(),
            message,
        };

        let mut lexer = Lexer::new(content);
        let mut expect_word = |word: &str| -> Result<String, MigrationError> {
            match lexer.next_token() {
                Some(Ok(tok)) => match &tok.token {
                    Token::Ident(s) if word.is_empty() || s == word => Ok(s.clone()),
                    other => Err(invalid(format!("expected {word}, found {other:?}"))),
                },
                _ => Err(invalid(format!("expected {word}"))),
            }
        };

        expect_word("CREATE")?;
        expect_word("MIGRATION")?;
        let id = expect_word("")?;
        if !is_migration_id(&id) {
            return Err(invalid(format!("malformed migration id {id}")));
        }
        expect_word("ONTO")?;
        let parent = expect_word("")?;
        if parent != INITIAL_PARENT && !is_migration_id(&parent) {
            return Err(invalid(format!("malformed parent id {parent}")));
        }

        let body_start = match lexer.next_token() {
            Some(Ok(tok)) if tok.token == Token::LBrace => tok.span.end,
            _ => return Err(invalid("expected '{' after migration header".to_string())),
        };

        // Find the matching closing brace of the migration body.
        let mut depth = 0usize;
        let body_end = loop {
            match lexer.next_token() {
                Some(Ok(tok)) => match tok.token {
                    Token::LBrace => depth += 1,
                    Token::RBrace => {
                        if depth == 0 {
                            break tok.span.start;
                        }
                        depth -= 1;
                    }
                    _ => {}
                },
                Some(Err(_)) => {}
                None => return Err(invalid("unterminated migration body".to_string())),
            }
        };
        match lexer.next_token() {
            Some(Ok(tok)) if tok.token == Token::Semicolon => {}
            _ => return Err(invalid("expected ';' after migration body".to_string())),
        }
        if let Some(Ok(tok)) = lexer.next_token() {
            return Err(invalid(format!(
                "trailing content after migration: {:?}",
                tok.token
            )));
        }

        let statements = parse_statements(&content[body_start..body_end]).map_err(|message| {
            MigrationError::InvalidScript {
                file: file.to_string(),
                message,
            }
        })?;

        let parent_opt = (parent != INITIAL_PARENT).then_some(parent.as_str());
        let canonical = MigrationScript::new(parent_opt, statements);
        if canonical.id != id {
            return Err(MigrationError::HashMismatch {
                file: file.to_string(),
                expected: id,
                actual: canonical.id,
            });
        }
        Ok(canonical)
    }
}
