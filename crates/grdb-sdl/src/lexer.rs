//! Lexer for the grdb schema definition language using logos.

use crate::span::Span;
use logos::Logos;

/// Token types for SDL source.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // Declaration keywords
    #[token("module")]
    Module,
    #[token("type")]
    Type,
    #[token("abstract")]
    Abstract,
    #[token("scalar")]
    Scalar,
    #[token("extending")]
    Extending,

    // Pointer keywords
    #[token("required")]
    Required,
    #[token("optional")]
    Optional,
    #[token("multi")]
    Multi,
    #[token("single")]
    Single,
    #[token("property")]
    Property,
    #[token("link")]
    Link,

    // Schema item keywords
    #[token("constraint")]
    Constraint,
    #[token("index")]
    Index,
    #[token("on")]
    On,
    #[token("using")]
    Using,

    // Literals
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Identifier (unqualified; qualification uses PathSep)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // String literal (double-quoted)
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len()-1])
    })]
    String(String),

    // String literal (single-quoted)
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len()-1])
    })]
    StringSingle(String),

    // Integer literal
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    // Float literal
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    // Operators
    #[token("->")]
    Arrow,
    #[token(":=")]
    Assign,
    #[token("::")]
    PathSep,

    // Punctuation
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Expression-level operators; kept so default/constraint expressions
    // lex cleanly and can be re-sliced from the source verbatim.
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("++")]
    Concat,
}

/// Unescape a string literal, handling common escape sequences.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

impl SpannedToken {
    /// True for tokens that may serve as a name position.
    ///
    /// Several keywords (`on`, `link`, `property`, ...) are legal names for
    /// schema members, so the parser downgrades them where a name is
    /// expected.
    pub fn as_name(&self) -> Option<String> {
        match &self.token {
            Token::Ident(s) => Some(s.clone()),
            Token::On => Some("on".to_string()),
            Token::Single => Some("single".to_string()),
            Token::Multi => Some("multi".to_string()),
            Token::Using => Some("using".to_string()),
            _ => None,
        }
    }
}

/// Lexer that produces spanned tokens, with one-token lookahead.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<Result<SpannedToken, Span>>>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&Result<SpannedToken, Span>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        self.peeked.as_ref().and_then(|o| o.as_ref())
    }

    /// Get the next token. `Err` carries the span of an unlexable character.
    pub fn next_token(&mut self) -> Option<Result<SpannedToken, Span>> {
        if let Some(peeked) = self.peeked.take() {
            peeked
        } else {
            self.next_inner()
        }
    }

    fn next_inner(&mut self) -> Option<Result<SpannedToken, Span>> {
        match self.inner.next() {
            Some(Ok(token)) => Some(Ok(SpannedToken {
                token,
                span: self.inner.span().into(),
            })),
            Some(Err(())) => Some(Err(self.inner.span().into())),
            None => None,
        }
    }

    /// Span just past the end of the source.
    pub fn eof_span(&self) -> Span {
        let len = self.inner.source().len();
        Span::new(len, len)
    }

    /// The full source string.
    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

/// Tokenize a source string, dropping error tokens.
#[cfg(test)]
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(item) = lexer.next_token() {
        if let Ok(tok) = item {
            tokens.push(tok);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_declaration() {
        let tokens = tokenize("type User extending Auditable {");
        assert_eq!(tokens[0].token, Token::Type);
        assert_eq!(tokens[1].token, Token::Ident("User".to_string()));
        assert_eq!(tokens[2].token, Token::Extending);
        assert_eq!(tokens[3].token, Token::Ident("Auditable".to_string()));
        assert_eq!(tokens[4].token, Token::LBrace);
    }

    #[test]
    fn test_property_declaration() {
        let tokens = tokenize("required property name -> str;");
        assert_eq!(tokens[0].token, Token::Required);
        assert_eq!(tokens[1].token, Token::Property);
        assert_eq!(tokens[2].token, Token::Ident("name".to_string()));
        assert_eq!(tokens[3].token, Token::Arrow);
        assert_eq!(tokens[4].token, Token::Ident("str".to_string()));
        assert_eq!(tokens[5].token, Token::Semicolon);
    }

    #[test]
    fn test_qualified_name() {
        let tokens = tokenize("default::Post");
        assert_eq!(tokens[0].token, Token::Ident("default".to_string()));
        assert_eq!(tokens[1].token, Token::PathSep);
        assert_eq!(tokens[2].token, Token::Ident("Post".to_string()));
    }

    #[test]
    fn test_default_assignment() {
        let tokens = tokenize("default := datetime_current();");
        assert_eq!(tokens[0].token, Token::Ident("default".to_string()));
        assert_eq!(tokens[1].token, Token::Assign);
        assert_eq!(
            tokens[2].token,
            Token::Ident("datetime_current".to_string())
        );
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = tokenize("type User # trailing comment\n{ }");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].token, Token::LBrace);
    }

    #[test]
    fn test_string_literals() {
        let tokens = tokenize(r#"constraint one_of('draft', "published")"#);
        assert!(tokens
            .iter()
            .any(|t| t.token == Token::StringSingle("draft".to_string())));
        assert!(tokens
            .iter()
            .any(|t| t.token == Token::String("published".to_string())));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""line\nbreak""#);
        assert_eq!(tokens[0].token, Token::String("line\nbreak".to_string()));
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("0 42 -7 3.5");
        assert_eq!(tokens[0].token, Token::Int(0));
        assert_eq!(tokens[1].token, Token::Int(42));
        assert_eq!(tokens[2].token, Token::Int(-7));
        assert_eq!(tokens[3].token, Token::Float(3.5));
    }

    #[test]
    fn test_keyword_as_name() {
        let tokens = tokenize("property on -> str");
        assert_eq!(tokens[1].as_name(), Some("on".to_string()));
    }

    #[test]
    fn test_lexer_peek_does_not_consume() {
        let mut lexer = Lexer::new("type User");
        assert!(matches!(
            lexer.peek(),
            Some(Ok(SpannedToken {
                token: Token::Type,
                ..
            }))
        ));
        assert!(matches!(
            lexer.peek(),
            Some(Ok(SpannedToken {
                token: Token::Type,
                ..
            }))
        ));
        assert!(matches!(
            lexer.next_token(),
            Some(Ok(SpannedToken {
                token: Token::Type,
                ..
            }))
        ));
        assert!(matches!(
            lexer.next_token(),
            Some(Ok(SpannedToken {
                token: Token::Ident(_),
                ..
            }))
        ));
    }

    #[test]
    fn test_invalid_character_reported() {
        let mut lexer = Lexer::new("type @User");
        assert!(lexer.next_token().unwrap().is_ok());
        assert!(lexer.next_token().unwrap().is_err());
    }
}
