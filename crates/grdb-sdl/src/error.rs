//! Parse errors with source context.

use crate::span::{offset_to_line_col, Span};
use std::fmt::Write as _;
use thiserror::Error;

/// Error during lexing/parsing of an SDL document.
#[derive(Debug, Error)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Render the error as a caret diagnostic against the source text.
    pub fn format_with_source(&self, source: &str) -> String {
        let (line, col) = offset_to_line_col(source, self.span.start);
        let mut out = String::new();
        let _ = writeln!(out, "error: {}", self.message);
        let _ = writeln!(out, "  --> line {}:{}", line, col);

        if let Some(text) = source.lines().nth(line - 1) {
            let _ = writeln!(out, "   |");
            let _ = writeln!(out, "{:3}| {}", line, text);

            let mut marker = String::from("   |");
            marker.extend(std::iter::repeat(' ').take(col));
            marker.push('^');
            let underline = self
                .span
                .len()
                .saturating_sub(1)
                .min(text.len().saturating_sub(col));
            marker.extend(std::iter::repeat('~').take(underline));
            let _ = writeln!(out, "{}", marker);
        }

        if let Some(hint) = &self.hint {
            let _ = writeln!(out, "   = hint: {}", hint);
        }

        out
    }
}
