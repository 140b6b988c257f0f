//! Front-end error kinds.
//!
//! Each kind terminates its phase; errors are never recovered locally and
//! unwind to the caller of the pipeline.

use std::ops::Range;

/// Error raised during lexing or parsing: unexpected or missing token,
/// undeclared reference, duplicate declaration. Carries the line and the
/// byte span of the offending token for diagnostics rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line}: {message}")]
pub struct SyntaxError {
    pub line: u32,
    pub span: Range<usize>,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: u32, span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            span,
            message: message.into(),
        }
    }
}

/// Error raised by the semantic analyzer: type mismatch, misplaced control
/// flow, ill-formed `par` or `s_channel`, arity shortfall.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("semantic error: {message}")]
pub struct SemanticError {
    pub message: String,
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
