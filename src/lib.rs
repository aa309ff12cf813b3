//! ConsXP - minimal Scheme-like expression interpreter core
//!
//! This crate parses parenthesized prefix expressions into a tree of [`ast::Value`]s
//! and reduces that tree against an environment of built-in numeric procedures.
//!
//! ```scheme
//! (+ 3 4)                       ; 7
//! (+ (+ 3 4) (+ 5 6) 7 8 9 10)  ; 52
//! (- 1 2 3)                     ; -4
//! (+ (3 . 4))                   ; 7, operators also fold raw cons pairs
//! (+)                           ; 0, the additive identity
//! ```
//!
//! ## Value Model
//!
//! Every datum is a [`ast::Value`]: numbers (integer, rational, real, complex),
//! identifiers, cons pairs, proper lists, the empty list and native procedures.
//! Payloads are only reached through checked downcasts, so a mismatched kind is a
//! [`Error::TypeMismatch`] rather than a silent coercion.
//!
//! ## Arithmetic
//!
//! The four built-in operators are generic structural folds: a bare number reduces
//! to itself, a pair combines its reduced `car` and `cdr`, a list folds left to
//! right from its first element, and the empty list yields the operator's identity
//! element (0 for `+` and `-`, 1 for `*` and `/`).
//!
//! ## Modules
//!
//! - `ast`: value model, cons pairs, lists and the numeric tower
//! - `builtinops`: arithmetic procedure generator and the builtin registry
//! - `evaluator`: environments and expression reduction
//! - `scheme`: S-expression reader (feature `scheme`)

use std::fmt;

/// Maximum parsing depth to prevent stack overflow attacks
pub const MAX_PARSE_DEPTH: usize = 32;

/// Maximum evaluation depth to prevent stack overflow in recursive evaluation.
/// Set higher than parse depth so that every parsed expression can be reduced.
pub const MAX_EVAL_DEPTH: usize = 64;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed expressions)
    InvalidSyntax,
    /// Input ended before the expression was complete (unclosed parens)
    Incomplete,
    /// Expression nesting exceeded the maximum parse depth
    TooDeeplyNested,
    /// Extra input found after a complete, valid expression
    TrailingContent,
    /// Implementation-imposed limit exceeded (integer overflow, zero denominator)
    ImplementationLimit,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token or character encountered, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a simple ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None, None)
    }

    /// Create a ParseError with context extracted from input at a given offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        let context_start = error_offset.saturating_sub(20);
        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.chars().count() < input.chars().count() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, Some(display_context), found)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ParseError: {}", self.message)?;
        if let Some(found) = &self.found {
            write!(f, "\nFound: {found}")?;
        }
        if let Some(context) = &self.context {
            write!(f, "\nContext: {context}")?;
        }
        Ok(())
    }
}

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed input reported by the reader
    #[error("{0}")]
    ParseError(ParseError),
    /// A checked downcast found a different kind than the one required
    #[error("Type error: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },
    /// Identifier absent from the environment
    #[error("Unbound identifier: {0}")]
    UnboundIdentifier(String),
    /// Arithmetic failures, depth limits and invalid applications
    #[error("EvaluationError: {0}")]
    EvalError(String),
}

impl Error {
    pub fn type_mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::ParseError(err)
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;

#[cfg(feature = "scheme")]
pub mod scheme;
