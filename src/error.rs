//! Crate-wide error type.
//!
//! Only the *abort-current-declaration* failure class (see the crate's
//! `README`/spec §7) flows through this type. Reported-and-continued
//! diagnostics never become an `Error` — they go to a [`crate::diagnostic::DiagnosticSink`]
//! and the caller keeps going with a best-effort value.

use std::fmt;
use thiserror::Error;

use crate::token::TokenId;

/// The crate's standard result shape.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Grammar error: a required token was missing, or the specifier state
    /// left no salvageable type. Caught by the Declaration Coordinator at
    /// the next declaration boundary.
    #[error("parsing failed at token {0}: {1}")]
    Syntax(TokenId, SyntaxError),

    /// The type arena ran out of room for a new descriptor. Treated as
    /// fatal: it propagates out of the translation unit unconditionally.
    #[error("type arena exhausted")]
    ArenaExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// `expected` names the grammar rule or token category; `found` is a
    /// human-readable rendering of what was actually at the cursor.
    Expected {
        expected: &'static str,
        found: String,
    },
    /// The decl-specifier sequence could not be reduced to any type at all
    /// (e.g. two mutually exclusive descriptor specifiers).
    NoSalvageableType,
    /// A nested function definition was found where only a declaration was
    /// allowed.
    FuncNotInRoot,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::Expected { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            SyntaxError::NoSalvageableType => write!(f, "no salvageable type"),
            SyntaxError::FuncNotInRoot => write!(f, "function definition not allowed here"),
        }
    }
}
