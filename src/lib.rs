//! `cdecl` — the declaration grammar and type system for a C11 compiler
//! front-end (spec §1 "Purpose & Scope").
//!
//! This crate owns everything between a token stream and a fully-typed
//! declaration: the Specifier Builder, the Declarator Parser, the Type
//! Representation (with its translation-unit arena), and the Declaration
//! Coordinator that ties them together. It does not lex, preprocess,
//! evaluate expressions, or parse statements — those are external
//! collaborators, reached only through the traits in [`declarator`] and
//! [`decl`].

pub mod arena;
pub mod ast;
pub mod decl;
pub mod declarator;
pub mod diagnostic;
pub mod error;
pub mod scope;
pub mod specifier;
pub mod target;
pub mod token;
pub mod ty;

pub use ast::{Ast, DeclTag, Node, NodeId, StmtHandle};
pub use decl::{parse_block_declaration, parse_external_declaration, StmtParser};
pub use declarator::{ConstExpr, Declarator, ExprEvaluator, SpecifierParser};
pub use diagnostic::{Diagnostic, DiagnosticSink, DiagnosticTag, Extra, NullSink, VecSink};
pub use error::{Error, Result, SyntaxError};
pub use scope::{Entry, Scope};
pub use target::{Arch, Os, Target};
pub use ty::{Qualifiers, Specifier, Type};
