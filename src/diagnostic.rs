//! Diagnostic records and the sink they are submitted to.
//!
//! The diagnostics sink is an external collaborator (spec §6): this crate
//! only produces [`Diagnostic`] values and pushes them through a
//! [`DiagnosticSink`]. What happens to them (rendering, deduplication,
//! terminal colors) is entirely up to the embedding compiler.

use crate::token::TokenId;

/// One reported-and-continued problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub tag: DiagnosticTag,
    pub token: TokenId,
    pub extra: Option<Extra>,
}

/// Extra interpolation data carried alongside a diagnostic tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    /// A single lexeme or name to interpolate into the tag's message.
    Text(String),
    /// An `{expected, actual}` pair, used for token-mismatch errors.
    Mismatch {
        expected: String,
        actual: String,
    },
}

/// Every diagnosable condition the core can raise.
///
/// Kept as a closed enum (rather than ad hoc strings) so the embedding
/// compiler can match on `tag` to localize or filter messages, while the
/// `extra` field still carries the free-form parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticTag {
    /// Specifier Builder: e.g. `unsigned` repeated, or applied twice.
    DuplicateSpecifier,
    /// Specifier Builder: two specifiers cannot be combined, e.g.
    /// `signed` after `unsigned long long`.
    CannotCombineSpecifier,
    /// Specifier Builder: no type specifier at all; the declaration
    /// defaults to `int`.
    MissingTypeSpecifier,
    /// Specifier Builder: `_Complex`/`complex long` with no base float.
    ComplexWithNoBase,
    /// Qualifier appears more than once on the same entity.
    DuplicateQualifier,
    /// `restrict` used on a non-pointer type.
    RestrictOnNonPointer,
    /// `static`/`*` used on a non-outermost array dimension, or
    /// `static_array`/`unspecified_variable_len_array` nested inside
    /// another array.
    ArrayQualifierNotOutermost,
    /// Array or VLA element type is incomplete or a function.
    InvalidArrayElement,
    /// Function return type is an array or a function.
    InvalidFunctionReturn,
    /// `void` used as one of several parameters, or qualified `void`.
    MisplacedVoidParameter,
    /// More than one storage-class specifier in a decl-specifier sequence.
    MultipleStorageClass,
    /// `_Thread_local` combined with an incompatible storage class.
    InvalidThreadLocal,
    /// `inline`/`_Noreturn` repeated.
    DuplicateFunctionSpecifier,
    /// `inline`/`_Noreturn` on a declaration that is not a function.
    FunctionSpecifierOnNonFunction,
    /// Initializer on a `typedef` or a function declarator.
    InvalidInitializer,
    /// Initializer present alongside `extern`; storage class is downgraded.
    ExternWithInitializer,
    /// A nested nested function definition (only top-level allowed).
    FuncNotInRoot,
    /// `_Static_assert` whose constant expression evaluated to zero.
    StaticAssertFailed,
    /// Generic token-mismatch error (see [`Extra::Mismatch`]).
    UnexpectedToken,
}

/// Receives diagnostics as they are produced.
///
/// A parser instance holds `&mut dyn DiagnosticSink` for its lifetime; all
/// calls are synchronous and the only guarantee is submission order.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Accumulates diagnostics in memory, the shape most tests want.
#[derive(Debug, Default, Clone)]
pub struct VecSink(pub Vec<Diagnostic>);

impl VecSink {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn has_tag(&self, tag: DiagnosticTag) -> bool {
        self.0.iter().any(|d| d.tag == tag)
    }
}

impl DiagnosticSink for VecSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("diagnostic: {:?}", diagnostic);
        self.0.push(diagnostic);
    }
}

/// Discards every diagnostic. Useful for drivers that only want the parse
/// tree and will re-derive errors elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
