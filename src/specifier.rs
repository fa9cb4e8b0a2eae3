//! The Specifier Builder (spec §4.1).
//!
//! Absorbs type-specifier keywords in any legal order — `unsigned long long
//! int` and `long int unsigned long` both finalize to the same type — and
//! diagnoses illegal combinations where they occur, rather than deferring
//! to a post-hoc pass.

use crate::arena::{EnumId, RecordId};
use crate::diagnostic::{Diagnostic, DiagnosticSink, DiagnosticTag, Extra};
use crate::token::TokenId;
use crate::ty::{Specifier, Type};

/// Every partial state reachable by a legal prefix of type-specifier
/// keywords (spec §4.1 "State"). `Descriptor` carries the already-resolved
/// `Type` for `struct`/`union`/`enum`/`typedef`/pointer/array/func layers
/// injected by the Declarator Parser rather than the Builder itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    None,
    Void,
    Bool,
    Char,
    Signed,
    Unsigned,
    SignedChar,
    UnsignedChar,
    Short,
    ShortInt,
    SignedShort,
    UnsignedShort,
    SignedShortInt,
    UnsignedShortInt,
    Int,
    SignedInt,
    UnsignedInt,
    Long,
    LongInt,
    SignedLong,
    UnsignedLong,
    SignedLongInt,
    UnsignedLongInt,
    LongLong,
    LongLongInt,
    SignedLongLong,
    UnsignedLongLong,
    SignedLongLongInt,
    UnsignedLongLongInt,
    Float,
    Double,
    LongDouble,
    Complex,
    ComplexLong,
    ComplexFloat,
    ComplexDouble,
    ComplexLongDouble,
    /// `struct`/`union`/`enum`/typedef/pointer/array/func — an already
    /// fully-formed type injected by the Declaration Coordinator.
    Descriptor,
}

/// A single incoming specifier-word token, as the Declaration Coordinator
/// classifies it before offering it to the Builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierWord {
    Void,
    Bool,
    Char,
    Signed,
    Unsigned,
    Short,
    Int,
    Long,
    Float,
    Double,
    Complex,
}

/// A non-arithmetic type injected wholesale: `struct`/`union`/`enum`
/// bodies, typedef names, or (internally, from the Declarator Parser) a
/// derived type already under construction.
#[derive(Debug, Clone, Copy)]
pub enum Descriptor {
    Record(RecordId, bool /* is_union */),
    Enum(EnumId),
    Typedef(Type),
}

pub struct Builder {
    kind: Kind,
    descriptor: Option<Descriptor>,
    /// Token of the typedef name that seeded `Descriptor::Typedef`, kept
    /// around purely for conflict diagnostics (spec §4.1 "State").
    typedef_token: Option<TokenId>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            kind: Kind::None,
            descriptor: None,
            typedef_token: None,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == Kind::None
    }

    /// Offers one arithmetic specifier word to the Builder (spec §4.1
    /// `combine`). Emits a diagnostic and leaves the state unchanged on an
    /// illegal transition, mirroring "reported-and-continued" (spec §7).
    pub fn combine(&mut self, word: SpecifierWord, at: TokenId, sink: &mut dyn DiagnosticSink) {
        use Kind::*;
        use SpecifierWord as W;

        let next = match (self.kind, word) {
            (None, W::Void) => Some(Void),
            (None, W::Bool) => Some(Bool),
            (None, W::Char) => Some(Char),
            (None, W::Signed) => Some(Signed),
            (None, W::Unsigned) => Some(Unsigned),
            (None, W::Short) => Some(Short),
            (None, W::Int) => Some(Int),
            (None, W::Long) => Some(Long),
            (None, W::Float) => Some(Float),
            (None, W::Double) => Some(Double),
            (None, W::Complex) => Some(Complex),

            // signed/unsigned: legal only from the integer-compatible kinds.
            (Char, W::Signed) => Some(SignedChar),
            (Char, W::Unsigned) => Some(UnsignedChar),
            (Short, W::Signed) | (ShortInt, W::Signed) => Some(SignedShort),
            (Short, W::Unsigned) | (ShortInt, W::Unsigned) => Some(UnsignedShort),
            (Int, W::Signed) => Some(SignedInt),
            (Int, W::Unsigned) => Some(UnsignedInt),
            (Long, W::Signed) | (LongInt, W::Signed) => Some(SignedLong),
            (Long, W::Unsigned) | (LongInt, W::Unsigned) => Some(UnsignedLong),
            (LongLong, W::Signed) | (LongLongInt, W::Signed) => Some(SignedLongLong),
            (LongLong, W::Unsigned) | (LongLongInt, W::Unsigned) => Some(UnsignedLongLong),
            (Signed, W::Short) => Some(SignedShort),
            (Unsigned, W::Short) => Some(UnsignedShort),
            (Signed, W::Int) => Some(SignedInt),
            (Unsigned, W::Int) => Some(UnsignedInt),
            (Signed, W::Long) => Some(SignedLong),
            (Unsigned, W::Long) => Some(UnsignedLong),

            // short/long/int merges.
            (Short, W::Int) => Some(ShortInt),
            (SignedShort, W::Int) => Some(SignedShortInt),
            (UnsignedShort, W::Int) => Some(UnsignedShortInt),
            (Int, W::Short) => Some(ShortInt),
            (Int, W::Long) | (SignedInt, W::Long) => Some(Long),
            (Long, W::Int) => Some(LongInt),
            (SignedLong, W::Int) => Some(SignedLongInt),
            (UnsignedLong, W::Int) => Some(UnsignedLongInt),
            (Long, W::Long) | (LongInt, W::Long) => Some(LongLong),
            (SignedLong, W::Long) => Some(SignedLongLong),
            (UnsignedLong, W::Long) => Some(UnsignedLongLong),
            (LongLong, W::Int) => Some(LongLongInt),
            (SignedLongLong, W::Int) => Some(SignedLongLongInt),
            (UnsignedLongLong, W::Int) => Some(UnsignedLongLongInt),

            // float: legal from {none, complex}.
            (Complex, W::Float) => Some(ComplexFloat),

            // double: legal from {none, long, complex, complex_long}.
            (Long, W::Double) | (LongInt, W::Double) => Some(LongDouble),
            (Complex, W::Double) => Some(ComplexDouble),
            (ComplexLong, W::Double) => Some(ComplexLongDouble),

            // complex: legal from {none, long, float, double, long_double}.
            (Long, W::Complex) => Some(ComplexLong),
            (Float, W::Complex) => Some(ComplexFloat),
            (Double, W::Complex) => Some(ComplexDouble),
            (LongDouble, W::Complex) => Some(ComplexLongDouble),

            // Everything else (a third `long`, repeated `signed`, `float`
            // after an integer kind, ...) cannot combine.
            _ => None,
        };

        match next {
            Some(k) => self.kind = k,
            None => self.report_cannot_combine(word, at, sink),
        }
    }

    fn report_cannot_combine(&self, word: SpecifierWord, at: TokenId, sink: &mut dyn DiagnosticSink) {
        sink.report(Diagnostic {
            tag: DiagnosticTag::CannotCombineSpecifier,
            token: at,
            extra: Some(Extra::Text(format!("{:?}", word))),
        });
    }

    /// Injects a non-arithmetic descriptor (`struct`/`union`/`enum`/typedef,
    /// or the in-progress derived type from the Declarator Parser). Legal
    /// only from `none` (spec §4.1).
    pub fn set_descriptor(
        &mut self,
        descriptor: Descriptor,
        at: TokenId,
        sink: &mut dyn DiagnosticSink,
    ) {
        if self.kind != Kind::None {
            sink.report(Diagnostic {
                tag: DiagnosticTag::CannotCombineSpecifier,
                token: at,
                extra: Some(Extra::Text("descriptor".into())),
            });
            return;
        }
        if let Descriptor::Typedef(_) = descriptor {
            self.typedef_token = Some(at);
        }
        self.kind = Kind::Descriptor;
        self.descriptor = Some(descriptor);
    }

    pub fn typedef_token(&self) -> Option<TokenId> {
        self.typedef_token
    }

    /// Finalizes the accumulated state into a canonical [`Type`] (spec
    /// §4.1 `finalize`). `none` yields `int` with a diagnostic; bare
    /// `complex`/`complex long` are rejected for lacking a base float.
    pub fn finalize(self, sink: &mut dyn DiagnosticSink) -> (Type, Option<Descriptor>) {
        use Kind::*;

        if self.kind == Descriptor {
            // The caller (Declaration Coordinator) is responsible for
            // turning a `Descriptor` into a concrete `Type`; we hand the
            // value back rather than guess its representation here.
            return (Type::INT, self.descriptor);
        }

        let specifier = match self.kind {
            None => {
                sink.report(Diagnostic {
                    tag: DiagnosticTag::MissingTypeSpecifier,
                    token: 0,
                    extra: None,
                });
                Specifier::Int
            }
            Void => Specifier::Void,
            Bool => Specifier::Bool,
            Char => Specifier::Char,
            SignedChar => Specifier::SChar,
            UnsignedChar => Specifier::UChar,
            Short | ShortInt | SignedShort | SignedShortInt => Specifier::Short,
            UnsignedShort | UnsignedShortInt => Specifier::UShort,
            Signed | Int | SignedInt => Specifier::Int,
            Unsigned | UnsignedInt => Specifier::UInt,
            Long | LongInt | SignedLong | SignedLongInt => Specifier::Long,
            UnsignedLong | UnsignedLongInt => Specifier::ULong,
            LongLong | LongLongInt | SignedLongLong | SignedLongLongInt => Specifier::LongLong,
            UnsignedLongLong | UnsignedLongLongInt => Specifier::ULongLong,
            Float => Specifier::Float,
            Double => Specifier::Double,
            LongDouble => Specifier::LongDouble,
            Complex => {
                sink.report(Diagnostic {
                    tag: DiagnosticTag::ComplexWithNoBase,
                    token: 0,
                    extra: None,
                });
                Specifier::ComplexDouble
            }
            ComplexLong => {
                sink.report(Diagnostic {
                    tag: DiagnosticTag::ComplexWithNoBase,
                    token: 0,
                    extra: None,
                });
                Specifier::ComplexLongDouble
            }
            ComplexFloat => Specifier::ComplexFloat,
            ComplexDouble => Specifier::ComplexDouble,
            ComplexLongDouble => Specifier::ComplexLongDouble,
            Descriptor => unreachable!("handled above"),
        };

        (Type::fundamental(specifier), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::VecSink;

    fn finalize_words(words: &[SpecifierWord]) -> (Type, VecSink) {
        let mut builder = Builder::new();
        let mut sink = VecSink::new();
        for w in words {
            builder.combine(*w, 0, &mut sink);
        }
        let (ty, _) = builder.finalize(&mut sink);
        (ty, sink)
    }

    #[test]
    fn permutations_of_long_long_unsigned_int_collapse() {
        use SpecifierWord::*;
        let orderings: &[&[SpecifierWord]] = &[
            &[Unsigned, Long, Long, Int],
            &[Long, Unsigned, Long, Int],
            &[Long, Long, Int, Unsigned],
            &[Int, Long, Long, Unsigned],
        ];
        for words in orderings {
            let (ty, sink) = finalize_words(words);
            assert_eq!(ty.specifier, Specifier::ULongLong, "{:?}", words);
            assert!(sink.0.is_empty(), "unexpected diagnostics for {:?}", words);
        }
    }

    #[test]
    fn bare_signed_is_int() {
        let (ty, _) = finalize_words(&[SpecifierWord::Signed]);
        assert_eq!(ty.specifier, Specifier::Int);
    }

    #[test]
    fn bare_unsigned_is_uint() {
        let (ty, _) = finalize_words(&[SpecifierWord::Unsigned]);
        assert_eq!(ty.specifier, Specifier::UInt);
    }

    #[test]
    fn missing_specifier_defaults_to_int_with_diagnostic() {
        let (ty, sink) = finalize_words(&[]);
        assert_eq!(ty.specifier, Specifier::Int);
        assert!(sink.has_tag(DiagnosticTag::MissingTypeSpecifier));
    }

    #[test]
    fn signed_after_unsigned_long_long_conflicts() {
        // Scenario 6 of spec §8: `unsigned long long signed;`
        let mut builder = Builder::new();
        let mut sink = VecSink::new();
        builder.combine(SpecifierWord::Unsigned, 0, &mut sink);
        builder.combine(SpecifierWord::Long, 1, &mut sink);
        builder.combine(SpecifierWord::Long, 2, &mut sink);
        builder.combine(SpecifierWord::Signed, 3, &mut sink);
        assert!(sink.has_tag(DiagnosticTag::CannotCombineSpecifier));
        let (ty, _) = builder.finalize(&mut sink);
        assert_eq!(ty.specifier, Specifier::ULongLong);
    }

    #[test]
    fn isolated_complex_rejected_for_no_base() {
        let (ty, sink) = finalize_words(&[SpecifierWord::Complex]);
        assert_eq!(ty.specifier, Specifier::ComplexDouble);
        assert!(sink.has_tag(DiagnosticTag::ComplexWithNoBase));
    }

    #[test]
    fn short_int_is_short() {
        let (ty, _) = finalize_words(&[SpecifierWord::Short, SpecifierWord::Int]);
        assert_eq!(ty.specifier, Specifier::Short);
    }

    #[test]
    fn long_double_complex() {
        let (ty, sink) = finalize_words(&[
            SpecifierWord::Long,
            SpecifierWord::Double,
            SpecifierWord::Complex,
        ]);
        assert_eq!(ty.specifier, Specifier::ComplexLongDouble);
        assert!(sink.0.is_empty());
    }
}
