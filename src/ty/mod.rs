//! The Type Representation component (spec §3, §4.2).
//!
//! A [`Type`] is a small, `Copy`-free but cheaply `Clone`-able value: a
//! specifier tag, a qualifier set, an alignment override, and a payload
//! that indexes into the translation unit's [`crate::arena::TypeArena`] for
//! anything that isn't a fixed-size fact about the specifier itself.

mod combine;
mod dump;
mod ops;

pub use combine::{combine, combine_unchecked, wrap_pointer, CombineError};
pub use dump::dump;
pub use ops::{elem_type, eql, has_incomplete_size, integer_promotion, is_callable, is_unsigned_int, sizeof};

use crate::arena::{ArrayId, EnumId, FunctionId, PointeeId, RecordId, VlaId};

/// The closed set of type specifier tags (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specifier {
    Void,
    Bool,

    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,

    Float,
    Double,
    LongDouble,
    ComplexFloat,
    ComplexDouble,
    ComplexLongDouble,

    Pointer,
    Array,
    StaticArray,
    IncompleteArray,
    VariableLenArray,
    UnspecifiedVariableLenArray,
    Func,
    VarArgsFunc,
    OldStyleFunc,
    Struct,
    Union,
    Enum,
}

impl Specifier {
    pub fn is_integer(self) -> bool {
        use Specifier::*;
        matches!(
            self,
            Bool | Char
                | SChar
                | UChar
                | Short
                | UShort
                | Int
                | UInt
                | Long
                | ULong
                | LongLong
                | ULongLong
        )
    }

    pub fn is_float(self) -> bool {
        use Specifier::*;
        matches!(
            self,
            Float | Double | LongDouble | ComplexFloat | ComplexDouble | ComplexLongDouble
        )
    }

    pub fn is_array(self) -> bool {
        use Specifier::*;
        matches!(
            self,
            Array | StaticArray | IncompleteArray | VariableLenArray | UnspecifiedVariableLenArray
        )
    }

    pub fn is_func(self) -> bool {
        use Specifier::*;
        matches!(self, Func | VarArgsFunc | OldStyleFunc)
    }

    pub fn is_enum_or_record(self) -> bool {
        matches!(self, Specifier::Struct | Specifier::Union | Specifier::Enum)
    }

    pub fn is_vla(self) -> bool {
        matches!(
            self,
            Specifier::VariableLenArray | Specifier::UnspecifiedVariableLenArray
        )
    }
}

/// Independent qualifier bits (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Qualifiers {
    pub const_: bool,
    pub volatile: bool,
    pub restrict: bool,
    pub atomic: bool,
}

impl Qualifiers {
    pub const NONE: Qualifiers = Qualifiers {
        const_: false,
        volatile: false,
        restrict: false,
        atomic: false,
    };

    pub fn is_empty(self) -> bool {
        self == Qualifiers::NONE
    }

    /// Merges two qualifier sets, reporting which bits were already set
    /// (i.e. duplicated) in `self`.
    pub fn union_reporting_duplicates(self, other: Qualifiers) -> (Qualifiers, Qualifiers) {
        let dup = Qualifiers {
            const_: self.const_ && other.const_,
            volatile: self.volatile && other.volatile,
            restrict: self.restrict && other.restrict,
            atomic: self.atomic && other.atomic,
        };
        let merged = Qualifiers {
            const_: self.const_ || other.const_,
            volatile: self.volatile || other.volatile,
            restrict: self.restrict || other.restrict,
            atomic: self.atomic || other.atomic,
        };
        (merged, dup)
    }
}

/// The specifier-dependent auxiliary payload (spec §3 invariant 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Payload {
    None,
    Pointee(PointeeId),
    Function(FunctionId),
    Array(ArrayId),
    Vla(VlaId),
    Record(RecordId),
    Enum(EnumId),
}

/// A struct/union field (spec §3 "Record").
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Box<str>,
    pub ty: Type,
    /// `0` means "not a bit-field".
    pub bit_width: u32,
    pub offset: u32,
}

/// A single `enum` constant: name, the enum's tag type, and its value.
#[derive(Debug, Clone)]
pub struct Enumerator {
    pub name: Box<str>,
    pub ty: Type,
    pub value: u64,
}

/// A C type. Cheap to copy by value; any recursive structure lives in the
/// arena and is reached through `payload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    pub specifier: Specifier,
    pub qualifiers: Qualifiers,
    /// `0` means "natural alignment for the specifier".
    pub alignment: u32,
    pub payload: Payload,
}

impl Type {
    /// Builds a fundamental (non-derived) type with no payload and default
    /// qualifiers/alignment — the common case for specifier finalization.
    pub fn fundamental(specifier: Specifier) -> Type {
        Type {
            specifier,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::None,
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Type {
        self.qualifiers = qualifiers;
        self
    }

    pub const VOID: Type = Type {
        specifier: Specifier::Void,
        qualifiers: Qualifiers::NONE,
        alignment: 0,
        payload: Payload::None,
    };

    pub const INT: Type = Type {
        specifier: Specifier::Int,
        qualifiers: Qualifiers::NONE,
        alignment: 0,
        payload: Payload::None,
    };

    pub fn is_void_unqualified(&self) -> bool {
        self.specifier == Specifier::Void && self.qualifiers.is_empty()
    }
}
