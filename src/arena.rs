//! The translation-unit arena (spec §3 "Ownership & lifecycle").
//!
//! `Function`, `Array`, `Vla`, `Record` and `Enum` descriptors, plus the
//! pointee of a pointer type, are never embedded directly in a [`crate::ty::Type`]
//! value — they live in one arena per translation unit and are referenced
//! by index. This keeps `Type` cheap to copy (it is a plain value with a
//! tag and a small index) and gives records and enums identity: two
//! `Type`s pointing at the same `RecordId` are the same record, even
//! across forward declarations.

use custom_debug_derive::CustomDebug;

use crate::ty::{Enumerator, Field, Type};

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            fn new(index: usize) -> Self {
                $name(index as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(PointeeId);
arena_id!(FunctionId);
arena_id!(ArrayId);
arena_id!(VlaId);
arena_id!(RecordId);
arena_id!(EnumId);

/// Sentinel used in [`Record::size`]/[`Enum`] bookkeeping to mean "body not
/// yet parsed" (invariant 7 of spec §3). Chosen to be unambiguous: no real
/// struct is anywhere near `u32::MAX` bytes.
pub const INCOMPLETE: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct Function {
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Box<str>,
    pub ty: Type,
    pub register: bool,
}

#[derive(Debug, Clone)]
pub struct Array {
    pub element: Type,
    pub len: u64,
}

#[derive(Debug, Clone)]
pub struct Vla {
    pub element: Type,
    /// Opaque handle into the external expression evaluator; the core
    /// never inspects it.
    pub len_expr: ExprHandle,
}

/// Opaque reference to a length/bound expression node owned by the
/// (external) expression evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprHandle(pub u32);

#[derive(CustomDebug, Clone)]
pub struct Record {
    pub name: Box<str>,
    pub is_union: bool,
    #[debug(skip)]
    pub fields: Vec<Field>,
    pub size: u32,
    pub alignment: u32,
}

impl Record {
    pub fn is_incomplete(&self) -> bool {
        self.size == INCOMPLETE
    }
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: Box<str>,
    pub tag_type: Type,
    pub enumerators: Vec<Enumerator>,
    /// `true` once the `{ ... }` body has been parsed.
    pub complete: bool,
}

/// Owns every auxiliary descriptor for one translation unit.
///
/// A `TypeArena` is created when a translation unit begins parsing and
/// dropped (together with every `Type` that references it) when the unit's
/// AST is discarded; no `Type` outlives its arena.
#[derive(Debug, Default)]
pub struct TypeArena {
    pointees: Vec<Type>,
    functions: Vec<Function>,
    arrays: Vec<Array>,
    vlas: Vec<Vla>,
    records: Vec<Record>,
    enums: Vec<Enum>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_pointee(&mut self, ty: Type) -> PointeeId {
        self.pointees.push(ty);
        PointeeId::new(self.pointees.len() - 1)
    }

    pub fn pointee(&self, id: PointeeId) -> &Type {
        &self.pointees[id.index()]
    }

    pub fn alloc_function(&mut self, f: Function) -> FunctionId {
        self.functions.push(f);
        FunctionId::new(self.functions.len() - 1)
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    /// Used to backfill K&R old-style parameter types once their separate
    /// declarations between the parameter list and the function body have
    /// been parsed (spec §4.4).
    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    pub fn alloc_array(&mut self, a: Array) -> ArrayId {
        self.arrays.push(a);
        ArrayId::new(self.arrays.len() - 1)
    }

    pub fn array(&self, id: ArrayId) -> &Array {
        &self.arrays[id.index()]
    }

    pub fn alloc_vla(&mut self, v: Vla) -> VlaId {
        self.vlas.push(v);
        VlaId::new(self.vlas.len() - 1)
    }

    pub fn vla(&self, id: VlaId) -> &Vla {
        &self.vlas[id.index()]
    }

    /// Allocates a new, incomplete record and returns its id. Used so a
    /// `struct node *` can reference the record before `{ ... }` is parsed
    /// (spec §9 "Cyclic type references").
    pub fn alloc_record(&mut self, name: Box<str>, is_union: bool) -> RecordId {
        self.records.push(Record {
            name,
            is_union,
            fields: Vec::new(),
            size: INCOMPLETE,
            alignment: 0,
        });
        RecordId::new(self.records.len() - 1)
    }

    pub fn record(&self, id: RecordId) -> &Record {
        &self.records[id.index()]
    }

    /// Completes a record in place (invariant 7): every `Type` already
    /// holding this `RecordId` observes the completed body because they
    /// share the descriptor, not a copy.
    pub fn complete_record(&mut self, id: RecordId, fields: Vec<Field>, size: u32, alignment: u32) {
        let record = &mut self.records[id.index()];
        record.fields = fields;
        record.size = size;
        record.alignment = alignment;
    }

    pub fn alloc_enum(&mut self, name: Box<str>, tag_type: Type) -> EnumId {
        self.enums.push(Enum {
            name,
            tag_type,
            enumerators: Vec::new(),
            complete: false,
        });
        EnumId::new(self.enums.len() - 1)
    }

    pub fn enum_(&self, id: EnumId) -> &Enum {
        &self.enums[id.index()]
    }

    pub fn complete_enum(&mut self, id: EnumId, enumerators: Vec<Enumerator>) {
        let e = &mut self.enums[id.index()];
        e.enumerators = enumerators;
        e.complete = true;
    }
}
