//! The type dump format (spec §6): a deliberately foreign rendering used
//! only for tests and diagnostics, chosen to make derived-type precedence
//! unambiguous without C's "declaration follows use" puzzle.
//!
//! `int (*a[10])(char c)` dumps as `[10]*fn (c: char) int`.

use std::fmt::Write as _;

use crate::arena::TypeArena;
use crate::ty::{Payload, Qualifiers, Specifier, Type};

pub fn dump(t: Type, arena: &TypeArena) -> String {
    let mut out = String::new();
    write_type(&mut out, t, arena);
    out
}

fn write_qualifiers(out: &mut String, q: Qualifiers) {
    if q.const_ {
        out.push_str("const ");
    }
    if q.volatile {
        out.push_str("volatile ");
    }
    if q.restrict {
        out.push_str("restrict ");
    }
    if q.atomic {
        out.push_str("_Atomic ");
    }
}

fn write_type(out: &mut String, t: Type, arena: &TypeArena) {
    write_qualifiers(out, t.qualifiers);

    match t.specifier {
        Specifier::Pointer => {
            out.push('*');
            if let Payload::Pointee(id) = t.payload {
                write_type(out, *arena.pointee(id), arena);
            }
        }
        Specifier::Array | Specifier::StaticArray => {
            if let Payload::Array(id) = t.payload {
                let array = arena.array(id);
                if t.specifier == Specifier::StaticArray {
                    let _ = write!(out, "[static {}]", array.len);
                } else {
                    let _ = write!(out, "[{}]", array.len);
                }
                write_type(out, array.element, arena);
            }
        }
        Specifier::IncompleteArray => {
            out.push_str("[]");
            if let Payload::Array(id) = t.payload {
                write_type(out, arena.array(id).element, arena);
            }
        }
        Specifier::VariableLenArray => {
            out.push_str("[*]");
            if let Payload::Vla(id) = t.payload {
                write_type(out, arena.vla(id).element, arena);
            }
        }
        Specifier::UnspecifiedVariableLenArray => {
            out.push_str("[*]");
            if let Payload::Pointee(id) = t.payload {
                write_type(out, *arena.pointee(id), arena);
            }
        }
        Specifier::Func | Specifier::VarArgsFunc | Specifier::OldStyleFunc => {
            if let Payload::Function(id) = t.payload {
                let func = arena.function(id);
                out.push_str("fn (");
                for (i, param) in func.parameters.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if !param.name.is_empty() {
                        let _ = write!(out, "{}: ", param.name);
                    }
                    write_type(out, param.ty, arena);
                }
                if t.specifier == Specifier::VarArgsFunc {
                    if !func.parameters.is_empty() {
                        out.push_str(", ");
                    }
                    out.push_str("...");
                }
                out.push_str(") ");
                write_type(out, func.return_type, arena);
            }
        }
        Specifier::Struct | Specifier::Union => {
            if let Payload::Record(id) = t.payload {
                let record = arena.record(id);
                out.push_str(if t.specifier == Specifier::Struct {
                    "struct "
                } else {
                    "union "
                });
                if record.name.is_empty() {
                    out.push_str("<anonymous>");
                } else {
                    out.push_str(&record.name);
                }
            }
        }
        Specifier::Enum => {
            if let Payload::Enum(id) = t.payload {
                let e = arena.enum_(id);
                out.push_str("enum ");
                if e.name.is_empty() {
                    out.push_str("<anonymous>");
                } else {
                    out.push_str(&e.name);
                }
            }
        }
        other => out.push_str(fundamental_name(other)),
    }

    if t.alignment != 0 {
        let _ = write!(out, " _Alignas({})", t.alignment);
    }
}

fn fundamental_name(s: Specifier) -> &'static str {
    use Specifier::*;
    match s {
        Void => "void",
        Bool => "bool",
        Char => "char",
        SChar => "schar",
        UChar => "uchar",
        Short => "short",
        UShort => "ushort",
        Int => "int",
        UInt => "uint",
        Long => "long",
        ULong => "ulong",
        LongLong => "long_long",
        ULongLong => "ulong_long",
        Float => "float",
        Double => "double",
        LongDouble => "long_double",
        ComplexFloat => "complex_float",
        ComplexDouble => "complex_double",
        ComplexLongDouble => "complex_long_double",
        _ => unreachable!("fundamental_name called on a derived specifier"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Array, Function, Parameter};

    #[test]
    fn plain_int() {
        let arena = TypeArena::new();
        assert_eq!(dump(Type::INT, &arena), "int");
    }

    #[test]
    fn const_pointer_to_int() {
        // `const int *p` — pointer to const int.
        let mut arena = TypeArena::new();
        let const_int = Type::INT.with_qualifiers(Qualifiers {
            const_: true,
            ..Qualifiers::NONE
        });
        let id = arena.alloc_pointee(const_int);
        let ptr = Type {
            specifier: Specifier::Pointer,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Pointee(id),
        };
        assert_eq!(dump(ptr, &arena), "*const int");
    }

    #[test]
    fn pointer_const_to_int() {
        // `int *const p` — const pointer to int.
        let mut arena = TypeArena::new();
        let id = arena.alloc_pointee(Type::INT);
        let ptr = Type {
            specifier: Specifier::Pointer,
            qualifiers: Qualifiers {
                const_: true,
                ..Qualifiers::NONE
            },
            alignment: 0,
            payload: Payload::Pointee(id),
        };
        assert_eq!(dump(ptr, &arena), "const *int");
    }

    #[test]
    fn array_of_pointers_to_function() {
        // `int (*a[10])(char c)` => `[10]*fn (c: char) int`
        let mut arena = TypeArena::new();
        let func_id = arena.alloc_function(Function {
            return_type: Type::INT,
            parameters: vec![Parameter {
                name: "c".into(),
                ty: Type::fundamental(Specifier::Char),
                register: false,
            }],
        });
        let func_ty = Type {
            specifier: Specifier::Func,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Function(func_id),
        };
        let ptr_id = arena.alloc_pointee(func_ty);
        let ptr_ty = Type {
            specifier: Specifier::Pointer,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Pointee(ptr_id),
        };
        let array_id = arena.alloc_array(Array {
            element: ptr_ty,
            len: 10,
        });
        let array_ty = Type {
            specifier: Specifier::Array,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Array(array_id),
        };
        assert_eq!(dump(array_ty, &arena), "[10]*fn (c: char) int");
    }

    #[test]
    fn function_returning_pointer() {
        // `int *f(void);` => `fn () *int`
        let mut arena = TypeArena::new();
        let int_ptr_id = arena.alloc_pointee(Type::INT);
        let ret = Type {
            specifier: Specifier::Pointer,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Pointee(int_ptr_id),
        };
        let func_id = arena.alloc_function(Function {
            return_type: ret,
            parameters: vec![],
        });
        let func_ty = Type {
            specifier: Specifier::Func,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Function(func_id),
        };
        assert_eq!(dump(func_ty, &arena), "fn () *int");
    }
}
