//! Semantic queries over [`Type`] (spec §4.2).

use crate::arena::TypeArena;
use crate::target::Target;
use crate::ty::{Payload, Qualifiers, Specifier, Type};

/// If `t` is a function type, or a pointer to one, returns the function
/// type itself (pointers decay transparently for call expressions; spec
/// §4.2, "if pointer, recurses into the pointee").
pub fn is_callable(t: Type, arena: &TypeArena) -> Option<Type> {
    match t.specifier {
        s if s.is_func() => Some(t),
        Specifier::Pointer => {
            if let Payload::Pointee(id) = t.payload {
                is_callable(*arena.pointee(id), arena)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// True for the unsigned integer specifiers; false for signed ones
/// (including `schar`). For bare `char`, the compilation context decides
/// (char signedness is target-defined, invariant 8 of spec §3).
pub fn is_unsigned_int(t: Type, target: &Target) -> bool {
    match t.specifier {
        Specifier::UChar
        | Specifier::UShort
        | Specifier::UInt
        | Specifier::ULong
        | Specifier::ULongLong => true,
        Specifier::SChar => false,
        Specifier::Char => !target.char_is_signed,
        _ => false,
    }
}

/// The element type of a pointer, (unspecified-)VLA or array; `None` for
/// anything else.
pub fn elem_type(t: Type, arena: &TypeArena) -> Option<Type> {
    match (t.specifier, t.payload) {
        (Specifier::Pointer, Payload::Pointee(id))
        | (Specifier::UnspecifiedVariableLenArray, Payload::Pointee(id)) => {
            Some(*arena.pointee(id))
        }
        (s, Payload::Array(id)) if s.is_array() => Some(arena.array(id).element),
        (Specifier::VariableLenArray, Payload::Vla(id)) => Some(arena.vla(id).element),
        _ => None,
    }
}

/// C's integer-promotion rules (spec §4.2). Promotion on anything already
/// `int`-or-wider is the identity, which is what makes repeated promotion
/// idempotent (spec §8 invariant).
pub fn integer_promotion(t: Type, target: &Target) -> Type {
    use Specifier::*;
    match t.specifier {
        Bool | Char | SChar | UChar | Short => Type::fundamental(Int),
        UShort => {
            // `int` can hold every `unsigned short` value iff it is wider.
            if sizeof(Type::fundamental(UShort), target, None).unwrap()
                < sizeof(Type::fundamental(Int), target, None).unwrap()
            {
                Type::fundamental(Int)
            } else {
                Type::fundamental(UInt)
            }
        }
        _ => t,
    }
}

/// `true` iff `sizeof` would return `None` for this type — incomplete
/// arrays, VLAs, and incomplete records/enums.
pub fn has_incomplete_size(t: Type, arena: &TypeArena) -> bool {
    match t.specifier {
        Specifier::Void
        | Specifier::VariableLenArray
        | Specifier::UnspecifiedVariableLenArray
        | Specifier::IncompleteArray => true,
        Specifier::Struct | Specifier::Union => match t.payload {
            Payload::Record(id) => arena.record(id).is_incomplete(),
            _ => true,
        },
        Specifier::Enum => match t.payload {
            Payload::Enum(id) => !arena.enum_(id).complete,
            _ => true,
        },
        _ => false,
    }
}

/// Size in bytes of a complete type, or `None` for anything incomplete
/// (spec §4.2; `sizeof` returns `None` iff `has_incomplete_size` is true).
///
/// `arena` is optional only so that fundamental-type sizes can be computed
/// without one in `integer_promotion`'s self-recursion above; callers with
/// a derived type must pass a real arena.
pub fn sizeof(t: Type, target: &Target, arena: Option<&TypeArena>) -> Option<u32> {
    use Specifier::*;
    Some(match t.specifier {
        Void => return None, // `sizeof(void)` is a GNU extension, not core C11; reject it.
        Bool | Char | SChar | UChar => 1,
        Short | UShort => 2,
        Int | UInt | Float => 4,
        Long | ULong => target.long_bytes(),
        LongLong | ULongLong | Double | ComplexFloat => 8,
        LongDouble => 16,
        ComplexDouble => 16,
        ComplexLongDouble => 32,
        Pointer | StaticArray => target.pointer_bytes(),
        VariableLenArray | UnspecifiedVariableLenArray | IncompleteArray => return None,
        Array => {
            let arena = arena.expect("sizeof(array) requires an arena");
            let id = match t.payload {
                Payload::Array(id) => id,
                _ => unreachable!("array specifier without array payload"),
            };
            let array = arena.array(id);
            let elem_size = sizeof(array.element, target, Some(arena))?;
            elem_size * array.len as u32
        }
        Func | VarArgsFunc | OldStyleFunc => return None,
        Struct | Union => {
            let arena = arena.expect("sizeof(record) requires an arena");
            let id = match t.payload {
                Payload::Record(id) => id,
                _ => unreachable!("record specifier without record payload"),
            };
            let record = arena.record(id);
            if record.is_incomplete() {
                return None;
            }
            record.size
        }
        Enum => {
            let arena = arena.expect("sizeof(enum) requires an arena");
            let id = match t.payload {
                Payload::Enum(id) => id,
                _ => unreachable!("enum specifier without enum payload"),
            };
            let e = arena.enum_(id);
            if !e.complete {
                return None;
            }
            sizeof(e.tag_type, target, Some(arena))?
        }
    })
}

/// Structural equality (spec §4.2), with record/enum identity compared by
/// arena index rather than structurally (invariant in spec §3).
pub fn eql(a: Type, b: Type, check_qualifiers: bool, arena: &TypeArena) -> bool {
    if a.specifier != b.specifier {
        return false;
    }
    if a.alignment != b.alignment {
        return false;
    }
    if check_qualifiers && a.qualifiers != b.qualifiers {
        return false;
    }

    match (a.payload, b.payload) {
        (Payload::None, Payload::None) => true,
        (Payload::Pointee(pa), Payload::Pointee(pb)) => {
            eql(*arena.pointee(pa), *arena.pointee(pb), check_qualifiers, arena)
        }
        (Payload::Array(ia), Payload::Array(ib)) => {
            let (aa, ab) = (arena.array(ia), arena.array(ib));
            aa.len == ab.len && eql(aa.element, ab.element, check_qualifiers, arena)
        }
        (Payload::Vla(ia), Payload::Vla(ib)) => {
            let (va, vb) = (arena.vla(ia), arena.vla(ib));
            eql(va.element, vb.element, check_qualifiers, arena)
        }
        (Payload::Function(ia), Payload::Function(ib)) => {
            let (fa, fb) = (arena.function(ia), arena.function(ib));
            if fa.parameters.len() != fb.parameters.len() {
                return false;
            }
            if !eql(fa.return_type, fb.return_type, check_qualifiers, arena) {
                return false;
            }
            fa.parameters
                .iter()
                .zip(fb.parameters.iter())
                .all(|(pa, pb)| eql(pa.ty, pb.ty, true, arena))
        }
        // Records/enums: identity equality — same arena slot.
        (Payload::Record(ia), Payload::Record(ib)) => ia == ib,
        (Payload::Enum(ia), Payload::Enum(ib)) => ia == ib,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::TypeArena;

    #[test]
    fn promotion_is_idempotent_on_int_or_wider() {
        let target = Target::LINUX_X86_64;
        for s in [
            Specifier::Int,
            Specifier::UInt,
            Specifier::Long,
            Specifier::ULongLong,
        ] {
            let t = Type::fundamental(s);
            assert_eq!(integer_promotion(t, &target), t);
        }
    }

    #[test]
    fn promotion_widens_small_integers() {
        let target = Target::LINUX_X86_64;
        assert_eq!(
            integer_promotion(Type::fundamental(Specifier::Char), &target).specifier,
            Specifier::Int
        );
        assert_eq!(
            integer_promotion(Type::fundamental(Specifier::Bool), &target).specifier,
            Specifier::Int
        );
    }

    #[test]
    fn ushort_promotes_to_int_when_int_is_wider() {
        let target = Target::LINUX_X86_64;
        // sizeof(ushort) = 2 < sizeof(int) = 4 on every target this crate models.
        assert_eq!(
            integer_promotion(Type::fundamental(Specifier::UShort), &target).specifier,
            Specifier::Int
        );
    }

    #[test]
    fn sizeof_long_follows_data_model() {
        assert_eq!(
            sizeof(Type::fundamental(Specifier::Long), &Target::LINUX_X86_64, None),
            Some(8)
        );
        assert_eq!(
            sizeof(Type::fundamental(Specifier::Long), &Target::WINDOWS_X86_64, None),
            Some(4)
        );
    }

    #[test]
    fn sizeof_none_iff_incomplete() {
        let arena = TypeArena::new();
        let t = Type::fundamental(Specifier::IncompleteArray);
        assert!(has_incomplete_size(t, &arena));
        assert_eq!(sizeof(t, &Target::LINUX_X86_64, Some(&arena)), None);

        let t = Type::fundamental(Specifier::Int);
        assert!(!has_incomplete_size(t, &arena));
        assert!(sizeof(t, &Target::LINUX_X86_64, Some(&arena)).is_some());
    }

    #[test]
    fn void_is_incomplete_and_has_no_size() {
        let arena = TypeArena::new();
        let t = Type::fundamental(Specifier::Void);
        assert!(has_incomplete_size(t, &arena));
        assert_eq!(sizeof(t, &Target::LINUX_X86_64, Some(&arena)), None);
    }

    #[test]
    fn is_callable_follows_a_pointer_to_its_function_pointee() {
        use crate::arena::{Function, Parameter};

        let mut arena = TypeArena::new();
        let func_id = arena.alloc_function(Function {
            return_type: Type::fundamental(Specifier::Int),
            parameters: Vec::<Parameter>::new(),
        });
        let func_ty = Type {
            specifier: Specifier::Func,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Function(func_id),
        };
        let pointee_id = arena.alloc_pointee(func_ty);
        let ptr_ty = Type {
            specifier: Specifier::Pointer,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Pointee(pointee_id),
        };

        assert!(is_callable(func_ty, &arena).is_some());
        assert!(is_callable(ptr_ty, &arena).is_some());
        assert!(is_callable(Type::fundamental(Specifier::Int), &arena).is_none());
    }

    #[test]
    fn eql_is_reflexive_and_symmetric_for_fundamentals() {
        let arena = TypeArena::new();
        let a = Type::fundamental(Specifier::Int).with_qualifiers(Qualifiers {
            const_: true,
            ..Qualifiers::NONE
        });
        let b = a;
        assert!(eql(a, b, true, &arena));
        assert!(eql(b, a, true, &arena));
    }

    #[test]
    fn char_signedness_is_target_defined() {
        let signed_target = Target::LINUX_X86_64;
        let unsigned_target = Target::LINUX_AARCH64;
        let char_ty = Type::fundamental(Specifier::Char);
        assert!(!is_unsigned_int(char_ty, &signed_target));
        assert!(is_unsigned_int(char_ty, &unsigned_target));
    }
}
