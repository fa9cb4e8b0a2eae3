//! The `combine` operation (spec §4.2, §4.3): grafts an outer derived type
//! into the innermost slot of an already-assembled inner type.
//!
//! This is the operation that turns declarator-parse order (which reads
//! outside-in) into type structure (which is built inside-out): `*a[10]`
//! parses pointer-then-array, but means "array of pointers", so the array
//! layer has to be grafted under the pointer, not over it.

use thiserror::Error;

use crate::arena::{Array, TypeArena, Vla};
use crate::target::Target;
use crate::token::TokenId;
use crate::ty::{ops, Payload, Qualifiers, Specifier, Type};

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CombineError {
    #[error("array element type must be complete")]
    IncompleteArrayElement,
    #[error("array element type may not be a function")]
    FunctionArrayElement,
    #[error("'static' array bound may not appear nested inside another array")]
    NestedStaticArray,
    #[error("function may not return an array type")]
    FunctionReturningArray,
    #[error("function may not return a function type")]
    FunctionReturningFunction,
}

/// Grafts `outer` into the innermost non-derived slot of `inner`, returning
/// the reassembled type. `at_token` is carried only so callers can attach a
/// diagnostic location; this function itself never touches the diagnostic
/// sink — it is the Declarator Parser's job to report [`CombineError`] (spec
/// §4.2 "Each violation emits a diagnostic tagged to `at_token`").
pub fn combine(
    inner: Type,
    outer: Type,
    at_token: TokenId,
    arena: &mut TypeArena,
    target: &Target,
) -> Result<Type, CombineError> {
    let _ = at_token; // carried for caller diagnostics only
    combine_at(inner, outer, arena, target, false)
}

/// `nested` is `true` once we have descended into at least one array/VLA
/// layer, so we can reject a `static_array` constructor that isn't the
/// outermost one (invariant 2 of spec §3).
fn combine_at(
    inner: Type,
    outer: Type,
    arena: &mut TypeArena,
    target: &Target,
    nested: bool,
) -> Result<Type, CombineError> {
    match inner.payload {
        Payload::Pointee(id) => {
            let pointee = *arena.pointee(id);
            let grafted = combine_at(pointee, outer, arena, target, nested)?;
            let new_id = arena.alloc_pointee(grafted);
            Ok(Type {
                payload: Payload::Pointee(new_id),
                ..inner
            })
        }
        Payload::Array(id) => {
            if inner.specifier == Specifier::StaticArray && nested {
                return Err(CombineError::NestedStaticArray);
            }
            let array = arena.array(id).clone();
            let grafted = combine_at(array.element, outer, arena, target, true)?;
            validate_array_element(grafted, arena)?;
            let new_id = arena.alloc_array(Array {
                element: grafted,
                len: array.len,
            });
            Ok(Type {
                payload: Payload::Array(new_id),
                ..inner
            })
        }
        Payload::Vla(id) => {
            if inner.specifier == Specifier::UnspecifiedVariableLenArray && nested {
                return Err(CombineError::NestedStaticArray);
            }
            let vla = arena.vla(id).clone();
            let grafted = combine_at(vla.element, outer, arena, target, true)?;
            validate_array_element(grafted, arena)?;
            let new_id = arena.alloc_vla(Vla {
                element: grafted,
                len_expr: vla.len_expr,
            });
            Ok(Type {
                payload: Payload::Vla(new_id),
                ..inner
            })
        }
        Payload::Function(id) => {
            let func = arena.function(id).clone();
            let grafted = combine_at(func.return_type, outer, arena, target, nested)?;
            validate_function_return(grafted)?;
            let new_id = arena.alloc_function(crate::arena::Function {
                return_type: grafted,
                parameters: func.parameters,
            });
            Ok(Type {
                payload: Payload::Function(new_id),
                ..inner
            })
        }
        // Innermost non-derived slot: overwrite with `outer`.
        Payload::None | Payload::Record(_) | Payload::Enum(_) => Ok(outer),
    }
}

fn validate_array_element(element: Type, arena: &TypeArena) -> Result<(), CombineError> {
    if element.specifier.is_func() {
        return Err(CombineError::FunctionArrayElement);
    }
    if ops::has_incomplete_size(element, arena) {
        return Err(CombineError::IncompleteArrayElement);
    }
    Ok(())
}

fn validate_function_return(ret: Type) -> Result<(), CombineError> {
    if ret.specifier.is_array() {
        return Err(CombineError::FunctionReturningArray);
    }
    if ret.specifier.is_func() {
        return Err(CombineError::FunctionReturningFunction);
    }
    Ok(())
}

/// Grafts `outer` into `inner` without enforcing any of [`combine`]'s
/// validity rules. Used by the Declarator Parser to make forward progress
/// after it has already reported a [`CombineError`] as a diagnostic — the
/// "reported and continued" half of spec §7, where `combine`'s own
/// violations are diagnostics, not `parsing-failed` aborts.
pub fn combine_unchecked(inner: Type, outer: Type, arena: &mut TypeArena) -> Type {
    match inner.payload {
        Payload::Pointee(id) => {
            let pointee = *arena.pointee(id);
            let grafted = combine_unchecked(pointee, outer, arena);
            let new_id = arena.alloc_pointee(grafted);
            Type {
                payload: Payload::Pointee(new_id),
                ..inner
            }
        }
        Payload::Array(id) => {
            let array = arena.array(id).clone();
            let grafted = combine_unchecked(array.element, outer, arena);
            let new_id = arena.alloc_array(Array {
                element: grafted,
                len: array.len,
            });
            Type {
                payload: Payload::Array(new_id),
                ..inner
            }
        }
        Payload::Vla(id) => {
            let vla = arena.vla(id).clone();
            let grafted = combine_unchecked(vla.element, outer, arena);
            let new_id = arena.alloc_vla(Vla {
                element: grafted,
                len_expr: vla.len_expr,
            });
            Type {
                payload: Payload::Vla(new_id),
                ..inner
            }
        }
        Payload::Function(id) => {
            let func = arena.function(id).clone();
            let grafted = combine_unchecked(func.return_type, outer, arena);
            let new_id = arena.alloc_function(crate::arena::Function {
                return_type: grafted,
                parameters: func.parameters,
            });
            Type {
                payload: Payload::Function(new_id),
                ..inner
            }
        }
        Payload::None | Payload::Record(_) | Payload::Enum(_) => outer,
    }
}

/// Convenience used by the Declarator Parser to wrap a base type in a new
/// pointer layer (spec §4.3 "pointer prefix wraps ... in a new `pointer`
/// Type"). Not itself `combine` — there is nothing to recurse into yet.
pub fn wrap_pointer(base: Type, qualifiers: Qualifiers, arena: &mut TypeArena) -> Type {
    let id = arena.alloc_pointee(base);
    Type {
        specifier: Specifier::Pointer,
        qualifiers,
        alignment: 0,
        payload: Payload::Pointee(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Parameter;

    fn target() -> Target {
        Target::LINUX_X86_64
    }

    #[test]
    fn array_of_pointers_combine() {
        // Inner: `[10]`(array of int), outer: `*`(pointer to int) grafted
        // into the array's element slot gives "array of 10 pointers".
        let mut arena = TypeArena::new();
        let array_id = arena.alloc_array(Array {
            element: Type::INT,
            len: 10,
        });
        let inner = Type {
            specifier: Specifier::Array,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Array(array_id),
        };
        let outer = Type::INT; // pretend `*` already wrapped elsewhere
        let result = combine(inner, outer, 0, &mut arena, &target()).unwrap();
        match result.payload {
            Payload::Array(id) => assert_eq!(arena.array(id).element, Type::INT),
            _ => panic!("expected array payload"),
        }
    }

    #[test]
    fn function_returning_array_is_rejected() {
        let mut arena = TypeArena::new();
        let func_id = arena.alloc_function(crate::arena::Function {
            return_type: Type::INT,
            parameters: vec![],
        });
        let inner = Type {
            specifier: Specifier::Func,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Function(func_id),
        };
        let array_id = arena.alloc_array(Array {
            element: Type::INT,
            len: 4,
        });
        let outer = Type {
            specifier: Specifier::Array,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Array(array_id),
        };
        let err = combine(inner, outer, 0, &mut arena, &target()).unwrap_err();
        assert_eq!(err, CombineError::FunctionReturningArray);
    }

    #[test]
    fn incomplete_array_element_is_rejected() {
        let mut arena = TypeArena::new();
        let outer_array_id = arena.alloc_array(Array {
            element: Type::INT,
            len: 3,
        });
        let inner = Type {
            specifier: Specifier::Array,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Array(outer_array_id),
        };
        let incomplete_array = Type::fundamental(Specifier::IncompleteArray);
        let err = combine(inner, incomplete_array, 0, &mut arena, &target()).unwrap_err();
        assert_eq!(err, CombineError::IncompleteArrayElement);
    }

    #[test]
    fn parameter_list_is_preserved_through_combine() {
        let mut arena = TypeArena::new();
        let func_id = arena.alloc_function(crate::arena::Function {
            return_type: Type::INT,
            parameters: vec![Parameter {
                name: "c".into(),
                ty: Type::fundamental(Specifier::Char),
                register: false,
            }],
        });
        let inner = Type {
            specifier: Specifier::Func,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Function(func_id),
        };
        let outer = Type::INT;
        let result = combine(inner, outer, 0, &mut arena, &target()).unwrap();
        match result.payload {
            Payload::Function(id) => assert_eq!(arena.function(id).parameters.len(), 1),
            _ => panic!("expected function payload"),
        }
    }
}
