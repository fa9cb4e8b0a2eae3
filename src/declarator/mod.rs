//! The Declarator Parser (spec §4.3).
//!
//! Recursive descent over the token stream, assembling the derived-type
//! graph inside-out via [`crate::ty::combine`]. The tricky case is a
//! parenthesized sub-declarator: its pointer/suffix chain is parsed against
//! a placeholder ("hole") base, and only once the real base's own
//! pointer-and-suffix chain is known does `combine` graft the real base
//! into the hole's position.

#[cfg(test)]
mod tests;

use crate::arena::{Array, Function, Parameter, TypeArena, Vla};
use crate::diagnostic::{Diagnostic, DiagnosticSink, DiagnosticTag, Extra};
use crate::error::{Error, Result, SyntaxError};
use crate::scope::Scope;
use crate::target::Target;
use crate::token::{Keyword, Punctuator, TokenCursor, TokenId, TokenKind};
use crate::ty::{self, CombineError, Payload, Qualifiers, Specifier, Type};

/// A length/bound expression node, or the fact that the parser determined
/// it is not a compile-time constant. The expression grammar itself is an
/// external collaborator (spec §1); this crate only needs to know which
/// case it got.
#[derive(Debug, Clone, Copy)]
pub enum ConstExpr {
    Constant(u64),
    NonConstant(crate::arena::ExprHandle),
}

/// Parses one expression starting at the cursor, stopping before the
/// bound's closing `]`. Implemented by the embedding compiler's expression
/// evaluator; the Declarator Parser only calls it and inspects the result.
pub trait ExprEvaluator {
    fn parse_bound(&mut self, cursor: &mut TokenCursor) -> Result<ConstExpr>;

    /// Parses one expression starting at the cursor, stopping before the
    /// next `,` or `)`. Used by the Declaration Coordinator for
    /// `_Static_assert`'s condition, bit-field widths, enumerator values,
    /// `_Alignas` operands, and initializer expressions.
    fn parse_constant_expression(&mut self, cursor: &mut TokenCursor) -> Result<ConstExpr>;
}

/// Parses one parameter's decl-specifier sequence (type-specifiers and
/// qualifiers; no storage class other than `register`, which the
/// Declarator Parser consumes itself) into a finalized, already-qualified
/// base [`Type`].
///
/// Implemented by the Declaration Coordinator, which owns the Specifier
/// Builder; injected here so the two components can call each other
/// without a compile-time module cycle (spec §4.3/§4.4 describe parameter
/// lists and top-level declarations as mutually recursive grammar).
pub trait SpecifierParser {
    fn parse_parameter_specifiers(
        &mut self,
        cursor: &mut TokenCursor,
        arena: &mut TypeArena,
        scope: &Scope,
        sink: &mut dyn DiagnosticSink,
        exprs: &mut dyn ExprEvaluator,
    ) -> Result<Type>;
}

/// The result of parsing one declarator or abstract declarator.
#[derive(Debug, Clone)]
pub struct Declarator {
    /// `0` for an abstract declarator.
    pub name_token: TokenId,
    pub ty: Type,
    /// `true` iff the outermost derived constructor is a function.
    pub is_function: bool,
    /// `true` iff a parameter list used the old-style (K&R) identifier-list
    /// form rather than typed parameters.
    pub is_old_style: bool,
}

/// Placeholder base used while parsing the inside of `'(' declarator ')'`;
/// its specifier is never observed because `combine` always overwrites it.
fn hole() -> Type {
    Type::VOID
}

struct Ctx<'a> {
    arena: &'a mut TypeArena,
    target: &'a Target,
    scope: &'a Scope,
    sink: &'a mut dyn DiagnosticSink,
    exprs: &'a mut dyn ExprEvaluator,
    specifiers: &'a mut dyn SpecifierParser,
}

/// Parses a (named) declarator against `base`.
#[allow(clippy::too_many_arguments)]
pub fn parse_declarator(
    cursor: &mut TokenCursor,
    base: Type,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    specifiers: &mut dyn SpecifierParser,
) -> Result<Declarator> {
    let mut ctx = Ctx {
        arena,
        target,
        scope,
        sink,
        exprs,
        specifiers,
    };
    parse_declarator_inner(cursor, base, &mut ctx, false)
}

/// Parses an abstract declarator (no identifier permitted) against `base`.
#[allow(clippy::too_many_arguments)]
pub fn parse_abstract_declarator(
    cursor: &mut TokenCursor,
    base: Type,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    specifiers: &mut dyn SpecifierParser,
) -> Result<Declarator> {
    let mut ctx = Ctx {
        arena,
        target,
        scope,
        sink,
        exprs,
        specifiers,
    };
    parse_declarator_inner(cursor, base, &mut ctx, true)
}

fn parse_declarator_inner(
    cursor: &mut TokenCursor,
    base: Type,
    ctx: &mut Ctx,
    allow_abstract: bool,
) -> Result<Declarator> {
    let ptr_quals = parse_pointer_chain(cursor, ctx);
    let mut pointer_wrapped = base;
    for quals in ptr_quals {
        pointer_wrapped = ty::wrap_pointer(pointer_wrapped, quals, ctx.arena);
    }

    if let TokenKind::Identifier(_) = cursor.peek() {
        let tok = cursor.pos();
        cursor.bump();
        let ty = parse_direct_declarator_tail(cursor, pointer_wrapped, ctx)?;
        let is_function = ty.specifier.is_func();
        return Ok(Declarator {
            name_token: tok,
            ty,
            is_function,
            is_old_style: false,
        });
    }

    if cursor.is_punct(Punctuator::LParen) && looks_like_nested_declarator(cursor, ctx.scope) {
        cursor.bump();
        let inner = parse_declarator_inner(cursor, hole(), ctx, allow_abstract)?;
        if !cursor.eat_punct(Punctuator::RParen) {
            return Err(Error::Syntax(
                cursor.pos(),
                SyntaxError::Expected {
                    expected: "')'",
                    found: format!("{}", cursor.peek()),
                },
            ));
        }
        let outer = parse_direct_declarator_tail(cursor, pointer_wrapped, ctx)?;
        let at = cursor.pos();
        let combined = combine_reporting(inner.ty, outer, at, ctx);
        return Ok(Declarator {
            name_token: inner.name_token,
            is_function: outer_is_function(combined),
            ty: combined,
            is_old_style: inner.is_old_style,
        });
    }

    if allow_abstract {
        let ty = parse_direct_declarator_tail(cursor, pointer_wrapped, ctx)?;
        let is_function = ty.specifier.is_func();
        return Ok(Declarator {
            name_token: 0,
            ty,
            is_function,
            is_old_style: false,
        });
    }

    Err(Error::Syntax(
        cursor.pos(),
        SyntaxError::Expected {
            expected: "declarator",
            found: format!("{}", cursor.peek()),
        },
    ))
}

fn outer_is_function(t: Type) -> bool {
    t.specifier.is_func()
}

fn combine_reporting(inner: Type, outer: Type, at: TokenId, ctx: &mut Ctx) -> Type {
    match ty::combine(inner, outer, at, ctx.arena, ctx.target) {
        Ok(t) => t,
        Err(e) => {
            ctx.sink.report(Diagnostic {
                tag: combine_error_tag(e),
                token: at,
                extra: None,
            });
            ty::combine_unchecked(inner, outer, ctx.arena)
        }
    }
}

fn combine_error_tag(e: CombineError) -> DiagnosticTag {
    match e {
        CombineError::IncompleteArrayElement | CombineError::FunctionArrayElement => {
            DiagnosticTag::InvalidArrayElement
        }
        CombineError::NestedStaticArray => DiagnosticTag::ArrayQualifierNotOutermost,
        CombineError::FunctionReturningArray | CombineError::FunctionReturningFunction => {
            DiagnosticTag::InvalidFunctionReturn
        }
    }
}

/// `pointer = '*' type-qual* pointer?`, returned flattened as one
/// qualifier-set per `*`, in the order encountered (leftmost first).
fn parse_pointer_chain(cursor: &mut TokenCursor, ctx: &mut Ctx) -> Vec<Qualifiers> {
    let mut chain = Vec::new();
    while cursor.eat_punct(Punctuator::Star) {
        chain.push(parse_qualifier_list(cursor, ctx, true));
    }
    chain
}

fn parse_qualifier_list(cursor: &mut TokenCursor, ctx: &mut Ctx, on_pointer: bool) -> Qualifiers {
    let mut quals = Qualifiers::NONE;
    loop {
        let (bit, tag_name) = match cursor.peek() {
            TokenKind::Keyword(Keyword::Const) => (&mut quals.const_, "const"),
            TokenKind::Keyword(Keyword::Volatile) => (&mut quals.volatile, "volatile"),
            TokenKind::Keyword(Keyword::Restrict) => (&mut quals.restrict, "restrict"),
            TokenKind::Keyword(Keyword::Atomic) => (&mut quals.atomic, "_Atomic"),
            _ => break,
        };
        let at = cursor.pos();
        cursor.bump();
        if *bit {
            ctx.sink.report(Diagnostic {
                tag: DiagnosticTag::DuplicateQualifier,
                token: at,
                extra: Some(Extra::Text(tag_name.into())),
            });
        }
        *bit = true;
        if tag_name == "restrict" && !on_pointer {
            ctx.sink.report(Diagnostic {
                tag: DiagnosticTag::RestrictOnNonPointer,
                token: at,
                extra: None,
            });
        }
    }
    quals
}

/// `direct-decl = '[' array-bounds ']' | '(' param-list ')' | '(' ident-list? ')'`,
/// applied recursively against `base`.
///
/// The grammar is left-recursive (`direct-declarator direct-decl`), which
/// in `int a[3][4]` means the *leftmost* bracket is the outermost array
/// dimension ("array of 3 arrays of 4 ints"). Parsing this with a forward
/// loop would nest them backwards, so each suffix instead recurses first
/// to parse everything to its right, then wraps that result as its own
/// element/return type.
fn parse_direct_declarator_tail(cursor: &mut TokenCursor, base: Type, ctx: &mut Ctx) -> Result<Type> {
    parse_direct_declarator_tail_at(cursor, base, ctx, false)
}

/// `nested` is `true` once we have already descended into at least one
/// array dimension of this same suffix chain, so [`parse_array_suffix`]
/// can reject a `static`/unspecified-VLA bound that isn't the outermost
/// dimension (invariant 2 of spec §3) even though this direct-declarator
/// path never goes through [`ty::combine`].
fn parse_direct_declarator_tail_at(
    cursor: &mut TokenCursor,
    base: Type,
    ctx: &mut Ctx,
    nested: bool,
) -> Result<Type> {
    if cursor.eat_punct(Punctuator::LBracket) {
        parse_array_suffix(cursor, base, ctx, nested)
    } else if cursor.eat_punct(Punctuator::LParen) {
        parse_param_list_suffix(cursor, base, ctx)
    } else {
        Ok(base)
    }
}

fn parse_array_suffix(cursor: &mut TokenCursor, base: Type, ctx: &mut Ctx, nested: bool) -> Result<Type> {
    let start = cursor.pos();
    // `[` type-qual* `static`? type-qual* bound? `]` — qualifiers may
    // precede and/or follow `static`; both spellings are absorbed here.
    // Invariant 5 (spec §3): these qualifiers describe the element, not
    // the array constructor itself, so the merged set is only used to
    // detect duplicates/`restrict` misuse and is otherwise discarded.
    let mut quals = parse_qualifier_list(cursor, ctx, false);
    let is_static = cursor.eat_keyword(Keyword::Static);
    let (more, _) = quals.union_reporting_duplicates(parse_qualifier_list(cursor, ctx, false));
    quals = more;
    let _ = quals;

    let (specifier, array_len, vla_len): (Specifier, Option<u64>, Option<ConstExpr>) =
        if cursor.eat_punct(Punctuator::Star) {
            (Specifier::UnspecifiedVariableLenArray, None, None)
        } else if cursor.is_punct(Punctuator::RBracket) {
            (Specifier::IncompleteArray, None, None)
        } else {
            match ctx.exprs.parse_bound(cursor)? {
                ConstExpr::Constant(n) => (
                    if is_static {
                        Specifier::StaticArray
                    } else {
                        Specifier::Array
                    },
                    Some(n),
                    None,
                ),
                other @ ConstExpr::NonConstant(_) => (Specifier::VariableLenArray, None, Some(other)),
            }
        };

    if !cursor.eat_punct(Punctuator::RBracket) {
        return Err(Error::Syntax(
            cursor.pos(),
            SyntaxError::Expected {
                expected: "']'",
                found: format!("{}", cursor.peek()),
            },
        ));
    }

    // Recurse first: anything further right (`[4]` in `a[3][4]`) is the
    // element type of *this* dimension, one level deeper into the same
    // array chain.
    let element = parse_direct_declarator_tail_at(cursor, base, ctx, true)?;

    if element.specifier.is_func() || crate::ty::ops::has_incomplete_size(element, ctx.arena) {
        ctx.sink.report(Diagnostic {
            tag: DiagnosticTag::InvalidArrayElement,
            token: start,
            extra: None,
        });
    }

    if nested
        && matches!(
            specifier,
            Specifier::StaticArray | Specifier::UnspecifiedVariableLenArray
        )
    {
        ctx.sink.report(Diagnostic {
            tag: DiagnosticTag::ArrayQualifierNotOutermost,
            token: start,
            extra: None,
        });
    }

    let ty = match specifier {
        Specifier::UnspecifiedVariableLenArray => {
            let id = ctx.arena.alloc_pointee(element);
            Type {
                specifier,
                qualifiers: Qualifiers::NONE,
                alignment: 0,
                payload: Payload::Pointee(id),
            }
        }
        Specifier::VariableLenArray => {
            let len_expr = match vla_len {
                Some(ConstExpr::NonConstant(h)) => h,
                _ => unreachable!("VariableLenArray always carries a non-constant bound"),
            };
            let id = ctx.arena.alloc_vla(Vla {
                element,
                len_expr,
            });
            Type {
                specifier,
                qualifiers: Qualifiers::NONE,
                alignment: 0,
                payload: Payload::Vla(id),
            }
        }
        Specifier::IncompleteArray => {
            let id = ctx.arena.alloc_array(Array { element, len: 0 });
            Type {
                specifier,
                qualifiers: Qualifiers::NONE,
                alignment: 0,
                payload: Payload::Array(id),
            }
        }
        Specifier::Array | Specifier::StaticArray => {
            let id = ctx.arena.alloc_array(Array {
                element,
                len: array_len.unwrap_or(0),
            });
            Type {
                specifier,
                qualifiers: Qualifiers::NONE,
                alignment: 0,
                payload: Payload::Array(id),
            }
        }
        _ => unreachable!("array suffix always produces an array-family specifier"),
    };

    Ok(ty)
}

fn parse_param_list_suffix(cursor: &mut TokenCursor, base: Type, ctx: &mut Ctx) -> Result<Type> {
    enum Parsed {
        Empty,
        OldStyle(Vec<Parameter>),
        Typed(Vec<Parameter>, bool /* var_args */),
    }

    let parsed = if cursor.eat_punct(Punctuator::RParen) {
        Parsed::Empty
    } else if is_identifier_list(cursor, ctx.scope) {
        // Old-style identifier list: `f(a, b, c)` where `a`/`b`/`c` are not
        // declaration-specifiers.
        let mut parameters = Vec::new();
        loop {
            let name = cursor.eat_identifier().expect("checked by is_identifier_list");
            parameters.push(Parameter {
                name,
                ty: Type::INT, // resolved later against the K&R parameter declarations
                register: false,
            });
            if !cursor.eat_punct(Punctuator::Comma) {
                break;
            }
        }
        expect_rparen(cursor)?;
        Parsed::OldStyle(parameters)
    } else {
        let mut parameters = Vec::new();
        let mut is_var_args = false;
        loop {
            if cursor.eat_punct(Punctuator::Ellipsis) {
                is_var_args = true;
                break;
            }
            let (name, ty, register) = parse_parameter(cursor, ctx)?;
            parameters.push((name, ty, register));
            if !cursor.eat_punct(Punctuator::Comma) {
                break;
            }
        }
        expect_rparen(cursor)?;

        // Spec §4.3: a single unqualified `void` parameter with no name
        // means "zero parameters"; `void` elsewhere (qualified, or among
        // several) is an error.
        let is_void_only =
            parameters.len() == 1 && parameters[0].0.is_empty() && parameters[0].1.is_void_unqualified();
        let mut adjusted = Vec::new();
        if !is_void_only {
            for (name, ty, register) in parameters {
                if ty.specifier == Specifier::Void {
                    ctx.sink.report(Diagnostic {
                        tag: DiagnosticTag::MisplacedVoidParameter,
                        token: cursor.pos(),
                        extra: None,
                    });
                }
                adjusted.push(Parameter {
                    name,
                    ty: adjust_parameter_type(ty, ctx),
                    register,
                });
            }
        }
        Parsed::Typed(adjusted, is_var_args)
    };

    // Whatever follows the closing `)` is this function's return type
    // (another suffix, or nothing left to parse).
    let return_type = parse_direct_declarator_tail(cursor, base, ctx)?;
    if return_type.specifier.is_array() || return_type.specifier.is_func() {
        ctx.sink.report(Diagnostic {
            tag: DiagnosticTag::InvalidFunctionReturn,
            token: cursor.pos(),
            extra: None,
        });
    }

    let (specifier, parameters) = match parsed {
        Parsed::Empty => (Specifier::VarArgsFunc, Vec::new()),
        Parsed::OldStyle(params) => (Specifier::OldStyleFunc, params),
        Parsed::Typed(params, true) => (Specifier::VarArgsFunc, params),
        Parsed::Typed(params, false) => (Specifier::Func, params),
    };
    let id = ctx.arena.alloc_function(Function {
        return_type,
        parameters,
    });
    Ok(Type {
        specifier,
        qualifiers: Qualifiers::NONE,
        alignment: 0,
        payload: Payload::Function(id),
    })
}

fn expect_rparen(cursor: &mut TokenCursor) -> Result<()> {
    if cursor.eat_punct(Punctuator::RParen) {
        Ok(())
    } else {
        Err(Error::Syntax(
            cursor.pos(),
            SyntaxError::Expected {
                expected: "')'",
                found: format!("{}", cursor.peek()),
            },
        ))
    }
}

/// Spec §4.3 "Parameters of function type are adjusted to pointer-to-function.
/// Parameters of array type ... are adjusted to pointer-to-element."
fn adjust_parameter_type(ty: Type, ctx: &mut Ctx) -> Type {
    if ty.specifier.is_func() {
        return ty::wrap_pointer(ty, Qualifiers::NONE, ctx.arena);
    }
    if let Some(elem) = crate::ty::ops::elem_type(ty, ctx.arena) {
        if ty.specifier.is_array() {
            return ty::wrap_pointer(elem, ty.qualifiers, ctx.arena);
        }
    }
    ty
}

fn parse_parameter(cursor: &mut TokenCursor, ctx: &mut Ctx) -> Result<(Box<str>, Type, bool)> {
    let register = cursor.eat_keyword(Keyword::Register);
    let base = ctx
        .specifiers
        .parse_parameter_specifiers(cursor, ctx.arena, ctx.scope, ctx.sink, ctx.exprs)?;
    let decl = parse_declarator_inner(cursor, base, ctx, true)?;
    let name = if decl.name_token != 0 {
        cursor
            .identifier_at(decl.name_token)
            .map(Box::<str>::from)
            .unwrap_or_default()
    } else {
        Box::<str>::from("")
    };
    Ok((name, decl.ty, register))
}

/// `true` if the next tokens form an old-style identifier list rather than
/// typed parameters: the first token is an identifier that does not
/// resolve as a typedef name.
fn is_identifier_list(cursor: &TokenCursor, scope: &Scope) -> bool {
    match cursor.peek() {
        TokenKind::Identifier(name) => scope.resolve_typedef(name).is_none(),
        _ => false,
    }
}

/// Disambiguates `'(' declarator ')'` from a parameter list at the point a
/// direct-declarator is expected (spec §4.3's grammar ambiguity). The
/// token right after `(` can only start a declarator if it is `*`, a
/// non-typedef identifier, or another `(`; a type keyword, qualifier, or
/// `)` means this is a parameter list instead.
fn looks_like_nested_declarator(cursor: &TokenCursor, scope: &Scope) -> bool {
    match cursor.peek_at(1) {
        TokenKind::Punctuator(Punctuator::Star) | TokenKind::Punctuator(Punctuator::LParen) => true,
        TokenKind::Identifier(name) => scope.resolve_typedef(name).is_none(),
        _ => false,
    }
}
