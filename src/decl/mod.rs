//! The Declaration Coordinator (spec §4.4).
//!
//! Owns the decl-specifier loop — storage class, `_Thread_local`, function
//! specifiers, and (via the Specifier Builder) type specifiers and
//! qualifiers — drives the Declarator Parser for each init-declarator, and
//! publishes finished declarations into the surrounding [`crate::ast::Ast`].


use crate::arena::{EnumId, FunctionId, RecordId, TypeArena};
use crate::ast::{Ast, DeclTag, Node, NodeId, StmtHandle};
use crate::declarator::{self, ConstExpr, Declarator, ExprEvaluator, SpecifierParser};
use crate::diagnostic::{Diagnostic, DiagnosticSink, DiagnosticTag, Extra};
use crate::error::{Error, Result, SyntaxError};
use crate::scope::{Entry, Scope};
use crate::specifier::{Builder, Descriptor, SpecifierWord};
use crate::target::Target;
use crate::token::{Keyword, Punctuator, TokenCursor, TokenId, TokenKind};
use crate::ty::{Enumerator, Field, Payload, Qualifiers, Specifier, Type};

/// Parses the body of a function definition once one has been recognized
/// (spec §4.4 "the body is parsed as a compound statement ... consumed here
/// only as an opaque node handle"). An external collaborator; this crate
/// never inspects what comes back beyond the handle itself.
pub trait StmtParser {
    fn parse_compound_statement(&mut self, cursor: &mut TokenCursor) -> Result<StmtHandle>;
}

/// A stateless [`declarator::SpecifierParser`]. It owns nothing, so nested
/// uses (a function parameter's own parameter list, a struct field that is
/// itself a function pointer) never conflict with whatever else is
/// borrowing `exprs`/`arena`/`scope` at the call site — each call just
/// forwards straight through to [`parse_specifier_sequence`].
pub struct Specifiers;

impl SpecifierParser for Specifiers {
    fn parse_parameter_specifiers(
        &mut self,
        cursor: &mut TokenCursor,
        arena: &mut TypeArena,
        scope: &Scope,
        sink: &mut dyn DiagnosticSink,
        exprs: &mut dyn ExprEvaluator,
    ) -> Result<Type> {
        // No `Target` is reachable through this trait's signature; record
        // layout for a struct/union body declared inline inside a
        // parameter's type falls back to the host target; the Non-goals
        // already treat record layout as a placeholder, so this only
        // affects the rare case of a pointer/array field inside that body.
        let target = Target::default();
        let mut pending = Vec::new();
        parse_specifier_sequence(cursor, arena, &target, scope, sink, exprs, &mut pending)
    }
}

/// A struct/union/enum tag newly allocated while parsing a decl-specifier
/// sequence, not yet registered in the enclosing [`Scope`]. Kept separate
/// from the arena allocation itself because the type-specifier loop only
/// ever holds `&Scope` (spec §4.3's `SpecifierParser` boundary), so pushing
/// the new entry is left to whichever caller does hold `&mut Scope`.
///
/// Left undrained in a parameter or struct-field context, this is exactly
/// C's "prototype scope"/"struct scope" rule: a tag declared inline inside
/// a parameter's type or a field's type is visible for the rest of that
/// declaration only, never leaking into the enclosing scope.
enum PendingTag {
    Struct(Box<str>, RecordId),
    Union(Box<str>, RecordId),
    Enum(Box<str>, EnumId),
}

fn register_pending_tags(scope: &mut Scope, pending: Vec<PendingTag>) {
    for tag in pending {
        match tag {
            PendingTag::Struct(name, id) => scope.push(Entry::Struct { name, id }),
            PendingTag::Union(name, id) => scope.push(Entry::Union { name, id }),
            PendingTag::Enum(name, id) => scope.push(Entry::Enum { name, id }),
        }
    }
}

fn keyword_to_specifier_word(k: Keyword) -> Option<SpecifierWord> {
    use SpecifierWord as W;
    Some(match k {
        Keyword::Void => W::Void,
        Keyword::Bool => W::Bool,
        Keyword::Char => W::Char,
        Keyword::Short => W::Short,
        Keyword::Int => W::Int,
        Keyword::Long => W::Long,
        Keyword::Float => W::Float,
        Keyword::Double => W::Double,
        Keyword::Signed => W::Signed,
        Keyword::Unsigned => W::Unsigned,
        Keyword::Complex => W::Complex,
        _ => return None,
    })
}

fn descriptor_to_type(d: Descriptor) -> Type {
    match d {
        Descriptor::Record(id, is_union) => Type {
            specifier: if is_union { Specifier::Union } else { Specifier::Struct },
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Record(id),
        },
        Descriptor::Enum(id) => Type {
            specifier: Specifier::Enum,
            qualifiers: Qualifiers::NONE,
            alignment: 0,
            payload: Payload::Enum(id),
        },
        Descriptor::Typedef(ty) => ty,
    }
}

fn expect_punct(cursor: &mut TokenCursor, p: Punctuator, label: &'static str) -> Result<()> {
    if cursor.eat_punct(p) {
        Ok(())
    } else {
        Err(Error::Syntax(
            cursor.pos(),
            SyntaxError::Expected {
                expected: label,
                found: format!("{}", cursor.peek()),
            },
        ))
    }
}

fn report_qualifier(already_set: bool, name: &str, at: TokenId, sink: &mut dyn DiagnosticSink) {
    if already_set {
        sink.report(Diagnostic {
            tag: DiagnosticTag::DuplicateQualifier,
            token: at,
            extra: Some(Extra::Text(name.into())),
        });
    }
}

/// Tries to consume one token belonging to the type-specifier/qualifier
/// grammar (spec §4.4's "Type specifiers & qualifiers" slot) and fold it
/// into `builder`/`quals`/`alignment`. Returns `false`, consuming nothing,
/// when the current token is storage-class, `_Thread_local`, a function
/// specifier, or the start of a declarator — i.e. not ours to consume.
#[allow(clippy::too_many_arguments)]
fn try_type_specifier_or_qualifier(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    builder: &mut Builder,
    quals: &mut Qualifiers,
    alignment: &mut u32,
    pending: &mut Vec<PendingTag>,
) -> Result<bool> {
    let at = cursor.pos();
    let kw = match cursor.peek() {
        TokenKind::Keyword(k) => Some(*k),
        _ => None,
    };
    match kw {
        Some(Keyword::Const) => {
            cursor.bump();
            report_qualifier(quals.const_, "const", at, sink);
            quals.const_ = true;
        }
        Some(Keyword::Volatile) => {
            cursor.bump();
            report_qualifier(quals.volatile, "volatile", at, sink);
            quals.volatile = true;
        }
        Some(Keyword::Atomic) => {
            cursor.bump();
            report_qualifier(quals.atomic, "_Atomic", at, sink);
            quals.atomic = true;
        }
        Some(Keyword::Restrict) => {
            cursor.bump();
            // Decl-specifier-position `restrict` never attaches to a
            // pointer itself (that only happens inside the Declarator
            // Parser's pointer chain), so it is always misplaced here.
            sink.report(Diagnostic {
                tag: DiagnosticTag::RestrictOnNonPointer,
                token: at,
                extra: None,
            });
            report_qualifier(quals.restrict, "restrict", at, sink);
            quals.restrict = true;
        }
        Some(Keyword::Alignas) => {
            cursor.bump();
            expect_punct(cursor, Punctuator::LParen, "'('")?;
            if let ConstExpr::Constant(n) = exprs.parse_constant_expression(cursor)? {
                *alignment = n as u32;
            }
            expect_punct(cursor, Punctuator::RParen, "')'")?;
        }
        Some(Keyword::Struct) => {
            cursor.bump();
            let (id, new_name) = parse_record_specifier(cursor, arena, target, scope, sink, exprs, false)?;
            if let Some(name) = new_name {
                pending.push(PendingTag::Struct(name, id));
            }
            builder.set_descriptor(Descriptor::Record(id, false), at, sink);
        }
        Some(Keyword::Union) => {
            cursor.bump();
            let (id, new_name) = parse_record_specifier(cursor, arena, target, scope, sink, exprs, true)?;
            if let Some(name) = new_name {
                pending.push(PendingTag::Union(name, id));
            }
            builder.set_descriptor(Descriptor::Record(id, true), at, sink);
        }
        Some(Keyword::Enum) => {
            cursor.bump();
            let (id, new_name) = parse_enum_specifier(cursor, arena, scope, sink, exprs)?;
            if let Some(name) = new_name {
                pending.push(PendingTag::Enum(name, id));
            }
            builder.set_descriptor(Descriptor::Enum(id), at, sink);
        }
        Some(k) => {
            if let Some(word) = keyword_to_specifier_word(k) {
                cursor.bump();
                builder.combine(word, at, sink);
            } else {
                return Ok(false);
            }
        }
        None => match cursor.peek().clone() {
            TokenKind::Identifier(name) => {
                if builder.is_empty() {
                    if let Some(ty) = scope.resolve_typedef(&name) {
                        cursor.bump();
                        builder.set_descriptor(Descriptor::Typedef(ty), at, sink);
                    } else {
                        return Ok(false);
                    }
                } else {
                    return Ok(false);
                }
            }
            _ => return Ok(false),
        },
    }
    Ok(true)
}

/// Parses zero or more type-specifier/qualifier tokens into a finalized
/// base [`Type`]. Shared by the top-level decl-specifier loop, struct/union
/// field specifiers, and (via [`Specifiers`]) function parameters.
#[allow(clippy::too_many_arguments)]
fn parse_specifier_sequence(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    pending: &mut Vec<PendingTag>,
) -> Result<Type> {
    let mut builder = Builder::new();
    let mut quals = Qualifiers::NONE;
    let mut alignment: u32 = 0;
    while try_type_specifier_or_qualifier(
        cursor, arena, target, scope, sink, exprs, &mut builder, &mut quals, &mut alignment, pending,
    )? {}

    let (mut base, descriptor) = builder.finalize(sink);
    if let Some(d) = descriptor {
        base = descriptor_to_type(d);
    }
    // Union with whatever the base already carried (e.g. a typedef that was
    // itself `const`-qualified) rather than overwriting it; re-stating the
    // same qualifier across a typedef boundary is legal, so the duplicate
    // count from this merge is deliberately discarded.
    let (merged, _dup) = base.qualifiers.union_reporting_duplicates(quals);
    base.qualifiers = merged;
    if alignment != 0 {
        base.alignment = alignment;
    }
    Ok(base)
}

fn parse_record_specifier(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    is_union: bool,
) -> Result<(RecordId, Option<Box<str>>)> {
    let name = cursor.eat_identifier();
    if cursor.eat_punct(Punctuator::LBrace) {
        let id = arena.alloc_record(name.clone().unwrap_or_default(), is_union);
        let fields = parse_field_list(cursor, arena, target, scope, sink, exprs)?;
        // Non-goal (spec §1): real ABI layout is a placeholder. Every field
        // starts at offset 0 and the record's cached size/alignment are 0,
        // which `Record::is_incomplete` treats as "complete" (only
        // `arena::INCOMPLETE` means "body not yet parsed").
        arena.complete_record(id, fields, 0, 0);
        Ok((id, name))
    } else if let Some(name) = name {
        let existing = if is_union {
            scope.resolve_union(&name)
        } else {
            scope.resolve_struct(&name)
        };
        match existing {
            Some(id) => Ok((id, None)),
            None => Ok((arena.alloc_record(name.clone(), is_union), Some(name))),
        }
    } else {
        Err(Error::Syntax(
            cursor.pos(),
            SyntaxError::Expected {
                expected: "struct/union tag or body",
                found: format!("{}", cursor.peek()),
            },
        ))
    }
}

fn parse_field_list(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    while !cursor.is_punct(Punctuator::RBrace) {
        if cursor.at_eof() {
            return Err(Error::Syntax(
                cursor.pos(),
                SyntaxError::Expected {
                    expected: "'}'",
                    found: format!("{}", cursor.peek()),
                },
            ));
        }
        let mut pending = Vec::new();
        let base = parse_specifier_sequence(cursor, arena, target, scope, sink, exprs, &mut pending)?;
        loop {
            let (name, ty) = if cursor.is_punct(Punctuator::Colon) {
                (Box::<str>::from(""), base)
            } else {
                let mut specifiers = Specifiers;
                let decl = declarator::parse_declarator(cursor, base, arena, target, scope, sink, exprs, &mut specifiers)?;
                let name = if decl.name_token != 0 {
                    cursor.identifier_at(decl.name_token).map(Box::<str>::from).unwrap_or_default()
                } else {
                    Box::<str>::from("")
                };
                (name, decl.ty)
            };
            let bit_width = if cursor.eat_punct(Punctuator::Colon) {
                match exprs.parse_constant_expression(cursor)? {
                    ConstExpr::Constant(n) => n as u32,
                    ConstExpr::NonConstant(_) => 0,
                }
            } else {
                0
            };
            fields.push(Field { name, ty, bit_width, offset: 0 });
            if !cursor.eat_punct(Punctuator::Comma) {
                break;
            }
        }
        expect_punct(cursor, Punctuator::Semicolon, "';'")?;
    }
    expect_punct(cursor, Punctuator::RBrace, "'}'")?;
    Ok(fields)
}

fn parse_enum_specifier(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
) -> Result<(EnumId, Option<Box<str>>)> {
    let name = cursor.eat_identifier();
    if cursor.eat_punct(Punctuator::LBrace) {
        let id = arena.alloc_enum(name.clone().unwrap_or_default(), Type::INT);
        let mut enumerators = Vec::new();
        let mut next_value: u64 = 0;
        while !cursor.is_punct(Punctuator::RBrace) {
            let ename = cursor.eat_identifier().ok_or_else(|| {
                Error::Syntax(
                    cursor.pos(),
                    SyntaxError::Expected {
                        expected: "enumerator name",
                        found: format!("{}", cursor.peek()),
                    },
                )
            })?;
            if cursor.eat_punct(Punctuator::Equal) {
                if let ConstExpr::Constant(n) = exprs.parse_constant_expression(cursor)? {
                    next_value = n;
                }
            }
            enumerators.push(Enumerator {
                name: ename,
                ty: Type::INT,
                value: next_value,
            });
            next_value = next_value.wrapping_add(1);
            if !cursor.eat_punct(Punctuator::Comma) {
                break;
            }
        }
        expect_punct(cursor, Punctuator::RBrace, "'}'")?;
        arena.complete_enum(id, enumerators);
        Ok((id, name))
    } else if let Some(name) = name {
        match scope.resolve_enum(&name) {
            Some(id) => Ok((id, None)),
            None => Ok((arena.alloc_enum(name.clone(), Type::INT), Some(name))),
        }
    } else {
        Err(Error::Syntax(
            cursor.pos(),
            SyntaxError::Expected {
                expected: "enum tag or body",
                found: format!("{}", cursor.peek()),
            },
        ))
    }
}

fn parse_static_assert(cursor: &mut TokenCursor, exprs: &mut dyn ExprEvaluator, sink: &mut dyn DiagnosticSink) -> Result<()> {
    cursor.bump(); // `_Static_assert`
    expect_punct(cursor, Punctuator::LParen, "'('")?;
    let at = cursor.pos();
    let condition = exprs.parse_constant_expression(cursor)?;
    expect_punct(cursor, Punctuator::Comma, "','")?;
    let message = cursor.eat_string_literal().ok_or_else(|| {
        Error::Syntax(
            cursor.pos(),
            SyntaxError::Expected {
                expected: "string literal",
                found: format!("{}", cursor.peek()),
            },
        )
    })?;
    expect_punct(cursor, Punctuator::RParen, "')'")?;
    expect_punct(cursor, Punctuator::Semicolon, "';'")?;

    if let ConstExpr::Constant(n) = condition {
        if n == 0 {
            sink.report(Diagnostic {
                tag: DiagnosticTag::StaticAssertFailed,
                token: at,
                extra: Some(Extra::Text(format!("'{}' \"{}\"", n, message))),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageClass {
    None,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

/// The decl-specifier state accumulated before any declarator is parsed
/// (spec §4.4's four orthogonal slots).
struct DeclSpecifiers {
    storage: StorageClass,
    thread_local: bool,
    inline: bool,
    noreturn: bool,
    function_specifier_token: Option<TokenId>,
    base: Type,
}

#[allow(clippy::too_many_arguments)]
fn parse_decl_specifiers(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    pending: &mut Vec<PendingTag>,
) -> Result<DeclSpecifiers> {
    let mut storage = StorageClass::None;
    let mut thread_local = false;
    let mut thread_local_token = None;
    let mut inline = false;
    let mut noreturn = false;
    let mut function_specifier_token = None;

    let mut builder = Builder::new();
    let mut quals = Qualifiers::NONE;
    let mut alignment: u32 = 0;

    loop {
        let at = cursor.pos();
        let storage_kw = match cursor.peek() {
            TokenKind::Keyword(Keyword::Typedef) => Some(StorageClass::Typedef),
            TokenKind::Keyword(Keyword::Extern) => Some(StorageClass::Extern),
            TokenKind::Keyword(Keyword::Static) => Some(StorageClass::Static),
            TokenKind::Keyword(Keyword::Auto) => Some(StorageClass::Auto),
            TokenKind::Keyword(Keyword::Register) => Some(StorageClass::Register),
            _ => None,
        };
        if let Some(sc) = storage_kw {
            cursor.bump();
            if storage != StorageClass::None {
                sink.report(Diagnostic {
                    tag: DiagnosticTag::MultipleStorageClass,
                    token: at,
                    extra: None,
                });
            } else {
                storage = sc;
            }
            continue;
        }

        if cursor.is_keyword(Keyword::ThreadLocal) {
            cursor.bump();
            thread_local = true;
            thread_local_token = Some(at);
            continue;
        }

        if cursor.is_keyword(Keyword::Inline) {
            cursor.bump();
            if inline {
                sink.report(Diagnostic {
                    tag: DiagnosticTag::DuplicateFunctionSpecifier,
                    token: at,
                    extra: None,
                });
            }
            inline = true;
            function_specifier_token.get_or_insert(at);
            continue;
        }

        if cursor.is_keyword(Keyword::Noreturn) {
            cursor.bump();
            if noreturn {
                // Spec §9 open question, resolved: diagnose the duplicate
                // and keep the first occurrence.
                sink.report(Diagnostic {
                    tag: DiagnosticTag::DuplicateFunctionSpecifier,
                    token: at,
                    extra: None,
                });
            } else {
                noreturn = true;
            }
            function_specifier_token.get_or_insert(at);
            continue;
        }

        if try_type_specifier_or_qualifier(
            cursor, arena, target, scope, sink, exprs, &mut builder, &mut quals, &mut alignment, pending,
        )? {
            continue;
        }

        break;
    }

    if thread_local && !matches!(storage, StorageClass::None | StorageClass::Extern | StorageClass::Static) {
        sink.report(Diagnostic {
            tag: DiagnosticTag::InvalidThreadLocal,
            token: thread_local_token.unwrap_or(0),
            extra: None,
        });
    }

    let (mut base, descriptor) = builder.finalize(sink);
    if let Some(d) = descriptor {
        base = descriptor_to_type(d);
    }
    let (merged, _dup) = base.qualifiers.union_reporting_duplicates(quals);
    base.qualifiers = merged;
    if alignment != 0 {
        base.alignment = alignment;
    }

    log::debug!(
        "decl-specifiers: storage={:?} thread_local={} inline={} noreturn={} base={:?}",
        storage,
        thread_local,
        inline,
        noreturn,
        base.specifier
    );

    Ok(DeclSpecifiers {
        storage,
        thread_local,
        inline,
        noreturn,
        function_specifier_token,
        base,
    })
}

fn validate_function_specifiers(specs: &DeclSpecifiers, ty: Type, sink: &mut dyn DiagnosticSink) {
    if (specs.inline || specs.noreturn) && !ty.specifier.is_func() {
        sink.report(Diagnostic {
            tag: DiagnosticTag::FunctionSpecifierOnNonFunction,
            token: specs.function_specifier_token.unwrap_or(0),
            extra: None,
        });
    }
}

fn select_fn_tag(specs: &DeclSpecifiers, is_def: bool) -> DeclTag {
    use DeclTag::*;
    let is_static = specs.storage == StorageClass::Static;
    match (is_def, is_static, specs.inline, specs.noreturn) {
        (false, false, false, false) => FnProto,
        (false, true, false, false) => StaticFnProto,
        (false, false, true, false) => InlineFnProto,
        (false, true, true, false) => StaticInlineFnProto,
        (false, false, false, true) => NoreturnFnProto,
        (false, true, false, true) => StaticNoreturnFnProto,
        (false, false, true, true) => InlineNoreturnFnProto,
        (false, true, true, true) => StaticInlineNoreturnFnProto,
        (true, false, false, false) => FnDef,
        (true, true, false, false) => StaticFnDef,
        (true, false, true, false) => InlineFnDef,
        (true, true, true, false) => StaticInlineFnDef,
        (true, false, false, true) => NoreturnFnDef,
        (true, true, false, true) => StaticNoreturnFnDef,
        (true, false, true, true) => InlineNoreturnFnDef,
        (true, true, true, true) => StaticInlineNoreturnFnDef,
    }
}

/// `storage` is the effective storage class for this one declarator —
/// ordinarily `specs.storage`, but downgraded to `StorageClass::None` when
/// this declarator's initializer forced an `extern` downgrade (spec §4.4).
fn select_var_tag(specs: &DeclSpecifiers, storage: StorageClass, ty: Type) -> DeclTag {
    if storage == StorageClass::Typedef {
        return DeclTag::Typedef;
    }
    if ty.specifier.is_func() {
        return select_fn_tag(specs, false);
    }
    match (specs.thread_local, storage) {
        (true, StorageClass::Extern) => DeclTag::ThreadLocalExternVar,
        (true, StorageClass::Static) => DeclTag::ThreadLocalStaticVar,
        (true, _) => DeclTag::ThreadLocalVar,
        (false, StorageClass::Extern) => DeclTag::ExternVar,
        (false, StorageClass::Static) => DeclTag::StaticVar,
        (false, _) => DeclTag::Var,
    }
}

/// Parses `= constant-expression`, if present. The second element of the
/// returned tuple is `true` when an `extern` storage class must be
/// downgraded to "none" for this declarator (spec §4.4: an initializer on
/// an `extern` declaration diagnoses and downgrades, rather than keeping
/// the `extern` tag).
fn parse_optional_initializer(
    cursor: &mut TokenCursor,
    exprs: &mut dyn ExprEvaluator,
    sink: &mut dyn DiagnosticSink,
    specs: &DeclSpecifiers,
    decl: &Declarator,
) -> Result<(Option<crate::arena::ExprHandle>, bool)> {
    if !cursor.eat_punct(Punctuator::Equal) {
        return Ok((None, false));
    }
    let at = cursor.pos();
    let mut downgrade_extern = false;
    if specs.storage == StorageClass::Typedef || decl.ty.specifier.is_func() {
        sink.report(Diagnostic {
            tag: DiagnosticTag::InvalidInitializer,
            token: at,
            extra: None,
        });
    } else if specs.storage == StorageClass::Extern {
        sink.report(Diagnostic {
            tag: DiagnosticTag::ExternWithInitializer,
            token: at,
            extra: None,
        });
        downgrade_extern = true;
    }
    let initializer = match exprs.parse_constant_expression(cursor)? {
        ConstExpr::Constant(_) => None,
        ConstExpr::NonConstant(h) => Some(h),
    };
    Ok((initializer, downgrade_extern))
}

/// `true` if the tokens right after an old-style parameter list's closing
/// `)` start a K&R parameter declaration rather than `;`/`,` (spec §4.4:
/// old-style parameter binding is resolved by separate declarations between
/// the parameter list and the function body).
fn is_old_style_param_decl_start(cursor: &TokenCursor, scope: &Scope) -> bool {
    match cursor.peek() {
        TokenKind::Keyword(k) => {
            keyword_to_specifier_word(*k).is_some()
                || matches!(
                    k,
                    Keyword::Struct
                        | Keyword::Union
                        | Keyword::Enum
                        | Keyword::Const
                        | Keyword::Volatile
                        | Keyword::Restrict
                        | Keyword::Atomic
                        | Keyword::Register
                )
        }
        TokenKind::Identifier(name) => scope.resolve_typedef(name).is_some(),
        _ => false,
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_old_style_parameters(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    func_id: FunctionId,
) -> Result<()> {
    while !cursor.is_punct(Punctuator::LBrace) && !cursor.at_eof() {
        let mut pending = Vec::new();
        let base = parse_specifier_sequence(cursor, arena, target, scope, sink, exprs, &mut pending)?;
        loop {
            let mut specifiers = Specifiers;
            let decl = declarator::parse_declarator(cursor, base, arena, target, scope, sink, exprs, &mut specifiers)?;
            if decl.name_token != 0 {
                if let Some(name) = cursor.identifier_at(decl.name_token) {
                    let name = name.to_string();
                    if let Some(param) = arena
                        .function_mut(func_id)
                        .parameters
                        .iter_mut()
                        .find(|p| p.name.as_ref() == name.as_str())
                    {
                        param.ty = decl.ty;
                    }
                }
            }
            if !cursor.eat_punct(Punctuator::Comma) {
                break;
            }
        }
        expect_punct(cursor, Punctuator::Semicolon, "';'")?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn parse_init_declarators(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &mut Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    ast: &mut Ast,
    specs: &DeclSpecifiers,
    first: Declarator,
) -> Result<Vec<NodeId>> {
    let mut nodes = Vec::new();
    let mut decl = first;
    loop {
        validate_function_specifiers(specs, decl.ty, sink);
        let (initializer, downgrade_extern) =
            parse_optional_initializer(cursor, exprs, sink, specs, &decl)?;
        let effective_storage = if downgrade_extern {
            StorageClass::None
        } else {
            specs.storage
        };

        let name = if decl.name_token != 0 {
            cursor.identifier_at(decl.name_token).map(Box::<str>::from).unwrap_or_default()
        } else {
            Box::<str>::from("")
        };
        if !name.is_empty() {
            if specs.storage == StorageClass::Typedef {
                scope.push(Entry::Typedef { name, ty: decl.ty });
            } else {
                scope.push(Entry::Symbol { name, ty: decl.ty });
            }
        }

        let tag = select_var_tag(specs, effective_storage, decl.ty);
        nodes.push(ast.push_root(Node {
            tag,
            ty: decl.ty,
            name_token: decl.name_token,
            initializer,
            body: None,
        }));

        if !cursor.eat_punct(Punctuator::Comma) {
            break;
        }
        let mut specifiers = Specifiers;
        decl = declarator::parse_declarator(cursor, specs.base, arena, target, scope, sink, exprs, &mut specifiers)?;
    }
    expect_punct(cursor, Punctuator::Semicolon, "';'")?;
    Ok(nodes)
}

#[allow(clippy::too_many_arguments)]
fn parse_function_definition(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &mut Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    stmts: &mut dyn StmtParser,
    ast: &mut Ast,
    specs: &DeclSpecifiers,
    decl: &mut Declarator,
) -> Result<NodeId> {
    if specs.storage == StorageClass::Typedef {
        sink.report(Diagnostic {
            tag: DiagnosticTag::InvalidInitializer,
            token: decl.name_token,
            extra: None,
        });
    }

    let func_id = match decl.ty.payload {
        Payload::Function(id) => id,
        _ => unreachable!("a recognized function definition always carries a function payload"),
    };

    // An empty-parens prototype means "unspecified parameters" in a
    // declaration but "no parameters" once it is a definition (spec §4.4).
    if decl.ty.specifier == Specifier::VarArgsFunc && arena.function(func_id).parameters.is_empty() {
        decl.ty.specifier = Specifier::Func;
    }

    if decl.is_old_style {
        resolve_old_style_parameters(cursor, arena, target, scope, sink, exprs, func_id)?;
    }

    // Visible before the body is parsed so recursive calls resolve.
    if decl.name_token != 0 {
        if let Some(name) = cursor.identifier_at(decl.name_token) {
            scope.push(Entry::Symbol {
                name: name.into(),
                ty: decl.ty,
            });
        }
    }

    if !cursor.is_punct(Punctuator::LBrace) {
        return Err(Error::Syntax(
            cursor.pos(),
            SyntaxError::Expected {
                expected: "'{'",
                found: format!("{}", cursor.peek()),
            },
        ));
    }
    log::debug!("entering function body at token {}", cursor.pos());
    let body = stmts.parse_compound_statement(cursor)?;

    let node = Node {
        tag: select_fn_tag(specs, true),
        ty: decl.ty,
        name_token: decl.name_token,
        initializer: None,
        body: Some(body),
    };
    Ok(ast.push_root(node))
}

fn is_function_definition_shape(decl: &Declarator, cursor: &TokenCursor, scope: &Scope) -> bool {
    decl.is_function
        && (cursor.is_punct(Punctuator::LBrace) || (decl.is_old_style && is_old_style_param_decl_start(cursor, scope)))
}

/// Parses one top-level external declaration: a plain declaration
/// (terminated by `;`), a `_Static_assert`, or a function definition
/// (terminated by a compound statement body) — spec §4.4.
#[allow(clippy::too_many_arguments)]
pub fn parse_external_declaration(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &mut Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    stmts: &mut dyn StmtParser,
    ast: &mut Ast,
) -> Result<Vec<NodeId>> {
    log::trace!("parse_external_declaration at token {}", cursor.pos());
    if cursor.is_keyword(Keyword::StaticAssert) {
        parse_static_assert(cursor, exprs, sink)?;
        return Ok(Vec::new());
    }

    let mut pending = Vec::new();
    let specs = parse_decl_specifiers(cursor, arena, target, scope, sink, exprs, &mut pending)?;
    register_pending_tags(scope, pending);

    if cursor.eat_punct(Punctuator::Semicolon) {
        return Ok(Vec::new());
    }

    let mut specifiers = Specifiers;
    let mut first = declarator::parse_declarator(cursor, specs.base, arena, target, scope, sink, exprs, &mut specifiers)?;

    if is_function_definition_shape(&first, cursor, scope) {
        let node = parse_function_definition(cursor, arena, target, scope, sink, exprs, stmts, ast, &specs, &mut first)?;
        return Ok(vec![node]);
    }

    parse_init_declarators(cursor, arena, target, scope, sink, exprs, ast, &specs, first)
}

/// Parses a declaration that may legally appear inside a block (spec §4.4
/// "nested function definitions diagnose FuncNotInRoot"): identical to
/// [`parse_external_declaration`] except a function-definition shape is
/// rejected rather than recursed into.
#[allow(clippy::too_many_arguments)]
pub fn parse_block_declaration(
    cursor: &mut TokenCursor,
    arena: &mut TypeArena,
    target: &Target,
    scope: &mut Scope,
    sink: &mut dyn DiagnosticSink,
    exprs: &mut dyn ExprEvaluator,
    ast: &mut Ast,
) -> Result<Vec<NodeId>> {
    log::trace!("parse_block_declaration at token {}", cursor.pos());
    if cursor.is_keyword(Keyword::StaticAssert) {
        parse_static_assert(cursor, exprs, sink)?;
        return Ok(Vec::new());
    }

    let mut pending = Vec::new();
    let specs = parse_decl_specifiers(cursor, arena, target, scope, sink, exprs, &mut pending)?;
    register_pending_tags(scope, pending);

    if cursor.eat_punct(Punctuator::Semicolon) {
        return Ok(Vec::new());
    }

    let mut specifiers = Specifiers;
    let first = declarator::parse_declarator(cursor, specs.base, arena, target, scope, sink, exprs, &mut specifiers)?;

    if is_function_definition_shape(&first, cursor, scope) {
        sink.report(Diagnostic {
            tag: DiagnosticTag::FuncNotInRoot,
            token: first.name_token,
            extra: None,
        });
        return Err(Error::Syntax(cursor.pos(), SyntaxError::FuncNotInRoot));
    }

    parse_init_declarators(cursor, arena, target, scope, sink, exprs, ast, &specs, first)
}
