use super::*;
use crate::diagnostic::VecSink;
use crate::token::{Token, TokenKind};
use pretty_assertions::assert_eq;

/// A minimal [`ExprEvaluator`] for tests: every bound is the constant `10`.
struct ConstTen;

impl ExprEvaluator for ConstTen {
    fn parse_bound(&mut self, cursor: &mut TokenCursor) -> Result<ConstExpr> {
        cursor.bump(); // consume the single constant token
        Ok(ConstExpr::Constant(10))
    }

    fn parse_constant_expression(&mut self, cursor: &mut TokenCursor) -> Result<ConstExpr> {
        cursor.bump();
        Ok(ConstExpr::Constant(10))
    }
}

/// A minimal [`SpecifierParser`] for tests: recognizes `char`/`int` keyword
/// tokens and nothing else, since no test declares more elaborate
/// parameter types.
struct BasicSpecifiers;

impl SpecifierParser for BasicSpecifiers {
    fn parse_parameter_specifiers(
        &mut self,
        cursor: &mut TokenCursor,
        _arena: &mut TypeArena,
        _scope: &Scope,
        _sink: &mut dyn DiagnosticSink,
        _exprs: &mut dyn ExprEvaluator,
    ) -> Result<Type> {
        let specifier = match cursor.peek() {
            TokenKind::Keyword(Keyword::Char) => Specifier::Char,
            TokenKind::Keyword(Keyword::Void) => Specifier::Void,
            _ => Specifier::Int,
        };
        cursor.bump();
        Ok(Type::fundamental(specifier))
    }
}

fn ident(s: &str) -> Token {
    Token {
        kind: TokenKind::Identifier(s.into()),
        source_id: 0,
        start_offset: 0,
    }
}

fn punct(p: Punctuator) -> Token {
    Token {
        kind: TokenKind::Punctuator(p),
        source_id: 0,
        start_offset: 0,
    }
}

fn keyword(k: Keyword) -> Token {
    Token {
        kind: TokenKind::Keyword(k),
        source_id: 0,
        start_offset: 0,
    }
}

fn constant() -> Token {
    Token {
        kind: TokenKind::Constant,
        source_id: 0,
        start_offset: 0,
    }
}

struct Harness {
    arena: TypeArena,
    target: Target,
    scope: Scope,
    sink: VecSink,
    exprs: ConstTen,
    specifiers: BasicSpecifiers,
}

impl Harness {
    fn new() -> Self {
        Harness {
            arena: TypeArena::new(),
            target: Target::LINUX_X86_64,
            scope: Scope::new(),
            sink: VecSink::new(),
            exprs: ConstTen,
            specifiers: BasicSpecifiers,
        }
    }

    fn parse(&mut self, tokens: &[Token], base: Type) -> Result<Declarator> {
        let mut cursor = TokenCursor::new(tokens);
        parse_declarator(
            &mut cursor,
            base,
            &mut self.arena,
            &self.target,
            &self.scope,
            &mut self.sink,
            &mut self.exprs,
            &mut self.specifiers,
        )
    }

    fn dump(&self, ty: Type) -> String {
        crate::ty::dump(ty, &self.arena)
    }
}

#[test]
fn simple_identifier_is_the_base_type() {
    let mut h = Harness::new();
    // `x`
    let tokens = [ident("x")];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "int");
    assert!(!decl.is_function);
}

#[test]
fn pointer_declarator() {
    let mut h = Harness::new();
    // `*p`
    let tokens = [punct(Punctuator::Star), ident("p")];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "*int");
}

#[test]
fn const_pointer_to_int() {
    let mut h = Harness::new();
    // `*const p` (`int *const p;`)
    let tokens = [
        punct(Punctuator::Star),
        keyword(Keyword::Const),
        ident("p"),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "const *int");
}

#[test]
fn array_of_pointers() {
    let mut h = Harness::new();
    // `*a[10]`  (`int *a[10];` — array of 10 pointers to int)
    let tokens = [
        punct(Punctuator::Star),
        ident("a"),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "[10]*int");
    assert!(h.sink.0.is_empty());
}

#[test]
fn pointer_to_array_via_parens() {
    let mut h = Harness::new();
    // `(*a)[10]` (`int (*a)[10];` — pointer to array of 10 int)
    let tokens = [
        punct(Punctuator::LParen),
        punct(Punctuator::Star),
        ident("a"),
        punct(Punctuator::RParen),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "*[10]int");
}

#[test]
fn array_of_array_nests_left_to_right() {
    let mut h = Harness::new();
    // `a[10][10]` (`int a[10][10];` — array of 10 arrays of 10 int)
    let tokens = [
        ident("a"),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "[10][10]int");
}

#[test]
fn nested_static_array_bound_is_rejected() {
    let mut h = Harness::new();
    // `a[3][static 4]` — `static` only legal in the outermost dimension.
    let tokens = [
        ident("a"),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
        punct(Punctuator::LBracket),
        keyword(Keyword::Static),
        constant(),
        punct(Punctuator::RBracket),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "[3][static 4]int");
    assert!(h.sink.has_tag(DiagnosticTag::ArrayQualifierNotOutermost));
}

#[test]
fn outermost_static_array_bound_is_accepted() {
    let mut h = Harness::new();
    // `a[static 4][3]` — `static` in the outermost dimension is fine.
    let tokens = [
        ident("a"),
        punct(Punctuator::LBracket),
        keyword(Keyword::Static),
        constant(),
        punct(Punctuator::RBracket),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert!(!h.sink.has_tag(DiagnosticTag::ArrayQualifierNotOutermost));
    let _ = decl;
}

#[test]
fn function_returning_pointer() {
    let mut h = Harness::new();
    // `*f(void)` (`int *f(void);`)
    let tokens = [
        punct(Punctuator::Star),
        ident("f"),
        punct(Punctuator::LParen),
        keyword(Keyword::Void),
        punct(Punctuator::RParen),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "fn () *int");
    assert!(decl.is_function);
}

#[test]
fn array_of_pointers_to_function_taking_char() {
    let mut h = Harness::new();
    // `(*a[10])(char)` (`int (*a[10])(char);` — abstract parameter, no name)
    let tokens = [
        punct(Punctuator::LParen),
        punct(Punctuator::Star),
        ident("a"),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
        punct(Punctuator::RParen),
        punct(Punctuator::LParen),
        keyword(Keyword::Char),
        punct(Punctuator::RParen),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(h.dump(decl.ty), "[10]*fn (char) int");
}

#[test]
fn abstract_declarator_has_no_name_token() {
    let mut h = Harness::new();
    // bare `*` as an abstract declarator (e.g. inside a cast)
    let tokens = [punct(Punctuator::Star)];
    let mut cursor = TokenCursor::new(&tokens);
    let decl = parse_abstract_declarator(
        &mut cursor,
        Type::INT,
        &mut h.arena,
        &h.target,
        &h.scope,
        &mut h.sink,
        &mut h.exprs,
        &mut h.specifiers,
    )
    .unwrap();
    assert_eq!(decl.name_token, 0);
    assert_eq!(h.dump(decl.ty), "*int");
}

#[test]
fn void_only_parameter_means_zero_parameters() {
    let mut h = Harness::new();
    // `f(void)`
    let tokens = [
        ident("f"),
        punct(Punctuator::LParen),
        keyword(Keyword::Void),
        punct(Punctuator::RParen),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    match decl.ty.payload {
        crate::ty::Payload::Function(id) => {
            assert_eq!(h.arena.function(id).parameters.len(), 0);
        }
        _ => panic!("expected function payload"),
    }
}

#[test]
fn void_array_element_is_rejected() {
    let mut h = Harness::new();
    // `a[3]` with base type `void` (`void a[3];`)
    let tokens = [
        ident("a"),
        punct(Punctuator::LBracket),
        constant(),
        punct(Punctuator::RBracket),
    ];
    let decl = h.parse(&tokens, Type::fundamental(Specifier::Void)).unwrap();
    assert!(h.sink.has_tag(DiagnosticTag::InvalidArrayElement));
    let _ = decl;
}

#[test]
fn old_style_identifier_list_is_recorded() {
    let mut h = Harness::new();
    // `f(a, b)` — K&R old-style
    let tokens = [
        ident("f"),
        punct(Punctuator::LParen),
        ident("a"),
        punct(Punctuator::Comma),
        ident("b"),
        punct(Punctuator::RParen),
    ];
    let decl = h.parse(&tokens, Type::INT).unwrap();
    assert_eq!(decl.ty.specifier, Specifier::OldStyleFunc);
}
