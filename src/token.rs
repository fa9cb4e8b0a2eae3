//! The token stream external interface (spec §6).
//!
//! The preprocessor is out of scope for this crate; it hands us an
//! immutable, already-expanded, indexed sequence of [`Token`]s. This module
//! only defines the shape of that sequence and a cursor for walking it with
//! one token of lookahead — it does not produce tokens itself.

use std::fmt;

/// Index of a token within a [`TokenStream`]. `0` is a valid index here
/// (unlike AST node indices, which reserve `0` as "invalid" — see
/// [`crate::ast`]).
pub type TokenId = u32;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub source_id: u32,
    pub start_offset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(Box<str>),
    Punctuator(Punctuator),
    /// An integer/float/character constant. The core never inspects its
    /// value directly — array bounds, bitfield widths and `_Static_assert`
    /// predicates are handed to the external expression evaluator via
    /// [`crate::declarator::ConstExpr`].
    Constant,
    /// A string literal, lexeme included — this is the one token kind whose
    /// text the core itself interpolates into a diagnostic (the message
    /// argument of `_Static_assert`).
    StringLiteral(Box<str>),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "{:?}", k),
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::Punctuator(p) => write!(f, "'{}'", p.as_str()),
            TokenKind::Constant => write!(f, "constant"),
            TokenKind::StringLiteral(s) => write!(f, "string literal \"{}\"", s),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Void,
    Bool,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Complex,
    Struct,
    Union,
    Enum,
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
    ThreadLocal,
    Inline,
    Noreturn,
    Const,
    Volatile,
    Restrict,
    Atomic,
    Alignas,
    StaticAssert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    Star,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    Equal,
    Ellipsis,
}

impl Punctuator {
    pub fn as_str(self) -> &'static str {
        match self {
            Punctuator::Star => "*",
            Punctuator::LParen => "(",
            Punctuator::RParen => ")",
            Punctuator::LBracket => "[",
            Punctuator::RBracket => "]",
            Punctuator::LBrace => "{",
            Punctuator::RBrace => "}",
            Punctuator::Comma => ",",
            Punctuator::Semicolon => ";",
            Punctuator::Colon => ":",
            Punctuator::Equal => "=",
            Punctuator::Ellipsis => "...",
        }
    }
}

/// A cursor over an immutable token slice, with one token of lookahead.
///
/// Mirrors the single-threaded ownership model of spec §5: one parser
/// instance holds exactly one `TokenCursor` and advances it monotonically,
/// except during the bounded rewind used by parenthesized-declarator
/// backtracking (see [`crate::declarator`]).
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        TokenCursor { tokens, pos: 0 }
    }

    pub fn pos(&self) -> TokenId {
        self.pos as TokenId
    }

    pub fn set_pos(&mut self, pos: TokenId) {
        self.pos = pos as usize;
    }

    pub fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    pub fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    pub fn bump(&mut self) -> TokenKind {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub fn is_punct(&self, p: Punctuator) -> bool {
        matches!(self.peek(), TokenKind::Punctuator(q) if *q == p)
    }

    pub fn is_keyword(&self, k: Keyword) -> bool {
        matches!(self.peek(), TokenKind::Keyword(q) if *q == k)
    }

    pub fn eat_punct(&mut self, p: Punctuator) -> bool {
        if self.is_punct(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn eat_keyword(&mut self, k: Keyword) -> bool {
        if self.is_keyword(k) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Tries to consume an identifier, returning its lexeme.
    pub fn eat_identifier(&mut self) -> Option<Box<str>> {
        if let TokenKind::Identifier(name) = self.peek().clone() {
            self.bump();
            Some(name)
        } else {
            None
        }
    }

    /// Tries to consume a string literal, returning its text.
    pub fn eat_string_literal(&mut self) -> Option<Box<str>> {
        if let TokenKind::StringLiteral(s) = self.peek().clone() {
            self.bump();
            Some(s)
        } else {
            None
        }
    }

    pub fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    /// Looks up the lexeme of an identifier token by index, independent of
    /// the cursor's current position. Declarators carry only the token
    /// index (spec §6 "one token-index field"); callers that need the
    /// name text go through this.
    pub fn identifier_at(&self, id: TokenId) -> Option<&str> {
        match self.tokens.get(id as usize).map(|t| &t.kind) {
            Some(TokenKind::Identifier(name)) => Some(name),
            _ => None,
        }
    }
}
