//! The scope stack (spec §4.4, §9 "Scope stack").
//!
//! A plain stack with linear search for typedef resolution — translation
//! unit scopes are shallow enough that this is not a hot path. Block-scope
//! push/pop around `{ ... }` is the statement parser's job; the
//! Declaration Coordinator only ever pushes.

use crate::arena::{EnumId, RecordId};
use crate::ty::Type;

#[derive(Debug, Clone)]
pub enum Entry {
    Typedef { name: Box<str>, ty: Type },
    Struct { name: Box<str>, id: RecordId },
    Union { name: Box<str>, id: RecordId },
    Enum { name: Box<str>, id: EnumId },
    Symbol { name: Box<str>, ty: Type },
    /// Marks the start of a loop body, so `break`/`continue` validation in
    /// the statement parser can find its nearest enclosing loop.
    LoopSentinel,
    /// Marks the start of a `switch` body, so `case`/`default`/`break`
    /// validation can find its nearest enclosing switch.
    SwitchSentinel,
}

#[derive(Debug, Default)]
pub struct Scope {
    entries: Vec<Entry>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<Entry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Resolves `name` as a typedef, searching from the top of the stack
    /// down; only `Typedef` entries are considered (spec §4.4 "name lookup
    /// for typedefs ... matching only `typedef` entries").
    pub fn resolve_typedef(&self, name: &str) -> Option<Type> {
        self.entries.iter().rev().find_map(|e| match e {
            Entry::Typedef { name: n, ty } if n.as_ref() == name => Some(*ty),
            _ => None,
        })
    }

    pub fn resolve_struct(&self, name: &str) -> Option<RecordId> {
        self.entries.iter().rev().find_map(|e| match e {
            Entry::Struct { name: n, id } if n.as_ref() == name => Some(*id),
            _ => None,
        })
    }

    pub fn resolve_union(&self, name: &str) -> Option<RecordId> {
        self.entries.iter().rev().find_map(|e| match e {
            Entry::Union { name: n, id } if n.as_ref() == name => Some(*id),
            _ => None,
        })
    }

    pub fn resolve_enum(&self, name: &str) -> Option<EnumId> {
        self.entries.iter().rev().find_map(|e| match e {
            Entry::Enum { name: n, id } if n.as_ref() == name => Some(*id),
            _ => None,
        })
    }

    pub fn resolve_symbol(&self, name: &str) -> Option<Type> {
        self.entries.iter().rev().find_map(|e| match e {
            Entry::Symbol { name: n, ty } if n.as_ref() == name => Some(*ty),
            _ => None,
        })
    }

    pub fn in_loop(&self) -> bool {
        self.entries.iter().rev().any(|e| matches!(e, Entry::LoopSentinel))
    }

    pub fn in_switch(&self) -> bool {
        self.entries.iter().rev().any(|e| matches!(e, Entry::SwitchSentinel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Specifier;

    #[test]
    fn typedef_resolution_prefers_innermost() {
        let mut scope = Scope::new();
        scope.push(Entry::Typedef {
            name: "T".into(),
            ty: Type::fundamental(Specifier::Int),
        });
        scope.push(Entry::Typedef {
            name: "T".into(),
            ty: Type::fundamental(Specifier::Float),
        });
        let resolved = scope.resolve_typedef("T").unwrap();
        assert_eq!(resolved.specifier, Specifier::Float);
    }

    #[test]
    fn typedef_resolution_ignores_non_typedef_entries() {
        let mut scope = Scope::new();
        scope.push(Entry::Symbol {
            name: "T".into(),
            ty: Type::fundamental(Specifier::Int),
        });
        assert!(scope.resolve_typedef("T").is_none());
    }

    #[test]
    fn truncate_pops_block_scope() {
        let mut scope = Scope::new();
        scope.push(Entry::LoopSentinel);
        let mark = scope.len();
        scope.push(Entry::Symbol {
            name: "i".into(),
            ty: Type::fundamental(Specifier::Int),
        });
        assert!(scope.resolve_symbol("i").is_some());
        scope.truncate(mark);
        assert!(scope.resolve_symbol("i").is_none());
    }
}
