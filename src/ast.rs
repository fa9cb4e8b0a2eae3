//! The produced AST (spec §6 "Produced AST").
//!
//! A flat node vector plus a list of root declaration indices. `NodeId(0)`
//! is reserved as the invalid sentinel — no valid declaration ever lands at
//! index 0 (the vector's slot 0 is filled with a placeholder at
//! construction so indices line up 1:1 with ids).

use crate::arena::ExprHandle;
use crate::token::TokenId;
use crate::ty::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(0);

    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Opaque reference to a statement node owned by the (external) statement
/// parser; the Declaration Coordinator stores a function body as one of
/// these without inspecting it (spec §4.4 "consumed here only as an opaque
/// node handle").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtHandle(pub u32);

/// The validation cross-product tag a declaration is filed under (spec
/// §4.4 "Validation picks the precise AST tag from the cross-product"), so
/// downstream passes do not need to re-derive storage-class/function-
/// specifier combinations from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclTag {
    Var,
    ExternVar,
    StaticVar,
    ThreadLocalVar,
    ThreadLocalExternVar,
    ThreadLocalStaticVar,
    Typedef,
    FnProto,
    StaticFnProto,
    InlineFnProto,
    StaticInlineFnProto,
    NoreturnFnProto,
    StaticNoreturnFnProto,
    InlineNoreturnFnProto,
    StaticInlineNoreturnFnProto,
    FnDef,
    StaticFnDef,
    InlineFnDef,
    StaticInlineFnDef,
    NoreturnFnDef,
    StaticNoreturnFnDef,
    InlineNoreturnFnDef,
    StaticInlineNoreturnFnDef,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: DeclTag,
    pub ty: Type,
    /// Points at the declared name; `0` for declarators with no name (this
    /// should not occur for a published declaration, but abstract
    /// declarators reuse the same token convention as `0`).
    pub name_token: TokenId,
    pub initializer: Option<ExprHandle>,
    pub body: Option<StmtHandle>,
}

/// Owns every declaration node produced for one translation unit.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        // Slot 0 is never returned by `push`; its contents are never read.
        Ast {
            nodes: vec![Node {
                tag: DeclTag::Var,
                ty: Type::VOID,
                name_token: 0,
                initializer: None,
                body: None,
            }],
            roots: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }

    pub fn push_root(&mut self, node: Node) -> NodeId {
        let id = self.push(node);
        self.roots.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Specifier;

    #[test]
    fn node_id_zero_is_invalid() {
        assert!(!NodeId::INVALID.is_valid());
    }

    #[test]
    fn push_root_is_reachable_via_roots() {
        let mut ast = Ast::new();
        let id = ast.push_root(Node {
            tag: DeclTag::Var,
            ty: Type::fundamental(Specifier::Int),
            name_token: 5,
            initializer: None,
            body: None,
        });
        assert!(id.is_valid());
        assert_eq!(ast.roots(), &[id]);
        assert_eq!(ast.get(id).name_token, 5);
    }

    #[test]
    fn non_root_nodes_are_not_listed_as_roots() {
        let mut ast = Ast::new();
        ast.push(Node {
            tag: DeclTag::Var,
            ty: Type::INT,
            name_token: 1,
            initializer: None,
            body: None,
        });
        assert!(ast.roots().is_empty());
        assert_eq!(ast.len(), 1);
    }
}
