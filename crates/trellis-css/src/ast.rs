//! Rule tree the visitor pipeline transforms.
//!
//! Nodes live in an index arena; parent/child links are ids, so structural
//! visitors (hoist, split) can reparent nodes without ownership gymnastics.

use crate::literal::{StyleLiteral, Value};

pub type AstId = usize;

pub const ROOT: AstId = 0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AstKind {
    Root,
    DeclarationBlock,
    NestedAtRule,
}

pub fn kind_for_selector(selector: &str) -> AstKind {
    if selector.starts_with('@') {
        AstKind::NestedAtRule
    } else {
        AstKind::DeclarationBlock
    }
}

pub struct AstNode {
    pub kind: AstKind,
    pub selector: String,
    pub parent: Option<AstId>,
    pub declarations: Vec<(String, Value)>,
    pub children: Vec<AstId>,
    /// Unparsed literal input; the `parse` visitor consumes it.
    pub literal: Option<StyleLiteral>,
}

pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Ast {
    /// Arena with the root node at [`ROOT`], carrying the full input
    /// literal.
    pub fn with_root(literal: StyleLiteral) -> Self {
        Self {
            nodes: vec![AstNode {
                kind: AstKind::Root,
                selector: String::new(),
                parent: None,
                declarations: Vec::new(),
                children: Vec::new(),
                literal: Some(literal),
            }],
        }
    }

    pub fn node(&self, id: AstId) -> &AstNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: AstId) -> &mut AstNode {
        &mut self.nodes[id]
    }

    pub fn create(
        &mut self,
        kind: AstKind,
        selector: impl Into<String>,
        parent: AstId,
        literal: Option<StyleLiteral>,
    ) -> AstId {
        let id = self.nodes.len();
        self.nodes.push(AstNode {
            kind,
            selector: selector.into(),
            parent: Some(parent),
            declarations: Vec::new(),
            children: Vec::new(),
            literal,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Detaches `id` from its current parent and appends it under `target`.
    pub fn reparent(&mut self, id: AstId, target: AstId) {
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|child| *child != id);
        }
        self.nodes[id].parent = Some(target);
        self.nodes[target].children.push(id);
    }

    /// Nearest ancestor (starting at `from`) that is not a declaration
    /// block: the root or an enclosing at-rule.
    pub fn find_root_or_closest_at_rule(&self, from: AstId) -> AstId {
        let mut current = from;
        while self.nodes[current].kind == AstKind::DeclarationBlock {
            current = self.nodes[current].parent.expect("block without parent");
        }
        current
    }

    /// Nearest declaration block at or above `from`.
    pub fn find_closest_declaration_block(&self, from: AstId) -> Option<AstId> {
        let mut current = from;
        loop {
            match self.nodes[current].kind {
                AstKind::Root => return None,
                AstKind::DeclarationBlock => return Some(current),
                AstKind::NestedAtRule => {
                    current = self.nodes[current].parent?;
                }
            }
        }
    }
}
