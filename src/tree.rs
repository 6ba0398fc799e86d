//! Recursion tree stored as an arena.
//!
//! Nodes are allocated in call order and addressed by [`NodeId`], which is
//! simply the arena slot. Children are kept as id lists in the order the
//! sub-calls were issued. Overlapping subproblems are *not* shared: a memo
//! hit gets its own leaf node with the same label as the call it reuses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::step::Value;

/// Stable identifier of a [`TreeNode`] within one run.
///
/// Ids are handed out by a monotonically increasing counter starting at 0 on
/// every run and never depend on node content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Arena slot of this node.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// One recursive invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    /// Call signature such as `fib(5)` or `ks(3,8)`.
    pub label: String,
    /// Raw call arguments.
    pub params: Vec<i64>,
    /// Set once the call returns or resolves from the memo.
    pub result: Option<Value>,
    pub children: Vec<NodeId>,
}

/// Arena of [`TreeNode`]s; slot 0 is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTree {
    nodes: Vec<TreeNode>,
}

impl CallTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes allocated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.first()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.index())
    }

    /// Nodes in allocation (= call) order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes.iter()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&c| self.get(c))
    }

    /// Allocate a node under `parent` (or as the root when `parent` is
    /// `None`). The new id is the next counter value.
    pub(crate) fn alloc(&mut self, parent: Option<NodeId>, label: String, params: Vec<i64>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(TreeNode {
            id,
            label,
            params,
            result: None,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            if let Some(parent_node) = self.get_mut(p) {
                parent_node.children.push(id);
            }
        }
        id
    }

    /// Height of the tree in edges; 0 for a single node or an empty tree.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };
        let mut best = 0;
        let mut stack = vec![(root.id, 0usize)];
        while let Some((id, d)) = stack.pop() {
            best = best.max(d);
            if let Some(node) = self.get(id) {
                stack.extend(node.children.iter().map(|&c| (c, d + 1)));
            }
        }
        best
    }

    /// Node ids in pre-order (parent before children, children left to
    /// right). For a completed run this equals allocation order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root() else {
            return out;
        };
        let mut stack = vec![root.id];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.get(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }
}
