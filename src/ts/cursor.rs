use crate::point::Point;
use crate::ts::errors::BridgeError;
use crate::ts::node::Node;
use crate::ts::tree::Tree;
use serde::Serialize;
use std::fmt;

/// Mutable depth-first walker over one tree.
///
/// The cursor is always positioned on a node. The node it was created from
/// acts as the root: [`TreeCursor::goto_parent`] and
/// [`TreeCursor::goto_next_sibling`] never leave that subtree.
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    inner: tree_sitter::TreeCursor<'tree>,
}

impl<'tree> TreeCursor<'tree> {
    pub(crate) fn new(node: Node<'tree>) -> Result<Self, BridgeError> {
        let raw = node.raw().ok_or_else(|| {
            BridgeError::illegal_state("cannot construct a tree cursor from the null node")
        })?;
        Ok(Self::from_raw(node.tree(), raw.walk()))
    }

    pub(crate) fn from_raw(tree: &'tree Tree, inner: tree_sitter::TreeCursor<'tree>) -> Self {
        Self { tree, inner }
    }

    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    pub fn current_node(&self) -> Node<'tree> {
        Node::new(self.tree, self.inner.node())
    }

    /// Field name of the current node within its parent; `None` at the root
    /// or for children not bound to a field.
    pub fn current_field_name(&self) -> Option<&'static str> {
        self.inner.field_name()
    }

    /// Snapshot of the current node with its field name and text.
    pub fn current_tree_cursor_node(&self) -> TreeCursorNode {
        TreeCursorNode::new(self.current_field_name(), self.current_node())
    }

    /// Depth relative to the node the cursor was created from.
    pub fn depth(&self) -> u32 {
        self.inner.depth()
    }

    pub fn goto_first_child(&mut self) -> bool {
        self.inner.goto_first_child()
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        self.inner.goto_next_sibling()
    }

    pub fn goto_parent(&mut self) -> bool {
        self.inner.goto_parent()
    }

    /// Re-root the cursor at `node`, which must belong to the same tree.
    pub fn reset(&mut self, node: Node<'tree>) -> Result<(), BridgeError> {
        if !std::ptr::eq(node.tree(), self.tree) {
            return Err(BridgeError::invalid_argument(
                "cursor can only be reset to a node of its own tree",
            ));
        }
        let raw = node
            .raw()
            .ok_or_else(|| BridgeError::illegal_state("cannot reset a tree cursor to the null node"))?;
        self.inner.reset(raw);
        Ok(())
    }

    /// Visit every node of the walked subtree in pre-order. The cursor ends
    /// up back on its root.
    pub fn preorder_traversal(&mut self, mut callback: impl FnMut(Node<'tree>)) {
        loop {
            callback(self.current_node());
            if self.goto_first_child() || self.goto_next_sibling() {
                continue;
            }
            loop {
                if !self.goto_parent() {
                    return;
                }
                if self.goto_next_sibling() {
                    break;
                }
            }
        }
    }
}

impl fmt::Debug for TreeCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeCursor(tree: {}, depth: {}, node: {:?})",
            self.tree.id(),
            self.depth(),
            self.current_node()
        )
    }
}

/// Detached view of a node visited by a [`TreeCursor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeCursorNode {
    pub name: Option<&'static str>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_point: Point,
    pub end_point: Point,
    pub is_named: bool,
}

impl TreeCursorNode {
    fn new(name: Option<&'static str>, node: Node<'_>) -> Self {
        Self {
            name,
            kind: node.kind().unwrap_or_default(),
            content: node.content().map(|c| c.into_owned()).unwrap_or_default(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_point: node.start_point(),
            end_point: node.end_point(),
            is_named: node.is_named(),
        }
    }
}

impl fmt::Display for TreeCursorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{} [{}] - [{}]", self.kind, self.start_point, self.end_point)
    }
}
