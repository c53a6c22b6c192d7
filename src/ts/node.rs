use crate::point::{Point, Range};
use crate::ts::cursor::TreeCursor;
use crate::ts::errors::BridgeError;
use crate::ts::query::{Query, QueryCursor};
use crate::ts::tree::Tree;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A position inside a [`Tree`], projected into caller units.
///
/// Nodes are plain values: copying one allocates nothing and releases
/// nothing. They borrow the tree they came from, which keeps the native
/// buffer alive for as long as any node exists.
///
/// The null node stands for structural absence. It answers every query with
/// an empty default (no children, zero offsets, origin points, no type) and
/// is never dereferenced.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    raw: Option<tree_sitter::Node<'tree>>,
}

impl<'tree> Node<'tree> {
    pub(crate) fn new(tree: &'tree Tree, raw: tree_sitter::Node<'tree>) -> Self {
        Self {
            tree,
            raw: Some(raw),
        }
    }

    /// The null node of `tree`.
    pub fn null(tree: &'tree Tree) -> Self {
        Self { tree, raw: None }
    }

    fn project(&self, raw: Option<tree_sitter::Node<'tree>>) -> Self {
        Self {
            tree: self.tree,
            raw,
        }
    }

    pub(crate) fn raw(&self) -> Option<tree_sitter::Node<'tree>> {
        self.raw
    }

    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.raw.map_or(0, |n| n.child_count())
    }

    pub fn named_child_count(&self) -> usize {
        self.raw.map_or(0, |n| n.named_child_count())
    }

    /// Child at `index`. If the engine reports no child at a valid index the
    /// null node is returned as-is.
    pub fn child(&self, index: usize) -> Result<Node<'tree>, BridgeError> {
        self.check_child_index(index)?;
        Ok(self.project(self.raw.and_then(|n| n.child(index.try_into().ok()?))))
    }

    pub fn children(&self) -> Vec<Node<'tree>> {
        let Some(raw) = self.raw else {
            return Vec::new();
        };
        let mut cursor = raw.walk();
        raw.children(&mut cursor)
            .map(|child| self.project(Some(child)))
            .collect()
    }

    /// Child bound to the grammar field `name`, or `None` if the node has no
    /// such field.
    pub fn child_by_field_name(&self, name: &str) -> Result<Option<Node<'tree>>, BridgeError> {
        if name.is_empty() {
            return Err(BridgeError::invalid_argument("field name must not be empty"));
        }
        Ok(self
            .raw
            .and_then(|n| n.child_by_field_name(name))
            .map(|child| self.project(Some(child))))
    }

    /// Field name of the child at `index`, or `None` when the child is not
    /// bound to a field.
    pub fn field_name_for_child(&self, index: usize) -> Result<Option<&'static str>, BridgeError> {
        self.check_child_index(index)?;
        Ok(self
            .raw
            .and_then(|n| n.field_name_for_child(index.try_into().ok()?)))
    }

    /// Smallest descendant covering `start..end` (caller units).
    pub fn descendant_for_byte_range(
        &self,
        start: usize,
        end: usize,
    ) -> Result<Node<'tree>, BridgeError> {
        if start > end {
            return Err(BridgeError::invalid_argument(format!(
                "range start {start} is greater than range end {end}"
            )));
        }
        let codec = self.tree.codec();
        let (start, end) = (codec.to_native(start), codec.to_native(end));
        Ok(self.project(
            self.raw
                .and_then(|n| n.descendant_for_byte_range(start, end)),
        ))
    }

    /// First child that extends beyond `offset`.
    pub fn first_child_for_byte(&self, offset: usize) -> Result<Node<'tree>, BridgeError> {
        let native = self.check_offset(offset)?;
        Ok(self.project(self.raw.and_then(|n| n.first_child_for_byte(native))))
    }

    /// First named child that extends beyond `offset`.
    pub fn first_named_child_for_byte(&self, offset: usize) -> Result<Node<'tree>, BridgeError> {
        let native = self.check_offset(offset)?;
        Ok(self.project(self.raw.and_then(|n| n.first_named_child_for_byte(native))))
    }

    pub fn start_byte(&self) -> usize {
        self.raw
            .map_or(0, |n| self.tree.codec().from_native(n.start_byte()))
    }

    pub fn end_byte(&self) -> usize {
        self.raw
            .map_or(0, |n| self.tree.codec().from_native(n.end_byte()))
    }

    pub fn start_point(&self) -> Point {
        self.raw.map_or(Point::ORIGIN, |n| {
            self.tree.codec().point_from_native(n.start_position())
        })
    }

    pub fn end_point(&self) -> Point {
        self.raw.map_or(Point::ORIGIN, |n| {
            self.tree.codec().point_from_native(n.end_position())
        })
    }

    pub fn range(&self) -> Range {
        Range {
            start_byte: self.start_byte(),
            end_byte: self.end_byte(),
            start_point: self.start_point(),
            end_point: self.end_point(),
        }
    }

    pub fn parent(&self) -> Option<Node<'tree>> {
        self.navigate(|n| n.parent())
    }

    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        self.navigate(|n| n.next_sibling())
    }

    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        self.navigate(|n| n.prev_sibling())
    }

    pub fn next_named_sibling(&self) -> Option<Node<'tree>> {
        self.navigate(|n| n.next_named_sibling())
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'tree>> {
        self.navigate(|n| n.prev_named_sibling())
    }

    /// Grammar symbol name; `None` for the null node.
    pub fn kind(&self) -> Option<&'static str> {
        self.raw.map(|n| n.kind())
    }

    /// Parse state the node was produced in; 0 for the null node.
    pub fn parse_state(&self) -> u16 {
        self.raw.map_or(0, |n| n.parse_state())
    }

    /// Parse state after this node, the usual input for
    /// [`crate::Language::lookahead`].
    pub fn next_parse_state(&self) -> u16 {
        self.raw.map_or(0, |n| n.next_parse_state())
    }

    pub fn has_error(&self) -> bool {
        self.raw.is_some_and(|n| n.has_error())
    }

    pub fn is_error(&self) -> bool {
        self.raw.is_some_and(|n| n.is_error())
    }

    pub fn is_extra(&self) -> bool {
        self.raw.is_some_and(|n| n.is_extra())
    }

    pub fn is_missing(&self) -> bool {
        self.raw.is_some_and(|n| n.is_missing())
    }

    pub fn is_named(&self) -> bool {
        self.raw.is_some_and(|n| n.is_named())
    }

    /// Source text spanned by the node; `None` for the null node.
    pub fn content(&self) -> Option<Cow<'tree, str>> {
        let tree = self.tree;
        self.raw.map(|n| tree.source().text(n.byte_range()))
    }

    /// S-expression of the subtree as formatted by the engine. Empty for the
    /// null node.
    pub fn to_sexp(&self) -> String {
        self.raw.map(|n| n.to_sexp()).unwrap_or_default()
    }

    /// Cursor rooted at this node.
    pub fn walk(&self) -> Result<TreeCursor<'tree>, BridgeError> {
        TreeCursor::new(*self)
    }

    /// Query cursor that will run `query` over this node's subtree.
    pub fn query<'query>(
        &self,
        query: &'query Query,
    ) -> Result<QueryCursor<'query, 'tree>, BridgeError> {
        QueryCursor::new(query, *self)
    }

    /// Pre-order iterator over the subtree rooted at this node, this node
    /// included.
    pub fn descendants(&self) -> Descendants<'tree> {
        Descendants {
            cursor: self.walk().ok(),
            done: false,
        }
    }

    fn navigate(
        &self,
        step: impl FnOnce(tree_sitter::Node<'tree>) -> Option<tree_sitter::Node<'tree>>,
    ) -> Option<Node<'tree>> {
        self.raw.and_then(step).map(|n| self.project(Some(n)))
    }

    fn check_child_index(&self, index: usize) -> Result<(), BridgeError> {
        let count = self.child_count();
        if index >= count {
            return Err(BridgeError::IndexOutOfRange { index, count });
        }
        Ok(())
    }

    /// Converts `offset` to native units and checks it against the node span.
    fn check_offset(&self, offset: usize) -> Result<usize, BridgeError> {
        let native = self.tree.codec().to_native(offset);
        let (start, end) = self
            .raw
            .map_or((0, 0), |n| (n.start_byte(), n.end_byte()));
        if native < start || native > end {
            return Err(BridgeError::OffsetOutOfRange {
                offset,
                start: self.start_byte(),
                end: self.end_byte(),
            });
        }
        Ok(native)
    }
}

impl PartialEq for Node<'_> {
    /// Same tree and same native node. Cached projections play no part.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.raw.map(|n| n.id()) == other.raw.map(|n| n.id())
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.map(|n| n.id()).hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw {
            Some(raw) => write!(
                f,
                "Node(id: {}, tree: {}, type: {}, range: {})",
                raw.id(),
                self.tree.id(),
                raw.kind(),
                self.range()
            ),
            None => write!(f, "Node(null, tree: {})", self.tree.id()),
        }
    }
}

/// Pre-order walk produced by [`Node::descendants`].
pub struct Descendants<'tree> {
    cursor: Option<TreeCursor<'tree>>,
    done: bool,
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let cursor = self.cursor.as_mut()?;
        let current = cursor.current_node();
        if !cursor.goto_first_child() && !cursor.goto_next_sibling() {
            loop {
                if !cursor.goto_parent() {
                    self.done = true;
                    break;
                }
                if cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        Some(current)
    }
}
