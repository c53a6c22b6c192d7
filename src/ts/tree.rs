use crate::codec::{Encoding, PositionCodec, SourceBuffer};
use crate::lang::Language;
use crate::point::InputEdit;
use crate::ts::cursor::TreeCursor;
use crate::ts::node::Node;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Tree`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed syntax tree together with the source buffer it was parsed from.
///
/// The tree is the sole owner of the native tree. Every [`Node`],
/// [`TreeCursor`] and [`crate::QueryCursor`] derived from it borrows it, so
/// the tree cannot be edited, deleted or dropped while any of them is alive:
///
/// ```compile_fail
/// use sitter_bridge::{Language, Parser};
///
/// let mut parser = Parser::with_language(Language::JAVASCRIPT).unwrap();
/// let tree = parser.parse("a+b").unwrap();
/// let root = tree.root_node();
/// tree.delete();
/// root.child_count();
/// ```
pub struct Tree {
    id: TreeId,
    inner: tree_sitter::Tree,
    source: SourceBuffer,
    language: Language,
}

impl Tree {
    pub(crate) fn new(inner: tree_sitter::Tree, source: SourceBuffer, language: Language) -> Self {
        let tree = Self {
            id: TreeId::next(),
            inner,
            source,
            language,
        };
        tracing::trace!(
            tree = %tree.id,
            language = %tree.language,
            has_error = tree.inner.root_node().has_error(),
            "parsed syntax tree"
        );
        tree
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn encoding(&self) -> Encoding {
        self.source.encoding()
    }

    pub fn codec(&self) -> PositionCodec {
        self.encoding().codec()
    }

    pub fn source(&self) -> &SourceBuffer {
        &self.source
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, self.inner.root_node())
    }

    /// Cursor positioned at the root node.
    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::from_raw(self, self.inner.walk())
    }

    /// Apply a source edit expressed in caller units. `new_source` is the
    /// full text after the edit; node ranges and text both reflect it, while
    /// the structure stays stale until [`crate::Parser::reparse`].
    pub fn edit(&mut self, edit: &InputEdit, new_source: &str) {
        let codec = self.codec();
        self.inner.edit(&tree_sitter::InputEdit {
            start_byte: codec.to_native(edit.start_byte),
            old_end_byte: codec.to_native(edit.old_end_byte),
            new_end_byte: codec.to_native(edit.new_end_byte),
            start_position: codec.point_to_native(edit.start_point),
            old_end_position: codec.point_to_native(edit.old_end_point),
            new_end_position: codec.point_to_native(edit.new_end_point),
        });
        self.source = SourceBuffer::encode(new_source, self.encoding());
        tracing::trace!(tree = %self.id, start = edit.start_byte, "edited syntax tree");
    }

    /// Ranges whose syntactic structure differs between `self` (the edited
    /// old tree) and `other`.
    pub fn changed_ranges(&self, other: &Tree) -> Vec<crate::point::Range> {
        let codec = self.codec();
        self.inner
            .changed_ranges(&other.inner)
            .map(|range| codec.range_from_native(range))
            .collect()
    }

    /// Release the native tree now.
    pub fn delete(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &tree_sitter::Tree {
        &self.inner
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        tracing::trace!(tree = %self.id, "releasing syntax tree");
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree(id: {}, language: {}, encoding: {:?})",
            self.id,
            self.language,
            self.encoding()
        )
    }
}
