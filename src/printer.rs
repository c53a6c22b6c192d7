//! Plain-text rendering of syntax trees.

use crate::ts::TreeCursor;
use std::fmt::{self, Write};

/// Renders the named nodes below a cursor, one per line:
///
/// ```text
/// program [0:0] - [0:3]
///   expression_statement [0:0] - [0:3]
///     binary_expression [0:0] - [0:3]
///       left: identifier [0:0] - [0:1]
///       right: identifier [0:2] - [0:3]
/// ```
pub struct SyntaxTreePrinter<'cursor, 'tree> {
    cursor: &'cursor mut TreeCursor<'tree>,
}

impl<'cursor, 'tree> SyntaxTreePrinter<'cursor, 'tree> {
    pub fn new(cursor: &'cursor mut TreeCursor<'tree>) -> Self {
        Self { cursor }
    }

    /// Render the subtree. The cursor is back on its starting node
    /// afterwards.
    pub fn print(&mut self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        loop {
            if self.cursor.current_node().is_named() {
                let node = self.cursor.current_tree_cursor_node();
                out.push_str(&"  ".repeat(depth));
                out.push_str(&node.to_string());
                out.push('\n');
            }
            if self.cursor.goto_first_child() {
                depth += 1;
                continue;
            }
            if self.cursor.goto_next_sibling() {
                continue;
            }
            loop {
                if !self.cursor.goto_parent() {
                    return out;
                }
                depth -= 1;
                if self.cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }

    pub fn write(&mut self, out: &mut impl Write) -> fmt::Result {
        out.write_str(&self.print())
    }
}
