//! Sitter Bridge: handle-based access to tree-sitter syntax trees
//!
//! Exposes the tree-sitter object graph (parser, tree, node, tree cursor,
//! query, query cursor) as owned resources and cheap value projections,
//! with every offset translated into the caller's text encoding.
//!
//! # Architecture
//!
//! - [`Parser`] and [`Tree`] own native resources and release them exactly
//!   once, on drop or on an explicit `delete`.
//! - [`Node`] is a copyable value borrowing its tree; the null node models
//!   absence and never fails structural queries.
//! - [`TreeCursor`] and [`QueryCursor`] are explicit, single-writer state
//!   machines bound to one tree.
//! - [`codec::PositionCodec`] converts between caller offsets and the native
//!   byte offsets of the chosen [`Encoding`].
//!
//! # Example
//!
//! ```no_run
//! use sitter_bridge::{Encoding, Language, Parser, Query};
//!
//! # fn main() -> Result<(), sitter_bridge::BridgeError> {
//! let mut parser = Parser::with_language(Language::JAVASCRIPT)?;
//! parser.set_encoding(Encoding::Utf16);
//! let tree = parser.parse("a+b")?;
//!
//! let query = Query::new(Language::JAVASCRIPT, "(identifier) @id")?;
//! let mut cursor = tree.root_node().query(&query)?;
//! let mut matches = cursor.execute();
//! while let Some(m) = matches.next_match() {
//!     for capture in &m.captures {
//!         println!("{}: {:?}", capture.name, capture.node.content());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod lang;
pub mod point;
pub mod pool;
pub mod printer;
pub mod ts;

// Re-exports
pub use codec::{Encoding, PositionCodec, SourceBuffer};
pub use config::{load_from_path, load_from_str, BridgeConfig, ConfigError, QuerySettings};
pub use lang::{Language, Lookahead, Symbol, SymbolKind};
pub use point::{InputEdit, Point, Range};
pub use printer::SyntaxTreePrinter;
pub use ts::{
    BridgeError, ErrorKind, Node, Parser, Pattern, Predicate, PredicateArg, Query, QueryCapture,
    QueryCursor, QueryErrorKind, QueryMatch, QueryMatches, Tree, TreeCursor, TreeCursorNode,
    TreeId,
};
