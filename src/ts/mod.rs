//! Handle-based projection of the tree-sitter object graph.
//!
//! Parsers and trees own native resources and release them on drop. Nodes
//! and cursors borrow the tree they were derived from, so the borrow checker
//! rejects any use of them after the tree is gone. All offsets crossing this
//! module are in caller units and go through [`crate::codec::PositionCodec`].

pub mod cursor;
pub mod errors;
pub mod node;
pub mod parser;
pub mod predicate;
pub mod query;
pub mod tree;

pub use cursor::{TreeCursor, TreeCursorNode};
pub use errors::{BridgeError, ErrorKind, QueryErrorKind};
pub use node::{Descendants, Node};
pub use parser::Parser;
pub use predicate::{Predicate, PredicateArg};
pub use query::{Pattern, Query, QueryCapture, QueryCursor, QueryMatch, QueryMatches};
pub use tree::{Tree, TreeId};
