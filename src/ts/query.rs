use crate::config::QuerySettings;
use crate::lang::Language;
use crate::ts::errors::{BridgeError, QueryErrorKind};
use crate::ts::node::Node;
use crate::ts::predicate::{predicates_in, Predicate};
use crate::ts::tree::Tree;
use std::borrow::Cow;
use std::fmt;
use std::iter;
use tree_sitter::{StreamingIterator, TextProvider};

/// A compiled tree-sitter query.
///
/// Queries do not depend on any tree and are immutable once compiled (apart
/// from disabling patterns/captures, which needs `&mut`). A single query can
/// back any number of [`QueryCursor`]s, including on other threads.
///
/// # Query Syntax
///
/// Tree-sitter queries use S-expression syntax:
/// ```text
/// (binary_expression
///   left: (identifier) @left
///   right: (_) @right)
/// ```
///
/// Captures are prefixed with `@` and can be referenced by name.
pub struct Query {
    inner: tree_sitter::Query,
    language: Language,
    source: String,
}

impl Query {
    pub fn new(language: Language, source: &str) -> Result<Self, BridgeError> {
        if source.trim().is_empty() {
            return Err(BridgeError::QuerySyntax {
                offset: 0,
                row: 0,
                column: 0,
                kind: QueryErrorKind::Syntax,
                message: "query must contain at least one pattern".to_string(),
            });
        }
        let inner = tree_sitter::Query::new(&language.ts_language(), source)?;
        tracing::debug!(
            %language,
            patterns = inner.pattern_count(),
            captures = inner.capture_names().len(),
            "compiled query"
        );
        Ok(Self {
            inner,
            language,
            source: source.to_string(),
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn capture_names(&self) -> &[&str] {
        self.inner.capture_names()
    }

    pub fn pattern_count(&self) -> usize {
        self.inner.pattern_count()
    }

    /// The individual patterns making up the query, in source order.
    pub fn patterns(&self) -> Vec<Pattern> {
        let count = self.inner.pattern_count();
        (0..count)
            .map(|index| {
                let start = self.inner.start_byte_for_pattern(index);
                let end = if index + 1 < count {
                    self.inner.start_byte_for_pattern(index + 1)
                } else {
                    self.source.len()
                };
                let value = self.source.get(start..end).unwrap_or_default().trim_end();
                Pattern {
                    index,
                    start_offset: start,
                    rooted: self.inner.is_pattern_rooted(index),
                    non_local: self.inner.is_pattern_non_local(index),
                    predicates: predicates_in(value),
                    value: value.to_string(),
                }
            })
            .collect()
    }

    /// Stop matching pattern `index`. Cannot be undone.
    pub fn disable_pattern(&mut self, index: usize) -> Result<(), BridgeError> {
        let count = self.inner.pattern_count();
        if index >= count {
            return Err(BridgeError::IndexOutOfRange { index, count });
        }
        self.inner.disable_pattern(index);
        Ok(())
    }

    /// Stop producing captures named `name`. Cannot be undone.
    pub fn disable_capture(&mut self, name: &str) -> Result<(), BridgeError> {
        if !self.capture_names().contains(&name) {
            return Err(BridgeError::invalid_argument(format!(
                "query has no capture named '{name}'"
            )));
        }
        self.inner.disable_capture(name);
        Ok(())
    }

    /// Execute against `node` and collect every match.
    pub fn find_all<'query, 'tree>(
        &'query self,
        node: Node<'tree>,
    ) -> Result<Vec<QueryMatch<'query, 'tree>>, BridgeError> {
        let mut cursor = node.query(self)?;
        let matches = cursor.execute().collect();
        Ok(matches)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("language", &self.language)
            .field("patterns", &self.pattern_count())
            .field("captures", &self.capture_names())
            .finish()
    }
}

/// One pattern of a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub index: usize,
    /// Byte offset of the pattern within the query source.
    pub start_offset: usize,
    pub rooted: bool,
    pub non_local: bool,
    pub value: String,
    pub predicates: Vec<Predicate>,
}

impl Pattern {
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.value.len()
    }
}

/// Execution state binding a [`Query`] to a subtree.
///
/// Nothing runs until [`QueryCursor::execute`]; each call starts a fresh
/// forward-only scan.
pub struct QueryCursor<'query, 'tree> {
    query: &'query Query,
    node: Node<'tree>,
    raw: tree_sitter::Node<'tree>,
    inner: tree_sitter::QueryCursor,
}

impl<'query, 'tree> QueryCursor<'query, 'tree> {
    pub(crate) fn new(query: &'query Query, node: Node<'tree>) -> Result<Self, BridgeError> {
        let raw = node.raw().ok_or_else(|| {
            BridgeError::illegal_state("cannot construct a query cursor from the null node")
        })?;
        if query.language() != node.tree().language() {
            return Err(BridgeError::illegal_state(format!(
                "query for {} cannot run on a {} tree",
                query.language(),
                node.tree().language()
            )));
        }
        Ok(Self {
            query,
            node,
            raw,
            inner: tree_sitter::QueryCursor::new(),
        })
    }

    pub fn query(&self) -> &'query Query {
        self.query
    }

    pub fn node(&self) -> Node<'tree> {
        self.node
    }

    /// Restrict matches to nodes intersecting `start..end` (caller units).
    pub fn set_byte_range(&mut self, start: usize, end: usize) -> Result<&mut Self, BridgeError> {
        if start > end {
            return Err(BridgeError::invalid_argument(format!(
                "range start {start} is greater than range end {end}"
            )));
        }
        let codec = self.node.tree().codec();
        self.inner
            .set_byte_range(codec.to_native(start)..codec.to_native(end));
        Ok(self)
    }

    /// Cap the number of in-progress matches kept by the engine.
    pub fn set_match_limit(&mut self, limit: u32) -> &mut Self {
        self.inner.set_match_limit(limit);
        self
    }

    pub fn did_exceed_match_limit(&self) -> bool {
        self.inner.did_exceed_match_limit()
    }

    pub fn apply_settings(&mut self, settings: &QuerySettings) -> &mut Self {
        if let Some(limit) = settings.match_limit {
            self.set_match_limit(limit.get());
        }
        self
    }

    /// Start a new scan over the bound subtree.
    pub fn execute(&mut self) -> QueryMatches<'_, 'query, 'tree> {
        let tree = self.node.tree();
        let query = self.query;
        let inner = self
            .inner
            .matches(&query.inner, self.raw, SourceText { tree });
        QueryMatches {
            query,
            tree,
            inner,
            exhausted: false,
        }
    }
}

impl fmt::Debug for QueryCursor<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryCursor(node: {:?}, query: {:?})", self.node, self.query)
    }
}

/// Lazily enumerated matches of one [`QueryCursor::execute`] call.
pub struct QueryMatches<'cursor, 'query, 'tree> {
    query: &'query Query,
    tree: &'tree Tree,
    inner: tree_sitter::QueryMatches<'cursor, 'tree, SourceText<'tree>, Cow<'tree, [u8]>>,
    exhausted: bool,
}

impl<'query, 'tree> QueryMatches<'_, 'query, 'tree> {
    /// Next match in engine order, or `None` once the scan is exhausted.
    /// Exhaustion is final.
    pub fn next_match(&mut self) -> Option<QueryMatch<'query, 'tree>> {
        if self.exhausted {
            return None;
        }
        let Some(found) = self.inner.next() else {
            tracing::trace!(tree = %self.tree.id(), "query matches exhausted");
            self.exhausted = true;
            return None;
        };
        let names = self.query.capture_names();
        let captures = found
            .captures
            .iter()
            .map(|capture| QueryCapture {
                name: names[capture.index as usize],
                node: Node::new(self.tree, capture.node),
            })
            .collect();
        Some(QueryMatch {
            pattern_index: found.pattern_index,
            captures,
        })
    }
}

impl<'query, 'tree> Iterator for QueryMatches<'_, 'query, 'tree> {
    type Item = QueryMatch<'query, 'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_match()
    }
}

/// One occurrence of a query pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'query, 'tree> {
    pub pattern_index: usize,
    pub captures: Vec<QueryCapture<'query, 'tree>>,
}

impl<'query, 'tree> QueryMatch<'query, 'tree> {
    /// Nodes captured under `name`, in capture order.
    pub fn nodes_for_capture(&self, name: &str) -> Vec<Node<'tree>> {
        self.captures
            .iter()
            .filter(|capture| capture.name == name)
            .map(|capture| capture.node)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'query, 'tree> {
    pub name: &'query str,
    pub node: Node<'tree>,
}

/// Supplies node text to predicates as UTF-8, whatever the source encoding.
struct SourceText<'tree> {
    tree: &'tree Tree,
}

impl<'tree> TextProvider<Cow<'tree, [u8]>> for SourceText<'tree> {
    type I = iter::Once<Cow<'tree, [u8]>>;

    fn text(&mut self, node: tree_sitter::Node) -> Self::I {
        iter::once(self.tree.source().utf8_bytes(node.byte_range()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::errors::ErrorKind;
    use crate::Parser;

    fn parse(source: &str) -> Tree {
        let mut parser = Parser::with_language(Language::JAVASCRIPT).unwrap();
        parser.parse(source).unwrap()
    }

    #[test]
    fn empty_query_is_a_syntax_error() {
        for source in ["", "   \n"] {
            let err = Query::new(Language::JAVASCRIPT, source).unwrap_err();
            assert!(matches!(
                err,
                BridgeError::QuerySyntax {
                    offset: 0,
                    kind: QueryErrorKind::Syntax,
                    ..
                }
            ));
        }
    }

    #[test]
    fn unknown_node_type_is_classified() {
        let err = Query::new(Language::JAVASCRIPT, "(no_such_node) @x").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::QuerySyntax {
                offset: 1,
                kind: QueryErrorKind::NodeType,
                ..
            }
        ));
    }

    #[test]
    fn unbalanced_pattern_is_syntax_error() {
        let err = Query::new(Language::JAVASCRIPT, "(identifier").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::QuerySyntax {
                kind: QueryErrorKind::Syntax,
                ..
            }
        ));
    }

    #[test]
    fn patterns_are_listed_in_order() {
        let query =
            Query::new(Language::JAVASCRIPT, "(identifier) @id\n(number) @num\n").unwrap();
        let patterns = query.patterns();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].value, "(identifier) @id");
        assert_eq!(patterns[0].start_offset, 0);
        assert_eq!(patterns[1].value, "(number) @num");
        assert_eq!(patterns[1].start_offset, 17);
        assert_eq!(patterns[1].end_offset(), 30);
    }

    #[test]
    fn patterns_carry_their_predicates() {
        let query = Query::new(
            Language::JAVASCRIPT,
            "((identifier) @id (#eq? @id \"b\"))\n(number) @num\n",
        )
        .unwrap();
        let patterns = query.patterns();
        assert_eq!(patterns[0].predicates.len(), 1);
        assert_eq!(patterns[0].predicates[0].to_string(), "(#eq? @id \"b\")");
        assert!(patterns[1].predicates.is_empty());
    }

    #[test]
    fn disabled_pattern_stops_matching() {
        let tree = parse("a + 1");
        let mut query =
            Query::new(Language::JAVASCRIPT, "(identifier) @id\n(number) @num").unwrap();
        query.disable_pattern(0).unwrap();
        let matches = query.find_all(tree.root_node()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].captures[0].name, "num");
        assert_eq!(
            query.disable_pattern(5).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
    }

    #[test]
    fn disable_unknown_capture_is_invalid() {
        let mut query = Query::new(Language::JAVASCRIPT, "(identifier) @id").unwrap();
        let err = query.disable_capture("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn query_cursor_requires_matching_language() {
        let tree = parse("a");
        let query = Query::new(Language::PYTHON, "(identifier) @id").unwrap();
        let err = tree.root_node().query(&query).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn null_node_cannot_be_queried() {
        let tree = parse("a");
        let query = Query::new(Language::JAVASCRIPT, "(identifier) @id").unwrap();
        let err = Node::null(&tree).query(&query).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn exhausted_matches_stay_exhausted() {
        let tree = parse("a");
        let query = Query::new(Language::JAVASCRIPT, "(identifier) @id").unwrap();
        let mut cursor = tree.root_node().query(&query).unwrap();
        let mut matches = cursor.execute();
        assert!(matches.next_match().is_some());
        assert!(matches.next_match().is_none());
        assert!(matches.next_match().is_none());
    }

    #[test]
    fn execute_rescans_from_the_start() {
        let tree = parse("a+b");
        let query = Query::new(Language::JAVASCRIPT, "(identifier) @id").unwrap();
        let mut cursor = tree.root_node().query(&query).unwrap();
        assert_eq!(cursor.execute().count(), 2);
        assert_eq!(cursor.execute().count(), 2);
    }

    #[test]
    fn byte_range_restricts_matches() {
        let tree = parse("a+b");
        let query = Query::new(Language::JAVASCRIPT, "(identifier) @id").unwrap();
        let mut cursor = tree.root_node().query(&query).unwrap();
        cursor.set_byte_range(2, 3).unwrap();
        let matches: Vec<_> = cursor.execute().collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].captures[0].node.content().as_deref(), Some("b"));
        assert_eq!(
            cursor.set_byte_range(3, 2).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn settings_apply_match_limit() {
        let tree = parse("a+b");
        let query = Query::new(Language::JAVASCRIPT, "(identifier) @id").unwrap();
        let mut cursor = tree.root_node().query(&query).unwrap();
        cursor.apply_settings(&QuerySettings {
            match_limit: std::num::NonZeroU32::new(32),
        });
        assert_eq!(cursor.execute().count(), 2);
        assert!(!cursor.did_exceed_match_limit());
    }
}
