use crate::codec::{Encoding, SourceBuffer};
use crate::config::BridgeConfig;
use crate::lang::Language;
use crate::ts::errors::BridgeError;
use crate::ts::tree::Tree;
use std::fmt;
use std::fs;
use std::path::Path;

/// Tree-sitter parser bound to a language and a caller text encoding.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: Option<Language>,
    encoding: Encoding,
}

impl Parser {
    /// Create a parser with no language. [`Parser::set_language`] must be
    /// called before parsing.
    pub fn new() -> Self {
        Self {
            inner: tree_sitter::Parser::new(),
            language: None,
            encoding: Encoding::default(),
        }
    }

    pub fn with_language(language: Language) -> Result<Self, BridgeError> {
        let mut parser = Self::new();
        parser.set_language(language)?;
        Ok(parser)
    }

    /// Create a parser from the language and encoding of a loaded config.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let mut parser = Self::with_language(config.language)?;
        parser.set_encoding(config.encoding);
        Ok(parser)
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), BridgeError> {
        self.inner
            .set_language(&language.ts_language())
            .map_err(|e| BridgeError::LanguageSet {
                language: language.to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(%language, "assigned parser language");
        self.language = Some(language);
        Ok(())
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Select the unit callers use for offsets on trees produced from now on.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    /// Parse source code into a new tree.
    ///
    /// A tree containing ERROR or MISSING nodes is still a successful parse;
    /// check [`crate::Node::has_error`] on the root.
    pub fn parse(&mut self, source: &str) -> Result<Tree, BridgeError> {
        self.parse_buffer(SourceBuffer::encode(source, self.encoding), None)
    }

    /// Incrementally parse the current text of `old_tree`, reusing its
    /// unchanged parts. The old tree must already reflect every edit via
    /// [`Tree::edit`].
    pub fn reparse(&mut self, old_tree: &Tree) -> Result<Tree, BridgeError> {
        if old_tree.encoding() != self.encoding {
            return Err(BridgeError::invalid_argument(format!(
                "old tree uses {:?} offsets but the parser is set to {:?}",
                old_tree.encoding(),
                self.encoding
            )));
        }
        self.parse_buffer(old_tree.source().clone(), Some(old_tree))
    }

    /// Read a file and parse its contents. A parser without a language
    /// adopts the one associated with the file extension.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<Tree, BridgeError> {
        let path = path.as_ref();
        if self.language.is_none() {
            if let Some(language) = Language::associated_with(path)? {
                self.set_language(language)?;
            }
        }
        let source = fs::read_to_string(path).map_err(|source| BridgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&source)
    }

    /// Drop any state left over from an interrupted parse.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Release the native parser now.
    pub fn delete(self) {
        drop(self);
    }

    fn parse_buffer(
        &mut self,
        source: SourceBuffer,
        old_tree: Option<&Tree>,
    ) -> Result<Tree, BridgeError> {
        let language = self
            .language
            .ok_or_else(|| BridgeError::illegal_state("parser has no language assigned"))?;
        let old = old_tree.map(Tree::raw);
        let parsed = match &source {
            SourceBuffer::Utf8(text) => self.inner.parse(text, old),
            SourceBuffer::Utf16(units) => self.inner.parse_utf16_le(units, old),
        };
        let tree = parsed.ok_or(BridgeError::ParseFailed)?;
        Ok(Tree::new(tree, source, language))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language)
            .field("encoding", &self.encoding)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{InputEdit, Point};
    use crate::ts::errors::ErrorKind;

    #[test]
    fn parse_without_language_is_illegal_state() {
        let mut parser = Parser::new();
        let err = parser.parse("a+b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn parse_python_module() {
        let mut parser = Parser::with_language(Language::PYTHON).unwrap();
        let tree = parser.parse("print(\"hi\")\n").unwrap();
        let root = tree.root_node();
        assert_eq!(root.kind(), Some("module"));
        assert_eq!(root.start_point(), Point::new(0, 0));
        assert_eq!(root.end_point(), Point::new(1, 0));
    }

    #[test]
    fn set_language_switches_grammar() {
        let mut parser = Parser::with_language(Language::PYTHON).unwrap();
        parser.set_language(Language::JAVASCRIPT).unwrap();
        assert_eq!(parser.language(), Some(Language::JAVASCRIPT));
        let tree = parser.parse("let x = 1;").unwrap();
        assert_eq!(tree.root_node().kind(), Some("program"));
    }

    #[test]
    fn error_flagged_tree_is_still_a_successful_parse() {
        let mut parser = Parser::with_language(Language::JAVASCRIPT).unwrap();
        let tree = parser.parse("a + ;").unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn reparse_after_edit() {
        let mut parser = Parser::with_language(Language::JAVASCRIPT).unwrap();
        let mut tree = parser.parse("a+b").unwrap();
        tree.edit(
            &InputEdit {
                start_byte: 2,
                old_end_byte: 3,
                new_end_byte: 5,
                start_point: Point::new(0, 2),
                old_end_point: Point::new(0, 3),
                new_end_point: Point::new(0, 5),
            },
            "a+bcd",
        );
        let updated = parser.reparse(&tree).unwrap();
        let root = updated.root_node();
        assert_eq!(root.end_byte(), 5);
        let right = root.descendant_for_byte_range(2, 5).unwrap();
        assert_eq!(right.kind(), Some("identifier"));
        assert_eq!(right.content().as_deref(), Some("bcd"));
    }

    #[test]
    fn reparse_rejects_mismatched_encoding() {
        let mut parser = Parser::with_language(Language::JAVASCRIPT).unwrap();
        let tree = parser.parse("a").unwrap();
        parser.set_encoding(Encoding::Utf16);
        let err = parser.reparse(&tree).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn parse_file_reads_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, "fn main() {}\n").unwrap();
        let mut parser = Parser::with_language(Language::RUST).unwrap();
        let tree = parser.parse_file(&path).unwrap();
        let root = tree.root_node();
        assert_eq!(root.kind(), Some("source_file"));
        assert_eq!(
            root.child(0).unwrap().kind(),
            Some("function_item")
        );
    }

    #[test]
    fn parse_file_infers_language_from_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("script.py");
        fs::write(&path, "x = 1\n").unwrap();
        let mut parser = Parser::new();
        let tree = parser.parse_file(&path).unwrap();
        assert_eq!(parser.language(), Some(Language::PYTHON));
        assert_eq!(tree.root_node().kind(), Some("module"));
    }

    #[test]
    fn unassociated_file_without_language_is_illegal_state() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.unknownext");
        fs::write(&path, "x").unwrap();
        let err = Parser::new().parse_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn parse_missing_file_is_io_error() {
        let mut parser = Parser::with_language(Language::JAVASCRIPT).unwrap();
        let err = parser.parse_file("/definitely/not/here.js").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
