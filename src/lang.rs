//! Grammar lookup via ast-grep-language.
//!
//! We reuse the grammars bundled with `ast-grep-language` instead of linking
//! individual `tree-sitter-*` crates. Names and aliases accepted by
//! `SupportLang::from_str` ("js", "javascript", "py", "rust", ...) all work.

use crate::ts::BridgeError;
use ast_grep_language::{Language as _, LanguageExt, SupportLang};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// A grammar the parser and queries can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Language(SupportLang);

impl Language {
    pub const JAVASCRIPT: Language = Language(SupportLang::JavaScript);
    pub const PYTHON: Language = Language(SupportLang::Python);
    pub const RUST: Language = Language(SupportLang::Rust);

    /// Resolve a grammar by name or alias.
    pub fn from_name(name: &str) -> Result<Self, BridgeError> {
        name.trim()
            .parse::<SupportLang>()
            .map(Language)
            .map_err(|_| BridgeError::UnknownLanguage {
                name: name.to_string(),
            })
    }

    /// Grammar conventionally used for the file at `path`, judged by its
    /// extension. `None` when no bundled grammar claims the extension.
    pub fn associated_with(path: impl AsRef<Path>) -> Result<Option<Self>, BridgeError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(BridgeError::invalid_argument(format!(
                "{} is a directory",
                path.display()
            )));
        }
        Ok(SupportLang::from_path(path).map(Language))
    }

    pub fn support_lang(&self) -> SupportLang {
        self.0
    }

    /// The engine-level grammar handle.
    pub fn ts_language(&self) -> tree_sitter::Language {
        self.0.get_ts_language()
    }

    /// All grammar symbols, in id order.
    pub fn symbols(&self) -> Vec<Symbol> {
        let language = self.ts_language();
        (0..language.node_kind_count())
            .filter_map(|id| u16::try_from(id).ok())
            .filter_map(|id| symbol_of(&language, id))
            .collect()
    }

    pub fn symbol(&self, id: u16) -> Option<Symbol> {
        symbol_of(&self.ts_language(), id)
    }

    pub fn parse_state_count(&self) -> usize {
        self.ts_language().parse_state_count()
    }

    /// Symbols the grammar accepts next in parse `state`.
    ///
    /// Useful for diagnostics: the state of the first leaf of an ERROR node
    /// tells which tokens would have been valid there. Returns `None` for a
    /// state the grammar does not have.
    pub fn lookahead(&self, state: u16) -> Option<Lookahead> {
        let language = self.ts_language();
        let inner = language.lookahead_iterator(state)?;
        Some(Lookahead { language, inner })
    }

    /// Field names declared by the grammar. Field ids start at 1.
    pub fn field_names(&self) -> Vec<&'static str> {
        let language = self.ts_language();
        (1..=language.field_count())
            .filter_map(|id| u16::try_from(id).ok())
            .filter_map(|id| language.field_name_for_id(id))
            .collect()
    }
}

fn symbol_of(language: &tree_sitter::Language, id: u16) -> Option<Symbol> {
    let name = language.node_kind_for_id(id)?;
    let kind = match (
        language.node_kind_is_visible(id),
        language.node_kind_is_named(id),
    ) {
        (true, true) => SymbolKind::Regular,
        (true, false) => SymbolKind::Anonymous,
        (false, _) => SymbolKind::Auxiliary,
    };
    Some(Symbol { id, kind, name })
}

impl TryFrom<String> for Language {
    type Error = BridgeError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Language::from_name(&name)
    }
}

impl From<SupportLang> for Language {
    fn from(lang: SupportLang) -> Self {
        Language(lang)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A node kind known to a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub id: u16,
    pub kind: SymbolKind,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Named, visible rule.
    Regular,
    /// String literal in the grammar.
    Anonymous,
    /// Hidden rule.
    Auxiliary,
}

/// Valid next symbols for one parse state, from [`Language::lookahead`].
pub struct Lookahead {
    language: tree_sitter::Language,
    inner: tree_sitter::LookaheadIterator,
}

impl Iterator for Lookahead {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        loop {
            let id = self.inner.next()?;
            if let Some(symbol) = symbol_of(&self.language, id) {
                return Some(symbol);
            }
        }
    }
}

impl fmt::Debug for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookahead").finish_non_exhaustive()
    }
}
