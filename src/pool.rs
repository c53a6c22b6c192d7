//! Thread-local parser pooling.
//!
//! Keeps one parser per (language, encoding) pair on each thread. The first
//! call for a pair creates the parser; later calls reuse it. A parser is
//! checked out of the pool while the callback runs, so callbacks may use the
//! pool again.

use crate::codec::Encoding;
use crate::lang::Language;
use crate::ts::{BridgeError, Parser};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static PARSERS: RefCell<HashMap<(Language, Encoding), Parser>> = RefCell::new(HashMap::new());
}

/// Execute function with a pooled parser for `language` and `encoding`.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use sitter_bridge::pool::with_parser;
/// use sitter_bridge::{Encoding, Language};
///
/// let tree = with_parser(Language::JAVASCRIPT, Encoding::Utf8, |parser| {
///     parser.parse("a + b")
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(language: Language, encoding: Encoding, f: F) -> Result<R, BridgeError>
where
    F: FnOnce(&mut Parser) -> R,
{
    let key = (language, encoding);
    let pooled = PARSERS.with(|cell| cell.borrow_mut().remove(&key));
    let mut parser = match pooled {
        Some(parser) => parser,
        None => {
            let mut parser = Parser::with_language(language)?;
            parser.set_encoding(encoding);
            parser
        }
    };
    let result = f(&mut parser);
    PARSERS.with(|cell| cell.borrow_mut().insert(key, parser));
    Ok(result)
}

/// Number of parsers pooled on the current thread.
pub fn pooled_parsers() -> usize {
    PARSERS.with(|cell| cell.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsers_are_reused_per_language_and_encoding() {
        let before = pooled_parsers();
        let end = with_parser(Language::JAVASCRIPT, Encoding::Utf16, |parser| {
            parser.parse("a+b").map(|tree| tree.root_node().end_byte())
        })
        .unwrap()
        .unwrap();
        assert_eq!(end, 3);
        with_parser(Language::JAVASCRIPT, Encoding::Utf16, |_| ()).unwrap();
        assert_eq!(pooled_parsers(), before + 1);
        with_parser(Language::JAVASCRIPT, Encoding::Utf8, |_| ()).unwrap();
        assert_eq!(pooled_parsers(), before + 2);
    }

    #[test]
    fn nested_calls_get_their_own_parsers() {
        let (outer, inner) = with_parser(Language::JAVASCRIPT, Encoding::Utf8, |js| {
            let embedded = with_parser(Language::PYTHON, Encoding::Utf8, |py| {
                py.parse("x = 1\n").map(|tree| tree.root_node().kind())
            })
            .unwrap()
            .unwrap();
            let same_key = with_parser(Language::JAVASCRIPT, Encoding::Utf8, |again| {
                again.parse("c").map(|tree| tree.root_node().end_byte())
            })
            .unwrap()
            .unwrap();
            assert_eq!(same_key, 1);
            let host = js.parse("a+b").map(|tree| tree.root_node().kind());
            (host.unwrap(), embedded)
        })
        .unwrap();
        assert_eq!(outer, Some("program"));
        assert_eq!(inner, Some("module"));
        assert_eq!(pooled_parsers(), 2);
    }
}
