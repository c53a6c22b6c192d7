//! Predicates attached to query patterns, such as `(#eq? @name "main")`.
//!
//! The engine validates predicates at compile time but keeps the built-in
//! ones private, so they are read back from the pattern text.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Operator without the leading `#`, e.g. `eq?` or `set!`.
    pub name: String,
    pub args: Vec<PredicateArg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateArg {
    Capture(String),
    String(String),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(#{}", self.name)?;
        for arg in &self.args {
            match arg {
                PredicateArg::Capture(name) => write!(f, " @{name}")?,
                PredicateArg::String(value) => write!(f, " {value:?}")?,
            }
        }
        f.write_str(")")
    }
}

/// Predicates of one compiled pattern, in source order.
pub(crate) fn predicates_in(pattern: &str) -> Vec<Predicate> {
    let mut chars = pattern.chars().peekable();
    let mut found = Vec::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                read_string(&mut chars);
            }
            ';' => skip_comment(&mut chars),
            '(' => {
                skip_whitespace(&mut chars);
                if chars.next_if_eq(&'#').is_some() {
                    found.push(read_predicate(&mut chars));
                }
            }
            _ => {}
        }
    }
    found
}

fn read_predicate(chars: &mut Peekable<Chars<'_>>) -> Predicate {
    let name = read_word(chars);
    let mut args = Vec::new();
    loop {
        skip_whitespace(chars);
        match chars.next() {
            None | Some(')') => break,
            Some(';') => skip_comment(chars),
            Some('@') => args.push(PredicateArg::Capture(read_word(chars))),
            Some('"') => args.push(PredicateArg::String(read_string(chars))),
            Some(first) => {
                let mut word = first.to_string();
                word.push_str(&read_word(chars));
                args.push(PredicateArg::String(word));
            }
        }
    }
    Predicate { name, args }
}

fn read_word(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut word = String::new();
    while let Some(c) = chars.next_if(|c| !c.is_whitespace() && !matches!(*c, '(' | ')')) {
        word.push(c);
    }
    word
}

/// Reads up to the closing quote; the opening one is already consumed.
fn read_string(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('0') => value.push('\0'),
                Some(other) => value.push(other),
                None => break,
            },
            c => value.push(c),
        }
    }
    value
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn skip_comment(chars: &mut Peekable<Chars<'_>>) {
    for c in chars.by_ref() {
        if c == '\n' {
            break;
        }
    }
}
