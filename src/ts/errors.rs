use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("child index {index} is out of range for a node with {count} children")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("byte offset {offset} is outside of the node range {start}..={end}")]
    OffsetOutOfRange {
        offset: usize,
        start: usize,
        end: usize,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("illegal state: {message}")]
    IllegalState { message: String },

    #[error("invalid query ({kind}) at byte {offset}, row {row}, column {column}: {message}")]
    QuerySyntax {
        offset: usize,
        row: usize,
        column: usize,
        kind: QueryErrorKind,
        message: String,
    },

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("failed to set language {language} for parser: {message}")]
    LanguageSet { language: String, message: String },

    #[error("unknown language: {name}")]
    UnknownLanguage { name: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure categories exposed to callers, independent of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IndexOutOfRange,
    InvalidArgument,
    IllegalState,
    QuerySyntax,
    ParseFailure,
    Language,
    Io,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::IndexOutOfRange { .. } | BridgeError::OffsetOutOfRange { .. } => {
                ErrorKind::IndexOutOfRange
            }
            BridgeError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            BridgeError::IllegalState { .. } => ErrorKind::IllegalState,
            BridgeError::QuerySyntax { .. } => ErrorKind::QuerySyntax,
            BridgeError::ParseFailed => ErrorKind::ParseFailure,
            BridgeError::LanguageSet { .. } | BridgeError::UnknownLanguage { .. } => {
                ErrorKind::Language
            }
            BridgeError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        BridgeError::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn illegal_state(message: impl Into<String>) -> Self {
        BridgeError::IllegalState {
            message: message.into(),
        }
    }
}

/// Classification of a query compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    Syntax,
    NodeType,
    Field,
    Capture,
    Predicate,
    Structure,
    Language,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryErrorKind::Syntax => "syntax error",
            QueryErrorKind::NodeType => "bad node type",
            QueryErrorKind::Field => "bad field",
            QueryErrorKind::Capture => "bad capture",
            QueryErrorKind::Predicate => "bad predicate",
            QueryErrorKind::Structure => "impossible pattern",
            QueryErrorKind::Language => "incompatible language",
        };
        f.write_str(name)
    }
}

impl From<tree_sitter::QueryErrorKind> for QueryErrorKind {
    fn from(kind: tree_sitter::QueryErrorKind) -> Self {
        match kind {
            tree_sitter::QueryErrorKind::Syntax => QueryErrorKind::Syntax,
            tree_sitter::QueryErrorKind::NodeType => QueryErrorKind::NodeType,
            tree_sitter::QueryErrorKind::Field => QueryErrorKind::Field,
            tree_sitter::QueryErrorKind::Capture => QueryErrorKind::Capture,
            tree_sitter::QueryErrorKind::Predicate => QueryErrorKind::Predicate,
            tree_sitter::QueryErrorKind::Structure => QueryErrorKind::Structure,
            tree_sitter::QueryErrorKind::Language => QueryErrorKind::Language,
        }
    }
}

impl From<tree_sitter::QueryError> for BridgeError {
    fn from(error: tree_sitter::QueryError) -> Self {
        BridgeError::QuerySyntax {
            offset: error.offset,
            row: error.row,
            column: error.column,
            kind: error.kind.into(),
            message: error.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_errors_classify_as_index_errors() {
        let error = BridgeError::OffsetOutOfRange {
            offset: 9,
            start: 0,
            end: 3,
        };
        assert_eq!(error.kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(
            error.to_string(),
            "byte offset 9 is outside of the node range 0..=3"
        );
    }

    #[test]
    fn query_error_message_carries_position() {
        let error = BridgeError::QuerySyntax {
            offset: 1,
            row: 0,
            column: 1,
            kind: QueryErrorKind::NodeType,
            message: "no_such_node".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::QuerySyntax);
        assert!(error.to_string().contains("bad node type"));
        assert!(error.to_string().contains("byte 1"));
    }
}
