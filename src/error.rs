//! All errors related to Conventional Commits.

use std::fmt;

use crate::combinator::{Failure, NodeKind};
use crate::Rule;

/// The error returned when parsing a commit fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,

    position: Option<usize>,
    expected: Option<NodeKind<Rule>>,
    commit: Option<String>,
}

impl Error {
    /// Create a new error from a `ErrorKind`.
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            position: None,
            expected: None,
            commit: None,
        }
    }

    /// Create an error from a grammar failure while parsing `commit`.
    ///
    /// `failure` must come from running the grammar over `commit` or a slice
    /// of it, so its position can be measured.
    pub(crate) fn with_failure(kind: ErrorKind, commit: &str, failure: Failure<'_, Rule>) -> Self {
        Self {
            kind,
            position: Some(failure.position(commit)),
            expected: Some(failure.expected()),
            commit: Some(commit.to_owned()),
        }
    }

    pub(crate) fn set_commit(mut self, commit: &str) -> Self {
        self.commit = Some(commit.to_owned());
        self
    }

    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Character offset into the parsed text where the grammar gave up.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// The grammar rule that could not be matched.
    pub fn expected(&self) -> Option<NodeKind<Rule>> {
        self.expected
    }

    /// The text that failed to parse.
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)?;
        match (self.expected, self.position) {
            (Some(expected), Some(position)) => {
                write!(f, ": expected {expected} at character {position}")
            }
            _ => Ok(()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// All possible error kinds returned when parsing a conventional commit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The commit message has no first line.
    EmptyCommit,

    /// The type, scope or `!` of the header could not be parsed.
    HeaderSyntax,

    /// The text after the header is not a body followed by footers.
    BodySyntax,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::EmptyCommit => f.write_str("empty commit"),
            ErrorKind::HeaderSyntax => f.write_str("invalid commit header"),
            ErrorKind::BodySyntax => f.write_str("invalid commit body"),
        }
    }
}
