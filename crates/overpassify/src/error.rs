//! Translation errors and diagnostics

use std::fmt;

use thiserror::Error;

use crate::ast::core::SetKind;
use crate::symbols::TEMP_PREFIX;

/// Where in the statement tree something went wrong.
///
/// `path` indexes into nested bodies: `[2, 0]` is the first statement inside
/// the third top-level statement. Bodies of one compound statement are
/// numbered consecutively, loop body or then-branch first. `line` is filled in
/// when the tree was lowered from source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: Vec<usize>,
    pub line: Option<usize>,
}

impl Location {
    pub fn at(path: &[usize]) -> Self {
        Self {
            path: path.to_vec(),
            line: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            return write!(f, "line {line}");
        }
        if self.path.is_empty() {
            return write!(f, "top level");
        }
        write!(f, "statement ")?;
        for (i, index) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", index + 1)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("{construct} takes {expected} operands, got {found}")]
    Arity {
        construct: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("{construct} only accepts named sets, got `{found}`")]
    NotNamed {
        construct: &'static str,
        found: String,
    },

    #[error("`{0}` is reserved for temporaries (names starting with `{prefix}`)", prefix = TEMP_PREFIX)]
    ReservedName(String),

    #[error("Unknown {context} option `{key}`")]
    UnknownOption { context: &'static str, key: String },

    #[error("Settings must be the first statement")]
    Ordering,

    #[error("No pivot reference set configured")]
    MissingPivot,

    #[error("Undefined set `{0}`")]
    UndefinedName(String),

    #[error("Type error: expected {expected}, got {found}")]
    KindMismatch {
        expected: &'static str,
        found: SetKind,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} (at {location})")]
pub struct TranslateError {
    pub kind: ErrorKind,
    pub location: Location,
}

impl TranslateError {
    pub fn new(kind: ErrorKind, location: Location) -> Self {
        Self { kind, location }
    }
}

/// Non-fatal findings; the query is still produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A loop was rewritten with sentinel guards for `break`/`continue`
    GuardedLoop,
    /// A conditional filter on a mixed-kind set was split per concrete kind
    KindDecomposition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.location)
    }
}
