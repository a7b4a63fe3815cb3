//! overpassify - a Python-like set language compiled to OverpassQL
//!
//! OverpassQL has named sets, filters and `foreach`, but no branching, no
//! early exit and no expressions over sets beyond union and difference. This
//! crate translates a small imperative language (assignments, set
//! constructors, set algebra, `if`, `for`, `break`/`continue`) into it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use overpassify::{overpassify, SetKind, TranslateConfig};
//!
//! let source = r#"
//! def query():
//!     search = Area(3600134503)
//!     ways = Way(search, highway=...)
//!     out(ways, geom=True)
//! "#;
//!
//! let compiled = overpassify(source, &TranslateConfig::new())?;
//! assert_eq!(
//!     compiled.query,
//!     "(area(3600134503);) -> .search;\n(way[\"highway\"](area.search);) -> .ways;\n.ways out geom;"
//! );
//! ```
//!
//! ## Statement Trees
//!
//! Callers that already hold a syntax tree build `Statement`s directly and
//! skip the parser:
//!
//! ```ignore
//! use overpassify::{translate, Construct, SetKind, Statement, TranslateConfig};
//!
//! let body = vec![Statement::assign("search", Construct::new(SetKind::Area).by_id(3600134503))];
//! let compiled = translate(&body, &TranslateConfig::new())?;
//! ```
//!
//! ## Control Flow
//!
//! `if` statements and loops using `break`/`continue` filter a known element
//! (the pivot) by a condition and loop over the zero-or-one element result.
//! Configure one with `TranslateConfig::with_pivot`.

mod ast;
mod config;
mod error;
mod lower;
mod parse;
mod pretty;
mod symbols;
mod translate;

use thiserror::Error;

// ============ Primary Public API ============

pub use ast::BinOp;
pub use ast::core::{
    Anchor, Cond, Construct, Direction, Locator, Number, OutputOption, Scalar, SetExpr, SetKind,
    SettingValue, Statement, TagFilter, TagPredicate,
};
pub use config::{Pivot, TranslateConfig};
pub use translate::{Compiled, OUTPUT_FLAGS, translate};

/// Compile source text to OverpassQL
pub fn overpassify(source: &str, config: &TranslateConfig) -> Result<Compiled, OverpassifyError> {
    let stmts = parse::parse(source)?;
    let lowered = lower::lower(&stmts)?;
    match translate::translate(&lowered.body, config) {
        Ok(mut compiled) => {
            for diagnostic in &mut compiled.diagnostics {
                lowered.lines.locate(&mut diagnostic.location);
            }
            Ok(compiled)
        }
        Err(mut err) => {
            lowered.lines.locate(&mut err.location);
            Err(err.into())
        }
    }
}

// ============ Errors ============

#[derive(Error, Debug)]
pub enum OverpassifyError {
    #[error("Parse error: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("Translate error: {0}")]
    Translate(#[from] error::TranslateError),
}

pub use error::{Diagnostic, DiagnosticKind, ErrorKind, Location, TranslateError};
pub use parse::ParseError;

/// Prefix of every temporary the translator invents; user names may not use it
pub use symbols::TEMP_PREFIX;

// ============ Advanced: Front End Access ============

/// The parsing and lowering passes on their own (for tooling or introspection)
pub mod advanced {
    pub use crate::ast::surface::{Expr as SurfaceExpr, Stmt, StmtKind, SurfaceArg};
    pub use crate::ast::{Arg, Literal, UnaryOp};
    pub use crate::lower::{LineMap, Lowered, lower};
    pub use crate::parse::{parse, parse_expr};
    pub use crate::symbols::SymbolTable;
}
