//! Translate core statements into OverpassQL
//!
//! The translator walks the statement tree top to bottom, threading one
//! `SymbolTable` through every recursive call, and collects target statements
//! in order. Each translated statement may expand to several OverpassQL
//! statements: operands that OverpassQL only accepts by name are bound to
//! temporaries first.
//!
//! Layout:
//! - `expr`: set expressions to fragments
//! - `stmt`: assignment, output and statement dispatch
//! - `control`: ternaries, `if`/`else`, loops and their `break`/`continue` guards
//! - `settings`: the settings header and output flags

mod control;
mod expr;
mod settings;
mod stmt;

use log::debug;

use crate::ast::core::Statement;
use crate::config::TranslateConfig;
use crate::error::{Diagnostic, DiagnosticKind, ErrorKind, Location, TranslateError};
use crate::symbols::SymbolTable;

use control::LoopFrame;

pub use settings::OUTPUT_FLAGS;

/// Result of a successful translation
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// OverpassQL text, one statement per line (loops span several lines)
    pub query: String,
    /// Rewrites that changed the cost or shape of the query
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate a function body into an OverpassQL query
pub fn translate(body: &[Statement], config: &TranslateConfig) -> Result<Compiled, TranslateError> {
    let mut translator = Translator::new(config);
    let lines = translator.block(body, 0)?;
    debug!(
        "translated {} statements into {} lines ({} temporaries)",
        body.len(),
        lines.len(),
        translator.symbols.temp_count()
    );
    Ok(Compiled {
        query: lines.join("\n"),
        diagnostics: translator.diagnostics,
    })
}

type Translation<T> = Result<T, TranslateError>;

pub(crate) struct Translator<'c> {
    config: &'c TranslateConfig,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    /// Path of the statement being translated
    path: Vec<usize>,
    /// Enclosing loops, innermost last
    loops: Vec<LoopFrame>,
}

impl<'c> Translator<'c> {
    fn new(config: &'c TranslateConfig) -> Self {
        Self {
            config,
            symbols: SymbolTable::new(),
            diagnostics: Vec::new(),
            path: Vec::new(),
            loops: Vec::new(),
        }
    }

    fn error(&self, kind: ErrorKind) -> TranslateError {
        TranslateError::new(kind, Location::at(&self.path))
    }

    fn diagnose(&mut self, kind: DiagnosticKind, message: String) {
        let location = Location::at(&self.path);
        log::warn!("{message} (at {location})");
        self.diagnostics.push(Diagnostic {
            kind,
            location,
            message,
        });
    }

    /// Translate a body. `offset` numbers it after sibling bodies of the
    /// same compound statement.
    fn block(&mut self, body: &[Statement], offset: usize) -> Translation<Vec<String>> {
        let mut lines = Vec::new();
        for (index, statement) in body.iter().enumerate() {
            self.path.push(offset + index);
            if self.path.len() == 1 {
                debug!("statement {}: {}", index + 1, statement_name(statement));
            }
            lines.extend(self.guarded(statement)?);
            self.path.pop();
        }
        Ok(lines)
    }
}

fn statement_name(statement: &Statement) -> &'static str {
    match statement {
        Statement::Assign { .. } => "assign",
        Statement::Output { .. } => "out",
        Statement::ForEach { .. } => "foreach",
        Statement::If { .. } => "if",
        Statement::Break => "break",
        Statement::Continue => "continue",
        Statement::Settings(_) => "settings",
    }
}

/// `foreach.<set>->.<var>(` ... `);`
fn foreach_block(set: &str, var: &str, body: &[String]) -> String {
    if body.is_empty() {
        format!("foreach.{set}->.{var}(\n);")
    } else {
        format!("foreach.{set}->.{var}(\n{}\n);", body.join("\n"))
    }
}

/// `(<fragment>;) -> .<name>;`
fn bind(name: &str, fragment: &str) -> String {
    format!("({fragment};) -> .{name};")
}
