//! Symbol table for one translation
//!
//! Tracks which named sets exist and what kind of elements they hold, and
//! hands out temporary names. Every compilation owns its own table, so the
//! temp counter is never shared between concurrent translations.

use indexmap::IndexMap;

use crate::ast::core::SetKind;
use crate::error::ErrorKind;

/// Every name starting with this prefix belongs to the translator.
pub const TEMP_PREFIX: &str = "tmp";

/// OverpassQL's implicit default set; always bound.
pub const DEFAULT_SET: &str = "_";

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// name -> kind, in declaration order
    vars: IndexMap<String, SetKind>,
    next_temp: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reserved(name: &str) -> bool {
        name.starts_with(TEMP_PREFIX)
    }

    /// Bind a user-chosen name. Re-binding an existing name replaces its kind.
    pub fn declare(&mut self, name: &str, kind: SetKind) -> Result<(), ErrorKind> {
        if Self::is_reserved(name) {
            return Err(ErrorKind::ReservedName(name.to_string()));
        }
        self.vars.insert(name.to_string(), kind);
        Ok(())
    }

    pub fn kind_of(&self, name: &str) -> Option<SetKind> {
        if name == DEFAULT_SET {
            return Some(SetKind::Generic);
        }
        self.vars.get(name).copied()
    }

    /// Allocate a fresh temporary: `tmp<purpose><n>`. Temporaries are never
    /// bound in the table; the translator tracks their kinds itself.
    pub fn fresh(&mut self, purpose: &str) -> String {
        let name = format!("{TEMP_PREFIX}{purpose}{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    pub fn temp_count(&self) -> usize {
        self.next_temp
    }
}
