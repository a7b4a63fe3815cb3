//! Statement dispatch, assignment and output

use indexmap::IndexMap;

use crate::ast::core::{OutputOption, SetExpr, SettingValue, Statement};
use crate::error::ErrorKind;
use crate::symbols::SymbolTable;

use super::control::Jump;
use super::{Translation, Translator, bind, settings};

impl Translator<'_> {
    pub(super) fn statement(&mut self, statement: &Statement) -> Translation<Vec<String>> {
        match statement {
            Statement::Assign { name, value } => self.assign(name, value),
            Statement::Output { target, options } => self.output(target.as_ref(), options),
            Statement::ForEach {
                var,
                iterable,
                body,
                orelse,
            } => self.for_each(var, iterable, body, orelse),
            Statement::If { cond, then, orelse } => self.if_statement(cond, then, orelse.as_deref()),
            Statement::Break => self.jump(Jump::Break),
            Statement::Continue => self.jump(Jump::Continue),
            Statement::Settings(options) => self.settings(options),
        }
    }

    /// `(<fragment>;) -> .<name>;`
    fn assign(&mut self, name: &str, value: &SetExpr) -> Translation<Vec<String>> {
        if SymbolTable::is_reserved(name) {
            return Err(self.error(ErrorKind::ReservedName(name.to_string())));
        }
        let mut lines = Vec::new();
        let fragment = self.set_expr(value, &mut lines)?;
        self.symbols
            .declare(name, fragment.kind)
            .map_err(|kind| self.error(kind))?;
        lines.push(bind(name, &fragment.text));
        Ok(lines)
    }

    /// One `out` statement per flag; `out;` when there are none
    fn output(&mut self, target: Option<&SetExpr>, options: &[OutputOption]) -> Translation<Vec<String>> {
        let flags = settings::output_flags(options).map_err(|kind| self.error(kind))?;
        let mut lines = Vec::new();
        let prefix = match target {
            Some(target) => {
                let (name, _) = self.named(target, "out", &mut lines)?;
                format!(".{name} ")
            }
            None => String::new(),
        };
        if flags.is_empty() {
            lines.push(format!("{prefix}out;"));
        } else {
            lines.extend(flags.iter().map(|flag| format!("{prefix}out {flag};")));
        }
        Ok(lines)
    }

    fn settings(&mut self, options: &IndexMap<String, SettingValue>) -> Translation<Vec<String>> {
        if self.path != [0] {
            return Err(self.error(ErrorKind::Ordering));
        }
        let header = settings::header(options).map_err(|kind| self.error(kind))?;
        Ok(header.into_iter().collect())
    }
}
