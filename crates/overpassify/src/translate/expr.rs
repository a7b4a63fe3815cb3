//! Set expressions to OverpassQL fragments

use crate::ast::core::{Anchor, Construct, Direction, Locator, Number, SetExpr, SetKind};
use crate::error::ErrorKind;
use crate::symbols::SymbolTable;

use super::{Translation, Translator, bind};

/// A translated set expression: text usable inside `(...;)` and its kind
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Fragment {
    pub text: String,
    pub kind: SetKind,
}

impl Fragment {
    fn new(text: impl Into<String>, kind: SetKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

impl Translator<'_> {
    /// Translate `expr`. Statements binding temporaries it depends on are
    /// appended to `setup` and must be emitted before the fragment is used.
    pub(super) fn set_expr(&mut self, expr: &SetExpr, setup: &mut Vec<String>) -> Translation<Fragment> {
        match expr {
            SetExpr::Construct(construct) => self.construct(construct, setup),

            SetExpr::VariableRef(name) => {
                let kind = self.lookup(name)?;
                Ok(Fragment::new(format!(".{name}"), kind))
            }

            SetExpr::Union(operands) => {
                let mut flat = Vec::new();
                flatten_union(operands, &mut flat);
                let mut parts = Vec::with_capacity(flat.len());
                let mut kind: Option<SetKind> = None;
                for operand in flat {
                    let fragment = self.set_expr(operand, setup)?;
                    kind = Some(kind.map_or(fragment.kind, |k| k.common(fragment.kind)));
                    parts.push(fragment.text);
                }
                Ok(Fragment::new(
                    format!("({})", parts.join("; ")),
                    kind.unwrap_or(SetKind::Generic),
                ))
            }

            SetExpr::Difference(operands) => {
                let [left, right] = operands.as_slice() else {
                    return Err(self.error(ErrorKind::Arity {
                        construct: "Difference",
                        expected: "2",
                        found: operands.len(),
                    }));
                };
                let left = self.set_expr(left, setup)?;
                let right = self.set_expr(right, setup)?;
                Ok(Fragment::new(
                    format!("({} - {})", left.text, right.text),
                    left.kind,
                ))
            }

            SetExpr::Filter(kind, operand) => {
                let name = self.require_named("Filter", operand)?;
                Ok(Fragment::new(format!("{}.{name}", kind.keyword()), *kind))
            }

            SetExpr::Intersect(kind, operands) => {
                if operands.is_empty() {
                    return Err(self.error(ErrorKind::Arity {
                        construct: "Intersect",
                        expected: "at least 1",
                        found: operands.len(),
                    }));
                }
                let mut text = kind.keyword().to_string();
                for operand in operands {
                    let name = self.require_named("Intersect", operand)?;
                    text.push('.');
                    text.push_str(name);
                }
                Ok(Fragment::new(text, *kind))
            }

            SetExpr::Ternary { cond, then, orelse } => self.ternary(cond, then, orelse, setup),

            SetExpr::Recurse {
                direction,
                relations,
                operand,
            } => {
                let (name, _) = self.named(operand, "rec", setup)?;
                let symbol = match (direction, relations) {
                    (Direction::Up, false) => "<",
                    (Direction::Up, true) => "<<",
                    (Direction::Down, false) => ">",
                    (Direction::Down, true) => ">>",
                };
                Ok(Fragment::new(format!(".{name} {symbol}"), SetKind::Generic))
            }

            SetExpr::IsIn(anchor) => {
                let text = match anchor {
                    Anchor::Set(set) => {
                        let (name, _) = self.named(set, "isin", setup)?;
                        format!(".{name} is_in")
                    }
                    Anchor::Point { lat, lon } => format!("is_in({lat},{lon})"),
                };
                Ok(Fragment::new(text, SetKind::Area))
            }

            SetExpr::Around { center, radius } => {
                let filter = self.around(center, *radius, setup)?;
                Ok(Fragment::new(
                    format!("{}{filter}", SetKind::Node.keyword()),
                    SetKind::Node,
                ))
            }
        }
    }

    fn construct(&mut self, construct: &Construct, setup: &mut Vec<String>) -> Translation<Fragment> {
        if construct.is_empty() {
            return Ok(Fragment::new("()", construct.kind));
        }

        let mut text = construct.kind.keyword().to_string();
        for filter in &construct.filters {
            text.push_str(&filter.to_string());
        }
        match &construct.locator {
            None => {}
            Some(Locator::ById(id)) => text.push_str(&format!("({id})")),
            Some(Locator::WithinArea(area)) => {
                let kind = self.lookup(area)?;
                // A mixed set may hold areas; any other specific kind cannot
                if !kind.accepts(SetKind::Area) {
                    return Err(self.error(ErrorKind::KindMismatch {
                        expected: "Area",
                        found: kind,
                    }));
                }
                text.push_str(&format!("(area.{area})"));
            }
            Some(Locator::Around { center, radius }) => {
                text.push_str(&self.around(center, *radius, setup)?);
            }
        }
        Ok(Fragment::new(text, construct.kind))
    }

    /// `(around.<set>:<radius>)` or `(around:<radius>,<lat>,<lon>)`
    fn around(&mut self, center: &Anchor, radius: Number, setup: &mut Vec<String>) -> Translation<String> {
        match center {
            Anchor::Set(set) => {
                let (name, _) = self.named(set, "around", setup)?;
                Ok(format!("(around.{name}:{radius})"))
            }
            Anchor::Point { lat, lon } => Ok(format!("(around:{radius},{lat},{lon})")),
        }
    }

    pub(super) fn lookup(&self, name: &str) -> Translation<SetKind> {
        if SymbolTable::is_reserved(name) {
            return Err(self.error(ErrorKind::ReservedName(name.to_string())));
        }
        self.symbols
            .kind_of(name)
            .ok_or_else(|| self.error(ErrorKind::UndefinedName(name.to_string())))
    }

    /// Name of `expr`, binding it to a fresh temporary unless it already is one
    pub(super) fn named(
        &mut self,
        expr: &SetExpr,
        purpose: &str,
        setup: &mut Vec<String>,
    ) -> Translation<(String, SetKind)> {
        if let SetExpr::VariableRef(name) = expr {
            let kind = self.lookup(name)?;
            return Ok((name.clone(), kind));
        }
        let fragment = self.set_expr(expr, setup)?;
        let name = self.symbols.fresh(purpose);
        setup.push(bind(&name, &fragment.text));
        Ok((name, fragment.kind))
    }

    /// Operands OverpassQL only accepts as `.<name>`
    fn require_named<'e>(&self, construct: &'static str, operand: &'e SetExpr) -> Translation<&'e str> {
        match operand {
            SetExpr::VariableRef(name) => {
                self.lookup(name)?;
                Ok(name)
            }
            other => Err(self.error(ErrorKind::NotNamed {
                construct,
                found: other.describe().to_string(),
            })),
        }
    }
}

fn flatten_union<'e>(operands: &'e [SetExpr], out: &mut Vec<&'e SetExpr>) {
    for operand in operands {
        match operand {
            SetExpr::Union(inner) => flatten_union(inner, out),
            other => out.push(other),
        }
    }
}
