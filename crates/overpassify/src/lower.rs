//! Lower the surface AST to the core AST
//!
//! This pass:
//! - Recognizes set constructors, set algebra and the query helpers
//!   (`is_in`, `Around`, `recurse_*`, `out`, `Settings`)
//! - Turns tests into OverpassQL conditions
//! - Drops statements with no query counterpart (`pass`, docstrings, `noop()`)
//! - Records the source line of every statement it keeps

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ast::core::{
    Anchor, Cond, Construct, Direction, Locator, Number, OutputOption, Scalar, SetExpr, SetKind,
    SettingValue, Statement, TagPredicate,
};
use crate::ast::surface::{Expr, Stmt, StmtKind, SurfaceArg};
use crate::ast::{Arg, BinOp, Literal, UnaryOp};
use crate::error::{ErrorKind, Location, TranslateError};

/// Source lines of lowered statements, keyed by their path in the core tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMap {
    lines: HashMap<Vec<usize>, usize>,
}

impl LineMap {
    pub fn line_of(&self, path: &[usize]) -> Option<usize> {
        // Fall back to the closest enclosing statement
        (0..=path.len())
            .rev()
            .find_map(|len| self.lines.get(&path[..len]).copied())
    }

    /// Fill in the source line of a location produced by the translator
    pub fn locate(&self, location: &mut Location) {
        if location.line.is_none() {
            location.line = self.line_of(&location.path);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub body: Vec<Statement>,
    pub lines: LineMap,
}

/// Lower parsed statements into translator input
pub fn lower(stmts: &[Stmt]) -> Result<Lowered, TranslateError> {
    let mut lowerer = Lowerer::default();
    let body = lowerer.block(stmts, 0)?;
    Ok(Lowered {
        body,
        lines: lowerer.lines,
    })
}

#[derive(Default)]
struct Lowerer {
    path: Vec<usize>,
    line: usize,
    lines: LineMap,
}

type Lowering<T> = Result<T, TranslateError>;

impl Lowerer {
    fn error(&self, kind: ErrorKind) -> TranslateError {
        TranslateError::new(
            kind,
            Location {
                path: self.path.clone(),
                line: Some(self.line),
            },
        )
    }

    fn unsupported<T>(&self, what: impl Into<String>) -> Lowering<T> {
        Err(self.error(ErrorKind::UnsupportedConstruct(what.into())))
    }

    /// `offset` numbers this body after its siblings (else after then)
    fn block(&mut self, stmts: &[Stmt], offset: usize) -> Lowering<Vec<Statement>> {
        let mut body = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.path.push(offset + body.len());
            self.line = stmt.line;
            self.lines.lines.insert(self.path.clone(), stmt.line);
            if let Some(statement) = self.statement(stmt)? {
                body.push(statement);
            }
            self.path.pop();
        }
        Ok(body)
    }

    fn statement(&mut self, stmt: &Stmt) -> Lowering<Option<Statement>> {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                let [target] = targets.as_slice() else {
                    return self.unsupported("assignment to more than one target");
                };
                let Expr::Name(name) = target else {
                    return self.unsupported(format!("assignment to `{target}`"));
                };
                let value = self.set_expr(value)?;
                Ok(Some(Statement::Assign {
                    name: name.clone(),
                    value,
                }))
            }
            StmtKind::Expr(expr) => self.expr_statement(expr),
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                let Expr::Name(var) = target else {
                    return self.unsupported(format!("loop target `{target}`"));
                };
                let iterable = self.set_expr(iter)?;
                let body = self.block(body, 0)?;
                let orelse = self.block(orelse, body.len())?;
                Ok(Some(Statement::ForEach {
                    var: var.clone(),
                    iterable,
                    body,
                    orelse,
                }))
            }
            StmtKind::If { test, body, orelse } => {
                let cond = self.cond(test)?;
                let then = self.block(body, 0)?;
                let orelse = self.block(orelse, then.len())?;
                Ok(Some(Statement::If {
                    cond,
                    then,
                    orelse: (!orelse.is_empty()).then_some(orelse),
                }))
            }
            StmtKind::Break => Ok(Some(Statement::Break)),
            StmtKind::Continue => Ok(Some(Statement::Continue)),
            StmtKind::Pass => Ok(None),
        }
    }

    fn expr_statement(&mut self, expr: &Expr) -> Lowering<Option<Statement>> {
        match expr {
            // Docstring
            Expr::Literal(Literal::String(_)) => Ok(None),
            Expr::Call(callee, args) => match callee.as_ref() {
                Expr::Name(name) if name == "noop" => {
                    if !args.is_empty() {
                        return Err(self.error(ErrorKind::Arity {
                            construct: "noop",
                            expected: "0",
                            found: args.len(),
                        }));
                    }
                    Ok(None)
                }
                Expr::Name(name) if name == "out" => self.output(args).map(Some),
                Expr::Name(name) if name == "Settings" => self.settings(args).map(Some),
                _ => self.unsupported(format!("expression statement `{expr}`")),
            },
            _ => self.unsupported(format!("expression statement `{expr}`")),
        }
    }

    // ============ Statements ============

    fn output(&mut self, args: &[SurfaceArg]) -> Lowering<Statement> {
        let (positional, keywords) = split_args(args);
        let target = match positional.as_slice() {
            [] => None,
            [target] => Some(self.set_expr(target)?),
            _ => {
                return Err(self.error(ErrorKind::Arity {
                    construct: "out",
                    expected: "at most 1",
                    found: positional.len(),
                }));
            }
        };
        let options = keywords
            .into_iter()
            .map(|(flag, value)| OutputOption {
                flag: flag.to_string(),
                value: loose_scalar(value),
            })
            .collect();
        Ok(Statement::Output { target, options })
    }

    fn settings(&mut self, args: &[SurfaceArg]) -> Lowering<Statement> {
        let mut options = IndexMap::new();
        for arg in args {
            let Arg::Keyword(key, value) = arg else {
                return self.unsupported("positional argument to Settings");
            };
            let value = match value {
                Expr::Tuple(items) | Expr::List(items) => SettingValue::List(
                    items
                        .iter()
                        .map(|item| self.scalar(item))
                        .collect::<Lowering<_>>()?,
                ),
                other => SettingValue::Scalar(self.scalar(other)?),
            };
            options.insert(key.clone(), value);
        }
        Ok(Statement::Settings(options))
    }

    // ============ Set expressions ============

    fn set_expr(&mut self, expr: &Expr) -> Lowering<SetExpr> {
        match expr {
            Expr::Name(name) => {
                if SetKind::from_class_name(name).is_some() {
                    return self.unsupported(format!("bare type `{name}` (call it to build a set)"));
                }
                Ok(SetExpr::var(name.clone()))
            }
            Expr::BinaryOp(lhs, BinOp::Add, rhs) => {
                Ok(SetExpr::union(vec![self.set_expr(lhs)?, self.set_expr(rhs)?]))
            }
            Expr::BinaryOp(lhs, BinOp::Sub, rhs) => {
                Ok(SetExpr::difference(self.set_expr(lhs)?, self.set_expr(rhs)?))
            }
            Expr::IfExp { test, body, orelse } => Ok(SetExpr::ternary(
                self.cond(test)?,
                self.set_expr(body)?,
                self.set_expr(orelse)?,
            )),
            Expr::Call(callee, args) => self.call(callee, args),
            other => self.unsupported(format!("`{other}` is not a set expression")),
        }
    }

    fn call(&mut self, callee: &Expr, args: &[SurfaceArg]) -> Lowering<SetExpr> {
        match callee {
            Expr::Name(name) => {
                if let Some(kind) = SetKind::from_class_name(name) {
                    return self.constructor(kind, args);
                }
                match name.as_str() {
                    "is_in" => self.is_in(args),
                    "Around" => {
                        let (center, radius) = self.around_args(args)?;
                        Ok(SetExpr::Around { center, radius })
                    }
                    _ => self.unsupported(format!("call to `{name}`")),
                }
            }
            Expr::Attr(base, method) => {
                if let Expr::Name(class) = base.as_ref()
                    && let Some(kind) = SetKind::from_class_name(class)
                {
                    return self.class_method(kind, method, args);
                }
                let (direction, relations) = match method.as_str() {
                    "recurse_up" => (Direction::Up, false),
                    "recurse_down" => (Direction::Down, false),
                    "recurse_up_relations" => (Direction::Up, true),
                    "recurse_down_relations" => (Direction::Down, true),
                    _ => return self.unsupported(format!("method `{method}`")),
                };
                if !args.is_empty() {
                    return Err(self.error(ErrorKind::Arity {
                        construct: "recurse",
                        expected: "0",
                        found: args.len(),
                    }));
                }
                Ok(SetExpr::recurse(direction, relations, self.set_expr(base)?))
            }
            other => self.unsupported(format!("call to `{other}`")),
        }
    }

    fn class_method(&mut self, kind: SetKind, method: &str, args: &[SurfaceArg]) -> Lowering<SetExpr> {
        let (positional, keywords) = split_args(args);
        if let Some((key, _)) = keywords.first() {
            return self.unsupported(format!("keyword argument `{key}` to `{method}`"));
        }
        match method {
            "filter" => {
                let [operand] = positional.as_slice() else {
                    return Err(self.error(ErrorKind::Arity {
                        construct: "filter",
                        expected: "1",
                        found: positional.len(),
                    }));
                };
                Ok(SetExpr::filter(kind, self.set_expr(operand)?))
            }
            "intersect" => {
                let operands = positional
                    .iter()
                    .map(|operand| self.set_expr(operand))
                    .collect::<Lowering<_>>()?;
                Ok(SetExpr::Intersect(kind, operands))
            }
            _ => self.unsupported(format!("method `{}.{method}`", kind.class_name())),
        }
    }

    /// `Way(search, highway=...)`, `Set()`, `Set(a, b)`
    fn constructor(&mut self, kind: SetKind, args: &[SurfaceArg]) -> Lowering<SetExpr> {
        let (positional, keywords) = split_args(args);

        // Set(a, b, ...) is a union of its arguments
        if kind == SetKind::Generic
            && keywords.is_empty()
            && !positional.is_empty()
            && !positional.iter().all(|arg| is_locator_arg(arg))
        {
            let operands = positional
                .iter()
                .map(|operand| self.set_expr(operand))
                .collect::<Lowering<_>>()?;
            return Ok(SetExpr::union(operands));
        }

        let mut construct = Construct::new(kind);
        match positional.as_slice() {
            [] => {}
            [locator] => construct.locator = Some(self.locator(locator)?),
            _ => {
                return Err(self.error(ErrorKind::Arity {
                    construct: kind.class_name(),
                    expected: "at most 1 positional",
                    found: positional.len(),
                }));
            }
        }
        for (key, value) in keywords {
            let predicate = self.tag_predicate(key, value)?;
            construct = construct.tag(key, predicate);
        }
        Ok(construct.into())
    }

    fn locator(&mut self, arg: &Expr) -> Lowering<Locator> {
        match arg {
            Expr::Literal(Literal::Int(id)) => match u64::try_from(*id) {
                Ok(id) => Ok(Locator::ById(id)),
                Err(_) => self.unsupported(format!("negative element id {id}")),
            },
            Expr::Name(area) => Ok(Locator::WithinArea(area.clone())),
            Expr::Call(callee, args) if matches!(callee.as_ref(), Expr::Name(n) if n == "Around") => {
                let (center, radius) = self.around_args(args)?;
                Ok(Locator::Around { center, radius })
            }
            other => self.unsupported(format!("constructor argument `{other}`")),
        }
    }

    fn tag_predicate(&self, key: &str, value: &Expr) -> Lowering<TagPredicate> {
        match value {
            Expr::Ellipsis => Ok(TagPredicate::Exists),
            Expr::Literal(Literal::Null) => Ok(TagPredicate::NotExists),
            Expr::Literal(Literal::String(s)) => Ok(TagPredicate::ExactMatch(s.clone())),
            Expr::Call(callee, args) => {
                let (Expr::Name(name), [Arg::Positional(Expr::Literal(Literal::String(pattern)))]) =
                    (callee.as_ref(), args.as_slice())
                else {
                    return self.unsupported(format!("value `{value}` for tag `{key}`"));
                };
                match name.as_str() {
                    "Regex" => Ok(TagPredicate::Regex(pattern.clone())),
                    "NotRegex" => Ok(TagPredicate::NotRegex(pattern.clone())),
                    _ => self.unsupported(format!("value `{value}` for tag `{key}`")),
                }
            }
            other => match number(other) {
                Some(n) => Ok(TagPredicate::ExactMatch(n.to_string())),
                None => self.unsupported(format!("value `{value}` for tag `{key}`")),
            },
        }
    }

    fn is_in(&mut self, args: &[SurfaceArg]) -> Lowering<SetExpr> {
        let (positional, keywords) = split_args(args);
        if !keywords.is_empty() {
            return self.unsupported("keyword arguments to is_in");
        }
        let anchor = match positional.as_slice() {
            // The implicit default set
            [] => Anchor::Set(Box::new(SetExpr::var(crate::symbols::DEFAULT_SET))),
            [set] => Anchor::Set(Box::new(self.set_expr(set)?)),
            [lat, lon] => Anchor::Point {
                lat: self.number(lat)?,
                lon: self.number(lon)?,
            },
            _ => {
                return Err(self.error(ErrorKind::Arity {
                    construct: "is_in",
                    expected: "0, 1 or 2",
                    found: positional.len(),
                }));
            }
        };
        Ok(SetExpr::IsIn(anchor))
    }

    /// `Around(set, radius)` or `Around(radius, lat, lon)`
    fn around_args(&mut self, args: &[SurfaceArg]) -> Lowering<(Anchor, Number)> {
        let (positional, keywords) = split_args(args);
        if !keywords.is_empty() {
            return self.unsupported("keyword arguments to Around");
        }
        match positional.as_slice() {
            [set, radius] => Ok((Anchor::Set(Box::new(self.set_expr(set)?)), self.number(radius)?)),
            [radius, lat, lon] => Ok((
                Anchor::Point {
                    lat: self.number(lat)?,
                    lon: self.number(lon)?,
                },
                self.number(radius)?,
            )),
            _ => Err(self.error(ErrorKind::Arity {
                construct: "Around",
                expected: "2 or 3",
                found: positional.len(),
            })),
        }
    }

    // ============ Scalars ============

    fn number(&self, expr: &Expr) -> Lowering<Number> {
        match number(expr) {
            Some(n) => Ok(n),
            None => self.unsupported(format!("expected a number, got `{expr}`")),
        }
    }

    fn scalar(&self, expr: &Expr) -> Lowering<Scalar> {
        if let Expr::Literal(Literal::String(s)) = expr {
            return Ok(Scalar::String(s.clone()));
        }
        match number(expr) {
            Some(n) => Ok(Scalar::Number(n)),
            None => self.unsupported(format!("setting value `{expr}`")),
        }
    }

    // ============ Conditions ============

    fn cond(&self, expr: &Expr) -> Lowering<Cond> {
        match expr {
            Expr::Literal(Literal::String(s)) => Ok(Cond::String(s.clone())),
            Expr::Literal(Literal::Bool(b)) => Ok(Cond::Number(Number::from(i64::from(*b)))),
            Expr::Literal(Literal::Int(_) | Literal::Float(_)) => match number(expr) {
                Some(n) => Ok(Cond::Number(n)),
                None => self.unsupported(format!("condition `{expr}`")),
            },
            Expr::Name(name) => Ok(Cond::Ident(name.clone())),
            // t["key"]
            Expr::Subscript(base, key) => match (base.as_ref(), key.as_ref()) {
                (Expr::Name(t), Expr::Literal(Literal::String(key))) if t == "t" => {
                    Ok(Cond::Tag(key.clone()))
                }
                _ => self.unsupported(format!("subscript `{expr}`")),
            },
            Expr::Call(callee, args) => {
                let Expr::Name(name) = callee.as_ref() else {
                    return self.unsupported(format!("call to `{callee}` in a condition"));
                };
                let args = args
                    .iter()
                    .map(|arg| match arg {
                        Arg::Positional(e) => self.cond(e),
                        Arg::Keyword(key, _) => {
                            self.unsupported(format!("keyword argument `{key}` in a condition"))
                        }
                    })
                    .collect::<Lowering<_>>()?;
                Ok(Cond::call(name.clone(), args))
            }
            Expr::BinaryOp(_, op @ (BinOp::FloorDiv | BinOp::Mod), _) => {
                self.unsupported(format!("operator `{op}` in a condition"))
            }
            Expr::BinaryOp(lhs, op, rhs) => Ok(self.cond(lhs)?.binop(*op, self.cond(rhs)?)),
            Expr::UnaryOp(UnaryOp::Not, inner) => Ok(self.cond(inner)?.negate()),
            Expr::UnaryOp(UnaryOp::Neg, inner) => Ok(Cond::Neg(Box::new(self.cond(inner)?))),
            other => self.unsupported(format!("condition `{other}`")),
        }
    }
}

fn split_args(args: &[SurfaceArg]) -> (Vec<&Expr>, Vec<(&str, &Expr)>) {
    let mut positional = Vec::new();
    let mut keywords = Vec::new();
    for arg in args {
        match arg {
            Arg::Positional(e) => positional.push(e),
            Arg::Keyword(key, e) => keywords.push((key.as_str(), e)),
        }
    }
    (positional, keywords)
}

/// Whether `Set(arg)` reads as a locator rather than a union operand
fn is_locator_arg(arg: &Expr) -> bool {
    match arg {
        Expr::Literal(Literal::Int(_)) => true,
        Expr::Call(callee, _) => matches!(callee.as_ref(), Expr::Name(n) if n == "Around"),
        _ => false,
    }
}

fn number(expr: &Expr) -> Option<Number> {
    match expr {
        Expr::Literal(Literal::Int(n)) => Some(Number::from(*n)),
        Expr::Literal(Literal::Float(n)) => Some(Number::from(*n)),
        Expr::UnaryOp(UnaryOp::Neg, inner) => number(inner).map(|n| Number(-n.0)),
        _ => None,
    }
}

/// Output option values are carried but never inspected
fn loose_scalar(expr: &Expr) -> Option<Scalar> {
    match expr {
        Expr::Literal(Literal::String(s)) => Some(Scalar::String(s.clone())),
        Expr::Literal(Literal::Null) => Some(Scalar::Missing),
        Expr::Ellipsis => Some(Scalar::Ellipsis),
        Expr::Call(callee, args) => match (callee.as_ref(), args.as_slice()) {
            (Expr::Name(name), [Arg::Positional(Expr::Literal(Literal::String(pattern)))])
                if name == "Regex" || name == "NotRegex" =>
            {
                Some(Scalar::Pattern {
                    pattern: pattern.clone(),
                    negated: name == "NotRegex",
                })
            }
            _ => None,
        },
        other => number(other).map(Scalar::Number),
    }
}
