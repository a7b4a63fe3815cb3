//! Text rendering
//!
//! Core fragments (`TagFilter`, `Cond`, `Number`) display as OverpassQL; the
//! surface AST displays as source text, which is what error messages quote.

use crate::ast::core::{Cond, Number, SetKind, TagFilter, TagPredicate};
use crate::ast::surface::{Expr, SurfaceArg};
use crate::ast::{Arg, BinOp, Literal, UnaryOp};
use std::fmt::{self, Display};

// ============ OverpassQL fragments ============

impl Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name())
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
            write!(f, "{}", n as i64)
        } else {
            write!(f, "{}", n)
        }
    }
}

impl Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = escape_string(&self.key);
        match &self.predicate {
            TagPredicate::ExactMatch(value) => {
                write!(f, "[\"{}\"=\"{}\"]", key, escape_string(value))
            }
            TagPredicate::Exists => write!(f, "[\"{}\"]", key),
            TagPredicate::NotExists => write!(f, "[!\"{}\"]", key),
            // Patterns are passed through untouched
            TagPredicate::Regex(pattern) => write!(f, "[\"{}\"~\"{}\"]", key, pattern),
            TagPredicate::NotRegex(pattern) => write!(f, "[\"{}\"!~\"{}\"]", key, pattern),
        }
    }
}

/// Operator spelling inside OverpassQL evaluators
fn evaluator_op(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::FloorDiv => "//",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

impl Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::Number(n) => write!(f, "{}", n),
            Cond::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Cond::Ident(name) => write!(f, "{}", name),
            Cond::Tag(key) => write!(f, "t[\"{}\"]", escape_string(key)),
            Cond::Call(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Cond::Binary(lhs, op, rhs) => {
                write_cond_operand(f, lhs)?;
                write!(f, " {} ", evaluator_op(*op))?;
                write_cond_operand(f, rhs)
            }
            Cond::Not(inner) => match inner.as_ref() {
                Cond::Binary(..) => write!(f, "!({})", inner),
                _ => write!(f, "!{}", inner),
            },
            Cond::Neg(inner) => match inner.as_ref() {
                Cond::Binary(..) => write!(f, "-({})", inner),
                _ => write!(f, "-{}", inner),
            },
        }
    }
}

fn write_cond_operand(f: &mut fmt::Formatter<'_>, cond: &Cond) -> fmt::Result {
    if matches!(cond, Cond::Binary(..)) {
        write!(f, "({})", cond)
    } else {
        write!(f, "{}", cond)
    }
}

// ============ Source text ============

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{}", n)
                }
            }
            Literal::Bool(b) => {
                if *b {
                    write!(f, "True")
                } else {
                    write!(f, "False")
                }
            }
            Literal::Null => write!(f, "None"),
        }
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::And => "and",
            BinOp::Or => "or",
            other => evaluator_op(*other),
        };
        write!(f, "{}", s)
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not ",
        };
        write!(f, "{}", s)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Name(name) => write!(f, "{}", name),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Ellipsis => write!(f, "..."),
            Expr::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Expr::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Expr::Attr(base, name) => {
                // Operators need parens when used as attribute receiver
                if needs_parens(base) {
                    write!(f, "({}).{}", base, name)
                } else {
                    write!(f, "{}.{}", base, name)
                }
            }
            Expr::Call(callee, args) => {
                write!(f, "{}(", callee)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Expr::Subscript(base, index) => write!(f, "{}[{}]", base, index),
            Expr::BinaryOp(lhs, op, rhs) => {
                if needs_parens(lhs) {
                    write!(f, "({})", lhs)?;
                } else {
                    write!(f, "{}", lhs)?;
                }
                write!(f, " {} ", op)?;
                if needs_parens(rhs) {
                    write!(f, "({})", rhs)
                } else {
                    write!(f, "{}", rhs)
                }
            }
            Expr::UnaryOp(op, expr) => {
                if needs_parens(expr) {
                    write!(f, "{}({})", op, expr)
                } else {
                    write!(f, "{}{}", op, expr)
                }
            }
            Expr::IfExp { test, body, orelse } => {
                if matches!(body.as_ref(), Expr::IfExp { .. }) {
                    write!(f, "({}) if {} else {}", body, test, orelse)
                } else {
                    write!(f, "{} if {} else {}", body, test, orelse)
                }
            }
        }
    }
}

fn needs_parens(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::BinaryOp(..) | Expr::UnaryOp(..) | Expr::IfExp { .. }
    )
}

impl<E: Display> Display for Arg<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Positional(expr) => write!(f, "{}", expr),
            Arg::Keyword(name, expr) => write!(f, "{}={}", name, expr),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[SurfaceArg]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}
