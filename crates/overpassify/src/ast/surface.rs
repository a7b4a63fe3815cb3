//! Surface AST - what the parser produces
//!
//! This mirrors the source syntax closely: nothing here knows about sets,
//! OverpassQL keywords or output flags. `lower` recognizes those patterns and
//! produces the core AST.

use super::{Arg, BinOp, Literal, UnaryOp};

pub type SurfaceArg = Arg<Expr>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier: `ways`, `Way`, `out`
    Name(String),

    /// Literal value
    Literal(Literal),

    /// `...`
    Ellipsis,

    /// Tuple expression: `(1, 2)`, also `a, b` on the left of `=`
    Tuple(Vec<Expr>),

    /// List expression: `[1, 2]`
    List(Vec<Expr>),

    /// Attribute access: `expr.name`
    Attr(Box<Expr>, String),

    /// Function/method call: `expr(args...)`
    Call(Box<Expr>, Vec<SurfaceArg>),

    /// Subscript: `t["name"]`
    Subscript(Box<Expr>, Box<Expr>),

    /// Binary operation: `a + b`, `a == b`, `a and b`
    BinaryOp(Box<Expr>, BinOp, Box<Expr>),

    /// Unary operation: `-x`, `not x`
    UnaryOp(UnaryOp, Box<Expr>),

    /// Conditional expression: `body if test else orelse`
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    pub fn attr(self, name: impl Into<String>) -> Self {
        Expr::Attr(Box::new(self), name.into())
    }

    pub fn call(self, args: Vec<SurfaceArg>) -> Self {
        Expr::Call(Box::new(self), args)
    }

    pub fn binop(self, op: BinOp, rhs: Expr) -> Self {
        Expr::BinaryOp(Box::new(self), op, Box::new(rhs))
    }
}

/// A statement together with the 1-based source line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `a = expr`; chained `a = b = expr` keeps every target
    Assign { targets: Vec<Expr>, value: Expr },

    /// Bare expression statement: `out(ways, geom=True)`
    Expr(Expr),

    /// `for target in iter:` with optional `else:`
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },

    /// `if test:` with optional `elif`/`else` (elif nests in `orelse`)
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },

    Break,
    Continue,
    Pass,
}
