//! AST types for overpassify
//!
//! Split into:
//! - `surface`: What the parser produces (the Python-like source syntax)
//! - `core`: What the translator consumes (typed sets, statements, conditions)

pub mod core;
pub mod surface;

// Shared types used by both surface and core ASTs

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg<E> {
    Positional(E),
    Keyword(String, E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}
