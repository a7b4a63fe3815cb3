//! Core AST - what the translator consumes
//!
//! Sets are typed by `SetKind`, every construct the translator understands has
//! its own variant, and conditions are kept apart from set expressions. Callers
//! that already have a syntax tree can build these values directly; source
//! text goes through `parse` and `lower` first.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::BinOp;

// ============ Type model ============

/// The kind of elements a set holds.
///
/// `Node`, `Way`, `Area` and `Relation` specialize `Generic`: a specific kind
/// is accepted wherever `Generic` is, never the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    Generic,
    Node,
    Way,
    Area,
    Relation,
}

impl SetKind {
    /// Every specific kind, in the order decomposed filters are emitted.
    pub const SPECIFIC: [SetKind; 4] = [
        SetKind::Node,
        SetKind::Way,
        SetKind::Area,
        SetKind::Relation,
    ];

    /// OverpassQL query keyword for this kind
    pub fn keyword(self) -> &'static str {
        match self {
            SetKind::Generic => "nwr",
            SetKind::Node => "node",
            SetKind::Way => "way",
            SetKind::Area => "area",
            SetKind::Relation => "relation",
        }
    }

    /// Source-language class name
    pub fn class_name(self) -> &'static str {
        match self {
            SetKind::Generic => "Set",
            SetKind::Node => "Node",
            SetKind::Way => "Way",
            SetKind::Area => "Area",
            SetKind::Relation => "Relation",
        }
    }

    pub fn is_specific(self) -> bool {
        self != SetKind::Generic
    }

    /// Whether a value of kind `other` may be used where `self` is required
    pub fn accepts(self, other: SetKind) -> bool {
        self == SetKind::Generic || self == other
    }

    /// Kind of a set holding elements of both `self` and `other`
    pub fn common(self, other: SetKind) -> SetKind {
        if self == other { self } else { SetKind::Generic }
    }

    /// Source-language class name (`Way`, `Set`, ...) to kind
    pub fn from_class_name(name: &str) -> Option<SetKind> {
        match name {
            "Set" => Some(SetKind::Generic),
            "Node" => Some(SetKind::Node),
            "Way" => Some(SetKind::Way),
            "Area" => Some(SetKind::Area),
            "Relation" => Some(SetKind::Relation),
            _ => None,
        }
    }
}

/// Numeric literal; integral values print without a fraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number(pub f64);

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number(n as f64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number(n)
    }
}

/// Scalar values: tag values, option values and settings values
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(Number),
    String(String),
    /// `Regex("...")` / `NotRegex("...")`; the pattern is never interpreted
    Pattern { pattern: String, negated: bool },
    /// `None`
    Missing,
    /// `...`
    Ellipsis,
}

// ============ Set expressions ============

#[derive(Debug, Clone, PartialEq)]
pub enum TagPredicate {
    ExactMatch(String),
    Exists,
    NotExists,
    Regex(String),
    NotRegex(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagFilter {
    pub key: String,
    pub predicate: TagPredicate,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, predicate: TagPredicate) -> Self {
        Self {
            key: key.into(),
            predicate,
        }
    }
}

/// Either a set or a literal coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    Set(Box<SetExpr>),
    Point { lat: Number, lon: Number },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    /// `(id)`
    ById(u64),
    /// `(area.<name>)`; the named set must hold areas
    WithinArea(String),
    /// `(around.<set>:<radius>)` or `(around:<radius>,<lat>,<lon>)`
    Around { center: Anchor, radius: Number },
}

/// A base set: `way["highway"](area.search)`
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    pub kind: SetKind,
    pub locator: Option<Locator>,
    pub filters: Vec<TagFilter>,
}

impl Construct {
    pub fn new(kind: SetKind) -> Self {
        Self {
            kind,
            locator: None,
            filters: Vec::new(),
        }
    }

    pub fn by_id(mut self, id: u64) -> Self {
        self.locator = Some(Locator::ById(id));
        self
    }

    pub fn within(mut self, area: impl Into<String>) -> Self {
        self.locator = Some(Locator::WithinArea(area.into()));
        self
    }

    pub fn around(mut self, center: Anchor, radius: impl Into<Number>) -> Self {
        self.locator = Some(Locator::Around {
            center,
            radius: radius.into(),
        });
        self
    }

    pub fn tag(mut self, key: impl Into<String>, predicate: TagPredicate) -> Self {
        self.filters.push(TagFilter::new(key, predicate));
        self
    }

    /// `Set()`, `Way()`: no locator and no filters selects nothing
    pub fn is_empty(&self) -> bool {
        self.locator.is_none() && self.filters.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    Construct(Construct),

    /// `(a; b; c)`; nested unions flatten into one group
    Union(Vec<SetExpr>),

    /// `(left - right)`; exactly two operands
    Difference(Vec<SetExpr>),

    /// `way.name`: narrow a named set to one kind
    Filter(SetKind, Box<SetExpr>),

    /// `way.a.b`: only named sets may be intersected
    Intersect(SetKind, Vec<SetExpr>),

    /// `then if cond else orelse`
    Ternary {
        cond: Cond,
        then: Box<SetExpr>,
        orelse: Box<SetExpr>,
    },

    /// `.set <`, `.set <<`, `.set >`, `.set >>`
    Recurse {
        direction: Direction,
        relations: bool,
        operand: Box<SetExpr>,
    },

    /// Areas containing a set, or a coordinate
    IsIn(Anchor),

    /// Nodes within `radius` meters of a set or a coordinate
    Around { center: Anchor, radius: Number },

    VariableRef(String),
}

impl SetExpr {
    pub fn var(name: impl Into<String>) -> Self {
        SetExpr::VariableRef(name.into())
    }

    /// The empty set of `kind`
    pub fn empty(kind: SetKind) -> Self {
        SetExpr::Construct(Construct::new(kind))
    }

    pub fn union(operands: Vec<SetExpr>) -> Self {
        SetExpr::Union(operands)
    }

    pub fn difference(left: SetExpr, right: SetExpr) -> Self {
        SetExpr::Difference(vec![left, right])
    }

    pub fn filter(kind: SetKind, operand: SetExpr) -> Self {
        SetExpr::Filter(kind, Box::new(operand))
    }

    pub fn ternary(cond: Cond, then: SetExpr, orelse: SetExpr) -> Self {
        SetExpr::Ternary {
            cond,
            then: Box::new(then),
            orelse: Box::new(orelse),
        }
    }

    pub fn recurse(direction: Direction, relations: bool, operand: SetExpr) -> Self {
        SetExpr::Recurse {
            direction,
            relations,
            operand: Box::new(operand),
        }
    }

    pub fn is_empty_construct(&self) -> bool {
        matches!(self, SetExpr::Construct(c) if c.is_empty())
    }

    /// Short noun for error messages
    pub fn describe(&self) -> &'static str {
        match self {
            SetExpr::Construct(_) => "constructor",
            SetExpr::Union(_) => "union",
            SetExpr::Difference(_) => "difference",
            SetExpr::Filter(..) => "filter",
            SetExpr::Intersect(..) => "intersection",
            SetExpr::Ternary { .. } => "conditional expression",
            SetExpr::Recurse { .. } => "recursion",
            SetExpr::IsIn(_) => "is_in",
            SetExpr::Around { .. } => "around",
            SetExpr::VariableRef(_) => "variable",
        }
    }
}

impl From<Construct> for SetExpr {
    fn from(construct: Construct) -> Self {
        SetExpr::Construct(construct)
    }
}

// ============ Conditions ============

/// An OverpassQL evaluator, used inside `(if: ...)` filters
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    Number(Number),
    String(String),
    /// Bare identifier, e.g. the `ways` in `count(ways)`
    Ident(String),
    /// `t["key"]`
    Tag(String),
    Call(String, Vec<Cond>),
    Binary(Box<Cond>, BinOp, Box<Cond>),
    Not(Box<Cond>),
    Neg(Box<Cond>),
}

impl Cond {
    pub fn call(name: impl Into<String>, args: Vec<Cond>) -> Self {
        Cond::Call(name.into(), args)
    }

    pub fn binop(self, op: BinOp, rhs: Cond) -> Self {
        Cond::Binary(Box::new(self), op, Box::new(rhs))
    }

    pub fn negate(self) -> Self {
        Cond::Not(Box::new(self))
    }
}

// ============ Statements ============

/// One `key=value` argument of an output statement. Only the flag matters;
/// the value is carried along but never inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOption {
    pub flag: String,
    pub value: Option<Scalar>,
}

impl OutputOption {
    pub fn flag(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign {
        name: String,
        value: SetExpr,
    },
    Output {
        target: Option<SetExpr>,
        options: Vec<OutputOption>,
    },
    ForEach {
        var: String,
        iterable: SetExpr,
        body: Vec<Statement>,
        /// Runs after the loop unless it was left through `break`
        orelse: Vec<Statement>,
    },
    If {
        cond: Cond,
        then: Vec<Statement>,
        orelse: Option<Vec<Statement>>,
    },
    Break,
    Continue,
    Settings(IndexMap<String, SettingValue>),
}

impl Statement {
    pub fn assign(name: impl Into<String>, value: impl Into<SetExpr>) -> Self {
        Statement::Assign {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn output(target: Option<SetExpr>, flags: &[&str]) -> Self {
        Statement::Output {
            target,
            options: flags.iter().map(|f| OutputOption::flag(*f)).collect(),
        }
    }

    pub fn for_each(var: impl Into<String>, iterable: SetExpr, body: Vec<Statement>) -> Self {
        Statement::ForEach {
            var: var.into(),
            iterable,
            body,
            orelse: Vec::new(),
        }
    }

    pub fn if_else(cond: Cond, then: Vec<Statement>, orelse: Option<Vec<Statement>>) -> Self {
        Statement::If { cond, then, orelse }
    }
}
