//! Gated expression language.
//!
//! Nodes are an [`egg`] language, so expressions live in an
//! [`egg::RecExpr`] whose operands always sit at smaller indices than the
//! node using them, and the rewrite engine works on them directly. The
//! textual form is an s-expression:
//!
//! ```text
//! (phi (icmp eq cond 0) a (phi (icmp eq cond 1) b c))
//! ```
//!
//! The predicate of an `icmp` is its own leaf node, so `(icmp eq x y)` has
//! three children and the predicate can be matched by rewrite patterns.

use crate::errors::ParseError;
use egg::{define_language, Id, RecExpr, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deepest parenthesis nesting [`parse`] accepts.
pub const MAX_DEPTH: usize = 1024;

/// Signed integer comparison predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cond {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl Cond {
    pub const ALL: [Cond; 6] = [
        Cond::Eq,
        Cond::Ne,
        Cond::Slt,
        Cond::Sle,
        Cond::Sgt,
        Cond::Sge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Slt => "slt",
            Cond::Sle => "sle",
            Cond::Sgt => "sgt",
            Cond::Sge => "sge",
        }
    }

    pub fn eval(self, l: i64, r: i64) -> bool {
        match self {
            Cond::Eq => l == r,
            Cond::Ne => l != r,
            Cond::Slt => l < r,
            Cond::Sle => l <= r,
            Cond::Sgt => l > r,
            Cond::Sge => l >= r,
        }
    }

    /// Whether `x <pred> x` holds for every `x`.
    pub fn is_reflexive(self) -> bool {
        matches!(self, Cond::Eq | Cond::Sle | Cond::Sge)
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cond {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cond::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseError::UnknownPredicate {
                pred: s.to_string(),
            })
    }
}

define_language! {
    /// One node of a gated expression.
    pub enum Node {
        "+" = Add([Id; 2]),
        "-" = Sub([Id; 2]),
        "*" = Mul([Id; 2]),
        // pred, lhs, rhs
        "icmp" = ICmp([Id; 3]),
        "and" = And([Id; 2]),
        "or" = Or([Id; 2]),
        "not" = Not(Id),
        // cond, then, else
        "phi" = Phi([Id; 3]),

        // Leaves are tried in this order, so `eq` is a predicate and never
        // a variable.
        I64(i64),
        I1(bool),
        Pred(Cond),
        Var(Symbol),
    }
}

/// Parse an s-expression into a [`RecExpr`] whose last node is the root.
pub fn parse(src: &str) -> Result<RecExpr<Node>, ParseError> {
    if src.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let depth = nesting_depth(src);
    if depth > MAX_DEPTH {
        return Err(ParseError::TooDeep {
            depth,
            limit: MAX_DEPTH,
        });
    }
    src.parse::<RecExpr<Node>>()
        .map_err(|e| ParseError::Syntax(e.to_string()))
}

fn nesting_depth(src: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0;
    for b in src.bytes() {
        match b {
            b'(' => {
                depth += 1;
                max = max.max(depth);
            }
            b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Build `(icmp pred lhs rhs)` in `expr`.
pub fn icmp(expr: &mut RecExpr<Node>, pred: Cond, lhs: Id, rhs: Id) -> Id {
    let pred = expr.add(Node::Pred(pred));
    expr.add(Node::ICmp([pred, lhs, rhs]))
}
