//! Reference interpreter for gated expressions.

use crate::errors::InterpError;
use crate::lang::{Cond, Node};
use egg::{Id, RecExpr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Value that can be a result of evaluating an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    I64(i64),
    I1(bool),
}

impl Value {
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Value::I64(n) => Some(n),
            Value::I1(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::I1(b) => Some(b),
            Value::I64(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I64(n) => write!(f, "{}", n),
            Value::I1(b) => write!(f, "{}", b),
        }
    }
}

/// Map from variable names to values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env(HashMap<String, Value>);

impl Env {
    pub fn get(&self, var: &str) -> Option<Value> {
        self.0.get(var).copied()
    }

    pub fn set(&mut self, var: impl Into<String>, val: Value) {
        self.0.insert(var.into(), val);
    }

    /// Bindings for the four parameters of the selector.
    pub fn for_select(a: i64, b: i64, c: i64, cond: i64) -> Self {
        [
            ("a", Value::I64(a)),
            ("b", Value::I64(b)),
            ("c", Value::I64(c)),
            ("cond", Value::I64(cond)),
        ]
        .into_iter()
        .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Env {
    fn from_iter<T: IntoIterator<Item = (S, Value)>>(iter: T) -> Self {
        Env(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Evaluate the root (last node) of `expr`.
///
/// The arena is walked once from the leaves up. Every node's outcome is
/// kept, errors included, and `phi` forwards only the outcome of the arm
/// its condition selects, so an error in the other arm is never reported.
/// Integer arithmetic wraps.
pub fn interp(expr: &RecExpr<Node>, env: &Env) -> Result<Value, InterpError> {
    let nodes = expr.as_ref();
    let mut out: Vec<Result<Value, InterpError>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let value = eval_node(node, expr, &out, env);
        out.push(value);
    }
    out.pop().unwrap_or(Err(InterpError::EmptyExpression))
}

fn eval_node(
    node: &Node,
    expr: &RecExpr<Node>,
    done: &[Result<Value, InterpError>],
    env: &Env,
) -> Result<Value, InterpError> {
    let get = |id: &Id| done[usize::from(*id)].clone();
    match node {
        Node::I64(n) => Ok(Value::I64(*n)),
        Node::I1(b) => Ok(Value::I1(*b)),
        Node::Var(name) => env
            .get(name.as_str())
            .ok_or_else(|| InterpError::UnboundVariable {
                name: name.to_string(),
            }),
        Node::Pred(cond) => Err(InterpError::BarePredicate {
            pred: cond.to_string(),
        }),
        Node::Add([l, r]) => i64_binop("+", get(l)?, get(r)?, i64::wrapping_add),
        Node::Sub([l, r]) => i64_binop("-", get(l)?, get(r)?, i64::wrapping_sub),
        Node::Mul([l, r]) => i64_binop("*", get(l)?, get(r)?, i64::wrapping_mul),
        Node::ICmp([pred, l, r]) => {
            let Node::Pred(cond) = &expr[*pred] else {
                return Err(InterpError::TypeMismatch {
                    op: "icmp".to_string(),
                    operands: format!("predicate {}", expr[*pred]),
                });
            };
            compare(*cond, get(l)?, get(r)?)
        }
        Node::And([l, r]) => i1_binop("and", get(l)?, get(r)?, |l, r| l && r),
        Node::Or([l, r]) => i1_binop("or", get(l)?, get(r)?, |l, r| l || r),
        Node::Not(op) => match get(op)? {
            Value::I1(b) => Ok(Value::I1(!b)),
            other => Err(InterpError::TypeMismatch {
                op: "not".to_string(),
                operands: format!("{:?}", other),
            }),
        },
        Node::Phi([cnd, t, e]) => match get(cnd)? {
            Value::I1(true) => get(t),
            Value::I1(false) => get(e),
            other => Err(InterpError::TypeMismatch {
                op: "phi".to_string(),
                operands: format!("{:?}", other),
            }),
        },
    }
}

fn i64_binop(
    op: &str,
    l: Value,
    r: Value,
    f: impl FnOnce(i64, i64) -> i64,
) -> Result<Value, InterpError> {
    match (l, r) {
        (Value::I64(l), Value::I64(r)) => Ok(Value::I64(f(l, r))),
        (l, r) => Err(mismatch(op, l, r)),
    }
}

fn i1_binop(
    op: &str,
    l: Value,
    r: Value,
    f: impl FnOnce(bool, bool) -> bool,
) -> Result<Value, InterpError> {
    match (l, r) {
        (Value::I1(l), Value::I1(r)) => Ok(Value::I1(f(l, r))),
        (l, r) => Err(mismatch(op, l, r)),
    }
}

fn compare(cond: Cond, l: Value, r: Value) -> Result<Value, InterpError> {
    match (l, r) {
        (Value::I64(l), Value::I64(r)) => Ok(Value::I1(cond.eval(l, r))),
        (Value::I1(l), Value::I1(r)) => match cond {
            Cond::Eq => Ok(Value::I1(l == r)),
            Cond::Ne => Ok(Value::I1(l != r)),
            _ => Err(InterpError::UnsupportedPredicate {
                pred: cond.to_string(),
            }),
        },
        (l, r) => Err(mismatch(&format!("icmp {}", cond), l, r)),
    }
}

fn mismatch(op: &str, l: Value, r: Value) -> InterpError {
    InterpError::TypeMismatch {
        op: op.to_string(),
        operands: format!("{:?} and {:?}", l, r),
    }
}
