//! Constant folding as an e-graph analysis.
//!
//! Every e-class whose value is fixed carries that value, and gets the
//! matching literal added to it, so extraction can always pick the literal.

use egg::{merge_option, Analysis, DidMerge, EGraph, Id};
use tracing::warn;

use crate::interp::Value;
use crate::lang::Node;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstFold;

/// Predicate held by the class `id`, if it has one.
fn pred_of(egraph: &EGraph<Node, ConstFold>, id: Id) -> Option<crate::lang::Cond> {
    egraph[id].nodes.iter().find_map(|n| match n {
        Node::Pred(c) => Some(*c),
        _ => None,
    })
}

impl Analysis<Node> for ConstFold {
    type Data = Option<Value>;

    fn merge(&mut self, to: &mut Self::Data, from: Self::Data) -> DidMerge {
        merge_option(to, from, |a, b| {
            // Only rules that drop an erroring operand can join two
            // different constants; keep the first.
            if *a != b {
                warn!(kept = %a, dropped = %b, "merged classes with different constants");
            }
            DidMerge(false, false)
        })
    }

    fn make(egraph: &EGraph<Node, Self>, enode: &Node) -> Self::Data {
        let x = |id: &Id| egraph[*id].data;
        let int = |id: &Id| x(id)?.as_i64();
        let boolean = |id: &Id| x(id)?.as_bool();
        let value = match enode {
            Node::I64(n) => Value::I64(*n),
            Node::I1(b) => Value::I1(*b),
            Node::Add([l, r]) => Value::I64(int(l)?.wrapping_add(int(r)?)),
            Node::Sub([l, r]) => Value::I64(int(l)?.wrapping_sub(int(r)?)),
            Node::Mul([l, r]) => Value::I64(int(l)?.wrapping_mul(int(r)?)),
            Node::ICmp([p, l, r]) => Value::I1(pred_of(egraph, *p)?.eval(int(l)?, int(r)?)),
            Node::And([l, r]) => Value::I1(boolean(l)? && boolean(r)?),
            Node::Or([l, r]) => Value::I1(boolean(l)? || boolean(r)?),
            Node::Not(b) => Value::I1(!boolean(b)?),
            Node::Phi([c, t, e]) => {
                if boolean(c)? {
                    x(t)?
                } else {
                    x(e)?
                }
            }
            Node::Pred(_) | Node::Var(_) => return None,
        };
        Some(value)
    }

    fn modify(egraph: &mut EGraph<Node, Self>, id: Id) {
        if let Some(value) = egraph[id].data {
            let literal = match value {
                Value::I64(n) => Node::I64(n),
                Value::I1(b) => Node::I1(b),
            };
            let added = egraph.add(literal);
            egraph.union(id, added);
        }
    }
}
