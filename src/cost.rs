use egg::{CostFunction, Id, Language, RecExpr};
use serde::{Deserialize, Serialize};

use crate::lang::Node;

/// Per-node weights used to price a gated expression.
///
/// The cost of a node is its own weight plus its children's costs scaled by
/// a multiplier. Only `phi` scales by more than one, so work nested under
/// control flow weighs more than the same work outside it.
///
/// As an [`egg::CostFunction`] it decides which of the equivalent forms the
/// simplifier extracts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    #[serde(default = "default_add_sub")]
    pub add_sub: f64,
    #[serde(default = "default_mul")]
    pub mul: f64,
    /// `and`, `or`, `not`
    #[serde(default = "default_boolean")]
    pub boolean: f64,
    #[serde(default = "default_icmp")]
    pub icmp: f64,
    #[serde(default = "default_phi")]
    pub phi: f64,
    #[serde(default = "default_phi_multiplier")]
    pub phi_multiplier: f64,
    #[serde(default = "default_constant")]
    pub constant: f64,
    #[serde(default = "default_variable")]
    pub variable: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            add_sub: default_add_sub(),
            mul: default_mul(),
            boolean: default_boolean(),
            icmp: default_icmp(),
            phi: default_phi(),
            phi_multiplier: default_phi_multiplier(),
            constant: default_constant(),
            variable: default_variable(),
        }
    }
}

fn default_add_sub() -> f64 { 1.0 }
fn default_mul() -> f64 { 4.0 }
fn default_boolean() -> f64 { 0.5 }
fn default_icmp() -> f64 { 3.0 }
fn default_phi() -> f64 { 10.0 }
fn default_phi_multiplier() -> f64 { 5.0 }
fn default_constant() -> f64 { 0.01 }
fn default_variable() -> f64 { 0.1 }

impl CostModel {
    /// `(own cost, multiplier applied to the children's total)`
    pub fn node_cost(&self, node: &Node) -> (f64, f64) {
        match node {
            Node::Add(_) | Node::Sub(_) => (self.add_sub, 1.0),
            Node::Mul(_) => (self.mul, 1.0),
            Node::And(_) | Node::Or(_) | Node::Not(_) => (self.boolean, 1.0),
            Node::ICmp(_) => (self.icmp, 1.0),
            Node::Phi(_) => (self.phi, self.phi_multiplier),
            Node::I64(_) | Node::I1(_) => (self.constant, 0.0),
            Node::Var(_) => (self.variable, 0.0),
            // Part of its icmp
            Node::Pred(_) => (0.0, 0.0),
        }
    }

    /// Tree cost of the root of `expr`: a shared sub-expression is paid for
    /// once per use.
    pub fn expr_cost(&self, expr: &RecExpr<Node>) -> f64 {
        if expr.as_ref().is_empty() {
            return 0.0;
        }
        let mut model = *self;
        model.cost_rec(expr)
    }

    /// Reject weights that would make costs meaningless.
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("add_sub", self.add_sub),
            ("mul", self.mul),
            ("boolean", self.boolean),
            ("icmp", self.icmp),
            ("phi", self.phi),
            ("phi_multiplier", self.phi_multiplier),
            ("constant", self.constant),
            ("variable", self.variable),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "cost weight `{}` must be a finite, non-negative number (got {})",
                    name, value
                ));
            }
        }
        Ok(())
    }
}

impl CostFunction<Node> for CostModel {
    type Cost = f64;

    fn cost<C>(&mut self, enode: &Node, mut costs: C) -> Self::Cost
    where
        C: FnMut(Id) -> Self::Cost,
    {
        let (own, multiplier) = self.node_cost(enode);
        own + multiplier * enode.fold(0.0, |acc, id| acc + costs(id))
    }
}
