//! Equality saturation over gated expressions.
//!
//! The expression is added to an e-graph with constant folding, the rewrite
//! rules run until saturation or a limit, and the cheapest equivalent form
//! under the [`CostModel`] is extracted.
//!
//! The result evaluates to the same value as the input in every environment
//! where the input evaluates without error. Some rules (`phi c x x`, `x - x`)
//! may turn an erroring input into one that evaluates.

use std::time::Duration;

use egg::{rewrite, Extractor, RecExpr, Rewrite, Runner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::ConstFold;
use crate::cost::CostModel;
use crate::lang::Node;
use crate::lower::Lowered;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifyConfig {
    /// Saturation iterations
    #[serde(default = "default_iter_limit")]
    pub iter_limit: usize,
    #[serde(default = "default_node_limit")]
    pub node_limit: usize,
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            iter_limit: default_iter_limit(),
            node_limit: default_node_limit(),
            time_limit_ms: default_time_limit_ms(),
        }
    }
}

fn default_iter_limit() -> usize {
    16
}

fn default_node_limit() -> usize {
    10_000
}

fn default_time_limit_ms() -> u64 {
    5_000
}

pub type Rule = Rewrite<Node, ConstFold>;

pub fn rules() -> Vec<Rule> {
    let mut rules = arithmetic_rules();
    rules.extend(boolean_rules());
    rules.extend(phi_rules());
    rules
}

fn arithmetic_rules() -> Vec<Rule> {
    let mut rules = vec![
        rewrite!("comm add"; "(+ ?a ?b)" => "(+ ?b ?a)"),
        rewrite!("comm mul"; "(* ?a ?b)" => "(* ?b ?a)"),
        rewrite!("one mul"; "(* 1 ?a)" => "?a"),
        rewrite!("zero mul"; "(* 0 ?a)" => "0"),
        rewrite!("zero add"; "(+ 0 ?a)" => "?a"),
        rewrite!("zero sub"; "(- ?a 0)" => "?a"),
        rewrite!("self sub"; "(- ?a ?a)" => "0"),
    ];
    rules.extend(rewrite!("mul distrib"; "(* (+ ?a ?b) ?m)" <=> "(+ (* ?a ?m) (* ?b ?m))"));
    rules
}

fn boolean_rules() -> Vec<Rule> {
    vec![
        rewrite!("comm and"; "(and ?a ?b)" => "(and ?b ?a)"),
        rewrite!("comm or"; "(or ?a ?b)" => "(or ?b ?a)"),
        rewrite!("and true"; "(and true ?a)" => "?a"),
        rewrite!("and false"; "(and false ?a)" => "false"),
        rewrite!("or true"; "(or true ?a)" => "true"),
        rewrite!("or false"; "(or false ?a)" => "?a"),
        rewrite!("and self"; "(and ?a ?a)" => "?a"),
        rewrite!("or self"; "(or ?a ?a)" => "?a"),
        rewrite!("double not"; "(not (not ?a))" => "?a"),
        rewrite!("eq self"; "(icmp eq ?a ?a)" => "true"),
        rewrite!("sle self"; "(icmp sle ?a ?a)" => "true"),
        rewrite!("sge self"; "(icmp sge ?a ?a)" => "true"),
        rewrite!("ne self"; "(icmp ne ?a ?a)" => "false"),
        rewrite!("slt self"; "(icmp slt ?a ?a)" => "false"),
        rewrite!("sgt self"; "(icmp sgt ?a ?a)" => "false"),
    ]
}

fn phi_rules() -> Vec<Rule> {
    let mut rules = vec![
        rewrite!("phi true"; "(phi true ?t ?e)" => "?t"),
        rewrite!("phi false"; "(phi false ?t ?e)" => "?e"),
        rewrite!("phi same"; "(phi ?c ?a ?a)" => "?a"),
        rewrite!("phi not"; "(phi (not ?c) ?t ?e)" => "(phi ?c ?e ?t)"),
    ];
    rules.extend(rewrite!("phi mul"; "(* (phi ?c ?t ?e) ?m)" <=> "(phi ?c (* ?t ?m) (* ?e ?m))"));
    rules
}

/// Simplify with the default limits and cost model.
pub fn simplify(expr: &RecExpr<Node>) -> Lowered {
    Simplifier::default().run(expr)
}

#[derive(Debug, Clone, Default)]
pub struct Simplifier {
    config: SimplifyConfig,
    cost: CostModel,
}

impl Simplifier {
    pub fn new(config: SimplifyConfig, cost: CostModel) -> Self {
        Self { config, cost }
    }

    pub fn run(&self, expr: &RecExpr<Node>) -> Lowered {
        if expr.as_ref().is_empty() {
            return Lowered { expr: expr.clone() };
        }
        let runner = Runner::<Node, ConstFold>::default()
            .with_iter_limit(self.config.iter_limit.max(1))
            .with_node_limit(self.config.node_limit)
            .with_time_limit(Duration::from_millis(self.config.time_limit_ms))
            .with_expr(expr)
            .run(&rules());
        debug!(
            iterations = runner.iterations.len(),
            nodes = runner.egraph.total_number_of_nodes(),
            stop = ?runner.stop_reason,
            "saturation finished"
        );

        let extractor = Extractor::new(&runner.egraph, self.cost);
        let (cost, best) = extractor.find_best(runner.roots[0]);
        debug!(cost, nodes = best.as_ref().len(), "extracted");
        Lowered { expr: best }
    }
}
