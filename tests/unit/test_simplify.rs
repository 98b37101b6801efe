//! Unit tests for the simplifier and cost model
//!
//! Tests cover:
//! - Simplified fixtures stay equivalent to `select`
//! - Simplification never raises the cost
//! - Long chains of if/else joins stay linear
//! - Cost weights from configuration

use std::time::{Duration, Instant};

use triple_if::cost::CostModel;
use triple_if::interp::{interp, Env, Value};
use triple_if::ir::{Block, Function, Instr, Operand, Terminator};
use triple_if::lang::{parse, Cond};
use triple_if::lower::lower;
use triple_if::programs;
use triple_if::simplify::{simplify, Simplifier, SimplifyConfig};

// ============================================================================
// Fixture Simplification Tests
// ============================================================================

mod fixture_simplification_tests {
    use super::*;

    #[test]
    fn test_true_guards_are_dropped() {
        let raw = lower(&programs::triple_if()).unwrap();
        let simplified = simplify(&raw.expr);
        let sexp = simplified.to_sexp();
        assert!(sexp.starts_with("(phi (icmp eq cond 0) a "));
        assert!(!sexp.contains("true"));
    }

    #[test]
    fn test_simplified_fixtures_agree_with_select() {
        for function in programs::all() {
            let raw = lower(&function).unwrap();
            let simplified = simplify(&raw.expr);
            for cond in [-1, 0, 1, 2, 7] {
                let expected = triple_if::select(-4, 5, 99, cond);
                let got = programs::run(&simplified, -4, 5, 99, cond).unwrap();
                assert_eq!(got.as_i64(), Some(expected), "{} cond={}", function.name, cond);
            }
        }
    }

    #[test]
    fn test_second_run_does_not_raise_cost() {
        let model = CostModel::default();
        let raw = lower(&programs::triple_if_ssa()).unwrap();
        let once = simplify(&raw.expr);
        let twice = simplify(&once.expr);
        assert!(model.expr_cost(&twice.expr) <= model.expr_cost(&once.expr));
    }

    #[test]
    fn test_one_iteration_rewrites_under_a_phi() {
        let config = SimplifyConfig {
            iter_limit: 1,
            ..SimplifyConfig::default()
        };
        let expr = parse("(phi (not (not c)) a b)").unwrap();
        let out = Simplifier::new(config, CostModel::default()).run(&expr);
        // The collapsed condition reaches the phi by congruence.
        assert_eq!(out.to_sexp(), "(phi c a b)");
    }
}

// ============================================================================
// Chained Join Tests
// ============================================================================

mod chained_join_tests {
    use super::*;

    const JOINS: i64 = 40;

    /// `v = x; for k in 0..JOINS { if x > k { v = v + 1 } }; return v`, one
    /// diamond per step. Every join's block condition reuses the previous
    /// one twice, so the expression is linear as a DAG and exponential as a
    /// tree.
    fn counting_chain() -> Function {
        let mut blocks = Vec::new();
        let mut value = Operand::local("x");
        for k in 0..JOINS {
            let mut instrs = Vec::new();
            if k > 0 {
                instrs.push(Instr::Phi {
                    dest: format!("v{k}"),
                    incoming: vec![
                        (Operand::local(&format!("u{}", k - 1)), format!("inc{}", k - 1)),
                        (value.clone(), format!("skip{}", k - 1)),
                    ],
                });
                value = Operand::local(&format!("v{k}"));
            }
            instrs.push(Instr::ICmp {
                dest: format!("t{k}"),
                cond: Cond::Sgt,
                lhs: Operand::local("x"),
                rhs: Operand::Const(k),
            });
            blocks.push(Block::new(
                &format!("step{k}"),
                instrs,
                Terminator::CondBr {
                    cond: Operand::local(&format!("t{k}")),
                    true_dest: format!("inc{k}"),
                    false_dest: format!("skip{k}"),
                },
            ));
            blocks.push(Block::new(
                &format!("inc{k}"),
                vec![Instr::Add {
                    dest: format!("u{k}"),
                    lhs: value.clone(),
                    rhs: Operand::Const(1),
                }],
                Terminator::Br(format!("step{}", k + 1)),
            ));
            blocks.push(Block::new(
                &format!("skip{k}"),
                vec![],
                Terminator::Br(format!("step{}", k + 1)),
            ));
        }
        let last = JOINS - 1;
        blocks.push(Block::new(
            &format!("step{JOINS}"),
            vec![Instr::Phi {
                dest: "out".to_string(),
                incoming: vec![
                    (Operand::local(&format!("u{last}")), format!("inc{last}")),
                    (value, format!("skip{last}")),
                ],
            }],
            Terminator::Ret(Operand::local("out")),
        ));
        Function {
            name: "counting_chain".to_string(),
            params: vec!["x".to_string()],
            blocks,
        }
    }

    fn expected(x: i64) -> i64 {
        x + (0..JOINS).filter(|k| x > *k).count() as i64
    }

    #[test]
    fn test_lowering_stays_linear() {
        let raw = lower(&counting_chain()).unwrap();
        assert!(raw.size() < 20 * JOINS as usize, "{} nodes", raw.size());
        for x in [-3, 0, 1, 17, 39, 40, 1000] {
            let env: Env = [("x", Value::I64(x))].into_iter().collect();
            assert_eq!(interp(&raw.expr, &env), Ok(Value::I64(expected(x))), "x={}", x);
        }
    }

    #[test]
    fn test_simplify_finishes_and_preserves_values() {
        let raw = lower(&counting_chain()).unwrap();
        let started = Instant::now();
        let simplified = simplify(&raw.expr);
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(simplified.size() < 2_000, "{} nodes", simplified.size());

        let model = CostModel::default();
        assert!(model.expr_cost(&simplified.expr) <= model.expr_cost(&raw.expr));
        for x in [-3, 0, 1, 17, 39, 40, 1000] {
            let env: Env = [("x", Value::I64(x))].into_iter().collect();
            assert_eq!(
                interp(&simplified.expr, &env),
                Ok(Value::I64(expected(x))),
                "x={}",
                x
            );
        }
    }
}

// ============================================================================
// Cost Tests
// ============================================================================

mod cost_tests {
    use super::*;

    #[test]
    fn test_simplification_lowers_cost() {
        let model = CostModel::default();
        for function in programs::all() {
            let raw = lower(&function).unwrap();
            let simplified = simplify(&raw.expr);
            assert!(
                model.expr_cost(&simplified.expr) < model.expr_cost(&raw.expr),
                "{}",
                function.name
            );
        }
    }

    #[test]
    fn test_custom_weights_change_ranking() {
        let expr = parse("(* x 2)").unwrap();
        let cheap_mul = CostModel {
            mul: 0.0,
            ..CostModel::default()
        };
        assert!(cheap_mul.expr_cost(&expr) < CostModel::default().expr_cost(&expr));
    }

    #[test]
    fn test_custom_weights_steer_extraction() {
        // With free multiplication and expensive phi nodes, keeping the
        // multiplication outside the phi is no longer worse.
        let model = CostModel {
            mul: 0.0,
            phi: 50.0,
            ..CostModel::default()
        };
        let expr = parse("(phi c (* x 3) (* y 3))").unwrap();
        let out = Simplifier::new(SimplifyConfig::default(), model).run(&expr);
        assert!(model.expr_cost(&out.expr) <= model.expr_cost(&expr));
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let model = CostModel {
            phi: -1.0,
            ..CostModel::default()
        };
        assert!(model.validate().unwrap_err().contains("phi"));
        assert!(CostModel::default().validate().is_ok());
    }
}
