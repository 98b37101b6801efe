//! Unit tests for CFG lowering
//!
//! Tests cover:
//! - The built-in selector fixtures
//! - Functions loaded from JSON
//! - Malformed control flow graphs

use triple_if::errors::LowerError;
use triple_if::interp::{interp, Env, Value};
use triple_if::ir::Function;
use triple_if::lower::lower;
use triple_if::programs;

fn lower_json(json: &str) -> Result<triple_if::lower::Lowered, LowerError> {
    let function = Function::from_json(json).expect("fixture JSON should parse");
    lower(&function)
}

// ============================================================================
// Fixture Tests
// ============================================================================

mod fixture_tests {
    use super::*;

    #[test]
    fn test_branchy_fixture_matches_select() {
        let lowered = lower(&programs::triple_if()).unwrap();
        for cond in [-5, -1, 0, 1, 2, i64::MAX] {
            let got = programs::run(&lowered, 10, 20, 30, cond).unwrap();
            assert_eq!(got, Value::I64(triple_if::select(10, 20, 30, cond)));
        }
    }

    #[test]
    fn test_ssa_fixture_matches_select() {
        let lowered = lower(&programs::triple_if_ssa()).unwrap();
        for cond in [-5, -1, 0, 1, 2, i64::MIN] {
            let got = programs::run(&lowered, 10, 20, 30, cond).unwrap();
            assert_eq!(got, Value::I64(triple_if::select(10, 20, 30, cond)));
        }
    }

    #[test]
    fn test_lowered_expr_mentions_only_params() {
        let lowered = lower(&programs::triple_if()).unwrap();
        let sexp = lowered.to_sexp();
        assert!(sexp.contains("cond"));
        assert!(!sexp.contains("is_zero"));
        assert!(!sexp.contains("is_one"));
    }

    #[test]
    fn test_by_name() {
        assert_eq!(programs::by_name("triple_if_ssa").unwrap().name, "triple_if_ssa");
        assert!(programs::by_name("nope").is_none());
    }

    #[test]
    fn test_fixture_json_round_trip() {
        let function = programs::triple_if_ssa();
        let json = function.to_json_pretty().unwrap();
        assert_eq!(Function::from_json(&json).unwrap(), function);
    }
}

// ============================================================================
// JSON Input Tests
// ============================================================================

mod json_input_tests {
    use super::*;

    #[test]
    fn test_diamond_with_phi() {
        let lowered = lower_json(
            r#"{
                "name": "max",
                "params": ["x", "y"],
                "blocks": [
                    {"label": "entry",
                     "instrs": [{"op": "icmp", "dest": "lt", "cond": "slt",
                                 "lhs": {"local": "x"}, "rhs": {"local": "y"}}],
                     "term": {"cond_br": {"cond": {"local": "lt"},
                                          "true_dest": "left", "false_dest": "right"}}},
                    {"label": "left", "term": {"br": "join"}},
                    {"label": "right", "term": {"br": "join"}},
                    {"label": "join",
                     "instrs": [{"op": "phi", "dest": "m",
                                 "incoming": [[{"local": "y"}, "left"], [{"local": "x"}, "right"]]}],
                     "term": {"ret": {"local": "m"}}}
                ]
            }"#,
        )
        .unwrap();

        let mut env = Env::default();
        env.set("x", Value::I64(3));
        env.set("y", Value::I64(9));
        assert_eq!(interp(&lowered.expr, &env).unwrap(), Value::I64(9));
        env.set("x", Value::I64(12));
        assert_eq!(interp(&lowered.expr, &env).unwrap(), Value::I64(12));
    }

    #[test]
    fn test_arithmetic_with_constants() {
        let lowered = lower_json(
            r#"{
                "name": "affine",
                "params": ["x"],
                "blocks": [
                    {"label": "entry",
                     "instrs": [
                        {"op": "mul", "dest": "t", "lhs": {"local": "x"}, "rhs": {"const": 3}},
                        {"op": "sub", "dest": "r", "lhs": {"local": "t"}, "rhs": {"const": 1}}
                     ],
                     "term": {"ret": {"local": "r"}}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(lowered.to_sexp(), "(- (* x 3) 1)");
    }

    #[test]
    fn test_unreachable_block_is_ignored() {
        let lowered = lower_json(
            r#"{
                "name": "dead",
                "params": ["x"],
                "blocks": [
                    {"label": "entry", "term": {"ret": {"local": "x"}}},
                    {"label": "dead", "term": {"ret": {"const": 0}}}
                ]
            }"#,
        )
        .unwrap();
        let mut env = Env::default();
        env.set("x", Value::I64(5));
        assert_eq!(interp(&lowered.expr, &env).unwrap(), Value::I64(5));
    }
}

// ============================================================================
// Malformed Graph Tests
// ============================================================================

mod malformed_graph_tests {
    use super::*;

    #[test]
    fn test_empty_function() {
        let err = lower_json(r#"{"name": "f", "params": [], "blocks": []}"#).unwrap_err();
        assert_eq!(
            err,
            LowerError::EmptyFunction {
                function: "f".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_label() {
        let err = lower_json(
            r#"{"name": "f", "params": [], "blocks": [
                {"label": "entry", "term": {"ret": {"const": 0}}},
                {"label": "entry", "term": {"ret": {"const": 1}}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LowerError::DuplicateLabel { label } if label == "entry"));
    }

    #[test]
    fn test_unknown_branch_target() {
        let err = lower_json(
            r#"{"name": "f", "params": [], "blocks": [
                {"label": "entry", "term": {"br": "nowhere"}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LowerError::UnknownBlock { label } if label == "nowhere"));
    }

    #[test]
    fn test_loop_is_rejected() {
        let err = lower_json(
            r#"{"name": "f", "params": ["x"], "blocks": [
                {"label": "entry", "term": {"br": "head"}},
                {"label": "head", "term": {"cond_br": {"cond": {"local": "x"},
                                                      "true_dest": "head", "false_dest": "out"}}},
                {"label": "out", "term": {"ret": {"local": "x"}}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LowerError::Cycle { .. }));
    }

    #[test]
    fn test_use_before_definition() {
        let err = lower_json(
            r#"{"name": "f", "params": [], "blocks": [
                {"label": "entry", "term": {"ret": {"local": "ghost"}}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LowerError::UnknownOperand { name } if name == "ghost"));
    }
}
