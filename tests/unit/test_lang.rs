//! Unit tests for the gated expression language
//!
//! Tests cover:
//! - s-expression parsing and rendering
//! - Parse errors, including the nesting limit

use egg::{Language, RecExpr};
use triple_if::errors::ParseError;
use triple_if::lang::{parse, Cond, Node, MAX_DEPTH};

// ============================================================================
// Parsing Tests
// ============================================================================

mod parse_tests {
    use super::*;

    #[test]
    fn test_render_matches_input() {
        let src = "(phi (icmp eq cond 0) a (phi (icmp eq cond 1) b c))";
        let expr = parse(src).unwrap();
        assert_eq!(expr.to_string(), src);
    }

    #[test]
    fn test_atoms() {
        let expr = parse("(and true (not false))").unwrap();
        assert_eq!(expr.as_ref()[0], Node::I1(true));
        let expr = parse("-42").unwrap();
        assert_eq!(expr.as_ref(), &[Node::I64(-42)]);
    }

    #[test]
    fn test_whitespace_is_flexible() {
        let expr = parse("  ( +\n x\t1 )  ").unwrap();
        assert_eq!(expr.to_string(), "(+ x 1)");
    }

    #[test]
    fn test_icmp_predicate() {
        let expr = parse("(icmp sge x y)").unwrap();
        let root = expr.as_ref().last().unwrap();
        assert!(matches!(root, Node::ICmp(_)));
        assert_eq!(expr[root.children()[0]], Node::Pred(Cond::Sge));
    }

    #[test]
    fn test_unknown_predicate_name_is_a_variable() {
        // Only the six known names are predicates; `icmp` then fails to
        // evaluate rather than to parse.
        let expr = parse("(icmp ult x y)").unwrap();
        assert_eq!(expr.as_ref()[0], Node::Var("ult".into()));
    }

    #[test]
    fn test_display_parses_back() {
        let expr: RecExpr<Node> = parse("(* (- x 1) (phi (or p q) 3 -3))").unwrap();
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn test_depth_at_limit_is_accepted() {
        let src = format!(
            "{}true{}",
            "(not ".repeat(MAX_DEPTH),
            ")".repeat(MAX_DEPTH)
        );
        assert_eq!(parse(&src).unwrap().as_ref().len(), MAX_DEPTH + 1);
    }
}

// ============================================================================
// Parse Error Tests
// ============================================================================

mod parse_error_tests {
    use super::*;

    fn err(s: &str) -> ParseError {
        parse(s).unwrap_err()
    }

    fn is_syntax(e: ParseError) -> bool {
        matches!(e, ParseError::Syntax(_))
    }

    #[test]
    fn test_empty() {
        assert_eq!(err(""), ParseError::Empty);
        assert_eq!(err("   "), ParseError::Empty);
    }

    #[test]
    fn test_unclosed() {
        assert!(is_syntax(err("(+ 1 2")));
    }

    #[test]
    fn test_empty_list() {
        assert!(is_syntax(err("()")));
    }

    #[test]
    fn test_unknown_operator() {
        assert!(is_syntax(err("(/ 1 2)")));
    }

    #[test]
    fn test_wrong_arity() {
        assert!(is_syntax(err("(phi c a)")));
        assert!(is_syntax(err("(not a b)")));
        assert!(is_syntax(err("(+ 1)")));
    }

    #[test]
    fn test_too_deep() {
        let depth = MAX_DEPTH * 4;
        let src = format!("{}true{}", "(not ".repeat(depth), ")".repeat(depth));
        assert_eq!(
            err(&src),
            ParseError::TooDeep {
                depth,
                limit: MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_too_deep_message() {
        let src = format!("{}x", "(not ".repeat(MAX_DEPTH + 1));
        assert!(err(&src).to_string().contains("levels deep"));
    }
}
