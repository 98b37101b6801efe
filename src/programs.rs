//! Built-in control-flow fixtures for the selector.
//!
//! Both functions compute [`select`](crate::select) over the parameters
//! `a`, `b`, `c`, `cond`; they differ only in how the three outcomes reach
//! the exit.

use crate::errors::InterpError;
use crate::interp::{interp, Env, Value};
use crate::ir::{Block, Function, Instr, Operand, Terminator};
use crate::lang::Cond;
use crate::lower::Lowered;

/// Parameter names shared by the fixtures, in call order.
pub const PARAMS: [&str; 4] = ["a", "b", "c", "cond"];

fn params() -> Vec<String> {
    PARAMS.iter().map(|p| p.to_string()).collect()
}

fn is_equal(dest: &str, value: i64) -> Instr {
    Instr::ICmp {
        dest: dest.to_string(),
        cond: Cond::Eq,
        lhs: Operand::local("cond"),
        rhs: Operand::Const(value),
    }
}

fn branch(cond: &str, true_dest: &str, false_dest: &str) -> Terminator {
    Terminator::CondBr {
        cond: Operand::local(cond),
        true_dest: true_dest.to_string(),
        false_dest: false_dest.to_string(),
    }
}

/// The selector as an `if / else if / else` chain with one `ret` per arm.
///
/// ```text
/// entry:   %is_zero = icmp eq %cond, 0 ; br %is_zero, ret_a, check_one
/// check_one: %is_one = icmp eq %cond, 1 ; br %is_one, ret_b, ret_c
/// ret_a: ret %a     ret_b: ret %b     ret_c: ret %c
/// ```
pub fn triple_if() -> Function {
    Function {
        name: "triple_if".to_string(),
        params: params(),
        blocks: vec![
            Block::new(
                "entry",
                vec![is_equal("is_zero", 0)],
                branch("is_zero", "ret_a", "check_one"),
            ),
            Block::new(
                "check_one",
                vec![is_equal("is_one", 1)],
                branch("is_one", "ret_b", "ret_c"),
            ),
            Block::new("ret_a", vec![], Terminator::Ret(Operand::local("a"))),
            Block::new("ret_b", vec![], Terminator::Ret(Operand::local("b"))),
            Block::new("ret_c", vec![], Terminator::Ret(Operand::local("c"))),
        ],
    }
}

/// The selector with a single exit block merging the arms through an SSA
/// `phi`.
pub fn triple_if_ssa() -> Function {
    Function {
        name: "triple_if_ssa".to_string(),
        params: params(),
        blocks: vec![
            Block::new(
                "entry",
                vec![is_equal("is_zero", 0)],
                branch("is_zero", "exit", "check_one"),
            ),
            Block::new(
                "check_one",
                vec![is_equal("is_one", 1)],
                branch("is_one", "exit", "other"),
            ),
            Block::new("other", vec![], Terminator::Br("exit".to_string())),
            Block::new(
                "exit",
                vec![Instr::Phi {
                    dest: "result".to_string(),
                    incoming: vec![
                        (Operand::local("a"), "entry".to_string()),
                        (Operand::local("b"), "check_one".to_string()),
                        (Operand::local("c"), "other".to_string()),
                    ],
                }],
                Terminator::Ret(Operand::local("result")),
            ),
        ],
    }
}

/// Every built-in fixture.
pub fn all() -> Vec<Function> {
    vec![triple_if(), triple_if_ssa()]
}

/// Look a fixture up by name.
pub fn by_name(name: &str) -> Option<Function> {
    all().into_iter().find(|f| f.name == name)
}

/// Interpret a lowered fixture on concrete selector inputs.
pub fn run(lowered: &Lowered, a: i64, b: i64, c: i64, cond: i64) -> Result<Value, InterpError> {
    interp(&lowered.expr, &Env::for_select(a, b, c, cond))
}
