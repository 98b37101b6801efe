//! Control-flow-graph input form.
//!
//! A small SSA-style IR: a function is a list of labelled basic blocks, each
//! a run of instructions followed by one terminator. The first block is the
//! entry. Everything here is plain data and (de)serializes with serde, so a
//! function can be handed to the lowering pass as JSON.

use crate::lang::Cond;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Const(i64),
    Local(String),
}

impl Operand {
    pub fn local(name: &str) -> Self {
        Operand::Local(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instr {
    #[serde(rename = "icmp")]
    ICmp {
        dest: String,
        cond: Cond,
        lhs: Operand,
        rhs: Operand,
    },
    Add {
        dest: String,
        lhs: Operand,
        rhs: Operand,
    },
    Sub {
        dest: String,
        lhs: Operand,
        rhs: Operand,
    },
    Mul {
        dest: String,
        lhs: Operand,
        rhs: Operand,
    },
    /// Value chosen by the predecessor control arrived from.
    Phi {
        dest: String,
        incoming: Vec<(Operand, String)>,
    },
}

impl Instr {
    pub fn dest(&self) -> &str {
        match self {
            Instr::ICmp { dest, .. }
            | Instr::Add { dest, .. }
            | Instr::Sub { dest, .. }
            | Instr::Mul { dest, .. }
            | Instr::Phi { dest, .. } => dest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    Ret(Operand),
    Br(String),
    CondBr {
        cond: Operand,
        true_dest: String,
        false_dest: String,
    },
}

impl Terminator {
    /// Labels this terminator can jump to, in branch order.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Terminator::Ret(_) => vec![],
            Terminator::Br(dest) => vec![dest.as_str()],
            Terminator::CondBr {
                true_dest,
                false_dest,
                ..
            } => vec![true_dest.as_str(), false_dest.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub label: String,
    #[serde(default)]
    pub instrs: Vec<Instr>,
    pub term: Terminator,
}

impl Block {
    pub fn new(label: &str, instrs: Vec<Instr>, term: Terminator) -> Self {
        Self {
            label: label.to_string(),
            instrs,
            term,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
