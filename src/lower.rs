//! Lowering from a control-flow graph to a single gated expression.
//!
//! Every block gets a boolean *block condition* that holds exactly when
//! control reaches it. The entry block's condition is `true`; any other
//! block's condition is the disjunction of its incoming edge conditions. An
//! edge leaving `p` by an unconditional branch carries `cond(p)`, one leaving
//! by the true (false) side of a conditional branch on `c` carries
//! `c and cond(p)` (`not c and cond(p)`).
//!
//! With those conditions, both SSA `phi` instructions and multiple `ret`
//! blocks turn into nested `phi` nodes, and the whole function becomes one
//! expression over its parameters.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::cfg::Cfg;
use crate::errors::LowerError;
use crate::ir::{Function, Instr, Operand, Terminator};
use crate::lang::Node;
use egg::{EGraph, Id, Language, RecExpr, Symbol};

/// A gated expression whose root is its last node.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub expr: RecExpr<Node>,
}

impl Lowered {
    pub fn to_sexp(&self) -> String {
        self.expr.to_string()
    }

    /// Number of distinct nodes.
    pub fn size(&self) -> usize {
        self.expr.as_ref().len()
    }
}

/// Hash-consing store for the nodes built while lowering. No rewrites run
/// on it, so every class holds exactly the node that was added.
type Graph = EGraph<Node, ()>;

struct Context<'f> {
    function: &'f Function,
    cfg: Cfg,
    graph: Graph,
    values: HashMap<String, Id>,
    block_cond: Vec<Option<Id>>,
    rets: Vec<(usize, Id)>,
}

/// Lower `function` into a gated expression over its parameters.
pub fn lower(function: &Function) -> Result<Lowered, LowerError> {
    let cfg = Cfg::new(function)?;
    let order = cfg.topo_order()?;
    debug!(
        function = %function.name,
        blocks = cfg.len(),
        "lowering function"
    );

    let mut ctx = Context {
        function,
        block_cond: vec![None; cfg.len()],
        cfg,
        graph: Graph::default(),
        values: HashMap::new(),
        rets: Vec::new(),
    };

    for param in &function.params {
        let id = ctx.graph.add(Node::Var(Symbol::from(param.as_str())));
        ctx.values.insert(param.clone(), id);
    }

    for block_id in order {
        ctx.lower_block(block_id)?;
    }

    let root = ctx.combine_returns()?;
    let as_built = |id: Id| ctx.graph[id].nodes[0].clone();
    let expr = as_built(root).build_recexpr(as_built);
    debug!(function = %function.name, nodes = expr.as_ref().len(), "lowered");
    Ok(Lowered { expr })
}

impl Context<'_> {
    fn lower_block(&mut self, block_id: usize) -> Result<(), LowerError> {
        let cond = self.compute_block_cond(block_id)?;
        self.block_cond[block_id] = Some(cond);
        trace!(block = self.cfg.label(block_id), cond = %cond, "block condition");

        let function = self.function;
        let block = &function.blocks[block_id];
        for instr in &block.instrs {
            let id = self.lower_instr(block_id, instr)?;
            self.values.insert(instr.dest().to_string(), id);
        }

        if let Terminator::Ret(op) = &block.term {
            let value = self.operand(op)?;
            self.rets.push((block_id, value));
        }
        Ok(())
    }

    fn compute_block_cond(&mut self, block_id: usize) -> Result<Id, LowerError> {
        if block_id == 0 {
            return Ok(self.graph.add(Node::I1(true)));
        }
        let preds = self.cfg.preds(block_id).to_vec();
        let Some((first, rest)) = preds.split_first() else {
            // Unreachable block
            return Ok(self.graph.add(Node::I1(false)));
        };
        let mut cond = self.edge_cond(*first, block_id)?;
        for pred in rest {
            let edge = self.edge_cond(*pred, block_id)?;
            cond = self.graph.add(Node::Or([edge, cond]));
        }
        Ok(cond)
    }

    /// Condition under which control flows from `pred` directly into `block_id`.
    fn edge_cond(&mut self, pred: usize, block_id: usize) -> Result<Id, LowerError> {
        // Topological order guarantees the predecessor was visited first.
        let pred_cond = self.block_cond[pred].ok_or_else(|| LowerError::Cycle {
            label: self.cfg.label(pred).to_string(),
        })?;
        let function = self.function;
        let label = function.blocks[block_id].label.as_str();
        match &function.blocks[pred].term {
            Terminator::CondBr {
                cond,
                true_dest,
                false_dest,
            } if true_dest != false_dest => {
                let c = self.operand(cond)?;
                let c = if false_dest == label {
                    self.graph.add(Node::Not(c))
                } else {
                    c
                };
                Ok(self.graph.add(Node::And([c, pred_cond])))
            }
            _ => Ok(pred_cond),
        }
    }

    fn lower_instr(&mut self, block_id: usize, instr: &Instr) -> Result<Id, LowerError> {
        let node = match instr {
            Instr::ICmp { cond, lhs, rhs, .. } => {
                let pred = self.graph.add(Node::Pred(*cond));
                Node::ICmp([pred, self.operand(lhs)?, self.operand(rhs)?])
            }
            Instr::Add { lhs, rhs, .. } => Node::Add([self.operand(lhs)?, self.operand(rhs)?]),
            Instr::Sub { lhs, rhs, .. } => Node::Sub([self.operand(lhs)?, self.operand(rhs)?]),
            Instr::Mul { lhs, rhs, .. } => Node::Mul([self.operand(lhs)?, self.operand(rhs)?]),
            Instr::Phi { dest, incoming } => return self.lower_phi(block_id, dest, incoming),
        };
        Ok(self.graph.add(node))
    }

    fn lower_phi(
        &mut self,
        block_id: usize,
        dest: &str,
        incoming: &[(Operand, String)],
    ) -> Result<Id, LowerError> {
        let Some(((first_op, first_lbl), rest)) = incoming.split_first() else {
            return Err(LowerError::EmptyPhi {
                dest: dest.to_string(),
            });
        };
        self.phi_pred(block_id, dest, first_lbl)?;
        let mut acc = self.operand(first_op)?;
        for (op, lbl) in rest {
            let pred = self.phi_pred(block_id, dest, lbl)?;
            let gate = self.edge_cond(pred, block_id)?;
            let value = self.operand(op)?;
            acc = self.graph.add(Node::Phi([gate, value, acc]));
        }
        Ok(acc)
    }

    fn phi_pred(&self, block_id: usize, dest: &str, label: &str) -> Result<usize, LowerError> {
        self.cfg
            .id_of(label)
            .filter(|pred| self.cfg.preds(block_id).contains(pred))
            .ok_or_else(|| LowerError::PhiNotPredecessor {
                dest: dest.to_string(),
                label: label.to_string(),
                block: self.cfg.label(block_id).to_string(),
            })
    }

    fn operand(&mut self, op: &Operand) -> Result<Id, LowerError> {
        match op {
            Operand::Const(value) => Ok(self.graph.add(Node::I64(*value))),
            Operand::Local(name) => {
                self.values
                    .get(name)
                    .copied()
                    .ok_or_else(|| LowerError::UnknownOperand { name: name.clone() })
            }
        }
    }

    /// Fold the returns, in topological order, into
    /// `phi(cond(r1), v1, phi(cond(r2), v2, ... vn))`.
    fn combine_returns(&mut self) -> Result<Id, LowerError> {
        let rets = std::mem::take(&mut self.rets);
        let Some(((_, last), init)) = rets.split_last() else {
            return Err(LowerError::NoReturn {
                function: self.function.name.clone(),
            });
        };
        let mut acc = *last;
        for (block_id, value) in init.iter().rev() {
            let cond = self.block_cond[*block_id].ok_or_else(|| LowerError::NoReturn {
                function: self.function.name.clone(),
            })?;
            acc = self.graph.add(Node::Phi([cond, *value, acc]));
        }
        Ok(acc)
    }
}
