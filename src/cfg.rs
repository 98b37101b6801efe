use std::collections::{HashMap, VecDeque};

use crate::errors::LowerError;
use crate::ir::{Function, Terminator};

/// Successor/predecessor view of a [`Function`]'s blocks.
///
/// Blocks are identified by their position in `Function::blocks`; block 0 is
/// the entry. Predecessor lists hold each predecessor once, even when both
/// sides of a conditional branch target the same block.
#[derive(Debug, Clone)]
pub struct Cfg {
    labels: Vec<String>,
    lbl_to_id: HashMap<String, usize>,
    graph: Vec<Vec<usize>>,
    transposed: Vec<Vec<usize>>,
    ret_blocks: Vec<usize>,
}

impl Cfg {
    pub fn new(function: &Function) -> Result<Self, LowerError> {
        if function.blocks.is_empty() {
            return Err(LowerError::EmptyFunction {
                function: function.name.clone(),
            });
        }

        let mut lbl_to_id = HashMap::new();
        for (i, block) in function.blocks.iter().enumerate() {
            if lbl_to_id.insert(block.label.clone(), i).is_some() {
                return Err(LowerError::DuplicateLabel {
                    label: block.label.clone(),
                });
            }
        }

        let n = function.blocks.len();
        let mut graph = vec![Vec::new(); n];
        let mut transposed = vec![Vec::new(); n];
        let mut ret_blocks = Vec::new();
        for (i, block) in function.blocks.iter().enumerate() {
            if let Terminator::Ret(_) = block.term {
                ret_blocks.push(i);
            }
            for target in block.term.targets() {
                let dest = *lbl_to_id
                    .get(target)
                    .ok_or_else(|| LowerError::UnknownBlock {
                        label: target.to_string(),
                    })?;
                if !graph[i].contains(&dest) {
                    graph[i].push(dest);
                    transposed[dest].push(i);
                }
            }
        }

        Ok(Self {
            labels: function.blocks.iter().map(|b| b.label.clone()).collect(),
            lbl_to_id,
            graph,
            transposed,
            ret_blocks,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn id_of(&self, label: &str) -> Option<usize> {
        self.lbl_to_id.get(label).copied()
    }

    pub fn label(&self, id: usize) -> &str {
        &self.labels[id]
    }

    pub fn succs(&self, id: usize) -> &[usize] {
        &self.graph[id]
    }

    pub fn preds(&self, id: usize) -> &[usize] {
        &self.transposed[id]
    }

    pub fn ret_blocks(&self) -> &[usize] {
        &self.ret_blocks
    }

    /// Kahn's algorithm over every block, reachable or not. Fails on the
    /// first block left over when the graph has a cycle.
    pub fn topo_order(&self) -> Result<Vec<usize>, LowerError> {
        let mut incoming: Vec<usize> = self.transposed.iter().map(Vec::len).collect();

        let mut queue = VecDeque::from_iter(
            incoming
                .iter()
                .enumerate()
                .filter_map(|(i, &x)| (x == 0).then_some(i)),
        );

        let mut order = Vec::with_capacity(self.len());
        while let Some(x) = queue.pop_front() {
            order.push(x);
            for &dest in &self.graph[x] {
                incoming[dest] -= 1;
                if incoming[dest] == 0 {
                    queue.push_back(dest);
                }
            }
        }

        if order.len() < self.len() {
            let stuck = (0..self.len())
                .find(|i| incoming[*i] > 0)
                .unwrap_or_default();
            return Err(LowerError::Cycle {
                label: self.labels[stuck].clone(),
            });
        }
        Ok(order)
    }
}
