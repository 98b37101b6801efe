//! Differential check of [`select`] against its lowered fixtures.
//!
//! Every fixture is lowered (and, optionally, simplified) and then
//! interpreted on a fixed grid of boundary inputs plus a batch of seeded
//! pseudo-random ones. Any disagreement with `select` is reported.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cost::CostModel;
use crate::errors::{Result, TripleIfError};
use crate::interp::Value;
use crate::ir::Function;
use crate::lower::{lower, Lowered};
use crate::programs;
use crate::select::select;
use crate::simplify::Simplifier;

/// Values every check covers, for each of `a`, `b`, `c` and `cond`.
pub const BOUNDARY: [i64; 6] = [0, 1, -1, 2, i64::MIN, i64::MAX];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: default_seed(),
        }
    }
}

fn default_samples() -> usize {
    256
}

fn default_seed() -> u64 {
    0x7131_f00d
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inputs {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub cond: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub inputs: Inputs,
    pub expected: i64,
    /// Interpreter result, or its error message.
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureReport {
    pub function: String,
    pub simplified: bool,
    pub nodes: usize,
    pub cost: f64,
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub fixtures: Vec<FixtureReport>,
}

impl CheckReport {
    pub fn total(&self) -> usize {
        self.fixtures.iter().map(|f| f.checked).sum()
    }

    pub fn mismatches(&self) -> usize {
        self.fixtures.iter().map(|f| f.mismatches.len()).sum()
    }

    pub fn passed(&self) -> bool {
        self.mismatches() == 0
    }
}

/// The boundary grid followed by `samples` seeded random inputs. Random
/// selectors land on 0 and 1 often enough to exercise all three arms.
pub fn inputs(samples: usize, seed: u64) -> Vec<Inputs> {
    let mut out = Vec::with_capacity(BOUNDARY.len().pow(2) + samples);
    for &cond in &BOUNDARY {
        for &v in &BOUNDARY {
            out.push(Inputs {
                a: v,
                b: v.wrapping_add(1),
                c: v.wrapping_sub(1),
                cond,
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..samples {
        let cond = if rng.random_bool(0.5) {
            rng.random_range(-2..=3)
        } else {
            rng.random()
        };
        out.push(Inputs {
            a: rng.random(),
            b: rng.random(),
            c: rng.random(),
            cond,
        });
    }
    out
}

pub struct Checker {
    simplifier: Simplifier,
    cost: CostModel,
    config: CheckConfig,
}

impl Checker {
    /// `cost` prices the reports; the simplifier extracts with its own model.
    pub fn new(simplifier: Simplifier, cost: CostModel, config: CheckConfig) -> Self {
        Self {
            simplifier,
            cost,
            config,
        }
    }

    /// Check every built-in fixture, raw and simplified.
    pub fn run(&self) -> Result<CheckReport> {
        let inputs = inputs(self.config.samples, self.config.seed);
        let mut fixtures = Vec::new();
        for function in programs::all() {
            fixtures.extend(self.check_function(&function, &inputs)?);
        }
        let report = CheckReport { fixtures };
        if report.passed() {
            info!(inputs = report.total(), "all fixtures agree with select");
        } else {
            warn!(mismatches = report.mismatches(), "fixtures disagree with select");
        }
        Ok(report)
    }

    /// Check one function, raw and simplified, against `select`.
    pub fn check_function(
        &self,
        function: &Function,
        inputs: &[Inputs],
    ) -> Result<Vec<FixtureReport>> {
        let raw = lower(function).map_err(TripleIfError::from)?;
        let simplified = self.simplifier.run(&raw.expr);
        Ok(vec![
            self.check_lowered(&function.name, false, &raw, inputs),
            self.check_lowered(&function.name, true, &simplified, inputs),
        ])
    }

    fn check_lowered(
        &self,
        name: &str,
        simplified: bool,
        lowered: &Lowered,
        inputs: &[Inputs],
    ) -> FixtureReport {
        let mismatches: Vec<Mismatch> = inputs
            .iter()
            .filter_map(|&i| {
                let expected = select(i.a, i.b, i.c, i.cond);
                let actual = programs::run(lowered, i.a, i.b, i.c, i.cond);
                match actual {
                    Ok(Value::I64(v)) if v == expected => None,
                    Ok(other) => Some(Mismatch {
                        inputs: i,
                        expected,
                        actual: other.to_string(),
                    }),
                    Err(e) => Some(Mismatch {
                        inputs: i,
                        expected,
                        actual: e.to_string(),
                    }),
                }
            })
            .collect();
        debug!(
            function = name,
            simplified,
            checked = inputs.len(),
            mismatches = mismatches.len(),
            "checked fixture"
        );
        FixtureReport {
            function: name.to_string(),
            simplified,
            nodes: lowered.size(),
            cost: self.cost.expr_cost(&lowered.expr),
            checked: inputs.len(),
            mismatches,
        }
    }
}
