//! triple-if - a three-way integer selector and the gated-expression
//! toolkit used to analyze it.
//!
//! - **Selector**: [`select`] picks `a`, `b` or `c` by an integer condition
//! - **IR**: the same selector as a control-flow graph ([`ir`], [`cfg`])
//! - **Lowering**: CFG to a single `phi`-gated expression ([`lower`])
//! - **Analysis**: interpreter, equality-saturation simplifier and cost model
//! - **Check**: differential testing of `select` against its lowered forms
//!
//! # Quick Start
//!
//! ```
//! use triple_if::{lower, programs, select};
//!
//! let lowered = lower::lower(&programs::triple_if())?;
//! let value = programs::run(&lowered, 10, 20, 30, 1)?;
//! assert_eq!(value.as_i64(), Some(select(10, 20, 30, 1)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// ─── Core ──────────────────────────────────────────────────────────
pub mod errors;
pub mod select;

// ─── Gated expressions ─────────────────────────────────────────────
pub mod analysis;
pub mod cost;
pub mod interp;
pub mod lang;
pub mod simplify;

// ─── Control flow ──────────────────────────────────────────────────
pub mod cfg;
pub mod ir;
pub mod lower;
pub mod programs;

// ─── Front end ─────────────────────────────────────────────────────
pub mod check;
pub mod cli;
pub mod config;
pub mod telemetry;

pub use errors::{Result, TripleIfError};
pub use select::select;
