//! `triple-if` command-line front end.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use crate::check::{CheckConfig, Checker};
use crate::config::Config;
use crate::errors::{CheckError, TripleIfError};
use crate::interp::{interp, Env, Value};
use crate::ir::Function;
use crate::lang;
use crate::lower::lower;
use crate::programs;
use crate::select::select;
use crate::simplify::Simplifier;
use crate::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "triple-if")]
#[command(about = "Three-way integer selector and its gated-expression toolkit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    output_format: OutputFormat,

    /// Log lowering and simplification steps to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick `a` when COND is 0, `b` when it is 1, `c` otherwise
    Select {
        #[arg(allow_negative_numbers = true)]
        a: i64,
        #[arg(allow_negative_numbers = true)]
        b: i64,
        #[arg(allow_negative_numbers = true)]
        c: i64,
        #[arg(allow_negative_numbers = true)]
        cond: i64,
    },

    /// Lower a control-flow graph into a gated expression
    Lower {
        /// JSON function to lower (default: the built-in fixture)
        #[arg(short, long, value_name = "FILE")]
        input: Option<String>,

        /// Use the single-exit SSA fixture instead of the branchy one
        #[arg(long, conflicts_with = "input")]
        ssa: bool,

        /// Simplify the lowered expression
        #[arg(short, long)]
        simplify: bool,
    },

    /// Evaluate an s-expression
    Eval {
        /// Expression, e.g. "(phi (icmp eq cond 0) a b)"
        expr: String,

        /// Variable binding NAME=VALUE (VALUE is an integer, true or false)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },

    /// Compare `select` with its lowered fixtures on many inputs
    Check {
        /// Random inputs on top of the boundary grid
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        /// Seed for the random inputs
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let format = cli.output_format;

    match cli.command {
        Commands::Select { a, b, c, cond } => {
            let result = select(a, b, c, cond);
            debug!(a, b, c, cond, result, "select");
            match format {
                OutputFormat::Text => println!("{}", result),
                OutputFormat::Json => println!("{}", json!({ "result": result })),
            }
        }
        Commands::Lower {
            input,
            ssa,
            simplify,
        } => {
            let function = match input {
                Some(path) => load_function(&path)?,
                None if ssa => programs::triple_if_ssa(),
                None => programs::triple_if(),
            };
            cmd_lower(&config, &function, simplify, format)?;
        }
        Commands::Eval { expr, vars } => cmd_eval(&expr, &vars, format)?,
        Commands::Check { samples, seed } => {
            let check = CheckConfig {
                samples: samples.unwrap_or(config.check.samples),
                seed: seed.unwrap_or(config.check.seed),
            };
            cmd_check(&config, check, format)?;
        }
    }
    Ok(())
}

fn load_function(path: &str) -> crate::errors::Result<Function> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TripleIfError::Input(format!("failed to read {}: {}", path, e)))?;
    Function::from_json(&content).map_err(|e| {
        TripleIfError::Input(format!("failed to parse function in {}: {}", path, e))
    })
}

fn cmd_lower(
    config: &Config,
    function: &Function,
    simplify: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut lowered = lower(function).map_err(TripleIfError::from)?;
    if simplify {
        lowered = Simplifier::new(config.simplify, config.cost).run(&lowered.expr);
    }
    let sexp = lowered.to_sexp();
    let nodes = lowered.size();
    let cost = config.cost.expr_cost(&lowered.expr);

    match format {
        OutputFormat::Text => {
            println!("{} {}", "function:".bold(), function.name);
            println!("{} {}", "expr:".bold(), sexp);
            println!("{} {}", "nodes:".bold(), nodes);
            println!("{} {:.2}", "cost:".bold(), cost);
        }
        OutputFormat::Json => println!(
            "{}",
            json!({
                "function": function.name,
                "simplified": simplify,
                "expr": sexp,
                "nodes": nodes,
                "cost": cost,
            })
        ),
    }
    Ok(())
}

fn parse_binding(binding: &str) -> crate::errors::Result<(String, Value)> {
    let Some((name, value)) = binding.split_once('=') else {
        return Err(TripleIfError::Input(format!(
            "binding '{}' is not NAME=VALUE",
            binding
        )));
    };
    let value = match value {
        "true" => Value::I1(true),
        "false" => Value::I1(false),
        v => Value::I64(v.parse().map_err(|e| {
            TripleIfError::Input(format!("bad value in binding '{}': {}", binding, e))
        })?),
    };
    Ok((name.to_string(), value))
}

fn cmd_eval(expr: &str, vars: &[String], format: OutputFormat) -> Result<()> {
    let parsed = lang::parse(expr).map_err(TripleIfError::from)?;
    let mut env = Env::default();
    for binding in vars {
        let (name, value) = parse_binding(binding)?;
        env.set(name, value);
    }
    let value = interp(&parsed, &env).map_err(TripleIfError::from)?;
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => println!("{}", json!({ "value": value })),
    }
    Ok(())
}

fn cmd_check(config: &Config, check: CheckConfig, format: OutputFormat) -> Result<()> {
    let checker = Checker::new(
        Simplifier::new(config.simplify, config.cost),
        config.cost,
        check,
    );
    let report = checker.run()?;

    match format {
        OutputFormat::Text => {
            for fixture in &report.fixtures {
                let name = if fixture.simplified {
                    format!("{} (simplified)", fixture.function)
                } else {
                    fixture.function.clone()
                };
                let status = if fixture.mismatches.is_empty() {
                    "ok".green()
                } else {
                    "FAILED".red()
                };
                println!(
                    "{:<30} {} {} inputs, {} nodes, cost {:.2}",
                    name,
                    status,
                    fixture.checked,
                    fixture.nodes,
                    fixture.cost
                );
                for m in fixture.mismatches.iter().take(5) {
                    println!(
                        "    select({}, {}, {}, {}) = {}, got {}",
                        m.inputs.a, m.inputs.b, m.inputs.c, m.inputs.cond, m.expected, m.actual
                    );
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.passed() {
        return Err(TripleIfError::Check(CheckError::Mismatch {
            mismatches: report.mismatches(),
            total: report.total(),
        })
        .into());
    }
    Ok(())
}
