use thiserror::Error;

/// The central error type for the triple-if toolkit.
///
/// Each stage (parsing, interpretation, lowering, checking) has its own
/// enum so callers can match on the failure they care about; this wrapper
/// lets the CLI carry any of them through one `Result`.
#[derive(Error, Debug)]
pub enum TripleIfError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Interpreter error: {0}")]
    Interp(#[from] InterpError),

    #[error("Lowering error: {0}")]
    Lower(#[from] LowerError),

    #[error("Check failed: {0}")]
    Check(#[from] CheckError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Unreadable or malformed command-line input
    #[error("Invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,

    #[error("expression nests {depth} levels deep; the limit is {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("unknown predicate '{pred}'")]
    UnknownPredicate { pred: String },

    #[error("{0}")]
    Syntax(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpError {
    #[error("unbound variable `{name}`")]
    UnboundVariable { name: String },

    #[error("cannot apply `{op}` to {operands}")]
    TypeMismatch { op: String, operands: String },

    #[error("predicate `{pred}` is not defined on booleans")]
    UnsupportedPredicate { pred: String },

    #[error("predicate `{pred}` is not a value")]
    BarePredicate { pred: String },

    #[error("nothing to evaluate")]
    EmptyExpression,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    #[error("function `{function}` has no blocks")]
    EmptyFunction { function: String },

    #[error("duplicate block label `{label}`")]
    DuplicateLabel { label: String },

    #[error("branch to unknown block `{label}`")]
    UnknownBlock { label: String },

    #[error("use of undefined value `%{name}`")]
    UnknownOperand { name: String },

    #[error("control flow graph has a cycle through `{label}`; loops are not lowered")]
    Cycle { label: String },

    #[error("phi `%{dest}` lists `{label}`, which is not a predecessor of `{block}`")]
    PhiNotPredecessor {
        dest: String,
        label: String,
        block: String,
    },

    #[error("phi `%{dest}` has no incoming values")]
    EmptyPhi { dest: String },

    #[error("function `{function}` has no reachable return")]
    NoReturn { function: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("{mismatches} of {total} inputs disagreed with `select`")]
    Mismatch { mismatches: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, TripleIfError>;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_INPUT_ERROR: u8 = 3;
pub const EXIT_CHECK_FAILED: u8 = 4;

/// Determine the appropriate process exit code for an error.
pub fn get_exit_code(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<TripleIfError>() {
        return match err {
            TripleIfError::Config(_) => EXIT_CONFIG_ERROR,
            TripleIfError::Parse(_)
            | TripleIfError::Lower(_)
            | TripleIfError::Interp(_)
            | TripleIfError::Input(_) => EXIT_INPUT_ERROR,
            TripleIfError::Check(_) => EXIT_CHECK_FAILED,
            TripleIfError::Other(_) => EXIT_ERROR,
        };
    }

    // Direct enum unwraps fallback
    if e.downcast_ref::<CheckError>().is_some() {
        return EXIT_CHECK_FAILED;
    }
    if e.downcast_ref::<ParseError>().is_some()
        || e.downcast_ref::<LowerError>().is_some()
        || e.downcast_ref::<InterpError>().is_some()
    {
        return EXIT_INPUT_ERROR;
    }

    EXIT_ERROR
}
