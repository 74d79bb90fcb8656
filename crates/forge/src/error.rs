use thiserror::Error;

/// All errors the tokenizer, block resolver, and evaluator can produce.
///
/// Any error aborts the current evaluation. The REPL prints the error and
/// leaves the operand stack intact; file evaluation exits non-zero.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Lex error: {0}")]
    Lex(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// End of input while a block is still open. Split out from [`Parse`]
    /// so the REPL can keep reading continuation lines.
    ///
    /// [`Parse`]: Error::Parse
    #[error("Parse error: unexpected end of input inside `{open}` block")]
    UnexpectedEof { open: &'static str },

    #[error("Stack underflow: `{word}` needs {needed} value(s), stack has {depth}")]
    StackUnderflow {
        word: String,
        needed: usize,
        depth: usize,
    },

    #[error("Type error: expected {expected}, got {got}")]
    Type { expected: String, got: String },

    #[error("Name error: '{0}' is not bound")]
    Name(String),

    #[error("Name error: unknown word '{0}'")]
    UnknownWord(String),

    #[error("Arithmetic error: division by zero")]
    DivisionByZero,

    #[error("Index error: {0}")]
    Index(String),

    #[error("Key error: '{0}'")]
    Key(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Step limit exceeded ({0} steps)")]
    StepLimitExceeded(u64),

    #[error("Recursion limit exceeded (depth {0})")]
    RecursionLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
