use std::{error::Error, fmt, fmt::Display};

/// Errors raised on the compilation side of the pipeline. Runtime failures of a
/// generated program are a separate concern, see `runtime::RuntimeError`.
#[derive(Debug, Clone, PartialEq)]
pub enum HuskError {
    SyntaxError { line: u32, msg: String },
    ParseError { line: u32, msg: String },
    GenError { msg: String },
}

impl Display for HuskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HuskError::SyntaxError { line, msg } => {
                write!(f, "Syntax error on line {}: {}", line, msg)
            }
            HuskError::ParseError { line, msg } => {
                write!(f, "Parse error on line {}: {}", line, msg)
            }
            HuskError::GenError { msg } => write!(f, "Code generation error: {}", msg),
        }
    }
}

impl Error for HuskError {}
