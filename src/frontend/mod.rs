//! The frontend module contains everything that is concerned with tokenizing and parsing the input string.
//!
//! # Lexer
//! The lexer converts the source string into a queue of tokens. It works line by line
//! because the language relies on inferred semicolons: a `;` token is inserted at the
//! end of a line unless the line ends in a token that expects a continuation.
//! ### Example
//! ```rust
//! use husk::frontend::lexer::Lexer;
//! let tokens_or_err = Lexer::new("main = f 1").tokenize();
//! ```
//!
//! # Parser
//! The parser consumes the token queue and turns it into the program representation
//! defined in the ast module: a list of function and data definitions.
//! ### Example
//! ```rust
//! use husk::frontend::{lexer::Lexer, parser::Parser};
//! let tokens = Lexer::new("main = f 1").tokenize().unwrap();
//! let program = Parser::new(tokens).parse();
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;
