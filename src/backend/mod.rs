//! The backend turns the parsed program into Rust source: one descriptor and
//! one function per global, linked against the runtime module.
//!
//! ### Example
//! ```rust
//! use husk::backend::codegen::generate;
//! use husk::frontend::{lexer::Lexer, parser::Parser};
//! let tokens = Lexer::new("main = + 1 2").tokenize().unwrap();
//! let program = Parser::new(tokens).parse().unwrap();
//! let rust_source = generate(&program).unwrap();
//! ```

pub mod codegen;
pub mod env;
