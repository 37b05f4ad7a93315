pub mod backend;
pub mod error;
pub mod frontend;
pub mod runtime;
