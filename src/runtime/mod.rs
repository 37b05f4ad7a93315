//! The runtime module implements the graph reduction machinery that generated
//! programs link against: a heap of application nodes, a machine that forces
//! nodes to weak head normal form, and the built-in arithmetic and comparison
//! combinators.
//!
//! Generated code never manipulates nodes directly. It builds graphs through
//! the heap, hands a `main` node to [`run`] and the machine does the rest:
//! find the next saturated combinator, call its implementation, overwrite the
//! application with the result, repeat.

use std::{error::Error, fmt, fmt::Display};

pub mod heap;
pub mod machine;
pub mod prims;

pub use heap::{Heap, Node, NodeRef};
pub use machine::Machine;

/// The implementation of a combinator. It receives exactly `arity` argument
/// nodes and returns the root of the graph the application reduces to.
pub type Proc = fn(&mut Machine, &[NodeRef]) -> RuntimeResult<NodeRef>;

/// A static description of a global: its source-level name, its arity and the
/// function implementing it. Generated code emits one of these per function
/// and per data constructor; the built-ins live in [`prims::DESCRIPTORS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descriptor {
    pub name: &'static str,
    pub arity: usize,
    pub proc: Proc,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors a program can run into while reducing. These terminate evaluation;
/// there is no recovery inside the reduction loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// A name was instantiated that no loaded descriptor provides.
    UnresolvedGlobal(String),
    /// An arithmetic combinator forced an argument and found something other
    /// than a number. Carries the kind of node actually found.
    NumberExpected(&'static str),
    /// Arguments were applied to a node that cannot take any, or a node shape
    /// did not support the requested operation. Carries the node kind.
    BadApply(&'static str),
    /// A case dispatch fell through every alternative.
    NoAlternative { tag: Option<u32> },
    DivisionByZero,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnresolvedGlobal(name) => {
                write!(f, "unresolved global '{}'", name)
            }
            RuntimeError::NumberExpected(kind) => {
                write!(f, "expected a number, found a {} node", kind)
            }
            RuntimeError::BadApply(kind) => {
                write!(f, "cannot apply arguments to a {} node", kind)
            }
            RuntimeError::NoAlternative { tag: Some(tag) } => {
                write!(f, "no case alternative matched constructor tag {}", tag)
            }
            RuntimeError::NoAlternative { tag: None } => {
                write!(f, "no case alternative matched")
            }
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

impl Error for RuntimeError {}

/// Load the given descriptors on top of the built-ins, evaluate `main` to weak
/// head normal form and render the result.
pub fn run(program: &[&'static Descriptor]) -> RuntimeResult<String> {
    let mut machine = Machine::new(program);
    let main = machine.instantiate_named("main")?;
    let result = machine.force(main)?;
    machine.render(result)
}
