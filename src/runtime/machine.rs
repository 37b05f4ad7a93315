//! The machine drives reduction: it keeps the registry of loaded globals,
//! instantiates them into the heap and forces nodes to weak head normal form.

use std::collections::HashMap;

use super::heap::{Heap, Node, NodeRef};
use super::{Descriptor, RuntimeError, RuntimeResult};

pub struct Machine {
    pub heap: Heap,
    /// All loaded globals by source-level name: built-ins plus the program's
    /// own descriptors. Resolution happens here at instantiation time, so a
    /// name missing from the registry surfaces as an error, not earlier.
    registry: HashMap<&'static str, &'static Descriptor>,
}

impl Machine {
    /// Create a machine with the built-ins and the given program loaded.
    pub fn new(program: &[&'static Descriptor]) -> Self {
        let mut registry = HashMap::new();
        for descriptor in prims_and(program) {
            registry.insert(descriptor.name, descriptor);
        }
        Self {
            heap: Heap::new(),
            registry,
        }
    }

    pub fn lookup(&self, name: &str) -> RuntimeResult<&'static Descriptor> {
        self.registry
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UnresolvedGlobal(name.to_string()))
    }

    /// Allocate a fresh, argument-less application of a global. Every call
    /// site gets its own node, applying arguments never disturbs another.
    pub fn instantiate(&mut self, descriptor: &'static Descriptor) -> NodeRef {
        self.heap.alloc(Node::Comb {
            proc: descriptor.proc,
            arity: descriptor.arity,
            args: Vec::new(),
        })
    }

    pub fn instantiate_named(&mut self, name: &str) -> RuntimeResult<NodeRef> {
        let descriptor = self.lookup(name)?;
        Ok(self.instantiate(descriptor))
    }

    /// Reduce a node to weak head normal form: a number, a constructor, or a
    /// combinator applied to fewer arguments than its arity.
    ///
    /// Each step picks the outermost saturated combinator, calls its
    /// implementation on exactly `arity` arguments and overwrites the redex
    /// with an indirection to the result, so shared references see the reduced
    /// form and no redex runs twice. Arguments beyond the arity are re-applied
    /// to the result before the update.
    pub fn force(&mut self, node: NodeRef) -> RuntimeResult<NodeRef> {
        let mut current = self.heap.follow(node);
        loop {
            let (proc, call_args, leftover) = match self.heap.get(current) {
                Node::Num(_) | Node::Data { .. } => return Ok(current),
                Node::Comb { proc, arity, args } => {
                    if args.len() < *arity {
                        return Ok(current);
                    }
                    (*proc, args[..*arity].to_vec(), args[*arity..].to_vec())
                }
                Node::Ind(_) => unreachable!("follow returned an indirection"),
            };
            let mut result = proc(self, &call_args)?;
            result = self.heap.follow(result);
            if !leftover.is_empty() {
                result = self.heap.apply(result, &leftover)?;
            }
            self.heap.redirect(current, result);
            current = result;
        }
    }

    /// Force a node and read it as a number.
    pub fn number_of(&mut self, node: NodeRef) -> RuntimeResult<f64> {
        let node = self.force(node)?;
        match self.heap.get(node) {
            Node::Num(value) => Ok(*value),
            other => Err(RuntimeError::NumberExpected(other.kind())),
        }
    }

    /// Render a fully demanded view of a node: force it, print it, recurse
    /// into constructor fields. One line per node, fields indented by nesting
    /// through recursion order.
    pub fn render(&mut self, node: NodeRef) -> RuntimeResult<String> {
        let mut out = String::new();
        self.render_node(node, &mut out)?;
        Ok(out)
    }

    fn render_node(&mut self, node: NodeRef, out: &mut String) -> RuntimeResult<()> {
        let node = self.force(node)?;
        // Snapshot the node so rendering the fields can keep forcing the heap.
        let snapshot = self.heap.get(node).clone();
        match snapshot {
            Node::Num(value) => out.push_str(&format!("num {}\n", value)),
            Node::Data { tag, fields } => {
                out.push_str(&format!("ctor {} {}\n", tag, fields.len()));
                for field in fields {
                    self.render_node(field, out)?;
                }
            }
            Node::Comb { arity, args, .. } => {
                out.push_str(&format!("partial {}/{}\n", args.len(), arity));
            }
            Node::Ind(_) => unreachable!("force returned an indirection"),
        }
        Ok(())
    }
}

fn prims_and<'a>(
    program: &'a [&'static Descriptor],
) -> impl Iterator<Item = &'static Descriptor> + 'a {
    super::prims::DESCRIPTORS
        .iter()
        .copied()
        .chain(program.iter().copied())
}
