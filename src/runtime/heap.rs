//! The heap owns every node of the program graph. Nodes refer to each other by
//! arena index, so sharing a subgraph means sharing an index and no reference
//! counting is needed. Nodes are never freed during a run.
//!
//! Only the machine's reduction step mutates a node in place, by redirecting a
//! reduced application to its result. Everything else allocates: in particular
//! [`Heap::apply`] copies the applicable node before extending it, so the
//! instantiated template of a global is never damaged by one call site.

use super::{Proc, RuntimeError, RuntimeResult};

/// Index of a node in the heap arena.
pub type NodeRef = usize;

/// A node of the program graph.
#[derive(Debug, Clone)]
pub enum Node {
    /// A (possibly partial) application of a combinator. The node is a redex
    /// once `args.len() >= arity`.
    Comb {
        proc: Proc,
        arity: usize,
        args: Vec<NodeRef>,
    },
    /// A forwarding pointer left behind by reduction. Readers follow these
    /// transparently.
    Ind(NodeRef),
    Num(f64),
    /// A saturated data constructor.
    Data { tag: u32, fields: Vec<NodeRef> },
}

impl Node {
    /// The node kind as a noun, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Comb { .. } => "combinator",
            Node::Ind(_) => "indirection",
            Node::Num(_) => "number",
            Node::Data { .. } => "constructor",
        }
    }
}

#[derive(Debug, Default)]
pub struct Heap {
    nodes: Vec<Node>,
}

impl Heap {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn alloc(&mut self, node: Node) -> NodeRef {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, node: NodeRef) -> &Node {
        &self.nodes[node]
    }

    pub fn number(&mut self, value: f64) -> NodeRef {
        self.alloc(Node::Num(value))
    }

    pub fn data(&mut self, tag: u32, fields: &[NodeRef]) -> NodeRef {
        self.alloc(Node::Data {
            tag,
            fields: fields.to_vec(),
        })
    }

    /// Chase indirections until a real node is reached.
    pub fn follow(&self, mut node: NodeRef) -> NodeRef {
        while let Node::Ind(target) = self.get(node) {
            node = *target;
        }
        node
    }

    /// Allocate a shallow copy of a node. The copy shares the children but can
    /// be extended or overwritten without touching the original.
    pub fn copy(&mut self, node: NodeRef) -> NodeRef {
        let node = self.follow(node);
        let clone = self.get(node).clone();
        self.alloc(clone)
    }

    /// Apply further arguments to an applicable node. The node is copied first
    /// so the argument of `apply` stays intact; with no extra arguments the
    /// original node is returned as is.
    pub fn apply(&mut self, node: NodeRef, extra: &[NodeRef]) -> RuntimeResult<NodeRef> {
        if extra.is_empty() {
            return Ok(node);
        }
        let copy = self.copy(node);
        match &mut self.nodes[copy] {
            Node::Comb { args, .. } => {
                args.reserve_exact(extra.len());
                args.extend_from_slice(extra);
            }
            Node::Data { fields, .. } => {
                fields.reserve_exact(extra.len());
                fields.extend_from_slice(extra);
            }
            other => return Err(RuntimeError::BadApply(other.kind())),
        }
        Ok(copy)
    }

    /// Number of arguments already applied to a combinator node, following
    /// indirections. `None` for anything else.
    pub fn applied(&self, node: NodeRef) -> Option<usize> {
        match self.get(self.follow(node)) {
            Node::Comb { args, .. } => Some(args.len()),
            _ => None,
        }
    }

    /// Constructor tag of a node, following indirections. `None` for anything
    /// that is not a constructor; the caller is expected to have forced the
    /// node first.
    pub fn tag(&self, node: NodeRef) -> Option<u32> {
        match self.get(self.follow(node)) {
            Node::Data { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    /// Fetch a constructor field. Generated code only calls this after the
    /// matching tag check, so a non-constructor here is a code generation bug.
    pub fn field(&self, node: NodeRef, index: usize) -> NodeRef {
        match self.get(self.follow(node)) {
            Node::Data { fields, .. } => fields[index],
            other => panic!("field: expected a constructor node, found a {}", other.kind()),
        }
    }

    /// Overwrite a node with an indirection to `target`. This is the update
    /// step of reduction; sharing makes it visible to every holder of `node`.
    pub(crate) fn redirect(&mut self, node: NodeRef, target: NodeRef) {
        if node != target {
            self.nodes[node] = Node::Ind(target);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
