//! Name resolution during code generation. Every identifier in a function body
//! resolves to one of three things: a local slot bound by a case pattern, a
//! parameter of the enclosing function, or a global.

use std::collections::HashMap;

/// Where a name points inside one generated function body.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// The n-th parameter of the enclosing function.
    Argument(usize),
    /// A local binding slot introduced by a case pattern.
    Slot(usize),
    /// Anything else: resolved at runtime through the registry, or at compile
    /// time of the generated code if the mangled name does not exist.
    Global(String),
}

/// The scope of one generated function body. Cheap to clone, which is how case
/// alternatives get their own scope without unbinding anything.
#[derive(Debug, Clone)]
pub struct Environment<'a> {
    params: &'a [String],
    locals: HashMap<String, usize>,
}

impl<'a> Environment<'a> {
    pub fn new(params: &'a [String]) -> Self {
        Self {
            params,
            locals: HashMap::new(),
        }
    }

    /// Bind a name to a slot. Shadows a parameter or an earlier binding of the
    /// same name.
    pub fn bind_slot(&mut self, name: &str, slot: usize) {
        self.locals.insert(name.to_string(), slot);
    }

    /// Innermost binding wins: case-bound locals first, then parameters, and
    /// everything unbound is a global.
    pub fn lookup(&self, name: &str) -> Binding {
        if let Some(slot) = self.locals.get(name) {
            return Binding::Slot(*slot);
        }
        if let Some(index) = self.params.iter().position(|param| param == name) {
            return Binding::Argument(index);
        }
        Binding::Global(mangle(name))
    }
}

/// Map a source-level name to a Rust identifier fragment: alphanumerics and
/// underscores pass through, any other character becomes its lowercase hex
/// ordinal, so `+` is `2b` and `>=` is `3e3d`.
pub fn mangle(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len());
    for c in identifier.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push_str(&format!("{:x}", c as u32));
        }
    }
    out
}
