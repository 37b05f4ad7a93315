//! Generation of Rust source from a parsed program.
//!
//! Every global becomes a `Descriptor` static plus a function with the uniform
//! combinator signature. Function bodies build their graph through numbered
//! binding slots `e0, e1, ...`; the slot counter only ever counts up within one
//! body, so every `let` gets a fresh name even across case alternatives.
//!
//! Output happens in three passes over the definitions: constructor tag
//! constants first, then all descriptor statics and the `PROGRAM` list, then
//! the function bodies. Since Rust resolves items in any order this is all the
//! forward declaration the output needs; a reference to an unknown global
//! simply names a static that no pass emitted, and rustc rejects the generated
//! file the way a linker would.

use super::env::{mangle, Binding, Environment};
use crate::error::HuskError::{self, GenError};
use crate::frontend::ast::{Alt, Definable, Definition, Expr, Pattern, Program};

/// Generate the Rust source of a complete program, entry point included.
pub fn generate(program: &Program) -> Result<String, HuskError> {
    CodeGenerator::new().generate(program)
}

struct CodeGenerator {
    out: String,
}

impl CodeGenerator {
    fn new() -> Self {
        Self { out: String::new() }
    }

    /// A line at item level.
    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// A line inside a function body. Bodies are flat, one indent level.
    fn line(&mut self, text: &str) {
        self.out.push_str("    ");
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn generate(mut self, program: &Program) -> Result<String, HuskError> {
        self.raw("//! Generated by husk. Do not edit.");
        self.raw("#![allow(unused_variables, unused_imports, non_snake_case)]");
        self.raw("");
        self.raw("use husk::runtime::prims::{self, *};");
        self.raw("use husk::runtime::{Descriptor, Machine, NodeRef, RuntimeError, RuntimeResult};");
        self.raw("");

        self.emit_tags(program);
        self.emit_descriptors(program);
        for definition in &program.definitions {
            self.emit_definition(definition)?;
        }
        self.emit_entry();
        Ok(self.out)
    }

    /// Pass 1: one tag constant per constructor, numbered in declaration order
    /// across the whole program.
    fn emit_tags(&mut self, program: &Program) {
        let mut tag = 0u32;
        let mut any = false;
        for definition in &program.definitions {
            if let Definable::Data(data) = &definition.definable {
                for constructor in &data.constructors {
                    self.raw(&format!(
                        "pub const TAG_{}: u32 = {};",
                        mangle(&constructor.name).to_uppercase(),
                        tag
                    ));
                    tag += 1;
                    any = true;
                }
            }
        }
        if any {
            self.raw("");
        }
    }

    /// Pass 2: the descriptor statics and the program list handed to the
    /// runtime.
    fn emit_descriptors(&mut self, program: &Program) {
        let mut listed = Vec::new();
        for definition in &program.definitions {
            match &definition.definable {
                Definable::Function(function) => {
                    let mangled = mangle(&definition.name);
                    self.raw(&format!(
                        "pub static SC_{}: Descriptor = Descriptor {{ name: {:?}, arity: {}, proc: fun_{} }};",
                        mangled.to_uppercase(),
                        definition.name,
                        function.params.len(),
                        mangled
                    ));
                    listed.push(mangled.to_uppercase());
                }
                Definable::Data(data) => {
                    for constructor in &data.constructors {
                        let mangled = mangle(&constructor.name);
                        self.raw(&format!(
                            "pub static SC_{}: Descriptor = Descriptor {{ name: {:?}, arity: {}, proc: ctor_{} }};",
                            mangled.to_uppercase(),
                            constructor.name,
                            constructor.fields.len(),
                            mangled
                        ));
                        listed.push(mangled.to_uppercase());
                    }
                }
            }
        }
        let entries: Vec<String> = listed
            .iter()
            .map(|mangled| format!("&SC_{}", mangled))
            .collect();
        self.raw(&format!(
            "pub static PROGRAM: &[&Descriptor] = &[{}];",
            entries.join(", ")
        ));
        self.raw("");
    }

    /// Pass 3: the function bodies.
    fn emit_definition(&mut self, definition: &Definition) -> Result<(), HuskError> {
        match &definition.definable {
            Definable::Function(function) => {
                let mut header = format!(
                    "fn fun_{}(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {{",
                    mangle(&definition.name)
                );
                if !function.params.is_empty() {
                    header.push_str(&format!(" // {}", function.params.join(" ")));
                }
                self.raw(&header);
                for (index, param) in function.params.iter().enumerate() {
                    self.line(&format!("let e{} = args[{}]; // {}", index, index, param));
                }
                let env = Environment::new(&function.params);
                let mut next_slot = function.params.len();
                let result = self.emit_expr(&function.body, &env, &mut next_slot)?;
                self.line(&format!("Ok(e{})", result));
                self.raw("}");
                self.raw("");
            }
            Definable::Data(data) => {
                for constructor in &data.constructors {
                    let mut header = format!(
                        "fn ctor_{}(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {{",
                        mangle(&constructor.name)
                    );
                    if !constructor.fields.is_empty() {
                        header.push_str(&format!(" // {}", constructor.fields.join(" ")));
                    }
                    self.raw(&header);
                    let fields: Vec<String> = (0..constructor.fields.len())
                        .map(|index| format!("args[{}]", index))
                        .collect();
                    self.line(&format!(
                        "Ok(m.heap.data(TAG_{}, &[{}]))",
                        mangle(&constructor.name).to_uppercase(),
                        fields.join(", ")
                    ));
                    self.raw("}");
                    self.raw("");
                }
            }
        }
        Ok(())
    }

    /// Emit the graph-building code of one expression and return the slot
    /// holding its root.
    fn emit_expr(
        &mut self,
        expr: &Expr,
        env: &Environment,
        next_slot: &mut usize,
    ) -> Result<usize, HuskError> {
        match expr {
            Expr::Num(value) => {
                let slot = fresh(next_slot);
                self.line(&format!("let e{} = m.heap.number({:?});", slot, value));
                Ok(slot)
            }
            Expr::Str(content) => {
                let slot = fresh(next_slot);
                self.line(&format!("let e{} = prims::string(m, {:?})?;", slot, content));
                Ok(slot)
            }
            Expr::Var(name) | Expr::Op(name) => match env.lookup(name) {
                Binding::Slot(slot) => Ok(slot),
                Binding::Argument(index) => Ok(index),
                Binding::Global(mangled) => {
                    let slot = fresh(next_slot);
                    self.line(&format!(
                        "let e{} = m.instantiate(&SC_{}); // {}",
                        slot,
                        mangled.to_uppercase(),
                        name
                    ));
                    Ok(slot)
                }
            },
            Expr::Apply { func, args } => {
                let mut arg_slots = Vec::with_capacity(args.len());
                for arg in args {
                    arg_slots.push(self.emit_expr(arg, env, next_slot)?);
                }
                let func_slot = self.emit_expr(func, env, next_slot)?;
                let slot = fresh(next_slot);
                let list: Vec<String> = arg_slots
                    .iter()
                    .map(|arg| format!("e{}", arg))
                    .collect();
                self.line(&format!(
                    "let e{} = m.heap.apply(e{}, &[{}])?;",
                    slot,
                    func_slot,
                    list.join(", ")
                ));
                Ok(slot)
            }
            Expr::Case { scrutinee, alts } => self.emit_case(scrutinee, alts, env, next_slot),
        }
    }

    /// A case forces its scrutinee and dispatches on the constructor tag with
    /// an if-chain. The result lands in a deferred slot assigned by every
    /// branch; a chain without a default falls through to a runtime error.
    fn emit_case(
        &mut self,
        scrutinee: &Expr,
        alts: &[Alt],
        env: &Environment,
        next_slot: &mut usize,
    ) -> Result<usize, HuskError> {
        let scrut = self.emit_expr(scrutinee, env, next_slot)?;
        self.line(&format!("let e{} = m.force(e{})?;", scrut, scrut));
        let result = fresh(next_slot);
        self.line(&format!("let e{};", result));

        let mut chain_open = false;
        let mut have_default = false;
        for alt in alts {
            if have_default {
                return Err(GenError {
                    msg: "a default case alternative must be the last one".to_string(),
                });
            }
            match &alt.pattern {
                Pattern::Ctor { name, binds } => {
                    let check = format!(
                        "if m.heap.tag(e{}) == Some(TAG_{}) {{",
                        scrut,
                        mangle(name).to_uppercase()
                    );
                    if chain_open {
                        self.line("}");
                        self.line(&format!("else {}", check));
                    } else {
                        self.line(&check);
                        chain_open = true;
                    }
                    let mut branch_env = env.clone();
                    for (index, bind) in binds.iter().enumerate() {
                        let slot = fresh(next_slot);
                        self.line(&format!(
                            "let e{} = m.heap.field(e{}, {}); // {}",
                            slot, scrut, index, bind
                        ));
                        branch_env.bind_slot(bind, slot);
                    }
                    let body = self.emit_expr(&alt.body, &branch_env, next_slot)?;
                    self.line(&format!("e{} = e{};", result, body));
                }
                Pattern::Var(name) => {
                    have_default = true;
                    if chain_open {
                        self.line("}");
                        self.line("else {");
                    }
                    let mut branch_env = env.clone();
                    if name != "_" {
                        let slot = fresh(next_slot);
                        self.line(&format!("let e{} = e{}; // {}", slot, scrut, name));
                        branch_env.bind_slot(name, slot);
                    }
                    let body = self.emit_expr(&alt.body, &branch_env, next_slot)?;
                    self.line(&format!("e{} = e{};", result, body));
                    if chain_open {
                        self.line("}");
                        chain_open = false;
                    }
                }
            }
        }
        if chain_open {
            self.line("}");
            self.line("else {");
            self.line(&format!(
                "return Err(RuntimeError::NoAlternative {{ tag: m.heap.tag(e{}) }});",
                scrut
            ));
            self.line("}");
        }
        Ok(result)
    }

    fn emit_entry(&mut self) {
        self.raw("fn main() {");
        self.raw("    match husk::runtime::run(PROGRAM) {");
        self.raw("        Ok(out) => print!(\"main: {}\", out),");
        self.raw("        Err(err) => {");
        self.raw("            eprintln!(\"runtime error: {}\", err);");
        self.raw("            std::process::exit(1);");
        self.raw("        }");
        self.raw("    }");
        self.raw("}");
    }
}

fn fresh(next_slot: &mut usize) -> usize {
    let slot = *next_slot;
    *next_slot += 1;
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{lexer::Lexer, parser::Parser};

    fn gen(src: &str) -> String {
        let tokens = Lexer::new(src).tokenize().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        generate(&program).unwrap()
    }

    fn gen_err(src: &str) -> HuskError {
        let tokens = Lexer::new(src).tokenize().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        generate(&program).unwrap_err()
    }

    #[test]
    fn test_function_body() {
        let out = gen("plus a b = + a b");
        let expected = "\
fn fun_plus(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> { // a b
    let e0 = args[0]; // a
    let e1 = args[1]; // b
    let e2 = m.instantiate(&SC_2B); // +
    let e3 = m.heap.apply(e2, &[e0, e1])?;
    Ok(e3)
}";
        assert!(out.contains(expected), "generated:\n{}", out);
    }

    #[test]
    fn test_descriptor_and_program_list() {
        let out = gen("plus a b = + a b\nmain = plus 1 2");
        assert!(out.contains(
            "pub static SC_PLUS: Descriptor = Descriptor { name: \"plus\", arity: 2, proc: fun_plus };"
        ));
        assert!(out.contains(
            "pub static SC_MAIN: Descriptor = Descriptor { name: \"main\", arity: 0, proc: fun_main };"
        ));
        assert!(out.contains("pub static PROGRAM: &[&Descriptor] = &[&SC_PLUS, &SC_MAIN];"));
    }

    #[test]
    fn test_statics_precede_bodies() {
        // Descriptors come before any body, so bodies can reference globals
        // defined later in the source.
        let out = gen("main = helper\nhelper = 1");
        let static_at = out.find("pub static SC_HELPER").unwrap();
        let body_at = out.find("fn fun_main").unwrap();
        assert!(static_at < body_at);
    }

    #[test]
    fn test_literals() {
        let out = gen("main = f 7 2.5");
        assert!(out.contains("let e0 = m.heap.number(7.0);"));
        assert!(out.contains("let e1 = m.heap.number(2.5);"));

        let out = gen("main = f \"hi\"");
        assert!(out.contains("let e0 = prims::string(m, \"hi\")?;"));
    }

    #[test]
    fn test_data_definition() {
        let out = gen("data List a = Cons h t | Nil");
        assert!(out.contains("pub const TAG_CONS: u32 = 0;"));
        assert!(out.contains("pub const TAG_NIL: u32 = 1;"));
        assert!(out.contains(
            "pub static SC_CONS: Descriptor = Descriptor { name: \"Cons\", arity: 2, proc: ctor_Cons };"
        ));
        assert!(out.contains("Ok(m.heap.data(TAG_CONS, &[args[0], args[1]]))"));
        assert!(out.contains("Ok(m.heap.data(TAG_NIL, &[]))"));
    }

    #[test]
    fn test_tags_count_across_declarations() {
        let out = gen("data Bool = True | False\ndata List a = Cons h t | Nil");
        assert!(out.contains("pub const TAG_TRUE: u32 = 0;"));
        assert!(out.contains("pub const TAG_FALSE: u32 = 1;"));
        assert!(out.contains("pub const TAG_CONS: u32 = 2;"));
        assert!(out.contains("pub const TAG_NIL: u32 = 3;"));
    }

    #[test]
    fn test_case_dispatch() {
        let out = gen("head xs = case xs of { Cons h t -> h }");
        let expected = "\
fn fun_head(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> { // xs
    let e0 = args[0]; // xs
    let e0 = m.force(e0)?;
    let e1;
    if m.heap.tag(e0) == Some(TAG_CONS) {
    let e2 = m.heap.field(e0, 0); // h
    let e3 = m.heap.field(e0, 1); // t
    e1 = e2;
    }
    else {
    return Err(RuntimeError::NoAlternative { tag: m.heap.tag(e0) });
    }
    Ok(e1)
}";
        assert!(out.contains(expected), "generated:\n{}", out);
    }

    #[test]
    fn test_case_with_default() {
        let out = gen("f x = case x of { Cons h t -> h; other -> other }");
        assert!(out.contains("else {"));
        assert!(out.contains("let e4 = e0; // other"));
        assert!(!out.contains("NoAlternative"));
    }

    #[test]
    fn test_case_wildcard_binds_nothing() {
        let out = gen("f x = case x of { Cons h t -> h; _ -> f x }");
        assert!(!out.contains("// _"));
    }

    #[test]
    fn test_slots_keep_counting_across_branches() {
        let out = gen("f x = case x of { A -> 1; B -> 2 }");
        // The literal in the second branch gets a fresh slot, not a reused one.
        assert!(out.contains("let e2 = m.heap.number(1.0);"));
        assert!(out.contains("let e3 = m.heap.number(2.0);"));
    }

    #[test]
    fn test_default_must_be_last() {
        assert_eq!(
            gen_err("f x = case x of { other -> other; Cons h t -> h }"),
            GenError {
                msg: "a default case alternative must be the last one".to_string()
            }
        );
    }

    #[test]
    fn test_entry_point() {
        let out = gen("main = 1");
        assert!(out.contains("match husk::runtime::run(PROGRAM)"));
        assert!(out.contains("print!(\"main: {}\", out)"));
    }
}
