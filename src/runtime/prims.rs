//! Built-in combinators available to every program: arithmetic on numbers and
//! comparisons producing `True`/`False` constructor nodes.
//!
//! The built-ins are registered under their source-level operator names; the
//! descriptor statics carry the same hex-mangled names generated code uses for
//! its own globals, so `SC_2B` is `+`.
//!
//! Comparisons resolve `True` and `False` through the registry at reduction
//! time. A program that compares without declaring a matching data type fails
//! with an unresolved global, the same way an undefined function does.

use super::heap::NodeRef;
use super::machine::Machine;
use super::{Descriptor, RuntimeError, RuntimeResult};

pub static SC_2B: Descriptor = Descriptor {
    name: "+",
    arity: 2,
    proc: prim_add,
};

pub static SC_2D: Descriptor = Descriptor {
    name: "-",
    arity: 2,
    proc: prim_sub,
};

pub static SC_2A: Descriptor = Descriptor {
    name: "*",
    arity: 2,
    proc: prim_mul,
};

pub static SC_2F: Descriptor = Descriptor {
    name: "/",
    arity: 2,
    proc: prim_div,
};

pub static SC_25: Descriptor = Descriptor {
    name: "%",
    arity: 2,
    proc: prim_rem,
};

pub static SC_3E: Descriptor = Descriptor {
    name: ">",
    arity: 2,
    proc: prim_gt,
};

pub static SC_3C: Descriptor = Descriptor {
    name: "<",
    arity: 2,
    proc: prim_lt,
};

pub static SC_3E3D: Descriptor = Descriptor {
    name: ">=",
    arity: 2,
    proc: prim_ge,
};

pub static SC_3C3D: Descriptor = Descriptor {
    name: "<=",
    arity: 2,
    proc: prim_le,
};

pub static SC_3D3D: Descriptor = Descriptor {
    name: "==",
    arity: 2,
    proc: prim_eq,
};

pub static DESCRIPTORS: &[&Descriptor] = &[
    &SC_2B, &SC_2D, &SC_2A, &SC_2F, &SC_25, &SC_3E, &SC_3C, &SC_3E3D, &SC_3C3D, &SC_3D3D,
];

fn prim_add(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    Ok(m.heap.number(a + b))
}

fn prim_sub(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    Ok(m.heap.number(a - b))
}

fn prim_mul(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    Ok(m.heap.number(a * b))
}

/// Integer division: both operands are truncated before dividing.
fn prim_div(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])? as i64;
    let b = m.number_of(args[1])? as i64;
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(m.heap.number((a / b) as f64))
}

fn prim_rem(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])? as i64;
    let b = m.number_of(args[1])? as i64;
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    Ok(m.heap.number((a % b) as f64))
}

fn prim_gt(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    boolean(m, a > b)
}

fn prim_lt(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    boolean(m, a < b)
}

fn prim_ge(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    boolean(m, a >= b)
}

fn prim_le(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    boolean(m, a <= b)
}

fn prim_eq(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
    let a = m.number_of(args[0])?;
    let b = m.number_of(args[1])?;
    boolean(m, a == b)
}

fn boolean(m: &mut Machine, value: bool) -> RuntimeResult<NodeRef> {
    let name = if value { "True" } else { "False" };
    m.instantiate_named(name)
}

/// Build a string literal as a list of character codes: a right-nested chain
/// of `Cons` applications ending in `Nil`. The program must declare both
/// constructors to use string literals.
pub fn string(m: &mut Machine, text: &str) -> RuntimeResult<NodeRef> {
    let mut list = m.instantiate_named("Nil")?;
    for c in text.chars().rev() {
        let code = m.heap.number(c as u32 as f64);
        let cons = m.instantiate_named("Cons")?;
        list = m.heap.apply(cons, &[code, list])?;
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::heap::Node;

    fn ctor_true(m: &mut Machine, _: &[NodeRef]) -> RuntimeResult<NodeRef> {
        Ok(m.heap.data(0, &[]))
    }

    fn ctor_false(m: &mut Machine, _: &[NodeRef]) -> RuntimeResult<NodeRef> {
        Ok(m.heap.data(1, &[]))
    }

    fn ctor_cons(m: &mut Machine, args: &[NodeRef]) -> RuntimeResult<NodeRef> {
        Ok(m.heap.data(2, &[args[0], args[1]]))
    }

    fn ctor_nil(m: &mut Machine, _: &[NodeRef]) -> RuntimeResult<NodeRef> {
        Ok(m.heap.data(3, &[]))
    }

    static SC_TRUE: Descriptor = Descriptor {
        name: "True",
        arity: 0,
        proc: ctor_true,
    };
    static SC_FALSE: Descriptor = Descriptor {
        name: "False",
        arity: 0,
        proc: ctor_false,
    };
    static SC_CONS: Descriptor = Descriptor {
        name: "Cons",
        arity: 2,
        proc: ctor_cons,
    };
    static SC_NIL: Descriptor = Descriptor {
        name: "Nil",
        arity: 0,
        proc: ctor_nil,
    };

    static PROGRAM: &[&Descriptor] = &[&SC_TRUE, &SC_FALSE, &SC_CONS, &SC_NIL];

    fn reduce(machine: &mut Machine, name: &str, a: f64, b: f64) -> RuntimeResult<NodeRef> {
        let comb = machine.instantiate_named(name)?;
        let a = machine.heap.number(a);
        let b = machine.heap.number(b);
        let app = machine.heap.apply(comb, &[a, b])?;
        machine.force(app)
    }

    fn number(machine: &mut Machine, name: &str, a: f64, b: f64) -> RuntimeResult<f64> {
        let result = reduce(machine, name, a, b)?;
        machine.number_of(result)
    }

    #[test]
    fn test_arithmetic() {
        let mut machine = Machine::new(PROGRAM);
        assert_eq!(number(&mut machine, "+", 2.0, 3.0), Ok(5.0));
        assert_eq!(number(&mut machine, "-", 2.0, 3.0), Ok(-1.0));
        assert_eq!(number(&mut machine, "*", 2.5, 4.0), Ok(10.0));
    }

    #[test]
    fn test_division_truncates() {
        let mut machine = Machine::new(PROGRAM);
        assert_eq!(number(&mut machine, "/", 7.0, 2.0), Ok(3.0));
        assert_eq!(number(&mut machine, "/", -7.0, 2.0), Ok(-3.0));
        assert_eq!(number(&mut machine, "%", 7.0, 2.0), Ok(1.0));
        assert_eq!(number(&mut machine, "%", 7.9, 2.0), Ok(1.0));
    }

    #[test]
    fn test_division_by_zero() {
        let mut machine = Machine::new(PROGRAM);
        assert_eq!(
            number(&mut machine, "/", 1.0, 0.0),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            number(&mut machine, "%", 1.0, 0.5),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_comparisons() {
        let mut machine = Machine::new(PROGRAM);
        let cases = [
            (">", 2.0, 1.0, 0),
            (">", 1.0, 2.0, 1),
            ("<", 1.0, 2.0, 0),
            (">=", 2.0, 2.0, 0),
            ("<=", 3.0, 2.0, 1),
            ("==", 2.0, 2.0, 0),
            ("==", 2.0, 3.0, 1),
        ];
        for (name, a, b, tag) in cases.iter() {
            let result = reduce(&mut machine, name, *a, *b).unwrap();
            assert_eq!(machine.heap.tag(result), Some(*tag), "{} {} {}", a, name, b);
        }
    }

    #[test]
    fn test_comparison_without_booleans() {
        // Without True/False descriptors a comparison cannot build its result.
        let mut machine = Machine::new(&[]);
        assert_eq!(
            number(&mut machine, ">", 2.0, 1.0),
            Err(RuntimeError::UnresolvedGlobal("True".to_string()))
        );
    }

    #[test]
    fn test_string_builds_list() {
        let mut machine = Machine::new(PROGRAM);
        let list = string(&mut machine, "hi").unwrap();
        assert_eq!(
            machine.render(list).unwrap(),
            "ctor 2 2\nnum 104\nctor 2 2\nnum 105\nctor 3 0\n"
        );
    }

    #[test]
    fn test_string_empty() {
        let mut machine = Machine::new(PROGRAM);
        let list = string(&mut machine, "").unwrap();
        let forced = machine.force(list).unwrap();
        assert!(matches!(
            machine.heap.get(forced),
            Node::Data { tag: 3, .. }
        ));
    }
}
