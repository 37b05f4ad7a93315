//! Definitions of the program representation produced by the parser: a list of
//! named definitions, each either a function or a data declaration.

use std::fmt;

/// A whole compilation unit in declaration order. Order matters for constructor
/// tag assignment, not for name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub definitions: Vec<Definition>,
}

/// A top-level definition binds a name to a function body or a data declaration.
/// Data declarations are stored under the name of the declared type; their
/// constructors each become a global of their own during code generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub definable: Definable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definable {
    Function(Function),
    Data(DataDef),
}

/// A function definition: zero or more parameters and a body expression. A
/// zero-parameter function is a constant applicable form.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub params: Vec<String>,
    pub body: Expr,
}

/// A data declaration: `data T a b = C x y | D ;`. The type parameters are kept
/// for documentation only, the runtime is untyped.
#[derive(Debug, Clone, PartialEq)]
pub struct DataDef {
    pub params: Vec<String>,
    pub constructors: Vec<Constructor>,
}

/// A single constructor with its field names. The field count is the
/// constructor's arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Str(String),
    /// A variable or constructor reference, resolved during code generation.
    Var(String),
    /// An operator in applicable position, e.g. the `+` in `+ a b`.
    Op(String),
    Apply {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Case {
        scrutinee: Box<Expr>,
        alts: Vec<Alt>,
    },
}

/// One alternative of a case expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Alt {
    pub pattern: Pattern,
    pub body: Expr,
}

/// Patterns are flat: either a constructor applied to variable binders, or a
/// single variable (which matches anything and binds the scrutinee).
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Var(String),
    Ctor { name: String, binds: Vec<String> },
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for definition in &self.definitions {
            writeln!(f, "{}", definition)?;
        }
        Ok(())
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.definable {
            Definable::Function(function) => {
                write!(f, "{}", self.name)?;
                for param in &function.params {
                    write!(f, " {}", param)?;
                }
                write!(f, " = {}", function.body)
            }
            Definable::Data(data) => {
                write!(f, "data {}", self.name)?;
                for param in &data.params {
                    write!(f, " {}", param)?;
                }
                write!(f, " =")?;
                for (idx, constructor) in data.constructors.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " |")?;
                    }
                    write!(f, " {}", constructor.name)?;
                    for field in &constructor.fields {
                        write!(f, " {}", field)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(value) => write!(f, "{}", value),
            Expr::Str(content) => write!(f, "\"{}\"", content),
            Expr::Var(name) | Expr::Op(name) => write!(f, "{}", name),
            Expr::Apply { func, args } => {
                write!(f, "[{}", func)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, "]")
            }
            Expr::Case { scrutinee, alts } => {
                write!(f, "case {} of {{", scrutinee)?;
                for (idx, alt) in alts.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, " {} -> {}", alt.pattern, alt.body)?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Var(name) => write!(f, "{}", name),
            Pattern::Ctor { name, binds } => {
                write!(f, "{}", name)?;
                for bind in binds {
                    write!(f, " {}", bind)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_apply() {
        let expr = Expr::Apply {
            func: Box::new(Expr::Op("+".to_string())),
            args: vec![
                Expr::Var("a".to_string()),
                Expr::Apply {
                    func: Box::new(Expr::Var("f".to_string())),
                    args: vec![Expr::Num(1.0)],
                },
            ],
        };
        assert_eq!(format!("{}", expr), "[+ a [f 1]]");
    }

    #[test]
    fn test_display_case() {
        let expr = Expr::Case {
            scrutinee: Box::new(Expr::Var("xs".to_string())),
            alts: vec![
                Alt {
                    pattern: Pattern::Ctor {
                        name: "Cons".to_string(),
                        binds: vec!["h".to_string(), "t".to_string()],
                    },
                    body: Expr::Var("h".to_string()),
                },
                Alt {
                    pattern: Pattern::Var("other".to_string()),
                    body: Expr::Num(0.0),
                },
            ],
        };
        assert_eq!(
            format!("{}", expr),
            "case xs of { Cons h t -> h; other -> 0 }"
        );
    }
}
