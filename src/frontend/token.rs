use phf::phf_map;
use std::fmt;

/// A single token together with the line it was found on and the slice of the
/// source it was cut from. Inferred semicolons carry the synthetic lexeme `";"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub typ: Type,
    pub line: u32,
    pub lexeme: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(typ: Type, line: u32, lexeme: &'a str) -> Self {
        Self { typ, line, lexeme }
    }

    pub fn get_keyword(key: &str) -> Option<Type> {
        KEYWORDS.get(key).cloned()
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:?}: {} @ line {}>", self.typ, self.lexeme, self.line)
    }
}

/// Token types. Identifiers are split into variable names (lowercase start) and
/// constructor names (uppercase start) because data constructors live in their
/// own namespace both in patterns and in generated descriptors.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    // Identifiers
    VarId,
    ConId,
    // Literals
    Number(f64),
    String(String),
    // Any run of symbol characters that is not reserved, plus the
    // single-character tokens `, [ ] ` { }`.
    Oper,
    // Keywords
    Data,
    Case,
    Of,
    // Reserved operators
    Equals,
    ArrowTo,
    ArrowFrom,

    LeftParenthese,
    RightParenthese,
    Semicolon,

    Eof,
}

static KEYWORDS: phf::Map<&'static str, Type> = phf_map! {
    "data" => Type::Data,
    "case" => Type::Case,
    "of" => Type::Of,
};
