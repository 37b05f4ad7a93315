//! The parser turns the token queue produced by the lexer into the program
//! representation from the ast module.
//!
//! The grammar is flat by design: application is the only way expressions nest, and
//! operators are ordinary applicable atoms, so `+ a b` is an application of `+` to
//! two arguments. There is no infix parsing and no precedence table.
//!
//! ```text
//! program    -> definition* EOF
//! definition -> data | function
//! data       -> "data" ConId VarId* "=" ctor ("|" ctor)* ";"
//! ctor       -> ConId VarId*
//! function   -> VarId VarId* "=" expr ";"
//! expr       -> atom atom*
//! atom       -> Number | String | VarId | ConId | Oper | "(" expr ")" | case
//! case       -> "case" expr "of" "{" alt (";" alt)* ";"? "}"
//! alt        -> pattern "->" expr
//! pattern    -> VarId | ConId VarId*
//! ```

use std::collections::VecDeque;

use super::ast::{Alt, Constructor, DataDef, Definable, Definition, Expr, Function, Pattern, Program};
use super::token::{Token, Type};
use crate::error::HuskError::{self, ParseError};

pub struct Parser<'a> {
    tokens: VecDeque<Token<'a>>,
    /// Line of the most recently consumed token, for error reporting.
    line: u32,
}

type ParserResult<T> = Result<T, HuskError>;

impl<'a> Parser<'a> {
    pub fn new(tokens: VecDeque<Token<'a>>) -> Self {
        Self { tokens, line: 1 }
    }

    /// Parse the whole token queue into a program.
    pub fn parse(mut self) -> ParserResult<Program> {
        let mut definitions = Vec::new();
        loop {
            // Tolerate stray semicolons between definitions, e.g. from blank-ish lines.
            while self.at(&Type::Semicolon) {
                self.next();
            }
            if self.at(&Type::Eof) {
                break;
            }
            definitions.push(self.parse_definition()?);
        }
        Ok(Program { definitions })
    }

    fn parse_definition(&mut self) -> ParserResult<Definition> {
        if self.at(&Type::Data) {
            self.parse_data()
        } else {
            self.parse_function()
        }
    }

    /// `data ConId VarId* = ConId VarId* ('|' ConId VarId*)* ;`
    fn parse_data(&mut self) -> ParserResult<Definition> {
        self.next();
        let name = self.expect(Type::ConId, "a type name")?.lexeme.to_string();
        let mut params = Vec::new();
        while self.at(&Type::VarId) {
            params.push(self.next().lexeme.to_string());
        }
        self.expect(Type::Equals, "'='")?;
        let mut constructors = vec![self.parse_constructor()?];
        while self.at_oper("|") {
            self.next();
            constructors.push(self.parse_constructor()?);
        }
        self.expect(Type::Semicolon, "';'")?;
        Ok(Definition {
            name,
            definable: Definable::Data(DataDef {
                params,
                constructors,
            }),
        })
    }

    fn parse_constructor(&mut self) -> ParserResult<Constructor> {
        let name = self
            .expect(Type::ConId, "a constructor name")?
            .lexeme
            .to_string();
        let mut fields = Vec::new();
        while self.at(&Type::VarId) {
            fields.push(self.next().lexeme.to_string());
        }
        Ok(Constructor { name, fields })
    }

    /// `VarId VarId* = expr ;`
    fn parse_function(&mut self) -> ParserResult<Definition> {
        let name = self
            .expect(Type::VarId, "a function name")?
            .lexeme
            .to_string();
        let mut params = Vec::new();
        while self.at(&Type::VarId) {
            params.push(self.next().lexeme.to_string());
        }
        self.expect(Type::Equals, "'='")?;
        let body = self.parse_expr()?;
        self.expect(Type::Semicolon, "';'")?;
        Ok(Definition {
            name,
            definable: Definable::Function(Function { params, body }),
        })
    }

    /// An expression is an atom applied to zero or more argument atoms.
    fn parse_expr(&mut self) -> ParserResult<Expr> {
        let func = self.parse_atom()?;
        let mut args = Vec::new();
        while !self.at_expr_end() {
            args.push(self.parse_atom()?);
        }
        if args.is_empty() {
            Ok(func)
        } else {
            Ok(Expr::Apply {
                func: Box::new(func),
                args,
            })
        }
    }

    /// True at any token that cannot start another application argument.
    fn at_expr_end(&self) -> bool {
        match self.peek() {
            Type::Semicolon | Type::RightParenthese | Type::Of | Type::Eof => true,
            Type::Oper => {
                let lexeme = self.tokens.front().map(|token| token.lexeme);
                lexeme == Some("}") || lexeme == Some("|")
            }
            _ => false,
        }
    }

    fn parse_atom(&mut self) -> ParserResult<Expr> {
        match self.peek() {
            Type::Number(_) => {
                let token = self.next();
                match token.typ {
                    Type::Number(value) => Ok(Expr::Num(value)),
                    _ => unreachable!(),
                }
            }
            Type::String(_) => {
                let token = self.next();
                match token.typ {
                    Type::String(content) => Ok(Expr::Str(content)),
                    _ => unreachable!(),
                }
            }
            Type::VarId | Type::ConId => Ok(Expr::Var(self.next().lexeme.to_string())),
            Type::Oper => Ok(Expr::Op(self.next().lexeme.to_string())),
            Type::LeftParenthese => {
                self.next();
                let inner = self.parse_expr()?;
                self.expect(Type::RightParenthese, "')'")?;
                Ok(inner)
            }
            Type::Case => self.parse_case(),
            _ => {
                let token = self.next();
                Err(ParseError {
                    line: token.line,
                    msg: format!("Expected an expression, found '{}'.", token.lexeme),
                })
            }
        }
    }

    /// `case expr of { alt (; alt)* ;? }`
    fn parse_case(&mut self) -> ParserResult<Expr> {
        self.next();
        let scrutinee = self.parse_expr()?;
        self.expect(Type::Of, "'of'")?;
        self.expect_oper("{")?;
        let mut alts = vec![self.parse_alt()?];
        while self.at(&Type::Semicolon) {
            self.next();
            if self.at_oper("}") {
                break;
            }
            alts.push(self.parse_alt()?);
        }
        self.expect_oper("}")?;
        Ok(Expr::Case {
            scrutinee: Box::new(scrutinee),
            alts,
        })
    }

    fn parse_alt(&mut self) -> ParserResult<Alt> {
        let pattern = self.parse_pattern()?;
        self.expect(Type::ArrowTo, "'->'")?;
        let body = self.parse_expr()?;
        Ok(Alt { pattern, body })
    }

    fn parse_pattern(&mut self) -> ParserResult<Pattern> {
        match self.peek() {
            Type::VarId => Ok(Pattern::Var(self.next().lexeme.to_string())),
            Type::ConId => {
                let name = self.next().lexeme.to_string();
                let mut binds = Vec::new();
                while self.at(&Type::VarId) {
                    binds.push(self.next().lexeme.to_string());
                }
                Ok(Pattern::Ctor { name, binds })
            }
            _ => {
                let token = self.next();
                Err(ParseError {
                    line: token.line,
                    msg: format!("Expected a pattern, found '{}'.", token.lexeme),
                })
            }
        }
    }

    //-------
    // HELPER
    //-------

    fn peek(&self) -> &Type {
        self.tokens
            .front()
            .map(|token| &token.typ)
            .unwrap_or(&Type::Eof)
    }

    fn at(&self, typ: &Type) -> bool {
        self.peek() == typ
    }

    fn at_oper(&self, lexeme: &str) -> bool {
        match self.tokens.front() {
            Some(token) => token.typ == Type::Oper && token.lexeme == lexeme,
            None => false,
        }
    }

    /// Consume the next token. The queue always ends in Eof; calling past it keeps
    /// returning a synthetic Eof.
    fn next(&mut self) -> Token<'a> {
        match self.tokens.pop_front() {
            Some(token) => {
                self.line = token.line;
                token
            }
            None => Token::new(Type::Eof, self.line, "EOF"),
        }
    }

    fn expect(&mut self, typ: Type, what: &str) -> ParserResult<Token<'a>> {
        let token = self.next();
        if token.typ == typ {
            Ok(token)
        } else {
            Err(ParseError {
                line: token.line,
                msg: format!("Expected {}, found '{}'.", what, token.lexeme),
            })
        }
    }

    fn expect_oper(&mut self, lexeme: &str) -> ParserResult<Token<'a>> {
        let token = self.next();
        if token.typ == Type::Oper && token.lexeme == lexeme {
            Ok(token)
        } else {
            Err(ParseError {
                line: token.line,
                msg: format!("Expected '{}', found '{}'.", lexeme, token.lexeme),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn parse(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_err(src: &str) -> HuskError {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap_err()
    }

    #[test]
    fn test_function_definition() {
        let program = parse("plus a b = + a b");
        assert_eq!(program.definitions.len(), 1);
        assert_eq!(
            format!("{}", program.definitions[0]),
            "plus a b = [+ a b]"
        );
    }

    #[test]
    fn test_constant_definition() {
        let program = parse("main = plus 1 2");
        assert_eq!(format!("{}", program.definitions[0]), "main = [plus 1 2]");
    }

    #[test]
    fn test_nested_application() {
        let program = parse("main = f (g 1) 2");
        assert_eq!(
            format!("{}", program.definitions[0]),
            "main = [f [g 1] 2]"
        );
    }

    #[test]
    fn test_data_definition() {
        let program = parse("data List a = Cons h t | Nil");
        assert_eq!(
            format!("{}", program.definitions[0]),
            "data List a = Cons h t | Nil"
        );
        match &program.definitions[0].definable {
            Definable::Data(data) => {
                assert_eq!(data.constructors.len(), 2);
                assert_eq!(data.constructors[0].fields, vec!["h", "t"]);
                assert!(data.constructors[1].fields.is_empty());
            }
            _ => panic!("expected a data definition"),
        }
    }

    #[test]
    fn test_data_definition_multiline() {
        let program = parse("data List a =\n    Cons h t |\n    Nil");
        assert_eq!(program.definitions.len(), 1);
    }

    #[test]
    fn test_case_expression() {
        let program = parse("head xs = case xs of { Cons h t -> h; Nil -> bad }");
        assert_eq!(
            format!("{}", program.definitions[0]),
            "head xs = case xs of { Cons h t -> h; Nil -> bad }"
        );
    }

    #[test]
    fn test_case_with_default() {
        let program = parse("f x = case x of { Cons h t -> h; other -> other }");
        match &program.definitions[0].definable {
            Definable::Function(function) => match &function.body {
                Expr::Case { alts, .. } => {
                    assert_eq!(alts[1].pattern, Pattern::Var("other".to_string()));
                }
                _ => panic!("expected a case expression"),
            },
            _ => panic!("expected a function definition"),
        }
    }

    #[test]
    fn test_case_multiline() {
        // Alternatives separated by inferred semicolons.
        let program = parse("f x = case x of {\n    Cons h t -> h\n    Nil -> z\n}");
        match &program.definitions[0].definable {
            Definable::Function(function) => match &function.body {
                Expr::Case { alts, .. } => assert_eq!(alts.len(), 2),
                _ => panic!("expected a case expression"),
            },
            _ => panic!("expected a function definition"),
        }
    }

    #[test]
    fn test_operator_as_argument() {
        let program = parse("main = fold + 0 xs");
        assert_eq!(
            format!("{}", program.definitions[0]),
            "main = [fold + 0 xs]"
        );
    }

    #[test]
    fn test_errors() {
        // No semicolon is inferred after a trailing `=`, so the parser runs into EOF.
        assert_eq!(
            parse_err("f x ="),
            ParseError {
                line: 1,
                msg: "Expected an expression, found 'EOF'.".to_string()
            }
        );
        assert_eq!(
            parse_err("f x y"),
            ParseError {
                line: 1,
                msg: "Expected '=', found ';'.".to_string()
            }
        );
        assert_eq!(
            parse_err("data list = Cons h t"),
            ParseError {
                line: 1,
                msg: "Expected a type name, found 'list'.".to_string()
            }
        );
        assert_eq!(
            parse_err("f x = case x of { 1 -> x }"),
            ParseError {
                line: 1,
                msg: "Expected a pattern, found '1'.".to_string()
            }
        );
    }
}
