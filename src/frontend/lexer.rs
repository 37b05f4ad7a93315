//! The lexer is responsible for tokenizing the source code so that it can be used by the
//! parser to create the program representation.
//!
//! Tokenization is line oriented because the language has no explicit statement
//! terminators in most positions: a semicolon is inferred at the end of every line
//! unless the last token on the line was itself a `;`, a binary operator that expects a
//! right-hand side (`=`, `->`), an opening alternative brace `{`, a constructor
//! separator `|`, or an unmatched `(` is still open. Comments start with `--` and run
//! to the end of the line, except that `--` immediately followed by another symbol
//! character (other than `-`) is a legal operator token instead.
//!
//! Example:
//! ```rust
//! use husk::frontend::lexer::Lexer;
//! let tokens_or_err = Lexer::new("main = f 1").tokenize();
//! ```
//! `tokenize` either returns an error or a queue containing all tokens.

use std::collections::VecDeque;

use super::token::{Token, Type};
use crate::error::HuskError::{self, SyntaxError};

/// Characters that can occur in operator runs of any length. A few of the runs are
/// reserved (`=`, `->`, `<-`); `--` starts a comment.
const SYMBOL_CHARS: &str = "!#$%&*+./<=>?@\\^|-~:";

/// Single-character tokens that never combine into longer runs.
const SINGLE_CHARS: &str = ",[]`{}";

pub struct Lexer<'a> {
    source: &'a str,
    /// Queue where all the tokens are saved.
    tokens: VecDeque<Token<'a>>,
    /// Current line, starting at 1 for the first line.
    line: u32,
    /// Open-parenthesis depth, carried across lines to suppress inferred semicolons
    /// inside a bracketed expression.
    parens: i32,
}

/// The lexer either returns a token or an error which will be propagated to
/// the user informing about an error.
type LexerResult<'a> = Result<(Token<'a>, &'a str), HuskError>;

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: VecDeque::new(),
            line: 0,
            parens: 0,
        }
    }

    /// Tokenize the source string into a queue of tokens, semicolon inference included.
    pub fn tokenize(mut self) -> Result<VecDeque<Token<'a>>, HuskError> {
        let source = self.source;
        for line in source.lines() {
            self.line += 1;
            self.scan_line(line)?;
        }
        let line = self.line.max(1);
        self.tokens.push_back(Token::new(Type::Eof, line, "EOF"));
        Ok(self.tokens)
    }

    fn scan_line(&mut self, text: &'a str) -> Result<(), HuskError> {
        let mut rest = text;
        loop {
            rest = rest.trim_start_matches(|c: char| c == ' ' || c == '\t' || c == '\r');
            if rest.is_empty() || starts_comment(rest) {
                break;
            }
            let (token, remainder) = self.next_token(rest)?;
            match token.typ {
                Type::LeftParenthese => self.parens += 1,
                Type::RightParenthese => self.parens -= 1,
                _ => {}
            }
            self.tokens.push_back(token);
            rest = remainder;
        }
        self.infer_semicolon();
        Ok(())
    }

    /// Cut the next token off the front of `rest` and return it along with the
    /// remainder of the line.
    fn next_token(&mut self, rest: &'a str) -> LexerResult<'a> {
        let c = match rest.chars().next() {
            Some(c) => c,
            None => unreachable!("next_token called on an empty line remainder"),
        };
        match c {
            '(' => self.single(rest, Type::LeftParenthese),
            ')' => self.single(rest, Type::RightParenthese),
            ';' => self.single(rest, Type::Semicolon),
            '"' => self.string(rest),
            _ if SINGLE_CHARS.contains(c) => self.single(rest, Type::Oper),
            _ if c.is_ascii_digit() => self.number(rest),
            _ if c.is_alphabetic() || c == '_' => Ok(self.identifier(rest)),
            _ if SYMBOL_CHARS.contains(c) => Ok(self.operator(rest)),
            _ => Err(SyntaxError {
                line: self.line,
                msg: format!("Unexpected character '{}'.", c),
            }),
        }
    }

    /// Infer a `;` at the end of a line where the last token does not already
    /// terminate or continue a definition.
    fn infer_semicolon(&mut self) {
        if self.parens > 0 {
            return;
        }
        let needed = match self.tokens.back() {
            None => false,
            Some(token) => match &token.typ {
                Type::Semicolon | Type::Equals | Type::ArrowTo => false,
                Type::Oper => token.lexeme != "{" && token.lexeme != "|",
                _ => true,
            },
        };
        if needed {
            self.tokens.push_back(Token::new(Type::Semicolon, self.line, ";"));
        }
    }

    //-------
    // HELPER
    //-------

    fn single(&self, rest: &'a str, typ: Type) -> LexerResult<'a> {
        let (lexeme, remainder) = split_at_char_boundary(rest, 1);
        Ok((Token::new(typ, self.line, lexeme), remainder))
    }

    //---------
    // Literals
    //---------

    /// Tokenize a number literal: a run of digits, optionally followed by `.` and
    /// another run of digits. A trailing `.` without digits is left for the next
    /// token rather than consumed.
    fn number(&self, rest: &'a str) -> LexerResult<'a> {
        let (digits, tail) = span(rest, |c| c.is_ascii_digit());
        let mut len = digits.len();
        if let Some(after_dot) = tail.strip_prefix('.') {
            let (fraction, _) = span(after_dot, |c| c.is_ascii_digit());
            if !fraction.is_empty() {
                len += 1 + fraction.len();
            }
        }
        let lexeme = &rest[..len];
        let value: f64 = lexeme.parse().map_err(|_| SyntaxError {
            line: self.line,
            msg: format!("Invalid number literal '{}'.", lexeme),
        })?;
        Ok((
            Token::new(Type::Number(value), self.line, lexeme),
            &rest[len..],
        ))
    }

    /// Tokenize a string literal. A backslash skips the following character; the
    /// content is kept raw (no de-escaping). Strings do not cross line breaks.
    fn string(&self, rest: &'a str) -> LexerResult<'a> {
        let mut skip_next = false;
        for (idx, c) in rest.char_indices().skip(1) {
            if skip_next {
                skip_next = false;
                continue;
            }
            match c {
                '\\' => skip_next = true,
                '"' => {
                    let content = rest[1..idx].to_string();
                    let end = idx + 1;
                    return Ok((
                        Token::new(Type::String(content), self.line, &rest[..end]),
                        &rest[end..],
                    ));
                }
                _ => {}
            }
        }
        Err(SyntaxError {
            line: self.line,
            msg: "Missing closing '\"'.".to_string(),
        })
    }

    //----------------------
    // Identifier & keywords
    //----------------------

    /// Scan a variable or constructor name and check it against the keyword table.
    fn identifier(&self, rest: &'a str) -> (Token<'a>, &'a str) {
        let (lexeme, remainder) = span(rest, |c| c.is_alphanumeric() || c == '_' || c == '\'');
        let typ = match Token::get_keyword(lexeme) {
            Some(keyword) => keyword,
            None if lexeme.starts_with(|c: char| c.is_uppercase()) => Type::ConId,
            None => Type::VarId,
        };
        (Token::new(typ, self.line, lexeme), remainder)
    }

    /// Scan a maximal run of symbol characters. `=`, `->` and `<-` are reserved.
    fn operator(&self, rest: &'a str) -> (Token<'a>, &'a str) {
        let (lexeme, remainder) = span(rest, |c| SYMBOL_CHARS.contains(c));
        let typ = match lexeme {
            "=" => Type::Equals,
            "->" => Type::ArrowTo,
            "<-" => Type::ArrowFrom,
            _ => Type::Oper,
        };
        (Token::new(typ, self.line, lexeme), remainder)
    }
}

/// True if the line remainder starts a comment. `--` followed by a symbol character
/// other than `-` is an operator token, not a comment; three dashes always comment.
fn starts_comment(rest: &str) -> bool {
    if !rest.starts_with("--") {
        return false;
    }
    match rest.chars().nth(2) {
        None => true,
        Some('-') => true,
        Some(c) => !SYMBOL_CHARS.contains(c),
    }
}

/// Split `rest` at the end of the longest prefix whose characters all satisfy the
/// predicate.
fn span(rest: &str, predicate: impl Fn(char) -> bool) -> (&str, &str) {
    let end = rest
        .char_indices()
        .find(|(_, c)| !predicate(*c))
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| rest.len());
    rest.split_at(end)
}

fn split_at_char_boundary(rest: &str, chars: usize) -> (&str, &str) {
    let end = rest
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| rest.len());
    rest.split_at(end)
}
