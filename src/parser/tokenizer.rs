// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tokenizer for program expressions
//!
//! Produces a flat vector of spanned tokens. Integer literals are unsigned
//! magnitudes; whether a `-` is a sign or the subtraction operator is decided
//! by the parser from token adjacency.

use super::error::{ParseError, ParseResult};
use super::span::{Span, Spanned};
use nom::error::ErrorKind;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, recognize, value},
    multi::many0,
    sequence::{preceded, terminated},
};
use std::fmt;

/// Expression token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'input> {
    /// Unsigned integer literal
    Integer(u64),
    /// Identifier (function name or unsubstituted formal)
    Identifier(&'input str),

    /// `if` keyword
    If,
    /// `then` keyword
    Then,
    /// `else` keyword
    Else,
    /// `and` keyword
    And,
    /// `or` keyword
    Or,
    /// `not` keyword
    Not,
    /// `where` keyword, only meaningful in a program header
    Where,

    /// Addition operator (+)
    Plus,
    /// Subtraction operator or sign (-)
    Minus,
    /// Multiplication operator (*)
    Star,
    /// Division operator (/)
    Slash,
    /// Remainder operator (%)
    Percent,

    /// Less than operator (<)
    Less,
    /// Less than or equal operator (<=)
    LessEqual,
    /// Greater than operator (>)
    Greater,
    /// Greater than or equal operator (>=)
    GreaterEqual,
    /// Equality operator (==)
    EqualEqual,
    /// Inequality operator (!=)
    NotEqual,

    /// Left parenthesis
    LeftParen,
    /// Right parenthesis
    RightParen,
    /// Argument separator
    Comma,
}

impl<'input> Token<'input> {
    /// Map a reserved word to its keyword token
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "if" => Some(Token::If),
            "then" => Some(Token::Then),
            "else" => Some(Token::Else),
            "and" => Some(Token::And),
            "or" => Some(Token::Or),
            "not" => Some(Token::Not),
            "where" => Some(Token::Where),
            _ => None,
        }
    }
}

/// Check whether a word is reserved by the expression grammar
pub fn is_keyword(word: &str) -> bool {
    Token::from_keyword(word).is_some()
}

/// Check whether a word can name a function or a formal parameter
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_keyword(word)
        }
        _ => false,
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(value) => write!(f, "{value}"),
            Token::Identifier(name) => f.write_str(name),
            Token::If => f.write_str("if"),
            Token::Then => f.write_str("then"),
            Token::Else => f.write_str("else"),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::Not => f.write_str("not"),
            Token::Where => f.write_str("where"),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::Less => f.write_str("<"),
            Token::LessEqual => f.write_str("<="),
            Token::Greater => f.write_str(">"),
            Token::GreaterEqual => f.write_str(">="),
            Token::EqualEqual => f.write_str("=="),
            Token::NotEqual => f.write_str("!="),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
        }
    }
}

/// Tokenize an expression
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned<Token<'_>>>> {
    let span = Span::new(input);
    let result = all_consuming(terminated(many0(preceded(multispace0, token)), multispace0))
        .parse(span);

    match result {
        Ok((_, tokens)) => Ok(tokens),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(refine(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedEndOfInput {
            expected: "a token".to_string(),
            position: input.len(),
        }),
    }
}

// all_consuming stops at the first byte no token rule accepts
fn refine(input: &str, error: ParseError) -> ParseError {
    match error {
        ParseError::NomError {
            position,
            kind: ErrorKind::Eof,
        } => match input.get(position..).and_then(|rest| rest.chars().next()) {
            Some(character) => ParseError::UnexpectedCharacter {
                character,
                position,
            },
            None => ParseError::UnexpectedEndOfInput {
                expected: "a token".to_string(),
                position,
            },
        },
        other => other,
    }
}

fn token(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    alt((
        token_integer,
        token_word,
        token_multi_char_op,
        token_single_char,
    ))
    .parse(input)
}

fn token_integer(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    use super::span::helpers::*;

    let start = input;
    let (input, digits) = digit1::<Span, ParseError>(input)?;

    match digits.fragment().parse::<u64>() {
        Ok(value) => Ok((input, spanned(&start, &input, Token::Integer(value)))),
        Err(_) => Err(nom::Err::Failure(ParseError::InvalidLiteral {
            value: digits.fragment().to_string(),
            position: position(&start),
        })),
    }
}

fn token_word(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    use super::span::helpers::*;

    let start = input;
    let scanned: IResult<Span, Span, ParseError> = recognize((
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input);
    let (input, word) = scanned?;

    let text: &str = *word.fragment();
    let token = Token::from_keyword(text).unwrap_or(Token::Identifier(text));

    Ok((input, spanned(&start, &input, token)))
}

fn token_multi_char_op(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    use super::span::helpers::*;

    let start = input;
    let scanned: IResult<Span, Token, ParseError> = alt((
        value(Token::LessEqual, tag("<=")),
        value(Token::GreaterEqual, tag(">=")),
        value(Token::EqualEqual, tag("==")),
        value(Token::NotEqual, tag("!=")),
    ))
    .parse(input);
    let (input, token) = scanned?;

    Ok((input, spanned(&start, &input, token)))
}

fn token_single_char(input: Span) -> IResult<Span, Spanned<Token>, ParseError> {
    use super::span::helpers::*;

    let start = input;
    let scanned: IResult<Span, Token, ParseError> = alt((
        value(Token::Plus, char('+')),
        value(Token::Minus, char('-')),
        value(Token::Star, char('*')),
        value(Token::Slash, char('/')),
        value(Token::Percent, char('%')),
        value(Token::Less, char('<')),
        value(Token::Greater, char('>')),
        value(Token::LeftParen, char('(')),
        value(Token::RightParen, char(')')),
        value(Token::Comma, char(',')),
    ))
    .parse(input);
    let (input, token) = scanned?;

    Ok((input, spanned(&start, &input, token)))
}
