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

//! Recursive-descent parser over the token stream

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::{Token, tokenize};
use crate::ast::{
    Arguments, ArithmeticOperator, BoolTerm, ComparisonOperator, Expression, LogicalOperator, Term,
};
use crate::config::{DEFAULT_MAX_NESTING_DEPTH, EvaluationStrategy};
use rustc_hash::FxHashSet;

/// Remaining stack below which a nesting level moves to a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each additional stack segment
const STACK_GROW_SIZE: usize = 2 * 1024 * 1024;

/// Grammar parameters fixed when a program is loaded
///
/// The call grammar only accepts registered function names, and the shape of
/// call arguments depends on the evaluation strategy, so both are part of the
/// parser's configuration rather than global state.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    functions: FxHashSet<String>,
    strategy: EvaluationStrategy,
    max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(EvaluationStrategy::default())
    }
}

impl ParserConfig {
    /// Create a configuration with no known functions
    pub fn new(strategy: EvaluationStrategy) -> Self {
        Self {
            functions: FxHashSet::default(),
            strategy,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Set the maximum operand nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Add the given function names
    pub fn with_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether `name` may be called
    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    /// Argument strategy used for call sites
    pub fn strategy(&self) -> EvaluationStrategy {
        self.strategy
    }

    /// Maximum operand nesting depth
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Parser for heads and function bodies of one program
#[derive(Debug, Clone, Default)]
pub struct ExpressionParser {
    config: ParserConfig,
}

impl ExpressionParser {
    /// Create a parser for the given configuration
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Get the parser configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse an integer or boolean expression
    ///
    /// The text is first read as a term; if that fails it is read as a
    /// boolean expression. When both fail the error that got further wins.
    pub fn parse(&self, input: &str) -> ParseResult<Expression> {
        let mut parser = Parser::new(input, &self.config)?;

        let term_error = match parser.complete(Parser::parse_term) {
            Ok(term) => return Ok(Expression::Term(term)),
            Err(error) => error,
        };

        parser.pos = 0;
        parser.depth = 0;
        match parser.complete(Parser::parse_condition) {
            Ok(condition) => Ok(Expression::Bool(condition)),
            Err(bool_error) if bool_error.position() > term_error.position() => Err(bool_error),
            Err(_) => Err(term_error),
        }
    }

    /// Parse an integer expression
    pub fn parse_term(&self, input: &str) -> ParseResult<Term> {
        Parser::new(input, &self.config)?.complete(Parser::parse_term)
    }

    /// Parse a boolean expression
    pub fn parse_condition(&self, input: &str) -> ParseResult<BoolTerm> {
        Parser::new(input, &self.config)?.complete(Parser::parse_condition)
    }
}

struct Parser<'a, 'c> {
    source: &'a str,
    tokens: Vec<Spanned<Token<'a>>>,
    /// Index of the matching `)` for every balanced `(`
    closing: Vec<Option<usize>>,
    pos: usize,
    depth: usize,
    config: &'c ParserConfig,
}

impl<'a, 'c> Parser<'a, 'c> {
    fn new(source: &'a str, config: &'c ParserConfig) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            closing: match_parentheses(&tokens),
            tokens,
            pos: 0,
            depth: 0,
            config,
        })
    }

    fn complete<T>(&mut self, rule: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let parsed = rule(self)?;
        if self.pos < self.tokens.len() {
            return Err(self.unexpected("end of expression"));
        }
        Ok(parsed)
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).map(|t| t.value)
    }

    fn peek_at(&self, offset: usize) -> Option<&Spanned<Token<'a>>> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, token: Token<'a>, description: &str) -> ParseResult<()> {
        if self.peek() == Some(token) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::UnexpectedToken {
                token: token.value.to_string(),
                expected: expected.to_string(),
                position: token.start,
            },
            None => ParseError::UnexpectedEndOfInput {
                expected: expected.to_string(),
                position: self.source.len(),
            },
        }
    }

    /// term := operand (arith_op operand)*
    ///
    /// All arithmetic operators share one precedence level and associate to
    /// the left; parentheses are the only grouping.
    fn parse_term(&mut self) -> ParseResult<Term> {
        let mut left = self.parse_operand()?;
        while let Some(op) = self.peek().and_then(arithmetic_operator) {
            self.bump();
            let right = self.parse_operand()?;
            left = Term::primitive(op, left, right);
        }
        Ok(left)
    }

    fn parse_operand(&mut self) -> ParseResult<Term> {
        self.descend()?;
        let operand = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.parse_operand_inner()
        });
        self.depth -= 1;
        operand
    }

    // Every nested operand passes through here or through
    // parse_bool_operand, so the depth bounds native recursion. Each level
    // also runs under stacker::maybe_grow, so the limit holds on small
    // thread stacks.
    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= self.config.max_depth {
            let position = self
                .tokens
                .get(self.pos)
                .map_or(self.source.len(), |token| token.start);
            return Err(ParseError::NestingTooDeep {
                limit: self.config.max_depth,
                position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_operand_inner(&mut self) -> ParseResult<Term> {
        match self.peek() {
            Some(Token::Integer(magnitude)) => {
                let position = self.tokens[self.pos].start;
                self.bump();
                let value = i64::try_from(magnitude).map_err(|_| ParseError::InvalidLiteral {
                    value: magnitude.to_string(),
                    position,
                })?;
                Ok(Term::constant(value))
            }
            Some(Token::Minus) => self.parse_negative_literal(),
            Some(Token::LeftParen) => {
                self.bump();
                let inner = self.parse_term()?;
                self.expect(Token::RightParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::If) => {
                self.bump();
                let condition = self.parse_condition()?;
                self.expect(Token::Then, "`then`")?;
                let then_branch = self.parse_term()?;
                self.expect(Token::Else, "`else`")?;
                let else_branch = self.parse_term()?;
                Ok(Term::if_then_else(condition, then_branch, else_branch))
            }
            Some(Token::Identifier(name)) => self.parse_call(name),
            _ => Err(self.unexpected("an integer, `(`, `if` or a function call")),
        }
    }

    // A sign is only part of a literal when the digits follow it directly.
    fn parse_negative_literal(&mut self) -> ParseResult<Term> {
        let sign = &self.tokens[self.pos];
        let digits = match self.peek_at(1) {
            Some(next) if sign.touches(next) => next,
            _ => return Err(self.unexpected("an integer, `(`, `if` or a function call")),
        };
        let Token::Integer(magnitude) = digits.value else {
            return Err(self.unexpected("an integer, `(`, `if` or a function call"));
        };

        let position = sign.start;
        let value = i64::try_from(-i128::from(magnitude)).map_err(|_| ParseError::InvalidLiteral {
            value: format!("-{magnitude}"),
            position,
        })?;
        self.pos += 2;
        Ok(Term::constant(value))
    }

    fn parse_call(&mut self, name: &'a str) -> ParseResult<Term> {
        let position = self.tokens[self.pos].start;
        match self.peek_at(1).map(|t| t.value) {
            Some(Token::LeftParen) => {}
            _ => {
                return Err(ParseError::UnboundIdentifier {
                    name: name.to_string(),
                    position,
                });
            }
        }
        if !self.config.is_function(name) {
            return Err(ParseError::UnknownFunction {
                name: name.to_string(),
                position,
            });
        }
        self.pos += 2;

        let mut values = Vec::new();
        let mut names = Vec::new();

        if self.peek() == Some(Token::RightParen) {
            self.bump();
        } else {
            loop {
                let first = self.pos;
                let argument = self.parse_term()?;
                match self.config.strategy() {
                    EvaluationStrategy::ByValue => values.push(argument),
                    EvaluationStrategy::ByName => {
                        names.push(self.argument_text(first, self.pos, &argument));
                    }
                }

                match self.peek() {
                    Some(Token::Comma) => self.bump(),
                    Some(Token::RightParen) => {
                        self.bump();
                        break;
                    }
                    _ => return Err(self.unexpected("`,` or `)` in call arguments")),
                }
            }
        }

        let arguments = match self.config.strategy() {
            EvaluationStrategy::ByValue => Arguments::Values(values),
            EvaluationStrategy::ByName => Arguments::Names(names),
        };
        Ok(Term::call(name, arguments))
    }

    /// Verbatim source of the argument tokens `first..end`, parenthesized when
    /// it is neither atomic nor already grouped so that substituting it into
    /// an operator position keeps its meaning.
    fn argument_text(&self, first: usize, end: usize, argument: &Term) -> String {
        let text = &self.source[self.tokens[first].start..self.tokens[end - 1].end];
        let grouped = self.closing[first] == Some(end - 1);
        if argument.is_atomic() || grouped {
            text.to_string()
        } else {
            format!("({text})")
        }
    }

    /// condition := bool_operand (bool_op bool_operand)*
    fn parse_condition(&mut self) -> ParseResult<BoolTerm> {
        let mut left = self.parse_bool_operand()?;
        while let Some(op) = self.peek().and_then(logical_operator) {
            self.bump();
            let right = self.parse_bool_operand()?;
            left = BoolTerm::bool_op(op, left, right);
        }
        Ok(left)
    }

    /// bool_operand := `not` bool_operand | `(` condition `)` | term comparer term
    fn parse_bool_operand(&mut self) -> ParseResult<BoolTerm> {
        self.descend()?;
        let operand = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.parse_bool_operand_inner()
        });
        self.depth -= 1;
        operand
    }

    fn parse_bool_operand_inner(&mut self) -> ParseResult<BoolTerm> {
        match self.peek() {
            Some(Token::Not) => {
                self.bump();
                Ok(BoolTerm::not(self.parse_bool_operand()?))
            }
            Some(Token::LeftParen) if self.opens_condition() => self.parse_grouped_condition(),
            _ => self.parse_comparison(),
        }
    }

    /// Whether the `(` at the cursor groups a boolean rather than a term
    ///
    /// A group followed by an arithmetic or comparison operator can only be a
    /// term; any other group in boolean position must be a condition.
    fn opens_condition(&self) -> bool {
        let Some(close) = self.closing.get(self.pos).copied().flatten() else {
            return false;
        };
        match self.tokens.get(close + 1).map(|t| t.value) {
            Some(next) => arithmetic_operator(next).is_none() && comparison_operator(next).is_none(),
            None => true,
        }
    }

    fn parse_grouped_condition(&mut self) -> ParseResult<BoolTerm> {
        self.expect(Token::LeftParen, "`(`")?;
        let inner = self.parse_condition()?;
        self.expect(Token::RightParen, "`)`")?;
        Ok(inner)
    }

    fn parse_comparison(&mut self) -> ParseResult<BoolTerm> {
        let left = self.parse_term()?;
        let op = self
            .peek()
            .and_then(comparison_operator)
            .ok_or_else(|| self.unexpected("a comparison operator"))?;
        self.bump();
        let right = self.parse_term()?;
        Ok(BoolTerm::compare(op, left, right))
    }
}

fn match_parentheses(tokens: &[Spanned<Token<'_>>]) -> Vec<Option<usize>> {
    let mut closing = vec![None; tokens.len()];
    let mut open = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        match token.value {
            Token::LeftParen => open.push(index),
            Token::RightParen => {
                if let Some(start) = open.pop() {
                    closing[start] = Some(index);
                }
            }
            _ => {}
        }
    }
    closing
}

fn arithmetic_operator(token: Token<'_>) -> Option<ArithmeticOperator> {
    match token {
        Token::Plus => Some(ArithmeticOperator::Add),
        Token::Minus => Some(ArithmeticOperator::Subtract),
        Token::Star => Some(ArithmeticOperator::Multiply),
        Token::Slash => Some(ArithmeticOperator::Divide),
        Token::Percent => Some(ArithmeticOperator::Modulo),
        _ => None,
    }
}

fn logical_operator(token: Token<'_>) -> Option<LogicalOperator> {
    match token {
        Token::And => Some(LogicalOperator::And),
        Token::Or => Some(LogicalOperator::Or),
        _ => None,
    }
}

fn comparison_operator(token: Token<'_>) -> Option<ComparisonOperator> {
    match token {
        Token::Less => Some(ComparisonOperator::LessThan),
        Token::LessEqual => Some(ComparisonOperator::LessThanOrEqual),
        Token::Greater => Some(ComparisonOperator::GreaterThan),
        Token::GreaterEqual => Some(ComparisonOperator::GreaterThanOrEqual),
        Token::EqualEqual => Some(ComparisonOperator::Equal),
        Token::NotEqual => Some(ComparisonOperator::NotEqual),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser(strategy: EvaluationStrategy) -> ExpressionParser {
        ExpressionParser::new(ParserConfig::new(strategy).with_functions(["f", "g"]))
    }

    fn by_value() -> ExpressionParser {
        parser(EvaluationStrategy::ByValue)
    }

    #[test]
    fn test_operators_associate_left() {
        let term = by_value().parse_term("10 - 2 * 3").unwrap();
        assert_eq!(
            term,
            Term::primitive(
                ArithmeticOperator::Multiply,
                Term::primitive(ArithmeticOperator::Subtract, Term::constant(10), Term::constant(2)),
                Term::constant(3),
            )
        );
    }

    #[test]
    fn test_negative_literal_needs_adjacent_digits() {
        let parser = by_value();
        assert_eq!(parser.parse_term("-5").unwrap(), Term::constant(-5));
        assert_eq!(
            parser.parse_term("3--5").unwrap(),
            Term::primitive(ArithmeticOperator::Subtract, Term::constant(3), Term::constant(-5))
        );
        assert!(parser.parse_term("- 5").is_err());
        assert_eq!(
            parser.parse_term("-9223372036854775808").unwrap(),
            Term::constant(i64::MIN)
        );
    }

    #[test]
    fn test_else_branch_extends_right() {
        let term = by_value()
            .parse_term("if 1 == 1 then 0 else f(1) + f(2)")
            .unwrap();
        let Term::IfThenElse { else_branch, .. } = term else {
            panic!("expected a conditional");
        };
        assert!(matches!(
            *else_branch,
            Term::Primitive {
                op: ArithmeticOperator::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_by_value_arguments_are_terms() {
        let term = by_value().parse_term("f(1, 2 + 3)").unwrap();
        assert_eq!(
            term,
            Term::call(
                "f",
                Arguments::Values(vec![
                    Term::constant(1),
                    Term::primitive(ArithmeticOperator::Add, Term::constant(2), Term::constant(3)),
                ])
            )
        );
    }

    #[test]
    fn test_by_name_arguments_keep_source_text() {
        let term = parser(EvaluationStrategy::ByName)
            .parse_term("f(g(1), (2+3), 4 * g(5), -6)")
            .unwrap();
        assert_eq!(
            term,
            Term::call(
                "f",
                Arguments::Names(vec![
                    "g(1)".to_string(),
                    "(2+3)".to_string(),
                    "(4 * g(5))".to_string(),
                    "-6".to_string(),
                ])
            )
        );
    }

    #[test]
    fn test_grouped_argument_is_not_wrapped_again() {
        let parser = parser(EvaluationStrategy::ByName);
        assert_eq!(
            parser.parse_term("f((1) + (2))").unwrap(),
            Term::call("f", Arguments::Names(vec!["((1) + (2))".to_string()]))
        );
        assert_eq!(
            parser.parse_term("f(((1) + (2)))").unwrap(),
            Term::call("f", Arguments::Names(vec!["((1) + (2))".to_string()]))
        );
    }

    #[test]
    fn test_parentheses_matching() {
        let tokens = tokenize("((1) + (2").unwrap();
        let closing = match_parentheses(&tokens);
        assert_eq!(closing[0], None);
        assert_eq!(closing[1], Some(3));
        assert_eq!(closing[5], None);
    }

    #[test]
    fn test_conditions() {
        let parser = by_value();
        let condition = parser
            .parse_condition("not 1 < 2 and (3 == 3 or 4 != 4)")
            .unwrap();
        assert_eq!(
            condition,
            BoolTerm::bool_op(
                LogicalOperator::And,
                BoolTerm::not(BoolTerm::compare(
                    ComparisonOperator::LessThan,
                    Term::constant(1),
                    Term::constant(2)
                )),
                BoolTerm::bool_op(
                    LogicalOperator::Or,
                    BoolTerm::compare(ComparisonOperator::Equal, Term::constant(3), Term::constant(3)),
                    BoolTerm::compare(
                        ComparisonOperator::NotEqual,
                        Term::constant(4),
                        Term::constant(4)
                    ),
                ),
            )
        );
        assert!(parser.parse_condition("(1 + 2) >= 3").is_ok());
    }

    #[test]
    fn test_expression_falls_back_to_condition() {
        let parser = by_value();
        assert!(matches!(parser.parse("f(1) + 2"), Ok(Expression::Term(_))));
        assert!(matches!(parser.parse("f(1) == 2"), Ok(Expression::Bool(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let parser = ExpressionParser::new(ParserConfig::default().with_max_depth(8));
        assert!(parser.parse_term("((((1))))").is_ok());
        assert!(matches!(
            parser.parse_term("((((((((((1))))))))))"),
            Err(ParseError::NestingTooDeep { limit: 8, .. })
        ));
    }

    fn nested(depth: usize, inner: &str) -> String {
        format!("{}{inner}{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_default_nesting_limit_reports_instead_of_overflowing() {
        let parser = by_value();
        assert!(parser.parse_term(&nested(DEFAULT_MAX_NESTING_DEPTH - 1, "1")).is_ok());
        assert!(parser.parse_condition(&nested(DEFAULT_MAX_NESTING_DEPTH - 2, "1 == 1")).is_ok());
        assert!(matches!(
            parser.parse(&nested(600, "1")),
            Err(ParseError::NestingTooDeep { limit: DEFAULT_MAX_NESTING_DEPTH, .. })
        ));
        assert!(matches!(
            parser.parse(&nested(600, "1 == 1")),
            Err(ParseError::NestingTooDeep { limit: DEFAULT_MAX_NESTING_DEPTH, .. })
        ));
    }

    #[test]
    fn test_errors() {
        let parser = by_value();
        assert_eq!(
            parser.parse("h(1)"),
            Err(ParseError::UnknownFunction {
                name: "h".to_string(),
                position: 0
            })
        );
        assert_eq!(
            parser.parse("x + 1"),
            Err(ParseError::UnboundIdentifier {
                name: "x".to_string(),
                position: 0
            })
        );
        assert!(matches!(
            parser.parse("f(1))"),
            Err(ParseError::UnexpectedToken { position: 4, .. })
        ));
        assert!(matches!(
            parser.parse("if 1 == 1 then 2"),
            Err(ParseError::UnexpectedEndOfInput { .. })
        ));
    }
}
