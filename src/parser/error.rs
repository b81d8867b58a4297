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

//! Parser error types

use super::span::Span;
use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use nom::error::{ErrorKind, ParseError as NomParseError};
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location information
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Character that starts no token
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character
        character: char,
        /// Position of the character
        position: usize,
    },

    /// Token that does not fit the grammar here
    #[error("Unexpected token '{token}' at position {position}, expected {expected}")]
    UnexpectedToken {
        /// The unexpected token that was found
        token: String,
        /// What the grammar allows at this point
        expected: String,
        /// Position where the token was found
        position: usize,
    },

    /// Input ended in the middle of an expression
    #[error("Unexpected end of input at position {position}, expected {expected}")]
    UnexpectedEndOfInput {
        /// What the grammar allows at this point
        expected: String,
        /// Position where more input was expected
        position: usize,
    },

    /// Invalid literal value
    #[error("Invalid integer literal at position {position}: {value}")]
    InvalidLiteral {
        /// The invalid literal text
        value: String,
        /// Position where the literal was found
        position: usize,
    },

    /// Call of a name that is not a registered function
    #[error("Unknown function '{name}' at position {position}")]
    UnknownFunction {
        /// The called name
        name: String,
        /// Position of the name
        position: usize,
    },

    /// Identifier in operand position, typically a formal parameter that was
    /// never substituted
    #[error("Unbound identifier '{name}' at position {position}")]
    UnboundIdentifier {
        /// The identifier
        name: String,
        /// Position of the identifier
        position: usize,
    },

    /// Operands nested deeper than the configured limit
    #[error("Expression nested deeper than {limit} levels at position {position}")]
    NestingTooDeep {
        /// The configured limit
        limit: usize,
        /// Position of the operand that exceeded it
        position: usize,
    },

    /// Generic nom error
    #[error("Parse error at position {position}: {kind:?}")]
    NomError {
        /// Position where the parse error occurred
        position: usize,
        /// The nom error kind
        kind: ErrorKind,
    },
}

impl ParseError {
    /// Byte offset of the error in the parsed text
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedCharacter { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position, .. }
            | ParseError::InvalidLiteral { position, .. }
            | ParseError::UnknownFunction { position, .. }
            | ParseError::UnboundIdentifier { position, .. }
            | ParseError::NestingTooDeep { position, .. }
            | ParseError::NomError { position, .. } => *position,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, length) = match self {
            ParseError::UnexpectedCharacter { character, .. } => {
                (DiagnosticCode::UnexpectedToken, character.len_utf8())
            }
            ParseError::UnexpectedToken { token, .. } => {
                (DiagnosticCode::UnexpectedToken, token.len())
            }
            ParseError::UnexpectedEndOfInput { .. } => (DiagnosticCode::UnexpectedToken, 1),
            ParseError::InvalidLiteral { value, .. } => (DiagnosticCode::InvalidNumber, value.len()),
            ParseError::UnknownFunction { name, .. } => (DiagnosticCode::UnknownFunction, name.len()),
            ParseError::UnboundIdentifier { name, .. } => {
                (DiagnosticCode::UnboundIdentifier, name.len())
            }
            ParseError::NestingTooDeep { .. } => (DiagnosticCode::ResourceExhausted, 1),
            ParseError::NomError { .. } => (DiagnosticCode::UnexpectedToken, 1),
        };

        DiagnosticBuilder::error(code)
            .with_message(self.to_string())
            .with_span(self.position(), self.position() + length)
            .build()
    }
}

/// Implement nom's ParseError trait so tokenizer combinators report offsets
impl<'a> NomParseError<Span<'a>> for ParseError {
    fn from_error_kind(input: Span<'a>, kind: ErrorKind) -> Self {
        ParseError::NomError {
            position: input.location_offset(),
            kind,
        }
    }

    fn append(_input: Span<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}
