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

//! Error types for program loading and evaluation

use crate::ast::{ArithmeticFailure, ArithmeticOperator};
use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use crate::parser::ParseError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur while loading or evaluating a program
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Program text that cannot be split into a head and definitions
    #[error("Malformed program: {message}")]
    MalformedProgram {
        /// What is wrong
        message: String,
        /// 1-based line of the offending definition, if any
        line: Option<usize>,
    },

    /// Head, body or argument text that does not parse
    #[error("Failed to parse '{expression}': {error}")]
    Parse {
        /// The parser error
        #[source]
        error: ParseError,
        /// The text being parsed
        expression: String,
    },

    /// Call of a name with no definition
    #[error("Unknown function '{name}'")]
    UnknownFunction {
        /// Function name
        name: String,
    },

    /// Division by zero or integer overflow
    #[error("Arithmetic fault in {left} {op} {right}: {failure}")]
    ArithmeticFault {
        /// The operator
        op: ArithmeticOperator,
        /// Left operand value
        left: i64,
        /// Right operand value
        right: i64,
        /// What went wrong
        failure: ArithmeticFailure,
    },

    /// Integer used where a boolean is required, or the reverse
    #[error("Type mismatch: expected {expected}, found {actual} in {context}")]
    TypeMismatch {
        /// Expected type
        expected: &'static str,
        /// Actual type found
        actual: &'static str,
        /// Where the value was used
        context: String,
    },

    /// Too many simultaneously active calls
    #[error("Call depth limit of {limit} exceeded")]
    StackExhausted {
        /// The configured limit
        limit: usize,
    },

    /// Work stack or substituted text grew past its limit
    #[error("Resource limit exceeded: {resource} is limited to {limit}")]
    ResourceExhausted {
        /// Which resource ran out
        resource: &'static str,
        /// The configured limit
        limit: usize,
    },

    /// Broken evaluator invariant
    #[error("Invalid evaluator state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },
}

impl EvaluationError {
    /// Create a malformed program error
    pub fn malformed(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::MalformedProgram {
            message: message.into(),
            line,
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Wrap a parser error together with the text it refers to
    ///
    /// An unregistered call name is reported as [`EvaluationError::UnknownFunction`]
    /// and excessive nesting as [`EvaluationError::ResourceExhausted`].
    pub fn from_parse(error: ParseError, expression: impl Into<String>) -> Self {
        match error {
            ParseError::UnknownFunction { name, .. } => Self::UnknownFunction { name },
            ParseError::NestingTooDeep { limit, .. } => Self::ResourceExhausted {
                resource: "expression nesting",
                limit,
            },
            error => Self::Parse {
                error,
                expression: expression.into(),
            },
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EvaluationError::Parse { error, expression } => {
                let mut diagnostic = error.to_diagnostic().with_source_text(expression.clone());
                diagnostic.message = self.to_string();
                diagnostic
            }
            EvaluationError::MalformedProgram { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::MalformedProgram)
                    .with_message(self.to_string())
                    .build()
            }
            EvaluationError::UnknownFunction { name } => {
                DiagnosticBuilder::unknown_function(name).build()
            }
            EvaluationError::ArithmeticFault { failure, .. } => {
                let code = match failure {
                    ArithmeticFailure::DivisionByZero => DiagnosticCode::DivisionByZero,
                    ArithmeticFailure::Overflow => DiagnosticCode::ArithmeticOverflow,
                };
                DiagnosticBuilder::error(code)
                    .with_message(self.to_string())
                    .build()
            }
            EvaluationError::TypeMismatch {
                expected, actual, ..
            } => DiagnosticBuilder::type_mismatch(expected, actual)
                .with_message(self.to_string())
                .build(),
            EvaluationError::StackExhausted { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::StackExhausted)
                    .with_message(self.to_string())
                    .build()
            }
            EvaluationError::ResourceExhausted { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::ResourceExhausted)
                    .with_message(self.to_string())
                    .build()
            }
            EvaluationError::InvalidState { .. } => {
                DiagnosticBuilder::error(DiagnosticCode::Internal)
                    .with_message(self.to_string())
                    .build()
            }
        }
    }
}
