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

//! Core diagnostic types

use super::location::SourceLocation;
use std::fmt;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Information
    #[default]
    Info,
    /// May indicate a problem but doesn't stop evaluation
    Warning,
    /// Stops evaluation
    Error,
}

/// Diagnostic error codes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticCode {
    // Parsing errors
    /// Unexpected character or token
    UnexpectedToken,
    /// Integer literal out of range
    InvalidNumber,
    /// Call of a function that is not defined
    UnknownFunction,
    /// Identifier that no substitution replaced
    UnboundIdentifier,

    // Program errors
    /// Definition block that cannot be read
    MalformedProgram,
    /// Function called with the wrong number of arguments
    InvalidArity,

    // Runtime errors
    /// Division or remainder by zero
    DivisionByZero,
    /// Integer overflow
    ArithmeticOverflow,
    /// Integer used as boolean or boolean used as integer
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type found
        actual: String,
    },
    /// Call depth limit reached
    StackExhausted,
    /// Work stack or expression size limit reached
    ResourceExhausted,
    /// Broken evaluator invariant
    Internal,
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Severity of the diagnostic
    pub severity: Severity,
    /// Error code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub location: SourceLocation,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: String,
        location: SourceLocation,
    ) -> Self {
        Self {
            severity,
            code,
            message,
            location,
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }

    /// Attach the text the location offsets refer to
    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.location.source_text = Some(text.into());
        self
    }

    /// Get the diagnostic code as a string
    pub fn code_string(&self) -> &'static str {
        match &self.code {
            DiagnosticCode::UnexpectedToken => "E001",
            DiagnosticCode::InvalidNumber => "E004",
            DiagnosticCode::UnknownFunction => "E007",
            DiagnosticCode::UnboundIdentifier => "E009",
            DiagnosticCode::TypeMismatch { .. } => "E100",
            DiagnosticCode::MalformedProgram => "E150",
            DiagnosticCode::InvalidArity => "E200",
            DiagnosticCode::DivisionByZero => "E300",
            DiagnosticCode::ArithmeticOverflow => "E302",
            DiagnosticCode::StackExhausted => "E400",
            DiagnosticCode::ResourceExhausted => "E401",
            DiagnosticCode::Internal => "E900",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCode::UnexpectedToken => write!(f, "unexpected token"),
            DiagnosticCode::InvalidNumber => write!(f, "invalid number"),
            DiagnosticCode::UnknownFunction => write!(f, "unknown function"),
            DiagnosticCode::UnboundIdentifier => write!(f, "unbound identifier"),
            DiagnosticCode::MalformedProgram => write!(f, "malformed program"),
            DiagnosticCode::InvalidArity => write!(f, "invalid number of arguments"),
            DiagnosticCode::DivisionByZero => write!(f, "division by zero"),
            DiagnosticCode::ArithmeticOverflow => write!(f, "arithmetic overflow"),
            DiagnosticCode::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, found {actual}")
            }
            DiagnosticCode::StackExhausted => write!(f, "call depth exhausted"),
            DiagnosticCode::ResourceExhausted => write!(f, "resource limit exceeded"),
            DiagnosticCode::Internal => write!(f, "internal error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diagnostic = Diagnostic::new(
            Severity::Error,
            DiagnosticCode::UnknownFunction,
            "Unknown function 'foo'".to_string(),
            SourceLocation::new(0, 3),
        )
        .with_source_text("foo(1)");

        assert!(diagnostic.is_error());
        assert!(!diagnostic.is_warning());
        assert_eq!(diagnostic.code_string(), "E007");
        assert_eq!(diagnostic.location.source_text.as_deref(), Some("foo(1)"));
    }

    #[test]
    fn test_code_display() {
        let code = DiagnosticCode::TypeMismatch {
            expected: "integer".to_string(),
            actual: "boolean".to_string(),
        };
        assert_eq!(code.to_string(), "type mismatch: expected integer, found boolean");
    }
}
