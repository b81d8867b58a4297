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

//! Builder pattern for constructing diagnostics

use super::diagnostic::{Diagnostic, DiagnosticCode, Severity};
use super::location::SourceLocation;

/// Builder for constructing diagnostics fluently
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    severity: Severity,
    code: DiagnosticCode,
    message: String,
    location: SourceLocation,
}

impl DiagnosticBuilder {
    fn with_severity(severity: Severity, code: DiagnosticCode) -> Self {
        Self {
            severity,
            code,
            message: String::new(),
            location: SourceLocation::default(),
        }
    }

    /// Create a new error diagnostic builder
    pub fn error(code: DiagnosticCode) -> Self {
        Self::with_severity(Severity::Error, code)
    }

    /// Create a new warning diagnostic builder
    pub fn warning(code: DiagnosticCode) -> Self {
        Self::with_severity(Severity::Warning, code)
    }

    /// Set the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the location from byte offsets
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        let source_text = self.location.source_text.take();
        self.location = SourceLocation::new(start, end);
        self.location.source_text = source_text;
        self
    }

    /// Set the text the offsets refer to
    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.location.source_text = Some(text.into());
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic::new(self.severity, self.code, self.message, self.location)
    }
}

// Convenience functions for common diagnostics

impl DiagnosticBuilder {
    /// Create an "unknown function" error
    pub fn unknown_function(name: &str) -> Self {
        Self::error(DiagnosticCode::UnknownFunction)
            .with_message(format!("Unknown function '{name}'"))
    }

    /// Create a "type mismatch" error
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::error(DiagnosticCode::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
        .with_message(format!("Type mismatch: expected {expected}, found {actual}"))
    }

    /// Create an arity warning
    pub fn arity_mismatch(name: &str, expected: usize, actual: usize) -> Self {
        Self::warning(DiagnosticCode::InvalidArity).with_message(format!(
            "Function '{name}' takes {expected} argument(s) but {actual} were supplied"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let diagnostic = DiagnosticBuilder::unknown_function("foo")
            .with_source_text("1 + foo(2)")
            .with_span(4, 7)
            .build();

        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "Unknown function 'foo'");
        assert_eq!(diagnostic.location.offsets, Some((4, 7)));
        assert_eq!(diagnostic.location.source_text.as_deref(), Some("1 + foo(2)"));
    }

    #[test]
    fn test_arity_warning() {
        let diagnostic = DiagnosticBuilder::arity_mismatch("f", 2, 1).build();
        assert!(diagnostic.is_warning());
        assert_eq!(diagnostic.code, DiagnosticCode::InvalidArity);
    }
}
