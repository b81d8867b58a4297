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

//! Formatting diagnostics for terminal output

use super::diagnostic::Diagnostic;
#[cfg(feature = "terminal")]
use super::diagnostic::Severity;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line text with a source excerpt
    Text,
    /// Compact single-line format
    Compact,
}

/// Formatter for diagnostics
pub struct DiagnosticFormatter {
    format: Format,
    show_code: bool,
    #[cfg(feature = "terminal")]
    use_color: bool,
}

impl DiagnosticFormatter {
    /// Create a new formatter
    pub fn new(format: Format) -> Self {
        Self {
            format,
            show_code: true,
            #[cfg(feature = "terminal")]
            use_color: true,
        }
    }

    /// Set whether to show error codes
    pub fn with_code(mut self, show: bool) -> Self {
        self.show_code = show;
        self
    }

    /// Set whether to use color (terminal feature only)
    #[cfg(feature = "terminal")]
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Format a diagnostic
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        match self.format {
            Format::Text => self.format_text(diagnostic),
            Format::Compact => self.format_compact(diagnostic),
        }
    }

    fn header(&self, diagnostic: &Diagnostic) -> String {
        #[cfg(feature = "terminal")]
        if self.use_color {
            use colored::Colorize;
            let severity = match diagnostic.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
                Severity::Info => "info".blue().bold(),
            };
            return format!("{}: {}", severity, diagnostic.message.bold());
        }

        format!("{}: {}", diagnostic.severity, diagnostic.message)
    }

    fn format_text(&self, diagnostic: &Diagnostic) -> String {
        let mut result = self.header(diagnostic);

        if self.show_code {
            result.push_str(&format!(" [{}]", diagnostic.code_string()));
        }
        result.push('\n');

        let location = &diagnostic.location;
        let Some(source) = &location.source_text else {
            return result;
        };

        let lines: Vec<&str> = source.lines().collect();
        match location.positions() {
            Some((start, end)) => {
                result.push_str(&format!(" --> {location}\n"));
                if let Some(line) = lines.get(start.line) {
                    result.push_str(&format!("{:4} | {}\n", start.line + 1, line));
                    let line_width = line.chars().count();
                    let end_column = if end.line == start.line {
                        end.column.min(line_width)
                    } else {
                        line_width
                    };
                    let width = end_column.saturating_sub(start.column).max(1);
                    result.push_str("     | ");
                    result.push_str(&" ".repeat(start.column));
                    result.push_str(&"^".repeat(width));
                    result.push('\n');
                }
            }
            None => {
                for (index, line) in lines.iter().enumerate() {
                    result.push_str(&format!("{:4} | {}\n", index + 1, line));
                }
            }
        }

        result
    }

    fn format_compact(&self, diagnostic: &Diagnostic) -> String {
        let code = if self.show_code {
            format!("[{}] ", diagnostic.code_string())
        } else {
            String::new()
        };

        format!(
            "{}: {}: {}{}",
            diagnostic.location, diagnostic.severity, code, diagnostic.message
        )
    }
}

impl Default for DiagnosticFormatter {
    fn default() -> Self {
        Self::new(Format::Text)
    }
}

/// Extension trait for formatting diagnostics
pub trait DiagnosticFormat {
    /// Format as human-readable text
    fn to_text(&self) -> String;

    /// Format as compact single line
    fn to_compact(&self) -> String;
}

impl DiagnosticFormat for Diagnostic {
    fn to_text(&self) -> String {
        DiagnosticFormatter::new(Format::Text).format(self)
    }

    fn to_compact(&self) -> String {
        DiagnosticFormatter::new(Format::Compact).format(self)
    }
}
