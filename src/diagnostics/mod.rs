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

//! Diagnostics for program loading, parsing and evaluation errors
//!
//! Errors convert into a [`Diagnostic`] carrying a code, a severity, a message
//! and optionally the offending source excerpt, which the
//! [`DiagnosticFormatter`] renders with a caret underline.

#![warn(missing_docs)]

pub mod builder;
pub mod diagnostic;
pub mod formatter;
pub mod location;

pub use builder::DiagnosticBuilder;
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use formatter::{DiagnosticFormat, DiagnosticFormatter, Format};
pub use location::{Position, SourceLocation};
