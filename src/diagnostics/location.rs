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

//! Source location tracking for diagnostics

use std::fmt;

/// A position in source text (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Create a position from a byte offset in the source text
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut line = 0;
        let mut column = 0;

        for (index, ch) in source.char_indices() {
            if index >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }

        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Where a diagnostic points: a byte range and the text it indexes into
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// Byte offsets `start..end`, if known
    pub offsets: Option<(usize, usize)>,
    /// The text the offsets refer to
    pub source_text: Option<String>,
}

impl SourceLocation {
    /// Create a location from byte offsets
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            offsets: Some((start, end.max(start))),
            source_text: None,
        }
    }

    /// Start and end positions, available once both offsets and text are known
    pub fn positions(&self) -> Option<(Position, Position)> {
        let (start, end) = self.offsets?;
        let source = self.source_text.as_deref()?;
        Some((
            Position::from_offset(source, start),
            Position::from_offset(source, end),
        ))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.positions(), self.offsets) {
            (Some((start, _)), _) => write!(f, "{start}"),
            (None, Some((start, end))) => write!(f, "offset {start}..{end}"),
            (None, None) => f.write_str("<unknown>"),
        }
    }
}
