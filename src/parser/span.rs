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

//! Source location tracking for the tokenizer

use nom_locate::LocatedSpan;

/// Type alias for located spans in the input
pub type Span<'a> = LocatedSpan<&'a str>;

/// A token with the byte range it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The value
    pub value: T,
    /// Start offset in the input
    pub start: usize,
    /// End offset in the input (exclusive)
    pub end: usize,
}

impl<T> Spanned<T> {
    /// Create a new spanned value
    pub fn new(value: T, start: usize, end: usize) -> Self {
        Self { value, start, end }
    }

    /// Get the span length
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `next` starts exactly where this span ends
    pub fn touches<U>(&self, next: &Spanned<U>) -> bool {
        self.end == next.start
    }
}

/// Helper functions for working with spans
pub mod helpers {
    use super::*;

    /// Get the byte offset of a span
    pub fn position(span: &Span<'_>) -> usize {
        span.location_offset()
    }

    /// Create a spanned value covering `start..end`
    pub fn spanned<T>(start: &Span<'_>, end: &Span<'_>, value: T) -> Spanned<T> {
        Spanned::new(value, position(start), position(end))
    }
}
