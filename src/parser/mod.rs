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

//! Program expression parser
//!
//! A nom-based tokenizer over located spans feeds a recursive-descent parser.
//! The parser only accepts calls of registered functions and shapes call
//! arguments by the evaluation strategy, both taken from [`ParserConfig`].

#![warn(missing_docs)]

pub mod error;
pub mod parser;
pub mod span;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use parser::{ExpressionParser, ParserConfig};
pub use span::{Span, Spanned};
pub use tokenizer::{Token, is_identifier, is_keyword, tokenize};
