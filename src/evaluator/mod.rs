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

//! Program evaluator
//!
//! Reduces a program head to a [`Value`](crate::model::Value). Function calls
//! substitute their actuals into the callee's body text and parse the result
//! afresh, so the argument strategy decides what text a body sees.

#![warn(missing_docs)]

mod engine;
mod error;

pub use engine::Evaluator;
pub use error::{EvaluationError, EvaluationResult};
