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

//! Evaluator for small recursive first-order function programs
//!
//! A program is a head expression followed by function definitions:
//!
//! ```text
//! power(5, 3) where
//! power(x, y) = if y == 0 then 1 else mul(x, power(x, y - 1))
//! mul(x, y) = if y == 0 then 0 else mul(x, y - 1) + x
//! ```
//!
//! Calls are reduced by substituting the actuals into the callee's body text
//! and evaluating the result. Under [`EvaluationStrategy::ByValue`] actuals
//! are evaluated first and their values substituted; under
//! [`EvaluationStrategy::ByName`] their source text is substituted as is.
//!
//! ```rust
//! use recfun::{EngineConfig, EvaluationStrategy, Evaluator, Value};
//!
//! let program = "mul(0, 5 / 0) where mul(x, y) = if x == 0 then 0 else mul(x - 1, y) + x";
//!
//! let by_value = Evaluator::new(program, EngineConfig::default())?;
//! assert!(by_value.evaluate().is_err());
//!
//! let by_name = Evaluator::new(
//!     program,
//!     EngineConfig::default().with_strategy(EvaluationStrategy::ByName),
//! )?;
//! assert_eq!(by_name.evaluate()?, Value::Integer(0));
//! # Ok::<(), recfun::EvaluationError>(())
//! ```

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod program;
pub mod samples;
pub mod substitution;

// Re-export main types
pub use config::{EngineConfig, EvaluationStrategy};
pub use evaluator::{EvaluationError, EvaluationResult, Evaluator};
pub use model::Value;
pub use parser::{ParseError, ParserConfig};
pub use program::{FunctionDef, FunctionRegistry, Program};
pub use substitution::{Substitution, substitute};
