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

//! Engine configuration
//!
//! Evaluation strategy, tracing and resource limits are fixed when an
//! [`Evaluator`](crate::evaluator::Evaluator) is constructed.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default limit on simultaneously active function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1 << 20;

/// Default limit on pending work-stack entries
pub const DEFAULT_MAX_PENDING_TASKS: usize = 1 << 24;

/// Default limit on the length of a substituted body, in bytes
pub const DEFAULT_MAX_EXPRESSION_LENGTH: usize = 16 * 1024 * 1024;

/// Default limit on operand nesting within one parsed text
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 512;

/// How actual arguments reach a function body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EvaluationStrategy {
    /// Evaluate every actual before the call, substitute its value
    #[default]
    ByValue,
    /// Substitute the unevaluated text of every actual
    ByName,
}

impl EvaluationStrategy {
    /// Command-line spelling of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByValue => "by-value",
            Self::ByName => "by-name",
        }
    }
}

impl fmt::Display for EvaluationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized strategy name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown evaluation strategy '{0}', expected 'by-value' or 'by-name'")]
pub struct UnknownStrategy(pub String);

impl FromStr for EvaluationStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "by-value" | "byvalue" | "value" => Ok(Self::ByValue),
            "by-name" | "byname" | "name" => Ok(Self::ByName),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl clap::ValueEnum for EvaluationStrategy {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::ByValue, Self::ByName]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Engine configuration for [`Evaluator`](crate::evaluator::Evaluator)
///
/// # Examples
///
/// ```rust
/// use recfun::config::{EngineConfig, EvaluationStrategy};
///
/// let config = EngineConfig::default()
///     .with_strategy(EvaluationStrategy::ByName)
///     .with_max_call_depth(10_000);
/// assert_eq!(config.strategy, EvaluationStrategy::ByName);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Argument strategy used at every call site
    pub strategy: EvaluationStrategy,

    /// Log every substituted body at `info` instead of `trace`
    pub verbose: bool,

    /// Maximum number of simultaneously active calls
    ///
    /// Exceeding it fails with `StackExhausted`. Default: 1,048,576
    pub max_call_depth: usize,

    /// Maximum number of entries on the evaluator's work stack
    ///
    /// Exceeding it fails with `ResourceExhausted`. Default: 16,777,216
    pub max_pending_tasks: usize,

    /// Maximum length of a substituted body in bytes
    ///
    /// By-name evaluation can grow argument text at every call; exceeding
    /// the limit fails with `ResourceExhausted`. Default: 16 MiB
    pub max_expression_length: usize,

    /// Maximum operand nesting within one parsed text
    ///
    /// Parenthesized by-name actuals nest one level deeper per call; exceeding
    /// the limit fails with `ResourceExhausted`. Default: 512
    pub max_nesting_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: EvaluationStrategy::default(),
            verbose: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_pending_tasks: DEFAULT_MAX_PENDING_TASKS,
            max_expression_length: DEFAULT_MAX_EXPRESSION_LENGTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Create new configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the argument strategy
    pub fn with_strategy(mut self, strategy: EvaluationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable verbose tracing of substituted bodies
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set maximum call depth
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Set maximum work-stack size
    pub fn with_max_pending_tasks(mut self, tasks: usize) -> Self {
        self.max_pending_tasks = tasks;
        self
    }

    /// Set maximum substituted body length
    pub fn with_max_expression_length(mut self, length: usize) -> Self {
        self.max_expression_length = length;
        self
    }

    /// Set maximum operand nesting depth
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}
