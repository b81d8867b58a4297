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

//! Built-in sample programs

use crate::config::EngineConfig;
use crate::evaluator::{EvaluationResult, Evaluator};

/// A named program shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Program text
    pub source: &'static str,
}

impl Sample {
    /// Load the sample into an evaluator
    pub fn evaluator(&self, config: EngineConfig) -> EvaluationResult<Evaluator> {
        Evaluator::new(self.source, config)
    }
}

/// Squaring through repeated addition
pub const X_SQUARED: Sample = Sample {
    name: "x-squared",
    description: "10 * 10 by nested unary addition",
    source: "h(10) where
h(x) = f(x, x)
f(x, y) = if y == 0 then 0 else g(x, f(x, y - 1))
g(x, y) = if x == 0 then y else g(x - 1, y) + 1",
};

/// Exponentiation through repeated multiplication
pub const POWER: Sample = Sample {
    name: "power",
    description: "5 to the 3rd power by repeated multiplication",
    source: "power(5, 3) where
power(x, y) = if y == 0 then 1 else mul(x, power(x, y - 1))
mul(x, y) = if y == 0 then 0 else mul(x, y - 1) + x",
};

/// Factorial with an accumulator
pub const FACTORIAL: Sample = Sample {
    name: "factorial",
    description: "10! with an accumulating parameter",
    source: "f(10) where
f(x) = h(x, 1)
h(x, y) = if x == 1 then y else h(x - 1, x * y)",
};

/// Fibonacci with fib(0) = fib(1) = 1
pub const FIBONACCI: Sample = Sample {
    name: "fibonacci",
    description: "6th term of the Fibonacci sequence starting 1, 1",
    source: "fib(6) where
fib(x) = if x == 0 then 1 else if x == 1 then 1 else fib(x - 1) + fib(x - 2)",
};

/// An argument that faults when evaluated but is never used
pub const LAZY_MUL: Sample = Sample {
    name: "lazy-mul",
    description: "unused 5 / 0 argument: faults by value, 0 by name",
    source: "mul(0, 5 / 0) where
mul(x, y) = if x == 0 then 0 else mul(x - 1, y) + x
div(x, y) = x / y",
};

/// A call whose second argument only terminates by name
pub const INTEGER_DIV: Sample = Sample {
    name: "integer-div",
    description: "nested call whose argument never terminates by value",
    source: "f(5, 5) where
f(x, y) = if x % 3 == 0 then x / 3 else f((x - 1), f((2 * x) - 2, y))",
};

/// Every built-in sample
pub const SAMPLES: &[Sample] = &[X_SQUARED, POWER, FACTORIAL, FIBONACCI, LAZY_MUL, INTEGER_DIV];

/// Find a sample by name
pub fn find(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|sample| sample.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_names_are_unique() {
        for (index, sample) in SAMPLES.iter().enumerate() {
            assert!(SAMPLES[..index].iter().all(|other| other.name != sample.name));
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find("power"), Some(&POWER));
        assert_eq!(find("nope"), None);
    }

    #[test]
    fn test_samples_load() {
        for sample in SAMPLES {
            assert!(
                sample.evaluator(EngineConfig::default()).is_ok(),
                "sample '{}' failed to load",
                sample.name
            );
        }
    }
}
