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

//! Sample programs under both argument strategies

use pretty_assertions::assert_eq;
use recfun::ast::{ArithmeticFailure, ArithmeticOperator};
use recfun::samples::{self, Sample};
use recfun::{EngineConfig, EvaluationError, EvaluationStrategy, Evaluator, Value};
use rstest::rstest;

fn evaluate(sample: &Sample, strategy: EvaluationStrategy) -> Result<Value, EvaluationError> {
    sample
        .evaluator(EngineConfig::default().with_strategy(strategy))?
        .evaluate()
}

#[rstest]
#[case::x_squared(samples::X_SQUARED, 100)]
#[case::power(samples::POWER, 125)]
#[case::factorial(samples::FACTORIAL, 3_628_800)]
#[case::fibonacci(samples::FIBONACCI, 13)]
fn test_sample_results(
    #[case] sample: Sample,
    #[case] expected: i64,
    #[values(EvaluationStrategy::ByValue, EvaluationStrategy::ByName)] strategy: EvaluationStrategy,
) {
    assert_eq!(evaluate(&sample, strategy), Ok(Value::Integer(expected)));
}

#[test]
fn test_lazy_mul_by_value_faults() {
    assert_eq!(
        evaluate(&samples::LAZY_MUL, EvaluationStrategy::ByValue),
        Err(EvaluationError::ArithmeticFault {
            op: ArithmeticOperator::Divide,
            left: 5,
            right: 0,
            failure: ArithmeticFailure::DivisionByZero,
        })
    );
}

#[test]
fn test_lazy_mul_by_name_never_forces_argument() {
    assert_eq!(
        evaluate(&samples::LAZY_MUL, EvaluationStrategy::ByName),
        Ok(Value::Integer(0))
    );
}

#[test]
fn test_integer_div_by_name() {
    assert_eq!(
        evaluate(&samples::INTEGER_DIV, EvaluationStrategy::ByName),
        Ok(Value::Integer(1))
    );
}

#[test]
fn test_integer_div_by_value_overflows() {
    let result = evaluate(&samples::INTEGER_DIV, EvaluationStrategy::ByValue);
    assert!(
        matches!(
            result,
            Err(EvaluationError::ArithmeticFault {
                failure: ArithmeticFailure::Overflow,
                ..
            })
        ),
        "unexpected result {result:?}"
    );
}

// Same definitions written on one line with `;` separators
#[rstest]
#[case::x_squared(
    "h(10) where h(x)=f(x,x); f(x,y)=if y==0 then 0 else g(x,f(x,y-1)); g(x,y)=if x==0 then y else g(x-1,y)+1",
    100
)]
#[case::power(
    "power(5,3) where power(x,y)=if y==0 then 1 else mul(x,power(x,y-1)); mul(x,y)=if y==0 then 0 else mul(x,y-1)+x",
    125
)]
#[case::fibonacci(
    "fib(6) where fib(x)=if x==0 then 1 else if x==1 then 1 else fib(x-1)+fib(x-2)",
    13
)]
fn test_compact_programs(#[case] program: &str, #[case] expected: i64) {
    let evaluator = Evaluator::new(program, EngineConfig::default()).unwrap();
    assert_eq!(evaluator.evaluate(), Ok(Value::Integer(expected)));
}

// The accumulator is dropped when the base case returns the constant 1
#[test]
fn test_factorial_without_accumulator_result() {
    let evaluator = Evaluator::new(
        "f(10) where f(x)=h(x,1); h(x,y)=if x==1 then 1 else h(x-1,x*y)",
        EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(evaluator.evaluate(), Ok(Value::Integer(1)));
}
