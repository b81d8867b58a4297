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

//! Argument strategies, substitution and deep recursion

use pretty_assertions::assert_eq;
use recfun::{
    EngineConfig, EvaluationError, EvaluationStrategy, Evaluator, Value, substitute,
};
use rstest::rstest;

fn evaluate(program: &str, strategy: EvaluationStrategy) -> Result<Value, EvaluationError> {
    Evaluator::new(program, EngineConfig::default().with_strategy(strategy))?.evaluate()
}

#[rstest]
#[case::arithmetic("add(2 * 3, 10 - 4) where add(a, b) = a + b", Value::Integer(12))]
#[case::nested_calls(
    "twice(inc(1)) where twice(x) = x * 2; inc(x) = x + 1",
    Value::Integer(4)
)]
#[case::negative_actuals("sub(-3, -4) where sub(a, b) = a - b", Value::Integer(1))]
#[case::truncating_division("quot(-7, 2) where quot(a, b) = a / b", Value::Integer(-3))]
#[case::remainder("rem(-7, 2) where rem(a, b) = a % b", Value::Integer(-1))]
#[case::boolean_body("pos(0 - 5) where pos(n) = n > 0 or n == 0", Value::Boolean(false))]
#[case::no_functions("(1 + 2) * 3", Value::Integer(9))]
#[case::zero_formals("seven() * 6 where seven() = 7", Value::Integer(42))]
fn test_strategies_agree(#[case] program: &str, #[case] expected: Value) {
    assert_eq!(evaluate(program, EvaluationStrategy::ByValue), Ok(expected));
    assert_eq!(evaluate(program, EvaluationStrategy::ByName), Ok(expected));
}

#[test]
fn test_by_name_skips_unused_faulting_actual() {
    // the faulting actual is only referenced in the branch not taken
    let program = "pick(1, 1 / 0) where pick(c, x) = if c == 1 then 0 else x + x";
    assert!(matches!(
        evaluate(program, EvaluationStrategy::ByValue),
        Err(EvaluationError::ArithmeticFault { .. })
    ));
    assert_eq!(
        evaluate(program, EvaluationStrategy::ByName),
        Ok(Value::Integer(0))
    );
}

#[test]
fn test_by_value_rejects_boolean_actual() {
    let program = "id(is_zero(0)) where id(x) = x; is_zero(n) = n == 0";
    assert!(matches!(
        evaluate(program, EvaluationStrategy::ByValue),
        Err(EvaluationError::TypeMismatch {
            expected: "integer",
            actual: "boolean",
            ..
        })
    ));
}

#[test]
fn test_substitution_is_sequential() {
    assert_eq!(substitute("x + y", &["x", "y"], &["y", "1"]).unwrap(), "1 + 1");
}

#[test]
fn test_sequential_substitution_captures_later_formal() {
    // By name `a` becomes "b(5)", whose `b` is then replaced by the second
    // actual, leaving "1(5) * 1"
    let program = "g(5) where g(a) = h(b(a), 1); h(a, b) = a * b; b(x) = x + 1";
    assert_eq!(
        evaluate(program, EvaluationStrategy::ByValue),
        Ok(Value::Integer(6))
    );
    assert!(matches!(
        evaluate(program, EvaluationStrategy::ByName),
        Err(EvaluationError::Parse { .. })
    ));
}

#[rstest]
#[case::by_value(EvaluationStrategy::ByValue)]
#[case::by_name(EvaluationStrategy::ByName)]
fn test_deep_tail_recursion(#[case] strategy: EvaluationStrategy) {
    // By name the actual grows one parenthesis per call, which the nesting
    // limit bounds, so the by-name variant recurses less deeply
    let depth = match strategy {
        EvaluationStrategy::ByValue => 100_000,
        EvaluationStrategy::ByName => 400,
    };
    let program = format!("count({depth}) where count(n) = if n == 0 then 0 else count(n - 1)");
    assert_eq!(evaluate(&program, strategy), Ok(Value::Integer(0)));
}

#[test]
fn test_deep_non_tail_recursion() {
    let program = "sum(100000) where sum(n) = if n == 0 then 0 else n + sum(n - 1)";
    assert_eq!(
        evaluate(program, EvaluationStrategy::ByValue),
        Ok(Value::Integer(5_000_050_000))
    );
}

#[test]
fn test_call_depth_limit() {
    let evaluator = Evaluator::new(
        "count(1000) where count(n) = if n == 0 then 0 else count(n - 1)",
        EngineConfig::default().with_max_call_depth(100),
    )
    .unwrap();
    assert_eq!(
        evaluator.evaluate(),
        Err(EvaluationError::StackExhausted { limit: 100 })
    );
}

#[test]
fn test_runaway_recursion_is_reported() {
    let evaluator = Evaluator::new(
        "loop(1) where loop(n) = loop(n)",
        EngineConfig::default().with_max_call_depth(5_000),
    )
    .unwrap();
    assert_eq!(
        evaluator.evaluate(),
        Err(EvaluationError::StackExhausted { limit: 5_000 })
    );
}
