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

//! Evaluator benchmarks
//!
//! Covers tokenizing, parsing and evaluating the sample programs under both
//! argument strategies.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use recfun::parser::{ExpressionParser, ParserConfig, tokenize};
use recfun::samples::{FACTORIAL, FIBONACCI, POWER, Sample, X_SQUARED};
use recfun::{EngineConfig, EvaluationStrategy};
use std::hint::black_box;

const TEST_EXPRESSIONS: &[(&str, &str)] = &[
    ("simple", "1 + 2"),
    ("medium", "if x == 0 then 1 else x * f(x - 1)"),
    (
        "complex",
        "if not (x < 0 or y < 0) and x % 3 == 0 then f((x - 1), f((2 * x) - 2, y)) else -1",
    ),
];

const BENCH_SAMPLES: &[Sample] = &[X_SQUARED, POWER, FACTORIAL, FIBONACCI];

fn bench_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Elements(1));

    for (complexity, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(
            BenchmarkId::new("tokenize", complexity),
            expression,
            |b, expr| b.iter(|| black_box(tokenize(black_box(expr)))),
        );
    }

    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Elements(1));

    let config = ParserConfig::new(EvaluationStrategy::ByValue).with_functions(["f"]);
    let parser = ExpressionParser::new(config);

    // Formals stay unbound here, so substitute them the way a call would
    for (complexity, expression) in TEST_EXPRESSIONS {
        let text = expression.replace('x', "7").replace('y', "3");
        group.bench_with_input(
            BenchmarkId::new("parse", complexity),
            &text,
            |b, expr| b.iter(|| black_box(parser.parse(black_box(expr)))),
        );
    }

    group.finish();
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");

    for strategy in [EvaluationStrategy::ByValue, EvaluationStrategy::ByName] {
        for sample in BENCH_SAMPLES {
            let config = EngineConfig::default().with_strategy(strategy);
            let Ok(evaluator) = sample.evaluator(config) else {
                continue;
            };
            group.bench_function(BenchmarkId::new(strategy.as_str(), sample.name), |b| {
                b.iter(|| black_box(evaluator.evaluate()))
            });
        }
    }

    group.finish();
}

criterion_group!(
    evaluator_benchmarks,
    bench_tokenizer,
    bench_parser,
    bench_evaluator
);

criterion_main!(evaluator_benchmarks);
