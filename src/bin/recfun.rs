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

//! Command-line driver for the built-in sample programs

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use recfun::diagnostics::DiagnosticFormat;
use recfun::{EngineConfig, EvaluationStrategy, samples};
use std::process;

#[derive(Parser)]
#[command(name = "recfun")]
#[command(about = "Evaluate recursive function programs by value or by name")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sample programs
    List,
    /// Evaluate a sample program
    Run {
        /// Sample name (see `recfun list`)
        sample: String,
        /// Substitute unevaluated argument text (shorthand for `--strategy by-name`)
        #[arg(long, conflicts_with = "strategy")]
        by_name: bool,
        /// Argument strategy
        #[arg(long, value_enum, default_value_t = EvaluationStrategy::ByValue)]
        strategy: EvaluationStrategy,
        /// Log every substituted function body
        #[arg(short, long)]
        verbose: bool,
        /// Maximum number of simultaneously active calls
        #[arg(long)]
        max_call_depth: Option<usize>,
    },
    /// Print the source of a sample program
    Show {
        /// Sample name (see `recfun list`)
        sample: String,
    },
}

fn main() {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "info" } else { "warn" }),
    )
    .init();

    let outcome = match cli.command {
        Commands::List => {
            handle_list();
            Ok(true)
        }
        Commands::Run {
            sample,
            by_name,
            strategy,
            verbose,
            max_call_depth,
        } => {
            let strategy = if by_name {
                EvaluationStrategy::ByName
            } else {
                strategy
            };
            let mut config = EngineConfig::default()
                .with_strategy(strategy)
                .with_verbose(verbose);
            if let Some(depth) = max_call_depth {
                config = config.with_max_call_depth(depth);
            }
            handle_run(&sample, config)
        }
        Commands::Show { sample } => handle_show(&sample).map(|()| true),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

fn find_sample(name: &str) -> Result<&'static samples::Sample> {
    samples::find(name).ok_or_else(|| {
        let known: Vec<&str> = samples::SAMPLES.iter().map(|s| s.name).collect();
        anyhow!("unknown sample '{name}', expected one of: {}", known.join(", "))
    })
}

fn handle_list() {
    for sample in samples::SAMPLES {
        println!("{:<12} {}", sample.name, sample.description);
    }
}

fn handle_show(name: &str) -> Result<()> {
    let sample = find_sample(name)?;
    println!("{}", sample.source);
    Ok(())
}

// Ok(false) means the program ran and its evaluation failed
fn handle_run(name: &str, config: EngineConfig) -> Result<bool> {
    let sample = find_sample(name)?;
    let strategy = config.strategy;
    let evaluator = sample
        .evaluator(config)
        .with_context(|| format!("failed to load sample '{name}'"))?;

    match evaluator.evaluate() {
        Ok(value) => {
            println!("Result: {value}");
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", e.to_diagnostic().to_text());
            eprintln!("Sample '{name}' failed {strategy}");
            Ok(false)
        }
    }
}
