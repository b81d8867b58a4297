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

//! Program text: a head expression and the function definitions it uses
//!
//! ```text
//! f(10) where
//! f(n) = if n == 0 then 1 else n * f(n - 1)
//! ```
//!
//! Definitions follow the first whole-word `where`, one per line or separated
//! by `;`. A program without definitions may omit `where`.

pub mod definition;
pub mod registry;

pub use definition::FunctionDef;
pub use registry::FunctionRegistry;

use crate::config::EngineConfig;
use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::parser::ParserConfig;
use std::str::FromStr;

const WHERE: &str = "where";

/// A loaded program
#[derive(Debug, Clone)]
pub struct Program {
    head: String,
    functions: FunctionRegistry,
}

impl Program {
    /// Split program text into head and definitions
    pub fn parse(text: &str) -> EvaluationResult<Self> {
        let (head, definitions) = match find_keyword(text, WHERE) {
            Some(index) => (&text[..index], Some(index + WHERE.len())),
            None => (text, None),
        };

        let head = head.trim();
        if head.is_empty() {
            return Err(EvaluationError::malformed(
                "program has no head expression",
                Some(1),
            ));
        }

        let mut functions = FunctionRegistry::new();
        if let Some(start) = definitions {
            let first_line = text[..start].matches('\n').count() + 1;
            for (offset, line) in text[start..].split('\n').enumerate() {
                for definition in line.split(';') {
                    if definition.trim().is_empty() {
                        continue;
                    }
                    let line_number = Some(first_line + offset);
                    let def = FunctionDef::parse(definition, line_number)?;
                    functions.register(def).map_err(|error| match error {
                        EvaluationError::MalformedProgram { message, .. } => {
                            EvaluationError::malformed(message, line_number)
                        }
                        other => other,
                    })?;
                }
            }
        }

        log::debug!(
            "loaded program '{}' with {} function(s)",
            head,
            functions.len()
        );

        Ok(Self {
            head: head.to_string(),
            functions,
        })
    }

    /// Head expression text
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Function definitions
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Parser configuration accepting calls of this program's functions
    pub fn parser_config(&self, config: &EngineConfig) -> ParserConfig {
        ParserConfig::new(config.strategy)
            .with_max_depth(config.max_nesting_depth)
            .with_functions(self.functions.function_names())
    }
}

impl FromStr for Program {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// First occurrence of `keyword` not embedded in a longer identifier
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    text.match_indices(keyword).map(|(index, _)| index).find(|&index| {
        let before = text[..index].chars().next_back();
        let after = text[index + keyword.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluationStrategy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_multiline_program() {
        let program = Program::parse(
            "power(5, 3) where\n\
             power(x, n) = if n == 0 then 1 else x * power(x, n - 1)\n\
             \n\
             square(x) = x * x\n",
        )
        .unwrap();

        assert_eq!(program.head(), "power(5, 3)");
        assert_eq!(
            program.functions().function_names().collect::<Vec<_>>(),
            ["power", "square"]
        );
    }

    #[test]
    fn test_parse_single_line_program() {
        let program = Program::parse("h(10) where g(x) = x * x; h(x) = g(x)").unwrap();
        assert_eq!(program.head(), "h(10)");
        assert_eq!(program.functions().len(), 2);
    }

    #[test]
    fn test_where_must_be_a_whole_word() {
        let program = Program::parse("somewhere(1) where somewhere(x) = x").unwrap();
        assert_eq!(program.head(), "somewhere(1)");
        assert!(program.functions().contains("somewhere"));
    }

    #[test]
    fn test_program_without_definitions() {
        let program: Program = "1 + 2".parse().unwrap();
        assert_eq!(program.head(), "1 + 2");
        assert!(program.functions().is_empty());
    }

    #[test]
    fn test_malformed_programs() {
        assert!(matches!(
            Program::parse("  where f(x) = x"),
            Err(EvaluationError::MalformedProgram { line: Some(1), .. })
        ));
        assert!(matches!(
            Program::parse("f(1) where\nf(x) = x\nf(y) = y"),
            Err(EvaluationError::MalformedProgram { line: Some(3), .. })
        ));
        assert!(matches!(
            Program::parse("f(1) where\nf(x) x"),
            Err(EvaluationError::MalformedProgram { line: Some(2), .. })
        ));
    }

    #[test]
    fn test_parser_config_knows_functions() {
        let program = Program::parse("f(1) where f(x) = x").unwrap();
        let engine = EngineConfig::default()
            .with_strategy(EvaluationStrategy::ByName)
            .with_max_nesting_depth(64);
        let config = program.parser_config(&engine);
        assert!(config.is_function("f"));
        assert!(!config.is_function("g"));
        assert_eq!(config.strategy(), EvaluationStrategy::ByName);
        assert_eq!(config.max_depth(), 64);
    }
}
