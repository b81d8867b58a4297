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

//! Function registry

use super::definition::FunctionDef;
use crate::evaluator::{EvaluationError, EvaluationResult};
use indexmap::IndexMap;

/// Definitions of a program, keyed by name, in definition order
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; a name may only be defined once
    pub fn register(&mut self, def: FunctionDef) -> EvaluationResult<()> {
        if self.functions.contains_key(def.name()) {
            return Err(EvaluationError::malformed(
                format!("function '{}' is defined more than once", def.name()),
                None,
            ));
        }
        self.functions.insert(def.name().to_string(), def);
        Ok(())
    }

    /// Look up a definition by name
    pub fn lookup(&self, name: &str) -> EvaluationResult<&FunctionDef> {
        self.functions
            .get(name)
            .ok_or_else(|| EvaluationError::UnknownFunction {
                name: name.to_string(),
            })
    }

    /// Check if a function is defined
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Function names in definition order
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no function is defined
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Iterate over definitions in definition order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }
}

impl<'a> IntoIterator for &'a FunctionRegistry {
    type Item = &'a FunctionDef;
    type IntoIter = indexmap::map::Values<'a, String, FunctionDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.functions.values()
    }
}
