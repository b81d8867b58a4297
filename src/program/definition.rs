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

//! Function definitions

use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::parser::is_identifier;
use crate::substitution::Substitution;

/// One `name(formals) = body` definition
///
/// The body is kept as text; it is parsed again each time the function is
/// called, after the actuals have been substituted into it.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    name: String,
    formals: Vec<String>,
    body: String,
    substitution: Substitution,
}

impl FunctionDef {
    /// Create a definition, checking names and formals
    pub fn new(
        name: impl Into<String>,
        formals: Vec<String>,
        body: impl Into<String>,
    ) -> EvaluationResult<Self> {
        Self::build(name.into(), formals, body.into(), None)
    }

    /// Read a definition line such as `f(x, y) = x + y`
    ///
    /// `line` is the 1-based line number used in error messages.
    pub fn parse(text: &str, line: Option<usize>) -> EvaluationResult<Self> {
        let malformed = |message: String| EvaluationError::malformed(message, line);
        let text = text.trim();

        let (open, close, equals) = match (text.find('('), text.find(')'), text.find('=')) {
            (Some(open), Some(close), Some(equals)) if open < close && close < equals => {
                (open, close, equals)
            }
            (None, _, _) => return Err(malformed(format!("missing '(' in definition '{text}'"))),
            (_, None, _) => return Err(malformed(format!("missing ')' in definition '{text}'"))),
            (_, _, None) => return Err(malformed(format!("missing '=' in definition '{text}'"))),
            _ => {
                return Err(malformed(format!(
                    "expected 'name(formals) = body' in definition '{text}'"
                )));
            }
        };

        if !text[close + 1..equals].trim().is_empty() {
            return Err(malformed(format!(
                "unexpected text between ')' and '=' in definition '{text}'"
            )));
        }

        let name = text[..open].trim().to_string();
        let parameters = text[open + 1..close].trim();
        let formals = if parameters.is_empty() {
            Vec::new()
        } else {
            parameters
                .split(',')
                .map(|formal| formal.trim().to_string())
                .collect()
        };
        let body = text[equals + 1..].trim().to_string();

        Self::build(name, formals, body, line)
    }

    fn build(
        name: String,
        formals: Vec<String>,
        body: String,
        line: Option<usize>,
    ) -> EvaluationResult<Self> {
        if !is_identifier(&name) {
            return Err(EvaluationError::malformed(
                format!("'{name}' is not a valid function name"),
                line,
            ));
        }
        for (index, formal) in formals.iter().enumerate() {
            if !is_identifier(formal) {
                return Err(EvaluationError::malformed(
                    format!("'{formal}' is not a valid parameter name in '{name}'"),
                    line,
                ));
            }
            if formals[..index].contains(formal) {
                return Err(EvaluationError::malformed(
                    format!("parameter '{formal}' is declared twice in '{name}'"),
                    line,
                ));
            }
        }
        if body.is_empty() {
            return Err(EvaluationError::malformed(
                format!("function '{name}' has an empty body"),
                line,
            ));
        }

        let substitution = Substitution::new(formals.as_slice()).map_err(|e| {
            EvaluationError::invalid_state(format!("cannot compile formals of '{name}': {e}"))
        })?;

        Ok(Self {
            name,
            formals,
            body,
            substitution,
        })
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal parameter names in declaration order
    pub fn formals(&self) -> &[String] {
        &self.formals
    }

    /// Unparsed body text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Number of formals
    pub fn arity(&self) -> usize {
        self.formals.len()
    }

    /// Body text with the formals replaced by `actuals`
    pub fn instantiate<S: AsRef<str>>(&self, actuals: &[S]) -> String {
        self.substitution.apply(&self.body, actuals)
    }
}

impl std::fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}) = {}", self.name, self.formals.join(", "), self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_definition() {
        let def = FunctionDef::parse(" power(x, n) = if n == 0 then 1 else x * power(x, n - 1) ", None)
            .unwrap();
        assert_eq!(def.name(), "power");
        assert_eq!(def.formals(), ["x".to_string(), "n".to_string()]);
        assert_eq!(def.body(), "if n == 0 then 1 else x * power(x, n - 1)");
        assert_eq!(
            def.to_string(),
            "power(x, n) = if n == 0 then 1 else x * power(x, n - 1)"
        );
    }

    #[test]
    fn test_zero_formals() {
        let def = FunctionDef::parse("seven() = 7", None).unwrap();
        assert_eq!(def.arity(), 0);
        assert_eq!(def.instantiate::<&str>(&[]), "7");
    }

    #[test]
    fn test_instantiate() {
        let def = FunctionDef::parse("f(n) = if n == 0 then 1 else n * f(n - 1)", None).unwrap();
        assert_eq!(
            def.instantiate(&["3"]),
            "if 3 == 0 then 1 else 3 * f(3 - 1)"
        );
    }

    #[test]
    fn test_malformed_definitions() {
        let cases = [
            "f(x) x + 1",
            "f x) = x",
            "f(x = x",
            "f = (x)",
            "(x) = x",
            "1f(x) = x",
            "if(x) = x",
            "f(x y) = x",
            "f(x,) = x",
            "f(x, x) = x",
            "f(x) =   ",
            "f(x) + 1 = x",
        ];
        for case in cases {
            let result = FunctionDef::parse(case, Some(3));
            assert!(
                matches!(
                    result,
                    Err(EvaluationError::MalformedProgram { line: Some(3), .. })
                ),
                "expected '{case}' to be rejected, got {result:?}"
            );
        }
    }
}
