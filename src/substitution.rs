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

//! Textual substitution of formal parameters
//!
//! Every whole-word occurrence of a formal is replaced by the corresponding
//! actual text. Formals are replaced one after another in declaration order,
//! so text introduced for an earlier formal is visible to later ones.

use regex::{NoExpand, Regex};

/// Word-boundary patterns for the formals of one function
#[derive(Debug, Clone)]
pub struct Substitution {
    patterns: Vec<Regex>,
}

impl Substitution {
    /// Compile a pattern for each formal
    pub fn new<S: AsRef<str>>(formals: &[S]) -> Result<Self, regex::Error> {
        let patterns = formals
            .iter()
            .map(|formal| Regex::new(&format!(r"\b{}\b", regex::escape(formal.as_ref()))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Number of formals
    pub fn arity(&self) -> usize {
        self.patterns.len()
    }

    /// Replace formals with actuals
    ///
    /// Formals without an actual stay in the text; surplus actuals are unused.
    pub fn apply<S: AsRef<str>>(&self, body: &str, actuals: &[S]) -> String {
        let mut text = body.to_string();
        for (pattern, actual) in self.patterns.iter().zip(actuals) {
            if let std::borrow::Cow::Owned(replaced) =
                pattern.replace_all(&text, NoExpand(actual.as_ref()))
            {
                text = replaced;
            }
        }
        text
    }
}

/// One-shot substitution without a precompiled [`Substitution`]
pub fn substitute<F, A>(body: &str, formals: &[F], actuals: &[A]) -> Result<String, regex::Error>
where
    F: AsRef<str>,
    A: AsRef<str>,
{
    Ok(Substitution::new(formals)?.apply(body, actuals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replaces_whole_words_only() {
        let result = substitute("x * xs + max(x)", &["x"], &["3"]).unwrap();
        assert_eq!(result, "3 * xs + max(3)");
    }

    #[test]
    fn test_replacement_is_sequential() {
        let result = substitute("x + y", &["x", "y"], &["y", "1"]).unwrap();
        assert_eq!(result, "1 + 1");
    }

    #[test]
    fn test_replacement_text_is_literal() {
        let result = substitute("f(n)", &["n"], &["$0 - 1"]).unwrap();
        assert_eq!(result, "f($0 - 1)");
    }

    #[test]
    fn test_arity_mismatch() {
        let substitution = Substitution::new(&["a", "b"]).unwrap();
        assert_eq!(substitution.arity(), 2);
        assert_eq!(substitution.apply("a + b", &["1"]), "1 + b");
        assert_eq!(substitution.apply("a + b", &["1", "2", "3"]), "1 + 2");
    }
}
