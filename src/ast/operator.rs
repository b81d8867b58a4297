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

//! Operator definitions for program expressions
//!
//! Arithmetic, logical and comparison operators are kept in separate enums
//! because they live in different term kinds: arithmetic operators combine
//! integer terms, logical operators combine boolean terms and comparison
//! operators turn two integer terms into a boolean term.

use std::fmt;

/// Arithmetic operators of a `Primitive` term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArithmeticOperator {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Truncating integer division (/)
    Divide,
    /// Remainder (%)
    Modulo,
}

/// Logical connectives of a `BoolOp` term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalOperator {
    /// Conjunction (and)
    And,
    /// Disjunction (or)
    Or,
}

/// Relational operators of a `Compare` term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonOperator {
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Equality (==)
    Equal,
    /// Inequality (!=)
    NotEqual,
}

/// Why an arithmetic operator could not produce a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticFailure {
    /// Right operand of `/` or `%` was zero
    DivisionByZero,
    /// Result does not fit in a 64-bit signed integer
    Overflow,
}

impl ArithmeticOperator {
    /// Get the symbol representation of this operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }

    /// Apply the operator with checked 64-bit arithmetic.
    ///
    /// Division and remainder truncate toward zero.
    pub fn apply(self, left: i64, right: i64) -> Result<i64, ArithmeticFailure> {
        if matches!(self, Self::Divide | Self::Modulo) && right == 0 {
            return Err(ArithmeticFailure::DivisionByZero);
        }

        let result = match self {
            Self::Add => left.checked_add(right),
            Self::Subtract => left.checked_sub(right),
            Self::Multiply => left.checked_mul(right),
            Self::Divide => left.checked_div(right),
            Self::Modulo => left.checked_rem(right),
        };

        result.ok_or(ArithmeticFailure::Overflow)
    }
}

impl LogicalOperator {
    /// Get the keyword of this operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Apply the connective to two already evaluated operands
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
        }
    }
}

impl ComparisonOperator {
    /// Get the symbol representation of this operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }

    /// Compare two integers
    pub fn apply(self, left: i64, right: i64) -> bool {
        match self {
            Self::LessThan => left < right,
            Self::LessThanOrEqual => left <= right,
            Self::GreaterThan => left > right,
            Self::GreaterThanOrEqual => left >= right,
            Self::Equal => left == right,
            Self::NotEqual => left != right,
        }
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for ArithmeticFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => f.write_str("division by zero"),
            Self::Overflow => f.write_str("integer overflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(ArithmeticOperator::Divide.apply(7, 2), Ok(3));
        assert_eq!(ArithmeticOperator::Divide.apply(-7, 2), Ok(-3));
        assert_eq!(ArithmeticOperator::Modulo.apply(-7, 2), Ok(-1));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            ArithmeticOperator::Divide.apply(5, 0),
            Err(ArithmeticFailure::DivisionByZero)
        );
        assert_eq!(
            ArithmeticOperator::Modulo.apply(5, 0),
            Err(ArithmeticFailure::DivisionByZero)
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            ArithmeticOperator::Multiply.apply(i64::MAX, 2),
            Err(ArithmeticFailure::Overflow)
        );
        assert_eq!(
            ArithmeticOperator::Divide.apply(i64::MIN, -1),
            Err(ArithmeticFailure::Overflow)
        );
    }

    #[test]
    fn test_comparisons() {
        assert!(ComparisonOperator::LessThanOrEqual.apply(3, 3));
        assert!(!ComparisonOperator::GreaterThan.apply(3, 3));
        assert!(ComparisonOperator::NotEqual.apply(1, 2));
    }
}
