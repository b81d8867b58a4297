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

//! Expression tree definitions

use super::operator::{ArithmeticOperator, ComparisonOperator, LogicalOperator};
use std::fmt;

/// Integer-valued expression node
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    /// Integer literal
    Const(i64),

    /// Binary arithmetic operation
    Primitive {
        /// The operator
        op: ArithmeticOperator,
        /// Left operand
        left: Box<Term>,
        /// Right operand
        right: Box<Term>,
    },

    /// Conditional (if-then-else)
    IfThenElse {
        /// Condition
        condition: Box<BoolTerm>,
        /// Then branch
        then_branch: Box<Term>,
        /// Else branch
        else_branch: Box<Term>,
    },

    /// Call of a registered function
    Call {
        /// Function name
        name: String,
        /// Actual arguments, shaped by the argument strategy
        arguments: Arguments,
    },
}

/// Actual arguments of a call site
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Arguments {
    /// Parsed argument terms, evaluated before the call
    Values(Vec<Term>),
    /// Raw argument text, substituted unevaluated
    Names(Vec<String>),
}

/// Boolean-valued expression node
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolTerm {
    /// Logical negation
    Not(Box<BoolTerm>),

    /// Logical connective
    BoolOp {
        /// The operator
        op: LogicalOperator,
        /// Left operand
        left: Box<BoolTerm>,
        /// Right operand
        right: Box<BoolTerm>,
    },

    /// Integer comparison
    Compare {
        /// The operator
        op: ComparisonOperator,
        /// Left operand
        left: Box<Term>,
        /// Right operand
        right: Box<Term>,
    },
}

/// A parsed program head or function body
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    /// Integer-valued expression
    Term(Term),
    /// Boolean-valued expression
    Bool(BoolTerm),
}

impl Term {
    /// Create a literal
    pub fn constant(value: i64) -> Self {
        Self::Const(value)
    }

    /// Create a binary arithmetic operation
    pub fn primitive(op: ArithmeticOperator, left: Term, right: Term) -> Self {
        Self::Primitive {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a conditional
    pub fn if_then_else(condition: BoolTerm, then_branch: Term, else_branch: Term) -> Self {
        Self::IfThenElse {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// Create a call
    pub fn call(name: impl Into<String>, arguments: Arguments) -> Self {
        Self::Call {
            name: name.into(),
            arguments,
        }
    }

    /// Whether the term renders as a single operand without grouping
    pub fn is_atomic(&self) -> bool {
        matches!(self, Self::Const(_) | Self::Call { .. })
    }
}

impl Arguments {
    /// Number of actual arguments
    pub fn len(&self) -> usize {
        match self {
            Self::Values(terms) => terms.len(),
            Self::Names(texts) => texts.len(),
        }
    }

    /// Whether the call has no arguments
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BoolTerm {
    /// Create a negation
    pub fn not(operand: BoolTerm) -> Self {
        Self::Not(Box::new(operand))
    }

    /// Create a logical connective
    pub fn bool_op(op: LogicalOperator, left: BoolTerm, right: BoolTerm) -> Self {
        Self::BoolOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a comparison
    pub fn compare(op: ComparisonOperator, left: Term, right: Term) -> Self {
        Self::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// Rendering groups every compound operand so the output re-parses to the
// same tree regardless of associativity.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(value) => write!(f, "{value}"),
            Self::Primitive { op, left, right } => {
                write_operand(f, left)?;
                write!(f, " {op} ")?;
                write_operand(f, right)
            }
            Self::IfThenElse {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "if {condition} then {then_branch} else {else_branch}"),
            Self::Call { name, arguments } => {
                write!(f, "{name}(")?;
                match arguments {
                    Arguments::Values(terms) => {
                        for (i, term) in terms.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{term}")?;
                        }
                    }
                    Arguments::Names(texts) => f.write_str(&texts.join(", "))?,
                }
                f.write_str(")")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, term: &Term) -> fmt::Result {
    if term.is_atomic() {
        write!(f, "{term}")
    } else {
        write!(f, "({term})")
    }
}

impl fmt::Display for BoolTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not(operand) => match operand.as_ref() {
                BoolTerm::Compare { .. } | BoolTerm::Not(_) => write!(f, "not {operand}"),
                BoolTerm::BoolOp { .. } => write!(f, "not ({operand})"),
            },
            Self::BoolOp { op, left, right } => {
                write!(f, "{left} {op} ")?;
                match right.as_ref() {
                    BoolTerm::BoolOp { .. } => write!(f, "({right})"),
                    _ => write!(f, "{right}"),
                }
            }
            Self::Compare { op, left, right } => {
                write_operand(f, left)?;
                write!(f, " {op} ")?;
                write_operand(f, right)
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(term) => write!(f, "{term}"),
            Self::Bool(condition) => write!(f, "{condition}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_compound_operands() {
        let term = Term::primitive(
            ArithmeticOperator::Multiply,
            Term::constant(2),
            Term::primitive(ArithmeticOperator::Add, Term::constant(3), Term::constant(4)),
        );
        assert_eq!(term.to_string(), "2 * (3 + 4)");
    }

    #[test]
    fn test_display_conditional() {
        let term = Term::if_then_else(
            BoolTerm::not(BoolTerm::compare(
                ComparisonOperator::Equal,
                Term::constant(1),
                Term::constant(-1),
            )),
            Term::call("f", Arguments::Names(vec!["x - 1".to_string()])),
            Term::constant(0),
        );
        assert_eq!(term.to_string(), "if not 1 == -1 then f(x - 1) else 0");
    }

    #[test]
    fn test_argument_count() {
        let args = Arguments::Values(vec![Term::constant(1), Term::constant(2)]);
        assert_eq!(args.len(), 2);
        assert!(Arguments::Names(vec![]).is_empty());
    }
}
