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

//! Evaluation engine
//!
//! Reduction runs on an explicit work stack: each [`Task`] either pushes more
//! tasks or combines values from the value stack. Native recursion never
//! grows with the depth of the program's own recursion.

use super::error::{EvaluationError, EvaluationResult};
use crate::ast::{
    Arguments, ArithmeticOperator, BoolTerm, ComparisonOperator, Expression, LogicalOperator, Term,
};
use crate::config::EngineConfig;
use crate::diagnostics::DiagnosticBuilder;
use crate::model::Value;
use crate::parser::ExpressionParser;
use crate::program::Program;

/// Evaluator for one program under one configuration
#[derive(Debug, Clone)]
pub struct Evaluator {
    program: Program,
    config: EngineConfig,
    parser: ExpressionParser,
}

impl Evaluator {
    /// Load program text
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recfun::config::EngineConfig;
    /// use recfun::evaluator::Evaluator;
    /// use recfun::model::Value;
    ///
    /// let evaluator = Evaluator::new("h(10) where h(x) = x * x", EngineConfig::default())?;
    /// assert_eq!(evaluator.evaluate()?, Value::Integer(100));
    /// # Ok::<(), recfun::evaluator::EvaluationError>(())
    /// ```
    pub fn new(text: &str, config: EngineConfig) -> EvaluationResult<Self> {
        Ok(Self::from_program(Program::parse(text)?, config))
    }

    /// Create an evaluator for an already loaded program
    pub fn from_program(program: Program, config: EngineConfig) -> Self {
        let parser = ExpressionParser::new(program.parser_config(&config));
        Self {
            program,
            config,
            parser,
        }
    }

    /// The loaded program
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate the program head
    ///
    /// Failures are logged here and returned; no other layer reports them.
    pub fn evaluate(&self) -> EvaluationResult<Value> {
        let head = self.program.head();
        log::debug!("evaluating '{}' {}", head, self.config.strategy);

        match self.evaluate_expression(head) {
            Ok(value) => {
                log::debug!("'{head}' evaluated to {value}");
                Ok(value)
            }
            Err(error) => {
                log::error!("evaluation of '{head}' failed: {error}");
                Err(error)
            }
        }
    }

    /// Evaluate expression text against this program's functions
    pub fn evaluate_expression(&self, text: &str) -> EvaluationResult<Value> {
        Machine::new(self).run(Task::Source(text.to_string()))
    }

    /// Evaluate an already parsed expression
    pub fn evaluate_parsed(&self, expression: Expression) -> EvaluationResult<Value> {
        let task = match expression {
            Expression::Term(term) => Task::Term(term),
            Expression::Bool(condition) => Task::Bool(condition),
        };
        Machine::new(self).run(task)
    }

    /// Parse expression text with this program's parser configuration
    pub fn parse(&self, text: &str) -> EvaluationResult<Expression> {
        self.parser
            .parse(text)
            .map_err(|error| EvaluationError::from_parse(error, text))
    }
}

#[derive(Debug)]
enum Task {
    /// Reduce a term to an integer
    Term(Term),
    /// Reduce a boolean term
    Bool(BoolTerm),
    /// Parse text, then reduce it
    Source(String),
    Arithmetic(ArithmeticOperator),
    Not,
    Logical(LogicalOperator),
    Compare(ComparisonOperator),
    /// Pick a branch once the condition is on the value stack
    Branch {
        then_branch: Term,
        else_branch: Term,
    },
    /// Call with `arity` evaluated actuals on the value stack
    Invoke { name: String, arity: usize },
    /// Leave a function body
    Return,
}

struct Machine<'e> {
    evaluator: &'e Evaluator,
    tasks: Vec<Task>,
    values: Vec<Value>,
    depth: usize,
}

impl<'e> Machine<'e> {
    fn new(evaluator: &'e Evaluator) -> Self {
        Self {
            evaluator,
            tasks: Vec::new(),
            values: Vec::new(),
            depth: 0,
        }
    }

    fn config(&self) -> &'e EngineConfig {
        &self.evaluator.config
    }

    fn run(mut self, task: Task) -> EvaluationResult<Value> {
        self.push(task)?;

        while let Some(task) = self.tasks.pop() {
            self.step(task)?;
        }

        let result = self.pop()?;
        if !self.values.is_empty() {
            return Err(EvaluationError::invalid_state(format!(
                "{} value(s) left after evaluation",
                self.values.len()
            )));
        }
        Ok(result)
    }

    fn push(&mut self, task: Task) -> EvaluationResult<()> {
        let limit = self.config().max_pending_tasks;
        if self.tasks.len() >= limit {
            return Err(EvaluationError::ResourceExhausted {
                resource: "pending tasks",
                limit,
            });
        }
        self.tasks.push(task);
        Ok(())
    }

    fn step(&mut self, task: Task) -> EvaluationResult<()> {
        match task {
            Task::Term(term) => self.reduce_term(term),
            Task::Bool(condition) => self.reduce_condition(condition),
            Task::Source(text) => match self.evaluator.parse(&text)? {
                Expression::Term(term) => self.push(Task::Term(term)),
                Expression::Bool(condition) => self.push(Task::Bool(condition)),
            },
            Task::Arithmetic(op) => {
                let right = self.pop_integer(op.symbol())?;
                let left = self.pop_integer(op.symbol())?;
                let result = op
                    .apply(left, right)
                    .map_err(|failure| EvaluationError::ArithmeticFault {
                        op,
                        left,
                        right,
                        failure,
                    })?;
                self.values.push(Value::Integer(result));
                Ok(())
            }
            Task::Not => {
                let operand = self.pop_boolean("not")?;
                self.values.push(Value::Boolean(!operand));
                Ok(())
            }
            Task::Logical(op) => {
                let right = self.pop_boolean(op.symbol())?;
                let left = self.pop_boolean(op.symbol())?;
                self.values.push(Value::Boolean(op.apply(left, right)));
                Ok(())
            }
            Task::Compare(op) => {
                let right = self.pop_integer(op.symbol())?;
                let left = self.pop_integer(op.symbol())?;
                self.values.push(Value::Boolean(op.apply(left, right)));
                Ok(())
            }
            Task::Branch {
                then_branch,
                else_branch,
            } => {
                let branch = if self.pop_boolean("if condition")? {
                    then_branch
                } else {
                    else_branch
                };
                self.push(Task::Term(branch))
            }
            Task::Invoke { name, arity } => {
                let start = self.values.len().checked_sub(arity).ok_or_else(|| {
                    EvaluationError::invalid_state(format!("missing arguments for '{name}'"))
                })?;
                let actuals = self
                    .values
                    .split_off(start)
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| match value {
                        Value::Integer(_) => Ok(value.to_literal()),
                        Value::Boolean(_) => Err(EvaluationError::TypeMismatch {
                            expected: "integer",
                            actual: value.type_name(),
                            context: format!("argument {} of '{name}'", index + 1),
                        }),
                    })
                    .collect::<EvaluationResult<Vec<_>>>()?;
                self.enter(&name, &actuals)
            }
            Task::Return => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or_else(|| EvaluationError::invalid_state("return without a call"))?;
                Ok(())
            }
        }
    }

    fn reduce_term(&mut self, term: Term) -> EvaluationResult<()> {
        match term {
            Term::Const(value) => {
                self.values.push(Value::Integer(value));
                Ok(())
            }
            Term::Primitive { op, left, right } => {
                self.push(Task::Arithmetic(op))?;
                self.push(Task::Term(*right))?;
                self.push(Task::Term(*left))
            }
            Term::IfThenElse {
                condition,
                then_branch,
                else_branch,
            } => {
                self.push(Task::Branch {
                    then_branch: *then_branch,
                    else_branch: *else_branch,
                })?;
                self.push(Task::Bool(*condition))
            }
            Term::Call { name, arguments } => match arguments {
                Arguments::Values(terms) => {
                    self.push(Task::Invoke {
                        name,
                        arity: terms.len(),
                    })?;
                    for term in terms.into_iter().rev() {
                        self.push(Task::Term(term))?;
                    }
                    Ok(())
                }
                Arguments::Names(texts) => self.enter(&name, &texts),
            },
        }
    }

    fn reduce_condition(&mut self, condition: BoolTerm) -> EvaluationResult<()> {
        match condition {
            BoolTerm::Not(operand) => {
                self.push(Task::Not)?;
                self.push(Task::Bool(*operand))
            }
            BoolTerm::BoolOp { op, left, right } => {
                self.push(Task::Logical(op))?;
                self.push(Task::Bool(*right))?;
                self.push(Task::Bool(*left))
            }
            BoolTerm::Compare { op, left, right } => {
                self.push(Task::Compare(op))?;
                self.push(Task::Term(*right))?;
                self.push(Task::Term(*left))
            }
        }
    }

    /// Substitute the actuals into the body of `name` and schedule it
    fn enter(&mut self, name: &str, actuals: &[String]) -> EvaluationResult<()> {
        let config = self.config();
        let def = self.evaluator.program.functions().lookup(name)?;

        if actuals.len() != def.arity() {
            let warning = DiagnosticBuilder::arity_mismatch(name, def.arity(), actuals.len()).build();
            log::warn!("{}", warning.message);
        }

        if self.depth >= config.max_call_depth {
            return Err(EvaluationError::StackExhausted {
                limit: config.max_call_depth,
            });
        }

        log::trace!("call {}({}) at depth {}", name, actuals.join(", "), self.depth);
        let body = def.instantiate(actuals);
        if body.len() > config.max_expression_length {
            return Err(EvaluationError::ResourceExhausted {
                resource: "expression length",
                limit: config.max_expression_length,
            });
        }

        if config.verbose {
            log::info!("evaluating: {body}");
        } else {
            log::trace!("evaluating: {body}");
        }

        self.depth += 1;
        self.push(Task::Return)?;
        self.push(Task::Source(body))
    }

    fn pop(&mut self) -> EvaluationResult<Value> {
        self.values
            .pop()
            .ok_or_else(|| EvaluationError::invalid_state("value stack underflow"))
    }

    fn pop_integer(&mut self, context: &str) -> EvaluationResult<i64> {
        let value = self.pop()?;
        value.as_integer().ok_or_else(|| EvaluationError::TypeMismatch {
            expected: "integer",
            actual: value.type_name(),
            context: format!("operand of '{context}'"),
        })
    }

    fn pop_boolean(&mut self, context: &str) -> EvaluationResult<bool> {
        let value = self.pop()?;
        value.as_boolean().ok_or_else(|| EvaluationError::TypeMismatch {
            expected: "boolean",
            actual: value.type_name(),
            context: format!("operand of '{context}'"),
        })
    }
}
