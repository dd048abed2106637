use std::cmp::Ordering;

use miette::Result;

use crate::{
    Row, Value,
    sql::{
        analyzer::AnalyzedExpression,
        evaluator::{
            Evaluator, like_match, values_add, values_compare, values_divide, values_equal,
            values_multiply, values_subtract,
        },
        parser::{IsPredicate, Operator},
    },
};

pub struct ExpressionEvaluator;

impl Evaluator<Value> for ExpressionEvaluator {
    fn evaluate(&self, expression: &AnalyzedExpression, row: &Row) -> Result<Value> {
        match expression {
            AnalyzedExpression::Literal(value) => Ok(value.clone()),
            AnalyzedExpression::Column(column, _) => {
                Ok(row.get_value(column.index).cloned().unwrap_or(Value::Null))
            }
            AnalyzedExpression::Not(inner) => Ok(match self.evaluate(inner, row)? {
                Value::Bool(b) => Value::Bool(!b),
                _ => Value::Null,
            }),
            AnalyzedExpression::IsPredicate {
                expr,
                predicate,
                negated,
            } => {
                let value = self.evaluate(expr, row)?;
                let matched = match predicate {
                    IsPredicate::Null => value == Value::Null,
                    IsPredicate::True => value == Value::Bool(true),
                    IsPredicate::False => value == Value::Bool(false),
                };
                Ok(Value::Bool(matched != *negated))
            }
            AnalyzedExpression::BinaryExpr {
                left, op, right, ..
            } => {
                // Short-circuit: the right side is not evaluated when the
                // left decides the result.
                match op {
                    Operator::And => return self.evaluate_and(left, right, row),
                    Operator::Or => return self.evaluate_or(left, right, row),
                    _ => {}
                }

                let left_val = self.evaluate(left, row)?;
                let right_val = self.evaluate(right, row)?;

                match op {
                    Operator::Add => values_add(&left_val, &right_val),
                    Operator::Subtract => values_subtract(&left_val, &right_val),
                    Operator::Multiply => values_multiply(&left_val, &right_val),
                    Operator::Divide => values_divide(&left_val, &right_val),

                    Operator::Equal => Ok(values_equal(&left_val, &right_val)),
                    Operator::NotEqual => Ok(match values_equal(&left_val, &right_val) {
                        Value::Bool(b) => Value::Bool(!b),
                        other => other,
                    }),
                    Operator::GreaterThan => compare(&left_val, &right_val, Ordering::is_gt),
                    Operator::GreaterThanEqual => compare(&left_val, &right_val, Ordering::is_ge),
                    Operator::LessThan => compare(&left_val, &right_val, Ordering::is_lt),
                    Operator::LessThanEqual => compare(&left_val, &right_val, Ordering::is_le),

                    Operator::Like | Operator::NotLike => Ok(match (&left_val, &right_val) {
                        (Value::Text(text), Value::Text(pattern)) => {
                            Value::Bool(like_match(text, pattern) == (*op == Operator::Like))
                        }
                        _ => Value::Null,
                    }),

                    Operator::And | Operator::Or => unreachable!("handled above"),
                }
            }
        }
    }
}

fn compare(left: &Value, right: &Value, test: fn(Ordering) -> bool) -> Result<Value> {
    Ok(values_compare(left, right)?.map_or(Value::Null, |ord| Value::Bool(test(ord))))
}

impl ExpressionEvaluator {
    /// SQL truth value: `None` is UNKNOWN.
    fn truth(&self, val: &Value) -> Option<bool> {
        match val {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Three-valued AND. FALSE wins over UNKNOWN.
    fn evaluate_and(
        &self,
        left: &AnalyzedExpression,
        right: &AnalyzedExpression,
        row: &Row,
    ) -> Result<Value> {
        let left_val = self.truth(&self.evaluate(left, row)?);
        if left_val == Some(false) {
            return Ok(Value::Bool(false));
        }

        let right_val = self.truth(&self.evaluate(right, row)?);
        Ok(match (left_val, right_val) {
            (_, Some(false)) => Value::Bool(false),
            (Some(true), Some(true)) => Value::Bool(true),
            _ => Value::Null,
        })
    }

    /// Three-valued OR. TRUE wins over UNKNOWN.
    fn evaluate_or(
        &self,
        left: &AnalyzedExpression,
        right: &AnalyzedExpression,
        row: &Row,
    ) -> Result<Value> {
        let left_val = self.truth(&self.evaluate(left, row)?);
        if left_val == Some(true) {
            return Ok(Value::Bool(true));
        }

        let right_val = self.truth(&self.evaluate(right, row)?);
        Ok(match (left_val, right_val) {
            (_, Some(true)) => Value::Bool(true),
            (Some(false), Some(false)) => Value::Bool(false),
            _ => Value::Null,
        })
    }
}
