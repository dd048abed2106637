use miette::{Result, miette};

use crate::{
    Row, Value,
    sql::{
        analyzer::AnalyzedExpression,
        evaluator::{Evaluator, expression::ExpressionEvaluator},
    },
};

/// Evaluates a WHERE clause. NULL counts as false.
pub struct PredicateEvaluator;

impl Evaluator<bool> for PredicateEvaluator {
    fn evaluate(&self, expression: &AnalyzedExpression, row: &Row) -> Result<bool> {
        let expr_evaluator = ExpressionEvaluator;
        let value = expr_evaluator.evaluate(expression, row)?;

        // Convert the result to a strict Boolean
        match value {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            _ => Err(miette!(
                "WHERE clause must evaluate to a boolean, got {:?}",
                value
            )),
        }
    }
}
