use std::cmp::Ordering;

use miette::{Result, miette};

use crate::{Row, Value, sql::analyzer::AnalyzedExpression};

pub mod expression;
pub mod predicate;

pub use expression::ExpressionEvaluator;
pub use predicate::PredicateEvaluator;

/// The core trait that both evaluators must implement.
///
/// - `T = Value` for `ExpressionEvaluator` (math, strings)
/// - `T = bool` for `PredicateEvaluator` (WHERE clauses)
pub trait Evaluator<T> {
    fn evaluate(&self, analyzed_expr: &AnalyzedExpression, row: &Row) -> Result<T>;
}

fn arithmetic(
    left: &Value,
    right: &Value,
    name: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => int_op(*a, *b)
            .map(Value::Int64)
            .ok_or_else(|| miette!("Integer overflow in {a} {name} {b}")),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(float_op(*a, *b))),
        (Value::Int64(a), Value::Float64(b)) => Ok(Value::Float64(float_op(*a as f64, *b))),
        (Value::Float64(a), Value::Int64(b)) => Ok(Value::Float64(float_op(*a, *b as f64))),
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        _ => Err(miette!("Cannot apply {name} to {:?} and {:?}", left, right)),
    }
}

pub fn values_add(left: &Value, right: &Value) -> Result<Value> {
    arithmetic(left, right, "+", i64::checked_add, |a, b| a + b)
}

pub fn values_subtract(left: &Value, right: &Value) -> Result<Value> {
    arithmetic(left, right, "-", i64::checked_sub, |a, b| a - b)
}

pub fn values_multiply(left: &Value, right: &Value) -> Result<Value> {
    arithmetic(left, right, "*", i64::checked_mul, |a, b| a * b)
}

pub fn values_divide(left: &Value, right: &Value) -> Result<Value> {
    let is_zero = match right {
        Value::Int64(b) => *b == 0,
        Value::Float64(b) => *b == 0.0,
        _ => false,
    };
    if is_zero && !matches!(left, Value::Null) {
        return Err(miette!("Division by zero"));
    }

    arithmetic(left, right, "/", i64::checked_div, |a, b| a / b)
}

/// SQL equality: NULL on either side gives NULL.
pub fn values_equal(left: &Value, right: &Value) -> Value {
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        return Value::Null;
    }

    let result = match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => a == b,
        (Value::Float64(a), Value::Float64(b)) => (a - b).abs() < f64::EPSILON,
        (Value::Int64(a), Value::Float64(b)) => (*a as f64 - b).abs() < f64::EPSILON,
        (Value::Float64(a), Value::Int64(b)) => (a - *b as f64).abs() < f64::EPSILON,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    };
    Value::Bool(result)
}

/// Orders two values of comparable types. `None` when either is NULL.
pub fn values_compare(left: &Value, right: &Value) -> Result<Option<Ordering>> {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return Ok(None),
        (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
        (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
        (Value::Int64(a), Value::Float64(b)) => (*a as f64).total_cmp(b),
        (Value::Float64(a), Value::Int64(b)) => a.total_cmp(&(*b as f64)),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => {
            return Err(miette!(
                "Invalid comparison between {:?} and {:?}",
                left,
                right
            ));
        }
    };
    Ok(Some(ordering))
}

/// `LIKE` matching: `%` is any run of characters, `_` exactly one.
/// Case-sensitive.
pub fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    // Last '%' seen, and the text position it is currently matched up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '_' || c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
