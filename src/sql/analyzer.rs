use miette::{Result, miette};

use crate::{
    DataType, Schema, Value,
    sql::parser::{
        Expression, IsPredicate, Literal, Operator, SelectList, SelectStatement, SelectTarget,
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnRef {
    /// Position in the table schema.
    pub index: usize,
}

/// An expression with its column references resolved against a table.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzedExpression {
    Literal(Value),
    Column(ColumnRef, DataType),
    BinaryExpr {
        left: Box<AnalyzedExpression>,
        op: Operator,
        right: Box<AnalyzedExpression>,
        /// `None` when both operands are NULL literals.
        return_type: Option<DataType>,
    },
    Not(Box<AnalyzedExpression>),
    IsPredicate {
        expr: Box<AnalyzedExpression>,
        predicate: IsPredicate,
        negated: bool,
    },
}

impl AnalyzedExpression {
    /// Get the type of the expression, `None` for a bare NULL.
    pub fn get_type(&self) -> Option<DataType> {
        match self {
            AnalyzedExpression::Literal(value) => value.data_type(),
            AnalyzedExpression::Column(_, column_type) => Some(*column_type),
            AnalyzedExpression::BinaryExpr { return_type, .. } => *return_type,
            AnalyzedExpression::Not(_) | AnalyzedExpression::IsPredicate { .. } => {
                Some(DataType::Bool)
            }
        }
    }

    fn collect_columns(&self, out: &mut Vec<usize>) {
        match self {
            AnalyzedExpression::Literal(_) => {}
            AnalyzedExpression::Column(column, _) => out.push(column.index),
            AnalyzedExpression::BinaryExpr { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            AnalyzedExpression::Not(expr) | AnalyzedExpression::IsPredicate { expr, .. } => {
                expr.collect_columns(out)
            }
        }
    }
}

/// One output column of a SELECT.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// A bare column: its bound text is passed through as-is.
    Column { name: String, index: usize },
    /// Anything else is evaluated per row.
    Computed {
        name: String,
        expr: AnalyzedExpression,
    },
}

impl Projection {
    pub fn name(&self) -> &str {
        match self {
            Projection::Column { name, .. } | Projection::Computed { name, .. } => name,
        }
    }
}

/// A resolved single-table SELECT: scan, filter, project, limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub table_name: String,
    pub projections: Vec<Projection>,
    pub filter: Option<AnalyzedExpression>,
    pub limit: Option<usize>,
}

impl SelectPlan {
    /// Schema positions the plan reads, ascending and without repeats.
    /// Only these need to be decoded.
    pub fn referenced_columns(&self) -> Vec<usize> {
        let mut columns = Vec::new();

        for projection in &self.projections {
            match projection {
                Projection::Column { index, .. } => columns.push(*index),
                Projection::Computed { expr, .. } => expr.collect_columns(&mut columns),
            }
        }
        if let Some(filter) = &self.filter {
            filter.collect_columns(&mut columns);
        }

        columns.sort_unstable();
        columns.dedup();
        columns
    }
}

/// Resolves a parsed SELECT against the schema of its table.
pub struct Analyzer<'a> {
    schema: &'a Schema,
}

impl<'a> Analyzer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn analyze(&self, statement: &SelectStatement) -> Result<SelectPlan> {
        let filter = statement
            .where_clause
            .as_ref()
            .map(|expr| self.analyze_where(expr))
            .transpose()?;

        let projections = self.analyze_projection(&statement.select_list)?;

        Ok(SelectPlan {
            table_name: statement.from_clause.table_name.to_string(),
            projections,
            filter,
            limit: statement.limit,
        })
    }

    fn analyze_projection(&self, select_list: &SelectList) -> Result<Vec<Projection>> {
        let mut projections = Vec::new();

        for item in &select_list.0 {
            match item {
                SelectTarget::Star => {
                    projections.extend(self.schema.columns.iter().enumerate().map(
                        |(index, column)| Projection::Column {
                            name: column.name.clone(),
                            index,
                        },
                    ));
                }
                SelectTarget::Expression { expr, alias } => {
                    let analyzed_expr = self.bind_expression(expr)?;
                    let name = match alias {
                        Some(alias) => alias.to_string(),
                        None => match &analyzed_expr {
                            AnalyzedExpression::Column(column, _) => {
                                self.schema.columns[column.index].name.clone()
                            }
                            _ => expr.to_column_name(),
                        },
                    };

                    projections.push(match analyzed_expr {
                        AnalyzedExpression::Column(column, _) => Projection::Column {
                            name,
                            index: column.index,
                        },
                        expr => Projection::Computed { name, expr },
                    });
                }
            }
        }

        Ok(projections)
    }

    fn analyze_where(&self, where_expr: &Expression) -> Result<AnalyzedExpression> {
        let analyzed_expr = self.bind_expression(where_expr)?;

        match analyzed_expr.get_type() {
            Some(DataType::Bool) | None => Ok(analyzed_expr),
            Some(other) => Err(miette!(
                "WHERE clause must be a boolean condition, got {other}"
            )),
        }
    }

    pub fn bind_expression(&self, expr: &Expression) -> Result<AnalyzedExpression> {
        match expr {
            Expression::BinaryOp { left, op, right } => {
                let left = self.bind_expression(left)?;
                let right = self.bind_expression(right)?;

                let return_type = self.resolve_binary_op(left.get_type(), *op, right.get_type())?;

                Ok(AnalyzedExpression::BinaryExpr {
                    left: Box::new(left),
                    op: *op,
                    right: Box::new(right),
                    return_type,
                })
            }
            Expression::Not(inner) => {
                let inner = self.bind_expression(inner)?;
                match inner.get_type() {
                    Some(DataType::Bool) | None => Ok(AnalyzedExpression::Not(Box::new(inner))),
                    Some(other) => Err(miette!("NOT requires a boolean operand, got {other}")),
                }
            }
            Expression::Identifier(name) => {
                let index = self
                    .schema
                    .get_column_index(name)
                    .ok_or_else(|| miette!("Column {name} could not be found"))?;
                let column = &self.schema.columns[index];

                Ok(AnalyzedExpression::Column(
                    ColumnRef { index },
                    column.column_type.data_type(),
                ))
            }
            Expression::Literal(literal) => Ok(AnalyzedExpression::Literal(match literal {
                Literal::Int64(i) => Value::Int64(*i),
                Literal::Float64(f) => Value::Float64(*f),
                Literal::Text(s) => Value::Text(s.to_string()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            })),
            Expression::Is {
                expr,
                predicate,
                is_negated,
            } => {
                let inner_analyzed = self.bind_expression(expr)?;

                match predicate {
                    IsPredicate::True | IsPredicate::False => {
                        if !matches!(inner_analyzed.get_type(), Some(DataType::Bool) | None) {
                            return Err(miette!("IS TRUE/FALSE requires boolean input"));
                        }
                    }
                    IsPredicate::Null => {
                        // Just works
                    }
                }

                Ok(AnalyzedExpression::IsPredicate {
                    expr: Box::new(inner_analyzed),
                    predicate: *predicate,
                    negated: *is_negated,
                })
            }
        }
    }

    /// Result type of `left op right`. A NULL operand fits any type.
    fn resolve_binary_op(
        &self,
        left: Option<DataType>,
        op: Operator,
        right: Option<DataType>,
    ) -> Result<Option<DataType>> {
        let mismatch = || {
            let show = |t: Option<DataType>| t.map_or("NULL".to_string(), |t| t.to_string());
            miette!("Type mismatch between {} {op} {}", show(left), show(right))
        };

        match op {
            Operator::Like | Operator::NotLike => match (left, right) {
                (Some(DataType::Text) | None, Some(DataType::Text) | None) => {
                    Ok(Some(DataType::Bool))
                }
                _ => Err(mismatch()),
            },
            _ if op.is_comparison() => match (left, right) {
                (Some(l), Some(r)) if !DataType::can_coerce(l, r) => Err(mismatch()),
                _ => Ok(Some(DataType::Bool)),
            },
            Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide => {
                Self::get_common_numeric_type(left, right).ok_or_else(mismatch)
            }
            Operator::And | Operator::Or => match (left, right) {
                (Some(DataType::Bool) | None, Some(DataType::Bool) | None) => {
                    Ok(Some(DataType::Bool))
                }
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        }
    }

    /// `Some(result)` when arithmetic between the two types is allowed.
    fn get_common_numeric_type(
        left: Option<DataType>,
        right: Option<DataType>,
    ) -> Option<Option<DataType>> {
        let numeric = |t: Option<DataType>| {
            matches!(t, None | Some(DataType::Int64) | Some(DataType::Float64))
        };
        if !numeric(left) || !numeric(right) {
            return None;
        }

        Some(match (left, right) {
            (Some(DataType::Float64), _) | (_, Some(DataType::Float64)) => Some(DataType::Float64),
            (None, None) => None,
            _ => Some(DataType::Int64),
        })
    }
}
