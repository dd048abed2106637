use std::borrow::Cow;

use super::expression::Expression;

/// Target list in a SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectTarget<'src> {
    /// SELECT * (all columns)
    Star,

    /// SELECT col1, col2 + 1 AS next, ...
    Expression {
        expr: Expression<'src>,
        alias: Option<Cow<'src, str>>,
    },
}

/// Select List
#[derive(Debug, Clone, PartialEq)]
pub struct SelectList<'src>(pub Vec<SelectTarget<'src>>);
