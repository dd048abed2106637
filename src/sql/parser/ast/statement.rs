use std::borrow::Cow;

use super::{Expression, SelectList};

/// A SQL statement (top-level AST node).
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'src> {
    Select(SelectStatement<'src>),
    /// `LIST TABLES`
    ListTables,
    /// `DESCRIBE TABLE <name>`
    Describe(Cow<'src, str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement<'src> {
    pub select_list: SelectList<'src>,
    pub from_clause: FromClause<'src>,
    pub where_clause: Option<Expression<'src>>,
    /// Smaller of `TOP n` and `LIMIT n` when either is given.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause<'src> {
    pub table_name: Cow<'src, str>,
}
