pub(crate) mod expression;
pub(crate) mod statement;
pub(crate) mod target;

pub use expression::{Expression, IsPredicate};
pub use statement::{FromClause, SelectStatement, Statement};
pub use target::{SelectList, SelectTarget};
