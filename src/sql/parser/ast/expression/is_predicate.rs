use std::fmt;

use crate::sql::parser::Keyword;

/// Predicates to the 'IS' keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IsPredicate {
    True,
    False,
    Null,
}

impl TryFrom<Keyword> for IsPredicate {
    type Error = Keyword;

    fn try_from(keyword: Keyword) -> Result<Self, Self::Error> {
        match keyword {
            Keyword::True => Ok(IsPredicate::True),
            Keyword::False => Ok(IsPredicate::False),
            Keyword::Null => Ok(IsPredicate::Null),
            other => Err(other),
        }
    }
}

impl fmt::Display for IsPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsPredicate::True => write!(f, "TRUE"),
            IsPredicate::False => write!(f, "FALSE"),
            IsPredicate::Null => write!(f, "NULL"),
        }
    }
}
