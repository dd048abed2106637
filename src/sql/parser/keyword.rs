use strum::EnumString;

/// SQL keywords recognized by the parser.
///
/// These keywords are case-insensitive and reserved for SQL syntax. A
/// column that shares a name with one has to be written `[bracketed]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Keyword {
    Select,
    From,
    Where,
    As,
    Top,
    Limit,

    List,
    Tables,
    Describe,
    Table,

    And,
    Or,
    Not,
    Is,
    Like,

    True,
    False,
    Null,
}

impl Keyword {
    pub fn is_bool_literal(self) -> bool {
        matches!(self, Self::True | Self::False)
    }
}
