use std::{borrow::Cow, iter::Peekable};

use miette::{Result, miette};

use crate::sql::lexer::{Lexer, Token};

pub(crate) use ast::*;
pub(crate) use keyword::Keyword;
pub(crate) use literal::Literal;
pub(crate) use operators::Operator;

pub(crate) mod ast;
pub(crate) mod keyword;
pub(crate) mod literal;
pub(crate) mod operators;

/// Binding power of prefix `NOT`: looser than comparisons, tighter than
/// `AND`.
const NOT_PRECEDENCE: u8 = 4;

/// SQL parser that converts tokens into an AST.
///
/// Uses recursive descent parsing with a peekable token stream.
pub struct SqlParser<'src> {
    /// Token stream from the lexer
    lexer: Peekable<Lexer<'src>>,
}

impl<'src> SqlParser<'src> {
    /// Creates a new parser for the given SQL query string.
    pub fn new(query: &'src str) -> Self {
        Self {
            lexer: Lexer::new(query).peekable(),
        }
    }

    /// Parses one statement, optionally terminated by `;`, and rejects
    /// anything after it.
    pub fn parse(&mut self) -> Result<Statement<'src>> {
        let token = self.peek_token()?.clone();

        let statement = match token {
            Token::Keyword(keyword) => match keyword {
                Keyword::Select => self.parse_select_statement()?,
                Keyword::List => {
                    self.expect_keyword(Keyword::List)?;
                    self.expect_keyword(Keyword::Tables)?;
                    Statement::ListTables
                }
                Keyword::Describe => {
                    self.expect_keyword(Keyword::Describe)?;
                    self.consume_if(Token::Keyword(Keyword::Table));
                    Statement::Describe(self.expect_identifier()?)
                }
                _ => return Err(miette!("Unsupported keyword: {:?}", keyword)),
            },
            _ => return Err(miette!("Unexpected token: {:?}", token)),
        };

        self.consume_if(Token::SemiColon);
        if let Some(token) = self.lexer.next().transpose()? {
            return Err(miette!("Unexpected {:?} after end of statement", token));
        }

        Ok(statement)
    }

    fn parse_select_statement(&mut self) -> Result<Statement<'src>> {
        self.expect_keyword(Keyword::Select)?;

        let mut limit = if self.consume_if(Token::Keyword(Keyword::Top)) {
            Some(self.expect_count()?)
        } else {
            None
        };

        let select_list = self.parse_targets()?;

        self.expect_keyword(Keyword::From)?;

        let table_name = self.expect_identifier()?;

        let where_clause = if self.consume_if(Token::Keyword(Keyword::Where)) {
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        if self.consume_if(Token::Keyword(Keyword::Limit)) {
            let n = self.expect_count()?;
            limit = Some(limit.map_or(n, |top| top.min(n)));
        }

        Ok(Statement::Select(SelectStatement {
            select_list,
            from_clause: FromClause { table_name },
            where_clause,
            limit,
        }))
    }

    fn parse_targets(&mut self) -> Result<SelectList<'src>> {
        let mut columns = Vec::new();

        loop {
            if self.consume_if(Token::Asterisk) {
                columns.push(SelectTarget::Star);
            } else {
                let expr = self.parse_expression(0)?;

                let alias = if self.consume_if(Token::Keyword(Keyword::As)) {
                    Some(self.expect_identifier()?)
                } else if let Ok(Token::Identifier(_)) = self.peek_token() {
                    Some(self.expect_identifier()?)
                } else {
                    // no alias
                    None
                };

                columns.push(SelectTarget::Expression { expr, alias });
            }

            if !self.consume_if(Token::Comma) {
                break;
            }
        }

        Ok(SelectList(columns))
    }

    fn parse_expression(&mut self, min_prec: u8) -> Result<Expression<'src>> {
        let mut lhs = self.parse_primary()?;

        while let Some(op) = self.peek_binary_op() {
            if op.precedence() < min_prec {
                break;
            }

            // consume op, and the LIKE of 'NOT LIKE'
            self.next_token()?;
            if op == Operator::NotLike {
                self.expect_keyword(Keyword::Like)?;
            }

            let rhs = self.parse_expression(op.precedence() + 1)?;
            lhs = Expression::BinaryOp {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expression<'src>> {
        if self.consume_if(Token::Keyword(Keyword::Not)) {
            let expr = self.parse_expression(NOT_PRECEDENCE)?;
            return Ok(Expression::Not(Box::new(expr)));
        }

        let expr = self.parse_operand()?;
        self.parse_is_postfix(expr)
    }

    fn parse_operand(&mut self) -> Result<Expression<'src>> {
        let expr = match self.next_token()? {
            Token::Keyword(kw) if kw.is_bool_literal() => {
                Expression::Literal(Literal::Bool(matches!(kw, Keyword::True)))
            }
            Token::Keyword(Keyword::Null) => Expression::Literal(Literal::Null),
            Token::Integer(i) => Expression::Literal(Literal::Int64(i)),
            Token::Float(f) => Expression::Literal(Literal::Float64(f)),
            Token::String(s) => Expression::Literal(Literal::Text(s)),
            Token::Identifier(i) => Expression::Identifier(i),
            Token::Minus => match self.parse_operand()? {
                Expression::Literal(Literal::Int64(i)) => Expression::Literal(Literal::Int64(-i)),
                Expression::Literal(Literal::Float64(f)) => {
                    Expression::Literal(Literal::Float64(-f))
                }
                expr => Expression::BinaryOp {
                    left: Box::new(Expression::Literal(Literal::Int64(0))),
                    op: Operator::Subtract,
                    right: Box::new(expr),
                },
            },
            Token::LeftParen => {
                let expr = self.parse_expression(0)?;

                match self.next_token()? {
                    Token::RightParen => expr,
                    t => return Err(miette!("Expected ')', found {:?}", t)),
                }
            }
            t => {
                return Err(miette!("Expected a column or value, but found {:?}", t));
            }
        };

        Ok(expr)
    }

    // Potentially parse "IS" postfix
    fn parse_is_postfix(&mut self, expr: Expression<'src>) -> Result<Expression<'src>> {
        if !self.consume_if(Token::Keyword(Keyword::Is)) {
            return Ok(expr);
        }

        let is_negated = self.consume_if(Token::Keyword(Keyword::Not));

        match self.next_token()? {
            Token::Keyword(kw) => match IsPredicate::try_from(kw) {
                Ok(predicate) => Ok(Expression::Is {
                    expr: Box::new(expr),
                    predicate,
                    is_negated,
                }),
                Err(kw) => Err(miette!("Expected TRUE/FALSE/NULL after IS, found {:?}", kw)),
            },
            t => Err(miette!("Expected TRUE/FALSE/NULL after IS, found {:?}", t)),
        }
    }

    fn peek_binary_op(&mut self) -> Option<Operator> {
        let op = match self.lexer.peek()? {
            Ok(Token::Equal) => Operator::Equal,
            Ok(Token::NotEqual) => Operator::NotEqual,
            Ok(Token::GreaterThan) => Operator::GreaterThan,
            Ok(Token::LessThan) => Operator::LessThan,
            Ok(Token::GreaterThanEqual) => Operator::GreaterThanEqual,
            Ok(Token::LessThanEqual) => Operator::LessThanEqual,

            Ok(Token::Plus) => Operator::Add,
            Ok(Token::Minus) => Operator::Subtract,
            Ok(Token::Asterisk) => Operator::Multiply,
            Ok(Token::Slash) => Operator::Divide,

            Ok(Token::Keyword(Keyword::And)) => Operator::And,
            Ok(Token::Keyword(Keyword::Or)) => Operator::Or,
            Ok(Token::Keyword(Keyword::Like)) => Operator::Like,
            Ok(Token::Keyword(Keyword::Not)) => Operator::NotLike,

            _ => return None,
        };

        Some(op)
    }

    fn next_token(&mut self) -> Result<Token<'src>> {
        self.lexer
            .next()
            .transpose()?
            .ok_or_else(|| miette!("Unexpected end of input"))
    }

    fn peek_token(&mut self) -> Result<&Token<'src>> {
        match self.lexer.peek() {
            Some(Ok(token)) => Ok(token),
            Some(Err(err)) => Err(miette!("{err}")),
            None => Err(miette!("Unexpected end of input")),
        }
    }

    fn peek_is(&mut self, expected: &Token) -> bool {
        matches!(self.lexer.peek(), Some(Ok(token)) if token == expected)
    }

    fn consume_if(&mut self, expected: Token) -> bool {
        if self.peek_is(&expected) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    fn expect_identifier(&mut self) -> Result<Cow<'src, str>> {
        match self.next_token()? {
            Token::Identifier(ident) => Ok(ident),
            got => Err(miette!("Expected IDENTIFIER, but found {:?}", got)),
        }
    }

    /// A non-negative integer for `TOP` and `LIMIT`.
    fn expect_count(&mut self) -> Result<usize> {
        match self.next_token()? {
            Token::Integer(n) => {
                usize::try_from(n).map_err(|_| miette!("Row count must not be negative, got {n}"))
            }
            other => Err(miette!("Expected a row count, found {:?}", other)),
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<()> {
        match self.next_token()? {
            Token::Keyword(kw) if kw == expected => Ok(()),
            other => Err(miette!("Expected {:?}, found {:?}", expected, other)),
        }
    }
}
