use std::borrow::Cow;

use miette::{Result, miette};

use crate::sql::parser::Keyword;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Keyword(Keyword),
    /// Bare, `[bracketed]` or `"quoted"` name.
    Identifier(Cow<'a, str>),
    Integer(i64),
    Float(f64),
    /// Single-quoted literal with `''` unescaped.
    String(Cow<'a, str>),

    Comma,
    Asterisk,
    SemiColon,

    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,

    Plus,
    Minus,
    Slash,

    LeftParen,
    RightParen,
}

pub(crate) struct Lexer<'a> {
    pub rest: &'a str,
    pub position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            position: 0,
        }
    }

    fn advance(&mut self, len: usize) {
        self.position += len;
        self.rest = &self.rest[len..];
    }

    fn skip_whitespace(&mut self) {
        let non_whitespace_pos = self
            .rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());

        self.advance(non_whitespace_pos);
    }

    fn consume_word(&mut self) -> &'a str {
        let word_index = self
            .rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(self.rest.len());

        let word = &self.rest[..word_index];
        self.advance(word_index);
        word
    }

    /// Consumes a literal delimited by `closing`, where a doubled closing
    /// character stands for itself.
    fn consume_quoted(&mut self, closing: char) -> Result<Cow<'a, str>> {
        let start = self.position;
        let body = &self.rest[1..];
        let mut escaped = false;
        let mut chars = body.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            if ch != closing {
                continue;
            }
            if matches!(chars.peek(), Some((_, next)) if *next == closing) {
                chars.next();
                escaped = true;
                continue;
            }

            let raw = &body[..i];
            self.advance(i + 2);

            return Ok(if escaped {
                let doubled: String = [closing, closing].iter().collect();
                Cow::Owned(raw.replace(&doubled, &closing.to_string()))
            } else {
                Cow::Borrowed(raw)
            });
        }

        Err(miette!("Unterminated {closing} literal starting at position {start}"))
    }

    fn consume_bracketed(&mut self) -> Result<&'a str> {
        let start = self.position;
        let end = self.rest[1..]
            .find(']')
            .ok_or_else(|| miette!("Unterminated [ identifier starting at position {start}"))?;

        let name = &self.rest[1..end + 1];
        self.advance(end + 2);
        Ok(name)
    }

    fn consume_number(&mut self) -> Result<Token<'a>> {
        let number_end = self
            .rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(self.rest.len());

        let number_str = &self.rest[..number_end];
        self.advance(number_end);

        if number_str.contains('.') {
            number_str
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| miette!("Invalid number format: {}", number_str))
        } else {
            number_str
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| miette!("Integer out of range: {}", number_str))
        }
    }

    fn symbol(&mut self, len: usize, token: Token<'a>) -> Result<Token<'a>> {
        self.advance(len);
        Ok(token)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let char = self.rest.chars().next()?;
        let next = self.rest[char.len_utf8()..].chars().next();

        let token = match (char, next) {
            (',', _) => self.symbol(1, Token::Comma),
            ('*', _) => self.symbol(1, Token::Asterisk),
            (';', _) => self.symbol(1, Token::SemiColon),
            ('(', _) => self.symbol(1, Token::LeftParen),
            (')', _) => self.symbol(1, Token::RightParen),
            ('+', _) => self.symbol(1, Token::Plus),
            ('-', _) => self.symbol(1, Token::Minus),
            ('/', _) => self.symbol(1, Token::Slash),
            ('=', _) => self.symbol(1, Token::Equal),
            ('<', Some('=')) => self.symbol(2, Token::LessThanEqual),
            ('<', Some('>')) => self.symbol(2, Token::NotEqual),
            ('<', _) => self.symbol(1, Token::LessThan),
            ('>', Some('=')) => self.symbol(2, Token::GreaterThanEqual),
            ('>', _) => self.symbol(1, Token::GreaterThan),
            ('!', Some('=')) => self.symbol(2, Token::NotEqual),
            ('\'', _) => self.consume_quoted('\'').map(Token::String),
            ('"', _) => self.consume_quoted('"').map(Token::Identifier),
            ('[', _) => self
                .consume_bracketed()
                .map(|name| Token::Identifier(Cow::Borrowed(name))),
            _ if char.is_ascii_digit() => self.consume_number(),
            _ if char.is_alphabetic() || char == '_' => {
                let word = self.consume_word();

                match word.parse::<Keyword>() {
                    Ok(keyword) => Ok(Token::Keyword(keyword)),
                    Err(_) => Ok(Token::Identifier(Cow::Borrowed(word))),
                }
            }
            _ => Err(miette!(
                "Unexpected character '{}' at position {}",
                char,
                self.position
            )),
        };

        if token.is_err() {
            // Stop after the first error.
            self.rest = "";
        }

        Some(token)
    }
}
