use std::{iter::Peekable, str::CharIndices};

use thiserror::Error;

use crate::prelude::*;

#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
pub enum Token {
    #[display(fmt = "(")]
    LParen,
    #[display(fmt = ")")]
    RParen,
    #[display(fmt = "\\")]
    Backslash,
    #[display(fmt = ".")]
    Dot,
    #[display(fmt = "end of input")]
    End,
    #[display(fmt = "{_0}")]
    Identifier(Identifier),
}

#[derive(PartialEq, Eq, Clone, Debug, Error)]
pub enum LexicalError {
    #[error("Invalid character in input: `{found}`")]
    InvalidCharacter { found: char, span: Span },
}

impl LexicalError {
    pub fn span(&self) -> Span {
        match self {
            LexicalError::InvalidCharacter { span, .. } => span.clone(),
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n')
}

fn single_char_token(c: char) -> Option<Token> {
    Some(match c {
        '(' => Token::LParen,
        ')' => Token::RParen,
        '\\' => Token::Backslash,
        '.' => Token::Dot,
        _ => return None,
    })
}

#[derive(Clone, Copy, Debug)]
enum State {
    Outside,
    Identifier { start: usize },
    Finished,
}

/// Lazy token stream over a source string. Terminated by exactly one [`Token::End`].
#[derive(Clone, Debug)]
pub struct Lexer<'s> {
    source: &'s str,
    chars: Peekable<CharIndices<'s>>,
    state: State,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            state: State::Outside,
        }
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.source.len(), |&(offset, _)| offset)
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Spanned<Token>, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Finished => return None,
                State::Identifier { start } => match self.chars.peek() {
                    Some(&(_, c)) if is_identifier_char(c) => {
                        self.chars.next();
                    }
                    _ => {
                        let end = self.offset();
                        self.state = State::Outside;
                        let name = Identifier::new(self.source[start..end].to_string());
                        return Some(Ok(Spanned::new(Token::Identifier(name), start..end)));
                    }
                },
                State::Outside => match self.chars.next() {
                    None => {
                        self.state = State::Finished;
                        let end = self.source.len();
                        return Some(Ok(Spanned::new(Token::End, end..end)));
                    }
                    Some((start, c)) if is_identifier_char(c) => {
                        self.state = State::Identifier { start };
                    }
                    Some((_, c)) if is_whitespace(c) => {}
                    Some((start, c)) => {
                        let span = start..start + c.len_utf8();
                        if let Some(token) = single_char_token(c) {
                            return Some(Ok(Spanned::new(token, span)));
                        }
                        self.state = State::Finished;
                        return Some(Err(LexicalError::InvalidCharacter { found: c, span }));
                    }
                },
            }
        }
    }
}

pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(input: &str) -> Result<Vec<Token>, LexicalError> {
        tokenize(input)
            .map(|t| t.map(Spanned::forget_span))
            .collect()
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(Identifier::new(name.to_string()))
    }

    #[test]
    fn test_lexer() {
        assert_eq!(lex("").unwrap(), vec![Token::End]);
        assert_eq!(
            lex(r"\x y.x_1").map_err(|e| e.to_string()),
            Err("Invalid character in input: `1`".to_string())
        );
        assert_eq!(
            lex("\\foo_bar. (foo_bar\n baz)").unwrap(),
            vec![
                Token::Backslash,
                ident("foo_bar"),
                Token::Dot,
                Token::LParen,
                ident("foo_bar"),
                ident("baz"),
                Token::RParen,
                Token::End,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let spans = tokenize(" ab(c")
            .map(|t| t.unwrap().span())
            .collect::<Vec<_>>();
        assert_eq!(spans, vec![1..3, 3..4, 4..5, 5..5]);
    }

    #[test]
    fn test_invalid_character() {
        let mut lexer = tokenize("x $ y");
        assert_eq!(lexer.next().unwrap().unwrap().forget_span(), ident("x"));
        assert_eq!(
            lexer.next().unwrap(),
            Err(LexicalError::InvalidCharacter {
                found: '$',
                span: 2..3
            })
        );
        assert_eq!(lexer.next(), None);
        assert!(lex("Lambda").is_err());
        assert!(lex("x\ty").is_err());
    }

    #[test]
    fn test_restartable() {
        let lexer = tokenize("a b");
        let first = lexer.clone().collect::<Vec<_>>();
        let second = lexer.collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
