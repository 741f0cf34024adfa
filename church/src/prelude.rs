use std::rc::Rc;

use thiserror::Error;

use crate::{lexer::LexicalError, parser::SyntaxError};

pub type Identifier = Rc<String>;

pub type Span = std::ops::Range<usize>;
pub fn merge_span(lhs: &Span, rhs: &Span) -> Span {
    std::ops::Range {
        start: std::cmp::min(lhs.start, rhs.start),
        end: std::cmp::max(lhs.end, rhs.end),
    }
}

#[derive(derive_more::AsRef, PartialEq, Eq, Clone, derive_more::Display, Debug)]
#[display(bound = "T: std::fmt::Display")]
#[display(fmt = "{value}")]
pub struct Spanned<T> {
    pub span: Span,
    #[as_ref]
    pub value: T,
}
impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
    pub fn forget_span(self) -> T {
        self.value
    }
    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("Found an unbound name `{0}`")]
    UnboundName(Identifier),
    #[error("Malformed expression: {0}")]
    MalformedExpr(String),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedExpr(message.into())
    }

    /// Location in the source text, for errors raised before binding.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Lexical(e) => Some(e.span()),
            Error::Syntax(e) => Some(e.span()),
            Error::UnboundName(_) | Error::MalformedExpr(_) => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Pops an operand pushed by an earlier event of the same traversal.
pub(crate) fn pop_operand<T>(stack: &mut Vec<T>) -> Result<T> {
    stack
        .pop()
        .ok_or_else(|| Error::malformed("operand stack exhausted before the traversal ended"))
}
