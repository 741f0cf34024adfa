//! Table-driven shift-reduce parser.
//!
//! The grammar is
//!
//! ```text
//! names     -> ID | names ID
//! atom      -> ID | "(" complete ")" | "\" names "." complete
//! expr      -> atom | expr atom
//! complete  -> expr
//! ```
//!
//! `complete` forces an `expr` to be fully reduced before it is closed by `)` or used as a
//! lambda body, which keeps the state table small. Reductions push their nonterminal back into
//! the input so that the state below them can shift it like any other symbol.

use thiserror::Error;

use crate::{
    ast::{Term, TermRef},
    lexer::{self, Lexer, Token},
    prelude::*,
};

#[derive(PartialEq, Eq, Clone, Debug, Error)]
pub enum SyntaxError {
    #[error("Unexpected {found}")]
    Unexpected { found: String, span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Unexpected { span, .. } => span.clone(),
        }
    }
}

#[derive(Clone, derive_more::Display, Debug)]
enum Symbol {
    #[display(fmt = "{_0}")]
    Token(Token),
    #[display(fmt = "atom")]
    Atom(TermRef),
    #[display(fmt = "expression")]
    Expr(TermRef),
    #[display(fmt = "names")]
    Names(Vec<Identifier>),
    #[display(fmt = "complete expression")]
    Complete(TermRef),
}

/// Token input with push-back. A reduction may push its result in front of a symbol that was
/// only peeked at, so pushed symbols come back out in LIFO order.
struct SymbolStream<'s> {
    lexer: Lexer<'s>,
    head: Vec<Spanned<Symbol>>,
}

impl<'s> SymbolStream<'s> {
    fn new(lexer: Lexer<'s>) -> Self {
        Self {
            lexer,
            head: vec![],
        }
    }

    fn next(&mut self) -> Result<Spanned<Symbol>> {
        if let Some(symbol) = self.head.pop() {
            return Ok(symbol);
        }
        match self.lexer.next() {
            Some(token) => {
                let Spanned { span, value } = token?;
                Ok(Spanned::new(Symbol::Token(value), span))
            }
            None => Err(Error::malformed("token stream ended after end of input")),
        }
    }

    fn push(&mut self, symbol: Spanned<Symbol>) {
        self.head.push(symbol);
    }

    fn peek(&mut self) -> Result<&Symbol> {
        let symbol = self.next()?;
        self.head.push(symbol);
        Ok(&self.head[self.head.len() - 1].value)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum State {
    // Shift states. `Begin`, `Left` and `Dot` accept the same atoms and differ only in what
    // follows a `complete`.
    Begin,
    Left,
    Dot,
    Expr,
    BeginComplete,
    LeftComplete,
    Slash,
    SlashNames,

    // Reduce states, named after the frames they pop.
    ExprAtom,
    LeftCompleteRight,
    Atom,
    Id,
    Names,
    Lambda,
    NamesId,
    Complete,

    Accept,
}

impl State {
    /// Returns the state to shift into on `symbol`, or `None` when there is no transition.
    /// `next` is the symbol after it, consulted only to decide whether an `expr` is complete.
    fn transition(
        self,
        symbol: &Symbol,
        next: impl FnOnce() -> Result<bool>,
    ) -> Result<Option<Self>> {
        use State::*;
        let target = match (self, symbol) {
            (Begin | Left | Dot | Expr, Symbol::Token(Token::Identifier(_))) => Id,
            (Begin | Left | Dot | Expr, Symbol::Token(Token::LParen)) => Left,
            (Begin | Left | Dot | Expr, Symbol::Token(Token::Backslash)) => Slash,
            (Begin | Left | Dot, Symbol::Atom(_)) => Atom,
            (Expr, Symbol::Atom(_)) => ExprAtom,
            (Begin | Left | Dot, Symbol::Expr(_)) => {
                if next()? {
                    Complete
                } else {
                    Expr
                }
            }
            (Begin, Symbol::Complete(_)) => BeginComplete,
            (Left, Symbol::Complete(_)) => LeftComplete,
            (Dot, Symbol::Complete(_)) => Lambda,
            (BeginComplete, Symbol::Token(Token::End)) => Accept,
            (LeftComplete, Symbol::Token(Token::RParen)) => LeftCompleteRight,
            (Slash, Symbol::Token(Token::Identifier(_))) => Names,
            (Slash, Symbol::Names(_)) => SlashNames,
            (SlashNames, Symbol::Token(Token::Identifier(_))) => NamesId,
            (SlashNames, Symbol::Token(Token::Dot)) => Dot,
            _ => return Ok(None),
        };
        Ok(Some(target))
    }
}

struct Automaton<'s> {
    input: SymbolStream<'s>,
    state: State,
    states: Vec<State>,
    values: Vec<Spanned<Symbol>>,
}

impl<'s> Automaton<'s> {
    fn new(lexer: Lexer<'s>) -> Self {
        Self {
            input: SymbolStream::new(lexer),
            state: State::Begin,
            states: vec![],
            values: vec![],
        }
    }

    fn shift(&mut self, symbol: Spanned<Symbol>, next: State) {
        tracing::trace!(from = ?self.state, to = ?next, %symbol, "shift");
        self.states.push(self.state);
        self.values.push(symbol);
        self.state = next;
    }

    /// Pops the `N` frames of a right-hand side and returns to the state below them.
    fn pop<const N: usize>(&mut self) -> [Spanned<Symbol>; N] {
        let at = self.values.len() - N;
        self.state = self.states[at];
        self.states.truncate(at);
        let frames = self.values.split_off(at);
        frames
            .try_into()
            .unwrap_or_else(|_| unreachable!("a reduce state always has {} frames", N))
    }

    fn reduce(&mut self, lhs: Symbol, span: Span) {
        tracing::trace!(to = ?self.state, symbol = %lhs, "reduce");
        self.input.push(Spanned::new(lhs, span));
    }

    fn run(mut self) -> Result<TermRef> {
        use State::*;
        loop {
            match self.state {
                Begin | Left | Dot | Expr | BeginComplete | LeftComplete | Slash | SlashNames => {
                    let symbol = self.input.next()?;
                    let input = &mut self.input;
                    let next = || {
                        Ok(matches!(
                            input.peek()?,
                            Symbol::Token(Token::End | Token::RParen)
                        ))
                    };
                    match self.state.transition(&symbol.value, next)? {
                        Some(target) => self.shift(symbol, target),
                        None => {
                            return Err(SyntaxError::Unexpected {
                                found: symbol.value.to_string(),
                                span: symbol.span,
                            }
                            .into())
                        }
                    }
                }
                // complete -> expr
                Complete => {
                    let [expr] = self.pop::<1>();
                    match expr.value {
                        Symbol::Expr(term) => self.reduce(Symbol::Complete(term), expr.span),
                        _ => unreachable!("complete is reduced from an expression"),
                    }
                }
                // names -> names ID
                NamesId => match self.pop::<2>() {
                    [Spanned {
                        value: Symbol::Names(mut names),
                        span: start,
                    }, Spanned {
                        value: Symbol::Token(Token::Identifier(name)),
                        span: end,
                    }] => {
                        names.push(name);
                        self.reduce(Symbol::Names(names), merge_span(&start, &end));
                    }
                    _ => unreachable!("names are extended by an identifier"),
                },
                // atom -> "\" names "." complete
                Lambda => match self.pop::<4>() {
                    [slash, Spanned {
                        value: Symbol::Names(mut names),
                        ..
                    }, _, Spanned {
                        value: Symbol::Complete(mut body),
                        span: end,
                    }] => {
                        while let Some(name) = names.pop() {
                            body = Term::Function(name, body).into();
                        }
                        self.reduce(Symbol::Atom(body), merge_span(&slash.span, &end));
                    }
                    _ => unreachable!("lambda is reduced from names and a complete body"),
                },
                // names -> ID
                Names => match self.pop::<1>() {
                    [Spanned {
                        value: Symbol::Token(Token::Identifier(name)),
                        span,
                    }] => self.reduce(Symbol::Names(vec![name]), span),
                    _ => unreachable!("names start with an identifier"),
                },
                // atom -> ID
                Id => match self.pop::<1>() {
                    [Spanned {
                        value: Symbol::Token(Token::Identifier(name)),
                        span,
                    }] => self.reduce(Symbol::Atom(Term::Name(name).into()), span),
                    _ => unreachable!("an identifier atom holds an identifier"),
                },
                // expr -> atom
                Atom => match self.pop::<1>() {
                    [Spanned {
                        value: Symbol::Atom(term),
                        span,
                    }] => self.reduce(Symbol::Expr(term), span),
                    _ => unreachable!("an atom holds a term"),
                },
                // expr -> expr atom
                ExprAtom => match self.pop::<2>() {
                    [Spanned {
                        value: Symbol::Expr(function),
                        span: start,
                    }, Spanned {
                        value: Symbol::Atom(argument),
                        span: end,
                    }] => self.reduce(
                        Symbol::Expr(Term::Apply(function, argument).into()),
                        merge_span(&start, &end),
                    ),
                    _ => unreachable!("application is reduced from an expression and an atom"),
                },
                // atom -> "(" complete ")"
                LeftCompleteRight => match self.pop::<3>() {
                    [left, Spanned {
                        value: Symbol::Complete(term),
                        ..
                    }, right] => self.reduce(Symbol::Atom(term), merge_span(&left.span, &right.span)),
                    _ => unreachable!("parentheses enclose a complete expression"),
                },
                Accept => {
                    let [complete, _end] = self.pop::<2>();
                    return match complete.value {
                        Symbol::Complete(term) => Ok(term),
                        _ => unreachable!("accepted input is a complete expression"),
                    };
                }
            }
        }
    }
}

pub fn parse_tokens(lexer: Lexer<'_>) -> Result<TermRef> {
    Automaton::new(lexer).run()
}

pub fn parse(source: &str) -> Result<TermRef> {
    parse_tokens(lexer::tokenize(source))
}
