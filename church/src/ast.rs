use std::rc::Rc;

use crate::{
    prelude::*,
    traversal::{self, Dismantle, Flatten, Node, Step},
};

pub type TermRef = Rc<Term>;

/// Name-based syntax tree, as written by the user.
#[derive(Debug)]
pub enum Term {
    /// `x`
    Name(Identifier),
    /// `t t`
    Apply(TermRef, TermRef),
    /// `\x. t`
    Function(Identifier, TermRef),
}

impl Term {
    pub fn name(name: impl Into<String>) -> TermRef {
        Term::Name(Identifier::new(name.into())).into()
    }
    pub fn apply(function: TermRef, argument: TermRef) -> TermRef {
        Term::Apply(function, argument).into()
    }
    pub fn function(name: impl Into<String>, body: TermRef) -> TermRef {
        Term::Function(Identifier::new(name.into()), body).into()
    }

    pub fn flatten(&self) -> Flatten<'_, Self> {
        Flatten::new(self)
    }
}

/// Structural equality, compared event by event.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.flatten().eq(other.flatten())
    }
}
impl Eq for Term {}

impl Dismantle for Term {
    fn leaf() -> TermRef {
        Term::Name(Identifier::default()).into()
    }
    fn children(&self) -> [Option<&TermRef>; 2] {
        match self {
            Term::Name(_) => [None, None],
            Term::Apply(function, argument) => [Some(function), Some(argument)],
            Term::Function(_, body) => [Some(body), None],
        }
    }
    fn children_mut(&mut self) -> [Option<&mut TermRef>; 2] {
        match self {
            Term::Name(_) => [None, None],
            Term::Apply(function, argument) => [Some(function), Some(argument)],
            Term::Function(_, body) => [Some(body), None],
        }
    }
}

impl Drop for Term {
    fn drop(&mut self) {
        traversal::dismantle(self);
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Event<'a> {
    Name(&'a Identifier),
    OpenFunction(&'a Identifier),
    CloseFunction(&'a Identifier),
    OpenApply,
    CloseApply,
}

impl<'a> Node<'a> for Term {
    type Event = Event<'a>;

    fn expand(&'a self, to_do: &mut Vec<Step<'a, Self, Event<'a>>>) {
        match self {
            Term::Name(name) => to_do.push(Step::Yield(Event::Name(name))),
            Term::Apply(function, argument) => to_do.extend([
                Step::Yield(Event::CloseApply),
                Step::Process(argument.as_ref()),
                Step::Process(function.as_ref()),
                Step::Yield(Event::OpenApply),
            ]),
            Term::Function(name, body) => to_do.extend([
                Step::Yield(Event::CloseFunction(name)),
                Step::Process(body.as_ref()),
                Step::Yield(Event::OpenFunction(name)),
            ]),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Event::*, *};

    #[test]
    fn test_flatten() {
        let term = Term::function(
            "x",
            Term::apply(Term::name("x"), Term::function("y", Term::name("y"))),
        );
        let x = Identifier::new("x".to_string());
        let y = Identifier::new("y".to_string());
        assert_eq!(
            term.flatten().collect::<Vec<_>>(),
            vec![
                OpenFunction(&x),
                OpenApply,
                Name(&x),
                OpenFunction(&y),
                Name(&y),
                CloseFunction(&y),
                CloseApply,
                CloseFunction(&x),
            ]
        );
    }

    #[test]
    fn test_flatten_is_restartable() {
        let term = Term::apply(Term::name("f"), Term::name("a"));
        assert_eq!(term.flatten().count(), 4);
        assert_eq!(
            term.flatten().collect::<Vec<_>>(),
            term.flatten().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_drop_keeps_shared_subtrees() {
        let shared = Term::apply(Term::name("f"), Term::name("a"));
        let outer = Term::function("x", Term::apply(shared.clone(), shared.clone()));
        assert_eq!(Rc::strong_count(&shared), 3);
        drop(outer);
        assert_eq!(Rc::strong_count(&shared), 1);
        assert_eq!(shared, Term::apply(Term::name("f"), Term::name("a")));
    }

    #[test]
    fn test_deep_drop() {
        let mut term = Term::name("x");
        for _ in 0..100_000 {
            term = Term::function("x", Term::apply(term, Term::name("x")));
        }
        assert_eq!(term.flatten().count(), 100_000 * 5 + 1);
        drop(term);
    }
}
