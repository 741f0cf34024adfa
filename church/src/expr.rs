//! Lambda expressions whose references point at binding sites instead of names.

use std::{
    hash::{Hash, Hasher},
    rc::Rc,
};

use crate::{
    bitstring::BitString,
    prelude::*,
    traversal::{self, Dismantle, Flatten, Node, Step},
};

struct Binder {
    name: Identifier,
}

/// A binding site. Two parameters are equal only if they are clones of the same handle; the
/// name is informational and is used as the starting point when names are reconstructed.
#[derive(Clone)]
pub struct Parameter(Rc<Binder>);

impl Parameter {
    pub fn new(name: Identifier) -> Self {
        Self(Rc::new(Binder { name }))
    }
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(Identifier::new(name.into()))
    }
    pub fn name(&self) -> &Identifier {
        &self.0.name
    }
    /// A new parameter with the same name.
    pub fn fresh(&self) -> Self {
        Self::new(self.name().clone())
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state)
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}@{:p}", self.name(), Rc::as_ptr(&self.0)))
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub type ExprRef = Rc<Expr>;

#[derive(Debug)]
pub struct FunctionExpr {
    parameter: Parameter,
    body: ExprRef,
}

impl FunctionExpr {
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }
    pub fn body(&self) -> &ExprRef {
        &self.body
    }
}

/// Equality is alpha-equivalence: two expressions are equal when they have the same kind at the
/// root and the same [`BitString`]. Expressions that cannot be encoded are never equal.
#[derive(Debug)]
pub enum Expr {
    Apply(ExprRef, ExprRef),
    Function(FunctionExpr),
    Reference(Parameter),
}

impl Expr {
    pub fn apply(function: ExprRef, argument: ExprRef) -> ExprRef {
        Expr::Apply(function, argument).into()
    }
    /// `parameter` must not be bound by any other function.
    pub fn function(parameter: Parameter, body: ExprRef) -> ExprRef {
        Expr::Function(FunctionExpr { parameter, body }).into()
    }
    /// `parameter` must be bound by a function enclosing the reference.
    pub fn reference(parameter: Parameter) -> ExprRef {
        Expr::Reference(parameter).into()
    }

    pub fn flatten(&self) -> Flatten<'_, Self> {
        Flatten::new(self)
    }

    pub fn bitstring(&self) -> Result<BitString> {
        BitString::encode(self)
    }

    pub fn as_function(&self) -> Option<&FunctionExpr> {
        match self {
            Expr::Function(function) => Some(function),
            _ => None,
        }
    }

    fn kind(&self) -> std::mem::Discriminant<Self> {
        std::mem::discriminant(self)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        match (self.bitstring(), other.bitstring()) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl Dismantle for Expr {
    fn leaf() -> ExprRef {
        Expr::Reference(Parameter::named("")).into()
    }
    fn children(&self) -> [Option<&ExprRef>; 2] {
        match self {
            Expr::Apply(function, argument) => [Some(function), Some(argument)],
            Expr::Function(FunctionExpr { body, .. }) => [Some(body), None],
            Expr::Reference(_) => [None, None],
        }
    }
    fn children_mut(&mut self) -> [Option<&mut ExprRef>; 2] {
        match self {
            Expr::Apply(function, argument) => [Some(function), Some(argument)],
            Expr::Function(FunctionExpr { body, .. }) => [Some(body), None],
            Expr::Reference(_) => [None, None],
        }
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        traversal::dismantle(self);
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Event<'a> {
    Name(&'a Parameter),
    OpenFunction(&'a Parameter),
    CloseFunction(&'a Parameter),
    OpenApply,
    CloseApply,
}

impl<'a> Node<'a> for Expr {
    type Event = Event<'a>;

    fn expand(&'a self, to_do: &mut Vec<Step<'a, Self, Event<'a>>>) {
        match self {
            Expr::Reference(parameter) => to_do.push(Step::Yield(Event::Name(parameter))),
            Expr::Apply(function, argument) => to_do.extend([
                Step::Yield(Event::CloseApply),
                Step::Process(argument.as_ref()),
                Step::Process(function.as_ref()),
                Step::Yield(Event::OpenApply),
            ]),
            Expr::Function(FunctionExpr { parameter, body }) => to_do.extend([
                Step::Yield(Event::CloseFunction(parameter)),
                Step::Process(body.as_ref()),
                Step::Yield(Event::OpenFunction(parameter)),
            ]),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Event::*, *};

    #[test]
    fn test_parameter_identity() {
        let x = Parameter::named("x");
        let other = Parameter::named("x");
        assert_eq!(x, x.clone());
        assert_ne!(x, other);
        assert_ne!(x, x.fresh());
        assert_eq!(x.fresh().name(), x.name());
    }

    #[test]
    fn test_flatten() {
        let x = Parameter::named("x");
        let y = Parameter::named("y");
        let expr = Expr::function(
            x.clone(),
            Expr::function(
                y.clone(),
                Expr::apply(Expr::reference(x.clone()), Expr::reference(y.clone())),
            ),
        );
        assert_eq!(
            expr.flatten().collect::<Vec<_>>(),
            vec![
                OpenFunction(&x),
                OpenFunction(&y),
                OpenApply,
                Name(&x),
                Name(&y),
                CloseApply,
                CloseFunction(&y),
                CloseFunction(&x),
            ]
        );
    }

    #[test]
    fn test_deep_flatten() {
        let x = Parameter::named("x");
        let mut body = Expr::reference(x.clone());
        for _ in 0..100_000 {
            body = Expr::apply(body, Expr::reference(x.clone()));
        }
        let expr = Expr::function(x, body);
        assert_eq!(expr.flatten().count(), 2 + 100_000 * 3 + 1);
    }

    #[test]
    fn test_equality() {
        let x = Parameter::named("x");
        let y = Parameter::named("y");
        let identity_x = Expr::function(x.clone(), Expr::reference(x));
        let identity_y = Expr::function(y.clone(), Expr::reference(y.clone()));
        assert_eq!(identity_x, identity_y);

        let z = Parameter::named("z");
        let w = Parameter::named("w");
        let constant = Expr::function(z, Expr::function(w.clone(), Expr::reference(w)));
        assert_ne!(identity_x, constant);

        // A reference outside its binder cannot be encoded.
        let dangling = Expr::reference(y);
        assert!(dangling.bitstring().is_err());
        assert_ne!(dangling, dangling.clone());
    }
}
