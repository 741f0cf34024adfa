//! Function application: a single capture-free beta step.

use std::collections::HashMap;

use crate::{
    expr::{Event, Expr, ExprRef, FunctionExpr, Parameter},
    prelude::*,
};

impl FunctionExpr {
    /// Substitutes `argument` for this function's parameter in its body.
    ///
    /// Every function inside the body is rebuilt around a fresh parameter, so the result shares
    /// no binders with `self`. References to parameters bound outside this function are kept.
    /// All occurrences of the parameter share the same `argument`.
    pub fn apply(&self, argument: ExprRef) -> Result<ExprRef> {
        let mut results: Vec<ExprRef> = vec![];
        let mut replacements = HashMap::<Parameter, ExprRef>::new();
        replacements.insert(self.parameter().clone(), argument);

        for event in self.body().flatten() {
            match event {
                Event::OpenApply => {}
                Event::CloseApply => {
                    let argument = pop_operand(&mut results)?;
                    let function = pop_operand(&mut results)?;
                    results.push(Expr::apply(function, argument));
                }
                Event::OpenFunction(parameter) => {
                    let fresh = Expr::reference(parameter.fresh());
                    if replacements.insert(parameter.clone(), fresh).is_some() {
                        return Err(Error::malformed(format!(
                            "parameter `{parameter}` is bound again inside its own function"
                        )));
                    }
                }
                Event::CloseFunction(parameter) => {
                    let fresh = match replacements.remove(parameter).as_deref() {
                        Some(Expr::Reference(fresh)) => fresh.clone(),
                        _ => {
                            return Err(Error::malformed(format!(
                                "parameter `{parameter}` is closed without being opened"
                            )))
                        }
                    };
                    let body = pop_operand(&mut results)?;
                    results.push(Expr::function(fresh, body));
                }
                Event::Name(parameter) => results.push(match replacements.get(parameter) {
                    Some(replacement) => replacement.clone(),
                    None => Expr::reference(parameter.clone()),
                }),
            }
        }

        let result = pop_operand(&mut results)?;
        if !results.is_empty() {
            return Err(Error::malformed("substitution left unused operands"));
        }
        tracing::debug!(parameter = %self.parameter(), "substituted");
        Ok(result)
    }
}

impl Expr {
    /// [`FunctionExpr::apply`] for an expression that is expected to be a function.
    pub fn call(&self, argument: ExprRef) -> Result<ExprRef> {
        self.as_function()
            .ok_or_else(|| Error::malformed("only a function can be applied to an argument"))?
            .apply(argument)
    }

    /// Performs the beta step at the root, if the root is an application of a function.
    pub fn reduce_root(&self) -> Option<Result<ExprRef>> {
        match self {
            Expr::Apply(function, argument) => function
                .as_function()
                .map(|function| function.apply(argument.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use std::{collections::HashSet, rc::Rc};

    use super::*;

    fn binders(expr: &Expr) -> HashSet<Parameter> {
        expr.flatten()
            .filter_map(|event| match event {
                Event::OpenFunction(parameter) => Some(parameter.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_identity() {
        let x = Parameter::named("x");
        let y = Parameter::named("y");
        let identity = Expr::function(x.clone(), Expr::reference(x));
        let argument = Expr::function(y.clone(), Expr::reference(y));
        let result = identity.call(argument.clone()).unwrap();
        assert!(Rc::ptr_eq(&result, &argument));
    }

    #[test]
    fn test_fresh_binders() {
        // (\x. \y. x y) (\z. z)  ~>  \y. (\z. z) y
        let x = Parameter::named("x");
        let y = Parameter::named("y");
        let z = Parameter::named("z");
        let function = Expr::function(
            x.clone(),
            Expr::function(
                y.clone(),
                Expr::apply(Expr::reference(x), Expr::reference(y.clone())),
            ),
        );
        let argument = Expr::function(z.clone(), Expr::reference(z));
        let result = function.call(argument.clone()).unwrap();

        let y2 = Parameter::named("y");
        let z2 = Parameter::named("z");
        let expected = Expr::function(
            y2.clone(),
            Expr::apply(
                Expr::function(z2.clone(), Expr::reference(z2)),
                Expr::reference(y2),
            ),
        );
        assert_eq!(result, expected);
        assert_eq!(result.bitstring().unwrap().as_str(), "0001001010");

        let produced = binders(&result);
        assert!(produced.is_disjoint(&binders(&function)));
        assert!(!produced.contains(&y));
        assert!(produced.is_superset(&binders(&argument)));
    }

    #[test]
    fn test_shared_argument() {
        // (\x. x x) a, under \a
        let a = Parameter::named("a");
        let x = Parameter::named("x");
        let function = Expr::function(
            x.clone(),
            Expr::apply(Expr::reference(x.clone()), Expr::reference(x)),
        );
        let argument = Expr::reference(a.clone());
        let result = function.call(argument.clone()).unwrap();
        match result.as_ref() {
            Expr::Apply(lhs, rhs) => {
                assert!(Rc::ptr_eq(lhs, &argument));
                assert!(Rc::ptr_eq(rhs, &argument));
            }
            other => panic!("expected an application, got {other:?}"),
        }
        let closed = Expr::function(a, result);
        assert_eq!(closed.bitstring().unwrap().as_str(), "00011010");
    }

    #[test]
    fn test_outer_reference() {
        // \w. (\x. w) v keeps the reference to w.
        let w = Parameter::named("w");
        let x = Parameter::named("x");
        let v = Parameter::named("v");
        let function = Expr::function(x, Expr::reference(w.clone()));
        let result = function.call(Expr::reference(v)).unwrap();
        assert!(matches!(result.as_ref(), Expr::Reference(p) if p == &w));
    }

    #[test]
    fn test_reduce_root() {
        let x = Parameter::named("x");
        let y = Parameter::named("y");
        let identity = Expr::function(x.clone(), Expr::reference(x));
        let argument = Expr::function(y.clone(), Expr::reference(y));
        let redex = Expr::apply(identity.clone(), argument.clone());
        let result = redex.reduce_root().unwrap().unwrap();
        assert!(Rc::ptr_eq(&result, &argument));
        assert!(identity.reduce_root().is_none());
        assert!(Expr::apply(argument.clone(), identity.clone())
            .reduce_root()
            .is_some());
    }

    #[test]
    fn test_call_non_function() {
        let a = Parameter::named("a");
        let reference = Expr::reference(a.clone());
        assert!(matches!(
            reference.call(Expr::reference(a)),
            Err(Error::MalformedExpr(_))
        ));
    }
}
