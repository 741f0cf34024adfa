//! Conversion between the name-based [`ast::Term`] and the binder-based [`Expr`].

use std::collections::{HashMap, HashSet};

use rpds::Stack;

use crate::{
    ast::{self, Term, TermRef},
    expr::{Event, Expr, ExprRef, Parameter},
    prelude::*,
};

/// Names in scope, innermost first.
#[derive(Default, Clone, Debug)]
pub struct Context {
    bindings: Stack<(Identifier, Parameter)>,
}

impl Context {
    /// Introduces a free name that terms bound in this context may refer to.
    pub fn declare(&mut self, name: impl Into<String>) -> Parameter {
        let name = Identifier::new(name.into());
        let parameter = Parameter::new(name.clone());
        self.bindings = self.bindings.push((name, parameter.clone()));
        parameter
    }

    fn pushed(&self, name: Identifier, parameter: Parameter) -> Self {
        Self {
            bindings: self.bindings.push((name, parameter)),
        }
    }

    fn innermost(&self) -> Option<&Parameter> {
        self.bindings.peek().map(|(_, parameter)| parameter)
    }

    pub fn lookup(&self, name: &str) -> Option<&Parameter> {
        self.bindings
            .iter()
            .find_map(|(n, parameter)| (n.as_str() == name).then(|| parameter))
    }

    /// Parameters that are not shadowed, paired with the name they are visible under.
    fn visible(&self) -> impl Iterator<Item = (&Identifier, &Parameter)> {
        let mut seen = HashSet::new();
        self.bindings
            .iter()
            .filter(move |(name, _)| seen.insert(name.clone()))
            .map(|(name, parameter)| (name, parameter))
    }
}

pub fn bind(term: &Term) -> Result<ExprRef> {
    bind_in(&Context::default(), term)
}

/// Resolves every name in `term` to the nearest enclosing function, or else to `context`.
pub fn bind_in(context: &Context, term: &Term) -> Result<ExprRef> {
    let mut contexts = vec![context.clone()];
    let mut exprs: Vec<ExprRef> = vec![];

    for event in term.flatten() {
        let current = contexts.last().unwrap_or(context);
        match event {
            ast::Event::Name(name) => {
                let parameter = current
                    .lookup(name)
                    .ok_or_else(|| Error::UnboundName(name.clone()))?;
                exprs.push(Expr::reference(parameter.clone()));
            }
            ast::Event::OpenFunction(name) => {
                let scope = current.pushed(name.clone(), Parameter::new(name.clone()));
                contexts.push(scope);
            }
            ast::Event::CloseFunction(_) => {
                let parameter = contexts
                    .pop()
                    .as_ref()
                    .and_then(Context::innermost)
                    .cloned()
                    .ok_or_else(|| Error::malformed("function closed without being opened"))?;
                let body = pop_operand(&mut exprs)?;
                exprs.push(Expr::function(parameter, body));
            }
            ast::Event::OpenApply => {}
            ast::Event::CloseApply => {
                let argument = pop_operand(&mut exprs)?;
                let function = pop_operand(&mut exprs)?;
                exprs.push(Expr::apply(function, argument));
            }
        }
    }

    let expr = pop_operand(&mut exprs)?;
    if !exprs.is_empty() {
        return Err(Error::malformed("binding left unused operands"));
    }
    tracing::debug!("bound term");
    Ok(expr)
}

/// `base`, then `base` followed by every digit string, shortest first.
fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    let suffixed = (1..)
        .map_while(|width: u32| Some((width as usize, 10u64.checked_pow(width)?)))
        .flat_map(move |(width, count)| (0..count).map(move |i| format!("{base}{i:0width$}")));
    std::iter::once(base.to_string()).chain(suffixed)
}

fn name_avoiding(names_in_scope: &HashSet<Identifier>, base: &str) -> Identifier {
    candidates(base)
        .find(|candidate| !names_in_scope.contains(candidate))
        .map(Identifier::new)
        .unwrap_or_else(|| unreachable!("there are infinitely many candidates"))
}

pub fn unbind(expr: &Expr) -> Result<TermRef> {
    unbind_in(&Context::default(), expr)
}

/// Rebuilds a name-based term, renaming parameters where their names would be captured.
/// Parameters visible in `context` keep their context names.
pub fn unbind_in(context: &Context, expr: &Expr) -> Result<TermRef> {
    let mut terms: Vec<TermRef> = vec![];
    let mut binders: Vec<Identifier> = vec![];
    let mut replacements = HashMap::<Parameter, Identifier>::new();
    let mut names_in_scope = HashSet::<Identifier>::new();
    for (name, parameter) in context.visible() {
        replacements.insert(parameter.clone(), name.clone());
    }
    names_in_scope.extend(replacements.values().cloned());

    for event in expr.flatten() {
        match event {
            Event::OpenApply => {}
            Event::CloseApply => {
                let argument = pop_operand(&mut terms)?;
                let function = pop_operand(&mut terms)?;
                terms.push(Term::Apply(function, argument).into());
            }
            Event::OpenFunction(parameter) => {
                let name = name_avoiding(&names_in_scope, parameter.name());
                if replacements
                    .insert(parameter.clone(), name.clone())
                    .is_some()
                {
                    return Err(Error::malformed(format!(
                        "parameter `{parameter}` is bound again inside its own function"
                    )));
                }
                if name != *parameter.name() {
                    tracing::debug!(from = %parameter, to = %name, "renamed parameter");
                }
                names_in_scope.insert(name.clone());
                binders.push(name);
            }
            Event::CloseFunction(parameter) => {
                let body = pop_operand(&mut terms)?;
                let name = pop_operand(&mut binders)?;
                replacements.remove(parameter);
                names_in_scope.remove(&name);
                terms.push(Term::Function(name, body).into());
            }
            Event::Name(parameter) => {
                let name = replacements.get(parameter).ok_or_else(|| {
                    Error::malformed(format!("reference to `{parameter}` outside of its function"))
                })?;
                terms.push(Term::Name(name.clone()).into());
            }
        }
    }

    let term = pop_operand(&mut terms)?;
    if !terms.is_empty() {
        return Err(Error::malformed("unbinding left unused operands"));
    }
    Ok(term)
}
