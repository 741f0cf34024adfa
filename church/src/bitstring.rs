//! Canonical binary encoding of expressions.
//!
//! Functions are written `00`, applications `01`, and a reference to the binder `n` levels out
//! (de Bruijn index `n`, innermost is 0) as `n + 1` ones followed by a zero. Bound names do not
//! appear in the encoding, so alpha-equivalent expressions encode identically.

use std::collections::HashMap;

use crate::{
    expr::{Event, Expr, Parameter},
    prelude::*,
};

#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
pub struct BitString(String);

impl BitString {
    pub fn encode(expr: &Expr) -> Result<Self> {
        // Open binder -> number of binders already open when it was opened.
        let mut depths = HashMap::<&Parameter, usize>::new();
        let mut bits = String::new();
        for event in expr.flatten() {
            match event {
                Event::OpenApply => bits.push_str("01"),
                Event::CloseApply => {}
                Event::OpenFunction(parameter) => {
                    bits.push_str("00");
                    let depth = depths.len();
                    if depths.insert(parameter, depth).is_some() {
                        return Err(Error::malformed(format!(
                            "parameter `{parameter}` is bound again inside its own function"
                        )));
                    }
                }
                Event::CloseFunction(parameter) => match depths.remove(parameter) {
                    Some(depth) if depth == depths.len() => {}
                    _ => {
                        return Err(Error::malformed(format!(
                            "parameter `{parameter}` is closed out of scope order"
                        )))
                    }
                },
                Event::Name(parameter) => {
                    let depth = depths.get(parameter).ok_or_else(|| {
                        Error::malformed(format!(
                            "reference to `{parameter}` outside of its function"
                        ))
                    })?;
                    let index = depths.len() - 1 - depth;
                    bits.push('1');
                    bits.extend(std::iter::repeat('1').take(index));
                    bits.push('0');
                }
            }
        }
        Ok(Self(bits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
