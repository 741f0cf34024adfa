//! A small untyped lambda-calculus kernel.
//!
//! Text is tokenized by [`lexer`], parsed into a name-based [`ast::Term`] by the shift-reduce
//! automaton in [`parser`], and bound by [`binder::bind`] into an [`expr::Expr`], where every
//! reference points at its binding [`expr::Parameter`]. Bound expressions compare by their
//! canonical [`bitstring::BitString`], can be applied to an argument (see [`substitute`]), and
//! can be turned back into terms with fresh, non-capturing names by [`binder::unbind`].

pub mod ast;
pub mod binder;
pub mod bitstring;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod prelude;
pub mod substitute;
pub mod traversal;

pub use binder::{bind, bind_in, unbind, unbind_in, Context};
pub use expr::{Expr, ExprRef, FunctionExpr, Parameter};
pub use parser::parse;
pub use prelude::{Error, Result};
