//! Expression builder for linear integer arithmetic.
//!
//! Everything the encoder emits is built from these types and handed to an
//! [`Engine`](crate::engine::Engine) adapter, so the encoder never touches a
//! solver's native API.
//!
//! # Key Components
//!
//! - [`VarPool`] / [`VarId`]: declared integer and boolean variables
//! - [`Expr`]: sums, differences, constant multiples, if-then-else
//! - [`Formula`]: comparisons, boolean variables, `and`/`or`/`not`/`implies`
//! - [`Assignment`]: concrete evaluation against a model

mod eval;
mod term;
mod var;

pub use eval::Assignment;
pub use term::{CmpOp, Expr, Formula};
pub use var::{Sort, VarDecl, VarId, VarPool};
