pub mod domain;
pub mod error;
pub mod expr;
pub mod rules;
pub mod tags;

pub use domain::*;
pub use error::CoreError;
pub use expr::{compile, parse, serialize, tokenize, CompiledExpr, Expr, ExprError};
pub use rules::*;
pub use tags::*;
