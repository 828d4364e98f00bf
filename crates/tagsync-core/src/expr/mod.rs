//! Boolean tag expressions: `foo -bar {baz,qux}`.
//!
//! Juxtaposition is AND, `,` is OR (lowest precedence), `-` negates a single
//! atom, `{ }` groups. A backslash makes the following `{`, `}` or `,` part
//! of the tag text.

mod ast;
mod parser;
mod serialize;
mod token;

use thiserror::Error;

pub use ast::Expr;
pub use parser::{parse, MAX_LITERALS, MAX_NESTING};
pub use serialize::{serialize, CompiledExpr, PLACEHOLDER_PREFIX};
pub use token::{tokenize, Token, TokenStack};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("malformed expression: {0}")]
    MalformedExpression(String),
}

impl ExprError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ExprError::MalformedExpression(reason.into())
    }
}

/// Tokenizes and parses `input`.
pub fn compile(input: &str) -> Result<Expr, ExprError> {
    parse(tokenize(input))
}
