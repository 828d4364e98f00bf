use crate::error::Result;
use rusqlite::types::Value;
use tagsync_core::expr::{compile, serialize, CompiledExpr, Expr};

/// Subquery yielding the tag names of the row under test in `posts`.
pub const POST_TAG_SOURCE: &str = "SELECT pt.tag FROM post_tags pt WHERE pt.post_id = posts.id";

/// A boolean tag expression over the local post mirror.
#[derive(Debug, Clone)]
pub struct PostQuery {
    compiled: CompiledExpr,
}

pub struct SqlQuery {
    pub sql: String,
    /// Named parameters, one per literal of the expression.
    pub params: Vec<(String, Value)>,
}

impl PostQuery {
    pub fn parse(input: &str) -> Result<Self> {
        let expr = compile(input)?;
        Ok(Self::from_expr(&expr))
    }

    pub fn from_expr(expr: &Expr) -> Self {
        Self {
            compiled: serialize(expr, POST_TAG_SOURCE),
        }
    }

    pub fn compiled(&self) -> &CompiledExpr {
        &self.compiled
    }

    pub fn to_sql(&self) -> SqlQuery {
        let sql = format!(
            "SELECT posts.id FROM posts WHERE {} ORDER BY posts.id ASC",
            self.compiled.template
        );
        let params = self
            .compiled
            .tokens
            .iter()
            .map(|(name, tag)| (name.clone(), Value::from(tag.clone())))
            .collect();
        SqlQuery { sql, params }
    }
}
