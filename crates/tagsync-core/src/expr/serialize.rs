use crate::expr::ast::Expr;
use serde::Serialize;
use std::collections::BTreeMap;

/// Prefix of every placeholder in a compiled template.
pub const PLACEHOLDER_PREFIX: &str = ":t";

/// A query template and the literal tag text each placeholder stands for.
///
/// Literals never appear in `template`; the caller binds or escapes each
/// entry of `tokens` with its own primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledExpr {
    pub template: String,
    pub tokens: BTreeMap<String, String>,
}

/// Serializes `expr` into a boolean query fragment.
///
/// Each literal becomes a membership test of a fresh placeholder against
/// `source`, a caller-supplied subquery yielding the candidate's tag names.
/// Every connective is parenthesized.
pub fn serialize(expr: &Expr, source: &str) -> CompiledExpr {
    let mut compiled = CompiledExpr::default();
    let template = write_node(expr, source, &mut compiled.tokens);
    compiled.template = template;
    compiled
}

fn write_node(expr: &Expr, source: &str, tokens: &mut BTreeMap<String, String>) -> String {
    match expr {
        Expr::Literal { tag, negate } => {
            let placeholder = format!("{PLACEHOLDER_PREFIX}{}", tokens.len());
            tokens.insert(placeholder.clone(), tag.as_str().to_string());
            let op = if *negate { "NOT IN" } else { "IN" };
            format!("({placeholder} {op} ({source}))")
        }
        Expr::Not(inner) => format!("(NOT {})", write_node(inner, source, tokens)),
        Expr::And(left, right) => {
            let left = write_node(left, source, tokens);
            let right = write_node(right, source, tokens);
            format!("({left} AND {right})")
        }
        Expr::Or(left, right) => {
            let left = write_node(left, source, tokens);
            let right = write_node(right, source, tokens);
            format!("({left} OR {right})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::serialize;
    use crate::expr::{compile, Expr};
    use crate::tags::TagDelta;

    #[test]
    fn literals_go_to_the_token_table() {
        let expr = compile("foo -bar {baz,qux}").unwrap();
        let compiled = serialize(&expr, "S");
        assert_eq!(
            compiled.template,
            "(((:t0 IN (S)) AND (NOT (:t1 IN (S)))) AND ((:t2 IN (S)) OR (:t3 IN (S))))"
        );
        let tokens: Vec<(&str, &str)> = compiled
            .tokens
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        assert_eq!(
            tokens,
            vec![
                (":t0", "foo"),
                (":t1", "bar"),
                (":t2", "baz"),
                (":t3", "qux")
            ]
        );
    }

    #[test]
    fn quoting_characters_never_reach_the_template() {
        let expr = compile("o'brien").unwrap();
        let compiled = serialize(&expr, "S");
        assert!(!compiled.template.contains('\''));
        assert_eq!(compiled.tokens[":t0"], "o'brien");
    }

    #[test]
    fn negated_literal_uses_not_in() {
        let expr = Expr::from_match_spec(&TagDelta::parse("-b", " ")).unwrap();
        assert_eq!(serialize(&expr, "S").template, "(:t0 NOT IN (S))");
    }
}
