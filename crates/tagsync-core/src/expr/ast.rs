use crate::domain::TagName;
use crate::tags::{TagDelta, TagSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal { tag: TagName, negate: bool },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluates the expression against an in-memory tag set.
    pub fn evaluate(&self, tags: &TagSet) -> bool {
        match self {
            Expr::Literal { tag, negate } => tags.contains_name(tag) != *negate,
            Expr::Not(inner) => !inner.evaluate(tags),
            Expr::And(left, right) => left.evaluate(tags) && right.evaluate(tags),
            Expr::Or(left, right) => left.evaluate(tags) || right.evaluate(tags),
        }
    }

    /// The presence/absence predicate of a match spec as an AND chain of
    /// literals, additions first. `None` for a zero delta.
    pub fn from_match_spec(spec: &TagDelta) -> Option<Expr> {
        let literals = spec
            .additions()
            .map(|tag| (tag, false))
            .chain(spec.removals().map(|tag| (tag, true)))
            .map(|(tag, negate)| Expr::Literal {
                tag: tag.clone(),
                negate,
            });
        literals.reduce(|left, right| Expr::And(Box::new(left), Box::new(right)))
    }

    pub fn literal_count(&self) -> usize {
        match self {
            Expr::Literal { .. } => 1,
            Expr::Not(inner) => inner.literal_count(),
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.literal_count() + right.literal_count()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Expr;
    use crate::tags::{TagDelta, TagSet};

    #[test]
    fn match_spec_becomes_conjunction() {
        let spec = TagDelta::parse("a -b", " ");
        let expr = Expr::from_match_spec(&spec).unwrap();
        assert_eq!(expr.literal_count(), 2);
        assert!(expr.evaluate(&TagSet::from_names(["a", "c"])));
        assert!(!expr.evaluate(&TagSet::from_names(["a", "b"])));
    }

    #[test]
    fn zero_match_spec_has_no_predicate() {
        assert!(Expr::from_match_spec(&TagDelta::new()).is_none());
    }
}
