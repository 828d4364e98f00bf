use crate::domain::{PostId, RuleId};
use crate::expr::Expr;
use crate::tags::{TagDelta, TagRuleDelta, TagSet, DEFAULT_DELIMITER};

/// A match/replace rule.
///
/// `match_spec` is read as a predicate: its additions must be present on a
/// post and its removals absent. `replace_spec` is the edit proposed when the
/// predicate holds. Both are persisted as canonical strings, so
/// [`ReplacementRule::from_persisted`] followed by the string accessors is
/// byte-identical for canonical input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRule {
    pub id: RuleId,
    pub match_spec: TagDelta,
    pub replace_spec: TagRuleDelta,
    pub autofix: bool,
}

impl ReplacementRule {
    pub fn new(id: RuleId, match_spec: TagDelta, replace_spec: TagRuleDelta, autofix: bool) -> Self {
        Self {
            id,
            match_spec,
            replace_spec,
            autofix,
        }
    }

    pub fn from_persisted(id: RuleId, match_spec: &str, replace_spec: &str, autofix: bool) -> Self {
        Self {
            id,
            match_spec: TagDelta::parse(match_spec, DEFAULT_DELIMITER),
            replace_spec: TagRuleDelta::parse(replace_spec),
            autofix,
        }
    }

    pub fn match_string(&self) -> String {
        self.match_spec.canonical_string(DEFAULT_DELIMITER)
    }

    pub fn replace_string(&self) -> String {
        self.replace_spec.api_string()
    }

    pub fn matches(&self, tags: &TagSet) -> bool {
        self.match_spec.additions().all(|tag| tags.contains_name(tag))
            && !self.match_spec.removals().any(|tag| tags.contains_name(tag))
    }

    /// The match predicate as an expression, for pushing it down to a
    /// mirror query.
    pub fn predicate(&self) -> Option<Expr> {
        Expr::from_match_spec(&self.match_spec)
    }
}

/// Marks a rule as already handled for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppliedHistoryKey {
    pub rule_id: RuleId,
    pub post_id: PostId,
}

impl AppliedHistoryKey {
    pub fn new(rule_id: RuleId, post_id: PostId) -> Self {
        Self { rule_id, post_id }
    }
}

#[cfg(test)]
mod tests {
    use super::ReplacementRule;
    use crate::domain::RuleId;
    use crate::tags::TagSet;

    #[test]
    fn matches_requires_present_and_absent() {
        let rule = ReplacementRule::from_persisted(RuleId::new(), "a -b", "c", false);
        assert!(rule.matches(&TagSet::from_names(["a", "c"])));
        assert!(!rule.matches(&TagSet::from_names(["a", "b"])));
        assert!(!rule.matches(&TagSet::from_names(["c"])));
    }

    #[test]
    fn empty_match_spec_matches_everything() {
        let rule = ReplacementRule::from_persisted(RuleId::new(), "", "c", true);
        assert!(rule.matches(&TagSet::new()));
        assert!(rule.predicate().is_none());
    }

    #[test]
    fn persisted_strings_round_trip() {
        let rule = ReplacementRule::from_persisted(RuleId::new(), "cat -dog", "feline -cat", true);
        assert_eq!(rule.match_string(), "cat -dog");
        assert_eq!(rule.replace_string(), "feline -cat");
    }

    #[test]
    fn non_canonical_input_is_canonicalized() {
        let rule = ReplacementRule::from_persisted(RuleId::new(), "-dog  Cat", "b a", false);
        assert_eq!(rule.match_string(), "cat -dog");
        assert_eq!(rule.replace_string(), "a b");
    }

    #[test]
    fn predicate_agrees_with_matches() {
        let rule = ReplacementRule::from_persisted(RuleId::new(), "a b -c", "d", false);
        let predicate = rule.predicate().unwrap();
        for tags in [vec!["a", "b"], vec!["a", "b", "c"], vec!["a"], vec![]] {
            let set = TagSet::from_names(tags);
            assert_eq!(predicate.evaluate(&set), rule.matches(&set));
        }
    }
}
