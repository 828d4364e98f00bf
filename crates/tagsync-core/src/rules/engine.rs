use crate::domain::{PostId, RuleId};
use crate::rules::replacement::{AppliedHistoryKey, ReplacementRule};
use crate::tags::{TagRuleDelta, TagSet};
use std::collections::HashSet;

/// A replace spec proposed for a post, with the rule it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedEdit {
    pub rule_id: RuleId,
    pub delta: TagRuleDelta,
}

/// Matching rules for one post, split into automatic and moderator-prompted
/// buckets. Both keep rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub post_id: PostId,
    pub auto: Vec<ProposedEdit>,
    pub prompt: Vec<ProposedEdit>,
    /// Matching rules suppressed by a recent history record.
    pub suppressed: Vec<RuleId>,
}

impl MatchOutcome {
    fn new(post_id: PostId) -> Self {
        Self {
            post_id,
            auto: Vec::new(),
            prompt: Vec::new(),
            suppressed: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.auto.is_empty() && self.prompt.is_empty()
    }

    pub fn auto_delta(&self) -> TagRuleDelta {
        combine(&self.auto)
    }

    pub fn auto_rule_ids(&self) -> Vec<RuleId> {
        self.auto.iter().map(|edit| edit.rule_id).collect()
    }
}

/// Folds edits into one delta in order; later edits win on conflicts.
pub fn combine(edits: &[ProposedEdit]) -> TagRuleDelta {
    TagRuleDelta::flatten(edits.iter().map(|edit| &edit.delta))
}

/// Evaluates every rule against a post's tags.
///
/// Rules with a key in `applied` are left out of both buckets. `applied`
/// should only hold keys inside the retention window.
pub fn evaluate_post(
    rules: &[ReplacementRule],
    post_id: PostId,
    tags: &TagSet,
    applied: &HashSet<AppliedHistoryKey>,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::new(post_id);
    for rule in rules.iter().filter(|rule| rule.matches(tags)) {
        if applied.contains(&AppliedHistoryKey::new(rule.id, post_id)) {
            outcome.suppressed.push(rule.id);
            continue;
        }
        let edit = ProposedEdit {
            rule_id: rule.id,
            delta: rule.replace_spec.clone(),
        };
        if rule.autofix {
            outcome.auto.push(edit);
        } else {
            outcome.prompt.push(edit);
        }
    }
    outcome
}

/// Evaluates a batch of posts, keeping only posts with something to do.
pub fn evaluate_batch<'a, I>(
    rules: &[ReplacementRule],
    posts: I,
    applied: &HashSet<AppliedHistoryKey>,
) -> Vec<MatchOutcome>
where
    I: IntoIterator<Item = (PostId, &'a TagSet)>,
{
    posts
        .into_iter()
        .map(|(post_id, tags)| evaluate_post(rules, post_id, tags, applied))
        .filter(|outcome| !outcome.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{combine, evaluate_batch, evaluate_post};
    use crate::domain::{PostId, RuleId};
    use crate::rules::replacement::{AppliedHistoryKey, ReplacementRule};
    use crate::tags::TagSet;
    use std::collections::HashSet;

    fn post(id: i64) -> PostId {
        PostId::new(id).unwrap()
    }

    #[test]
    fn partitions_by_autofix() {
        let auto = ReplacementRule::from_persisted(RuleId::new(), "a", "b", true);
        let prompt = ReplacementRule::from_persisted(RuleId::new(), "a", "c", false);
        let miss = ReplacementRule::from_persisted(RuleId::new(), "z", "y", true);
        let rules = vec![auto.clone(), prompt.clone(), miss];

        let outcome = evaluate_post(&rules, post(1), &TagSet::from_names(["a"]), &HashSet::new());
        assert_eq!(outcome.auto_rule_ids(), vec![auto.id]);
        assert_eq!(outcome.prompt.len(), 1);
        assert_eq!(outcome.prompt[0].rule_id, prompt.id);
    }

    #[test]
    fn history_suppresses_rule() {
        let rule = ReplacementRule::from_persisted(RuleId::new(), "a -b", "c", true);
        let mut applied = HashSet::new();
        applied.insert(AppliedHistoryKey::new(rule.id, post(7)));

        let rules = vec![rule.clone()];
        let tags = TagSet::from_names(["a"]);
        let outcome = evaluate_post(&rules, post(7), &tags, &applied);
        assert!(outcome.is_empty());
        assert_eq!(outcome.suppressed, vec![rule.id]);

        let other = evaluate_post(&rules, post(8), &tags, &applied);
        assert_eq!(other.auto.len(), 1);
    }

    #[test]
    fn auto_bucket_flattens_in_rule_order() {
        let first = ReplacementRule::from_persisted(RuleId::new(), "a", "x", true);
        let second = ReplacementRule::from_persisted(RuleId::new(), "a", "-x y", true);
        let rules = vec![first, second];
        let outcome = evaluate_post(&rules, post(1), &TagSet::from_names(["a"]), &HashSet::new());
        assert_eq!(outcome.auto_delta().api_string(), "y -x");
    }

    #[test]
    fn combine_of_nothing_is_zero() {
        assert!(combine(&[]).is_zero());
    }

    #[test]
    fn batch_drops_untouched_posts() {
        let rules = vec![ReplacementRule::from_persisted(RuleId::new(), "a", "b", false)];
        let hit = TagSet::from_names(["a"]);
        let miss = TagSet::from_names(["c"]);
        let outcomes = evaluate_batch(
            &rules,
            vec![(post(1), &hit), (post(2), &miss)],
            &HashSet::new(),
        );
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].post_id, post(1));
    }
}
