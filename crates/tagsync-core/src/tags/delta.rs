use crate::domain::TagName;
use crate::tags::set::{split_tokens, TagSet};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Delimiter of the canonical wire string.
pub const DEFAULT_DELIMITER: &str = " ";

/// Status of a tag with respect to a [`TagDelta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMembership {
    Added,
    Removed,
    Neutral,
}

/// A proposed change to a tag set: tags to add and tags to remove.
///
/// A tag is never in both sets. Every mutator that puts a tag on one side
/// evicts it from the other first. Both sets are always allocated, so an
/// empty delta has exactly one representation and derived equality is
/// structural.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    pub(crate) additions: BTreeSet<TagName>,
    pub(crate) removals: BTreeSet<TagName>,
}

impl TagDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses free-form text split on `delimiter`, see [`TagDelta::apply`].
    /// A blank delimiter splits on any whitespace.
    pub fn parse(input: &str, delimiter: &str) -> Self {
        let mut delta = Self::new();
        delta.apply_delimited(input, delimiter);
        delta
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut delta = Self::new();
        for token in tokens {
            delta.apply(token.as_ref());
        }
        delta
    }

    pub fn from_raw<A, R, Z>(adds: A, removes: R, resets: Z) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
        Z: IntoIterator,
        Z::Item: AsRef<str>,
    {
        let mut delta = Self::new();
        delta.apply_raw(adds, removes, resets);
        delta
    }

    pub fn add(&mut self, raw: &str) {
        if let Ok(tag) = TagName::new(raw) {
            self.add_name(tag);
        }
    }

    pub fn remove(&mut self, raw: &str) {
        if let Ok(tag) = TagName::new(raw) {
            self.remove_name(tag);
        }
    }

    /// Forgets any pending change for the tag.
    pub fn reset(&mut self, raw: &str) {
        if let Ok(tag) = TagName::new(raw) {
            self.reset_name(&tag);
        }
    }

    pub fn add_name(&mut self, tag: TagName) {
        self.removals.remove(&tag);
        self.additions.insert(tag);
    }

    pub fn remove_name(&mut self, tag: TagName) {
        self.additions.remove(&tag);
        self.removals.insert(tag);
    }

    pub fn reset_name(&mut self, tag: &TagName) {
        self.additions.remove(tag);
        self.removals.remove(tag);
    }

    /// Applies one user-typed token: `-tag` removes, `=tag` resets, `+tag`
    /// and a bare `tag` add.
    pub fn apply(&mut self, token: &str) {
        let token = token.trim();
        if let Some(rest) = token.strip_prefix('-') {
            self.remove(rest);
        } else if let Some(rest) = token.strip_prefix('+') {
            self.add(rest);
        } else if let Some(rest) = token.strip_prefix('=') {
            self.reset(rest);
        } else {
            self.add(token);
        }
    }

    pub fn apply_delimited(&mut self, input: &str, delimiter: &str) {
        for token in split_tokens(input, delimiter) {
            self.apply(token);
        }
    }

    /// Applies already classified, unprefixed lists: additions first, then
    /// removals, then resets.
    pub fn apply_raw<A, R, Z>(&mut self, adds: A, removes: R, resets: Z)
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
        Z: IntoIterator,
        Z::Item: AsRef<str>,
    {
        for tag in adds {
            self.add(tag.as_ref());
        }
        for tag in removes {
            self.remove(tag.as_ref());
        }
        for tag in resets {
            self.reset(tag.as_ref());
        }
    }

    pub fn status(&self, raw: &str) -> DeltaMembership {
        let Ok(tag) = TagName::new(raw) else {
            return DeltaMembership::Neutral;
        };
        if self.additions.contains(&tag) {
            DeltaMembership::Added
        } else if self.removals.contains(&tag) {
            DeltaMembership::Removed
        } else {
            DeltaMembership::Neutral
        }
    }

    pub fn additions(&self) -> impl Iterator<Item = &TagName> + '_ {
        self.additions.iter()
    }

    pub fn removals(&self) -> impl Iterator<Item = &TagName> + '_ {
        self.removals.iter()
    }

    pub fn is_zero(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.additions.len() + self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_zero()
    }

    /// Sorted additions, then sorted removals prefixed with `-`, joined by
    /// `delimiter`. The remote API and persisted rules depend on this exact
    /// ordering.
    pub fn canonical_string(&self, delimiter: &str) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.len());
        parts.extend(self.additions.iter().map(|tag| tag.as_str().to_string()));
        parts.extend(self.removals.iter().map(|tag| format!("-{}", tag)));
        parts.join(delimiter)
    }

    /// Drops every addition that `other` also adds and every removal that
    /// `other` also removes. Tags the two deltas disagree on are kept.
    pub fn difference(&mut self, other: &TagDelta) {
        for tag in &other.additions {
            self.additions.remove(tag);
        }
        for tag in &other.removals {
            self.removals.remove(tag);
        }
    }

    pub fn invert(&self) -> TagDelta {
        TagDelta {
            additions: self.removals.clone(),
            removals: self.additions.clone(),
        }
    }

    /// Sequential composition: `self` replayed first, then `other`. On a
    /// conflicting tag the later delta wins, so the operation is associative
    /// but not commutative.
    pub fn union(&self, other: &TagDelta) -> TagDelta {
        let mut out = TagDelta::new();
        out.replay(self);
        out.replay(other);
        out
    }

    /// Left fold of [`TagDelta::union`] over `deltas`, starting from zero.
    pub fn flatten<'a, I>(deltas: I) -> TagDelta
    where
        I: IntoIterator<Item = &'a TagDelta>,
    {
        let mut out = TagDelta::new();
        for delta in deltas {
            out.replay(delta);
        }
        out
    }

    /// The part of this delta that would change `tags`: additions not yet
    /// present and removals currently present.
    pub fn effective_against(&self, tags: &TagSet) -> TagDelta {
        TagDelta {
            additions: self
                .additions
                .iter()
                .filter(|tag| !tags.contains_name(tag))
                .cloned()
                .collect(),
            removals: self
                .removals
                .iter()
                .filter(|tag| tags.contains_name(tag))
                .cloned()
                .collect(),
        }
    }

    fn replay(&mut self, other: &TagDelta) {
        for tag in &other.additions {
            self.add_name(tag.clone());
        }
        for tag in &other.removals {
            self.remove_name(tag.clone());
        }
    }
}

impl fmt::Display for TagDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_string(DEFAULT_DELIMITER))
    }
}

impl FromStr for TagDelta {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, DEFAULT_DELIMITER))
    }
}

#[cfg(test)]
mod tests {
    use super::{DeltaMembership, TagDelta};

    #[test]
    fn add_evicts_from_removals() {
        let mut delta = TagDelta::new();
        delta.remove("cat");
        delta.add("cat");
        assert_eq!(delta.status("cat"), DeltaMembership::Added);
        assert_eq!(delta.len(), 1);
    }

    #[test]
    fn remove_evicts_from_additions() {
        let mut delta = TagDelta::new();
        delta.add("cat");
        delta.remove("cat");
        assert_eq!(delta.status("cat"), DeltaMembership::Removed);
        assert_eq!(delta.len(), 1);
    }

    #[test]
    fn reset_clears_both_sides() {
        let mut delta = TagDelta::parse("cat -dog", " ");
        delta.reset("cat");
        delta.reset("dog");
        assert!(delta.is_zero());
        assert_eq!(delta.status("cat"), DeltaMembership::Neutral);
    }

    #[test]
    fn empty_tags_are_ignored() {
        let mut delta = TagDelta::new();
        delta.add("");
        delta.remove("   ");
        delta.apply("-");
        delta.apply("+");
        assert!(delta.is_zero());
    }

    #[test]
    fn apply_reads_prefixes() {
        let delta = TagDelta::parse("+Fox -wolf =fox bear", " ");
        assert_eq!(delta.status("fox"), DeltaMembership::Neutral);
        assert_eq!(delta.status("wolf"), DeltaMembership::Removed);
        assert_eq!(delta.status("bear"), DeltaMembership::Added);
    }

    #[test]
    fn apply_raw_applies_lists_in_order() {
        let delta = TagDelta::from_raw(["a", "b"], ["b", "c"], ["a"]);
        assert_eq!(delta.status("a"), DeltaMembership::Neutral);
        assert_eq!(delta.status("b"), DeltaMembership::Removed);
        assert_eq!(delta.status("c"), DeltaMembership::Removed);
    }

    #[test]
    fn apply_raw_skips_prefixed_names() {
        // lists are unprefixed, so a leading operator is an invalid name
        let delta = TagDelta::from_raw(["-a", "b"], ["+c"], Vec::<&str>::new());
        assert_eq!(delta.canonical_string(" "), "b");
    }

    #[test]
    fn operator_prefixed_tags_are_dropped_before_serializing() {
        for input in ["+-x", "++x", "+=x", "--x", "-+x"] {
            let delta = TagDelta::parse(&format!("{input} keep"), " ");
            let wire = delta.canonical_string(" ");
            assert_eq!(wire, "keep", "{input}");
            assert_eq!(TagDelta::parse(&wire, " "), delta, "{input}");
        }
    }

    #[test]
    fn canonical_string_sorts_each_side() {
        let delta = TagDelta::parse("foo -baz bar", " ");
        assert_eq!(delta.canonical_string(" "), "bar foo -baz");
        assert_eq!(delta.canonical_string(","), "bar,foo,-baz");
        assert_eq!(TagDelta::new().canonical_string(" "), "");
    }

    #[test]
    fn custom_delimiter_parse() {
        let delta = TagDelta::parse("long hair,-short hair", ",");
        assert_eq!(delta.status("long_hair"), DeltaMembership::Added);
        assert_eq!(delta.status("short_hair"), DeltaMembership::Removed);
    }

    #[test]
    fn difference_drops_shared_terms_only() {
        let mut this = TagDelta::parse("a b -c -d", " ");
        let other = TagDelta::parse("a -c -b d", " ");
        this.difference(&other);
        // `b` (added here, removed there) and `d` (removed here, added there)
        // are cross terms and stay untouched
        assert_eq!(this.to_string(), "b -d");
    }

    #[test]
    fn difference_is_not_symmetric() {
        let mut left = TagDelta::parse("a b", " ");
        let mut right = TagDelta::parse("a", " ");
        left.difference(&TagDelta::parse("a", " "));
        right.difference(&TagDelta::parse("a b", " "));
        assert_eq!(left.to_string(), "b");
        assert!(right.is_zero());
    }

    #[test]
    fn union_is_last_writer_wins() {
        let adds = TagDelta::parse("x", " ");
        let removes = TagDelta::parse("-x", " ");
        assert_eq!(adds.union(&removes).status("x"), DeltaMembership::Removed);
        assert_eq!(removes.union(&adds).status("x"), DeltaMembership::Added);
    }

    #[test]
    fn flatten_of_nothing_is_zero() {
        assert!(TagDelta::flatten(std::iter::empty()).is_zero());
    }

    #[test]
    fn display_and_from_str_agree() {
        let delta: TagDelta = "b a -z".parse().unwrap();
        assert_eq!(delta.to_string(), "a b -z");
    }
}
