use crate::domain::TagName;
use crate::tags::delta::{TagDelta, DEFAULT_DELIMITER};
use crate::tags::set::{SetMembership, TagSet};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Which half of a delta a [`DeltaSideView`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaSide {
    Added,
    Removed,
}

/// The unit of change exchanged with the remote write API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRuleDelta {
    delta: TagDelta,
}

impl TagRuleDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(input: &str) -> Self {
        Self {
            delta: TagDelta::parse(input, DEFAULT_DELIMITER),
        }
    }

    /// Value of the API's tag diff parameter.
    pub fn api_string(&self) -> String {
        self.delta.canonical_string(DEFAULT_DELIMITER)
    }

    pub fn delta(&self) -> &TagDelta {
        &self.delta
    }

    pub fn delta_mut(&mut self) -> &mut TagDelta {
        &mut self.delta
    }

    pub fn into_delta(self) -> TagDelta {
        self.delta
    }

    pub fn is_zero(&self) -> bool {
        self.delta.is_zero()
    }

    /// Live view of the additions; writes go straight into this delta.
    pub fn added_tags(&mut self) -> DeltaSideView<'_> {
        DeltaSideView {
            delta: &mut self.delta,
            side: DeltaSide::Added,
        }
    }

    /// Live view of the removals; writes go straight into this delta.
    pub fn removed_tags(&mut self) -> DeltaSideView<'_> {
        DeltaSideView {
            delta: &mut self.delta,
            side: DeltaSide::Removed,
        }
    }

    pub fn flatten<'a, I>(deltas: I) -> TagRuleDelta
    where
        I: IntoIterator<Item = &'a TagRuleDelta>,
    {
        Self {
            delta: TagDelta::flatten(deltas.into_iter().map(|delta| &delta.delta)),
        }
    }
}

impl From<TagDelta> for TagRuleDelta {
    fn from(delta: TagDelta) -> Self {
        Self { delta }
    }
}

impl From<TagRuleDelta> for TagDelta {
    fn from(value: TagRuleDelta) -> Self {
        value.delta
    }
}

impl fmt::Display for TagRuleDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.api_string())
    }
}

impl FromStr for TagRuleDelta {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for TagRuleDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.api_string())
    }
}

/// One side of a [`TagRuleDelta`] seen as a tag set.
///
/// The view borrows the delta mutably, so it cannot outlive it or be cloned
/// away from it. Inserting through the view keeps the delta disjoint: a tag
/// set on the added side leaves the removed side. Use
/// [`DeltaSideView::to_tag_set`] for a detached copy.
pub struct DeltaSideView<'a> {
    delta: &'a mut TagDelta,
    side: DeltaSide,
}

impl DeltaSideView<'_> {
    pub fn side(&self) -> DeltaSide {
        self.side
    }

    pub fn set(&mut self, raw: &str) {
        match self.side {
            DeltaSide::Added => self.delta.add(raw),
            DeltaSide::Removed => self.delta.remove(raw),
        }
    }

    /// Drops the tag from this side only.
    pub fn clear(&mut self, raw: &str) {
        if let Ok(tag) = TagName::new(raw) {
            self.members_mut().remove(&tag);
        }
    }

    pub fn status(&self, raw: &str) -> SetMembership {
        let present = TagName::new(raw)
            .map(|tag| self.members().contains(&tag))
            .unwrap_or(false);
        if present {
            SetMembership::Present
        } else {
            SetMembership::Absent
        }
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagName> + '_ {
        self.members().iter()
    }

    pub fn to_tag_set(&self) -> TagSet {
        self.members().iter().cloned().collect()
    }

    fn members(&self) -> &BTreeSet<TagName> {
        match self.side {
            DeltaSide::Added => &self.delta.additions,
            DeltaSide::Removed => &self.delta.removals,
        }
    }

    fn members_mut(&mut self) -> &mut BTreeSet<TagName> {
        match self.side {
            DeltaSide::Added => &mut self.delta.additions,
            DeltaSide::Removed => &mut self.delta.removals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TagRuleDelta;
    use crate::tags::delta::DeltaMembership;
    use crate::tags::set::SetMembership;

    #[test]
    fn api_string_is_canonical() {
        let delta = TagRuleDelta::parse("foo bar -baz");
        assert_eq!(delta.api_string(), "bar foo -baz");
    }

    #[test]
    fn view_writes_reach_the_delta() {
        let mut delta = TagRuleDelta::new();
        delta.added_tags().set("wolf");
        delta.removed_tags().set("dog");
        assert_eq!(delta.api_string(), "wolf -dog");
    }

    #[test]
    fn view_insert_keeps_sides_disjoint() {
        let mut delta = TagRuleDelta::parse("-wolf");
        delta.added_tags().set("wolf");
        assert_eq!(delta.delta().status("wolf"), DeltaMembership::Added);
        assert!(delta.removed_tags().is_empty());
    }

    #[test]
    fn view_clear_touches_one_side() {
        let mut delta = TagRuleDelta::parse("a -b");
        delta.added_tags().clear("b");
        assert_eq!(delta.api_string(), "a -b");
        delta.removed_tags().clear("b");
        assert_eq!(delta.api_string(), "a");
    }

    #[test]
    fn detached_copy_does_not_write_back() {
        let mut delta = TagRuleDelta::parse("a");
        let mut copy = delta.added_tags().to_tag_set();
        copy.set("b");
        assert_eq!(delta.added_tags().status("b"), SetMembership::Absent);
        assert_eq!(delta.api_string(), "a");
    }

    #[test]
    fn cloned_delta_has_its_own_views() {
        let original = TagRuleDelta::parse("a");
        let mut clone = original.clone();
        clone.added_tags().set("b");
        assert_eq!(original.api_string(), "a");
        assert_eq!(clone.api_string(), "a b");
    }
}
