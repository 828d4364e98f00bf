use crate::domain::{normalize_tag, TagName};
use crate::tags::delta::TagDelta;
use crate::tags::wildcard;
use std::collections::BTreeSet;

/// Status of a tag with respect to a [`TagSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMembership {
    Present,
    Absent,
}

/// The tags currently on a post, or the tags a user has toggled.
///
/// `Clone` is a deep copy; clones never share storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: BTreeSet<TagName>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw names, skipping blank ones.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.set(name.as_ref());
        }
        set
    }

    pub fn set(&mut self, raw: &str) {
        if let Ok(tag) = TagName::new(raw) {
            self.tags.insert(tag);
        }
    }

    pub fn clear(&mut self, raw: &str) {
        if let Ok(tag) = TagName::new(raw) {
            self.tags.remove(&tag);
        }
    }

    pub fn insert_name(&mut self, tag: TagName) {
        self.tags.insert(tag);
    }

    pub fn remove_name(&mut self, tag: &TagName) {
        self.tags.remove(tag);
    }

    pub fn status(&self, raw: &str) -> SetMembership {
        if self.contains(raw) {
            SetMembership::Present
        } else {
            SetMembership::Absent
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        TagName::new(raw)
            .map(|tag| self.tags.contains(&tag))
            .unwrap_or(false)
    }

    pub fn contains_name(&self, tag: &TagName) -> bool {
        self.tags.contains(tag)
    }

    /// Applies one token. `-tag` evicts the tag, and `-pat*tern` evicts every
    /// member the pattern matches. `+tag` and a bare `tag` insert.
    pub fn apply(&mut self, token: &str) {
        let token = token.trim();
        if let Some(rest) = token.strip_prefix('-') {
            self.retract(rest);
        } else if let Some(rest) = token.strip_prefix('+') {
            self.set(rest);
        } else {
            self.set(token);
        }
    }

    pub fn apply_many<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.apply(token.as_ref());
        }
    }

    pub fn apply_delimited(&mut self, input: &str, delimiter: &str) {
        for token in split_tokens(input, delimiter) {
            self.apply(token);
        }
    }

    /// `-tag` forces eviction (wildcards included), `+tag` forces insertion,
    /// a bare tag flips its membership.
    pub fn toggle(&mut self, token: &str) {
        let token = token.trim();
        if let Some(rest) = token.strip_prefix('-') {
            self.retract(rest);
        } else if let Some(rest) = token.strip_prefix('+') {
            self.set(rest);
        } else if let Ok(tag) = TagName::new(token) {
            if !self.tags.remove(&tag) {
                self.tags.insert(tag);
            }
        }
    }

    pub fn toggle_many<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.toggle(token.as_ref());
        }
    }

    pub fn toggle_delimited(&mut self, input: &str, delimiter: &str) {
        for token in split_tokens(input, delimiter) {
            self.toggle(token);
        }
    }

    /// Inserts the delta's additions, then evicts its removals.
    pub fn apply_delta(&mut self, delta: &TagDelta) {
        for tag in delta.additions() {
            self.tags.insert(tag.clone());
        }
        for tag in delta.removals() {
            self.tags.remove(tag);
        }
    }

    pub fn merge(&mut self, other: &TagSet) {
        self.tags.extend(other.tags.iter().cloned());
    }

    /// The delta that turns `self` into `target`.
    pub fn diff_to(&self, target: &TagSet) -> TagDelta {
        let mut delta = TagDelta::new();
        for tag in target.tags.difference(&self.tags) {
            delta.add_name(tag.clone());
        }
        for tag in self.tags.difference(&target.tags) {
            delta.remove_name(tag.clone());
        }
        delta
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagName> + '_ {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.as_str().to_string()).collect()
    }

    fn retract(&mut self, raw: &str) {
        if !raw.contains('*') {
            self.clear(raw);
            return;
        }
        let Ok(pattern) = normalize_tag(raw) else {
            return;
        };
        self.tags.retain(|tag| !wildcard::matches(&pattern, tag.as_str()));
    }
}

impl FromIterator<TagName> for TagSet {
    fn from_iter<T: IntoIterator<Item = TagName>>(iter: T) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn split_tokens<'a>(
    input: &'a str,
    delimiter: &'a str,
) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    if delimiter.trim().is_empty() {
        Box::new(input.split_whitespace())
    } else {
        Box::new(input.split(delimiter))
    }
}
