use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A lower-cased tag identifier.
///
/// Equality is plain string equality; case folding happens once, when the
/// name is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let normalized = normalize_tag(raw)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Characters the delta wire format reads as operators at the start of a
/// token. A name starting with one would not survive a round trip.
const OPERATOR_PREFIXES: [char; 3] = ['-', '+', '='];

pub fn normalize_tag(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with(OPERATOR_PREFIXES) {
        return Err(CoreError::InvalidTagName);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut prev_space = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push('_');
            }
            prev_space = true;
            continue;
        }
        prev_space = false;
        out.extend(ch.to_lowercase());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, TagName};

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_tag(" Blue_Eyes ").unwrap(), "blue_eyes");
    }

    #[test]
    fn normalize_joins_whitespace_with_underscore() {
        assert_eq!(normalize_tag("long   hair").unwrap(), "long_hair");
    }

    #[test]
    fn normalize_keeps_dashes() {
        assert_eq!(normalize_tag("T-Shirt").unwrap(), "t-shirt");
    }

    #[test]
    fn normalize_rejects_blank() {
        assert!(normalize_tag("  ").is_err());
        assert!(TagName::new("").is_err());
    }

    #[test]
    fn normalize_rejects_operator_prefixes() {
        assert!(normalize_tag("-oc_only").is_err());
        assert!(normalize_tag(" +x").is_err());
        assert!(TagName::new("=x").is_err());
        assert_eq!(normalize_tag("x-+=").unwrap(), "x-+=");
    }

    #[test]
    fn tag_names_order_bytewise() {
        let mut names = vec![
            TagName::new("foo").unwrap(),
            TagName::new("Bar").unwrap(),
            TagName::new("baz").unwrap(),
        ];
        names.sort();
        let raw: Vec<&str> = names.iter().map(|name| name.as_str()).collect();
        assert_eq!(raw, vec!["bar", "baz", "foo"]);
    }
}
