use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

id_type!(RuleId);
id_type!(ProposalId);

/// Identifier of a post on the remote imageboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    pub fn new(value: i64) -> Result<Self, CoreError> {
        if value <= 0 {
            return Err(CoreError::InvalidPostId(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidPostId(trimmed.to_string()))?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{PostId, RuleId};
    use std::str::FromStr;

    #[test]
    fn post_id_rejects_non_positive() {
        assert!(PostId::new(0).is_err());
        assert!(PostId::new(-4).is_err());
        assert_eq!(PostId::new(12).unwrap().get(), 12);
    }

    #[test]
    fn post_id_parses_trimmed_digits() {
        assert_eq!(PostId::from_str(" 42 ").unwrap().get(), 42);
        assert!(PostId::from_str("abc").is_err());
    }

    #[test]
    fn rule_id_round_trips_through_string() {
        let id = RuleId::new();
        let parsed = RuleId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }
}
