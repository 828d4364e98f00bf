pub mod delta;
pub mod rule_delta;
pub mod set;
pub mod wildcard;

pub use delta::{DeltaMembership, TagDelta, DEFAULT_DELIMITER};
pub use rule_delta::{DeltaSide, DeltaSideView, TagRuleDelta};
pub use set::{SetMembership, TagSet};
