pub mod ids;
pub mod tag;

pub use ids::{PostId, ProposalId, RuleId};
pub use tag::{normalize_tag, TagName};
