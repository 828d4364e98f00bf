pub mod engine;
pub mod replacement;

pub use engine::{combine, evaluate_batch, evaluate_post, MatchOutcome, ProposedEdit};
pub use replacement::{AppliedHistoryKey, ReplacementRule};
