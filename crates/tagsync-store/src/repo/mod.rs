pub mod history;
pub mod posts;
pub mod proposals;
pub mod rules;

pub use history::{HistoryRecord, HistoryRepo};
pub use posts::PostsRepo;
pub use proposals::{Proposal, ProposalStatus, ProposalsRepo};
pub use rules::RulesRepo;
