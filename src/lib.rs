pub mod commission;
pub mod contract;
pub mod csv;
pub mod directory;
pub mod engine;
pub mod model;

pub use contract::{Party, ReferralState, Transition, TransitionKind};
pub use engine::Engine;
pub use model::{CustomerSize, DealCriteria, Proposal, Referral, ReferralStatus};
