//! Rejection reasons for proposed transitions.

use thiserror::Error;

use super::TransitionKind;
use crate::model::ReferralStatus;

/// Why the validator rejected a transition.
///
/// One variant per checklist item, evaluated in the order declared here.
/// Every rejection carries a descriptive, stable message so both parties can
/// inspect why an agreement failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("exactly one output state is required, got {0}")]
    SingleOutputRequired(usize),

    #[error("{0:?}: the output status must be {1}, got {2}")]
    WrongStatus(TransitionKind, ReferralStatus, ReferralStatus),

    #[error("{0:?}: no inputs may be consumed when issuing a referral, got {1}")]
    UnexpectedInputs(TransitionKind, usize),

    #[error("{0:?}: the prior referral state is required, got {1} inputs")]
    SingleInputRequired(TransitionKind, usize),

    #[error("{0:?}: a {1} referral cannot move to {2}")]
    IllegalPredecessor(TransitionKind, ReferralStatus, ReferralStatus),

    #[error("the referral id is immutable (was '{0}', got '{1}')")]
    ReferralIdChanged(String, String),

    #[error("the create date is immutable (was '{0}', got '{1}')")]
    CreateDateChanged(String, String),

    #[error("the buyer and the seller cannot be the same entity")]
    SameEntity,

    #[error("the participants must be exactly the buyer and seller keys")]
    ParticipantsMismatch,

    #[error("the referral id is required")]
    MissingReferralId,

    #[error("the customer name is required")]
    MissingCustomerName,

    #[error("the branch id is required")]
    MissingBranchId,

    #[error("the contact number is required")]
    MissingContactNumber,

    #[error("the create date is required")]
    MissingCreateDate,

    #[error("the customer size is required")]
    MissingCustomerSize,

    #[error("the partner name is required")]
    MissingPartnerName,

    #[error("the deal criteria must not be set while the referral is {0}")]
    DealCriteriaForbidden(ReferralStatus),

    #[error("the deal criteria is required to close a referral")]
    DealCriteriaRequired,

    #[error("the compensation must equal the tabulated commission (expected {expected:?}, got {got:?})")]
    CompensationMismatch {
        expected: Option<String>,
        got: Option<String>,
    },
}
