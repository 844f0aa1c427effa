//! The transition-validating contract engine.
//!
//! [`verify`] is the independent validity check both counterparties run over
//! a proposed record transition before it is durably committed. It is a pure
//! predicate over the transition it is handed: deterministic, side-effect
//! free, no I/O, no shared state, safe to call concurrently. It never trusts
//! the party that built the proposal; everything is re-derived from the
//! transition itself.

use crate::commission;
use crate::model::ReferralStatus;

mod state;
pub use state::{Party, PartyKey, ReferralState};

mod error;
pub use error::ContractError;

/// The kind of transition being proposed, chosen explicitly by the caller.
///
/// Each kind pins the status its output must carry and the statuses a prior
/// snapshot may hold, so there is no rule set to infer and no unmatched
/// fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Issue a new referral (no prior state).
    Create,
    /// Partner initially accepts an active referral.
    InitialAccept,
    /// Customer approves a pending referral; closes it with compensation.
    Approve,
    /// Customer declines an active or pending referral.
    Decline,
}

impl TransitionKind {
    /// The status every output of this kind must carry.
    pub fn expected_status(self) -> ReferralStatus {
        match self {
            TransitionKind::Create => ReferralStatus::Active,
            TransitionKind::InitialAccept => ReferralStatus::Pending,
            TransitionKind::Approve => ReferralStatus::Closed,
            TransitionKind::Decline => ReferralStatus::Declined,
        }
    }

    /// Statuses the prior snapshot may hold. Empty means issuance: the
    /// transition must not reference any prior state.
    pub fn predecessors(self) -> &'static [ReferralStatus] {
        match self {
            TransitionKind::Create => &[],
            TransitionKind::InitialAccept => &[ReferralStatus::Active],
            TransitionKind::Approve => &[ReferralStatus::Pending],
            TransitionKind::Decline => &[ReferralStatus::Active, ReferralStatus::Pending],
        }
    }
}

/// One proposed change of record: zero-or-one prior snapshots consumed as
/// inputs and the candidate snapshot produced as output.
#[derive(Debug, Clone)]
pub struct Transition {
    pub kind: TransitionKind,
    pub inputs: Vec<ReferralState>,
    pub outputs: Vec<ReferralState>,
}

impl Transition {
    /// An issuance: no prior state, one candidate output.
    pub fn issue(output: ReferralState) -> Self {
        Self {
            kind: TransitionKind::Create,
            inputs: Vec::new(),
            outputs: vec![output],
        }
    }

    /// A status change: the current head as input, the candidate as output.
    pub fn update(kind: TransitionKind, prior: ReferralState, output: ReferralState) -> Self {
        Self {
            kind,
            inputs: vec![prior],
            outputs: vec![output],
        }
    }
}

/// Certify that a proposed transition is well-formed.
///
/// Checks run in one fixed declared order and the first failing check is
/// returned, so an identical transition always produces the identical
/// verdict and reason. `Ok(())` means the output snapshot may become the new
/// durable record.
pub fn verify(transition: &Transition) -> Result<(), ContractError> {
    let kind = transition.kind;

    // Shape: exactly one candidate output per transition.
    let [output] = transition.outputs.as_slice() else {
        return Err(ContractError::SingleOutputRequired(transition.outputs.len()));
    };
    let referral = &output.referral;

    // The output must carry the status this kind of transition produces.
    let expected = kind.expected_status();
    if referral.status != expected {
        return Err(ContractError::WrongStatus(kind, expected, referral.status));
    }

    // State-machine edge: issuance consumes nothing; every other kind
    // consumes exactly the prior head, whose status must be a legal
    // predecessor and whose identity must be unchanged.
    match kind.predecessors() {
        [] => {
            if !transition.inputs.is_empty() {
                return Err(ContractError::UnexpectedInputs(
                    kind,
                    transition.inputs.len(),
                ));
            }
        }
        allowed => {
            let [prior] = transition.inputs.as_slice() else {
                return Err(ContractError::SingleInputRequired(
                    kind,
                    transition.inputs.len(),
                ));
            };
            if !allowed.contains(&prior.referral.status) {
                return Err(ContractError::IllegalPredecessor(
                    kind,
                    prior.referral.status,
                    expected,
                ));
            }
            if prior.referral.referral_id != referral.referral_id {
                return Err(ContractError::ReferralIdChanged(
                    prior.referral.referral_id.clone(),
                    referral.referral_id.clone(),
                ));
            }
            if prior.referral.create_date != referral.create_date {
                return Err(ContractError::CreateDateChanged(
                    prior.referral.create_date.clone(),
                    referral.create_date.clone(),
                ));
            }
        }
    }

    // Parties: two distinct entities, and the declared participant set is
    // exactly their keys.
    if output.buyer.key == output.seller.key {
        return Err(ContractError::SameEntity);
    }
    if output.participants.len() != 2
        || !output.participants.contains(&output.buyer.key)
        || !output.participants.contains(&output.seller.key)
    {
        return Err(ContractError::ParticipantsMismatch);
    }

    // Required fields, in declared order.
    if referral.referral_id.is_empty() {
        return Err(ContractError::MissingReferralId);
    }
    if referral.customer_name.is_empty() {
        return Err(ContractError::MissingCustomerName);
    }
    if referral.branch_id.is_empty() {
        return Err(ContractError::MissingBranchId);
    }
    if referral.contact_number.is_none() {
        return Err(ContractError::MissingContactNumber);
    }
    if referral.create_date.is_empty() {
        return Err(ContractError::MissingCreateDate);
    }
    if referral.customer_size.is_none() {
        return Err(ContractError::MissingCustomerSize);
    }
    if referral.partner_name.is_empty() {
        return Err(ContractError::MissingPartnerName);
    }

    // Deal criteria travel with the terminal Closed status and nowhere else.
    match referral.status {
        ReferralStatus::Closed => {
            if referral.deal_criteria.is_none() {
                return Err(ContractError::DealCriteriaRequired);
            }
        }
        status => {
            if referral.deal_criteria.is_some() {
                return Err(ContractError::DealCriteriaForbidden(status));
            }
        }
    }

    // Compensation is derived, never asserted: the snapshot must carry
    // exactly what the commission table says for its categories. For open
    // referrals (no criteria yet) that means no compensation at all.
    let tabulated =
        commission::evaluate(referral.deal_criteria, referral.customer_size).map(str::to_string);
    if referral.compensation != tabulated {
        return Err(ContractError::CompensationMismatch {
            expected: tabulated,
            got: referral.compensation.clone(),
        });
    }

    Ok(())
}
