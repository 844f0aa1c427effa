//! Error types for proposal processing.

use thiserror::Error;

use crate::contract::ContractError;

/// Top-level error returned by [`Engine::apply`](super::Engine::apply).
///
/// Every variant is an expected, client-class outcome: either the request
/// itself was bad (unknown counterparty, unknown or duplicate referral) or
/// the contract engine rejected the proposed transition.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown counterparty '{0}'")]
    UnknownParty(String),

    #[error("referral '{0}' already exists")]
    DuplicateReferral(String),

    #[error("referral '{0}' not found")]
    ReferralNotFound(String),

    #[error("transition rejected: {0}")]
    Contract(#[from] ContractError),
}
