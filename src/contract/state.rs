use serde::{Deserialize, Serialize};

use crate::model::Referral;

/// Opaque signing-key identifier of a party.
pub type PartyKey = String;

/// A counterparty on the ledger: a legal name and the key it signs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub key: PartyKey,
}

impl Party {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// One validator-accepted snapshot of a referral, together with the two
/// parties agreeing on it.
///
/// The buyer is the referring node, the seller the partner receiving the
/// referral. `participants` is the declared set of keys that must sign; the
/// validator checks it is exactly the buyer's and seller's keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralState {
    pub referral: Referral,
    pub buyer: Party,
    pub seller: Party,
    pub participants: Vec<PartyKey>,
}

impl ReferralState {
    /// Build a snapshot with the participant set derived from the parties.
    pub fn new(referral: Referral, buyer: Party, seller: Party) -> Self {
        let participants = vec![buyer.key.clone(), seller.key.clone()];
        Self {
            referral,
            buyer,
            seller,
            participants,
        }
    }

    /// The parties involved in this referral.
    pub fn parties(&self) -> [&Party; 2] {
        [&self.buyer, &self.seller]
    }
}
