//! Commission lookup for closed referrals.
//!
//! The single source of truth for compensation: both the engine (when it
//! builds an approval candidate) and the validator (when it re-checks one)
//! call [`evaluate`]. Pure and reentrant.

use crate::model::{CustomerSize, DealCriteria};

/// Compensation by deal size (rows) and customer size (columns).
const COMMISSIONS: [[&str; 4]; 3] = [
    ["250", "300", "350", "400"],
    ["1000", "1250", "1500", "1750"],
    ["2000", "2500", "3000", "3500"],
];

/// Look up the compensation owed for a referral.
///
/// Returns `None` while either category is still unknown; that is the
/// "not yet computable" state of an open referral, not an error.
pub fn evaluate(deal: Option<DealCriteria>, size: Option<CustomerSize>) -> Option<&'static str> {
    let row = match deal? {
        DealCriteria::Small => 0,
        DealCriteria::Mid => 1,
        DealCriteria::Large => 2,
    };
    let col = match size? {
        CustomerSize::Micro => 0,
        CustomerSize::Small => 1,
        CustomerSize::Mid => 2,
        CustomerSize::Large => 3,
    };
    Some(COMMISSIONS[row][col])
}
