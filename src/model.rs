//! Core domain types for the referral engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a referral.
///
/// A referral is issued as `Active`, moves to `Pending` once the partner
/// initially accepts it, and ends in `Closed` (customer approved, deal sized
/// and compensated) or `Declined`. `Closed` and `Declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Active,
    Pending,
    Closed,
    Declined,
}

impl ReferralStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferralStatus::Active => "active",
            ReferralStatus::Pending => "pending",
            ReferralStatus::Closed => "closed",
            ReferralStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferralStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ReferralStatus::Active),
            "pending" => Ok(ReferralStatus::Pending),
            "closed" => Ok(ReferralStatus::Closed),
            "declined" => Ok(ReferralStatus::Declined),
            _ => Err(()),
        }
    }
}

/// Size category of the referred deal, fixed once the customer approves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealCriteria {
    Small,
    Mid,
    Large,
}

impl fmt::Display for DealCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DealCriteria::Small => "small",
            DealCriteria::Mid => "mid",
            DealCriteria::Large => "large",
        })
    }
}

impl FromStr for DealCriteria {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(DealCriteria::Small),
            "mid" => Ok(DealCriteria::Mid),
            "large" => Ok(DealCriteria::Large),
            _ => Err(()),
        }
    }
}

/// Size category of the referred customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerSize {
    Micro,
    Small,
    Mid,
    Large,
}

impl fmt::Display for CustomerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CustomerSize::Micro => "micro",
            CustomerSize::Small => "small",
            CustomerSize::Mid => "mid",
            CustomerSize::Large => "large",
        })
    }
}

impl FromStr for CustomerSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "micro" => Ok(CustomerSize::Micro),
            "small" => Ok(CustomerSize::Small),
            "mid" => Ok(CustomerSize::Mid),
            "large" => Ok(CustomerSize::Large),
            _ => Err(()),
        }
    }
}

/// The referral record both counterparties agree on.
///
/// Pure data; every field change goes through a validator-accepted
/// transition. `compensation` is derived from the commission table and is
/// never set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub referral_id: String,
    pub customer_name: String,
    pub branch_id: String,
    /// Absent until the customer provides one. An explicit `Option` rather
    /// than a sentinel value, so no real number can read as "unset".
    pub contact_number: Option<i64>,
    pub create_date: String,
    pub status: ReferralStatus,
    pub deal_criteria: Option<DealCriteria>,
    pub customer_size: Option<CustomerSize>,
    pub partner_name: String,
    pub compensation: Option<String>,
}

/// A proposed change to the ledger, representing the possible inputs of the
/// engine. Each variant names the counterparty the proposing node wants to
/// agree with.
#[derive(Debug, Clone)]
pub enum Proposal {
    /// Issue a new referral to a partner.
    Create {
        referral: Referral,
        counterparty: String,
    },
    /// Partner initially accepts; moves the referral to pending.
    Accept {
        referral_id: String,
        counterparty: String,
    },
    /// Customer approves; closes the referral with a deal size and the
    /// tabulated compensation attached.
    Approve {
        referral_id: String,
        deal_criteria: DealCriteria,
        counterparty: String,
    },
    /// Customer declines; terminal.
    Decline {
        referral_id: String,
        counterparty: String,
    },
}
