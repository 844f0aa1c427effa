//! Identity resolution for counterparties.
//!
//! The engine never reaches for an ambient network map; whoever constructs
//! it injects a [`Directory`] so the validator and the engine stay
//! independently testable.

use std::collections::HashMap;

use crate::contract::Party;

/// Resolves counterparty names to ledger identities.
pub trait Directory {
    /// Look up a party by its legal name. `None` means the name is unknown
    /// here, which callers surface as a client-class error.
    fn party_from_name(&self, name: &str) -> Option<&Party>;

    /// Every party this directory knows about.
    fn peers(&self) -> Vec<&Party>;
}

/// A fixed in-memory directory, seeded at construction.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    parties: HashMap<String, Party>,
}

impl StaticDirectory {
    pub fn new(parties: impl IntoIterator<Item = Party>) -> Self {
        Self {
            parties: parties
                .into_iter()
                .map(|party| (party.name.clone(), party))
                .collect(),
        }
    }
}

impl Directory for StaticDirectory {
    fn party_from_name(&self, name: &str) -> Option<&Party> {
        self.parties.get(name)
    }

    fn peers(&self) -> Vec<&Party> {
        self.parties.values().collect()
    }
}
