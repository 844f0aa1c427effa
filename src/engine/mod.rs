//! Referral proposal engine.
//!
//! The engine drives the agreement round trip: it resolves the counterparty,
//! builds the candidate next snapshot, asks the contract engine to certify
//! the transition, and commits the accepted output as the referral's new
//! head. It owns the record store, so proposals applied through one engine
//! are serialized per referral by construction.
//! Also supports an async stream of proposals.

use std::collections::HashMap;

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::commission;
use crate::contract::{self, Party, ReferralState, Transition, TransitionKind};
use crate::directory::Directory;
use crate::model::{DealCriteria, Proposal, Referral, ReferralStatus};

mod error;
pub use error::EngineError;

/// The proposal engine for one ledger node.
///
/// Holds this node's identity, the injected counterparty directory, and one
/// durable head per referral id, replaced on every accepted transition.
pub struct Engine<D> {
    me: Party,
    directory: D,
    records: HashMap<String, ReferralState>,
}

/// Public API
impl<D: Directory> Engine<D> {
    pub fn new(me: Party, directory: D) -> Self {
        Self {
            me,
            directory,
            records: HashMap::new(),
        }
    }

    /// Run the engine with the given proposal stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = Proposal> + Unpin) {
        while let Some(proposal) = stream.next().await {
            // a rejection should not stop the engine, so we just ignore the
            // application result
            let _ = self.apply(proposal);
        }
    }

    /// The identity this engine proposes as.
    pub fn me(&self) -> &Party {
        &self.me
    }

    /// Counterparties known to the directory, excluding ourselves.
    pub fn peers(&self) -> Vec<&Party> {
        self.directory
            .peers()
            .into_iter()
            .filter(|party| party.key != self.me.key)
            .collect()
    }

    /// Return the current head of every referral.
    pub fn records(&self) -> impl Iterator<Item = &ReferralState> + '_ {
        self.records.values()
    }

    /// Return the current head of one referral, absent if never created.
    pub fn get_record(&self, referral_id: &str) -> Option<&ReferralState> {
        self.records.get(referral_id)
    }

    /// Return the referral heads currently in the given status.
    pub fn records_with_status(
        &self,
        status: ReferralStatus,
    ) -> impl Iterator<Item = &ReferralState> + '_ {
        self.records
            .values()
            .filter(move |state| state.referral.status == status)
    }

    /// Apply a single proposal on top of the current ledger state
    pub fn apply(&mut self, proposal: Proposal) -> Result<(), EngineError> {
        match proposal {
            Proposal::Create {
                referral,
                counterparty,
            } => {
                let id = referral.referral_id.clone();
                let result = self.apply_create(referral, &counterparty);
                Self::log_result("create", &id, &result);
                result?;
            }
            Proposal::Accept {
                referral_id,
                counterparty,
            } => {
                let result = self.apply_accept(&referral_id, &counterparty);
                Self::log_result("accept", &referral_id, &result);
                result?;
            }
            Proposal::Approve {
                referral_id,
                deal_criteria,
                counterparty,
            } => {
                let result = self.apply_approve(&referral_id, deal_criteria, &counterparty);
                Self::log_result("approve", &referral_id, &result);
                result?;
            }
            Proposal::Decline {
                referral_id,
                counterparty,
            } => {
                let result = self.apply_decline(&referral_id, &counterparty);
                Self::log_result("decline", &referral_id, &result);
                result?;
            }
        }
        Ok(())
    }
}

/// Private API
impl<D: Directory> Engine<D> {
    /// Small helper to log `apply` results
    fn log_result<E: std::fmt::Display>(
        action: &str,
        referral_id: &str,
        result: &Result<(), E>,
    ) {
        match result {
            Ok(()) => {
                info!(
                    referral = %referral_id,
                    "{action} applied"
                );
            }
            Err(e) => {
                info!(
                    referral = %referral_id,
                    reason = %e,
                    "{action} skipped"
                );
            }
        }
    }

    /// Resolve a counterparty name before anything else touches the ledger.
    fn resolve(&self, name: &str) -> Result<Party, EngineError> {
        self.directory
            .party_from_name(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownParty(name.to_string()))
    }

    /// Look up the current head of a referral.
    fn head(&self, referral_id: &str) -> Result<&ReferralState, EngineError> {
        self.records
            .get(referral_id)
            .ok_or_else(|| EngineError::ReferralNotFound(referral_id.to_string()))
    }

    /// Certify and commit a candidate snapshot as the referral's new head.
    fn agree(
        &mut self,
        kind: TransitionKind,
        prior: Option<ReferralState>,
        output: ReferralState,
    ) -> Result<(), EngineError> {
        let transition = match prior {
            None => Transition::issue(output.clone()),
            Some(prior) => Transition::update(kind, prior, output.clone()),
        };
        contract::verify(&transition)?;

        self.records
            .insert(output.referral.referral_id.clone(), output);
        Ok(())
    }

    /// Apply a `Proposal::Create`:
    /// - Resolve the counterparty
    /// - Reject if the referral id already has a head
    /// - Certify the submitted referral as an issuance and commit it
    fn apply_create(&mut self, referral: Referral, counterparty: &str) -> Result<(), EngineError> {
        let seller = self.resolve(counterparty)?;

        if self.records.contains_key(&referral.referral_id) {
            return Err(EngineError::DuplicateReferral(referral.referral_id));
        }

        let output = ReferralState::new(referral, self.me.clone(), seller);
        self.agree(TransitionKind::Create, None, output)
    }

    /// Apply a `Proposal::Accept`:
    /// - Resolve the counterparty and look up the head
    /// - Candidate = head moved to pending
    fn apply_accept(&mut self, referral_id: &str, counterparty: &str) -> Result<(), EngineError> {
        self.resolve(counterparty)?;
        let prior = self.head(referral_id)?.clone();

        let mut next = prior.clone();
        next.referral.status = ReferralStatus::Pending;

        self.agree(TransitionKind::InitialAccept, Some(prior), next)
    }

    /// Apply a `Proposal::Approve`:
    /// - Resolve the counterparty and look up the head
    /// - Candidate = head closed with the deal criteria attached and the
    ///   compensation recomputed from the commission table (the validator
    ///   re-checks that value independently)
    fn apply_approve(
        &mut self,
        referral_id: &str,
        deal_criteria: DealCriteria,
        counterparty: &str,
    ) -> Result<(), EngineError> {
        self.resolve(counterparty)?;
        let prior = self.head(referral_id)?.clone();

        let mut next = prior.clone();
        next.referral.status = ReferralStatus::Closed;
        next.referral.deal_criteria = Some(deal_criteria);
        next.referral.compensation =
            commission::evaluate(next.referral.deal_criteria, next.referral.customer_size)
                .map(str::to_string);

        self.agree(TransitionKind::Approve, Some(prior), next)
    }

    /// Apply a `Proposal::Decline`:
    /// - Resolve the counterparty and look up the head
    /// - Candidate = head moved to declined
    fn apply_decline(&mut self, referral_id: &str, counterparty: &str) -> Result<(), EngineError> {
        self.resolve(counterparty)?;
        let prior = self.head(referral_id)?.clone();

        let mut next = prior.clone();
        next.referral.status = ReferralStatus::Declined;

        self.agree(TransitionKind::Decline, Some(prior), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractError;
    use crate::directory::StaticDirectory;
    use crate::model::CustomerSize;

    // test utils

    fn engine() -> Engine<StaticDirectory> {
        let directory = StaticDirectory::new([
            Party::new("PartnerCo", "partner-key"),
            Party::new("OtherCo", "other-key"),
        ]);
        Engine::new(Party::new("BankA", "bank-key"), directory)
    }

    fn referral(id: &str) -> Referral {
        Referral {
            referral_id: id.to_string(),
            customer_name: "Acme".to_string(),
            branch_id: "B1".to_string(),
            contact_number: Some(5551234),
            create_date: "2024-01-01".to_string(),
            status: ReferralStatus::Active,
            deal_criteria: None,
            customer_size: Some(CustomerSize::Mid),
            partner_name: "PartnerCo".to_string(),
            compensation: None,
        }
    }

    fn create(id: &str) -> Proposal {
        Proposal::Create {
            referral: referral(id),
            counterparty: "PartnerCo".to_string(),
        }
    }

    fn accept(id: &str) -> Proposal {
        Proposal::Accept {
            referral_id: id.to_string(),
            counterparty: "PartnerCo".to_string(),
        }
    }

    fn approve(id: &str, deal: DealCriteria) -> Proposal {
        Proposal::Approve {
            referral_id: id.to_string(),
            deal_criteria: deal,
            counterparty: "PartnerCo".to_string(),
        }
    }

    fn decline(id: &str) -> Proposal {
        Proposal::Decline {
            referral_id: id.to_string(),
            counterparty: "PartnerCo".to_string(),
        }
    }

    #[test]
    fn new_engine_has_no_records() {
        let engine = engine();
        assert_eq!(engine.records().count(), 0);
    }

    // Create

    #[test]
    fn create_writes_active_head() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();

        let head = engine.get_record("R1").unwrap();
        assert_eq!(head.referral.status, ReferralStatus::Active);
        assert_eq!(head.buyer.name, "BankA");
        assert_eq!(head.seller.name, "PartnerCo");
        assert_eq!(head.participants.len(), 2);
    }

    #[test]
    fn create_unknown_counterparty_fails() {
        let mut engine = engine();
        let result = engine.apply(Proposal::Create {
            referral: referral("R1"),
            counterparty: "NoSuchCo".to_string(),
        });

        assert!(matches!(result, Err(EngineError::UnknownParty(name)) if name == "NoSuchCo"));
        assert!(engine.get_record("R1").is_none());
    }

    #[test]
    fn create_duplicate_referral_fails() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();

        let result = engine.apply(create("R1"));
        assert!(matches!(result, Err(EngineError::DuplicateReferral(id)) if id == "R1"));
    }

    #[test]
    fn create_invalid_referral_is_rejected_and_not_stored() {
        let mut engine = engine();
        let mut bad = referral("R1");
        bad.customer_size = None;

        let result = engine.apply(Proposal::Create {
            referral: bad,
            counterparty: "PartnerCo".to_string(),
        });

        assert!(matches!(
            result,
            Err(EngineError::Contract(ContractError::MissingCustomerSize))
        ));
        assert!(engine.get_record("R1").is_none());
    }

    // Accept

    #[test]
    fn accept_moves_head_to_pending() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(accept("R1")).unwrap();

        let head = engine.get_record("R1").unwrap();
        assert_eq!(head.referral.status, ReferralStatus::Pending);
    }

    #[test]
    fn accept_unknown_referral_fails() {
        let mut engine = engine();
        let result = engine.apply(accept("R9"));
        assert!(matches!(result, Err(EngineError::ReferralNotFound(id)) if id == "R9"));
    }

    // Approve

    #[test]
    fn approve_closes_head_with_tabulated_compensation() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(accept("R1")).unwrap();
        engine.apply(approve("R1", DealCriteria::Mid)).unwrap();

        let head = engine.get_record("R1").unwrap();
        assert_eq!(head.referral.status, ReferralStatus::Closed);
        assert_eq!(head.referral.deal_criteria, Some(DealCriteria::Mid));
        assert_eq!(head.referral.compensation.as_deref(), Some("1500"));
    }

    #[test]
    fn approve_before_accept_is_rejected() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();

        let result = engine.apply(approve("R1", DealCriteria::Mid));
        assert!(matches!(
            result,
            Err(EngineError::Contract(ContractError::IllegalPredecessor(
                TransitionKind::Approve,
                ReferralStatus::Active,
                ReferralStatus::Closed
            )))
        ));

        // Head unchanged
        let head = engine.get_record("R1").unwrap();
        assert_eq!(head.referral.status, ReferralStatus::Active);
    }

    // Decline

    #[test]
    fn decline_from_active_moves_head_to_declined() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(decline("R1")).unwrap();

        let head = engine.get_record("R1").unwrap();
        assert_eq!(head.referral.status, ReferralStatus::Declined);
    }

    #[test]
    fn decline_from_pending_moves_head_to_declined() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(accept("R1")).unwrap();
        engine.apply(decline("R1")).unwrap();

        let head = engine.get_record("R1").unwrap();
        assert_eq!(head.referral.status, ReferralStatus::Declined);
    }

    #[test]
    fn closed_referral_cannot_be_declined() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(accept("R1")).unwrap();
        engine.apply(approve("R1", DealCriteria::Small)).unwrap();

        let result = engine.apply(decline("R1"));
        assert!(matches!(
            result,
            Err(EngineError::Contract(ContractError::IllegalPredecessor(
                TransitionKind::Decline,
                ReferralStatus::Closed,
                ReferralStatus::Declined
            )))
        ));
    }

    #[test]
    fn declined_referral_is_terminal() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(decline("R1")).unwrap();

        let result = engine.apply(accept("R1"));
        assert!(matches!(
            result,
            Err(EngineError::Contract(ContractError::IllegalPredecessor(
                TransitionKind::InitialAccept,
                ReferralStatus::Declined,
                ReferralStatus::Pending
            )))
        ));
    }

    // Query surface

    #[test]
    fn records_with_status_filters_heads() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(create("R2")).unwrap();
        engine.apply(accept("R2")).unwrap();

        let active: Vec<_> = engine.records_with_status(ReferralStatus::Active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].referral.referral_id, "R1");

        let pending: Vec<_> = engine
            .records_with_status(ReferralStatus::Pending)
            .collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].referral.referral_id, "R2");
    }

    #[test]
    fn records_iterator_returns_all_heads() {
        let mut engine = engine();
        engine.apply(create("R1")).unwrap();
        engine.apply(create("R2")).unwrap();

        assert_eq!(engine.records().count(), 2);
    }

    #[test]
    fn me_and_peers() {
        let engine = engine();
        assert_eq!(engine.me().name, "BankA");

        let peers = engine.peers();
        assert_eq!(peers.len(), 2);
        assert!(peers.iter().all(|party| party.name != "BankA"));
    }

    // Async run()

    #[tokio::test]
    async fn run_processes_all_proposals() {
        let mut engine = engine();
        let proposals = vec![
            create("R1"),
            create("R2"),
            accept("R1"),
            approve("R1", DealCriteria::Large),
        ];

        engine.run(tokio_stream::iter(proposals)).await;

        let r1 = engine.get_record("R1").unwrap();
        let r2 = engine.get_record("R2").unwrap();
        assert_eq!(r1.referral.status, ReferralStatus::Closed);
        assert_eq!(r1.referral.compensation.as_deref(), Some("3000"));
        assert_eq!(r2.referral.status, ReferralStatus::Active);
    }

    #[tokio::test]
    async fn run_skips_rejected_proposals_and_continues() {
        let mut engine = engine();
        let proposals = vec![
            create("R1"),
            approve("R1", DealCriteria::Mid), // rejected: still active
            accept("R1"),                     // should still process
        ];

        engine.run(tokio_stream::iter(proposals)).await;

        let head = engine.get_record("R1").unwrap();
        assert_eq!(head.referral.status, ReferralStatus::Pending);
        assert_eq!(head.referral.compensation, None);
    }
}
