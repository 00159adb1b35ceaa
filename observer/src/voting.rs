//! The voting engine: find-or-create a ballot, record a vote, check
//! finalization.
//!
//! Every voting flow (inbound, outbound, block header, blame, keygen) goes
//! through [`ObserverKeeper::vote_on_ballot`] or
//! [`ObserverKeeper::vote_on_ballot_with`]. The engine never applies
//! flow-specific side effects; callers match on the returned [`VoteOutcome`].

use crate::ballot::{Ballot, BallotStatus, ObservationType, VoteType};
use crate::error::ObserverError;
use crate::ObserverKeeper;
use interop_store::KvStore;
use interop_types::{AccountAddress, BlockContext, ChainId, Threshold, ValidatorRegistry};

/// Result of a single vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    /// The ballot after the vote was recorded.
    pub ballot: Ballot,
    /// `true` only for the vote that moved the ballot out of `InProgress`.
    pub finalized: bool,
    /// `true` when this vote created the ballot.
    pub is_new: bool,
}

impl VoteOutcome {
    pub fn status(&self) -> BallotStatus {
        self.ballot.status
    }

    /// The vote finalized the ballot to success: the caller applies its
    /// side effect now.
    pub fn finalized_success(&self) -> bool {
        self.finalized && self.ballot.status == BallotStatus::FinalizedSuccess
    }

    pub fn finalized_failure(&self) -> bool {
        self.finalized && self.ballot.status == BallotStatus::FinalizedFailure
    }
}

/// Voter set and threshold for a ballot that is not seeded from the observer
/// set and chain params.
#[derive(Clone, Debug)]
pub struct BallotTemplate {
    pub voters: Vec<AccountAddress>,
    pub threshold: Threshold,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    /// Return the ballot for `identifier`, creating and persisting it when
    /// absent. A new ballot snapshots the current observer set and takes the
    /// chain's ballot threshold.
    pub fn find_or_create_ballot(
        &self,
        ctx: &impl BlockContext,
        identifier: &str,
        chain: ChainId,
        observation_type: ObservationType,
    ) -> Result<(Ballot, bool), ObserverError> {
        let (ballot, is_new) = self.load_or_build(ctx, identifier, observation_type, || {
            self.observer_ballot_template(chain)
        })?;
        if is_new {
            self.persist_new_ballot(&ballot)?;
        }
        Ok((ballot, is_new))
    }

    /// Record `voter`'s vote and persist the ballot.
    pub fn add_vote(
        &self,
        mut ballot: Ballot,
        voter: &AccountAddress,
        vote: VoteType,
    ) -> Result<Ballot, ObserverError> {
        ballot.add_vote(voter, vote)?;
        self.set_ballot(&ballot)?;
        Ok(ballot)
    }

    /// Finalize the ballot if its tally crossed the threshold. Persists and
    /// returns `true` only on the transition.
    pub fn check_finalization(&self, mut ballot: Ballot) -> Result<(Ballot, bool), ObserverError> {
        if !ballot.is_finalizing_vote() {
            return Ok((ballot, false));
        }
        self.set_ballot(&ballot)?;
        Ok((ballot, true))
    }

    /// Vote on the ballot for an observation of `chain`.
    ///
    /// The ballot is written once, after the vote was accepted: a rejected
    /// vote leaves no trace, not even a freshly created ballot.
    pub fn vote_on_ballot(
        &self,
        ctx: &impl BlockContext,
        chain: ChainId,
        identifier: &str,
        observation_type: ObservationType,
        voter: &AccountAddress,
        vote: VoteType,
    ) -> Result<VoteOutcome, ObserverError> {
        self.vote_on_ballot_with(ctx, identifier, observation_type, voter, vote, || {
            self.observer_ballot_template(chain)
        })
    }

    /// Vote on a ballot whose voter set and threshold come from `template`
    /// instead of the observer set (keygen, blame). `template` is only
    /// consulted when the ballot does not exist yet.
    pub fn vote_on_ballot_with(
        &self,
        ctx: &impl BlockContext,
        identifier: &str,
        observation_type: ObservationType,
        voter: &AccountAddress,
        vote: VoteType,
        template: impl FnOnce() -> Result<BallotTemplate, ObserverError>,
    ) -> Result<VoteOutcome, ObserverError> {
        let (mut ballot, is_new) = self.load_or_build(ctx, identifier, observation_type, template)?;
        ballot.add_vote(voter, vote)?;
        let finalized = ballot.is_finalizing_vote();

        self.set_ballot(&ballot)?;
        if is_new {
            self.add_ballot_to_list(ballot.creation_height, &ballot.identifier)?;
            tracing::debug!(
                ballot = %ballot.identifier,
                observation = ?observation_type,
                voters = ballot.voter_list.len(),
                "created ballot"
            );
        }
        tracing::debug!(ballot = %ballot.identifier, voter = %voter, vote = ?vote, "vote recorded");
        if finalized {
            tracing::info!(
                ballot = %ballot.identifier,
                observation = ?observation_type,
                status = ?ballot.status,
                "ballot finalized"
            );
        }

        Ok(VoteOutcome {
            ballot,
            finalized,
            is_new,
        })
    }

    /// The current observer set as a ballot voter list.
    pub fn current_voters(&self) -> Result<Vec<AccountAddress>, ObserverError> {
        let set = self
            .get_observer_set()?
            .ok_or(ObserverError::ObserverSetNotFound)?;
        if set.is_empty() {
            return Err(ObserverError::EmptyObserverSet);
        }
        Ok(set.observer_list)
    }

    fn observer_ballot_template(&self, chain: ChainId) -> Result<BallotTemplate, ObserverError> {
        let params = self.supported_chain_params(chain)?;
        Ok(BallotTemplate {
            voters: self.current_voters()?,
            threshold: params.ballot_threshold,
        })
    }

    fn load_or_build(
        &self,
        ctx: &impl BlockContext,
        identifier: &str,
        observation_type: ObservationType,
        template: impl FnOnce() -> Result<BallotTemplate, ObserverError>,
    ) -> Result<(Ballot, bool), ObserverError> {
        if let Some(existing) = self.find_ballot(identifier)? {
            return Ok((existing, false));
        }
        let BallotTemplate { voters, threshold } = template()?;
        let ballot = Ballot::new(identifier, voters, observation_type, threshold, ctx.height());
        Ok((ballot, true))
    }

    fn persist_new_ballot(&self, ballot: &Ballot) -> Result<(), ObserverError> {
        self.set_ballot(ballot)?;
        self.add_ballot_to_list(ballot.creation_height, &ballot.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_params::{ChainParams, ChainParamsList};
    use interop_nullables::{NullBlockContext, NullKvStore, NullValidatorRegistry};
    use interop_types::{BlockHeight, ObserverParams};

    const CHAIN: ChainId = ChainId(1337);

    fn observers(n: u8) -> Vec<AccountAddress> {
        (1..=n).map(|i| AccountAddress::from_key([i; 20])).collect()
    }

    fn keeper(
        n: u8,
        threshold: &str,
    ) -> ObserverKeeper<NullKvStore, NullValidatorRegistry> {
        let keeper = ObserverKeeper::new(
            NullKvStore::new(),
            NullValidatorRegistry::new(),
            ObserverParams::default(),
        );
        keeper
            .set_chain_params_list(&ChainParamsList {
                chain_params: vec![ChainParams::new(CHAIN, true, threshold.parse().unwrap())],
            })
            .unwrap();
        let ctx = BlockHeight::new(1);
        for o in observers(n) {
            keeper.add_observer_to_set(&ctx, &o).unwrap();
        }
        keeper
    }

    #[test]
    fn unsupported_chain_cannot_create_ballot() {
        let k = keeper(3, "0.66");
        let ctx = NullBlockContext::new(10);
        let err = k
            .find_or_create_ballot(&ctx, "id", ChainId::new(1), ObservationType::InboundTx)
            .unwrap_err();
        assert!(matches!(err, ObserverError::ChainParamsNotFound(_)));

        let mut list = k.get_chain_params_list().unwrap().unwrap();
        list.upsert(ChainParams::new(ChainId::new(2), false, Threshold::ONE));
        k.set_chain_params_list(&list).unwrap();
        let err = k
            .find_or_create_ballot(&ctx, "id", ChainId::new(2), ObservationType::InboundTx)
            .unwrap_err();
        assert!(matches!(err, ObserverError::UnsupportedChain(_)));
    }

    #[test]
    fn missing_observer_set_cannot_create_ballot() {
        let k = ObserverKeeper::new(
            NullKvStore::new(),
            NullValidatorRegistry::new(),
            ObserverParams::default(),
        );
        k.set_chain_params_list(&ChainParamsList {
            chain_params: vec![ChainParams::new(CHAIN, true, Threshold::ONE)],
        })
        .unwrap();
        let ctx = NullBlockContext::new(10);
        assert!(matches!(
            k.find_or_create_ballot(&ctx, "id", CHAIN, ObservationType::InboundTx),
            Err(ObserverError::ObserverSetNotFound)
        ));
    }

    #[test]
    fn find_or_create_snapshots_and_indexes() {
        let k = keeper(3, "0.66");
        let ctx = NullBlockContext::new(10);
        let (ballot, is_new) = k
            .find_or_create_ballot(&ctx, "id", CHAIN, ObservationType::InboundTx)
            .unwrap();
        assert!(is_new);
        assert_eq!(ballot.voter_list, observers(3));
        assert_eq!(ballot.creation_height, BlockHeight::new(10));
        assert_eq!(
            k.get_ballot_list(BlockHeight::new(10)).unwrap().unwrap().identifiers,
            vec!["id".to_string()]
        );

        ctx.advance(5);
        let (again, is_new) = k
            .find_or_create_ballot(&ctx, "id", CHAIN, ObservationType::InboundTx)
            .unwrap();
        assert!(!is_new);
        assert_eq!(again, ballot);
    }

    #[test]
    fn late_observer_is_not_in_snapshot() {
        let k = keeper(2, "1");
        let ctx = NullBlockContext::new(10);
        let voters = observers(2);
        k.vote_on_ballot(&ctx, CHAIN, "id", ObservationType::InboundTx, &voters[0], VoteType::Success)
            .unwrap();

        let late = AccountAddress::from_key([50; 20]);
        k.add_observer_to_set(&ctx, &late).unwrap();
        let err = k
            .vote_on_ballot(&ctx, CHAIN, "id", ObservationType::InboundTx, &late, VoteType::Success)
            .unwrap_err();
        assert!(matches!(err, ObserverError::VoterNotFound { .. }));
    }

    #[test]
    fn rejected_first_vote_creates_nothing() {
        let k = keeper(2, "1");
        let ctx = NullBlockContext::new(10);
        let outsider = AccountAddress::from_key([77; 20]);
        assert!(k
            .vote_on_ballot(&ctx, CHAIN, "id", ObservationType::InboundTx, &outsider, VoteType::Success)
            .is_err());
        assert!(k.find_ballot("id").unwrap().is_none());
        assert!(k.get_ballot_list(BlockHeight::new(10)).unwrap().is_none());
    }

    #[test]
    fn check_finalization_persists_only_the_transition() {
        let k = keeper(1, "1");
        let ctx = NullBlockContext::new(3);
        let voter = observers(1).remove(0);
        let (ballot, _) = k
            .find_or_create_ballot(&ctx, "id", CHAIN, ObservationType::BlockHeader)
            .unwrap();
        let ballot = k.add_vote(ballot, &voter, VoteType::Success).unwrap();
        let (ballot, finalized) = k.check_finalization(ballot).unwrap();
        assert!(finalized);
        assert_eq!(
            k.find_ballot("id").unwrap().unwrap().status,
            BallotStatus::FinalizedSuccess
        );
        let (_, again) = k.check_finalization(ballot).unwrap();
        assert!(!again);
    }
}
