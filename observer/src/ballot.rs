//! Ballot: the per-observation aggregate of observer votes.
//!
//! A ballot snapshots its voter list when it is created. Each voter owns one
//! slot in `votes`; a slot is written at most once. The ballot leaves
//! `InProgress` exactly once, when the success tally reaches the threshold or
//! the failure tally makes it unreachable.

use crate::error::ObserverError;
use interop_types::{AccountAddress, BlockHeight, Threshold};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteType {
    NotYetVoted,
    Success,
    Failure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotStatus {
    InProgress,
    FinalizedSuccess,
    FinalizedFailure,
}

impl BallotStatus {
    pub fn is_finalized(&self) -> bool {
        !matches!(self, BallotStatus::InProgress)
    }
}

/// What kind of fact a ballot is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationType {
    InboundTx,
    OutboundTx,
    BlockHeader,
    TssKeygen,
    TssKeysign,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Digest of the observed fact.
    pub identifier: String,
    /// Eligible voters, fixed at creation.
    pub voter_list: Vec<AccountAddress>,
    /// Index-aligned with `voter_list`.
    pub votes: Vec<VoteType>,
    pub observation_type: ObservationType,
    pub threshold: Threshold,
    pub status: BallotStatus,
    pub creation_height: BlockHeight,
}

impl Ballot {
    /// A fresh `InProgress` ballot with every slot `NotYetVoted`.
    pub fn new(
        identifier: impl Into<String>,
        voter_list: Vec<AccountAddress>,
        observation_type: ObservationType,
        threshold: Threshold,
        creation_height: BlockHeight,
    ) -> Self {
        let votes = vec![VoteType::NotYetVoted; voter_list.len()];
        Self {
            identifier: identifier.into(),
            voter_list,
            votes,
            observation_type,
            threshold,
            status: BallotStatus::InProgress,
            creation_height,
        }
    }

    pub fn voter_index(&self, voter: &AccountAddress) -> Option<usize> {
        self.voter_list.iter().position(|v| v == voter)
    }

    pub fn has_voted(&self, voter: &AccountAddress) -> bool {
        self.voter_index(voter)
            .is_some_and(|i| self.votes[i] != VoteType::NotYetVoted)
    }

    /// Record `vote` in the voter's slot.
    ///
    /// Votes are accepted after finalization (the slot is still empty), they
    /// just no longer change the outcome. On error the ballot is unchanged.
    pub fn add_vote(&mut self, voter: &AccountAddress, vote: VoteType) -> Result<(), ObserverError> {
        if vote == VoteType::NotYetVoted {
            return Err(ObserverError::InvalidMessage(format!(
                "{voter} cast an empty vote on ballot {}",
                self.identifier
            )));
        }
        let index = self
            .voter_index(voter)
            .ok_or_else(|| ObserverError::VoterNotFound {
                ballot: self.identifier.clone(),
                voter: voter.to_string(),
            })?;
        if self.votes[index] != VoteType::NotYetVoted {
            return Err(ObserverError::DuplicateVote {
                ballot: self.identifier.clone(),
                voter: voter.to_string(),
            });
        }
        self.votes[index] = vote;
        Ok(())
    }

    /// `(success, failure)` vote counts.
    pub fn tally(&self) -> (usize, usize) {
        self.votes.iter().fold((0, 0), |(s, f), v| match v {
            VoteType::Success => (s + 1, f),
            VoteType::Failure => (s, f + 1),
            VoteType::NotYetVoted => (s, f),
        })
    }

    /// Move out of `InProgress` if the tally crosses the threshold.
    ///
    /// Returns `true` only for the call that performs the transition.
    pub fn is_finalizing_vote(&mut self) -> bool {
        if self.status != BallotStatus::InProgress {
            return false;
        }
        let total = self.voter_list.len();
        let (success, failure) = self.tally();
        if self.threshold.is_reached_by(success, total) {
            self.status = BallotStatus::FinalizedSuccess;
            return true;
        }
        if self.threshold.complement_exceeded_by(failure, total) {
            self.status = BallotStatus::FinalizedFailure;
            return true;
        }
        false
    }

    /// Voters who cast `vote`, in voter-list order.
    pub fn voters_with(&self, vote: VoteType) -> Vec<AccountAddress> {
        self.voter_list
            .iter()
            .zip(&self.votes)
            .filter(|(_, v)| **v == vote)
            .map(|(a, _)| a.clone())
            .collect()
    }
}

/// Identifiers of the ballots created at one height, for maturity GC.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotList {
    pub height: BlockHeight,
    pub identifiers: Vec<String>,
}
