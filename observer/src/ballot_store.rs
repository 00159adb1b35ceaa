//! Persistence of ballots and of the per-height ballot index.

use crate::ballot::{Ballot, BallotList};
use crate::error::ObserverError;
use crate::keys;
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{BlockHeight, ValidatorRegistry};

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    /// Look up a ballot by identifier.
    pub fn find_ballot(&self, identifier: &str) -> Result<Option<Ballot>, ObserverError> {
        Ok(self.store().get_record(&keys::ballot(identifier))?)
    }

    pub fn set_ballot(&self, ballot: &Ballot) -> Result<(), ObserverError> {
        self.store()
            .put_record(&keys::ballot(&ballot.identifier), ballot)?;
        Ok(())
    }

    /// Deleting an absent ballot is not an error.
    pub fn delete_ballot(&self, identifier: &str) -> Result<(), ObserverError> {
        self.store().delete(&keys::ballot(identifier))?;
        Ok(())
    }

    pub fn get_ballot_list(&self, height: BlockHeight) -> Result<Option<BallotList>, ObserverError> {
        Ok(self.store().get_record(&keys::ballot_list(height))?)
    }

    /// Append `identifier` to the list of ballots created at `height`.
    pub fn add_ballot_to_list(&self, height: BlockHeight, identifier: &str) -> Result<(), ObserverError> {
        let mut list = self.get_ballot_list(height)?.unwrap_or(BallotList {
            height,
            identifiers: Vec::new(),
        });
        list.identifiers.push(identifier.to_string());
        self.store().put_record(&keys::ballot_list(height), &list)?;
        Ok(())
    }

    pub fn delete_ballot_list(&self, height: BlockHeight) -> Result<(), ObserverError> {
        self.store().delete(&keys::ballot_list(height))?;
        Ok(())
    }

    /// Every stored ballot, ordered by identifier.
    pub fn all_ballots(&self) -> Result<Vec<Ballot>, ObserverError> {
        Ok(self.store().records_with_prefix(keys::BALLOT)?)
    }

    /// Every ballot list, ordered by height.
    pub fn all_ballot_lists(&self) -> Result<Vec<BallotList>, ObserverError> {
        Ok(self.store().records_with_prefix(keys::BALLOT_LIST)?)
    }
}
