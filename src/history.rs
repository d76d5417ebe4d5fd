//! Lazy decoding of a key's history into entity snapshots.
use super::entity::{Bid, Entity, TimeStamp};
use super::error::{ContractError, LedgerError};
use super::ledger::KeyModification;
use chrono::Utc;
use serde::Serialize;
use std::marker::PhantomData;

/// An entity as written by one transaction.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Revision<T> {
    pub tx_id: String,
    pub timestamp: TimeStamp<Utc>,
    #[serde(rename = "value")]
    pub entity: T,
}

/// Decodes each history entry exactly once, in ledger order. Deletes are
/// skipped. The sequence ends when the underlying history is exhausted and
/// cannot be restarted.
pub struct Revisions<I, T> {
    inner: I,
    _entity: PhantomData<T>,
}

/// [`Revisions`] without the transaction metadata.
pub struct Snapshots<I, T>(Revisions<I, T>);

pub type BidHistory<I> = Snapshots<I, Bid>;

impl<I, T> Revisions<I, T> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            _entity: PhantomData,
        }
    }

    pub fn snapshots(self) -> Snapshots<I, T> {
        Snapshots(self)
    }
}

impl<I, T> Iterator for Revisions<I, T>
where
    I: Iterator<Item = Result<KeyModification, LedgerError>>,
    T: Entity,
{
    type Item = Result<Revision<T>, ContractError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let modification = match self.inner.next()? {
                Ok(m) => m,
                Err(err) => return Some(Err(err.into())),
            };
            if modification.is_delete {
                continue;
            }

            return Some(
                serde_json::from_slice::<T>(&modification.value)
                    .map(|entity| Revision {
                        tx_id: modification.tx_id,
                        timestamp: modification.timestamp,
                        entity,
                    })
                    .map_err(ContractError::from),
            );
        }
    }
}

impl<I, T> Iterator for Snapshots<I, T>
where
    I: Iterator<Item = Result<KeyModification, LedgerError>>,
    T: Entity,
{
    type Item = Result<T, ContractError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next()
            .map(|revision| revision.map(|revision| revision.entity))
    }
}
