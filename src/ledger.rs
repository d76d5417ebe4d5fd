//! The ledger collaborator and the per-invocation transaction view over it.
//!
//! A [`Ledger`] offers versioned reads, per-key history and an atomic
//! commit of a read/write set. Conflicting commits are rejected by comparing
//! the versions a transaction read against the versions currently committed.
use super::context::TxContext;
use super::entity::TimeStamp;
use super::error::LedgerError;
use chrono::Utc;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Current value of a key with its version. Version 0 means never written,
/// and each committed write or delete bumps it by one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Versioned {
    pub value: Option<Vec<u8>>,
    pub version: u64,
}

/// One committed change to a key, as returned by history queries.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct KeyModification {
    #[n(0)]
    pub tx_id: String,
    #[n(1)]
    pub timestamp: TimeStamp<Utc>,
    #[n(2)]
    pub is_delete: bool,
    #[cbor(n(3), with = "minicbor::bytes")]
    pub value: Vec<u8>,
}

/// Versions observed and changes requested by one transaction.
/// A `None` write is a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadWriteSet {
    pub reads: BTreeMap<String, u64>,
    pub writes: BTreeMap<String, Option<Vec<u8>>>,
}

pub trait Ledger {
    /// Oldest-first, single pass history of one key.
    type History: Iterator<Item = Result<KeyModification, LedgerError>>;

    fn get(&self, key: &str) -> Result<Versioned, LedgerError>;

    fn exists(&self, key: &str) -> Result<bool, LedgerError> {
        Ok(self.get(key)?.value.is_some())
    }

    fn history(&self, key: &str) -> Result<Self::History, LedgerError>;

    /// Applies every write in `rwset` or none of them. Fails with
    /// [`LedgerError::Conflict`] if any read version is stale.
    fn commit(&self, ctx: &TxContext, rwset: &ReadWriteSet) -> Result<(), LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    type History = L::History;

    fn get(&self, key: &str) -> Result<Versioned, LedgerError> {
        (**self).get(key)
    }
    fn exists(&self, key: &str) -> Result<bool, LedgerError> {
        (**self).exists(key)
    }
    fn history(&self, key: &str) -> Result<Self::History, LedgerError> {
        (**self).history(key)
    }
    fn commit(&self, ctx: &TxContext, rwset: &ReadWriteSet) -> Result<(), LedgerError> {
        (**self).commit(ctx, rwset)
    }
}

impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    type History = L::History;

    fn get(&self, key: &str) -> Result<Versioned, LedgerError> {
        (**self).get(key)
    }
    fn exists(&self, key: &str) -> Result<bool, LedgerError> {
        (**self).exists(key)
    }
    fn history(&self, key: &str) -> Result<Self::History, LedgerError> {
        (**self).history(key)
    }
    fn commit(&self, ctx: &TxContext, rwset: &ReadWriteSet) -> Result<(), LedgerError> {
        (**self).commit(ctx, rwset)
    }
}

/// Transaction view handed to one contract invocation.
///
/// Reads go to committed state and record the version seen. Writes are
/// buffered and are not visible, even to this transaction, until [`Stub::commit`].
pub struct Stub<'a, L: Ledger> {
    ledger: &'a L,
    ctx: &'a TxContext,
    rwset: ReadWriteSet,
}

impl<'a, L: Ledger> Stub<'a, L> {
    pub fn new(ledger: &'a L, ctx: &'a TxContext) -> Self {
        Self {
            ledger,
            ctx,
            rwset: ReadWriteSet::default(),
        }
    }

    pub fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let entry = self.ledger.get(key)?;
        // first read wins so a concurrent commit between two reads still conflicts
        self.rwset
            .reads
            .entry(key.to_string())
            .or_insert(entry.version);
        Ok(entry.value)
    }

    pub fn state_exists(&mut self, key: &str) -> Result<bool, LedgerError> {
        Ok(self.get_state(key)?.is_some())
    }

    pub fn put_state(&mut self, key: &str, value: Vec<u8>) {
        self.rwset.writes.insert(key.to_string(), Some(value));
    }

    pub fn del_state(&mut self, key: &str) {
        self.rwset.writes.insert(key.to_string(), None);
    }

    pub fn rwset(&self) -> &ReadWriteSet {
        &self.rwset
    }

    pub fn commit(self) -> Result<(), LedgerError> {
        if self.rwset.writes.is_empty() {
            return Ok(());
        }
        debug!(
            "committing tx {} ({} reads, {} writes)",
            self.ctx.tx_id,
            self.rwset.reads.len(),
            self.rwset.writes.len()
        );
        self.ledger.commit(self.ctx, &self.rwset)
    }
}

/// In-process ledger, every key keeps its full modification list.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    keys: RwLock<HashMap<String, Vec<KeyModification>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Unavailable("memory ledger lock poisoned".into())
}

impl Ledger for MemoryLedger {
    type History = std::vec::IntoIter<Result<KeyModification, LedgerError>>;

    fn get(&self, key: &str) -> Result<Versioned, LedgerError> {
        let keys = self.keys.read().map_err(poisoned)?;
        let Some(mods) = keys.get(key) else {
            return Ok(Versioned::default());
        };

        Ok(Versioned {
            value: mods
                .last()
                .filter(|m| !m.is_delete)
                .map(|m| m.value.clone()),
            version: mods.len() as u64,
        })
    }

    fn history(&self, key: &str) -> Result<Self::History, LedgerError> {
        let keys = self.keys.read().map_err(poisoned)?;
        let mods: Vec<_> = keys
            .get(key)
            .map(|mods| mods.iter().cloned().map(Ok).collect())
            .unwrap_or_default();
        Ok(mods.into_iter())
    }

    fn commit(&self, ctx: &TxContext, rwset: &ReadWriteSet) -> Result<(), LedgerError> {
        let mut keys = self.keys.write().map_err(poisoned)?;

        for (key, read) in &rwset.reads {
            let current = keys.get(key).map_or(0, |mods| mods.len() as u64);
            if current != *read {
                return Err(LedgerError::Conflict {
                    key: key.clone(),
                    read: *read,
                    current,
                });
            }
        }

        for (key, value) in &rwset.writes {
            keys.entry(key.clone()).or_default().push(KeyModification {
                tx_id: ctx.tx_id.clone(),
                timestamp: ctx.timestamp.clone(),
                is_delete: value.is_none(),
                value: value.clone().unwrap_or_default(),
            });
        }
        Ok(())
    }
}
