//! Durable ledger on sled.
//!
//! Two trees: `state` maps a key to its current [`StateRecord`], `history`
//! maps `len(key) ‖ key ‖ version` to the [`KeyModification`] written at that
//! version. Big-endian framing makes a prefix scan return a key's history
//! oldest-first, and the length prefix keeps `ab` from matching `abc`.
use super::context::TxContext;
use super::error::LedgerError;
use super::ledger::{KeyModification, Ledger, ReadWriteSet, Versioned};
use log::{debug, warn};
use sled::Transactional;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
struct StateRecord {
    #[n(0)]
    version: u64,
    #[n(1)]
    is_delete: bool,
    #[cbor(n(2), with = "minicbor::bytes")]
    value: Vec<u8>,
}

pub struct SledLedger {
    db: Arc<sled::Db>,
    state: sled::Tree,
    history: sled::Tree,
    flush_on_commit: bool,
}

pub struct SledHistory {
    key: String,
    inner: sled::Iter,
}

fn history_prefix(key: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(4 + key.len() + 8);
    prefix.extend_from_slice(&(key.len() as u32).to_be_bytes());
    prefix.extend_from_slice(key.as_bytes());
    prefix
}

fn history_key(key: &str, version: u64) -> Vec<u8> {
    let mut hkey = history_prefix(key);
    hkey.extend_from_slice(&version.to_be_bytes());
    hkey
}

fn decode_state(key: &str, raw: &[u8]) -> Result<StateRecord, LedgerError> {
    minicbor::decode(raw).map_err(|e| LedgerError::corrupt(key, e))
}

fn encode<T: minicbor::Encode<()>>(key: &str, value: &T) -> Result<Vec<u8>, LedgerError> {
    minicbor::to_vec(value).map_err(|e| LedgerError::corrupt(key, e))
}

impl SledLedger {
    pub fn new(db: Arc<sled::Db>) -> Result<Self, LedgerError> {
        let state = db.open_tree("state")?;
        let history = db.open_tree("history")?;

        Ok(Self {
            db,
            state,
            history,
            flush_on_commit: false,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        Self::new(Arc::new(sled::open(path)?))
    }

    /// Wait for every commit to reach disk before returning.
    pub fn with_flush_on_commit(mut self, flush: bool) -> Self {
        self.flush_on_commit = flush;
        self
    }

    pub fn db(&self) -> &Arc<sled::Db> {
        &self.db
    }
}

impl Ledger for SledLedger {
    type History = SledHistory;

    fn get(&self, key: &str) -> Result<Versioned, LedgerError> {
        let Some(raw) = self.state.get(key.as_bytes())? else {
            return Ok(Versioned::default());
        };
        let record = decode_state(key, &raw)?;

        Ok(Versioned {
            value: (!record.is_delete).then_some(record.value),
            version: record.version,
        })
    }

    fn history(&self, key: &str) -> Result<Self::History, LedgerError> {
        Ok(SledHistory {
            key: key.to_string(),
            inner: self.history.scan_prefix(history_prefix(key)),
        })
    }

    fn commit(&self, ctx: &TxContext, rwset: &ReadWriteSet) -> Result<(), LedgerError> {
        let result: TransactionResult<(), LedgerError> =
            (&self.state, &self.history).transaction(|(state, history)| {
                let version_of = |key: &str| -> Result<u64, ConflictableTransactionError<LedgerError>> {
                    match state.get(key.as_bytes())? {
                        None => Ok(0),
                        Some(raw) => Ok(decode_state(key, &raw)
                            .map_err(ConflictableTransactionError::Abort)?
                            .version),
                    }
                };

                for (key, read) in &rwset.reads {
                    let current = version_of(key)?;
                    if current != *read {
                        return Err(ConflictableTransactionError::Abort(LedgerError::Conflict {
                            key: key.clone(),
                            read: *read,
                            current,
                        }));
                    }
                }

                for (key, value) in &rwset.writes {
                    let version = version_of(key)? + 1;
                    let is_delete = value.is_none();
                    let value = value.clone().unwrap_or_default();

                    let modification = KeyModification {
                        tx_id: ctx.tx_id.clone(),
                        timestamp: ctx.timestamp.clone(),
                        is_delete,
                        value: value.clone(),
                    };
                    let record = StateRecord {
                        version,
                        is_delete,
                        value,
                    };

                    let record = encode(key, &record).map_err(ConflictableTransactionError::Abort)?;
                    let modification =
                        encode(key, &modification).map_err(ConflictableTransactionError::Abort)?;
                    state.insert(key.as_bytes(), record)?;
                    history.insert(history_key(key, version), modification)?;
                }
                Ok(())
            });

        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(err)) => {
                warn!("tx {} rejected at commit: {}", ctx.tx_id, err);
                return Err(err);
            }
            Err(TransactionError::Storage(err)) => return Err(err.into()),
        }

        if self.flush_on_commit {
            let bytes = self.db.flush()?;
            debug!("tx {} flushed {} bytes", ctx.tx_id, bytes);
        }
        Ok(())
    }
}

impl Iterator for SledHistory {
    type Item = Result<KeyModification, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        let key = &self.key;

        Some(
            entry
                .map_err(LedgerError::from)
                .and_then(|(_, raw)| minicbor::decode(&raw).map_err(|e| LedgerError::corrupt(key, e))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TimeStamp;
    use crate::ledger::Stub;
    use tempfile::tempdir;

    fn ctx(id: &str) -> TxContext {
        TxContext::new(id, TimeStamp::new_with(2025, 1, 1, 0, 0, 0).unwrap())
    }

    fn put(ledger: &SledLedger, tx: &str, key: &str, value: &[u8]) {
        let tx = ctx(tx);
        let mut stub = Stub::new(ledger, &tx);
        stub.get_state(key).unwrap();
        stub.put_state(key, value.to_vec());
        stub.commit().unwrap();
    }

    #[test]
    fn history_is_oldest_first_and_per_key() {
        let dir = tempdir().unwrap();
        let ledger = SledLedger::open(dir.path().join("ledger.db")).unwrap();

        put(&ledger, "tx1", "ab", b"1");
        put(&ledger, "tx2", "abc", b"x");
        put(&ledger, "tx3", "ab", b"2");
        put(&ledger, "tx4", "ab", b"3");

        let history: Vec<_> = ledger.history("ab").unwrap().map(Result::unwrap).collect();
        let values: Vec<_> = history.iter().map(|m| m.value.clone()).collect();
        assert_eq!(values, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
        assert_eq!(history[2].tx_id, "tx4");
        assert_eq!(ledger.get("ab").unwrap().version, 3);
    }

    #[test]
    fn stale_version_is_rejected_atomically() {
        let dir = tempdir().unwrap();
        let ledger = SledLedger::open(dir.path().join("ledger.db")).unwrap();
        put(&ledger, "tx1", "k", b"v1");

        let tx2 = ctx("tx2");
        let mut stale = Stub::new(&ledger, &tx2);
        stale.get_state("k").unwrap();
        stale.put_state("k", b"stale".to_vec());
        stale.put_state("other", b"o".to_vec());

        put(&ledger, "tx3", "k", b"v2");

        let err = stale.commit().unwrap_err();
        assert!(matches!(err, LedgerError::Conflict { read: 1, current: 2, .. }));
        assert!(!ledger.exists("other").unwrap());
        assert_eq!(ledger.get("k").unwrap().value, Some(b"v2".to_vec()));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        {
            let ledger = SledLedger::open(&path).unwrap().with_flush_on_commit(true);
            put(&ledger, "tx1", "k", b"v1");
        }
        let ledger = SledLedger::open(&path).unwrap();
        assert_eq!(ledger.get("k").unwrap().value, Some(b"v1".to_vec()));
        assert_eq!(ledger.history("k").unwrap().count(), 1);
    }

    #[test]
    fn history_keys_sort_by_version() {
        assert!(history_key("k", 2) < history_key("k", 10));
        assert!(history_key("k", 255) < history_key("k", 256));
        assert!(!history_key("abc", 1).starts_with(&history_prefix("ab")));
    }
}
