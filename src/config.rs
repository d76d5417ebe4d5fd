//! Settings for the on-disk ledger.
use super::error::LedgerError;
use super::sled_ledger::SledLedger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_LEDGER_PATH: &str = "procurement.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub path: PathBuf,
    /// Remove the database when the ledger is dropped.
    pub temporary: bool,
    pub cache_capacity: u64,
    /// Background flush interval, `None` disables it.
    pub flush_every_ms: Option<u64>,
    pub flush_on_commit: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LEDGER_PATH),
            temporary: false,
            cache_capacity: 64 * 1024 * 1024,
            flush_every_ms: Some(500),
            flush_on_commit: true,
        }
    }
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }
    pub fn set_temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
    pub fn set_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }
    pub fn set_flush_every_ms(mut self, every: Option<u64>) -> Self {
        self.flush_every_ms = every;
        self
    }
    pub fn set_flush_on_commit(mut self, flush: bool) -> Self {
        self.flush_on_commit = flush;
        self
    }

    pub fn open(&self) -> Result<SledLedger, LedgerError> {
        let db = sled::Config::new()
            .path(&self.path)
            .temporary(self.temporary)
            .cache_capacity(self.cache_capacity)
            .flush_every_ms(self.flush_every_ms)
            .open()?;

        Ok(SledLedger::new(Arc::new(db))?.with_flush_on_commit(self.flush_on_commit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use tempfile::tempdir;

    #[test]
    fn opens_at_configured_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configured.db");

        let ledger = LedgerConfig::new()
            .set_path(&path)
            .set_flush_every_ms(None)
            .open()
            .unwrap();

        assert!(!ledger.exists("vendor~V1").unwrap());
        assert!(path.exists());
    }

    #[test]
    fn defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.path, PathBuf::from("procurement.db"));
        assert!(config.flush_on_commit);
        assert!(!config.temporary);
    }
}
